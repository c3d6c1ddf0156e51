use serde::{Deserialize, Serialize};

use tradedesk_auth::{AuthorizedUser, Policy, PolicyRequirement, Role, SubRole};
use tradedesk_core::{ClientId, ProductId, TenantId, UserId};
use tradedesk_parties::ContactInfo;

#[derive(Debug, Deserialize)]
pub struct CreateClientRequest {
    pub name: String,
    #[serde(default)]
    pub contact: ContactInfo,
}

/// Partial update; absent fields are left unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdateClientRequest {
    pub name: Option<String>,
    pub contact: Option<ContactInfo>,
    #[serde(default)]
    pub deactivate: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AssignProductRequest {
    pub product_id: ProductId,
}

#[derive(Debug, Deserialize)]
pub struct CreateSaleRequest {
    pub client_id: ClientId,
    pub product_id: ProductId,
    pub quantity: u32,
}

#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
}

impl<T> From<Vec<T>> for ListResponse<T> {
    fn from(items: Vec<T>) -> Self {
        Self { items }
    }
}

#[derive(Debug, Serialize)]
pub struct WhoAmIResponse {
    pub user_id: UserId,
    pub tenant_id: Option<TenantId>,
    pub role: Role,
    pub sub_role: Option<SubRole>,
}

impl WhoAmIResponse {
    pub fn new(authorized: &AuthorizedUser, tenant_id: Option<TenantId>) -> Self {
        Self {
            user_id: authorized.user.id,
            tenant_id,
            role: authorized.user.role,
            sub_role: authorized.user.sub_role,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PolicyView<'a> {
    pub name: Policy,
    #[serde(flatten)]
    pub requirement: &'a PolicyRequirement,
}
