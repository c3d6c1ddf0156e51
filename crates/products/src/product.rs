use serde::Serialize;

use tradedesk_core::{DomainError, DomainResult, Entity, ProductId, TenantId, TenantOwned};

/// Validated input for a new product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    name: String,
    description: Option<String>,
}

impl NewProduct {
    pub fn new(name: impl Into<String>, description: Option<String>) -> DomainResult<Self> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("product name must not be empty"));
        }
        Ok(Self { name, description })
    }
}

/// A product in a tenant's catalog.
///
/// Names are unique (case-insensitive) within the tenant only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    id: ProductId,
    tenant_id: TenantId,
    name: String,
    description: Option<String>,
}

impl Product {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl TenantOwned for Product {
    type Draft = NewProduct;

    fn from_draft(id: ProductId, tenant_id: TenantId, draft: NewProduct) -> Self {
        Self {
            id,
            tenant_id,
            name: draft.name,
            description: draft.description,
        }
    }

    fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    fn natural_key(&self) -> Option<String> {
        Some(self.name.to_lowercase())
    }
}
