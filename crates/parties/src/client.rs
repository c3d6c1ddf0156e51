use serde::{Deserialize, Serialize};

use tradedesk_core::{ClientId, DomainError, DomainResult, Entity, TenantId, TenantOwned};

/// Contact information for a client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Validated input for a new client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewClient {
    name: String,
    contact: ContactInfo,
}

impl NewClient {
    pub fn new(name: impl Into<String>, contact: ContactInfo) -> DomainResult<Self> {
        Ok(Self {
            name: validate_name(name.into())?,
            contact,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contact(&self) -> &ContactInfo {
        &self.contact
    }
}

/// A client (customer) of a tenant.
///
/// # Invariants
/// - `tenant_id` is set at creation and has no setter.
/// - `name` is non-empty and unique (case-insensitive) within the tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Client {
    id: ClientId,
    tenant_id: TenantId,
    name: String,
    contact: ContactInfo,
    active: bool,
}

impl Client {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contact(&self) -> &ContactInfo {
        &self.contact
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn rename(&mut self, name: impl Into<String>) -> DomainResult<()> {
        self.name = validate_name(name.into())?;
        Ok(())
    }

    pub fn update_contact(&mut self, contact: ContactInfo) {
        self.contact = contact;
    }

    pub fn deactivate(&mut self) -> DomainResult<()> {
        if !self.active {
            return Err(DomainError::invariant("client is already inactive"));
        }
        self.active = false;
        Ok(())
    }
}

impl Entity for Client {
    type Id = ClientId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl TenantOwned for Client {
    type Draft = NewClient;

    fn from_draft(id: ClientId, tenant_id: TenantId, draft: NewClient) -> Self {
        Self {
            id,
            tenant_id,
            name: draft.name,
            contact: draft.contact,
            active: true,
        }
    }

    fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    fn natural_key(&self) -> Option<String> {
        Some(self.name.to_lowercase())
    }
}

fn validate_name(name: String) -> DomainResult<String> {
    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(DomainError::validation("client name must not be empty"));
    }
    Ok(name)
}
