use serde::Serialize;

use tradedesk_core::{ClientId, ClientProductId, Entity, ProductId, TenantId, TenantOwned};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewClientProduct {
    pub client_id: ClientId,
    pub product_id: ProductId,
}

/// A product offered to a specific client.
///
/// At most one listing per (client, product) within a tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientProduct {
    id: ClientProductId,
    tenant_id: TenantId,
    client_id: ClientId,
    product_id: ProductId,
}

impl ClientProduct {
    pub fn client_id(&self) -> ClientId {
        self.client_id
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }
}

impl Entity for ClientProduct {
    type Id = ClientProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl TenantOwned for ClientProduct {
    type Draft = NewClientProduct;

    fn from_draft(id: ClientProductId, tenant_id: TenantId, draft: NewClientProduct) -> Self {
        Self {
            id,
            tenant_id,
            client_id: draft.client_id,
            product_id: draft.product_id,
        }
    }

    fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    fn natural_key(&self) -> Option<String> {
        Some(format!("{}:{}", self.client_id, self.product_id))
    }
}
