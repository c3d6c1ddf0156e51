use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tradedesk_core::{
    ClientId, DomainError, DomainResult, Entity, ProductId, SaleId, TenantId, TenantOwned, UserId,
};

/// Sale lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaleStatus {
    Pending,
    Delivered,
}

/// Validated input for a new sale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSale {
    client_id: ClientId,
    product_id: ProductId,
    quantity: u32,
    seller_id: UserId,
    occurred_at: DateTime<Utc>,
}

impl NewSale {
    pub fn new(
        client_id: ClientId,
        product_id: ProductId,
        quantity: u32,
        seller_id: UserId,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if quantity == 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }
        Ok(Self {
            client_id,
            product_id,
            quantity,
            seller_id,
            occurred_at,
        })
    }
}

/// A recorded sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sale {
    id: SaleId,
    tenant_id: TenantId,
    client_id: ClientId,
    product_id: ProductId,
    quantity: u32,
    seller_id: UserId,
    status: SaleStatus,
    delivered_by: Option<UserId>,
    created_at: DateTime<Utc>,
    delivered_at: Option<DateTime<Utc>>,
}

impl Sale {
    pub fn client_id(&self) -> ClientId {
        self.client_id
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn seller_id(&self) -> UserId {
        self.seller_id
    }

    pub fn status(&self) -> SaleStatus {
        self.status
    }

    pub fn delivered_by(&self) -> Option<UserId> {
        self.delivered_by
    }

    pub fn mark_delivered(&mut self, courier: UserId, at: DateTime<Utc>) -> DomainResult<()> {
        if self.status == SaleStatus::Delivered {
            return Err(DomainError::invariant("sale is already delivered"));
        }
        self.status = SaleStatus::Delivered;
        self.delivered_by = Some(courier);
        self.delivered_at = Some(at);
        Ok(())
    }
}

impl Entity for Sale {
    type Id = SaleId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl TenantOwned for Sale {
    type Draft = NewSale;

    fn from_draft(id: SaleId, tenant_id: TenantId, draft: NewSale) -> Self {
        Self {
            id,
            tenant_id,
            client_id: draft.client_id,
            product_id: draft.product_id,
            quantity: draft.quantity,
            seller_id: draft.seller_id,
            status: SaleStatus::Pending,
            delivered_by: None,
            created_at: draft.occurred_at,
            delivered_at: None,
        }
    }

    fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sale() -> Sale {
        let draft = NewSale::new(
            ClientId::new(1).unwrap(),
            ProductId::new(2).unwrap(),
            3,
            UserId::new(4).unwrap(),
            Utc::now(),
        )
        .unwrap();
        Sale::from_draft(SaleId::new(1).unwrap(), TenantId::new(1).unwrap(), draft)
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let err = NewSale::new(
            ClientId::new(1).unwrap(),
            ProductId::new(2).unwrap(),
            0,
            UserId::new(4).unwrap(),
            Utc::now(),
        );
        assert!(err.is_err());
    }

    #[test]
    fn delivery_happens_once() {
        let mut s = sale();
        assert_eq!(s.status(), SaleStatus::Pending);

        let courier = UserId::new(8).unwrap();
        s.mark_delivered(courier, Utc::now()).unwrap();
        assert_eq!(s.status(), SaleStatus::Delivered);
        assert_eq!(s.delivered_by(), Some(courier));
        assert!(s.mark_delivered(courier, Utc::now()).is_err());
    }
}
