//! Tenant context for a single request.
//!
//! The tenant id is read from the verified token and carried explicitly; no
//! ambient/thread-local state is involved. Repositories accept only a
//! [`TenantScope`], which can be obtained solely from a context that actually
//! carries a tenant, so an unscoped data access does not type-check.

use thiserror::Error;

use tradedesk_core::{TenantId, TenantOwned};

use crate::VerifiedClaims;
use crate::identity::positive_id;

/// Claim holding the caller's tenant.
pub const TENANT_CLAIM: &str = "tenant_id";

/// Derive the active tenant from the verified token.
///
/// `None` when the claim is absent or not a positive integer (anonymous or
/// system contexts).
pub fn current_tenant_id(claims: &VerifiedClaims) -> Option<TenantId> {
    claims
        .get(TENANT_CLAIM)
        .and_then(positive_id)
        .and_then(TenantId::new)
}

/// A tenant-scoped operation ran without a tenant.
///
/// This is a caller defect, never an "unfiltered" request.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("tenant context missing for a tenant-scoped operation")]
pub struct TenantContextMissing;

/// Tenant context for a request.
///
/// Immutable for the request lifetime.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TenantContext {
    tenant_id: Option<TenantId>,
}

impl TenantContext {
    pub fn from_claims(claims: &VerifiedClaims) -> Self {
        Self {
            tenant_id: current_tenant_id(claims),
        }
    }

    /// Context for background work acting on behalf of a known tenant.
    pub fn for_tenant(tenant_id: TenantId) -> Self {
        Self {
            tenant_id: Some(tenant_id),
        }
    }

    pub fn anonymous() -> Self {
        Self { tenant_id: None }
    }

    pub fn tenant_id(&self) -> Option<TenantId> {
        self.tenant_id
    }

    /// Obtain the scope required by tenant-scoped repositories.
    pub fn require(&self) -> Result<TenantScope, TenantContextMissing> {
        match self.tenant_id {
            Some(tenant_id) => Ok(TenantScope(tenant_id)),
            None => {
                tracing::error!("tenant-scoped operation attempted without tenant context");
                Err(TenantContextMissing)
            }
        }
    }
}

/// Proof that the current request carries a tenant.
///
/// Every tenant-scoped repository method takes `&TenantScope`; there is no
/// optional or "all tenants" variant.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TenantScope(TenantId);

impl TenantScope {
    pub fn tenant_id(&self) -> TenantId {
        self.0
    }

    /// Equality predicate every read/update/delete path applies.
    pub fn owns<E: TenantOwned>(&self, entity: &E) -> bool {
        entity.tenant_id() == self.0
    }
}
