//! Tenant-scoped repository abstractions.
//!
//! Row-level security is not available underneath, so isolation is enforced
//! here: every method takes a [`TenantScope`] and composes `tenant_id = scope`
//! with its own predicate. There is no unscoped method.

pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use tradedesk_auth::{TenantContext, TenantContextMissing, TenantScope};
use tradedesk_core::{DomainError, DomainResult, TenantOwned};

pub use memory::InMemoryTenantRepository;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// Absent, or owned by another tenant. The two are indistinguishable.
    #[error("not found")]
    NotFound,

    /// Tenant-scoped uniqueness violated.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    TenantContextMissing(#[from] TenantContextMissing),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("storage failure: {0}")]
    Storage(String),
}

/// Tenant-isolated storage for one entity type.
#[async_trait]
pub trait TenantRepository<E: TenantOwned>: Send + Sync {
    /// Stamp the scope's tenant on a new entity and persist it.
    async fn create(&self, scope: &TenantScope, draft: E::Draft) -> Result<E, RepositoryError>;

    async fn get(&self, scope: &TenantScope, id: &E::Id) -> Result<E, RepositoryError>;

    /// Rows of the scope's tenant matching `predicate`, ordered by id.
    async fn find(
        &self,
        scope: &TenantScope,
        predicate: &(dyn for<'a> Fn(&'a E) -> bool + Sync),
    ) -> Result<Vec<E>, RepositoryError>;

    /// Apply `change` to one row of the scope's tenant. Nothing is written if
    /// `change` fails or the result breaks tenant-scoped uniqueness.
    async fn update(
        &self,
        scope: &TenantScope,
        id: &E::Id,
        change: &mut (dyn for<'a> FnMut(&'a mut E) -> DomainResult<()> + Send),
    ) -> Result<E, RepositoryError>;

    /// Remove one row of the scope's tenant, returning it.
    async fn delete(&self, scope: &TenantScope, id: &E::Id) -> Result<E, RepositoryError>;

    async fn list(&self, scope: &TenantScope) -> Result<Vec<E>, RepositoryError> {
        self.find(scope, &|_| true).await
    }

    /// [`create`](Self::create) for callers holding only the request context.
    /// Fails before touching storage when the context has no tenant.
    async fn create_in(&self, tenant: &TenantContext, draft: E::Draft) -> Result<E, RepositoryError> {
        let scope = tenant.require()?;
        self.create(&scope, draft).await
    }
}

#[async_trait]
impl<E, S> TenantRepository<E> for Arc<S>
where
    E: TenantOwned,
    S: TenantRepository<E> + ?Sized,
{
    async fn create(&self, scope: &TenantScope, draft: E::Draft) -> Result<E, RepositoryError> {
        (**self).create(scope, draft).await
    }

    async fn get(&self, scope: &TenantScope, id: &E::Id) -> Result<E, RepositoryError> {
        (**self).get(scope, id).await
    }

    async fn find(
        &self,
        scope: &TenantScope,
        predicate: &(dyn for<'a> Fn(&'a E) -> bool + Sync),
    ) -> Result<Vec<E>, RepositoryError> {
        (**self).find(scope, predicate).await
    }

    async fn update(
        &self,
        scope: &TenantScope,
        id: &E::Id,
        change: &mut (dyn for<'a> FnMut(&'a mut E) -> DomainResult<()> + Send),
    ) -> Result<E, RepositoryError> {
        (**self).update(scope, id, change).await
    }

    async fn delete(&self, scope: &TenantScope, id: &E::Id) -> Result<E, RepositoryError> {
        (**self).delete(scope, id).await
    }
}
