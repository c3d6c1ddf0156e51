use std::collections::HashMap;
use std::num::NonZeroU64;
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;

use tradedesk_auth::TenantScope;
use tradedesk_core::{DomainError, DomainResult, NumericId, TenantId, TenantOwned};

use super::{RepositoryError, TenantRepository};

/// In-memory tenant-isolated repository for tests/dev.
///
/// Rows are keyed by `(tenant_id, id)`, so every keyed access carries the
/// tenant predicate by construction. Ids come from one sequence shared by all
/// tenants, like a database serial column.
#[derive(Debug)]
pub struct InMemoryTenantRepository<E: TenantOwned> {
    inner: RwLock<HashMap<(TenantId, E::Id), E>>,
    next_id: AtomicU64,
}

impl<E: TenantOwned> InMemoryTenantRepository<E> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }
}

impl<E: TenantOwned> Default for InMemoryTenantRepository<E> {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned() -> RepositoryError {
    RepositoryError::Storage("repository lock poisoned".to_string())
}

/// Natural-key clash with another row of the same tenant.
fn check_unique<E>(
    rows: &HashMap<(TenantId, E::Id), E>,
    tenant_id: TenantId,
    candidate: &E,
) -> Result<(), RepositoryError>
where
    E: TenantOwned,
    E::Id: NumericId,
{
    let Some(key) = candidate.natural_key() else {
        return Ok(());
    };
    let clash = rows.iter().any(|((t, id), row)| {
        *t == tenant_id && id != candidate.id() && row.natural_key().as_ref() == Some(&key)
    });
    if clash {
        return Err(RepositoryError::Conflict(format!("'{key}' already exists")));
    }
    Ok(())
}

#[async_trait]
impl<E> TenantRepository<E> for InMemoryTenantRepository<E>
where
    E: TenantOwned + Clone,
    E::Id: NumericId,
{
    async fn create(&self, scope: &TenantScope, draft: E::Draft) -> Result<E, RepositoryError> {
        let mut rows = self.inner.write().map_err(|_| poisoned())?;

        let raw = NonZeroU64::new(self.next_id.fetch_add(1, Ordering::SeqCst))
            .ok_or_else(|| RepositoryError::Storage("id sequence exhausted".to_string()))?;
        let entity = E::from_draft(E::Id::from_raw(raw), scope.tenant_id(), draft);

        check_unique(&rows, scope.tenant_id(), &entity)?;
        rows.insert((scope.tenant_id(), *entity.id()), entity.clone());

        tracing::debug!(tenant_id = %scope.tenant_id(), id = raw.get(), "row created");
        Ok(entity)
    }

    async fn get(&self, scope: &TenantScope, id: &E::Id) -> Result<E, RepositoryError> {
        let rows = self.inner.read().map_err(|_| poisoned())?;
        rows.get(&(scope.tenant_id(), *id))
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn find(
        &self,
        scope: &TenantScope,
        predicate: &(dyn for<'a> Fn(&'a E) -> bool + Sync),
    ) -> Result<Vec<E>, RepositoryError> {
        let rows = self.inner.read().map_err(|_| poisoned())?;
        let mut found: Vec<E> = rows
            .iter()
            .filter(|((t, _id), row)| *t == scope.tenant_id() && predicate(row))
            .map(|(_, row)| row.clone())
            .collect();
        found.sort_by_key(|row| row.id().get());
        Ok(found)
    }

    async fn update(
        &self,
        scope: &TenantScope,
        id: &E::Id,
        change: &mut (dyn for<'a> FnMut(&'a mut E) -> DomainResult<()> + Send),
    ) -> Result<E, RepositoryError> {
        let mut rows = self.inner.write().map_err(|_| poisoned())?;
        let key = (scope.tenant_id(), *id);

        let mut updated = rows.get(&key).cloned().ok_or(RepositoryError::NotFound)?;
        change(&mut updated)?;

        if !scope.owns(&updated) || updated.id() != id {
            return Err(DomainError::invariant("tenant and id are immutable").into());
        }
        check_unique(&rows, scope.tenant_id(), &updated)?;

        rows.insert(key, updated.clone());
        Ok(updated)
    }

    async fn delete(&self, scope: &TenantScope, id: &E::Id) -> Result<E, RepositoryError> {
        let mut rows = self.inner.write().map_err(|_| poisoned())?;
        rows.remove(&(scope.tenant_id(), *id))
            .ok_or(RepositoryError::NotFound)
    }
}

#[cfg(test)]
impl<E: TenantOwned> InMemoryTenantRepository<E> {
    /// Row count across all tenants.
    fn total_rows(&self) -> usize {
        self.inner.read().map(|rows| rows.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use tradedesk_auth::{TenantContext, TenantContextMissing};
    use tradedesk_core::{ClientId, Entity, ProductId};
    use tradedesk_parties::{Client, ContactInfo, NewClient};
    use tradedesk_products::{ClientProduct, NewClientProduct};

    use super::*;

    fn scope(tenant: u64) -> TenantScope {
        TenantContext::for_tenant(TenantId::new(tenant).unwrap())
            .require()
            .unwrap()
    }

    fn draft(name: &str) -> NewClient {
        NewClient::new(name, ContactInfo::default()).unwrap()
    }

    #[tokio::test]
    async fn create_stamps_the_scope_tenant() {
        let repo = InMemoryTenantRepository::<Client>::new();
        let c = repo.create(&scope(1), draft("Acme")).await.unwrap();
        assert_eq!(c.tenant_id().get(), 1);
        assert_eq!(repo.get(&scope(1), c.id()).await.unwrap(), c);
    }

    #[tokio::test]
    async fn other_tenants_cannot_read_update_or_delete() {
        let repo = InMemoryTenantRepository::<Client>::new();
        let c = repo.create(&scope(1), draft("Acme")).await.unwrap();

        assert_eq!(repo.get(&scope(2), c.id()).await, Err(RepositoryError::NotFound));
        assert_eq!(
            repo.update(&scope(2), c.id(), &mut |c| c.rename("Hijacked")).await,
            Err(RepositoryError::NotFound)
        );
        assert_eq!(repo.delete(&scope(2), c.id()).await, Err(RepositoryError::NotFound));
        assert!(repo.list(&scope(2)).await.unwrap().is_empty());

        assert_eq!(repo.get(&scope(1), c.id()).await.unwrap().name(), "Acme");
    }

    #[tokio::test]
    async fn same_natural_key_under_two_tenants_stays_separate() {
        let repo = InMemoryTenantRepository::<Client>::new();
        let a = repo.create(&scope(1), draft("Acme")).await.unwrap();
        let b = repo.create(&scope(2), draft("Acme")).await.unwrap();
        assert_ne!(a.id(), b.id());

        repo.update(&scope(2), b.id(), &mut |c| c.rename("Acme Two")).await.unwrap();
        assert_eq!(repo.get(&scope(1), a.id()).await.unwrap().name(), "Acme");

        repo.delete(&scope(1), a.id()).await.unwrap();
        assert_eq!(repo.list(&scope(2)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn uniqueness_is_per_tenant() {
        let repo = InMemoryTenantRepository::<Client>::new();
        repo.create(&scope(1), draft("Acme")).await.unwrap();
        let err = repo.create(&scope(1), draft("ACME")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
        assert_eq!(repo.list(&scope(1)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_cannot_introduce_a_duplicate() {
        let repo = InMemoryTenantRepository::<Client>::new();
        repo.create(&scope(1), draft("Acme")).await.unwrap();
        let other = repo.create(&scope(1), draft("Globex")).await.unwrap();

        let err = repo
            .update(&scope(1), other.id(), &mut |c| c.rename("acme"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
        assert_eq!(repo.get(&scope(1), other.id()).await.unwrap().name(), "Globex");
    }

    #[tokio::test]
    async fn failed_change_writes_nothing() {
        let repo = InMemoryTenantRepository::<Client>::new();
        let c = repo.create(&scope(1), draft("Acme")).await.unwrap();
        let err = repo.update(&scope(1), c.id(), &mut |c| c.rename(" ")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Domain(_)));
        assert_eq!(repo.get(&scope(1), c.id()).await.unwrap().name(), "Acme");
    }

    #[tokio::test]
    async fn client_product_pair_is_unique_within_tenant() {
        let repo = InMemoryTenantRepository::<ClientProduct>::new();
        let pair = || NewClientProduct {
            client_id: ClientId::new(3).unwrap(),
            product_id: ProductId::new(5).unwrap(),
        };

        repo.create(&scope(1), pair()).await.unwrap();
        repo.create(&scope(2), pair()).await.unwrap();
        assert!(matches!(
            repo.create(&scope(1), pair()).await,
            Err(RepositoryError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn create_without_tenant_context_writes_nothing() {
        let repo = InMemoryTenantRepository::<Client>::new();
        let err = repo
            .create_in(&TenantContext::anonymous(), draft("Acme"))
            .await
            .unwrap_err();
        assert_eq!(err, RepositoryError::TenantContextMissing(TenantContextMissing));
        assert_eq!(repo.total_rows(), 0);
    }

    #[tokio::test]
    async fn sale_delivery_is_written_once() {
        use chrono::Utc;
        use tradedesk_core::UserId;
        use tradedesk_sales::{NewSale, Sale, SaleStatus};

        let repo = InMemoryTenantRepository::<Sale>::new();
        let seller = UserId::new(3).unwrap();
        let courier = UserId::new(4).unwrap();
        let draft = NewSale::new(
            ClientId::new(1).unwrap(),
            ProductId::new(1).unwrap(),
            2,
            seller,
            Utc::now(),
        )
        .unwrap();
        let sale = repo.create(&scope(1), draft).await.unwrap();

        let now = Utc::now();
        let delivered = repo
            .update(&scope(1), sale.id(), &mut |s| s.mark_delivered(courier, now))
            .await
            .unwrap();
        assert_eq!(delivered.status(), SaleStatus::Delivered);
        assert_eq!(delivered.delivered_by(), Some(courier));

        let err = repo
            .update(&scope(1), sale.id(), &mut |s| s.mark_delivered(seller, now))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Domain(_)));
        assert_eq!(repo.get(&scope(1), sale.id()).await.unwrap().delivered_by(), Some(courier));
    }

    proptest! {
        #[test]
        fn reads_never_cross_tenants(rows in prop::collection::vec((1_u64..4, "[a-e]{1,3}"), 0..40)) {
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            rt.block_on(async {
                let repo = InMemoryTenantRepository::<Client>::new();
                let mut expected: HashMap<u64, usize> = HashMap::new();
                for (tenant, name) in &rows {
                    if repo.create(&scope(*tenant), draft(name)).await.is_ok() {
                        *expected.entry(*tenant).or_default() += 1;
                    }
                }

                for tenant in 1_u64..4 {
                    let listed = repo.list(&scope(tenant)).await.unwrap();
                    prop_assert_eq!(listed.len(), expected.get(&tenant).copied().unwrap_or(0));
                    prop_assert!(listed.iter().all(|c| c.tenant_id().get() == tenant));

                    for other in listed.iter() {
                        for foreign in (1_u64..4).filter(|t| *t != tenant) {
                            prop_assert_eq!(repo.get(&scope(foreign), other.id()).await, Err(RepositoryError::NotFound));
                        }
                    }
                }
                Ok(())
            })?;
        }
    }
}
