use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use tradedesk_auth::TenantScope;
use tradedesk_core::{ClientId, DomainError, DomainResult, Entity, TenantOwned};
use tradedesk_parties::{Client, ContactInfo, NewClient};

use crate::{RepositoryError, TenantRepository};

use super::is_unique_violation;

/// Postgres-backed client repository.
///
/// `tenant_id` is bound as `$1` in every statement. Updates run in a
/// transaction holding the row lock, so a failed change writes nothing.
#[derive(Clone)]
pub struct PgClientRepository {
    pool: PgPool,
}

fn storage(err: sqlx::Error) -> RepositoryError {
    if is_unique_violation(&err) {
        return RepositoryError::Conflict("client name already exists".to_string());
    }
    RepositoryError::Storage(err.to_string())
}

fn client_from_row(scope: &TenantScope, row: &PgRow) -> Result<Client, RepositoryError> {
    let read = |e: sqlx::Error| RepositoryError::Storage(e.to_string());

    let id: i64 = row.try_get("id").map_err(read)?;
    let contact = ContactInfo {
        email: row.try_get("email").map_err(read)?,
        phone: row.try_get("phone").map_err(read)?,
        address: row.try_get("address").map_err(read)?,
    };
    let name: String = row.try_get("name").map_err(read)?;
    let active: bool = row.try_get("active").map_err(read)?;

    let mut client = Client::from_draft(
        ClientId::try_from(id)?,
        scope.tenant_id(),
        NewClient::new(name, contact)?,
    );
    if !active {
        client.deactivate()?;
    }
    Ok(client)
}

impl PgClientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TenantRepository<Client> for PgClientRepository {
    async fn create(&self, scope: &TenantScope, draft: NewClient) -> Result<Client, RepositoryError> {
        let row = sqlx::query(
            r#"
            INSERT INTO clients (tenant_id, name, email, phone, address)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, email, phone, address, active
            "#,
        )
        .bind(scope.tenant_id().to_i64()?)
        .bind(draft.name())
        .bind(draft.contact().email.as_deref())
        .bind(draft.contact().phone.as_deref())
        .bind(draft.contact().address.as_deref())
        .fetch_one(&self.pool)
        .await
        .map_err(storage)?;

        tracing::debug!(tenant_id = %scope.tenant_id(), "client row created");
        client_from_row(scope, &row)
    }

    async fn get(&self, scope: &TenantScope, id: &ClientId) -> Result<Client, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, email, phone, address, active
            FROM clients
            WHERE tenant_id = $1 AND id = $2
            "#,
        )
        .bind(scope.tenant_id().to_i64()?)
        .bind(id.to_i64()?)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?
        .ok_or(RepositoryError::NotFound)?;

        client_from_row(scope, &row)
    }

    async fn find(
        &self,
        scope: &TenantScope,
        predicate: &(dyn for<'a> Fn(&'a Client) -> bool + Sync),
    ) -> Result<Vec<Client>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, email, phone, address, active
            FROM clients
            WHERE tenant_id = $1
            ORDER BY id
            "#,
        )
        .bind(scope.tenant_id().to_i64()?)
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;

        let mut found = Vec::with_capacity(rows.len());
        for row in &rows {
            let client = client_from_row(scope, row)?;
            if predicate(&client) {
                found.push(client);
            }
        }
        Ok(found)
    }

    async fn update(
        &self,
        scope: &TenantScope,
        id: &ClientId,
        change: &mut (dyn for<'a> FnMut(&'a mut Client) -> DomainResult<()> + Send),
    ) -> Result<Client, RepositoryError> {
        let tenant = scope.tenant_id().to_i64()?;
        let key = id.to_i64()?;
        let mut tx = self.pool.begin().await.map_err(storage)?;

        let row = sqlx::query(
            r#"
            SELECT id, name, email, phone, address, active
            FROM clients
            WHERE tenant_id = $1 AND id = $2
            FOR UPDATE
            "#,
        )
        .bind(tenant)
        .bind(key)
        .fetch_optional(&mut *tx)
        .await
        .map_err(storage)?
        .ok_or(RepositoryError::NotFound)?;

        let mut client = client_from_row(scope, &row)?;
        change(&mut client)?;
        if !scope.owns(&client) || client.id() != id {
            return Err(DomainError::invariant("tenant and id are immutable").into());
        }

        sqlx::query(
            r#"
            UPDATE clients
            SET name = $3, email = $4, phone = $5, address = $6, active = $7
            WHERE tenant_id = $1 AND id = $2
            "#,
        )
        .bind(tenant)
        .bind(key)
        .bind(client.name())
        .bind(client.contact().email.as_deref())
        .bind(client.contact().phone.as_deref())
        .bind(client.contact().address.as_deref())
        .bind(client.is_active())
        .execute(&mut *tx)
        .await
        .map_err(storage)?;

        tx.commit().await.map_err(storage)?;
        Ok(client)
    }

    async fn delete(&self, scope: &TenantScope, id: &ClientId) -> Result<Client, RepositoryError> {
        let row = sqlx::query(
            r#"
            DELETE FROM clients
            WHERE tenant_id = $1 AND id = $2
            RETURNING id, name, email, phone, address, active
            "#,
        )
        .bind(scope.tenant_id().to_i64()?)
        .bind(id.to_i64()?)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?
        .ok_or(RepositoryError::NotFound)?;

        client_from_row(scope, &row)
    }
}
