use async_trait::async_trait;
use sqlx::{PgPool, Row};

use tradedesk_auth::{Role, StoreError, SubRole, UserRecord, UserStore};
use tradedesk_core::{TenantId, UserId};

/// Postgres-backed user lookup.
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn get_by_id(&self, id: UserId) -> Result<Option<UserRecord>, StoreError> {
        let corrupt = |reason: String| StoreError::Corrupt { id, reason };

        let key = id.to_i64().map_err(|e| corrupt(e.to_string()))?;
        let row = sqlx::query(
            r#"
            SELECT tenant_id, role, sub_role, active
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let tenant_id: i64 = row.try_get("tenant_id").map_err(|e| corrupt(e.to_string()))?;
        let role: String = row.try_get("role").map_err(|e| corrupt(e.to_string()))?;
        let sub_role: Option<String> = row.try_get("sub_role").map_err(|e| corrupt(e.to_string()))?;
        let active: bool = row.try_get("active").map_err(|e| corrupt(e.to_string()))?;

        Ok(Some(UserRecord {
            id,
            tenant_id: TenantId::try_from(tenant_id).map_err(|e| corrupt(e.to_string()))?,
            role: role.parse::<Role>().map_err(|e| corrupt(e.to_string()))?,
            sub_role: sub_role
                .map(|s| s.parse::<SubRole>())
                .transpose()
                .map_err(|e| corrupt(e.to_string()))?,
            active,
        }))
    }
}
