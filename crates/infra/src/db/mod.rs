//! Postgres adapters.
//!
//! The user store is queried by id alone. Every tenant-owned table query binds
//! the scope's tenant id as `$1` and filters on it.

pub mod clients;
pub mod users;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

pub use clients::PgClientRepository;
pub use users::PgUserStore;

/// Open a connection pool.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

/// Apply the bundled schema migrations. Runs before the server accepts requests.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}
