use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use tradedesk_api::app::{AppServices, build_app};
use tradedesk_api::config::AppConfig;
use tradedesk_auth::UserStore;
use tradedesk_infra::InMemoryUserStore;
use tradedesk_infra::db::{self, PgClientRepository, PgUserStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tradedesk_observability::init();

    let config = AppConfig::from_env().context("invalid configuration")?;

    let services = match &config.database_url {
        Some(url) => {
            let pool = db::connect(url, config.db_max_connections)
                .await
                .context("failed to connect to postgres")?;
            db::migrate(&pool).await.context("failed to run migrations")?;
            let users: Arc<dyn UserStore> = Arc::new(PgUserStore::new(pool.clone()));
            AppServices::in_memory(users, config.user_lookup_timeout)
                .with_clients(Arc::new(PgClientRepository::new(pool)))
        }
        None => {
            warn!("DATABASE_URL not set; using an empty in-memory user store");
            let users: Arc<dyn UserStore> = Arc::new(InMemoryUserStore::new());
            AppServices::in_memory(users, config.user_lookup_timeout)
        }
    };

    let app = build_app(&config.jwt_secret, services);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app).await?;
    Ok(())
}
