//! Process configuration, read from the environment once at startup.

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

use tradedesk_auth::DEFAULT_LOOKUP_TIMEOUT;

const DEV_JWT_SECRET: &str = "dev-secret";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    /// Postgres connection string. Without it, users live in memory.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub user_lookup_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let jwt_secret = var("JWT_SECRET").unwrap_or_else(|| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            DEV_JWT_SECRET.to_string()
        });

        let bind_addr = parse_or(var("BIND_ADDR"), "BIND_ADDR", || {
            DEFAULT_BIND_ADDR.parse().map_err(|_| ConfigError::InvalidValue {
                name: "BIND_ADDR",
                value: DEFAULT_BIND_ADDR.to_string(),
            })
        })?;

        let db_max_connections = parse_or(var("DB_MAX_CONNECTIONS"), "DB_MAX_CONNECTIONS", || {
            Ok(DEFAULT_DB_MAX_CONNECTIONS)
        })?;

        let timeout_ms: Option<u64> = var("USER_LOOKUP_TIMEOUT_MS")
            .map(|raw| parse("USER_LOOKUP_TIMEOUT_MS", raw))
            .transpose()?;
        let user_lookup_timeout = match timeout_ms {
            Some(0) => {
                return Err(ConfigError::InvalidValue {
                    name: "USER_LOOKUP_TIMEOUT_MS",
                    value: "0".to_string(),
                });
            }
            Some(ms) => Duration::from_millis(ms),
            None => DEFAULT_LOOKUP_TIMEOUT,
        };

        Ok(Self {
            bind_addr,
            jwt_secret,
            database_url: var("DATABASE_URL"),
            db_max_connections,
            user_lookup_timeout,
        })
    }
}

fn parse<T: std::str::FromStr>(name: &'static str, raw: String) -> Result<T, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue { name, value: raw })
}

fn parse_or<T: std::str::FromStr>(
    raw: Option<String>,
    name: &'static str,
    default: impl FnOnce() -> Result<T, ConfigError>,
) -> Result<T, ConfigError> {
    match raw {
        Some(raw) => parse(name, raw),
        None => default(),
    }
}
