use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use tradedesk_auth::{AuthzError, TenantContextMissing};
use tradedesk_core::DomainError;
use tradedesk_infra::RepositoryError;

/// Handler-level error. Every variant maps to one status and error code.
///
/// Deny bodies are uniform: the deny reason stays in the audit log.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("unauthorized")]
    Unauthorized,

    #[error("forbidden")]
    Forbidden,

    #[error("not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    #[error("service unavailable")]
    Unavailable,

    #[error("internal error")]
    Internal,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Unauthorized => {
                json_error(StatusCode::UNAUTHORIZED, "unauthorized", "unauthorized")
            }
            ApiError::Forbidden => json_error(StatusCode::FORBIDDEN, "forbidden", "forbidden"),
            ApiError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
            ApiError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
            ApiError::Validation(msg) => {
                json_error(StatusCode::BAD_REQUEST, "validation_error", msg)
            }
            ApiError::InvariantViolation(msg) => {
                json_error(StatusCode::UNPROCESSABLE_ENTITY, "invariant_violation", msg)
            }
            ApiError::Unavailable => json_error(
                StatusCode::SERVICE_UNAVAILABLE,
                "service_unavailable",
                "service unavailable",
            ),
            ApiError::Internal => json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "internal error",
            ),
        }
    }
}

impl From<AuthzError> for ApiError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::IdentityMissing => ApiError::Unauthorized,
            AuthzError::Forbidden(_) => ApiError::Forbidden,
            AuthzError::Infrastructure(_) => ApiError::Unavailable,
        }
    }
}

impl From<TenantContextMissing> for ApiError {
    fn from(_: TenantContextMissing) -> Self {
        // Already logged at the point of detection.
        ApiError::Internal
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => ApiError::Validation(msg),
            DomainError::InvalidId(msg) => ApiError::Validation(msg),
            DomainError::InvariantViolation(msg) => ApiError::InvariantViolation(msg),
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => ApiError::NotFound,
            RepositoryError::Conflict(msg) => ApiError::Conflict(msg),
            RepositoryError::TenantContextMissing(missing) => missing.into(),
            RepositoryError::Domain(e) => e.into(),
            RepositoryError::Storage(msg) => {
                tracing::error!(error = %msg, "repository failure");
                ApiError::Internal
            }
        }
    }
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// Parse a path segment into a typed id. Malformed ids are a client error.
pub fn parse_id<T: std::str::FromStr>(raw: &str) -> Result<T, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::Validation(format!("invalid id: {raw:?}")))
}
