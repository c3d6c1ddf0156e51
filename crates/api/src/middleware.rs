use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use tradedesk_auth::{JwtValidator, TenantContext};

use crate::app::errors::ApiError;
use crate::context::PrincipalContext;

#[derive(Clone)]
pub struct AuthState {
    pub jwt: Arc<dyn JwtValidator>,
}

/// Validate the bearer token and attach the request contexts.
///
/// A token without a tenant claim still passes; handlers fail closed when they
/// need a tenant scope.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer(req.headers())?;

    let claims = state.jwt.validate(token, Utc::now()).map_err(|e| {
        tracing::debug!(error = %e, "bearer token rejected");
        ApiError::Unauthorized
    })?;

    req.extensions_mut()
        .insert(TenantContext::from_claims(&claims));
    req.extensions_mut().insert(PrincipalContext::new(claims));

    Ok(next.run(req).await)
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, ApiError> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or(ApiError::Unauthorized)?;

    let header = header.to_str().map_err(|_| ApiError::Unauthorized)?;

    let header = header
        .strip_prefix("Bearer ")
        .ok_or(ApiError::Unauthorized)?;

    let token = header.trim();
    if token.is_empty() {
        return Err(ApiError::Unauthorized);
    }

    Ok(token)
}
