use std::sync::Arc;

use axum::{Json, extract::Extension, http::StatusCode};

use tradedesk_auth::Policy;

use crate::app::dto::WhoAmIResponse;
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::authz;
use crate::context::{PrincipalContext, TenantContext};

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// The caller as the user store sees it right now.
pub async fn whoami(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
) -> Result<Json<WhoAmIResponse>, ApiError> {
    let authorized = authz::require(&services, &principal, Policy::StandardOrRestricted).await?;
    Ok(Json(WhoAmIResponse::new(&authorized, tenant.tenant_id())))
}
