use std::sync::Arc;

use axum::{Json, Router, extract::Extension, routing::get};

use tradedesk_auth::{Policy, PolicyRegistry};

use crate::app::dto::{ListResponse, PolicyView};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::authz;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new().route("/policies", get(list_policies))
}

/// The built-in policy table, for operators.
pub async fn list_policies(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Result<Json<ListResponse<PolicyView<'static>>>, ApiError> {
    authz::require(&services, &principal, Policy::SuperOnly).await?;

    let items = PolicyRegistry::global()
        .entries()
        .map(|(name, requirement)| PolicyView { name, requirement })
        .collect::<Vec<_>>();
    Ok(Json(items.into()))
}
