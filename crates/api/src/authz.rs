//! Route-level policy guard.
//!
//! Handlers call this before touching any repository, so a denied request
//! never reaches tenant-scoped data.

use tradedesk_auth::{AuthorizedUser, Policy};

use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

/// Check `policy` for the current caller.
pub async fn require(
    services: &AppServices,
    principal: &PrincipalContext,
    policy: Policy,
) -> Result<AuthorizedUser, ApiError> {
    require_any(services, principal, &[policy]).await
}

/// Allow when any of `policies` allows.
pub async fn require_any(
    services: &AppServices,
    principal: &PrincipalContext,
    policies: &[Policy],
) -> Result<AuthorizedUser, ApiError> {
    services
        .authorizer
        .authorize_any(policies, principal.claims())
        .await
        .map_err(ApiError::from)
}
