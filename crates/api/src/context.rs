use std::sync::Arc;

use tradedesk_auth::VerifiedClaims;

pub use tradedesk_auth::TenantContext;

/// Principal context for a request: the verified token claims.
///
/// Role and status are not read from here; they come from the user store on
/// every policy check.
#[derive(Debug, Clone)]
pub struct PrincipalContext {
    claims: Arc<VerifiedClaims>,
}

impl PrincipalContext {
    pub fn new(claims: VerifiedClaims) -> Self {
        Self {
            claims: Arc::new(claims),
        }
    }

    pub fn claims(&self) -> &VerifiedClaims {
        &self.claims
    }
}
