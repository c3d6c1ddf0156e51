use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use tradedesk_core::UserId;

use crate::audit::AuditSink;
use crate::{
    Decision, DenyReason, Policy, PolicyRegistry, UserRecord, UserStore, VerifiedClaims,
    evaluate, resolve_subject,
};

/// Upper bound on a single user lookup.
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    /// No usable subject claim.
    #[error("identity missing")]
    IdentityMissing,

    /// A policy denied the request. The reason is for logs only.
    #[error("forbidden: {0}")]
    Forbidden(DenyReason),

    /// The user store failed or timed out. Never treated as an allow.
    #[error("authorization infrastructure failure: {0}")]
    Infrastructure(String),
}

/// A user that passed a policy check for this request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizedUser {
    pub user: UserRecord,
    pub policy: Policy,
}

/// Request-time authorization entry point.
///
/// Holds no per-request state; the user is fetched fresh on every call.
#[derive(Clone)]
pub struct Authorizer {
    users: Arc<dyn UserStore>,
    audit: Arc<dyn AuditSink>,
    registry: &'static PolicyRegistry,
    lookup_timeout: Duration,
}

impl Authorizer {
    pub fn new(users: Arc<dyn UserStore>, audit: Arc<dyn AuditSink>) -> Self {
        Self {
            users,
            audit,
            registry: PolicyRegistry::global(),
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }

    pub fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = timeout;
        self
    }

    /// Check `policy` for the caller identified by `claims`.
    ///
    /// Dropping the returned future cancels the lookup without producing a
    /// decision.
    pub async fn authorize(
        &self,
        policy: Policy,
        claims: &VerifiedClaims,
    ) -> Result<AuthorizedUser, AuthzError> {
        self.authorize_any(&[policy], claims).await
    }

    /// Allow when any of `policies` allows, checked in order against a single
    /// user lookup. Each evaluation is audited; the first allow stops the scan.
    /// An empty list denies with [`DenyReason::RoleNotAllowed`].
    pub async fn authorize_any(
        &self,
        policies: &[Policy],
        claims: &VerifiedClaims,
    ) -> Result<AuthorizedUser, AuthzError> {
        let Some(&first) = policies.first() else {
            return Err(AuthzError::Forbidden(DenyReason::RoleNotAllowed));
        };

        let subject = resolve_subject(claims).inspect_err(|_| {
            tracing::debug!(policy = first.as_str(), "no usable subject claim");
        })?;

        let user = self.lookup(first, subject).await?;

        let mut denied = DenyReason::RoleNotAllowed;
        for &policy in policies {
            let requirement = self.registry.get(policy);
            match evaluate(policy, subject, user.as_ref(), requirement, self.audit.as_ref()) {
                Decision::Allow => {
                    if let Some(user) = user {
                        return Ok(AuthorizedUser { user, policy });
                    }
                    return Err(AuthzError::Forbidden(DenyReason::UserInactiveOrMissing));
                }
                Decision::Deny(reason) => denied = reason,
            }
        }
        Err(AuthzError::Forbidden(denied))
    }

    async fn lookup(&self, policy: Policy, subject: UserId) -> Result<Option<UserRecord>, AuthzError> {
        match tokio::time::timeout(self.lookup_timeout, self.users.get_by_id(subject)).await {
            Ok(Ok(user)) => Ok(user),
            Ok(Err(e)) => {
                tracing::error!(
                    policy = policy.as_str(),
                    subject_id = subject.get(),
                    error = %e,
                    "user lookup failed; denying"
                );
                Err(AuthzError::Infrastructure(e.to_string()))
            }
            Err(_) => {
                tracing::error!(
                    policy = policy.as_str(),
                    subject_id = subject.get(),
                    timeout_ms = self.lookup_timeout.as_millis() as u64,
                    "user lookup timed out; denying"
                );
                Err(AuthzError::Infrastructure("user lookup timed out".to_string()))
            }
        }
    }
}
