//! `tradedesk-auth`: authorization and tenant-isolation boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: token decoding
//! sits behind [`JwtValidator`], user lookup behind [`UserStore`], and decision
//! logging behind [`AuditSink`].

pub mod audit;
pub mod authorize;
pub mod claims;
pub mod evaluate;
pub mod identity;
pub mod policy;
pub mod roles;
pub mod tenant;
pub mod user;

pub use audit::{AuditEvent, AuditSink, MemoryAuditSink, Outcome, TracingAuditSink};
pub use authorize::{AuthorizedUser, Authorizer, AuthzError, DEFAULT_LOOKUP_TIMEOUT};
pub use claims::{Hs256JwtValidator, JwtValidator, TokenValidationError, VerifiedClaims, validate_time_window};
pub use evaluate::{Decision, DenyReason, decide, evaluate};
pub use identity::resolve_subject;
pub use policy::{Policy, PolicyRegistry, PolicyRequirement, UnknownPolicy};
pub use roles::{Role, SubRole};
pub use tenant::{TenantContext, TenantContextMissing, TenantScope, current_tenant_id};
pub use user::{StoreError, UserRecord, UserStore};
