//! Subject resolution from a verified claim set.

use serde_json::Value;

use tradedesk_core::UserId;

use crate::{AuthzError, VerifiedClaims};

/// Application-issued subject claim, read first.
pub const SUBJECT_CLAIM: &str = "user_id";

/// Standard JWT subject claim, read when [`SUBJECT_CLAIM`] is absent.
pub const FALLBACK_SUBJECT_CLAIM: &str = "sub";

/// Resolve the numeric subject id of the caller.
///
/// The first claim that is *present* decides: a malformed `user_id` does not
/// fall through to `sub`.
pub fn resolve_subject(claims: &VerifiedClaims) -> Result<UserId, AuthzError> {
    let value = claims
        .get(SUBJECT_CLAIM)
        .or_else(|| claims.get(FALLBACK_SUBJECT_CLAIM))
        .ok_or(AuthzError::IdentityMissing)?;

    positive_id(value)
        .and_then(UserId::new)
        .ok_or(AuthzError::IdentityMissing)
}

/// Accepts a JSON number or a numeric string holding a positive integer.
pub(crate) fn positive_id(value: &Value) -> Option<u64> {
    let raw = match value {
        Value::Number(n) => n.as_u64()?,
        Value::String(s) => s.trim().parse::<u64>().ok()?,
        _ => return None,
    };
    (raw > 0).then_some(raw)
}
