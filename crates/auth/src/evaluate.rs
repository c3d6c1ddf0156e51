//! Policy evaluation.
//!
//! - No IO
//! - No panics
//! - Same (user, requirement) pair always yields the same decision

use serde::Serialize;

use tradedesk_core::UserId;

use crate::audit::{AuditEvent, AuditSink};
use crate::{Policy, PolicyRequirement, Role, UserRecord};

/// Why a request was denied. Logged server-side only.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    UserInactiveOrMissing,
    RoleNotAllowed,
    SuperExplicitlyExcluded,
    SubRoleNotAllowed,
}

impl DenyReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DenyReason::UserInactiveOrMissing => "user_inactive_or_missing",
            DenyReason::RoleNotAllowed => "role_not_allowed",
            DenyReason::SuperExplicitlyExcluded => "super_explicitly_excluded",
            DenyReason::SubRoleNotAllowed => "sub_role_not_allowed",
        }
    }
}

impl core::fmt::Display for DenyReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub fn deny_reason(&self) -> Option<DenyReason> {
        match self {
            Decision::Allow => None,
            Decision::Deny(reason) => Some(*reason),
        }
    }
}

/// Decide access for a resolved user.
///
/// The steps run in a fixed order; the super exclusion is only consulted once
/// role membership has passed.
pub fn decide(user: Option<&UserRecord>, requirement: &PolicyRequirement) -> Decision {
    let Some(user) = user.filter(|u| u.active) else {
        return Decision::Deny(DenyReason::UserInactiveOrMissing);
    };

    if !requirement.admits_role(user.role) {
        return Decision::Deny(DenyReason::RoleNotAllowed);
    }

    match user.role {
        Role::Super if requirement.excludes_super() => {
            Decision::Deny(DenyReason::SuperExplicitlyExcluded)
        }
        Role::Super | Role::Standard => Decision::Allow,
        Role::Restricted => match requirement.allowed_sub_roles() {
            None => Decision::Allow,
            Some(allowed) if user.sub_role.is_some_and(|s| allowed.contains(&s)) => Decision::Allow,
            Some(_) => Decision::Deny(DenyReason::SubRoleNotAllowed),
        },
    }
}

/// [`decide`], then report the decision to the audit sink.
pub fn evaluate(
    policy: Policy,
    subject: UserId,
    user: Option<&UserRecord>,
    requirement: &PolicyRequirement,
    audit: &dyn AuditSink,
) -> Decision {
    let decision = decide(user, requirement);
    audit.record(&AuditEvent::for_decision(policy, subject, user, decision));
    decision
}
