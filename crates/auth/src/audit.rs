//! Authorization decision audit trail.
//!
//! Sinks are best-effort: [`AuditSink::record`] cannot fail, so a broken sink
//! never changes a decision.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use tradedesk_core::UserId;

use crate::{Decision, DenyReason, Policy, Role, SubRole, UserRecord};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Allow,
    Deny,
}

/// One authorization decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditEvent {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub policy: Policy,
    pub subject_id: UserId,
    /// `None` when the user could not be loaded.
    pub role: Option<Role>,
    pub sub_role: Option<SubRole>,
    pub outcome: Outcome,
    pub reason: Option<DenyReason>,
}

impl AuditEvent {
    pub fn for_decision(
        policy: Policy,
        subject_id: UserId,
        user: Option<&UserRecord>,
        decision: Decision,
    ) -> Self {
        Self {
            event_id: Uuid::now_v7(),
            occurred_at: Utc::now(),
            policy,
            subject_id,
            role: user.map(|u| u.role),
            sub_role: user.and_then(|u| u.sub_role),
            outcome: if decision.is_allowed() {
                Outcome::Allow
            } else {
                Outcome::Deny
            },
            reason: decision.deny_reason(),
        }
    }
}

pub trait AuditSink: Send + Sync {
    fn record(&self, event: &AuditEvent);
}

/// Writes decisions as structured `tracing` events on `tradedesk::audit`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, event: &AuditEvent) {
        let role = event.role.map(|r| r.as_str()).unwrap_or("-");
        let sub_role = event.sub_role.map(|s| s.as_str()).unwrap_or("-");

        match event.reason {
            None => tracing::info!(
                target: "tradedesk::audit",
                event_id = %event.event_id,
                policy = event.policy.as_str(),
                subject_id = event.subject_id.get(),
                role,
                sub_role,
                outcome = "allow",
                "authorization granted"
            ),
            Some(reason) => tracing::warn!(
                target: "tradedesk::audit",
                event_id = %event.event_id,
                policy = event.policy.as_str(),
                subject_id = event.subject_id.get(),
                role,
                sub_role,
                outcome = "deny",
                reason = reason.as_str(),
                "authorization denied"
            ),
        }
    }
}

/// Collects events in memory (tests/dev).
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    events: Mutex<Vec<AuditEvent>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AuditEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(_) => vec![],
        }
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, event: &AuditEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
