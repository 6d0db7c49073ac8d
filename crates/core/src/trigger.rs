//! Trigger domain types: state, status, and the closed lifecycle event set.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of a trigger. Governs tick-evaluation eligibility:
/// only `Active` triggers are checked against the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TriggerStatus {
    Active,
    Paused,
    Archived,
}

impl fmt::Display for TriggerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TriggerStatus::Active => "ACTIVE",
            TriggerStatus::Paused => "PAUSED",
            TriggerStatus::Archived => "ARCHIVED",
        };
        write!(f, "{}", s)
    }
}

/// Opaque request context carried from the creating/updating request and
/// echoed back on every fired signal so the caller can correlate replies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyContext {
    /// Destination the fired signal should be delivered to.
    pub reply_to: String,
    /// Caller-side correlation id, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// Mutable trigger fields, set by `Created`/`Updated` events only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerData {
    pub app_name: String,
    pub trigger_name: String,
    pub cron: String,
    pub reply: ReplyContext,
}

/// Current projection of a trigger: id, cached status, cached data.
/// Source of truth is the ordered event history held by the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerState {
    pub trigger_id: String,
    pub status: TriggerStatus,
    pub data: TriggerData,
}

/// The closed set of lifecycle events. Transition validity is decided by
/// the table in [`crate::lifecycle`]; anything not listed there is rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TriggerEvent {
    Created {
        app_name: String,
        trigger_name: String,
        cron: String,
        reply: ReplyContext,
    },
    Updated {
        app_name: String,
        trigger_name: String,
        cron: String,
        reply: ReplyContext,
    },
    Triggered {
        tick: DateTime<Utc>,
    },
    ManuallyTriggered {
        at: DateTime<Utc>,
    },
    Paused,
    Activated,
    Archived,
}

impl TriggerEvent {
    /// Stable event name used in logs and transition-rejection errors.
    pub fn name(&self) -> &'static str {
        match self {
            TriggerEvent::Created { .. } => "created",
            TriggerEvent::Updated { .. } => "updated",
            TriggerEvent::Triggered { .. } => "triggered",
            TriggerEvent::ManuallyTriggered { .. } => "manually_triggered",
            TriggerEvent::Paused => "paused",
            TriggerEvent::Activated => "activated",
            TriggerEvent::Archived => "archived",
        }
    }
}

/// One recorded lifecycle event in a trigger's append-only history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub event_id: Uuid,
    pub at: DateTime<Utc>,
    pub event: TriggerEvent,
}

/// A request to apply one event to one trigger, the unit of atomicity
/// for every state transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSpec {
    pub trigger_id: String,
    pub event: TriggerEvent,
}
