//! Command surface: create/update/archive/pause/resume/manual-trigger.
//!
//! Each command applies exactly one lifecycle event through the ledger.
//! Cron syntax is validated before any event is built, so a malformed
//! expression fails synchronously with no state mutation.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use metronome_core::{cron, EventSpec, ReplyContext, TriggerEvent, TriggerState};
use metronome_store::{StoreError, TriggerLedger};

#[derive(Debug, Clone)]
pub struct CreateTrigger {
    /// Caller-supplied id; generated when absent.
    pub trigger_id: Option<String>,
    pub app_name: String,
    pub trigger_name: String,
    pub cron: String,
    pub reply: ReplyContext,
}

#[derive(Debug, Clone)]
pub struct UpdateTrigger {
    pub trigger_id: String,
    pub app_name: String,
    pub trigger_name: String,
    pub cron: String,
    pub reply: ReplyContext,
}

pub struct TriggerCommands {
    ledger: Arc<dyn TriggerLedger>,
}

impl TriggerCommands {
    pub fn new(ledger: Arc<dyn TriggerLedger>) -> Self {
        Self { ledger }
    }

    pub async fn create(&self, req: CreateTrigger) -> Result<TriggerState, StoreError> {
        cron::validate(&req.cron)?;

        let trigger_id = req
            .trigger_id
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        info!(trigger_id = %trigger_id, cron = %req.cron, "creating trigger");

        self.ledger
            .transition(EventSpec {
                trigger_id,
                event: TriggerEvent::Created {
                    app_name: req.app_name,
                    trigger_name: req.trigger_name,
                    cron: req.cron,
                    reply: req.reply,
                },
            })
            .await
    }

    pub async fn update(&self, req: UpdateTrigger) -> Result<TriggerState, StoreError> {
        cron::validate(&req.cron)?;

        self.ledger
            .transition(EventSpec {
                trigger_id: req.trigger_id,
                event: TriggerEvent::Updated {
                    app_name: req.app_name,
                    trigger_name: req.trigger_name,
                    cron: req.cron,
                    reply: req.reply,
                },
            })
            .await
    }

    pub async fn pause(&self, trigger_id: &str) -> Result<TriggerState, StoreError> {
        self.ledger
            .transition(EventSpec {
                trigger_id: trigger_id.to_string(),
                event: TriggerEvent::Paused,
            })
            .await
    }

    pub async fn resume(&self, trigger_id: &str) -> Result<TriggerState, StoreError> {
        self.ledger
            .transition(EventSpec {
                trigger_id: trigger_id.to_string(),
                event: TriggerEvent::Activated,
            })
            .await
    }

    pub async fn archive(&self, trigger_id: &str) -> Result<TriggerState, StoreError> {
        self.ledger
            .transition(EventSpec {
                trigger_id: trigger_id.to_string(),
                event: TriggerEvent::Archived,
            })
            .await
    }

    /// Fire an active trigger at an arbitrary caller-supplied instant,
    /// bypassing cron evaluation entirely.
    pub async fn manually_trigger(
        &self,
        trigger_id: &str,
        at: DateTime<Utc>,
    ) -> Result<TriggerState, StoreError> {
        info!(trigger_id = %trigger_id, at = %at, "manual trigger requested");
        self.ledger
            .transition(EventSpec {
                trigger_id: trigger_id.to_string(),
                event: TriggerEvent::ManuallyTriggered { at },
            })
            .await
    }
}
