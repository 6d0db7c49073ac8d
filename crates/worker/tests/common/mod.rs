//! Shared test universe: the full worker stack wired against the
//! in-memory store ports.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use metronome_core::{ReplyContext, TriggerState};
use metronome_store::{MemoryCursor, MemoryLedger, MemoryOutbox};
use metronome_worker::{CreateTrigger, TriggerCommands, TriggerQueries, TriggerWorker};

// Each integration test binary compiles its own copy; not every test
// file touches every field.
#[allow(dead_code)]
pub struct Universe {
    pub worker: TriggerWorker,
    pub commands: TriggerCommands,
    pub queries: TriggerQueries,
    pub outbox: Arc<MemoryOutbox>,
    pub cursor: Arc<MemoryCursor>,
}

pub fn universe() -> Universe {
    let outbox = Arc::new(MemoryOutbox::new());
    let ledger = Arc::new(MemoryLedger::new(outbox.clone()));
    let cursor = Arc::new(MemoryCursor::new());
    Universe {
        worker: TriggerWorker::new(ledger.clone(), cursor.clone(), outbox.clone()),
        commands: TriggerCommands::new(ledger.clone()),
        queries: TriggerQueries::new(ledger),
        outbox,
        cursor,
    }
}

pub fn utc(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_else(|e| panic!("failed to parse time {}: {}", s, e))
}

pub async fn create_trigger(uu: &Universe, id: &str, name: &str, cron: &str) -> TriggerState {
    uu.commands
        .create(CreateTrigger {
            trigger_id: Some(id.to_string()),
            app_name: "test".to_string(),
            trigger_name: name.to_string(),
            cron: cron.to_string(),
            reply: ReplyContext {
                reply_to: format!("caller-{}", id),
                request_id: Some(format!("req-{}", id)),
            },
        })
        .await
        .unwrap_or_else(|e| panic!("failed to create trigger {}: {}", id, e))
}
