//! Read-only query surface: get-by-id, list, and event history.

use std::sync::Arc;

use metronome_core::{EventRecord, TriggerState};
use metronome_store::{StoreError, TriggerLedger};

pub struct TriggerQueries {
    ledger: Arc<dyn TriggerLedger>,
}

impl TriggerQueries {
    pub fn new(ledger: Arc<dyn TriggerLedger>) -> Self {
        Self { ledger }
    }

    pub async fn get(&self, trigger_id: &str) -> Result<TriggerState, StoreError> {
        self.ledger.get(trigger_id).await
    }

    pub async fn list(&self) -> Result<Vec<TriggerState>, StoreError> {
        self.ledger.list().await
    }

    /// Lifecycle events for one trigger, newest first.
    pub async fn events(&self, trigger_id: &str) -> Result<Vec<EventRecord>, StoreError> {
        self.ledger.events(trigger_id).await
    }
}
