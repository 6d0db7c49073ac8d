//! In-memory implementations of the store ports.
//!
//! These are the test doubles the engine is specified against: a
//! transactional ledger guarded by one lock (serializable per trigger), a
//! monotonic cursor cell, and a delay queue standing in for the real
//! delayed-delivery channel. They are also good enough for a
//! single-process worker run.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use metronome_core::{
    lifecycle, EventRecord, EventSpec, Signal, TriggerError, TriggerEvent, TriggerState,
    TriggerStatus,
};

use crate::error::StoreError;
use crate::traits::{CursorStore, SignalSender, TickCursor, TriggerLedger};

// ── MemoryLedger ────────────────────────────────────────────────────

struct TriggerRow {
    state: TriggerState,
    /// Append-only, oldest first.
    events: Vec<EventRecord>,
}

/// In-memory transactional trigger ledger.
///
/// Side effects from a transition go to `sender` while the ledger lock is
/// held, so event and signal commit as one unit. Repeated `Triggered`
/// events for the same `(trigger_id, tick)` pair are deduplicated, which
/// makes redelivered tick signals idempotent.
pub struct MemoryLedger {
    rows: Mutex<HashMap<String, TriggerRow>>,
    sender: Arc<dyn SignalSender>,
}

impl MemoryLedger {
    pub fn new(sender: Arc<dyn SignalSender>) -> Self {
        Self {
            rows: Mutex::new(HashMap::new()),
            sender,
        }
    }

    fn is_duplicate_tick(row: &TriggerRow, spec: &EventSpec) -> bool {
        let tick = match &spec.event {
            TriggerEvent::Triggered { tick } => *tick,
            _ => return false,
        };
        row.events
            .iter()
            .any(|r| matches!(r.event, TriggerEvent::Triggered { tick: t } if t == tick))
    }
}

#[async_trait]
impl TriggerLedger for MemoryLedger {
    async fn transition(&self, spec: EventSpec) -> Result<TriggerState, StoreError> {
        let mut rows = self.rows.lock().await;
        let current = rows.get(&spec.trigger_id);

        if current.is_none() && !matches!(spec.event, TriggerEvent::Created { .. }) {
            return Err(TriggerError::NotFound(spec.trigger_id.clone()).into());
        }

        if let Some(row) = current {
            if Self::is_duplicate_tick(row, &spec) {
                debug!(trigger_id = %spec.trigger_id, "duplicate triggered event ignored");
                return Ok(row.state.clone());
            }
        }

        let applied = lifecycle::apply(current.map(|r| &r.state), &spec.trigger_id, &spec.event)?;

        if let Some(fired) = applied.side_effect {
            self.sender.send(Signal::TriggerFired(fired)).await?;
        }

        let record = EventRecord {
            event_id: Uuid::new_v4(),
            at: Utc::now(),
            event: spec.event,
        };

        let row = rows
            .entry(spec.trigger_id.clone())
            .or_insert_with(|| TriggerRow {
                state: applied.state.clone(),
                events: Vec::new(),
            });
        row.state = applied.state.clone();
        row.events.push(record);

        Ok(applied.state)
    }

    async fn get(&self, trigger_id: &str) -> Result<TriggerState, StoreError> {
        let rows = self.rows.lock().await;
        rows.get(trigger_id)
            .map(|r| r.state.clone())
            .ok_or_else(|| TriggerError::NotFound(trigger_id.to_string()).into())
    }

    async fn list(&self) -> Result<Vec<TriggerState>, StoreError> {
        let rows = self.rows.lock().await;
        Ok(rows.values().map(|r| r.state.clone()).collect())
    }

    async fn list_active(&self) -> Result<Vec<TriggerState>, StoreError> {
        let rows = self.rows.lock().await;
        Ok(rows
            .values()
            .filter(|r| r.state.status == TriggerStatus::Active)
            .map(|r| r.state.clone())
            .collect())
    }

    async fn events(&self, trigger_id: &str) -> Result<Vec<EventRecord>, StoreError> {
        let rows = self.rows.lock().await;
        let row = rows
            .get(trigger_id)
            .ok_or_else(|| TriggerError::NotFound(trigger_id.to_string()))?;
        let mut events = row.events.clone();
        events.reverse(); // newest first
        Ok(events)
    }
}

// ── MemoryCursor ────────────────────────────────────────────────────

/// Single-cell clock cursor with the monotonic guard applied in-process.
#[derive(Default)]
pub struct MemoryCursor {
    cell: Mutex<Option<TickCursor>>,
}

impl MemoryCursor {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CursorStore for MemoryCursor {
    async fn load(&self) -> Result<Option<TickCursor>, StoreError> {
        Ok(self.cell.lock().await.clone())
    }

    async fn advance(&self, cursor: TickCursor) -> Result<bool, StoreError> {
        let mut cell = self.cell.lock().await;
        match cell.as_ref() {
            Some(stored) if cursor.last_tick <= stored.last_tick => {
                debug!(
                    incoming = %cursor.last_tick,
                    stored = %stored.last_tick,
                    "stale cursor write skipped"
                );
                Ok(false)
            }
            _ => {
                *cell = Some(cursor);
                Ok(true)
            }
        }
    }
}

// ── MemoryOutbox ────────────────────────────────────────────────────

/// One enqueued signal and the instant it becomes deliverable.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub deliver_at: DateTime<Utc>,
    pub signal: Signal,
}

/// In-memory delay queue standing in for the delayed message channel.
#[derive(Default)]
pub struct MemoryOutbox {
    queue: Mutex<VecDeque<Delivery>>,
}

impl MemoryOutbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pop the oldest signal regardless of its delivery time. Test helper.
    pub async fn pop(&self) -> Option<Signal> {
        self.queue.lock().await.pop_front().map(|d| d.signal)
    }

    /// Pop the oldest signal whose delivery time has arrived.
    pub async fn pop_due(&self, now: DateTime<Utc>) -> Option<Signal> {
        let mut queue = self.queue.lock().await;
        let idx = queue.iter().position(|d| d.deliver_at <= now)?;
        queue.remove(idx).map(|d| d.signal)
    }

    /// Snapshot of everything still queued, oldest first.
    pub async fn deliveries(&self) -> Vec<Delivery> {
        self.queue.lock().await.iter().cloned().collect()
    }

    pub async fn pending(&self) -> usize {
        self.queue.lock().await.len()
    }
}

#[async_trait]
impl SignalSender for MemoryOutbox {
    async fn send(&self, signal: Signal) -> Result<(), StoreError> {
        self.send_delayed(signal, Duration::ZERO).await
    }

    async fn send_delayed(&self, signal: Signal, delay: Duration) -> Result<(), StoreError> {
        let delay = chrono::Duration::from_std(delay)
            .map_err(|e| StoreError::Delivery(format!("delay out of range: {}", e)))?;
        self.queue.lock().await.push_back(Delivery {
            deliver_at: Utc::now() + delay,
            signal,
        });
        Ok(())
    }
}
