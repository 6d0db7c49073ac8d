//! Capability ports for durable state and signal delivery.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use metronome_core::{EventRecord, EventSpec, Signal, TriggerState};

use crate::error::StoreError;

/// Singleton durable record of the last fully-evaluated tick.
///
/// `snapshot` holds the serialized last `AdvanceClock` signal so the clock
/// can be reconstructed on cold start without any in-flight message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickCursor {
    pub last_tick: DateTime<Utc>,
    pub snapshot: String,
}

/// Transactional apply-one-event ledger over triggers.
///
/// Every transition is a single read-modify-write unit against one
/// trigger; cross-trigger atomicity is deliberately not offered. Side
/// effects emitted by a transition commit together with the event.
#[async_trait]
pub trait TriggerLedger: Send + Sync {
    /// Apply one lifecycle event. Returns the resulting state, or an error
    /// with no partial effect.
    async fn transition(&self, spec: EventSpec) -> Result<TriggerState, StoreError>;

    /// Fetch one trigger by id.
    async fn get(&self, trigger_id: &str) -> Result<TriggerState, StoreError>;

    /// All triggers, any status.
    async fn list(&self) -> Result<Vec<TriggerState>, StoreError>;

    /// Triggers currently eligible for tick evaluation.
    async fn list_active(&self) -> Result<Vec<TriggerState>, StoreError>;

    /// Event history for one trigger, newest first.
    async fn events(&self, trigger_id: &str) -> Result<Vec<EventRecord>, StoreError>;
}

#[async_trait]
impl<T: TriggerLedger + ?Sized> TriggerLedger for Arc<T> {
    async fn transition(&self, spec: EventSpec) -> Result<TriggerState, StoreError> {
        (**self).transition(spec).await
    }

    async fn get(&self, trigger_id: &str) -> Result<TriggerState, StoreError> {
        (**self).get(trigger_id).await
    }

    async fn list(&self) -> Result<Vec<TriggerState>, StoreError> {
        (**self).list().await
    }

    async fn list_active(&self) -> Result<Vec<TriggerState>, StoreError> {
        (**self).list_active().await
    }

    async fn events(&self, trigger_id: &str) -> Result<Vec<EventRecord>, StoreError> {
        (**self).events(trigger_id).await
    }
}

/// Durable clock cursor with a monotonic-only write path.
#[async_trait]
pub trait CursorStore: Send + Sync {
    /// Current cursor, `None` before first bootstrap.
    async fn load(&self) -> Result<Option<TickCursor>, StoreError>;

    /// Conditional upsert: applies only when `cursor.last_tick` exceeds
    /// the stored value. Returns whether the write applied, so duplicate
    /// or replayed signals degrade to a no-op instead of a regression.
    async fn advance(&self, cursor: TickCursor) -> Result<bool, StoreError>;
}

#[async_trait]
impl<T: CursorStore + ?Sized> CursorStore for Arc<T> {
    async fn load(&self) -> Result<Option<TickCursor>, StoreError> {
        (**self).load().await
    }

    async fn advance(&self, cursor: TickCursor) -> Result<bool, StoreError> {
        (**self).advance(cursor).await
    }
}

/// At-least-once, optionally delayed signal delivery.
#[async_trait]
pub trait SignalSender: Send + Sync {
    /// Enqueue for immediate delivery.
    async fn send(&self, signal: Signal) -> Result<(), StoreError>;

    /// Enqueue for delivery at or after `now + delay`.
    async fn send_delayed(&self, signal: Signal, delay: Duration) -> Result<(), StoreError>;
}

#[async_trait]
impl<T: SignalSender + ?Sized> SignalSender for Arc<T> {
    async fn send(&self, signal: Signal) -> Result<(), StoreError> {
        (**self).send(signal).await
    }

    async fn send_delayed(&self, signal: Signal, delay: Duration) -> Result<(), StoreError> {
        (**self).send_delayed(signal, delay).await
    }
}
