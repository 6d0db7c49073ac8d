//! [`TriggerWorker`] — the self-advancing clock and tick evaluator.
//!
//! Each delivered `AdvanceClock` signal drives one cycle: compute the next
//! tick instant, evaluate every active trigger's cron against it, persist
//! the cursor (guarded, monotonic), and re-arm the next delayed signal.
//! A failure anywhere aborts the cycle without arming; redelivery of the
//! same signal retries it, which is the at-least-once catch-up path.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use metronome_core::{cron, AdvanceClock, EventSpec, Signal, TriggerEvent};
use metronome_store::{CursorStore, SignalSender, StoreError, TickCursor, TriggerLedger};

pub struct TriggerWorker {
    ledger: Arc<dyn TriggerLedger>,
    cursor: Arc<dyn CursorStore>,
    sender: Arc<dyn SignalSender>,
}

impl TriggerWorker {
    pub fn new(
        ledger: Arc<dyn TriggerLedger>,
        cursor: Arc<dyn CursorStore>,
        sender: Arc<dyn SignalSender>,
    ) -> Self {
        Self {
            ledger,
            cursor,
            sender,
        }
    }

    /// Bootstrap the clock on process start.
    ///
    /// When no cursor exists, seeds `last_tick` one cadence period in the
    /// past and arms the first signal, so the very first real tick is
    /// evaluated on the next delivery. A present cursor is left alone;
    /// the in-flight signal chain keeps advancing it.
    pub async fn init_clock(&self) -> Result<(), StoreError> {
        if let Some(cursor) = self.cursor.load().await? {
            info!(last_tick = %cursor.last_tick, "tick cursor present, clock already armed");
            return Ok(());
        }

        info!("no previous tick cursor found, seeding one");
        let last = cron::floor_minute(Utc::now()) - cron::cadence();
        self.finish_tick(last).await
    }

    /// Process one `AdvanceClock` delivery.
    ///
    /// Evaluation order across triggers is unspecified; each matching
    /// trigger's `Triggered` transition is its own atomic unit.
    pub async fn advance_tick(&self, last_tick: DateTime<Utc>) -> Result<(), StoreError> {
        let tick = cron::next_tick(last_tick)?;

        let active = self.ledger.list_active().await?;
        debug!(count = active.len(), tick = %tick, "evaluating active triggers");

        for trigger in active {
            if cron::matches(&trigger.data.cron, tick)? {
                info!(trigger_id = %trigger.trigger_id, tick = %tick, "trigger fired");
                self.ledger
                    .transition(EventSpec {
                        trigger_id: trigger.trigger_id.clone(),
                        event: TriggerEvent::Triggered { tick },
                    })
                    .await?;
            }
        }

        self.finish_tick(tick).await
    }

    /// Commit the cycle: advance the cursor past `tick` and re-arm the
    /// next delayed signal. The cursor write is a guarded no-op when a
    /// concurrent or replayed delivery already advanced past `tick`.
    async fn finish_tick(&self, tick: DateTime<Utc>) -> Result<(), StoreError> {
        let signal = AdvanceClock { last_tick: tick };
        let snapshot = serde_json::to_string(&signal)
            .map_err(|e| StoreError::Serialize(e.to_string()))?;

        let advanced = self
            .cursor
            .advance(TickCursor {
                last_tick: tick,
                snapshot,
            })
            .await?;
        if !advanced {
            debug!(tick = %tick, "cursor already past this tick");
        }

        let delay = cron::tick_delay(tick, Utc::now());
        self.sender
            .send_delayed(Signal::AdvanceClock(signal), delay)
            .await
    }

    /// Reconstruct the last emitted tick signal from the cursor snapshot.
    /// `None` means the clock has never been bootstrapped.
    pub async fn last_tick(&self) -> Result<Option<AdvanceClock>, StoreError> {
        match self.cursor.load().await? {
            Some(cursor) => serde_json::from_str(&cursor.snapshot)
                .map(Some)
                .map_err(|e| StoreError::Serialize(e.to_string())),
            None => Ok(None),
        }
    }
}
