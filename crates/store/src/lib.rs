//! Durable-store and signal-channel ports for the trigger engine, plus
//! in-memory implementations used for tests and single-process runs.
//!
//! The ports mirror the external collaborators the engine assumes: a
//! transactional apply-one-event ledger, a monotonic clock cursor, and an
//! at-least-once delayed signal channel.

pub mod error;
pub mod memory;
pub mod traits;

pub use error::StoreError;
pub use memory::{Delivery, MemoryCursor, MemoryLedger, MemoryOutbox};
pub use traits::{CursorStore, SignalSender, TickCursor, TriggerLedger};
