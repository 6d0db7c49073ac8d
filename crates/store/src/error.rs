//! Store error types.

use metronome_core::TriggerError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Domain rejection (validation, not-found, invalid transition)
    /// surfaced through a store operation.
    #[error("{0}")]
    Trigger(#[from] TriggerError),

    #[error("serialization error: {0}")]
    Serialize(String),

    #[error("delivery error: {0}")]
    Delivery(String),

    #[error("storage error: {0}")]
    Storage(String),
}
