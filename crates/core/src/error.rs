use thiserror::Error;

/// Domain error taxonomy for trigger operations.
///
/// `InvalidCron` and `InvalidTransition` surface synchronously to the caller
/// with no state change; `NotFound` covers commands addressed to an unknown
/// trigger id.
#[derive(Error, Debug)]
pub enum TriggerError {
    #[error("invalid cron string: {0}")]
    InvalidCron(String),

    #[error("trigger not found: {0}")]
    NotFound(String),

    #[error("invalid transition: event {event} not allowed from {from}")]
    InvalidTransition { from: String, event: &'static str },
}
