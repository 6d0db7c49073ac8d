pub mod config;
pub mod cron;
pub mod error;
pub mod lifecycle;
pub mod signal;
pub mod trigger;

pub use config::Config;
pub use error::TriggerError;
pub use signal::*;
pub use trigger::*;
