//! Trigger worker: the tick-evaluation engine plus the command and query
//! surfaces, wired against the store ports.

pub mod command;
pub mod query;
pub mod worker;

pub use command::{CreateTrigger, TriggerCommands, UpdateTrigger};
pub use query::TriggerQueries;
pub use worker::TriggerWorker;
