//! Wire messages carried over the delayed signal channel.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::trigger::ReplyContext;

/// Self-re-arming clock signal. `last_tick` is the last fully-evaluated
/// tick instant; the receiver advances the clock exactly one cadence
/// period past it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvanceClock {
    pub last_tick: DateTime<Utc>,
}

/// Outbound firing notification, addressed to the reply context stored on
/// the trigger at create/update time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerFired {
    pub reply: ReplyContext,
    pub tick_time: DateTime<Utc>,
}

/// Everything the signal channel transports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "signal", rename_all = "snake_case")]
pub enum Signal {
    AdvanceClock(AdvanceClock),
    TriggerFired(TriggerFired),
}
