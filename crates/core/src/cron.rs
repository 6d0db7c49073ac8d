//! Cron parsing, tick matching, and delay computation.
//!
//! Expressions use the standard 5-field grammar (`min hour day-of-month
//! month day-of-week`) or a `@hourly`/`@daily`/... macro, optionally
//! prefixed with `TZ=<zone>` or `CRON_TZ=<zone>` to relocate all field
//! comparisons into an IANA timezone. The `cron` crate requires a seconds
//! field, so 5-field expressions are normalized by pinning seconds to 0.

use std::str::FromStr;

use chrono::{DateTime, Duration, Timelike, Utc};
use chrono_tz::Tz;
use cron::Schedule;

use crate::error::TriggerError;

/// The system's own cadence expression: fire every minute.
pub const TICK_CRON: &str = "*/1 * * * *";

/// Fixed clock cadence. One tick cycle advances exactly this far.
pub fn cadence() -> Duration {
    Duration::minutes(1)
}

/// Re-arm delays are capped at five cadence periods; anything longer means
/// the clock has drifted and should catch up instead of sleeping.
const DELAY_CAP_CYCLES: i32 = 5;

/// Split an optional `TZ=`/`CRON_TZ=` qualifier off the front of `expr`.
fn split_timezone(expr: &str) -> (Option<&str>, &str) {
    let trimmed = expr.trim();
    for prefix in ["CRON_TZ=", "TZ="] {
        if let Some(rest) = trimmed.strip_prefix(prefix) {
            let mut parts = rest.splitn(2, char::is_whitespace);
            let zone = parts.next().unwrap_or("");
            let fields = parts.next().unwrap_or("").trim_start();
            return (Some(zone), fields);
        }
    }
    (None, trimmed)
}

/// Parse a trigger cron expression into a schedule and the zone it is
/// evaluated in (UTC when unqualified).
fn parse(expr: &str) -> Result<(Schedule, Tz), TriggerError> {
    let (zone, fields) = split_timezone(expr);

    let tz: Tz = match zone {
        Some(z) => z
            .parse()
            .map_err(|e| TriggerError::InvalidCron(format!("unknown timezone {:?}: {}", z, e)))?,
        None => Tz::UTC,
    };

    let normalized = if fields.starts_with('@') {
        // Macros like @hourly already carry their own seconds semantics.
        fields.to_string()
    } else {
        let count = fields.split_whitespace().count();
        if count != 5 {
            return Err(TriggerError::InvalidCron(format!(
                "expected 5 fields, got {} in {:?}",
                count, fields
            )));
        }
        format!("0 {}", fields)
    };

    let schedule = Schedule::from_str(&normalized)
        .map_err(|e| TriggerError::InvalidCron(e.to_string()))?;

    Ok((schedule, tz))
}

/// Validate cron syntax without evaluating it.
pub fn validate(expr: &str) -> Result<(), TriggerError> {
    parse(expr).map(|_| ())
}

/// Does `expr` fire at exactly the whole-minute instant `tick`?
///
/// There is no direct "does T match" primitive, so step back one cadence
/// and ask for the next firing; it lands on `tick` exactly when `tick` is
/// scheduled. Malformed expressions are an error, never a non-match.
pub fn matches(expr: &str, tick: DateTime<Utc>) -> Result<bool, TriggerError> {
    let (schedule, tz) = parse(expr)?;
    let probe = (tick - cadence()).with_timezone(&tz);
    Ok(schedule
        .after(&probe)
        .next()
        .map(|next| next.with_timezone(&Utc) == tick)
        .unwrap_or(false))
}

/// Next tick instant of the fixed cadence expression strictly after
/// `last_tick`. Under normal operation this is `last_tick + cadence`.
pub fn next_tick(last_tick: DateTime<Utc>) -> Result<DateTime<Utc>, TriggerError> {
    let (schedule, _) = parse(TICK_CRON)?;
    schedule
        .after(&last_tick)
        .next()
        .ok_or_else(|| TriggerError::InvalidCron(format!("no tick after {}", last_tick)))
}

/// Delay until the signal following `this_tick` should be delivered:
/// `max(0, min(this_tick + cadence - now, 5 * cadence))`. Zero means
/// "redeliver immediately", which is how the clock catches up.
pub fn tick_delay(this_tick: DateTime<Utc>, now: DateTime<Utc>) -> std::time::Duration {
    let next = this_tick + cadence();
    if next <= now {
        return std::time::Duration::ZERO;
    }
    let capped = std::cmp::min(next - now, cadence() * DELAY_CAP_CYCLES);
    capped.to_std().unwrap_or(std::time::Duration::ZERO)
}

/// Truncate an instant to whole-minute granularity.
pub fn floor_minute(t: DateTime<Utc>) -> DateTime<Utc> {
    t.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(t)
}
