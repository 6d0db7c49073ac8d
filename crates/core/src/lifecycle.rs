//! Trigger lifecycle state machine.
//!
//! Transition validity is a closed table over `(status, event)`; any pair
//! not listed is rejected with an explicit `InvalidTransition` error.
//! `ARCHIVED` is terminal. Applying an event is pure: the caller (the
//! ledger) owns durability and side-effect delivery.

use crate::cron;
use crate::error::TriggerError;
use crate::signal::TriggerFired;
use crate::trigger::{TriggerData, TriggerEvent, TriggerState, TriggerStatus};

/// Result of applying one event: the new projection plus an optional
/// outbound signal to be delivered in the same commit.
#[derive(Debug, Clone, PartialEq)]
pub struct Applied {
    pub state: TriggerState,
    pub side_effect: Option<TriggerFired>,
}

/// The transition table: `(current status, event) -> next status`.
/// `None` on the left side is the not-yet-created state.
fn next_status(from: Option<TriggerStatus>, event: &TriggerEvent) -> Option<TriggerStatus> {
    match (from, event) {
        (None, TriggerEvent::Created { .. }) => Some(TriggerStatus::Active),

        (Some(TriggerStatus::Active), TriggerEvent::Updated { .. }) => Some(TriggerStatus::Active),
        (Some(TriggerStatus::Active), TriggerEvent::Triggered { .. }) => {
            Some(TriggerStatus::Active)
        }
        (Some(TriggerStatus::Active), TriggerEvent::ManuallyTriggered { .. }) => {
            Some(TriggerStatus::Active)
        }
        (Some(TriggerStatus::Active), TriggerEvent::Paused) => Some(TriggerStatus::Paused),
        (Some(TriggerStatus::Active), TriggerEvent::Archived) => Some(TriggerStatus::Archived),

        (Some(TriggerStatus::Paused), TriggerEvent::Updated { .. }) => Some(TriggerStatus::Paused),
        (Some(TriggerStatus::Paused), TriggerEvent::Activated) => Some(TriggerStatus::Active),
        (Some(TriggerStatus::Paused), TriggerEvent::Archived) => Some(TriggerStatus::Archived),

        // ARCHIVED has no outgoing transitions; everything else is rejected.
        _ => None,
    }
}

/// Apply `event` to the trigger identified by `trigger_id`.
///
/// `current` is `None` for a trigger that does not exist yet (only
/// `Created` is valid there). Validation failures abort the transition
/// entirely: no status change, no recorded event, no side effect.
pub fn apply(
    current: Option<&TriggerState>,
    trigger_id: &str,
    event: &TriggerEvent,
) -> Result<Applied, TriggerError> {
    let from = current.map(|s| s.status);
    let next = next_status(from, event).ok_or_else(|| TriggerError::InvalidTransition {
        from: from.map_or_else(|| "(none)".to_string(), |s| s.to_string()),
        event: event.name(),
    })?;

    let mut state = match (current, event) {
        (None, TriggerEvent::Created {
            app_name,
            trigger_name,
            cron: cron_expr,
            reply,
        }) => {
            cron::validate(cron_expr)?;
            TriggerState {
                trigger_id: trigger_id.to_string(),
                status: next,
                data: TriggerData {
                    app_name: app_name.clone(),
                    trigger_name: trigger_name.clone(),
                    cron: cron_expr.clone(),
                    reply: reply.clone(),
                },
            }
        }
        (Some(existing), _) => existing.clone(),
        // next_status already requires an existing trigger for non-Created
        // events, so this arm is unreachable in practice.
        (None, _) => {
            return Err(TriggerError::NotFound(trigger_id.to_string()));
        }
    };
    state.status = next;

    let mut side_effect = None;
    match event {
        TriggerEvent::Updated {
            app_name,
            trigger_name,
            cron: cron_expr,
            reply,
        } => {
            cron::validate(cron_expr)?;
            state.data.app_name = app_name.clone();
            state.data.trigger_name = trigger_name.clone();
            state.data.cron = cron_expr.clone();
            state.data.reply = reply.clone();
        }
        TriggerEvent::Triggered { tick } => {
            side_effect = Some(TriggerFired {
                reply: state.data.reply.clone(),
                tick_time: *tick,
            });
        }
        TriggerEvent::ManuallyTriggered { at } => {
            side_effect = Some(TriggerFired {
                reply: state.data.reply.clone(),
                tick_time: *at,
            });
        }
        _ => {}
    }

    Ok(Applied { state, side_effect })
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use crate::trigger::ReplyContext;

    use super::*;

    fn created(cron: &str) -> TriggerEvent {
        TriggerEvent::Created {
            app_name: "test".to_string(),
            trigger_name: "testCron".to_string(),
            cron: cron.to_string(),
            reply: ReplyContext {
                reply_to: "caller-1".to_string(),
                request_id: Some("req-1".to_string()),
            },
        }
    }

    fn active_trigger() -> TriggerState {
        apply(None, "t1", &created("30 18 * * *")).unwrap().state
    }

    #[test]
    fn created_becomes_active_with_data_set() {
        let applied = apply(None, "t1", &created("30 18 * * *")).unwrap();
        assert_eq!(applied.state.status, TriggerStatus::Active);
        assert_eq!(applied.state.trigger_id, "t1");
        assert_eq!(applied.state.data.cron, "30 18 * * *");
        assert_eq!(applied.state.data.app_name, "test");
        assert!(applied.side_effect.is_none());
    }

    #[test]
    fn created_rejects_invalid_cron() {
        let err = apply(None, "t1", &created("fail")).unwrap_err();
        assert!(matches!(err, TriggerError::InvalidCron(_)));
    }

    #[test]
    fn created_rejected_on_existing_trigger() {
        let state = active_trigger();
        let err = apply(Some(&state), "t1", &created("30 18 * * *")).unwrap_err();
        assert!(matches!(err, TriggerError::InvalidTransition { .. }));
    }

    #[test]
    fn updated_keeps_status_and_replaces_data() {
        let state = active_trigger();
        let applied = apply(
            Some(&state),
            "t1",
            &TriggerEvent::Updated {
                app_name: "test".to_string(),
                trigger_name: "renamed".to_string(),
                cron: "0 20 * * *".to_string(),
                reply: ReplyContext::default(),
            },
        )
        .unwrap();
        assert_eq!(applied.state.status, TriggerStatus::Active);
        assert_eq!(applied.state.data.trigger_name, "renamed");
        assert_eq!(applied.state.data.cron, "0 20 * * *");
    }

    #[test]
    fn updated_with_invalid_cron_leaves_prior_state_alone() {
        let state = active_trigger();
        let err = apply(
            Some(&state),
            "t1",
            &TriggerEvent::Updated {
                app_name: "test".to_string(),
                trigger_name: "renamed".to_string(),
                cron: "99 99 * * *".to_string(),
                reply: ReplyContext::default(),
            },
        )
        .unwrap_err();
        assert!(matches!(err, TriggerError::InvalidCron(_)));
        // the caller still holds the untouched prior state
        assert_eq!(state.data.cron, "30 18 * * *");
    }

    #[test]
    fn updated_allowed_while_paused() {
        let mut state = active_trigger();
        state = apply(Some(&state), "t1", &TriggerEvent::Paused)
            .unwrap()
            .state;
        let applied = apply(
            Some(&state),
            "t1",
            &TriggerEvent::Updated {
                app_name: "test".to_string(),
                trigger_name: "stillPaused".to_string(),
                cron: "0 19 1 * *".to_string(),
                reply: ReplyContext::default(),
            },
        )
        .unwrap();
        assert_eq!(applied.state.status, TriggerStatus::Paused);
        assert_eq!(applied.state.data.cron, "0 19 1 * *");
    }

    #[test]
    fn triggered_emits_reply_without_mutating_data() {
        let state = active_trigger();
        let tick = Utc.with_ymd_and_hms(2025, 2, 17, 18, 30, 0).unwrap();
        let applied = apply(Some(&state), "t1", &TriggerEvent::Triggered { tick }).unwrap();
        assert_eq!(applied.state.data, state.data);
        let fired = applied.side_effect.unwrap();
        assert_eq!(fired.tick_time, tick);
        assert_eq!(fired.reply.reply_to, "caller-1");
    }

    #[test]
    fn manually_triggered_uses_caller_instant() {
        let state = active_trigger();
        let at = Utc.with_ymd_and_hms(2030, 6, 1, 0, 0, 0).unwrap();
        let applied =
            apply(Some(&state), "t1", &TriggerEvent::ManuallyTriggered { at }).unwrap();
        assert_eq!(applied.side_effect.unwrap().tick_time, at);
    }

    #[test]
    fn triggered_rejected_while_paused() {
        let mut state = active_trigger();
        state = apply(Some(&state), "t1", &TriggerEvent::Paused)
            .unwrap()
            .state;
        let tick = Utc.with_ymd_and_hms(2025, 2, 17, 18, 30, 0).unwrap();
        let err = apply(Some(&state), "t1", &TriggerEvent::Triggered { tick }).unwrap_err();
        assert!(matches!(err, TriggerError::InvalidTransition { .. }));
    }

    #[test]
    fn pause_resume_round_trip() {
        let mut state = active_trigger();
        state = apply(Some(&state), "t1", &TriggerEvent::Paused)
            .unwrap()
            .state;
        assert_eq!(state.status, TriggerStatus::Paused);
        state = apply(Some(&state), "t1", &TriggerEvent::Activated)
            .unwrap()
            .state;
        assert_eq!(state.status, TriggerStatus::Active);
    }

    #[test]
    fn archived_is_terminal() {
        let mut state = active_trigger();
        state = apply(Some(&state), "t1", &TriggerEvent::Archived)
            .unwrap()
            .state;
        assert_eq!(state.status, TriggerStatus::Archived);

        for event in [
            TriggerEvent::Paused,
            TriggerEvent::Activated,
            TriggerEvent::Archived,
            TriggerEvent::Updated {
                app_name: "test".to_string(),
                trigger_name: "late".to_string(),
                cron: "0 20 * * *".to_string(),
                reply: ReplyContext::default(),
            },
            TriggerEvent::ManuallyTriggered {
                at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            },
        ] {
            let err = apply(Some(&state), "t1", &event).unwrap_err();
            assert!(matches!(err, TriggerError::InvalidTransition { .. }));
        }
    }

    #[test]
    fn events_against_missing_trigger_are_rejected() {
        let err = apply(None, "ghost", &TriggerEvent::Paused).unwrap_err();
        assert!(matches!(err, TriggerError::InvalidTransition { .. }));
    }
}
