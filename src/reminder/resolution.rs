//! Reminder resolution — what the operator decided about a raised reminder.

use chrono::{Duration, NaiveDateTime};

use crate::db::DatabaseError;
use crate::store::AppointmentStore;

/// Deferral span chosen at resolution time, independent of the record's own
/// lead window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnoozeFor {
    Minutes(u32),
    Hours(u32),
}

impl SnoozeFor {
    pub fn minutes(&self) -> i64 {
        match self {
            Self::Minutes(n) => i64::from(*n),
            Self::Hours(n) => i64::from(*n) * 60,
        }
    }
}

/// Outcome of presenting a reminder. Done and Snooze are exclusive; Dismiss
/// leaves state untouched so the scheduler re-raises on the next tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderOutcome {
    Done,
    Snooze(SnoozeFor),
    Dismiss,
}

/// Applies an outcome to the triggering record.
///
/// Done sets `notified = true` and clears any snooze; it is terminal for
/// this record as far as reminders go, and idempotent. Snooze writes
/// `now + deferral` and keeps `notified = false`. Dismiss performs no write.
pub fn resolve(
    store: &dyn AppointmentStore,
    appointment_id: i64,
    outcome: ReminderOutcome,
    now: NaiveDateTime,
) -> Result<(), DatabaseError> {
    match outcome {
        ReminderOutcome::Done => store.mark_done(appointment_id),
        ReminderOutcome::Snooze(defer) => {
            store.set_snooze(appointment_id, now + Duration::minutes(defer.minutes()))
        }
        ReminderOutcome::Dismiss => Ok(()),
    }
}
