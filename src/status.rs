//! Display status derivation and list filtering.
//!
//! `classify` is a pure function of the acknowledgement fields, the
//! scheduled time, and the caller-supplied `now`. Evaluation order is
//! significant and fixed: Done, then Snoozed, then Late, then Upcoming.
//! A snooze timestamp that has already elapsed still reports Snoozed for
//! display and filtering, even though the scheduler treats it as expired
//! and re-raises the reminder.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::models::{Appointment, FilterMode, ListQuery};

/// Derived, display-facing classification of an appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Status {
    Done,
    Snoozed,
    Late,
    Upcoming,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Done => "done",
            Self::Snoozed => "snoozed",
            Self::Late => "late",
            Self::Upcoming => "upcoming",
        }
    }
}

/// First match wins; order must not be rearranged.
pub fn classify(
    notified: bool,
    snooze_until: Option<NaiveDateTime>,
    scheduled_at: NaiveDateTime,
    now: NaiveDateTime,
) -> Status {
    if notified {
        return Status::Done;
    }
    if snooze_until.is_some() {
        return Status::Snoozed;
    }
    if scheduled_at < now {
        return Status::Late;
    }
    Status::Upcoming
}

/// Date-only predicate for the "today" filter. Independent of the status
/// ordering: it never consults acknowledgement state.
pub fn is_today(scheduled_at: NaiveDateTime, now: NaiveDateTime) -> bool {
    scheduled_at.date() == now.date()
}

fn status_of(a: &Appointment, now: NaiveDateTime) -> Status {
    classify(a.notified, a.snooze_until, a.scheduled_at, now)
}

fn matches_search(a: &Appointment, needle: &str) -> bool {
    let haystack = [
        Some(a.person.as_str()),
        a.phone.as_deref(),
        a.address.as_deref(),
        a.notes.as_deref(),
        a.companions.as_deref(),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(" ")
    .to_lowercase();
    haystack.contains(needle)
}

/// Pure filter over the full record set: mode first, then live-search text
/// across person, phone, address, notes, and companions.
pub fn apply_query(records: &[Appointment], query: &ListQuery, now: NaiveDateTime) -> Vec<Appointment> {
    let needle = query
        .search
        .as_deref()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());

    records
        .iter()
        .filter(|a| match query.mode {
            FilterMode::All => true,
            FilterMode::Today => is_today(a.scheduled_at, now),
            FilterMode::Late => status_of(a, now) == Status::Late,
            FilterMode::Done => a.notified,
        })
        .filter(|a| needle.as_deref().map_or(true, |n| matches_search(a, n)))
        .cloned()
        .collect()
}
