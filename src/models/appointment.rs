use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::enums::RemindUnit;
use super::ValidationError;

/// A persisted appointment record. `id` is assigned by the store and never
/// changes; `notified`/`snooze_until` are owned by reminder resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: i64,
    pub person: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
    pub companions: Option<String>,
    pub scheduled_at: NaiveDateTime,
    pub remind_amount: u32,
    pub remind_unit: RemindUnit,
    pub notified: bool,
    pub snooze_until: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
}

impl Appointment {
    /// Lead window in seconds: the span before `scheduled_at` during which
    /// a reminder may fire.
    pub fn lead_seconds(&self) -> i64 {
        i64::from(self.remind_amount) * self.remind_unit.seconds()
    }
}

/// User-editable fields of an appointment, used for both create and update.
/// Acknowledgement state (`notified`, `snooze_until`) is intentionally not
/// part of the draft: saving one always resets it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentDraft {
    pub person: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
    pub companions: Option<String>,
    pub scheduled_at: NaiveDateTime,
    pub remind_amount: u32,
    pub remind_unit: RemindUnit,
}

impl AppointmentDraft {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.person.trim().is_empty() {
            return Err(ValidationError::PersonRequired);
        }
        if self.remind_amount < 1 {
            return Err(ValidationError::ReminderAmountZero);
        }
        Ok(())
    }
}

/// Parses a user-entered schedule timestamp. Accepts ISO-8601 with either a
/// `T` or a space separator, with or without seconds.
pub fn parse_scheduled_at(input: &str) -> Result<NaiveDateTime, ValidationError> {
    const FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ];
    for fmt in FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(input.trim(), fmt) {
            return Ok(dt);
        }
    }
    Err(ValidationError::BadTimestamp(input.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn draft() -> AppointmentDraft {
        AppointmentDraft {
            person: "Omar Hassan".into(),
            phone: Some("0770 000 000".into()),
            address: None,
            notes: None,
            companions: None,
            scheduled_at: NaiveDate::from_ymd_opt(2026, 3, 1)
                .unwrap()
                .and_hms_opt(10, 30, 0)
                .unwrap(),
            remind_amount: 1,
            remind_unit: RemindUnit::Days,
        }
    }

    #[test]
    fn valid_draft_passes() {
        assert!(draft().validate().is_ok());
    }

    #[test]
    fn blank_person_rejected() {
        let mut d = draft();
        d.person = "   ".into();
        assert!(matches!(d.validate(), Err(ValidationError::PersonRequired)));
    }

    #[test]
    fn zero_remind_amount_rejected() {
        let mut d = draft();
        d.remind_amount = 0;
        assert!(matches!(
            d.validate(),
            Err(ValidationError::ReminderAmountZero)
        ));
    }

    #[test]
    fn lead_seconds_combines_amount_and_unit() {
        let mut a = Appointment {
            id: 1,
            person: "X".into(),
            phone: None,
            address: None,
            notes: None,
            companions: None,
            scheduled_at: draft().scheduled_at,
            remind_amount: 2,
            remind_unit: RemindUnit::Hours,
            notified: false,
            snooze_until: None,
            created_at: draft().scheduled_at,
        };
        assert_eq!(a.lead_seconds(), 7_200);
        a.remind_unit = RemindUnit::Minutes;
        assert_eq!(a.lead_seconds(), 120);
    }

    #[test]
    fn parse_accepts_common_iso_shapes() {
        for input in [
            "2026-03-01T10:30:00",
            "2026-03-01T10:30",
            "2026-03-01 10:30:00",
            " 2026-03-01 10:30 ",
        ] {
            let dt = parse_scheduled_at(input).unwrap();
            assert_eq!(dt.format("%Y-%m-%d %H:%M").to_string(), "2026-03-01 10:30");
        }
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(matches!(
            parse_scheduled_at("tomorrow-ish"),
            Err(ValidationError::BadTimestamp(_))
        ));
    }
}
