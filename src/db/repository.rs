use std::str::FromStr;

use chrono::NaiveDateTime;
use rusqlite::{params, Connection};

use super::DatabaseError;
use crate::models::enums::RemindUnit;
use crate::models::{Appointment, AppointmentDraft};

/// Stored timestamp format. `created_at` rows written by SQLite's
/// CURRENT_TIMESTAMP use the space-separated variant instead.
const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

fn to_iso(dt: &NaiveDateTime) -> String {
    dt.format(ISO_FORMAT).to_string()
}

fn parse_dt(s: &str) -> Result<NaiveDateTime, DatabaseError> {
    NaiveDateTime::parse_from_str(s, ISO_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f"))
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S"))
        .map_err(|e| DatabaseError::ConstraintViolation(format!("bad timestamp {s:?}: {e}")))
}

// ═══════════════════════════════════════════
// Appointment Repository
// ═══════════════════════════════════════════

/// Inserts a new appointment. Acknowledgement fields start cleared; the
/// store assigns and returns the id.
pub fn insert_appointment(conn: &Connection, draft: &AppointmentDraft) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO appointments (person, phone, address, notes, companions,
         scheduled_at, remind_amount, remind_unit, notified, snooze_until)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 0, NULL)",
        params![
            draft.person,
            draft.phone,
            draft.address,
            draft.notes,
            draft.companions,
            to_iso(&draft.scheduled_at),
            draft.remind_amount,
            draft.remind_unit.as_str(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Updates every user-editable field and resets acknowledgement state:
/// an edited appointment is unacknowledged again.
pub fn update_appointment(
    conn: &Connection,
    id: i64,
    draft: &AppointmentDraft,
) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE appointments SET person=?1, phone=?2, address=?3, notes=?4, companions=?5,
         scheduled_at=?6, remind_amount=?7, remind_unit=?8, notified=0, snooze_until=NULL
         WHERE id=?9",
        params![
            draft.person,
            draft.phone,
            draft.address,
            draft.notes,
            draft.companions,
            to_iso(&draft.scheduled_at),
            draft.remind_amount,
            draft.remind_unit.as_str(),
            id,
        ],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Appointment".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

/// Deletes an appointment permanently (no soft delete).
pub fn delete_appointment(conn: &Connection, id: i64) -> Result<(), DatabaseError> {
    let changed = conn.execute("DELETE FROM appointments WHERE id=?1", params![id])?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Appointment".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

const SELECT_COLUMNS: &str = "id, person, phone, address, notes, companions,
         scheduled_at, remind_amount, remind_unit, notified, snooze_until, created_at";

pub fn get_appointment(conn: &Connection, id: i64) -> Result<Option<Appointment>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {SELECT_COLUMNS} FROM appointments WHERE id = ?1"
    ))?;

    let result = stmt.query_row(params![id], row_to_parts);

    match result {
        Ok(row) => Ok(Some(appointment_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Lists every appointment ordered by scheduled time ascending.
pub fn list_appointments(conn: &Connection) -> Result<Vec<Appointment>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {SELECT_COLUMNS} FROM appointments ORDER BY datetime(scheduled_at) ASC"
    ))?;
    let rows = stmt.query_map([], row_to_parts)?;
    rows.map(|r| appointment_from_row(r?))
        .collect::<Result<Vec<_>, _>>()
}

/// Lists appointments not yet acknowledged as handled: the scheduler's
/// per-tick working set.
pub fn list_unnotified(conn: &Connection) -> Result<Vec<Appointment>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {SELECT_COLUMNS} FROM appointments WHERE notified = 0
         ORDER BY datetime(scheduled_at) ASC"
    ))?;
    let rows = stmt.query_map([], row_to_parts)?;
    rows.map(|r| appointment_from_row(r?))
        .collect::<Result<Vec<_>, _>>()
}

/// Marks a reminder as handled. Clears any pending snooze so that
/// `notified = true` always implies `snooze_until = NULL`.
pub fn mark_done(conn: &Connection, id: i64) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE appointments SET notified=1, snooze_until=NULL WHERE id=?1",
        params![id],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Appointment".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

/// Defers a reminder until the given time. `notified` stays false.
pub fn set_snooze(conn: &Connection, id: i64, until: NaiveDateTime) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE appointments SET snooze_until=?1 WHERE id=?2",
        params![to_iso(&until), id],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Appointment".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

// Internal row type for Appointment mapping
struct AppointmentRow {
    id: i64,
    person: String,
    phone: Option<String>,
    address: Option<String>,
    notes: Option<String>,
    companions: Option<String>,
    scheduled_at: String,
    remind_amount: u32,
    remind_unit: String,
    notified: i32,
    snooze_until: Option<String>,
    created_at: Option<String>,
}

fn row_to_parts(row: &rusqlite::Row<'_>) -> Result<AppointmentRow, rusqlite::Error> {
    Ok(AppointmentRow {
        id: row.get(0)?,
        person: row.get(1)?,
        phone: row.get(2)?,
        address: row.get(3)?,
        notes: row.get(4)?,
        companions: row.get(5)?,
        scheduled_at: row.get(6)?,
        remind_amount: row.get(7)?,
        remind_unit: row.get(8)?,
        notified: row.get(9)?,
        snooze_until: row.get(10)?,
        created_at: row.get(11)?,
    })
}

fn appointment_from_row(row: AppointmentRow) -> Result<Appointment, DatabaseError> {
    Ok(Appointment {
        id: row.id,
        person: row.person,
        phone: row.phone,
        address: row.address,
        notes: row.notes,
        companions: row.companions,
        scheduled_at: parse_dt(&row.scheduled_at)?,
        remind_amount: row.remind_amount,
        remind_unit: RemindUnit::from_str(&row.remind_unit)?,
        notified: row.notified != 0,
        snooze_until: row.snooze_until.as_deref().map(parse_dt).transpose()?,
        created_at: row
            .created_at
            .as_deref()
            .and_then(|s| parse_dt(s).ok())
            .unwrap_or_default(),
    })
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;
    use chrono::NaiveDate;

    fn dt(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, 0)
            .unwrap()
    }

    fn draft(person: &str, scheduled_at: NaiveDateTime) -> AppointmentDraft {
        AppointmentDraft {
            person: person.into(),
            phone: Some("0780 111 222".into()),
            address: Some("Media Office, 2nd floor".into()),
            notes: Some("Bring the signed letter.".into()),
            companions: Some("Ali, Sara".into()),
            scheduled_at,
            remind_amount: 1,
            remind_unit: RemindUnit::Days,
        }
    }

    #[test]
    fn insert_then_get_roundtrip() {
        let conn = open_memory_database().unwrap();
        let id = insert_appointment(&conn, &draft("Omar", dt(2026, 3, 1, 10, 30))).unwrap();
        assert!(id > 0);

        let a = get_appointment(&conn, id).unwrap().unwrap();
        assert_eq!(a.person, "Omar");
        assert_eq!(a.phone.as_deref(), Some("0780 111 222"));
        assert_eq!(a.scheduled_at, dt(2026, 3, 1, 10, 30));
        assert_eq!(a.remind_unit, RemindUnit::Days);
        assert!(!a.notified);
        assert!(a.snooze_until.is_none());
    }

    #[test]
    fn get_missing_returns_none() {
        let conn = open_memory_database().unwrap();
        assert!(get_appointment(&conn, 404).unwrap().is_none());
    }

    #[test]
    fn update_resets_acknowledgement() {
        let conn = open_memory_database().unwrap();
        let id = insert_appointment(&conn, &draft("Omar", dt(2026, 3, 1, 10, 30))).unwrap();
        mark_done(&conn, id).unwrap();
        assert!(get_appointment(&conn, id).unwrap().unwrap().notified);

        let mut d = draft("Omar", dt(2026, 3, 2, 9, 0));
        d.phone = None;
        update_appointment(&conn, id, &d).unwrap();

        let a = get_appointment(&conn, id).unwrap().unwrap();
        assert!(!a.notified);
        assert!(a.snooze_until.is_none());
        assert_eq!(a.scheduled_at, dt(2026, 3, 2, 9, 0));
        assert!(a.phone.is_none());
    }

    #[test]
    fn update_missing_is_not_found() {
        let conn = open_memory_database().unwrap();
        let err = update_appointment(&conn, 404, &draft("X", dt(2026, 1, 1, 0, 0))).unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }

    #[test]
    fn delete_removes_permanently() {
        let conn = open_memory_database().unwrap();
        let id = insert_appointment(&conn, &draft("Omar", dt(2026, 3, 1, 10, 30))).unwrap();
        delete_appointment(&conn, id).unwrap();
        assert!(get_appointment(&conn, id).unwrap().is_none());
        assert!(matches!(
            delete_appointment(&conn, id),
            Err(DatabaseError::NotFound { .. })
        ));
    }

    #[test]
    fn list_is_ordered_by_schedule() {
        let conn = open_memory_database().unwrap();
        insert_appointment(&conn, &draft("Later", dt(2026, 3, 2, 9, 0))).unwrap();
        insert_appointment(&conn, &draft("Sooner", dt(2026, 3, 1, 9, 0))).unwrap();

        let all = list_appointments(&conn).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].person, "Sooner");
        assert_eq!(all[1].person, "Later");
    }

    #[test]
    fn unnotified_excludes_done() {
        let conn = open_memory_database().unwrap();
        let a = insert_appointment(&conn, &draft("A", dt(2026, 3, 1, 9, 0))).unwrap();
        insert_appointment(&conn, &draft("B", dt(2026, 3, 1, 10, 0))).unwrap();
        mark_done(&conn, a).unwrap();

        let pending = list_unnotified(&conn).unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].person, "B");
    }

    #[test]
    fn mark_done_is_idempotent_and_clears_snooze() {
        let conn = open_memory_database().unwrap();
        let id = insert_appointment(&conn, &draft("A", dt(2026, 3, 1, 9, 0))).unwrap();
        set_snooze(&conn, id, dt(2026, 3, 1, 8, 0)).unwrap();

        mark_done(&conn, id).unwrap();
        mark_done(&conn, id).unwrap();

        let a = get_appointment(&conn, id).unwrap().unwrap();
        assert!(a.notified);
        assert!(a.snooze_until.is_none());
    }

    #[test]
    fn set_snooze_keeps_notified_false() {
        let conn = open_memory_database().unwrap();
        let id = insert_appointment(&conn, &draft("A", dt(2026, 3, 1, 9, 0))).unwrap();
        set_snooze(&conn, id, dt(2026, 3, 1, 8, 15)).unwrap();

        let a = get_appointment(&conn, id).unwrap().unwrap();
        assert!(!a.notified);
        assert_eq!(a.snooze_until, Some(dt(2026, 3, 1, 8, 15)));
    }
}
