//! Store seam between the core and persistence.
//!
//! The classifier, scheduler, and resolution depend only on the
//! `AppointmentStore` contract, never on connection lifecycle. Each call is
//! one self-contained transaction (autocommit); there are no
//! multi-statement guarantees across calls.

use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDateTime;
use rusqlite::Connection;

use crate::db::{self, DatabaseError};
use crate::models::{Appointment, AppointmentDraft};

pub trait AppointmentStore: Send + Sync {
    /// Persists a new record and returns the store-assigned id.
    fn create(&self, draft: &AppointmentDraft) -> Result<i64, DatabaseError>;

    /// Rewrites the user-editable fields. Always resets `notified` and
    /// `snooze_until`: an edited appointment is unacknowledged again.
    fn update(&self, id: i64, draft: &AppointmentDraft) -> Result<(), DatabaseError>;

    fn delete(&self, id: i64) -> Result<(), DatabaseError>;

    fn get(&self, id: i64) -> Result<Option<Appointment>, DatabaseError>;

    /// Every record, ordered by scheduled time ascending. Filtering happens
    /// in `status::apply_query`, outside the store.
    fn list(&self) -> Result<Vec<Appointment>, DatabaseError>;

    /// Records with `notified = false`, the scheduler's working set.
    fn list_unnotified(&self) -> Result<Vec<Appointment>, DatabaseError>;

    fn mark_done(&self, id: i64) -> Result<(), DatabaseError>;

    fn set_snooze(&self, id: i64, until: NaiveDateTime) -> Result<(), DatabaseError>;
}

/// `AppointmentStore` over a single SQLite connection. The mutex serializes
/// the scheduler thread against the caller's thread; SQLite autocommit gives
/// the one-call-one-transaction behavior the contract asks for.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, DatabaseError> {
        self.conn
            .lock()
            .map_err(|_| DatabaseError::ConstraintViolation("connection mutex poisoned".into()))
    }
}

impl AppointmentStore for SqliteStore {
    fn create(&self, draft: &AppointmentDraft) -> Result<i64, DatabaseError> {
        db::insert_appointment(&*self.conn()?, draft)
    }

    fn update(&self, id: i64, draft: &AppointmentDraft) -> Result<(), DatabaseError> {
        db::update_appointment(&*self.conn()?, id, draft)
    }

    fn delete(&self, id: i64) -> Result<(), DatabaseError> {
        db::delete_appointment(&*self.conn()?, id)
    }

    fn get(&self, id: i64) -> Result<Option<Appointment>, DatabaseError> {
        db::get_appointment(&*self.conn()?, id)
    }

    fn list(&self) -> Result<Vec<Appointment>, DatabaseError> {
        db::list_appointments(&*self.conn()?)
    }

    fn list_unnotified(&self) -> Result<Vec<Appointment>, DatabaseError> {
        db::list_unnotified(&*self.conn()?)
    }

    fn mark_done(&self, id: i64) -> Result<(), DatabaseError> {
        db::mark_done(&*self.conn()?, id)
    }

    fn set_snooze(&self, id: i64, until: NaiveDateTime) -> Result<(), DatabaseError> {
        db::set_snooze(&*self.conn()?, id, until)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;
    use crate::models::enums::RemindUnit;
    use chrono::NaiveDate;

    fn store() -> SqliteStore {
        SqliteStore::new(open_memory_database().unwrap())
    }

    fn draft(person: &str) -> AppointmentDraft {
        AppointmentDraft {
            person: person.into(),
            phone: None,
            address: None,
            notes: None,
            companions: None,
            scheduled_at: NaiveDate::from_ymd_opt(2026, 3, 1)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
            remind_amount: 2,
            remind_unit: RemindUnit::Hours,
        }
    }

    #[test]
    fn crud_through_the_trait() {
        let store = store();
        let id = store.create(&draft("Omar")).unwrap();

        let a = store.get(id).unwrap().unwrap();
        assert_eq!(a.person, "Omar");

        store.mark_done(id).unwrap();
        assert!(store.get(id).unwrap().unwrap().notified);
        assert!(store.list_unnotified().unwrap().is_empty());

        store.update(id, &draft("Omar")).unwrap();
        assert!(!store.get(id).unwrap().unwrap().notified);

        store.delete(id).unwrap();
        assert!(store.get(id).unwrap().is_none());
    }
}
