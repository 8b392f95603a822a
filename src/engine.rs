//! Engine facade: wires the store, the clock, the scheduler thread, and
//! resolution into one owner. The scheduler emits onto a channel; the
//! embedding shell drains `events()` and answers with `resolve()`, so the
//! tick thread itself never blocks on user interaction.

use std::sync::mpsc::{Receiver, Sender};
use std::sync::{mpsc, Arc};
use std::time::Duration;

use crate::db::DatabaseError;
use crate::models::Appointment;
use crate::reminder::{
    resolution, start_scheduler, Clock, ReminderEvent, ReminderOutcome, SchedulerHandle,
};
use crate::store::AppointmentStore;

pub struct ReminderEngine {
    store: Arc<dyn AppointmentStore>,
    clock: Arc<dyn Clock>,
    events: Receiver<ReminderEvent>,
    scheduler: SchedulerHandle,
}

impl ReminderEngine {
    /// Starts the scheduler with the standard one-minute tick.
    pub fn start_default(store: Arc<dyn AppointmentStore>, clock: Arc<dyn Clock>) -> Self {
        Self::start(
            store,
            clock,
            Duration::from_secs(crate::reminder::TICK_INTERVAL_SECS),
        )
    }

    /// Starts the scheduler thread with the given tick interval.
    pub fn start(
        store: Arc<dyn AppointmentStore>,
        clock: Arc<dyn Clock>,
        tick: Duration,
    ) -> Self {
        let (tx, rx): (Sender<ReminderEvent>, Receiver<ReminderEvent>) = mpsc::channel();
        let scheduler = start_scheduler(store.clone(), clock.clone(), tx, tick);
        Self {
            store,
            clock,
            events: rx,
            scheduler,
        }
    }

    /// The stream of due reminders. Dismissed or unanswered events recur on
    /// later ticks while the record stays inside its lead window.
    pub fn events(&self) -> &Receiver<ReminderEvent> {
        &self.events
    }

    /// Applies the operator's decision for a raised reminder.
    pub fn resolve(&self, appointment_id: i64, outcome: ReminderOutcome) -> Result<(), DatabaseError> {
        resolution::resolve(&*self.store, appointment_id, outcome, self.clock.now())
    }

    /// Fresh snapshot of every record, for re-deriving statuses after a
    /// resolution.
    pub fn records(&self) -> Result<Vec<Appointment>, DatabaseError> {
        self.store.list()
    }

    pub fn store(&self) -> &dyn AppointmentStore {
        &*self.store
    }

    /// Stops the scheduler thread. Also happens on drop.
    pub fn shutdown(&self) {
        self.scheduler.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;
    use crate::models::enums::RemindUnit;
    use crate::models::AppointmentDraft;
    use crate::reminder::{FixedClock, SnoozeFor};
    use crate::status::{classify, Status};
    use crate::store::SqliteStore;
    use chrono::{Duration as ChronoDuration, NaiveDate};

    fn now() -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 10)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn engine_with_due_record() -> (ReminderEngine, i64) {
        let store = Arc::new(SqliteStore::new(open_memory_database().unwrap()));
        let id = store
            .create(&AppointmentDraft {
                person: "Omar".into(),
                phone: None,
                address: None,
                notes: None,
                companions: None,
                scheduled_at: now() + ChronoDuration::minutes(30),
                remind_amount: 1,
                remind_unit: RemindUnit::Hours,
            })
            .unwrap();
        let engine = ReminderEngine::start(
            store,
            Arc::new(FixedClock(now())),
            Duration::from_millis(10),
        );
        (engine, id)
    }

    #[test]
    fn tick_event_resolve_done_roundtrip() {
        let (engine, id) = engine_with_due_record();

        let event = engine
            .events()
            .recv_timeout(Duration::from_secs(5))
            .unwrap();
        assert_eq!(event.appointment_id, id);

        engine.resolve(id, ReminderOutcome::Done).unwrap();
        let record = &engine.records().unwrap()[0];
        assert_eq!(
            classify(record.notified, record.snooze_until, record.scheduled_at, now()),
            Status::Done
        );
        engine.shutdown();
    }

    #[test]
    fn snooze_silences_subsequent_ticks() {
        let (engine, id) = engine_with_due_record();
        engine
            .events()
            .recv_timeout(Duration::from_secs(5))
            .unwrap();

        engine
            .resolve(id, ReminderOutcome::Snooze(SnoozeFor::Minutes(10)))
            .unwrap();

        // let any in-flight tick that scanned pre-snooze state land, drain
        // it, then expect quiet
        std::thread::sleep(Duration::from_millis(50));
        while engine.events().try_recv().is_ok() {}
        std::thread::sleep(Duration::from_millis(100));
        assert!(engine.events().try_recv().is_err());

        let record = &engine.records().unwrap()[0];
        assert_eq!(
            classify(record.notified, record.snooze_until, record.scheduled_at, now()),
            Status::Snoozed
        );
        engine.shutdown();
    }
}
