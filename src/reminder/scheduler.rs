//! Reminder scheduler — periodic due-window scan.
//!
//! Spawns a background thread that every tick (default 60 s) fetches the
//! unacknowledged records, runs the pure `scan_due` check, and emits a
//! `ReminderEvent` per due record onto an mpsc channel. The consumer
//! resolves events (Done/Snooze/Dismiss) and writes back through the store;
//! the tick itself never blocks on user interaction. A record that stays
//! unresolved is re-emitted on every tick while it remains inside its lead
//! window.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;

use crate::models::Appointment;
use crate::reminder::clock::Clock;
use crate::store::AppointmentStore;

/// Default tick interval: once a minute.
pub const TICK_INTERVAL_SECS: u64 = 60;

/// Sleep granularity for shutdown responsiveness (5 seconds).
const SLEEP_GRANULARITY_SECS: u64 = 5;

/// A due reminder, carrying what the presenter needs to show.
#[derive(Debug, Clone, PartialEq)]
pub struct ReminderEvent {
    pub appointment_id: i64,
    pub person: String,
    pub companions: Option<String>,
    pub scheduled_at: NaiveDateTime,
}

/// Pure due-window scan over one tick's working set.
///
/// A record is due when `remaining = scheduled_at - now` lies inside
/// `[0, lead]`, both bounds inclusive. A pending snooze defers the record
/// while `now < snooze_until`; once elapsed it no longer shields the
/// record. A negative `remaining` is never due: a window that passed
/// entirely while the process was down surfaces as Late only.
pub fn scan_due(records: &[Appointment], now: NaiveDateTime) -> Vec<ReminderEvent> {
    records
        .iter()
        .filter(|a| !a.notified)
        .filter(|a| a.snooze_until.map_or(true, |until| now >= until))
        .filter(|a| {
            let remaining = (a.scheduled_at - now).num_seconds();
            remaining >= 0 && remaining <= a.lead_seconds()
        })
        .map(|a| ReminderEvent {
            appointment_id: a.id,
            person: a.person.clone(),
            companions: a.companions.clone(),
            scheduled_at: a.scheduled_at,
        })
        .collect()
}

/// Handle for the background scheduler thread.
///
/// Supports graceful shutdown via `shutdown()` or automatic cleanup on
/// `Drop`.
pub struct SchedulerHandle {
    shutdown: Arc<AtomicBool>,
    handle: Option<std::thread::JoinHandle<()>>,
}

impl SchedulerHandle {
    /// Request graceful shutdown. The current tick (if running) completes,
    /// but no new tick starts.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }
}

impl Drop for SchedulerHandle {
    fn drop(&mut self) {
        self.shutdown();
        if let Some(h) = self.handle.take() {
            let _ = h.join();
        }
    }
}

/// Start the reminder scheduler on a separate thread.
///
/// Events flow into `events`; the loop exits when the receiver is dropped
/// or `shutdown()` is requested.
pub fn start_scheduler(
    store: Arc<dyn AppointmentStore>,
    clock: Arc<dyn Clock>,
    events: Sender<ReminderEvent>,
    tick: Duration,
) -> SchedulerHandle {
    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = shutdown.clone();

    let handle = std::thread::spawn(move || {
        tracing::info!("Reminder scheduler started (tick every {:?})", tick);
        scheduler_loop(&*store, &*clock, &events, tick, &flag);
        tracing::info!("Reminder scheduler shut down");
    });

    SchedulerHandle {
        shutdown,
        handle: Some(handle),
    }
}

fn scheduler_loop(
    store: &dyn AppointmentStore,
    clock: &dyn Clock,
    events: &Sender<ReminderEvent>,
    tick: Duration,
    shutdown: &AtomicBool,
) {
    let granule = tick.min(Duration::from_secs(SLEEP_GRANULARITY_SECS));
    loop {
        // Sleep in small increments for responsive shutdown
        let mut slept = Duration::ZERO;
        while slept < tick {
            if shutdown.load(Ordering::Relaxed) {
                return;
            }
            std::thread::sleep(granule);
            slept += granule;
        }

        if shutdown.load(Ordering::Relaxed) {
            return;
        }

        match run_tick(store, clock, events) {
            Ok(true) => {}
            Ok(false) => return, // receiver gone, nothing left to notify
            Err(e) => tracing::warn!(error = %e, "Reminder tick failed; will retry next tick"),
        }
    }
}

/// One tick: scan and emit. Returns Ok(false) once the event receiver has
/// been dropped.
fn run_tick(
    store: &dyn AppointmentStore,
    clock: &dyn Clock,
    events: &Sender<ReminderEvent>,
) -> Result<bool, crate::db::DatabaseError> {
    let now = clock.now();
    let pending = store.list_unnotified()?;
    let due = scan_due(&pending, now);
    if !due.is_empty() {
        tracing::debug!(count = due.len(), "Due reminders this tick");
    }
    for event in due {
        if events.send(event).is_err() {
            return Ok(false);
        }
    }
    Ok(true)
}

// ─── Tests ────────────────────────────────────────────────────────────────────
