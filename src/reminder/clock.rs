use chrono::{Local, NaiveDateTime};

/// Injectable time source. The scheduler and resolution never read the wall
/// clock directly, so tests drive `now` explicitly.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Wall-clock time in the operator's local timezone, matching the naive
/// ISO-8601 timestamps in storage.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Clock pinned to a fixed instant. Use when a test needs deterministic
/// scheduling decisions.
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}
