//! A clock tests can move by hand.

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use rigcert_types::Clock;

/// A [`Clock`] that only moves when told to.
///
/// Unlike [`FixedClock`](rigcert_types::FixedClock), a `ManualClock` can be
/// shared with a generator and advanced between calls, which is how ordering
/// across seconds is exercised.
///
/// # Example
///
/// ```
/// use chrono::Duration;
/// use rigcert_test_utils::{ManualClock, fixed_instant};
/// use rigcert_types::Clock;
///
/// let clock = ManualClock::new(fixed_instant());
/// let before = clock.now();
/// clock.advance(Duration::seconds(1));
/// assert!(clock.now() > before);
/// ```
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// Creates a clock reading `start`.
    #[must_use]
    pub fn new(start: DateTime<Utc>) -> Self {
        Self { now: Mutex::new(start) }
    }

    /// Moves the clock forward (or backward, for a negative step).
    pub fn advance(&self, step: Duration) {
        let mut now = self.now.lock();
        *now += step;
    }

    /// Sets the clock to `instant`.
    pub fn set(&self, instant: DateTime<Utc>) {
        *self.now.lock() = instant;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}
