//! # Temporal Model
//!
//! Every time-window calculation in adgate reads "now" through the
//! [`Clock`] trait. [`SystemClock`] is the only place in the workspace that
//! touches wall-clock time; [`ManualClock`] moves only when a test tells it
//! to, which keeps frequency-cap decisions reproducible.
//!
//! All instants are UTC.

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;

/// Source of the current instant.
pub trait Clock: Send + Sync {
    /// Return the current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Clock backed by the system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to.
///
/// Intended for single-threaded tests; sharing it behind an `Arc` is safe,
/// but advancing it while deliveries run concurrently makes decisions
/// depend on scheduling.
#[derive(Debug)]
pub struct ManualClock {
    now: RwLock<DateTime<Utc>>,
}

impl ManualClock {
    /// Create a clock frozen at `start`.
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: RwLock::new(start),
        }
    }

    /// Move the clock forward (or backward, for a negative duration).
    pub fn advance_by(&self, duration: Duration) {
        let mut now = self.now.write();
        *now = now.checked_add_signed(duration).unwrap_or(*now);
    }

    /// Jump the clock to an absolute instant.
    pub fn set(&self, instant: DateTime<Utc>) {
        *self.now.write() = instant;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read()
    }
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

/// Start of the trailing window `[now - window, now]`.
///
/// Saturates at the earliest representable instant instead of overflowing.
pub fn window_start(now: DateTime<Utc>, window: Duration) -> DateTime<Utc> {
    now.checked_sub_signed(window)
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Convert a whole number of seconds into a [`Duration`], saturating at
/// the largest representable duration.
pub fn seconds(secs: u64) -> Duration {
    i64::try_from(secs)
        .ok()
        .and_then(Duration::try_seconds)
        .unwrap_or(Duration::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn epoch() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn manual_clock_is_frozen() {
        let clock = ManualClock::new(epoch());
        assert_eq!(clock.now(), clock.now());
        assert_eq!(clock.now(), epoch());
    }

    #[test]
    fn manual_clock_advances() {
        let clock = ManualClock::new(epoch());
        clock.advance_by(Duration::minutes(61));
        assert_eq!(clock.now(), epoch() + Duration::minutes(61));
    }

    #[test]
    fn manual_clock_set_jumps() {
        let clock = ManualClock::new(epoch());
        let later = epoch() + Duration::days(3);
        clock.set(later);
        assert_eq!(clock.now(), later);
    }

    #[test]
    fn manual_clock_through_arc() {
        let clock = std::sync::Arc::new(ManualClock::new(epoch()));
        clock.advance_by(Duration::seconds(1));
        assert_eq!(Clock::now(&clock), epoch() + Duration::seconds(1));
    }

    #[test]
    fn window_start_subtracts() {
        assert_eq!(
            window_start(epoch(), Duration::hours(1)),
            epoch() - Duration::hours(1)
        );
    }

    #[test]
    fn window_start_saturates() {
        assert_eq!(
            window_start(epoch(), Duration::MAX),
            DateTime::<Utc>::MIN_UTC
        );
    }

    #[test]
    fn seconds_converts_and_saturates() {
        assert_eq!(seconds(3600), Duration::hours(1));
        assert_eq!(seconds(u64::MAX), Duration::MAX);
    }

    #[test]
    fn system_clock_moves_forward() {
        let clock = SystemClock;
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
