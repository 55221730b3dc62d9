//! Injectable time source.
//!
//! Lifecycle operations take the current instant as an argument. Callers
//! obtain it from a [`Clock`], so tests can pin time with [`ManualClock`].

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use jiff::{SignedDuration, Timestamp};

/// Source of the current instant.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> Timestamp;
}

/// Wall-clock time from the operating system.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same underlying instant.
#[derive(Debug, Clone)]
pub struct ManualClock {
    nanos: Arc<AtomicI64>,
}

impl ManualClock {
    /// Creates a clock frozen at `start`.
    ///
    /// Precision is limited to nanoseconds representable in an `i64`, which
    /// covers the years 1677 through 2262.
    pub fn new(start: Timestamp) -> Self {
        Self {
            nanos: Arc::new(AtomicI64::new(Self::to_nanos(start))),
        }
    }

    /// Moves the clock forward (or backward for negative durations).
    pub fn advance(&self, by: SignedDuration) {
        let delta = i64::try_from(by.as_nanos()).unwrap_or(i64::MAX);
        self.nanos.fetch_add(delta, Ordering::SeqCst);
    }

    /// Sets the clock to `at`.
    pub fn set(&self, at: Timestamp) {
        self.nanos.store(Self::to_nanos(at), Ordering::SeqCst);
    }

    fn to_nanos(at: Timestamp) -> i64 {
        i64::try_from(at.as_nanosecond()).unwrap_or(i64::MAX)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        let nanos = self.nanos.load(Ordering::SeqCst);
        Timestamp::from_nanosecond(i128::from(nanos)).unwrap_or(Timestamp::MAX)
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    #[inline]
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_is_frozen_until_advanced() {
        let start: Timestamp = "2025-05-01T12:00:00Z".parse().unwrap();
        let clock = ManualClock::new(start);
        assert_eq!(clock.now(), start);
        assert_eq!(clock.now(), start);

        clock.advance(SignedDuration::from_hours(24));
        assert_eq!(clock.now(), "2025-05-02T12:00:00Z".parse().unwrap());
    }

    #[test]
    fn manual_clock_clones_share_time() {
        let clock = ManualClock::new(Timestamp::UNIX_EPOCH);
        let shared = clock.clone();
        clock.set("2030-01-01T00:00:00Z".parse().unwrap());
        assert_eq!(shared.now(), clock.now());
    }

    #[test]
    fn system_clock_moves_forward() {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let first = clock.now();
        assert!(clock.now() >= first);
    }
}
