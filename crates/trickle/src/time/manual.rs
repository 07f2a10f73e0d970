use super::{NANOS_PER_MILLI, TimeSource};
use core::time::Duration;
use portable_atomic::{AtomicI64, Ordering};
use std::sync::Arc;

#[derive(Debug)]
struct ManualClockInner {
    monotonic: AtomicI64,
    wall: AtomicI64,
}

/// A clock that only moves when told to.
///
/// Clones share the same readings, so a test can hand one clone to a source
/// and keep another to drive time forward.
///
/// # Example
///
/// ```
/// use core::time::Duration;
/// use trickle::{ManualClock, TimeSource};
///
/// let clock = ManualClock::new(0, 1_000);
/// let handle = clock.clone();
/// handle.advance(Duration::from_millis(5));
///
/// assert_eq!(clock.monotonic_nanos(), 5_000_000);
/// assert_eq!(clock.wall_clock_millis(), 1_005);
/// ```
#[derive(Clone, Debug)]
pub struct ManualClock {
    inner: Arc<ManualClockInner>,
}

impl ManualClock {
    /// Creates a clock with the given monotonic reading (nanoseconds) and
    /// wall-clock reading (milliseconds since the Unix epoch).
    pub fn new(monotonic_nanos: i64, wall_clock_millis: i64) -> Self {
        Self {
            inner: Arc::new(ManualClockInner {
                monotonic: AtomicI64::new(monotonic_nanos),
                wall: AtomicI64::new(wall_clock_millis.saturating_mul(NANOS_PER_MILLI)),
            }),
        }
    }

    /// Moves both readings forward by `by`.
    pub fn advance(&self, by: Duration) {
        let nanos = i64::try_from(by.as_nanos()).unwrap_or(i64::MAX);
        self.inner.monotonic.fetch_add(nanos, Ordering::Relaxed);
        self.inner.wall.fetch_add(nanos, Ordering::Relaxed);
    }

    /// Overrides the wall-clock reading, in nanoseconds since the Unix epoch.
    ///
    /// The monotonic reading is left untouched, which models a system clock
    /// adjustment.
    pub fn set_wall_clock_nanos(&self, nanos: i64) {
        self.inner.wall.store(nanos, Ordering::Relaxed);
    }
}

impl TimeSource for ManualClock {
    fn monotonic_nanos(&self) -> i64 {
        self.inner.monotonic.load(Ordering::Relaxed)
    }

    fn wall_clock_nanos(&self) -> i64 {
        self.inner.wall.load(Ordering::Relaxed)
    }
}
