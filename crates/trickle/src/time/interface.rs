/// Nanoseconds in one second.
pub const NANOS_PER_SECOND: i64 = 1_000_000_000;

/// Nanoseconds in one millisecond.
pub const NANOS_PER_MILLI: i64 = 1_000_000;

/// A pair of clocks used by the paced sources.
///
/// The two readings serve different purposes and must never be mixed:
///
/// - [`TimeSource::monotonic_nanos`] is only compared against itself to decide
///   whether the next item is due. Its origin is arbitrary but it never goes
///   backward.
/// - [`TimeSource::wall_clock_nanos`] is calendar time since the Unix epoch and
///   is only used to compute the timestamps attached to emitted items.
///
/// This abstraction allows plugging in the real system clocks or a
/// [`ManualClock`] in tests and simulations.
///
/// # Example
///
/// ```
/// use trickle::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn monotonic_nanos(&self) -> i64 {
///         42
///     }
///     fn wall_clock_nanos(&self) -> i64 {
///         1_700_000_000_000_000_000
///     }
/// }
///
/// let time = FixedTime;
/// assert_eq!(time.wall_clock_millis(), 1_700_000_000_000);
/// ```
///
/// [`ManualClock`]: crate::ManualClock
pub trait TimeSource {
    /// Returns the current reading of a non-decreasing clock, in nanoseconds.
    fn monotonic_nanos(&self) -> i64;

    /// Returns the current calendar time in nanoseconds since the Unix epoch.
    fn wall_clock_nanos(&self) -> i64;

    /// Returns the current calendar time in milliseconds since the Unix epoch.
    fn wall_clock_millis(&self) -> i64 {
        self.wall_clock_nanos().div_euclid(NANOS_PER_MILLI)
    }
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn monotonic_nanos(&self) -> i64 {
        (**self).monotonic_nanos()
    }

    fn wall_clock_nanos(&self) -> i64 {
        (**self).wall_clock_nanos()
    }
}
