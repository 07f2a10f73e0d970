use super::TimeSource;
use std::{
    sync::OnceLock,
    time::{Instant, SystemTime, UNIX_EPOCH},
};

/// Process-wide origin for [`SystemClock::monotonic_nanos`].
static ORIGIN: OnceLock<Instant> = OnceLock::new();

/// The operating system clocks.
///
/// Monotonic readings come from [`Instant`] measured against a process-wide
/// origin, so every `SystemClock` in the process agrees on them. Wall-clock
/// readings come from [`SystemTime`] and may jump if the system time is
/// adjusted; they are only used for timestamps, never for pacing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn monotonic_nanos(&self) -> i64 {
        let origin = ORIGIN.get_or_init(Instant::now);
        // Saturates after ~292 years of uptime.
        i64::try_from(origin.elapsed().as_nanos()).unwrap_or(i64::MAX)
    }

    fn wall_clock_nanos(&self) -> i64 {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(since) => i64::try_from(since.as_nanos()).unwrap_or(i64::MAX),
            Err(before) => i64::try_from(before.duration().as_nanos()).map_or(i64::MIN, |n| -n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monotonic_never_goes_backward() {
        let clock = SystemClock;
        let mut last = clock.monotonic_nanos();
        for _ in 0..10_000 {
            let now = clock.monotonic_nanos();
            assert!(now >= last, "{now} < {last}");
            last = now;
        }
    }

    #[test]
    fn wall_clock_is_after_2020() {
        // 2020-01-01T00:00:00Z
        assert!(SystemClock.wall_clock_millis() > 1_577_836_800_000);
    }
}
