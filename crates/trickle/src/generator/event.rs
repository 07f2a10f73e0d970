use super::GeneratorFunction;
use core::{convert::Infallible, fmt};

/// The default item of [`item_stream`]: the emission slot itself.
///
/// Its [`Display`](fmt::Display) form shows the time of day of `timestamp`
/// in UTC, not in the local time zone.
///
/// [`item_stream`]: crate::item_stream
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimpleEvent {
    /// Event time in milliseconds since the Unix epoch.
    pub timestamp: i64,
    /// Position of the event in its source's output, starting at zero.
    pub sequence: i64,
}

impl SimpleEvent {
    /// Creates an event.
    pub const fn new(timestamp: i64, sequence: i64) -> Self {
        Self {
            timestamp,
            sequence,
        }
    }
}

// Renders `HH:MM:SS.mmm` in UTC.
impl fmt::Display for SimpleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let millis_of_day = self.timestamp.rem_euclid(86_400_000);
        let (h, rem) = (millis_of_day / 3_600_000, millis_of_day % 3_600_000);
        let (m, rem) = (rem / 60_000, rem % 60_000);
        let (s, ms) = (rem / 1_000, rem % 1_000);
        write!(
            f,
            "SimpleEvent(timestamp={h:02}:{m:02}:{s:02}.{ms:03}, sequence={})",
            self.sequence
        )
    }
}

/// The identity [`GeneratorFunction`], producing a [`SimpleEvent`] per slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimpleEventFn;

impl GeneratorFunction<SimpleEvent> for SimpleEventFn {
    type Err = Infallible;

    #[inline]
    fn generate(&self, timestamp_millis: i64, sequence: i64) -> Result<SimpleEvent, Infallible> {
        Ok(SimpleEvent::new(timestamp_millis, sequence))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_renders_utc_time_of_day() {
        // 2024-01-01T12:34:56.789Z
        let event = SimpleEvent::new(1_704_112_496_789, 3);
        assert_eq!(
            event.to_string(),
            "SimpleEvent(timestamp=12:34:56.789, sequence=3)"
        );
    }

    #[test]
    fn display_ignores_local_time_zone() {
        assert_eq!(
            SimpleEvent::new(0, 0).to_string(),
            "SimpleEvent(timestamp=00:00:00.000, sequence=0)"
        );
        // One millisecond before the epoch wraps to the previous UTC day.
        assert_eq!(
            SimpleEvent::new(-1, 1).to_string(),
            "SimpleEvent(timestamp=23:59:59.999, sequence=1)"
        );
    }

    #[test]
    fn identity_generator_echoes_slot() {
        assert_eq!(SimpleEventFn.generate(200, 9), Ok(SimpleEvent::new(200, 9)));
    }
}
