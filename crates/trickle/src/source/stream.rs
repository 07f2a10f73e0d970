use crate::{
    Error, GeneratorFunction, NANOS_PER_MILLI, NANOS_PER_SECOND, Poll, Result, SystemClock,
    TimeSource, TimestampedSourceBuffer,
};
use core::{convert::Infallible, marker::PhantomData};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Upper bound on the items a single poll may add to its buffer.
///
/// After a long pause the schedule may be far behind the clock; the backlog is
/// then worked off over several polls instead of in one unbounded burst.
pub const MAX_BATCH_SIZE: usize = 1024;

/// Highest accepted `items_per_second`: one item per nanosecond.
pub const MAX_ITEMS_PER_SECOND: i64 = NANOS_PER_SECOND;

/// Validates a target rate and returns the emission period in nanoseconds.
///
/// The period is truncated towards zero, so rates that do not divide one
/// second evenly run slightly fast.
///
/// # Errors
///
/// Returns [`Error::InvalidRate`] unless `1 <= items_per_second <= 10^9`.
pub fn period_nanos(items_per_second: i64) -> Result<i64> {
    if items_per_second <= 0 || items_per_second > MAX_ITEMS_PER_SECOND {
        return Err(Error::InvalidRate {
            value: items_per_second,
        });
    }
    Ok(NANOS_PER_SECOND / items_per_second)
}

/// Floors a wall-clock reading to a multiple of `period_nanos` and converts it
/// to milliseconds, rounding down.
///
/// The result is never later than `wall_nanos`.
#[inline]
pub const fn bucket_millis(wall_nanos: i64, period_nanos: i64) -> i64 {
    let floored = wall_nanos - wall_nanos.rem_euclid(period_nanos);
    floored.div_euclid(NANOS_PER_MILLI)
}

/// A rate-limited, unbounded stream of timestamped items.
///
/// Each call to [`ItemStream::fill_buffer`] checks the monotonic clock against
/// an internal emission schedule and emits every item that has become due, up
/// to [`MAX_BATCH_SIZE`]. It never blocks or sleeps: pacing comes entirely from
/// the driver polling repeatedly.
///
/// All items of one poll share a timestamp: the wall clock floored to a
/// multiple of the emission period. Timestamps are therefore never in the
/// future, and items generated within the same period group together.
///
/// ## Features
/// - ❌ Not thread-safe: one instance belongs to one polling task
/// - ✅ Never blocks
/// - ✅ Gapless sequence numbers starting at zero
/// - ❌ Not fault-tolerant: a new instance starts over at sequence zero
///
/// There is no guarantee the actual rate matches the target exactly.
///
/// # Example
///
/// ```
/// use core::time::Duration;
/// use trickle::{ItemStream, ManualClock, Poll, SimpleEventFn, TimestampedVecBuffer};
///
/// let clock = ManualClock::new(0, 1_000);
/// let mut stream = ItemStream::with_clock(5, SimpleEventFn, clock.clone()).unwrap();
/// let mut buf = TimestampedVecBuffer::new();
///
/// assert_eq!(stream.fill_buffer(&mut buf), Poll::Ready { emitted: 1 });
/// assert_eq!(
///     stream.fill_buffer(&mut buf),
///     Poll::Pending { yield_for: Duration::from_millis(200) }
/// );
///
/// clock.advance(Duration::from_millis(200));
/// assert_eq!(stream.fill_buffer(&mut buf), Poll::Ready { emitted: 1 });
/// assert_eq!(buf.items()[1].item.sequence, 1);
/// assert_eq!(buf.items()[1].timestamp, 1_200);
/// ```
#[derive(Debug)]
pub struct ItemStream<T, G, C = SystemClock> {
    generator: G,
    clock: C,
    period_nanos: i64,
    emit_schedule: Option<i64>,
    sequence: i64,
    _item: PhantomData<fn() -> T>,
}

impl<T, G> ItemStream<T, G, SystemClock>
where
    G: GeneratorFunction<T>,
{
    /// Creates a stream paced against the system clocks.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRate`] for a non-positive rate or one above
    /// [`MAX_ITEMS_PER_SECOND`].
    pub fn new(items_per_second: i64, generator: G) -> Result<Self> {
        Self::with_clock(items_per_second, generator, SystemClock)
    }
}

impl<T, G, C> ItemStream<T, G, C>
where
    G: GeneratorFunction<T>,
    C: TimeSource,
{
    /// Creates a stream paced against `clock`.
    ///
    /// The sequence starts at zero and the schedule is anchored on the first
    /// poll, not here.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRate`] for a non-positive rate or one above
    /// [`MAX_ITEMS_PER_SECOND`].
    pub fn with_clock(items_per_second: i64, generator: G, clock: C) -> Result<Self> {
        Ok(Self::from_period(period_nanos(items_per_second)?, generator, clock))
    }

    pub(crate) const fn from_period(period_nanos: i64, generator: G, clock: C) -> Self {
        debug_assert!(period_nanos > 0);
        Self {
            generator,
            clock,
            period_nanos,
            emit_schedule: None,
            sequence: 0,
            _item: PhantomData,
        }
    }

    /// The emission period in nanoseconds.
    pub const fn period_nanos(&self) -> i64 {
        self.period_nanos
    }

    /// The sequence number the next item will carry.
    pub const fn next_sequence(&self) -> i64 {
        self.sequence
    }

    /// Monotonic instant at which the next item is due, or `None` before the
    /// first poll.
    pub const fn emit_schedule(&self) -> Option<i64> {
        self.emit_schedule
    }

    /// Emits every due item, at most [`MAX_BATCH_SIZE`], into `buf`.
    ///
    /// # Returns
    /// - `Ok(Poll::Ready { emitted })`: `emitted` items were added
    /// - `Ok(Poll::Pending { yield_for })`: nothing was due; the next item is
    ///   due in `yield_for`
    /// - `Err(_)`: the generator function failed
    ///
    /// # Errors
    ///
    /// Propagates the first generator function error. Items generated earlier
    /// in the same poll remain in the buffer and their sequence numbers stay
    /// consumed.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip_all, fields(period_nanos = self.period_nanos)))]
    pub fn try_fill_buffer<B>(&mut self, buf: &mut B) -> Result<Poll, G::Err>
    where
        B: TimestampedSourceBuffer<T> + ?Sized,
    {
        let now = self.clock.monotonic_nanos();
        let mut schedule = *self.emit_schedule.get_or_insert(now);
        let ts = bucket_millis(self.clock.wall_clock_nanos(), self.period_nanos);

        let mut emitted = 0;
        while emitted < MAX_BATCH_SIZE && now >= schedule {
            let item = self.generator.generate(ts, self.sequence)?;
            self.sequence += 1;
            buf.add(item, ts);
            schedule += self.period_nanos;
            self.emit_schedule = Some(schedule);
            emitted += 1;
        }

        if emitted == 0 {
            return Ok(Poll::pending_until(now, schedule));
        }

        #[cfg(feature = "tracing")]
        {
            if emitted == MAX_BATCH_SIZE && now >= schedule {
                tracing::trace!(
                    behind_nanos = now - schedule,
                    "batch cap reached, schedule still behind"
                );
            }
        }

        Ok(Poll::Ready { emitted })
    }
}

impl<T, G, C> ItemStream<T, G, C>
where
    G: GeneratorFunction<T, Err = Infallible>,
    C: TimeSource,
{
    /// Infallible counterpart of [`Self::try_fill_buffer`] for generators that
    /// cannot fail.
    pub fn fill_buffer<B>(&mut self, buf: &mut B) -> Poll
    where
        B: TimestampedSourceBuffer<T> + ?Sized,
    {
        match self.try_fill_buffer(buf) {
            Ok(poll) => poll,
            Err(e) => match e {},
        }
    }
}
