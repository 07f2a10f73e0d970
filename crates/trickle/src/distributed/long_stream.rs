use crate::{
    InstanceConfig, MAX_BATCH_SIZE, NANOS_PER_MILLI, Poll, TimeSource, TimestampedSourceBuffer,
};

/// One instance of the replicated `i64` stream built by
/// [`LongStreamFactory`].
///
/// The job-wide value space is split round-robin: the instance with global
/// index `i` out of `n` emits `i, i + n, i + 2n, ...`. Value `v` is due
/// `v` emission periods after the start time, where the period derives from
/// the job-wide `items_per_second`. Together the instances therefore
/// approximate the requested aggregate rate without coordinating.
///
/// The start time arrives as wall-clock milliseconds so all members agree on
/// it; it is translated once, at construction, onto the monotonic clock that
/// paces emission.
///
/// [`LongStreamFactory`]: crate::LongStreamFactory
#[derive(Debug)]
pub struct LongStream<P, C> {
    clock: C,
    event_time_policy: P,
    start_nanos: i64,
    wall_offset_nanos: i64,
    period_nanos: i64,
    next_value: i64,
    stride: i64,
}

impl<P, C: TimeSource> LongStream<P, C> {
    pub(crate) fn new(config: InstanceConfig<P>, clock: C) -> Self {
        let InstanceConfig {
            start_time_millis,
            items_per_second,
            event_time_policy,
            global_index,
            total_parallelism,
        } = config;

        let wall_offset_nanos = clock.wall_clock_nanos() - clock.monotonic_nanos();
        let start_nanos = start_time_millis
            .saturating_mul(NANOS_PER_MILLI)
            .saturating_sub(wall_offset_nanos);

        Self {
            clock,
            event_time_policy,
            start_nanos,
            wall_offset_nanos,
            // `items_per_second` was validated by `LongStreamSource`.
            period_nanos: crate::NANOS_PER_SECOND / items_per_second.max(1),
            next_value: i64::try_from(global_index).unwrap_or(i64::MAX),
            stride: i64::try_from(total_parallelism.max(1)).unwrap_or(i64::MAX),
        }
    }

    /// The event-time policy this instance was configured with.
    pub const fn event_time_policy(&self) -> &P {
        &self.event_time_policy
    }

    /// The next value this instance will emit.
    pub const fn next_value(&self) -> i64 {
        self.next_value
    }

    fn due_nanos(&self) -> i64 {
        self.start_nanos
            .saturating_add(self.next_value.saturating_mul(self.period_nanos))
    }

    /// Emits every value that has become due, at most [`MAX_BATCH_SIZE`].
    ///
    /// Each value is stamped with the instant it became due, so timestamps
    /// are never in the future and never decrease.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "trace", skip_all, fields(stride = self.stride)))]
    pub fn fill_buffer<B>(&mut self, buf: &mut B) -> Poll
    where
        B: TimestampedSourceBuffer<i64> + ?Sized,
    {
        let now = self.clock.monotonic_nanos();
        let mut due = self.due_nanos();
        let mut emitted = 0;

        while emitted < MAX_BATCH_SIZE && now >= due {
            let ts = due.saturating_add(self.wall_offset_nanos);
            buf.add(self.next_value, ts.div_euclid(NANOS_PER_MILLI));
            self.next_value += self.stride;
            due = self.due_nanos();
            emitted += 1;
        }

        if emitted == 0 {
            Poll::pending_until(now, due)
        } else {
            Poll::Ready { emitted }
        }
    }
}
