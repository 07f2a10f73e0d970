use crate::{LongStream, SystemClock, TimeSource};

/// Everything one replicated source instance is built from.
///
/// All instances of a job receive the same `start_time_millis`,
/// `items_per_second` and `event_time_policy` (per member); only the indices
/// differ.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstanceConfig<P> {
    /// Wall-clock instant (ms since the Unix epoch) before which nothing is
    /// emitted.
    pub start_time_millis: i64,
    /// Aggregate target rate of the whole job.
    pub items_per_second: i64,
    /// Opaque event-time policy handed down by the pipeline.
    pub event_time_policy: P,
    /// Index of this instance among all instances of the job.
    pub global_index: usize,
    /// Number of instances across all members.
    pub total_parallelism: usize,
}

/// Builds the per-processor source instances of a replicated source.
pub trait StreamSourceFactory<P> {
    /// The source instance type.
    type Source;

    /// Creates one instance. Called once per local processor on every member.
    fn create(&self, config: InstanceConfig<P>) -> Self::Source;
}

/// The default factory, producing [`LongStream`] instances.
#[derive(Clone, Copy, Debug, Default)]
pub struct LongStreamFactory<C = SystemClock> {
    clock: C,
}

impl<C> LongStreamFactory<C> {
    /// Creates a factory whose instances pace against `clock`.
    pub const fn with_clock(clock: C) -> Self {
        Self { clock }
    }
}

impl<P, C> StreamSourceFactory<P> for LongStreamFactory<C>
where
    C: TimeSource + Clone,
{
    type Source = LongStream<P, C>;

    fn create(&self, config: InstanceConfig<P>) -> LongStream<P, C> {
        LongStream::new(config, self.clock.clone())
    }
}
