use crate::{
    Error, InstanceConfig, LongStreamFactory, Result, StreamSourceFactory, TimeSource, period_nanos,
};
use core::{num::NonZeroUsize, time::Duration};

/// A replicated source of `i64` values for high-throughput testing.
///
/// The source itself is only configuration: every cluster member turns it
/// into a [`MemberSupplier`] via [`LongStreamSource::member_supplier`], and
/// that supplier builds identical, independent instances for the member's
/// local processors. Nothing is shared between instances at runtime.
///
/// # Example
///
/// ```
/// use core::{num::NonZeroUsize, time::Duration};
/// use trickle::{ManualClock, LongStreamFactory, stream_source_long};
///
/// let clock = ManualClock::new(0, 1_000);
/// let source = stream_source_long(100, Duration::from_millis(50))
///     .unwrap()
///     .with_factory(LongStreamFactory::with_clock(clock.clone()));
///
/// let local = source.local_parallelism(NonZeroUsize::new(2).unwrap());
/// let member = source.member_supplier("lag=0", &clock);
/// let instances = member.get_all(0, 1, local);
///
/// assert_eq!(member.start_time_millis(), 1_050);
/// assert_eq!(instances.len(), 2);
/// ```
#[derive(Clone, Debug)]
pub struct LongStreamSource<F = LongStreamFactory> {
    items_per_second: i64,
    initial_delay: Duration,
    preferred_local_parallelism: Option<NonZeroUsize>,
    factory: F,
}

/// Returns a replicated `i64` source emitting `items_per_second` in aggregate
/// across the cluster, starting `initial_delay` after each member's supplier
/// is created. Local parallelism is left to the engine default.
///
/// # Errors
///
/// Returns [`Error::InvalidRate`] for a rate outside `1..=10^9`.
pub fn stream_source_long(items_per_second: i64, initial_delay: Duration) -> Result<LongStreamSource> {
    LongStreamSource::try_new(items_per_second, initial_delay, None)
}

/// Like [`stream_source_long`], hosting `preferred_local_parallelism`
/// instances on every member.
///
/// # Errors
///
/// Returns [`Error::InvalidRate`] for a rate outside `1..=10^9`.
pub fn stream_source_long_with_parallelism(
    items_per_second: i64,
    initial_delay: Duration,
    preferred_local_parallelism: NonZeroUsize,
) -> Result<LongStreamSource> {
    LongStreamSource::try_new(
        items_per_second,
        initial_delay,
        Some(preferred_local_parallelism),
    )
}

impl LongStreamSource {
    /// Validates the configuration, using the default [`LongStreamFactory`].
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidRate`] for a rate outside `1..=10^9`
    /// - [`Error::InvalidArgument`] if `initial_delay` does not fit in an
    ///   `i64` of milliseconds
    pub fn try_new(
        items_per_second: i64,
        initial_delay: Duration,
        preferred_local_parallelism: Option<NonZeroUsize>,
    ) -> Result<Self> {
        period_nanos(items_per_second)?;
        if i64::try_from(initial_delay.as_millis()).is_err() {
            return Err(Error::InvalidArgument {
                name: "initial_delay",
                reason: format!("{initial_delay:?} is out of range"),
            });
        }

        Ok(Self {
            items_per_second,
            initial_delay,
            preferred_local_parallelism,
            factory: LongStreamFactory::default(),
        })
    }
}

impl<F> LongStreamSource<F> {
    /// Replaces the factory that builds the per-processor instances.
    pub fn with_factory<G>(self, factory: G) -> LongStreamSource<G> {
        LongStreamSource {
            items_per_second: self.items_per_second,
            initial_delay: self.initial_delay,
            preferred_local_parallelism: self.preferred_local_parallelism,
            factory,
        }
    }

    /// The aggregate target rate.
    pub const fn items_per_second(&self) -> i64 {
        self.items_per_second
    }

    /// Delay between supplier creation and the first due value.
    pub const fn initial_delay(&self) -> Duration {
        self.initial_delay
    }

    /// The configured preference, if any.
    pub const fn preferred_local_parallelism(&self) -> Option<NonZeroUsize> {
        self.preferred_local_parallelism
    }

    /// Number of instances one member hosts: the preference when set,
    /// otherwise `engine_default`.
    pub fn local_parallelism(&self, engine_default: NonZeroUsize) -> NonZeroUsize {
        self.preferred_local_parallelism.unwrap_or(engine_default)
    }

    /// Creates the supplier for one member, fixing its start time to the
    /// current wall-clock time plus the initial delay.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "debug", skip_all))]
    pub fn member_supplier<P, C>(&self, event_time_policy: P, clock: &C) -> MemberSupplier<P, F>
    where
        C: TimeSource + ?Sized,
        F: Clone,
    {
        // Range checked in `try_new`.
        let delay_millis = i64::try_from(self.initial_delay.as_millis()).unwrap_or(i64::MAX);
        let start_time_millis = clock.wall_clock_millis().saturating_add(delay_millis);

        #[cfg(feature = "tracing")]
        tracing::debug!(start_time_millis, items_per_second = self.items_per_second, "member supplier created");

        MemberSupplier {
            start_time_millis,
            items_per_second: self.items_per_second,
            event_time_policy,
            factory: self.factory.clone(),
        }
    }
}

/// Builds the source instances hosted by one cluster member.
///
/// Every instance it creates gets the same start time, rate and event-time
/// policy.
#[derive(Clone, Debug)]
pub struct MemberSupplier<P, F = LongStreamFactory> {
    start_time_millis: i64,
    items_per_second: i64,
    event_time_policy: P,
    factory: F,
}

impl<P, F> MemberSupplier<P, F>
where
    P: Clone,
    F: StreamSourceFactory<P>,
{
    /// Wall-clock start time shared by this member's instances.
    pub const fn start_time_millis(&self) -> i64 {
        self.start_time_millis
    }

    /// The aggregate target rate.
    pub const fn items_per_second(&self) -> i64 {
        self.items_per_second
    }

    /// Creates the instance at `global_index` of `total_parallelism`.
    pub fn get(&self, global_index: usize, total_parallelism: usize) -> F::Source {
        debug_assert!(global_index < total_parallelism);
        self.factory.create(InstanceConfig {
            start_time_millis: self.start_time_millis,
            items_per_second: self.items_per_second,
            event_time_policy: self.event_time_policy.clone(),
            global_index,
            total_parallelism,
        })
    }

    /// Creates all `local_parallelism` instances of the member at
    /// `member_index` in a cluster of `member_count` members, each member
    /// hosting the same number of instances.
    pub fn get_all(
        &self,
        member_index: usize,
        member_count: usize,
        local_parallelism: NonZeroUsize,
    ) -> Vec<F::Source> {
        let local = local_parallelism.get();
        let total = member_count.max(1) * local;
        (0..local)
            .map(|i| self.get(member_index * local + i, total))
            .collect()
    }
}
