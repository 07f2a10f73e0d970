use crate::{
    GeneratorFunction, ItemStream, Result, SimpleEvent, SimpleEventFn, SystemClock, TimeSource,
    period_nanos,
};
use core::marker::PhantomData;

/// Validated configuration of a rate-limited stream, handing out one fresh
/// [`ItemStream`] per parallel task.
///
/// The supplier holds no pacing state. Every stream it creates starts at
/// sequence zero with an uninitialized schedule, and streams created from the
/// same supplier never share anything but the (immutable) generator.
///
/// # Example
///
/// ```
/// use trickle::{TimestampedVecBuffer, item_stream};
///
/// let supplier = item_stream(10).unwrap();
/// let mut first = supplier.create();
/// let mut second = supplier.create();
///
/// let mut buf = TimestampedVecBuffer::new();
/// first.fill_buffer(&mut buf);
/// second.fill_buffer(&mut buf);
///
/// // Independent instances both start at sequence zero.
/// assert_eq!(buf.items()[0].item.sequence, 0);
/// assert_eq!(buf.items()[1].item.sequence, 0);
/// ```
#[derive(Debug)]
pub struct ItemStreamSupplier<T, G> {
    items_per_second: i64,
    period_nanos: i64,
    generator: G,
    _item: PhantomData<fn() -> T>,
}

// Manual impl: `T` is only a marker and need not be `Clone`.
impl<T, G: Clone> Clone for ItemStreamSupplier<T, G> {
    fn clone(&self) -> Self {
        Self {
            items_per_second: self.items_per_second,
            period_nanos: self.period_nanos,
            generator: self.generator.clone(),
            _item: PhantomData,
        }
    }
}

/// Returns a supplier of streams emitting [`SimpleEvent`]s at
/// `items_per_second`.
///
/// # Errors
///
/// Returns [`Error::InvalidRate`] for a non-positive rate or one above
/// [`MAX_ITEMS_PER_SECOND`].
///
/// [`Error::InvalidRate`]: crate::Error::InvalidRate
/// [`MAX_ITEMS_PER_SECOND`]: crate::MAX_ITEMS_PER_SECOND
pub fn item_stream(items_per_second: i64) -> Result<ItemStreamSupplier<SimpleEvent, SimpleEventFn>> {
    ItemStreamSupplier::try_new(items_per_second, SimpleEventFn)
}

/// Returns a supplier of streams whose items are produced by `generator`.
///
/// # Errors
///
/// Returns [`Error::InvalidRate`] for a non-positive rate or one above
/// [`MAX_ITEMS_PER_SECOND`].
///
/// [`Error::InvalidRate`]: crate::Error::InvalidRate
/// [`MAX_ITEMS_PER_SECOND`]: crate::MAX_ITEMS_PER_SECOND
pub fn item_stream_with<T, G>(items_per_second: i64, generator: G) -> Result<ItemStreamSupplier<T, G>>
where
    G: GeneratorFunction<T>,
{
    ItemStreamSupplier::try_new(items_per_second, generator)
}

/// Like [`item_stream_with`], but additionally proves that `generator` can be
/// shipped to workers in other processes.
///
/// The generator is serialized and deserialized once, here; the supplier keeps
/// the round-tripped copy.
///
/// # Errors
///
/// - [`Error::InvalidRate`] for a rate outside `1..=10^9`
/// - [`Error::NotTransportable`] if the generator does not survive the round
///   trip
///
/// [`Error::InvalidRate`]: crate::Error::InvalidRate
/// [`Error::NotTransportable`]: crate::Error::NotTransportable
#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
#[cfg(feature = "serde")]
pub fn item_stream_distributed<T, G>(
    items_per_second: i64,
    generator: &G,
) -> Result<ItemStreamSupplier<T, G>>
where
    G: GeneratorFunction<T> + serde::Serialize + serde::de::DeserializeOwned,
{
    period_nanos(items_per_second)?;
    let generator = crate::check_transportable(generator, "generator_fn")?;
    ItemStreamSupplier::try_new(items_per_second, generator)
}

impl<T, G> ItemStreamSupplier<T, G>
where
    G: GeneratorFunction<T>,
{
    /// Validates the rate and wraps the generator.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRate`] for a non-positive rate or one above
    /// [`MAX_ITEMS_PER_SECOND`].
    ///
    /// [`Error::InvalidRate`]: crate::Error::InvalidRate
    /// [`MAX_ITEMS_PER_SECOND`]: crate::MAX_ITEMS_PER_SECOND
    pub fn try_new(items_per_second: i64, generator: G) -> Result<Self> {
        Ok(Self {
            items_per_second,
            period_nanos: period_nanos(items_per_second)?,
            generator,
            _item: PhantomData,
        })
    }

    /// The configured target rate.
    pub const fn items_per_second(&self) -> i64 {
        self.items_per_second
    }

    /// The generator every created stream uses.
    pub const fn generator(&self) -> &G {
        &self.generator
    }
}

impl<T, G> ItemStreamSupplier<T, G>
where
    G: GeneratorFunction<T> + Clone,
{
    /// Creates a fresh stream paced against the system clocks.
    pub fn create(&self) -> ItemStream<T, G, SystemClock> {
        self.create_with_clock(SystemClock)
    }

    /// Creates a fresh stream paced against `clock`.
    pub fn create_with_clock<C: TimeSource>(&self, clock: C) -> ItemStream<T, G, C> {
        ItemStream::from_period(self.period_nanos, self.generator.clone(), clock)
    }
}
