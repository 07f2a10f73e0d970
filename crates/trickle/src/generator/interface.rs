use core::{convert::Infallible, fmt};

/// Maps an emission slot to an item.
///
/// A paced source calls [`GeneratorFunction::generate`] once per emitted
/// item, passing the (bucketed) event timestamp and the item's sequence
/// number. Implementations should be pure: stateless, or capturing only
/// immutable configuration. The source owns the pacing state, never the
/// generator.
///
/// Any `Fn(i64, i64) -> T` closure is an infallible generator function. Wrap a
/// closure returning `Result` in [`TryGeneratorFn`] to make failures propagate
/// out of the poll.
///
/// # Example
///
/// ```
/// use trickle::GeneratorFunction;
///
/// let label = |ts: i64, seq: i64| format!("{seq}@{ts}");
/// assert_eq!(label.generate(1_000, 7).unwrap(), "7@1000");
/// ```
pub trait GeneratorFunction<T> {
    /// Error raised by a failed generation. Use [`Infallible`] when generation
    /// cannot fail.
    type Err: fmt::Debug;

    /// Produces the item for `sequence`, stamped at `timestamp_millis`.
    ///
    /// # Errors
    ///
    /// Returns whatever the implementation considers a generation failure. The
    /// error is handed back to the driver unchanged; there is no retry.
    fn generate(&self, timestamp_millis: i64, sequence: i64) -> Result<T, Self::Err>;
}

impl<T, F> GeneratorFunction<T> for F
where
    F: Fn(i64, i64) -> T,
{
    type Err = Infallible;

    #[inline]
    fn generate(&self, timestamp_millis: i64, sequence: i64) -> Result<T, Self::Err> {
        Ok(self(timestamp_millis, sequence))
    }
}

/// Adapts a fallible closure into a [`GeneratorFunction`].
///
/// # Example
///
/// ```
/// use trickle::{GeneratorFunction, TryGeneratorFn};
///
/// let only_even = TryGeneratorFn(|_ts: i64, seq: i64| {
///     if seq % 2 == 0 { Ok(seq) } else { Err("odd sequence") }
/// });
///
/// assert_eq!(only_even.generate(0, 2), Ok(2));
/// assert_eq!(only_even.generate(0, 3), Err("odd sequence"));
/// ```
#[derive(Clone, Copy, Debug)]
pub struct TryGeneratorFn<F>(pub F);

impl<T, E, F> GeneratorFunction<T> for TryGeneratorFn<F>
where
    F: Fn(i64, i64) -> Result<T, E>,
    E: fmt::Debug,
{
    type Err = E;

    #[inline]
    fn generate(&self, timestamp_millis: i64, sequence: i64) -> Result<T, E> {
        (self.0)(timestamp_millis, sequence)
    }
}
