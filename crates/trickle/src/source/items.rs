use crate::{Error, Result, SourceBuffer};

/// A batch source that replays a finite collection once and completes.
///
/// # Example
///
/// ```
/// use trickle::{VecBuffer, items};
///
/// let mut source = items(["a", "b", "c"]);
/// let mut buf = VecBuffer::new();
/// source.fill_buffer(&mut buf);
///
/// assert_eq!(buf.items(), ["a", "b", "c"]);
/// assert!(buf.is_closed());
/// ```
#[derive(Clone, Debug)]
pub struct ItemsSource<T> {
    items: Option<Vec<T>>,
}

/// Returns a batch source that emits `items` in iteration order and then
/// closes its buffer.
pub fn items<T, I>(items: I) -> ItemsSource<T>
where
    I: IntoIterator<Item = T>,
{
    ItemsSource::new(items)
}

impl<T> ItemsSource<T> {
    /// Creates a source from any finite iterable.
    pub fn new<I>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        Self {
            items: Some(items.into_iter().collect()),
        }
    }

    /// Creates a source from an optional collection, as produced by a
    /// configuration layer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] naming `items` when the collection
    /// is absent.
    pub fn try_new<I>(items: Option<I>) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
    {
        items.map(Self::new).ok_or_else(|| Error::missing("items"))
    }

    /// Number of items not yet emitted.
    pub fn remaining(&self) -> usize {
        self.items.as_ref().map_or(0, Vec::len)
    }

    /// Whether the source has already run.
    pub const fn is_done(&self) -> bool {
        self.items.is_none()
    }

    /// Emits every item in order and closes `buf`.
    ///
    /// The driver invokes a closing source exactly once. Any further call is
    /// a no-op: it emits nothing and does not close the buffer again.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "trace", skip_all))]
    pub fn fill_buffer<B>(&mut self, buf: &mut B)
    where
        B: SourceBuffer<T> + ?Sized,
    {
        let Some(items) = self.items.take() else {
            #[cfg(feature = "tracing")]
            tracing::warn!("items source polled after it closed");
            return;
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(count = items.len(), "replaying items");

        for item in items {
            buf.add(item);
        }
        buf.close();
    }
}
