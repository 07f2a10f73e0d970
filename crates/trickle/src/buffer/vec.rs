use super::{SourceBuffer, TimestampedSourceBuffer};

/// A [`SourceBuffer`] collecting items into a `Vec`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VecBuffer<T> {
    items: Vec<T>,
    closed: bool,
}

impl<T> Default for VecBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> VecBuffer<T> {
    /// Creates an empty, open buffer.
    pub const fn new() -> Self {
        Self {
            items: Vec::new(),
            closed: false,
        }
    }

    /// Items added so far, in order.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Whether [`SourceBuffer::close`] has been called.
    pub const fn is_closed(&self) -> bool {
        self.closed
    }

    /// Takes the buffered items, leaving the buffer empty. The closed flag is
    /// kept.
    pub fn drain(&mut self) -> Vec<T> {
        core::mem::take(&mut self.items)
    }
}

impl<T> SourceBuffer<T> for VecBuffer<T> {
    fn add(&mut self, item: T) {
        debug_assert!(!self.closed, "add after close");
        self.items.push(item);
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

/// An item paired with its event timestamp in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Timestamped<T> {
    /// The emitted item.
    pub item: T,
    /// Event time in milliseconds since the Unix epoch.
    pub timestamp: i64,
}

/// A [`TimestampedSourceBuffer`] collecting `(item, timestamp)` pairs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimestampedVecBuffer<T> {
    items: Vec<Timestamped<T>>,
}

impl<T> Default for TimestampedVecBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TimestampedVecBuffer<T> {
    /// Creates an empty buffer.
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Creates an empty buffer able to hold `capacity` items without
    /// reallocating.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    /// Items added so far, in order.
    pub fn items(&self) -> &[Timestamped<T>] {
        &self.items
    }

    /// Number of buffered items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing has been buffered.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Takes the buffered items, leaving the buffer empty.
    pub fn drain(&mut self) -> Vec<Timestamped<T>> {
        core::mem::take(&mut self.items)
    }
}

impl<T> TimestampedSourceBuffer<T> for TimestampedVecBuffer<T> {
    fn add(&mut self, item: T, timestamp_millis: i64) {
        self.items.push(Timestamped {
            item,
            timestamp: timestamp_millis,
        });
    }
}
