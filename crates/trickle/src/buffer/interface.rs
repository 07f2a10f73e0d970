/// The sink a finite (batch) source fills.
///
/// A finite source calls [`SourceBuffer::add`] once per item and then
/// [`SourceBuffer::close`] exactly once to signal that no more items follow.
pub trait SourceBuffer<T> {
    /// Appends an item.
    fn add(&mut self, item: T);

    /// Marks the buffer as complete.
    fn close(&mut self);
}

/// The sink an infinite, timestamped source fills.
///
/// There is no `close`: streaming sources never complete on their own.
pub trait TimestampedSourceBuffer<T> {
    /// Appends an item carrying its event timestamp in milliseconds since the
    /// Unix epoch.
    fn add(&mut self, item: T, timestamp_millis: i64);
}

impl<T, B: SourceBuffer<T> + ?Sized> SourceBuffer<T> for &mut B {
    fn add(&mut self, item: T) {
        (**self).add(item);
    }

    fn close(&mut self) {
        (**self).close();
    }
}

impl<T, B: TimestampedSourceBuffer<T> + ?Sized> TimestampedSourceBuffer<T> for &mut B {
    fn add(&mut self, item: T, timestamp_millis: i64) {
        (**self).add(item, timestamp_millis);
    }
}
