use core::time::Duration;

/// Outcome of a single poll of a paced source.
///
/// This allows non-blocking driver loops: a driver keeps polling while it sees
/// [`Poll::Ready`] and may back off on [`Poll::Pending`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Poll {
    /// At least one item was added to the buffer.
    Ready {
        /// Number of items added by this poll.
        emitted: usize,
    },
    /// Nothing was due yet.
    Pending {
        /// Monotonic time until the next item becomes due. This is only a
        /// hint; polling earlier is harmless.
        yield_for: Duration,
    },
}

impl Poll {
    /// Number of items added by the poll, zero when pending.
    pub const fn emitted(&self) -> usize {
        match self {
            Self::Ready { emitted } => *emitted,
            Self::Pending { .. } => 0,
        }
    }

    pub(crate) fn pending_until(now: i64, due: i64) -> Self {
        let nanos = u64::try_from(due.saturating_sub(now)).unwrap_or(0);
        Self::Pending {
            yield_for: Duration::from_nanos(nanos),
        }
    }
}
