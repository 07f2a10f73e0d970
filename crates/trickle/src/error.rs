/// A result type defaulting to the crate [`enum@Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All errors `trickle` can raise while constructing a source.
///
/// Polling a source never produces one of these: pacing misses are not
/// failures, and generator function errors are returned as the generator's
/// own error type.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A required argument was missing or malformed.
    #[error("invalid argument `{name}`: {reason}")]
    InvalidArgument {
        /// Name of the offending argument.
        name: &'static str,
        /// Human readable reason.
        reason: String,
    },

    /// `items_per_second` was outside `1..=1_000_000_000`.
    ///
    /// Rates above one item per nanosecond would truncate the emission period
    /// to zero.
    #[error("items_per_second must be within 1..={max}, got {value}", max = crate::MAX_ITEMS_PER_SECOND)]
    InvalidRate {
        /// The rejected rate.
        value: i64,
    },

    /// A generator function failed the serialization round trip required
    /// before it can be shipped to other workers.
    #[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
    #[cfg(feature = "serde")]
    #[error("`{name}` is not transportable: {source}")]
    NotTransportable {
        /// Name of the checked value.
        name: &'static str,
        /// The underlying serialization failure.
        #[source]
        source: serde_json::Error,
    },

    /// A source configuration document could not be parsed.
    #[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
    #[cfg(feature = "serde")]
    #[error("invalid source configuration: {0}")]
    InvalidConfig(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn missing(name: &'static str) -> Self {
        Self::InvalidArgument {
            name,
            reason: String::from("required but not provided"),
        }
    }
}
