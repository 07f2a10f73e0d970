//! Declarative source configuration.
//!
//! A [`SourceConfig`] is the serialized form of any of the three sources. It
//! is deliberately lenient when parsing (required fields are `Option`s) so that
//! a missing value is reported as an [`Error::InvalidArgument`] naming the
//! field, the same error the typed constructors raise.

use crate::{
    Error, ItemStreamSupplier, ItemsSource, LongStreamSource, Result, SimpleEvent, SimpleEventFn,
    item_stream,
};
use core::{num::NonZeroUsize, time::Duration};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Serialized description of a source.
///
/// # Example
///
/// ```
/// use trickle::{ConfiguredSource, SourceConfig};
///
/// let config = SourceConfig::from_json(r#"{ "kind": "item_stream", "items_per_second": 5 }"#).unwrap();
/// let ConfiguredSource::ItemStream(supplier) = config.build().unwrap() else {
///     unreachable!()
/// };
/// assert_eq!(supplier.items_per_second(), 5);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceConfig {
    /// A finite replay of `items`.
    Items {
        /// The items to replay. Required.
        items: Option<Vec<Value>>,
    },
    /// A [`SimpleEvent`] stream.
    ItemStream {
        /// Target rate. Required.
        items_per_second: Option<i64>,
    },
    /// A replicated `i64` stream.
    LongStream {
        /// Aggregate target rate. Required.
        items_per_second: Option<i64>,
        /// Delay before the first value, in milliseconds.
        #[serde(default)]
        initial_delay_ms: u64,
        /// Instances per member; the engine default when absent.
        #[serde(default)]
        preferred_local_parallelism: Option<NonZeroUsize>,
    },
}

/// A source built from a [`SourceConfig`].
#[derive(Debug)]
pub enum ConfiguredSource {
    /// See [`SourceConfig::Items`].
    Items(ItemsSource<Value>),
    /// See [`SourceConfig::ItemStream`].
    ItemStream(ItemStreamSupplier<SimpleEvent, SimpleEventFn>),
    /// See [`SourceConfig::LongStream`].
    LongStream(LongStreamSource),
}

impl SourceConfig {
    /// Parses a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for malformed JSON, an unknown `kind`,
    /// or fields of the wrong type.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Validates the configuration and builds the source.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] when a required field is missing
    /// - [`Error::InvalidRate`] for a rate outside `1..=10^9`
    pub fn build(self) -> Result<ConfiguredSource> {
        match self {
            Self::Items { items } => ItemsSource::try_new(items).map(ConfiguredSource::Items),
            Self::ItemStream { items_per_second } => {
                let rate = items_per_second.ok_or_else(|| Error::missing("items_per_second"))?;
                item_stream(rate).map(ConfiguredSource::ItemStream)
            }
            Self::LongStream {
                items_per_second,
                initial_delay_ms,
                preferred_local_parallelism,
            } => {
                let rate = items_per_second.ok_or_else(|| Error::missing("items_per_second"))?;
                LongStreamSource::try_new(
                    rate,
                    Duration::from_millis(initial_delay_ms),
                    preferred_local_parallelism,
                )
                .map(ConfiguredSource::LongStream)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VecBuffer;

    #[test]
    fn items_config_replays_values() {
        let config = SourceConfig::from_json(r#"{ "kind": "items", "items": [1, "two", null] }"#)
            .unwrap();
        let ConfiguredSource::Items(mut source) = config.build().unwrap() else {
            panic!("expected items source");
        };

        let mut buf = VecBuffer::new();
        source.fill_buffer(&mut buf);
        assert_eq!(
            buf.items(),
            [Value::from(1), Value::from("two"), Value::Null]
        );
        assert!(buf.is_closed());
    }

    #[test]
    fn missing_items_is_an_invalid_argument() {
        let err = SourceConfig::from_json(r#"{ "kind": "items" }"#)
            .unwrap()
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { name: "items", .. }));
    }

    #[test]
    fn missing_rate_is_an_invalid_argument() {
        for json in [
            r#"{ "kind": "item_stream" }"#,
            r#"{ "kind": "long_stream", "initial_delay_ms": 10 }"#,
        ] {
            let err = SourceConfig::from_json(json).unwrap().build().unwrap_err();
            assert!(
                matches!(
                    err,
                    Error::InvalidArgument {
                        name: "items_per_second",
                        ..
                    }
                ),
                "{json}: {err}"
            );
        }
    }

    #[test]
    fn non_positive_rate_is_rejected() {
        let err = SourceConfig::ItemStream {
            items_per_second: Some(0),
        }
        .build()
        .unwrap_err();
        assert!(matches!(err, Error::InvalidRate { value: 0 }));
    }

    #[test]
    fn long_stream_defaults() {
        let config =
            SourceConfig::from_json(r#"{ "kind": "long_stream", "items_per_second": 1000 }"#)
                .unwrap();
        assert_eq!(
            config,
            SourceConfig::LongStream {
                items_per_second: Some(1_000),
                initial_delay_ms: 0,
                preferred_local_parallelism: None,
            }
        );

        let ConfiguredSource::LongStream(source) = config.build().unwrap() else {
            panic!("expected long stream");
        };
        assert_eq!(source.initial_delay(), Duration::ZERO);
        assert_eq!(source.preferred_local_parallelism(), None);
    }

    #[test]
    fn zero_parallelism_is_a_parse_error() {
        let err = SourceConfig::from_json(
            r#"{ "kind": "long_stream", "items_per_second": 1, "preferred_local_parallelism": 0 }"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn unknown_kind_is_a_parse_error() {
        let err = SourceConfig::from_json(r#"{ "kind": "kafka" }"#).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }
}
