use crate::{Error, Result};
use serde::{Serialize, de::DeserializeOwned};

/// Verifies that `value` survives a serialization round trip and returns the
/// deserialized copy.
///
/// Values handed to other processes must not depend on anything that does
/// not serialize: a failure here is reported at construction time instead of
/// when a remote worker first tries to use the value.
///
/// # Errors
///
/// Returns [`Error::NotTransportable`] if either direction fails.
///
/// # Example
///
/// ```
/// use trickle::{SimpleEventFn, check_transportable};
///
/// let copy = check_transportable(&SimpleEventFn, "generator_fn").unwrap();
/// assert_eq!(copy, SimpleEventFn);
/// ```
pub fn check_transportable<G>(value: &G, name: &'static str) -> Result<G>
where
    G: Serialize + DeserializeOwned,
{
    let encoded =
        serde_json::to_vec(value).map_err(|source| Error::NotTransportable { name, source })?;
    serde_json::from_slice(&encoded).map_err(|source| Error::NotTransportable { name, source })
}
