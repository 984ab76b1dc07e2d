//! Symmetric (`kty` = `oct`) keys as defined in
//! [RFC 7518 section 6.4]
//!
//! [RFC 7518 section 6.4]: <https://datatracker.ietf.org/doc/html/rfc7518#section-6.4>

use serde_json::{Map, Value};
use zeroize::Zeroizing;

use super::{bytes_parameter, KeyError};

/// Loads the raw octet sequence from the `k` parameter of a symmetric JWK.
pub(crate) fn key(jwk: &Map<String, Value>) -> Result<Zeroizing<Vec<u8>>, KeyError> {
    bytes_parameter(jwk, "k")
}
