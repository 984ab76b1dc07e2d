//! Materializing in-memory keys from JSON Web Key (JWK) parameters as
//! defined in [RFC 7517] and [RFC 7518 section 6]
//!
//! Keys have no lifecycle beyond the operation they are loaded for: they are
//! built on demand from the JWK object, consumed by the signature engine and
//! dropped again. Buffers holding decoded secret parameters are zeroized
//! before release.
//!
//! [RFC 7517]: <https://datatracker.ietf.org/doc/html/rfc7517>
//! [RFC 7518 section 6]: <https://datatracker.ietf.org/doc/html/rfc7518#section-6>

use serde_json::{Map, Value};
use thiserror::Error;
use zeroize::Zeroizing;

use crate::base64_url;

pub(crate) mod ec;
pub(crate) mod rsa;
pub(crate) mod symmetric;

/// The reasons a key can fail to materialize from its JWK parameters.
#[derive(Debug, Error)]
pub enum KeyError {
    /// A required JWK parameter is absent or not a string.
    #[error("missing `{0}` parameter")]
    MissingParameter(&'static str),
    /// A JWK parameter is present but not valid base64url.
    #[error("`{0}` parameter is not valid base64url")]
    InvalidParameter(&'static str),
    /// The `crv` parameter names a curve outside {P-256, P-384, P-521}.
    #[error("unknown elliptic curve `{0}`")]
    UnknownCurve(String),
    /// A decoded coordinate or scalar is wider than the curve allows.
    #[error("invalid field width: expected at most {expected} bytes, found {actual}")]
    FieldWidth {
        /// The curve's coordinate width in bytes.
        expected: usize,
        /// The width of the decoded parameter.
        actual: usize,
    },
    /// The key's curve does not match the curve of the requested algorithm.
    #[error("key curve does not match the requested algorithm")]
    CurveMismatch,
    /// The `x`/`y` coordinates do not form a point on the curve, or do not
    /// match the private scalar.
    #[error("coordinates do not form a valid point on the curve")]
    InvalidEcPoint,
    /// The private scalar is out of range for the curve.
    #[error("invalid elliptic curve scalar")]
    InvalidEcScalar(#[source] elliptic_curve::Error),
    /// The RSA parameters do not form a usable key.
    #[error("invalid RSA key")]
    InvalidRsaKey(#[source] ::rsa::Error),
}

/// Reads a required string-valued JWK parameter.
pub(crate) fn string_parameter<'a>(
    jwk: &'a Map<String, Value>,
    name: &'static str,
) -> Result<&'a str, KeyError> {
    jwk.get(name)
        .and_then(Value::as_str)
        .ok_or(KeyError::MissingParameter(name))
}

/// Reads and decodes a required base64url-valued JWK parameter.
///
/// The returned buffer is zeroized on drop since parameters like `k` and `d`
/// are secret material.
pub(crate) fn bytes_parameter(
    jwk: &Map<String, Value>,
    name: &'static str,
) -> Result<Zeroizing<Vec<u8>>, KeyError> {
    let value = string_parameter(jwk, name)?;
    base64_url::decode_loose(value)
        .map(Zeroizing::new)
        .map_err(|_| KeyError::InvalidParameter(name))
}

/// Reads a base64url-valued JWK parameter that may be absent.
pub(crate) fn optional_bytes_parameter(
    jwk: &Map<String, Value>,
    name: &'static str,
) -> Result<Option<Zeroizing<Vec<u8>>>, KeyError> {
    if jwk.get(name).is_none() {
        return Ok(None);
    }
    bytes_parameter(jwk, name).map(Some)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn jwk(value: Value) -> Map<String, Value> {
        value.as_object().expect("test JWK is an object").clone()
    }

    #[test]
    fn missing_and_non_string_parameters() {
        let key = jwk(json!({ "kty": "oct", "k": 42 }));
        assert!(matches!(
            string_parameter(&key, "k"),
            Err(KeyError::MissingParameter("k"))
        ));
        assert!(matches!(
            string_parameter(&key, "d"),
            Err(KeyError::MissingParameter("d"))
        ));
    }

    #[test]
    fn parameters_accept_padded_base64url() {
        let key = jwk(json!({ "k": "Zm8=" }));
        assert_eq!(&*bytes_parameter(&key, "k").unwrap(), b"fo");
    }

    #[test]
    fn malformed_parameter_is_reported() {
        let key = jwk(json!({ "k": "not base64!" }));
        assert!(matches!(
            bytes_parameter(&key, "k"),
            Err(KeyError::InvalidParameter("k"))
        ));
    }

    #[test]
    fn optional_parameter_absent() {
        let key = jwk(json!({}));
        assert!(optional_bytes_parameter(&key, "p").unwrap().is_none());
    }
}
