//! RSA keys from the JWK parameters defined in
//! [RFC 7518 section 6.3]
//!
//! All large integers are base64url encoded big-endian unsigned values.
//!
//! [RFC 7518 section 6.3]: <https://datatracker.ietf.org/doc/html/rfc7518#section-6.3>

use ::rsa::{BigUint, RsaPrivateKey, RsaPublicKey};
use serde_json::{Map, Value};

use super::{bytes_parameter, optional_bytes_parameter, KeyError};

fn uint_parameter(jwk: &Map<String, Value>, name: &'static str) -> Result<BigUint, KeyError> {
    let bytes = bytes_parameter(jwk, name)?;
    Ok(BigUint::from_bytes_be(&bytes))
}

fn optional_uint_parameter(
    jwk: &Map<String, Value>,
    name: &'static str,
) -> Result<Option<BigUint>, KeyError> {
    Ok(optional_bytes_parameter(jwk, name)?.map(|bytes| BigUint::from_bytes_be(&bytes)))
}

/// Builds a public RSA key from the `n` and `e` parameters.
pub(crate) fn public_key(jwk: &Map<String, Value>) -> Result<RsaPublicKey, KeyError> {
    let n = uint_parameter(jwk, "n")?;
    let e = uint_parameter(jwk, "e")?;

    RsaPublicKey::new(n, e).map_err(KeyError::InvalidRsaKey)
}

/// Builds a private RSA key from the `n`, `e` and `d` parameters, using the
/// prime factors `p` and `q` when the JWK carries them.
///
/// The CRT exponents are recomputed from the primes rather than read from
/// `dp`/`dq`/`qi`; keys without primes fall back to the non-CRT signing
/// path.
pub(crate) fn private_key(jwk: &Map<String, Value>) -> Result<RsaPrivateKey, KeyError> {
    let n = uint_parameter(jwk, "n")?;
    let e = uint_parameter(jwk, "e")?;
    let d = uint_parameter(jwk, "d")?;
    let p = optional_uint_parameter(jwk, "p")?;
    let q = optional_uint_parameter(jwk, "q")?;

    let primes = match (p, q) {
        (Some(p), Some(q)) => vec![p, q],
        _ => Vec::new(),
    };
    let have_primes = !primes.is_empty();

    let mut key = RsaPrivateKey::from_components(n, e, d, primes).map_err(KeyError::InvalidRsaKey)?;
    if have_primes {
        key.precompute().map_err(KeyError::InvalidRsaKey)?;
    }

    Ok(key)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn public_key_requires_n_and_e() {
        let jwk = json!({ "kty": "RSA", "e": "AQAB" });
        assert!(matches!(
            public_key(jwk.as_object().unwrap()),
            Err(KeyError::MissingParameter("n"))
        ));
    }

    #[test]
    fn private_key_requires_d() {
        let jwk = json!({ "kty": "RSA", "n": "3Zc", "e": "AQAB" });
        assert!(matches!(
            private_key(jwk.as_object().unwrap()),
            Err(KeyError::MissingParameter("d"))
        ));
    }
}
