//! The JSON Web Algorithm (JWA) identifiers for signing operations as
//! defined in [RFC 7518 section 3]
//!
//! [RFC 7518 section 3]: <https://datatracker.ietf.org/doc/html/rfc7518#section-3>

use core::{fmt, str::FromStr};

use thiserror::Error;

/// A JSON Web Algorithm (JWA) for signing operations (JWS).
///
/// This enum covers the `alg` Header Parameter Values for JWS. It represents
/// the subset of the table from [section 3.1 of RFC 7518] that is understood
/// by this crate.
///
/// [section 3.1 of RFC 7518]: <https://datatracker.ietf.org/doc/html/rfc7518#section-3.1>
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JsonWebSigningAlgorithm {
    /// The "none" algorithm as defined in [section 3.6 of RFC 7518].
    ///
    /// A token using this algorithm carries no integrity protection. It is
    /// only ever a parse state; signing with it is rejected.
    ///
    /// [section 3.6 of RFC 7518]: <https://datatracker.ietf.org/doc/html/rfc7518#section-3.6>
    #[default]
    None,
    /// HMAC using SHA-256
    Hs256,
    /// HMAC using SHA-384
    Hs384,
    /// HMAC using SHA-512
    Hs512,
    /// RSASSA-PKCS1-v1_5 using SHA-256
    Rs256,
    /// RSASSA-PKCS1-v1_5 using SHA-384
    Rs384,
    /// RSASSA-PKCS1-v1_5 using SHA-512
    Rs512,
    /// ECDSA using P-256 and SHA-256
    Es256,
    /// ECDSA using P-384 and SHA-384
    Es384,
    /// ECDSA using P-521 and SHA-512
    Es512,
}

impl JsonWebSigningAlgorithm {
    /// The `alg` Header Parameter Value for this algorithm.
    ///
    /// Identifiers are case-sensitive, matching the registry in RFC 7518.
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Hs256 => "HS256",
            Self::Hs384 => "HS384",
            Self::Hs512 => "HS512",
            Self::Rs256 => "RS256",
            Self::Rs384 => "RS384",
            Self::Rs512 => "RS512",
            Self::Es256 => "ES256",
            Self::Es384 => "ES384",
            Self::Es512 => "ES512",
        }
    }

    /// Looks up an algorithm by its (case-sensitive) `alg` Header Parameter
    /// Value. Returns `None` for identifiers outside the table above.
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "none" => Self::None,
            "HS256" => Self::Hs256,
            "HS384" => Self::Hs384,
            "HS512" => Self::Hs512,
            "RS256" => Self::Rs256,
            "RS384" => Self::Rs384,
            "RS512" => Self::Rs512,
            "ES256" => Self::Es256,
            "ES384" => Self::Es384,
            "ES512" => Self::Es512,
            _ => return None,
        })
    }

    /// Whether this is the `none` algorithm.
    pub const fn is_none(self) -> bool {
        matches!(self, Self::None)
    }
}

/// The error returned when parsing an `alg` value that is not in the
/// algorithm table.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown JSON Web Signing Algorithm: `{0}`")]
pub struct UnknownAlgorithmError(pub String);

impl FromStr for JsonWebSigningAlgorithm {
    type Err = UnknownAlgorithmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| UnknownAlgorithmError(s.to_owned()))
    }
}

impl fmt::Display for JsonWebSigningAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::JsonWebSigningAlgorithm as Alg;

    #[test]
    fn name_roundtrip() {
        let all = [
            Alg::None,
            Alg::Hs256,
            Alg::Hs384,
            Alg::Hs512,
            Alg::Rs256,
            Alg::Rs384,
            Alg::Rs512,
            Alg::Es256,
            Alg::Es384,
            Alg::Es512,
        ];

        for alg in all {
            assert_eq!(Alg::from_name(alg.name()), Some(alg));
            assert_eq!(alg.name().parse::<Alg>(), Ok(alg));
        }
    }

    #[test]
    fn identifiers_are_case_sensitive() {
        assert_eq!(Alg::from_name("hs256"), None);
        assert_eq!(Alg::from_name("None"), None);
        assert_eq!(Alg::from_name("es512"), None);
    }

    #[test]
    fn unknown_identifiers_are_rejected() {
        assert_eq!(Alg::from_name("PS256"), None);
        assert_eq!(Alg::from_name("EdDSA"), None);
        assert_eq!(Alg::from_name(""), None);
    }
}
