//! Elliptic curve keys from the JWK parameters defined in
//! [RFC 7518 section 6.2]
//!
//! Coordinates and the private scalar are base64url encoded big-endian
//! unsigned values. Values shorter than the curve's field width are
//! left-zero-padded, wider ones are rejected.
//!
//! [RFC 7518 section 6.2]: <https://datatracker.ietf.org/doc/html/rfc7518#section-6.2>

use elliptic_curve::{
    sec1::{EncodedPoint, FromEncodedPoint, ModulusSize, ToEncodedPoint, ValidatePublicKey as _},
    CurveArithmetic, FieldBytes, PublicKey, SecretKey,
};
use p256::NistP256;
use p384::NistP384;
use p521::NistP521;
use serde_json::{Map, Value};
use zeroize::Zeroize as _;

use super::{bytes_parameter, string_parameter, KeyError};

/// The named curves understood by this crate, keyed by the JWK `crv`
/// parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EcCurve {
    /// secp256r1
    P256,
    /// secp384r1
    P384,
    /// secp521r1
    P521,
}

impl EcCurve {
    fn from_crv(crv: &str) -> Option<Self> {
        Some(match crv {
            "P-256" => Self::P256,
            "P-384" => Self::P384,
            "P-521" => Self::P521,
            _ => return None,
        })
    }
}

/// A private EC key, erased over the supported curves.
pub(crate) enum EcPrivateKey {
    P256(SecretKey<NistP256>),
    P384(SecretKey<NistP384>),
    P521(SecretKey<NistP521>),
}

/// A public EC key, erased over the supported curves.
pub(crate) enum EcPublicKey {
    P256(PublicKey<NistP256>),
    P384(PublicKey<NistP384>),
    P521(PublicKey<NistP521>),
}

fn curve(jwk: &Map<String, Value>) -> Result<EcCurve, KeyError> {
    let crv = string_parameter(jwk, "crv")?;
    EcCurve::from_crv(crv).ok_or_else(|| KeyError::UnknownCurve(crv.to_owned()))
}

/// Left-pads a decoded JWK field element to the curve's fixed width.
fn field_bytes<C: elliptic_curve::Curve>(bytes: &[u8]) -> Result<FieldBytes<C>, KeyError> {
    let mut out = FieldBytes::<C>::default();
    let width = out.len();

    if bytes.len() > width {
        return Err(KeyError::FieldWidth {
            expected: width,
            actual: bytes.len(),
        });
    }
    out[width - bytes.len()..].copy_from_slice(bytes);
    Ok(out)
}

fn public_typed<C>(jwk: &Map<String, Value>) -> Result<PublicKey<C>, KeyError>
where
    C: elliptic_curve::Curve + CurveArithmetic,
    C::FieldBytesSize: ModulusSize,
    C::AffinePoint: FromEncodedPoint<C> + ToEncodedPoint<C>,
{
    let x = field_bytes::<C>(&bytes_parameter(jwk, "x")?)?;
    let y = field_bytes::<C>(&bytes_parameter(jwk, "y")?)?;

    let point = EncodedPoint::<C>::from_affine_coordinates(&x, &y, false);
    let key: Option<PublicKey<C>> = PublicKey::from_encoded_point(&point).into();
    key.ok_or(KeyError::InvalidEcPoint)
}

fn private_typed<C>(jwk: &Map<String, Value>) -> Result<SecretKey<C>, KeyError>
where
    C: elliptic_curve::Curve + CurveArithmetic,
    C::FieldBytesSize: ModulusSize,
    C::AffinePoint: FromEncodedPoint<C> + ToEncodedPoint<C>,
{
    let mut d = field_bytes::<C>(&bytes_parameter(jwk, "d")?)?;
    let secret = SecretKey::<C>::from_bytes(&d).map_err(KeyError::InvalidEcScalar);
    d.as_mut_slice().zeroize();
    let secret = secret?;

    // When the JWK also carries the public point, it must match d * G.
    // Without coordinates the public point is derived from the scalar.
    if jwk.contains_key("x") && jwk.contains_key("y") {
        let x = field_bytes::<C>(&bytes_parameter(jwk, "x")?)?;
        let y = field_bytes::<C>(&bytes_parameter(jwk, "y")?)?;
        let point = EncodedPoint::<C>::from_affine_coordinates(&x, &y, false);
        C::validate_public_key(&secret, &point).map_err(|_| KeyError::InvalidEcPoint)?;
    }

    Ok(secret)
}

/// Builds a public EC key from the `crv`, `x` and `y` parameters.
pub(crate) fn public_key(jwk: &Map<String, Value>) -> Result<EcPublicKey, KeyError> {
    Ok(match curve(jwk)? {
        EcCurve::P256 => EcPublicKey::P256(public_typed::<NistP256>(jwk)?),
        EcCurve::P384 => EcPublicKey::P384(public_typed::<NistP384>(jwk)?),
        EcCurve::P521 => EcPublicKey::P521(public_typed::<NistP521>(jwk)?),
    })
}

/// Builds a private EC key from the `crv` and `d` parameters, validating the
/// `x`/`y` coordinates against the scalar when they are present.
pub(crate) fn private_key(jwk: &Map<String, Value>) -> Result<EcPrivateKey, KeyError> {
    Ok(match curve(jwk)? {
        EcCurve::P256 => EcPrivateKey::P256(private_typed::<NistP256>(jwk)?),
        EcCurve::P384 => EcPrivateKey::P384(private_typed::<NistP384>(jwk)?),
        EcCurve::P521 => EcPrivateKey::P521(private_typed::<NistP521>(jwk)?),
    })
}

#[cfg(test)]
mod tests {
    use base64ct::{Base64UrlUnpadded, Encoding};
    use elliptic_curve::sec1::ToEncodedPoint as _;
    use serde_json::{json, Map, Value};

    use super::*;

    fn p256_jwk(private: bool) -> Map<String, Value> {
        let secret = p256::SecretKey::random(&mut rand::thread_rng());
        let point = secret.public_key().to_encoded_point(false);

        let mut jwk = json!({
            "kty": "EC",
            "crv": "P-256",
            "x": Base64UrlUnpadded::encode_string(point.x().unwrap()),
            "y": Base64UrlUnpadded::encode_string(point.y().unwrap()),
        });
        if private {
            jwk["d"] = json!(Base64UrlUnpadded::encode_string(&secret.to_bytes()));
        }
        jwk.as_object().unwrap().clone()
    }

    #[test]
    fn public_key_from_coordinates() {
        let jwk = p256_jwk(false);
        assert!(matches!(public_key(&jwk), Ok(EcPublicKey::P256(_))));
    }

    #[test]
    fn private_key_without_coordinates() {
        let mut jwk = p256_jwk(true);
        jwk.remove("x");
        jwk.remove("y");
        assert!(matches!(private_key(&jwk), Ok(EcPrivateKey::P256(_))));
    }

    #[test]
    fn mismatched_point_is_rejected() {
        let mut jwk = p256_jwk(true);
        let other = p256_jwk(false);
        jwk.insert("x".to_owned(), other["x"].clone());
        jwk.insert("y".to_owned(), other["y"].clone());
        assert!(matches!(private_key(&jwk), Err(KeyError::InvalidEcPoint)));
    }

    #[test]
    fn unknown_curve_is_rejected() {
        let mut jwk = p256_jwk(false);
        jwk.insert("crv".to_owned(), json!("secp256k1"));
        assert!(matches!(
            public_key(&jwk),
            Err(KeyError::UnknownCurve(crv)) if crv == "secp256k1"
        ));
    }

    #[test]
    fn oversized_coordinate_is_rejected() {
        let mut jwk = p256_jwk(false);
        jwk.insert(
            "x".to_owned(),
            json!(Base64UrlUnpadded::encode_string(&[0xab; 33])),
        );
        assert!(matches!(
            public_key(&jwk),
            Err(KeyError::FieldWidth {
                expected: 32,
                actual: 33,
            })
        ));
    }
}
