//! Digest, MAC and signature primitives, and the algorithm dispatch that
//! computes and checks JWS signatures.
//!
//! The primitives are thin adapters over the RustCrypto crates. ECDSA
//! signatures use the fixed-length `R || S` encoding JWS requires, which is
//! the native byte form of [`ecdsa::Signature`], so no conversion from or to
//! ASN.1 DER happens anywhere.

use ::rsa::Pkcs1v15Sign;
use hmac::{Hmac, Mac};
use p256::NistP256;
use p384::NistP384;
use p521::NistP521;
use rand::rngs::OsRng;
use serde_json::{Map, Value};
use sha2::{Digest as _, Sha256, Sha384, Sha512};
use signature::{RandomizedSigner as _, Verifier as _};
use subtle::ConstantTimeEq as _;
use thiserror::Error;

use crate::{
    jwa::JsonWebSigningAlgorithm,
    jwk::{
        self,
        ec::{EcPrivateKey, EcPublicKey},
        KeyError,
    },
};

/// The SHA-2 variant tied to a signing algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Sha2 {
    Sha256,
    Sha384,
    Sha512,
}

/// One-shot digest over arbitrary bytes, returning the fixed-length hash.
pub(crate) fn hash(alg: Sha2, data: &[u8]) -> Vec<u8> {
    match alg {
        Sha2::Sha256 => Sha256::digest(data).to_vec(),
        Sha2::Sha384 => Sha384::digest(data).to_vec(),
        Sha2::Sha512 => Sha512::digest(data).to_vec(),
    }
}

/// One-shot HMAC over arbitrary bytes, returning a MAC of the digest length.
pub(crate) fn hmac(alg: Sha2, key: &[u8], data: &[u8]) -> Result<Vec<u8>, digest::InvalidLength> {
    Ok(match alg {
        Sha2::Sha256 => Hmac::<Sha256>::new_from_slice(key)?
            .chain_update(data)
            .finalize()
            .into_bytes()
            .to_vec(),
        Sha2::Sha384 => Hmac::<Sha384>::new_from_slice(key)?
            .chain_update(data)
            .finalize()
            .into_bytes()
            .to_vec(),
        Sha2::Sha512 => Hmac::<Sha512>::new_from_slice(key)?
            .chain_update(data)
            .finalize()
            .into_bytes()
            .to_vec(),
    })
}

/// Different kinds of errors that can occur while signing a token.
#[derive(Debug, Error)]
pub enum SignError {
    /// Signing with the `none` algorithm is always rejected.
    #[error("refusing to sign with the `none` algorithm")]
    UnsecuredAlgorithm,
    /// The HMAC key could not be initialized from the `k` parameter.
    #[error("invalid HMAC key length")]
    InvalidHmacKey(#[from] digest::InvalidLength),
    /// The JWK did not materialize into a usable key.
    #[error(transparent)]
    Key(#[from] KeyError),
    /// The RSA signing primitive failed.
    #[error("RSA signing failed")]
    Rsa(#[source] ::rsa::Error),
    /// The ECDSA signing primitive failed.
    #[error("ECDSA signing failed")]
    Ecdsa(#[source] signature::Error),
    /// The header or claims could not be serialized to JSON.
    #[error("failed to serialize the signing input")]
    Serialize(#[source] serde_json::Error),
    /// The produced signature exceeds the supported maximum size.
    #[error("signature of {0} bytes exceeds the supported maximum")]
    OversizedSignature(usize),
}

/// Different kinds of errors that can occur while checking a signature.
///
/// These never escape [`has_valid_signature`]; they are logged and collapse
/// to `false`.
///
/// [`has_valid_signature`]: crate::JsonWebToken::has_valid_signature
#[derive(Debug, Error)]
pub(crate) enum VerifyError {
    #[error(transparent)]
    Key(#[from] KeyError),
    #[error("invalid HMAC key length")]
    InvalidHmacKey(#[from] digest::InvalidLength),
}

/// Computes the raw signature over `signing_input` with the key materialized
/// from `jwk`.
pub(crate) fn sign(
    alg: JsonWebSigningAlgorithm,
    signing_input: &[u8],
    jwk: &Map<String, Value>,
) -> Result<Vec<u8>, SignError> {
    use JsonWebSigningAlgorithm::*;

    match alg {
        None => Err(SignError::UnsecuredAlgorithm),
        Hs256 | Hs384 | Hs512 => {
            let key = jwk::symmetric::key(jwk)?;
            Ok(hmac(sha2_of(alg), &key, signing_input)?)
        }
        Rs256 | Rs384 | Rs512 => {
            let key = jwk::rsa::private_key(jwk)?;
            let hashed = hash(sha2_of(alg), signing_input);
            let mut rng = OsRng;

            let signature = match alg {
                Rs256 => key.sign_with_rng(&mut rng, Pkcs1v15Sign::new::<Sha256>(), &hashed),
                Rs384 => key.sign_with_rng(&mut rng, Pkcs1v15Sign::new::<Sha384>(), &hashed),
                _ => key.sign_with_rng(&mut rng, Pkcs1v15Sign::new::<Sha512>(), &hashed),
            };

            signature.map_err(SignError::Rsa)
        }
        Es256 => {
            let EcPrivateKey::P256(secret) = jwk::ec::private_key(jwk)? else {
                return Err(KeyError::CurveMismatch.into());
            };
            let key = ecdsa::SigningKey::<NistP256>::from(&secret);
            let signature: ecdsa::Signature<NistP256> = key
                .try_sign_with_rng(&mut OsRng, signing_input)
                .map_err(SignError::Ecdsa)?;
            Ok(signature.to_bytes().to_vec())
        }
        Es384 => {
            let EcPrivateKey::P384(secret) = jwk::ec::private_key(jwk)? else {
                return Err(KeyError::CurveMismatch.into());
            };
            let key = ecdsa::SigningKey::<NistP384>::from(&secret);
            let signature: ecdsa::Signature<NistP384> = key
                .try_sign_with_rng(&mut OsRng, signing_input)
                .map_err(SignError::Ecdsa)?;
            Ok(signature.to_bytes().to_vec())
        }
        Es512 => {
            let EcPrivateKey::P521(secret) = jwk::ec::private_key(jwk)? else {
                return Err(KeyError::CurveMismatch.into());
            };
            let key: p521::ecdsa::SigningKey = ecdsa::SigningKey::<NistP521>::from(&secret).into();
            let signature: ecdsa::Signature<NistP521> = key
                .try_sign_with_rng(&mut OsRng, signing_input)
                .map_err(SignError::Ecdsa)?;
            Ok(signature.to_bytes().to_vec())
        }
    }
}

/// Checks `signature` over `signing_input` with the key materialized from
/// `jwk`.
///
/// A signature that simply does not match yields `Ok(false)`; only failures
/// to materialize the key are reported as errors.
pub(crate) fn verify(
    alg: JsonWebSigningAlgorithm,
    signing_input: &[u8],
    signature: &[u8],
    jwk: &Map<String, Value>,
) -> Result<bool, VerifyError> {
    use JsonWebSigningAlgorithm::*;

    match alg {
        None => Ok(false),
        Hs256 | Hs384 | Hs512 => {
            let key = jwk::symmetric::key(jwk)?;
            let expected = hmac(sha2_of(alg), &key, signing_input)?;
            Ok(bool::from(expected.ct_eq(signature)))
        }
        Rs256 | Rs384 | Rs512 => {
            let key = jwk::rsa::public_key(jwk)?;
            let hashed = hash(sha2_of(alg), signing_input);

            let result = match alg {
                Rs256 => key.verify(Pkcs1v15Sign::new::<Sha256>(), &hashed, signature),
                Rs384 => key.verify(Pkcs1v15Sign::new::<Sha384>(), &hashed, signature),
                _ => key.verify(Pkcs1v15Sign::new::<Sha512>(), &hashed, signature),
            };

            Ok(result.is_ok())
        }
        Es256 => {
            let EcPublicKey::P256(public) = jwk::ec::public_key(jwk)? else {
                return Err(KeyError::CurveMismatch.into());
            };
            let Ok(signature) = ecdsa::Signature::<NistP256>::try_from(signature) else {
                return Ok(false);
            };
            let key = ecdsa::VerifyingKey::<NistP256>::from(&public);
            Ok(key.verify(signing_input, &signature).is_ok())
        }
        Es384 => {
            let EcPublicKey::P384(public) = jwk::ec::public_key(jwk)? else {
                return Err(KeyError::CurveMismatch.into());
            };
            let Ok(signature) = ecdsa::Signature::<NistP384>::try_from(signature) else {
                return Ok(false);
            };
            let key = ecdsa::VerifyingKey::<NistP384>::from(&public);
            Ok(key.verify(signing_input, &signature).is_ok())
        }
        Es512 => {
            let EcPublicKey::P521(public) = jwk::ec::public_key(jwk)? else {
                return Err(KeyError::CurveMismatch.into());
            };
            let Ok(signature) = ecdsa::Signature::<NistP521>::try_from(signature) else {
                return Ok(false);
            };
            let key: p521::ecdsa::VerifyingKey = ecdsa::VerifyingKey::<NistP521>::from(&public).into();
            Ok(key.verify(signing_input, &signature).is_ok())
        }
    }
}

fn sha2_of(alg: JsonWebSigningAlgorithm) -> Sha2 {
    use JsonWebSigningAlgorithm::*;

    match alg {
        Hs256 | Rs256 | Es256 => Sha2::Sha256,
        Hs384 | Rs384 | Es384 => Sha2::Sha384,
        _ => Sha2::Sha512,
    }
}
