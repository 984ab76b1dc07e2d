//! Create, sign, verify and serialize JSON Web Tokens ([RFC 7519]) carried
//! in the JWS Compact Serialization form ([RFC 7515]), with signing keys
//! supplied as JSON Web Keys ([RFC 7517]).
//!
//! The crate covers the HS256/384/512 (HMAC), RS256/384/512
//! (RSASSA-PKCS1-v1_5) and ES256/384/512 (ECDSA over P-256/P-384/P-521)
//! algorithm families. Encryption (JWE), key discovery and claim semantic
//! validation are out of scope; errors are values and no operation panics
//! on adversarial input.
//!
//! ```
//! use serde_json::json;
//! use webtoken::{JsonWebSigningAlgorithm, JsonWebToken};
//!
//! let jwk = json!({ "kty": "oct", "k": "aGVsbG8gd29ybGQgaGVsbG8gd29ybGQgaGVsbG8gd29ybGQ" });
//! let jwk = jwk.as_object().unwrap();
//!
//! let mut jwt = JsonWebToken::new(None);
//! jwt.set_claim_string("sub", "1234567890");
//! jwt.sign(JsonWebSigningAlgorithm::Hs256, jwk)?;
//!
//! let compact = jwt.encode()?;
//! let parsed: JsonWebToken = compact.parse()?;
//! assert!(parsed.has_valid_signature(jwk));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! [RFC 7515]: <https://datatracker.ietf.org/doc/html/rfc7515>
//! [RFC 7517]: <https://datatracker.ietf.org/doc/html/rfc7517>
//! [RFC 7519]: <https://datatracker.ietf.org/doc/html/rfc7519>
#![warn(
    missing_docs,
    missing_debug_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    explicit_outlives_requirements,
    clippy::missing_errors_doc
)]
#![deny(
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    macro_use_extern_crate,
    non_ascii_idents,
    elided_lifetimes_in_paths
)]
#![forbid(unsafe_code)]

pub(crate) mod base64_url;
pub(crate) mod crypto;
pub(crate) mod format;

pub mod jwa;
pub mod jwk;
pub mod jwt;

#[doc(inline)]
pub use self::{
    crypto::SignError,
    jwa::{JsonWebSigningAlgorithm, UnknownAlgorithmError},
    jwk::KeyError,
    jwt::{ClaimKind, JsonWebToken, ParseError, VerifyOptions, MAX_SIGNATURE_SIZE},
};

/// Type alias to make [`JsonWebToken`] easier to access.
pub type Jwt = JsonWebToken;
