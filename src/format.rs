//! The JWS Compact Serialization format as defined in
//! [section 3.1 of RFC 7515]
//!
//! A serialized token is exactly three base64url segments around two dots:
//! the JOSE header, the claims, and the raw signature (empty for unsecured
//! tokens, with the trailing dot still present).
//!
//! [section 3.1 of RFC 7515]: <https://datatracker.ietf.org/doc/html/rfc7515#section-3.1>

use core::fmt;

use thiserror::Error;

use crate::base64_url::{Base64UrlString, InvalidBase64UrlString};

/// The three segments of a compact-serialized JWS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Compact {
    pub(crate) header: Base64UrlString,
    pub(crate) claims: Base64UrlString,
    pub(crate) signature: Base64UrlString,
}

/// The ways a string can fail to split into the three compact segments.
#[derive(Debug, Error)]
pub(crate) enum SplitError {
    #[error("token must have exactly three dot-separated segments, found {0}")]
    SegmentCount(usize),
    #[error(transparent)]
    InvalidBase64(#[from] InvalidBase64UrlString),
}

impl Compact {
    /// Splits a token into its header, claims and signature segments,
    /// requiring exactly two `.` separators and the base64url alphabet in
    /// every segment.
    pub(crate) fn split(token: &str) -> Result<Self, SplitError> {
        let mut segments = token.split('.');

        match (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) {
            (Some(header), Some(claims), Some(signature), None) => Ok(Self {
                header: header.parse()?,
                claims: claims.parse()?,
                signature: signature.parse()?,
            }),
            _ => Err(SplitError::SegmentCount(token.matches('.').count() + 1)),
        }
    }
}

impl fmt::Display for Compact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.header, self.claims, self.signature)
    }
}

/// Builds the JWS Signing Input from the already encoded header and claims
/// segments.
///
/// The result is the ASCII byte sequence `BASE64URL(header) || '.' ||
/// BASE64URL(claims)`, exactly the bytes that get signed and verified.
pub(crate) fn signing_input(header: &Base64UrlString, claims: &Base64UrlString) -> Vec<u8> {
    let mut input = Vec::with_capacity(header.as_bytes().len() + 1 + claims.as_bytes().len());
    input.extend_from_slice(header.as_bytes());
    input.push(b'.');
    input.extend_from_slice(claims.as_bytes());
    input
}
