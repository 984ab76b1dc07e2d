//! Helpers for base64 urlsafe encoded stuff

use core::{borrow::Borrow, fmt, ops::Deref, str::FromStr};

use base64ct::{Base64UrlUnpadded, Encoding};
use thiserror::Error;

const VALID_CHARS: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

/// The error returned when a string contains characters outside the
/// base64url alphabet.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("string contains characters outside the base64url alphabet")]
pub struct InvalidBase64UrlString;

/// Wrapper around a string that is guaranteed to only contain characters
/// from the urlsafe base64 alphabet, without padding.
#[derive(Debug, Default, Eq, PartialEq, Clone, Hash)]
#[repr(transparent)]
pub(crate) struct Base64UrlString(String);

impl Base64UrlString {
    /// Encode the given bytes into an unpadded base64url string.
    pub(crate) fn encode(bytes: impl AsRef<[u8]>) -> Base64UrlString {
        Self(Base64UrlUnpadded::encode_string(bytes.as_ref()))
    }

    /// Decodes this string into the raw bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the string has an impossible length or carries
    /// non-zero trailing bits.
    pub(crate) fn decode(&self) -> Result<Vec<u8>, base64ct::Error> {
        Base64UrlUnpadded::decode_vec(&self.0)
    }

    pub(crate) fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

/// Decodes a base64url parameter value, accepting both the padded and the
/// unpadded form.
pub(crate) fn decode_loose(value: &str) -> Result<Vec<u8>, base64ct::Error> {
    Base64UrlUnpadded::decode_vec(value.trim_end_matches('='))
}

impl FromStr for Base64UrlString {
    type Err = InvalidBase64UrlString;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.chars().all(|c| VALID_CHARS.contains(c)) {
            Ok(Self(s.to_owned()))
        } else {
            Err(InvalidBase64UrlString)
        }
    }
}

impl Deref for Base64UrlString {
    type Target = str;

    fn deref(&self) -> &str {
        self.0.as_str()
    }
}

impl Borrow<str> for Base64UrlString {
    fn borrow(&self) -> &str {
        self.0.as_str()
    }
}

impl From<Base64UrlString> for String {
    fn from(x: Base64UrlString) -> Self {
        x.0
    }
}

impl fmt::Display for Base64UrlString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let inputs: &[&[u8]] = &[
            b"",
            b"f",
            b"fo",
            b"foo",
            b"foob",
            b"fooba",
            b"foobar",
            &[0xff, 0x00, 0xab, 0xcd],
        ];

        for input in inputs {
            let encoded = Base64UrlString::encode(input);
            assert_eq!(encoded.decode().unwrap(), *input);
        }

        let all_bytes = (0..=255u8).collect::<Vec<_>>();
        let encoded = Base64UrlString::encode(&all_bytes);
        assert_eq!(encoded.decode().unwrap(), all_bytes);
    }

    #[test]
    fn no_padding_on_output() {
        let encoded = Base64UrlString::encode(b"any carnal pleasure");
        assert!(!encoded.as_str().contains('='));
    }

    #[test]
    fn rejects_foreign_characters() {
        assert_eq!(
            "ab+cd".parse::<Base64UrlString>(),
            Err(InvalidBase64UrlString)
        );
        assert_eq!(
            "ab=cd".parse::<Base64UrlString>(),
            Err(InvalidBase64UrlString)
        );
        assert!("AZaz09-_".parse::<Base64UrlString>().is_ok());
        assert!("".parse::<Base64UrlString>().is_ok());
    }

    #[test]
    fn loose_decode_accepts_padding() {
        assert_eq!(decode_loose("Zm9v").unwrap(), b"foo");
        assert_eq!(decode_loose("Zm8=").unwrap(), b"fo");
        assert_eq!(decode_loose("Zm8").unwrap(), b"fo");
        assert!(decode_loose("Zm8*").is_err());
    }
}
