//! JSON Web Tokens (JWT) as defined in [RFC 7519], carried in the JWS
//! Compact Serialization form of [RFC 7515].
//!
//! A [`JsonWebToken`] owns a JOSE header and a claims object, both plain
//! JSON objects, together with the signature computed over them. The exact
//! textual form of the header and claims at signing time is retained so
//! that verification rehashes the same bytes that were signed, even when
//! the JSON trees would serialize differently (whitespace, member order).
//! Any mutation of the claims invalidates the cached text and resets the
//! token to its unsigned state.
//!
//! [RFC 7519]: <https://datatracker.ietf.org/doc/html/rfc7519>
//! [RFC 7515]: <https://datatracker.ietf.org/doc/html/rfc7515>

use core::str::FromStr;

use serde_json::{Map, Number, Value};
use thiserror::Error;

use crate::{
    base64_url::Base64UrlString,
    crypto::{self, SignError},
    format::{self, Compact},
    jwa::JsonWebSigningAlgorithm,
};

/// Largest raw signature accepted or produced, in bytes.
pub const MAX_SIGNATURE_SIZE: usize = 2048;

/// The JSON value type of a claim, as reported by
/// [`JsonWebToken::claim_kind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimKind {
    /// The claim is `null` or not present at all.
    Null,
    /// A boolean claim.
    Bool,
    /// A numeric claim.
    Number,
    /// A string claim.
    String,
    /// An array claim.
    Array,
    /// An object claim.
    Object,
}

/// Options controlling signature verification.
#[derive(Debug, Clone, Copy, Default)]
pub struct VerifyOptions {
    /// Treat an unsecured token (`alg` is `none` and the signature is
    /// empty) as valid. Off by default.
    pub allow_unsecured: bool,
}

/// Different kinds of errors that can occur while parsing a token from its
/// compact serialization.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The input did not consist of exactly three dot-separated segments.
    #[error("token must have exactly three dot-separated segments, found {0}")]
    SegmentCount(usize),
    /// A segment contains characters outside the base64url alphabet.
    #[error("segment contains characters outside the base64url alphabet")]
    InvalidBase64,
    /// A segment has an impossible base64url length or trailing bits.
    #[error("segment is not decodable base64url")]
    InvalidEncoding(#[from] base64ct::Error),
    /// The header or claims segment decoded to bytes that are not UTF-8.
    #[error("header or claims segment is not valid UTF-8")]
    InvalidUtf8,
    /// The header or claims segment is not well-formed JSON.
    #[error("header or claims segment is not valid JSON")]
    InvalidJson(#[source] serde_json::Error),
    /// The JOSE header is valid JSON but not an object.
    #[error("the JOSE header must be a JSON object")]
    HeaderNotObject,
    /// The claims segment is valid JSON but not an object.
    #[error("the claims segment must be a JSON object")]
    ClaimsNotObject,
    /// The `alg` header parameter is present but not a string.
    #[error("the `alg` header parameter must be a string")]
    AlgorithmNotString,
    /// The `alg` header parameter names an algorithm outside the table in
    /// [`JsonWebSigningAlgorithm`].
    #[error(transparent)]
    UnknownAlgorithm(#[from] crate::jwa::UnknownAlgorithmError),
    /// An unsecured token (`alg` is `none` or absent) carries a signature.
    #[error("unsecured token carries a signature")]
    UnexpectedSignature,
    /// A secured token carries an empty signature segment.
    #[error("token declares `{0}` but carries no signature")]
    MissingSignature(JsonWebSigningAlgorithm),
    /// The signature segment decodes to more than [`MAX_SIGNATURE_SIZE`]
    /// bytes.
    #[error("signature of {0} bytes exceeds the supported maximum")]
    OversizedSignature(usize),
}

/// A JSON Web Token carried as a JWS in Compact Serialization.
///
/// A fresh token is unsecured: its algorithm is
/// [`None`](JsonWebSigningAlgorithm::None) and it has no signature. Claims
/// can be populated, the token signed with a JWK, and the result exported
/// with [`encode`](Self::encode). Parsing an existing compact serialization
/// goes through [`FromStr`]; the parsed token keeps the signature and the
/// exact signed bytes until [`has_valid_signature`] is asked to check them.
///
/// [`has_valid_signature`]: Self::has_valid_signature
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use webtoken::{JsonWebSigningAlgorithm, JsonWebToken};
///
/// let jwk = json!({
///     "kty": "oct",
///     "k": "AyM1SysPpbyDfgZld3umj1qzKObwVMkoqQ-EstJQLr_T-1qS0gZH75aKtMN3Yj0iPS4hcgUuTwjAzZr1Z9CAow",
/// });
/// let jwk = jwk.as_object().unwrap();
///
/// let mut jwt = JsonWebToken::new(None);
/// jwt.set_claim_string("iss", "joe");
/// jwt.sign(JsonWebSigningAlgorithm::Hs256, jwk).unwrap();
///
/// let compact = jwt.encode().unwrap();
/// let parsed: JsonWebToken = compact.parse().unwrap();
/// assert!(parsed.has_valid_signature(jwk));
/// ```
#[derive(Debug, Clone)]
pub struct JsonWebToken {
    header: Map<String, Value>,
    header_text: Option<String>,
    claims: Map<String, Value>,
    claims_text: Option<String>,
    algorithm: JsonWebSigningAlgorithm,
    signature: Vec<u8>,
}

impl JsonWebToken {
    /// Creates a new, empty token with the given `typ` header parameter,
    /// defaulting to `"JWT"`.
    pub fn new(typ: Option<&str>) -> Self {
        let mut header = Map::new();
        header.insert(
            "typ".to_owned(),
            Value::String(typ.unwrap_or("JWT").to_owned()),
        );

        Self {
            header,
            header_text: None,
            claims: Map::new(),
            claims_text: None,
            algorithm: JsonWebSigningAlgorithm::None,
            signature: Vec::new(),
        }
    }

    /// Returns the signature algorithm this token is currently signed with.
    pub fn algorithm(&self) -> JsonWebSigningAlgorithm {
        self.algorithm
    }

    /// Returns the JOSE header as a JSON object.
    pub fn header(&self) -> &Map<String, Value> {
        &self.header
    }

    /// Returns the claims as a JSON object.
    pub fn claims(&self) -> &Map<String, Value> {
        &self.claims
    }

    /// Returns a mutable handle to the claims object.
    ///
    /// Taking the handle counts as a mutation: the cached claims text and
    /// any existing signature are discarded and the token returns to its
    /// unsigned state.
    pub fn claims_mut(&mut self) -> &mut Map<String, Value> {
        self.invalidate_claims();
        &mut self.claims
    }

    /// Returns the value of the named claim.
    pub fn claim(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }

    /// Returns the string value of the named claim, or `None` if the claim
    /// is absent or not a string.
    pub fn claim_string(&self, name: &str) -> Option<&str> {
        self.claims.get(name).and_then(Value::as_str)
    }

    /// Returns the number value of the named claim, or `0.0` if the claim
    /// is absent or not a number.
    pub fn claim_number(&self, name: &str) -> f64 {
        self.claims
            .get(name)
            .and_then(Value::as_f64)
            .unwrap_or(0.0)
    }

    /// Returns the JSON value type of the named claim.
    ///
    /// Absent claims report [`ClaimKind::Null`].
    pub fn claim_kind(&self, name: &str) -> ClaimKind {
        match self.claims.get(name) {
            None | Some(Value::Null) => ClaimKind::Null,
            Some(Value::Bool(_)) => ClaimKind::Bool,
            Some(Value::Number(_)) => ClaimKind::Number,
            Some(Value::String(_)) => ClaimKind::String,
            Some(Value::Array(_)) => ClaimKind::Array,
            Some(Value::Object(_)) => ClaimKind::Object,
        }
    }

    /// Inserts or replaces a claim with an arbitrary JSON value.
    ///
    /// Mutating the claims discards the cached claims text and any existing
    /// signature; the token returns to its unsigned state.
    pub fn set_claim(&mut self, name: &str, value: Value) {
        self.invalidate_claims();
        self.claims.insert(name.to_owned(), value);
    }

    /// Inserts or replaces a string claim.
    pub fn set_claim_string(&mut self, name: &str, value: &str) {
        self.set_claim(name, Value::String(value.to_owned()));
    }

    /// Inserts or replaces a number claim.
    ///
    /// Values that JSON cannot represent (NaN, infinities) are stored as
    /// `null`.
    pub fn set_claim_number(&mut self, name: &str, value: f64) {
        let value = Number::from_f64(value).map_or(Value::Null, Value::Number);
        self.set_claim(name, value);
    }

    /// Removes the named claim, returning its previous value.
    ///
    /// Counts as a mutation like [`set_claim`](Self::set_claim).
    pub fn remove_claim(&mut self, name: &str) -> Option<Value> {
        self.invalidate_claims();
        self.claims.remove(name)
    }

    /// Signs this token with the given algorithm and JWK, replacing any
    /// previous signature.
    ///
    /// The `alg` header parameter is written into the JOSE header, the
    /// header and claims are serialized, and the signature is computed over
    /// `BASE64URL(header) || '.' || BASE64URL(claims)`. The serialized texts
    /// are cached so later verification sees exactly the signed bytes.
    ///
    /// # Errors
    ///
    /// Fails when `alg` is `none`, when the JWK is missing parameters the
    /// algorithm needs, or when the underlying primitive reports an error.
    /// On failure the token is left unsigned.
    pub fn sign(
        &mut self,
        alg: JsonWebSigningAlgorithm,
        jwk: &Map<String, Value>,
    ) -> Result<(), SignError> {
        if alg.is_none() {
            return Err(SignError::UnsecuredAlgorithm);
        }

        self.header
            .insert("alg".to_owned(), Value::String(alg.name().to_owned()));
        self.header_text = None;

        // Drop any previous signature before attempting the new one, so a
        // failed signing operation leaves the token unsigned.
        self.signature.clear();
        self.algorithm = JsonWebSigningAlgorithm::None;

        let header_text = serde_json::to_string(&self.header).map_err(SignError::Serialize)?;
        let claims_text = serde_json::to_string(&self.claims).map_err(SignError::Serialize)?;

        let signing_input = format::signing_input(
            &Base64UrlString::encode(&header_text),
            &Base64UrlString::encode(&claims_text),
        );

        let signature = crypto::sign(alg, &signing_input, jwk)?;
        if signature.len() > MAX_SIGNATURE_SIZE {
            return Err(SignError::OversizedSignature(signature.len()));
        }

        self.header_text = Some(header_text);
        self.claims_text = Some(claims_text);
        self.signature = signature;
        self.algorithm = alg;

        Ok(())
    }

    /// Checks the token's signature against the given JWK.
    ///
    /// Unsecured tokens report `false`; use
    /// [`has_valid_signature_with`](Self::has_valid_signature_with) to
    /// accept them explicitly. This method never panics: any internal
    /// failure (unusable key, malformed signature) reports `false`.
    pub fn has_valid_signature(&self, jwk: &Map<String, Value>) -> bool {
        self.has_valid_signature_with(jwk, &VerifyOptions::default())
    }

    /// Checks the token's signature against the given JWK with explicit
    /// [`VerifyOptions`].
    pub fn has_valid_signature_with(
        &self,
        jwk: &Map<String, Value>,
        options: &VerifyOptions,
    ) -> bool {
        if self.algorithm.is_none() {
            return options.allow_unsecured && self.signature.is_empty();
        }
        if self.signature.is_empty() {
            return false;
        }

        // Verification rehashes the exact bytes that were signed; without
        // the cached texts there is nothing trustworthy to check.
        let (Some(header_text), Some(claims_text)) = (&self.header_text, &self.claims_text) else {
            return false;
        };

        let signing_input = format::signing_input(
            &Base64UrlString::encode(header_text),
            &Base64UrlString::encode(claims_text),
        );

        match crypto::verify(self.algorithm, &signing_input, &self.signature, jwk) {
            Ok(valid) => valid,
            Err(err) => {
                log::debug!("signature verification failed: {err}");
                false
            }
        }
    }

    /// Exports this token in the JWS Compact Serialization format.
    ///
    /// A signed token reuses the cached header and claims texts, so the
    /// output round-trips byte-for-byte through [`FromStr`]. An unsigned
    /// token serializes its trees on the fly and ends with a trailing dot
    /// and an empty signature segment.
    ///
    /// # Errors
    ///
    /// Returns an error if the header or claims fail to serialize to JSON.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        let header_text = match &self.header_text {
            Some(text) => text.clone(),
            None => serde_json::to_string(&self.header)?,
        };
        let claims_text = match &self.claims_text {
            Some(text) => text.clone(),
            None => serde_json::to_string(&self.claims)?,
        };

        let compact = Compact {
            header: Base64UrlString::encode(header_text),
            claims: Base64UrlString::encode(claims_text),
            signature: Base64UrlString::encode(&self.signature),
        };

        Ok(compact.to_string())
    }

    fn invalidate_claims(&mut self) {
        self.claims_text = None;
        self.signature.clear();
        self.algorithm = JsonWebSigningAlgorithm::None;
        // The stale `alg` header parameter goes away with the signature.
        self.header.remove("alg");
        self.header_text = None;
    }
}

impl Default for JsonWebToken {
    fn default() -> Self {
        Self::new(None)
    }
}

impl FromStr for JsonWebToken {
    type Err = ParseError;

    /// Parses a token from its JWS Compact Serialization.
    ///
    /// The decoded header and claims texts are retained verbatim so a later
    /// [`has_valid_signature`](Self::has_valid_signature) rehashes exactly
    /// the bytes the producer signed. Verification is deferred to that
    /// explicit call.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact = Compact::split(s).map_err(|err| match err {
            format::SplitError::SegmentCount(count) => ParseError::SegmentCount(count),
            format::SplitError::InvalidBase64(_) => ParseError::InvalidBase64,
        })?;

        let header_text = decode_text(&compact.header)?;
        let header = parse_object(&header_text, ParseError::HeaderNotObject)?;

        let claims_text = decode_text(&compact.claims)?;
        let claims = parse_object(&claims_text, ParseError::ClaimsNotObject)?;

        let signature = compact.signature.decode()?;
        if signature.len() > MAX_SIGNATURE_SIZE {
            return Err(ParseError::OversizedSignature(signature.len()));
        }

        let algorithm = match header.get("alg") {
            Option::None => JsonWebSigningAlgorithm::None,
            Some(Value::String(name)) => name.parse()?,
            Some(_) => return Err(ParseError::AlgorithmNotString),
        };

        // An unsecured token must not carry a signature and a secured one
        // must.
        match (algorithm.is_none(), signature.is_empty()) {
            (true, false) => return Err(ParseError::UnexpectedSignature),
            (false, true) => return Err(ParseError::MissingSignature(algorithm)),
            _ => {}
        }

        Ok(Self {
            header,
            header_text: Some(header_text),
            claims,
            claims_text: Some(claims_text),
            algorithm,
            signature,
        })
    }
}

fn decode_text(segment: &Base64UrlString) -> Result<String, ParseError> {
    let raw = segment.decode()?;
    String::from_utf8(raw).map_err(|_| ParseError::InvalidUtf8)
}

fn parse_object(text: &str, not_object: ParseError) -> Result<Map<String, Value>, ParseError> {
    match serde_json::from_str::<Value>(text).map_err(ParseError::InvalidJson)? {
        Value::Object(object) => Ok(object),
        _ => Err(not_object),
    }
}
