//! JWE protected header model.

use std::collections::BTreeMap;
use std::str::FromStr;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::types::{ContentEncryptionAlgorithm, KeyManagementAlgorithm};

/// The protected header of a JWE envelope.
///
/// Immutable once an envelope is built from it: the encoded header is
/// authenticated input to the tag computation, so the serialization must
/// be canonical. Fields encode in declaration order and the flattened
/// extras are kept in a `BTreeMap`, which makes the byte encoding
/// deterministic for a given header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoseHeaders {
    /// The key management algorithm
    pub alg: KeyManagementAlgorithm,

    /// The content encryption algorithm
    pub enc: ContentEncryptionAlgorithm,

    /// Identifier of the recipient key the CEK is wrapped under
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,

    /// Media type of the complete envelope
    #[serde(skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,

    /// Media type of the payload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cty: Option<String>,

    /// Additional header parameters, passed through untouched
    #[serde(flatten)]
    pub additional: BTreeMap<String, Value>,
}

impl JoseHeaders {
    /// Creates a header for the given algorithm pair.
    #[must_use]
    pub fn new(alg: KeyManagementAlgorithm, enc: ContentEncryptionAlgorithm) -> Self {
        Self {
            alg,
            enc,
            kid: None,
            typ: None,
            cty: None,
            additional: BTreeMap::new(),
        }
    }

    /// Sets the recipient key identifier.
    #[must_use]
    pub fn with_key_id(mut self, kid: impl Into<String>) -> Self {
        self.kid = Some(kid.into());
        self
    }

    /// Serializes the header to its canonical base64url protected segment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::HeaderEncoding`] if JSON serialization fails.
    pub fn to_protected(&self) -> Result<String> {
        let json = serde_json::to_vec(self)?;
        Ok(URL_SAFE_NO_PAD.encode(json))
    }

    /// Parses and validates a header from a base64url protected segment.
    ///
    /// Validation runs before any cryptographic operation: a segment that
    /// is not base64url, not a JSON object, or missing `alg`/`enc` is a
    /// [`Error::MalformedEnvelope`]; a well-formed header whose `alg` or
    /// `enc` names anything outside the supported enumerations (a signature
    /// algorithm, an unknown cipher) is an [`Error::UnsupportedAlgorithm`].
    ///
    /// # Errors
    ///
    /// See above.
    pub fn from_protected(segment: &str) -> Result<Self> {
        let bytes = URL_SAFE_NO_PAD
            .decode(segment)
            .map_err(|e| Error::MalformedEnvelope(format!("protected header: {e}")))?;
        let value: Value = serde_json::from_slice(&bytes)
            .map_err(|e| Error::MalformedEnvelope(format!("protected header: {e}")))?;
        let object = value
            .as_object()
            .ok_or_else(|| Error::MalformedEnvelope("protected header is not an object".into()))?;

        let alg_name = object.get("alg").and_then(Value::as_str).ok_or_else(|| {
            Error::MalformedEnvelope("protected header is missing a string alg".into())
        })?;
        serde_json::from_value::<KeyManagementAlgorithm>(Value::String(alg_name.into()))
            .map_err(|_| Error::UnsupportedAlgorithm(alg_name.into()))?;

        let enc_name = object.get("enc").and_then(Value::as_str).ok_or_else(|| {
            Error::MalformedEnvelope("protected header is missing a string enc".into())
        })?;
        serde_json::from_value::<ContentEncryptionAlgorithm>(Value::String(enc_name.into()))
            .map_err(|_| Error::UnsupportedAlgorithm(enc_name.into()))?;

        serde_json::from_value(value)
            .map_err(|e| Error::MalformedEnvelope(format!("protected header: {e}")))
    }
}

impl FromStr for JoseHeaders {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_protected(s)
    }
}
