//! Error types for the jwe-core crate.

use thiserror::Error;

/// Error type for JWE envelope operations.
///
/// Decryption-side failures are deliberately coarse: key unwrap problems
/// collapse into [`Error::KeyUnwrapFailed`] and tag or padding problems into
/// [`Error::AuthenticationFailed`], so a caller relaying errors to a peer
/// cannot be turned into a padding oracle.
#[derive(Debug, Error)]
pub enum Error {
    /// Header declares an algorithm outside the supported enumerations,
    /// or one from the wrong family (e.g. a signature algorithm).
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),
    /// Wrapping the content encryption key under the recipient public key
    /// failed.
    #[error("key wrap failed")]
    WrapFailed,
    /// The content encryption key could not be recovered with the given
    /// private key. Wrong key, bad padding, and size mismatches are not
    /// distinguished.
    #[error("key unwrap failed")]
    KeyUnwrapFailed,
    /// Key, IV, or tag material does not fit the declared algorithm.
    #[error("invalid key material: {0}")]
    InvalidKeyMaterial(String),
    /// Tag verification failed during decryption. Padding faults in the
    /// CBC-HMAC family surface as this same error.
    #[error("authentication failed")]
    AuthenticationFailed,
    /// The compact form or the protected header does not parse.
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),
    /// The protected header could not be serialized at encrypt time.
    #[error("header encoding failed: {0}")]
    HeaderEncoding(#[from] serde_json::Error),
}

impl From<base64::DecodeError> for Error {
    fn from(err: base64::DecodeError) -> Self {
        Self::MalformedEnvelope(err.to_string())
    }
}

/// Result type for JWE envelope operations.
pub type Result<T> = std::result::Result<T, Error>;
