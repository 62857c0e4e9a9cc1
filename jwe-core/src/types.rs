//! Algorithm enumerations for JWE envelopes.
//!
//! Both enumerations are closed: every supported identifier is a variant,
//! dispatch is an exhaustive `match`, and anything else on the wire is a
//! validation error rather than a silent default. Adding or removing an
//! algorithm is therefore a compile-time-checked change.

use serde::{Deserialize, Serialize};

/// Key management algorithms supported for JWE.
///
/// Both wrap a freshly generated content encryption key under the
/// recipient's RSA public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyManagementAlgorithm {
    /// RSA-OAEP (SHA-256 digest)
    #[serde(rename = "RSA-OAEP")]
    RsaOaep,
    /// RSA PKCS#1 v1.5
    #[serde(rename = "RSA1_5")]
    Rsa1_5,
}

impl std::fmt::Display for KeyManagementAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RsaOaep => write!(f, "RSA-OAEP"),
            Self::Rsa1_5 => write!(f, "RSA1_5"),
        }
    }
}

/// Content encryption algorithms supported for JWE.
///
/// Two families: single-pass AEAD (AES-GCM) and composite encrypt-then-MAC
/// (AES-CBC with HMAC-SHA-2). The variant fully determines the content
/// encryption key size, the IV size, and the tag size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentEncryptionAlgorithm {
    /// AES-128-GCM
    #[serde(rename = "A128GCM")]
    A128Gcm,
    /// AES-192-GCM
    #[serde(rename = "A192GCM")]
    A192Gcm,
    /// AES-256-GCM
    #[serde(rename = "A256GCM")]
    A256Gcm,
    /// AES-128-CBC with HMAC-SHA-256
    #[serde(rename = "A128CBC-HS256")]
    A128CbcHs256,
    /// AES-192-CBC with HMAC-SHA-384
    #[serde(rename = "A192CBC-HS384")]
    A192CbcHs384,
    /// AES-256-CBC with HMAC-SHA-512
    #[serde(rename = "A256CBC-HS512")]
    A256CbcHs512,
}

impl ContentEncryptionAlgorithm {
    /// Content encryption key size in bytes.
    ///
    /// CBC-HMAC keys are twice the AES key size: the first half keys the
    /// MAC, the second half keys the cipher.
    #[must_use]
    pub const fn cek_size(self) -> usize {
        match self {
            Self::A128Gcm => 16,
            Self::A192Gcm => 24,
            Self::A256Gcm | Self::A128CbcHs256 => 32,
            Self::A192CbcHs384 => 48,
            Self::A256CbcHs512 => 64,
        }
    }

    /// Initialization vector size in bytes: the GCM nonce, or the AES
    /// block for CBC.
    #[must_use]
    pub const fn iv_size(self) -> usize {
        match self {
            Self::A128Gcm | Self::A192Gcm | Self::A256Gcm => 12,
            Self::A128CbcHs256 | Self::A192CbcHs384 | Self::A256CbcHs512 => 16,
        }
    }

    /// Authentication tag size in bytes.
    ///
    /// GCM tags are the full 16 bytes; CBC-HMAC tags are the HMAC output
    /// truncated to half, which equals the per-direction sub-key size.
    #[must_use]
    pub const fn tag_size(self) -> usize {
        match self {
            Self::A128Gcm | Self::A192Gcm | Self::A256Gcm | Self::A128CbcHs256 => 16,
            Self::A192CbcHs384 => 24,
            Self::A256CbcHs512 => 32,
        }
    }

    /// Whether this variant belongs to the AEAD (GCM) family.
    #[must_use]
    pub const fn is_gcm(self) -> bool {
        matches!(self, Self::A128Gcm | Self::A192Gcm | Self::A256Gcm)
    }
}

impl std::fmt::Display for ContentEncryptionAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::A128Gcm => write!(f, "A128GCM"),
            Self::A192Gcm => write!(f, "A192GCM"),
            Self::A256Gcm => write!(f, "A256GCM"),
            Self::A128CbcHs256 => write!(f, "A128CBC-HS256"),
            Self::A192CbcHs384 => write!(f, "A192CBC-HS384"),
            Self::A256CbcHs512 => write!(f, "A256CBC-HS512"),
        }
    }
}
