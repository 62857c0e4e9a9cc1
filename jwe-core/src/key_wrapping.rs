//! CEK generation and RSA key wrapping.

use rand_core::CryptoRngCore;
use rsa::{Oaep, Pkcs1v15Encrypt, RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{Error, Result};
use crate::types::{ContentEncryptionAlgorithm, KeyManagementAlgorithm};

/// A content encryption key.
///
/// Exists only for the duration of a single encrypt or decrypt call. Key
/// material is zeroized when dropped and is never serialized, logged, or
/// carried inside an envelope.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ContentEncryptionKey {
    key: Vec<u8>,
}

impl ContentEncryptionKey {
    pub(crate) fn new(key: Vec<u8>) -> Self {
        Self { key }
    }

    /// Gets the raw key bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.key
    }
}

impl std::fmt::Debug for ContentEncryptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // key material stays out of Debug output
        f.debug_struct("ContentEncryptionKey")
            .field("len", &self.key.len())
            .finish_non_exhaustive()
    }
}

/// Draws a fresh content encryption key sized for `enc`.
pub fn generate_cek<R: CryptoRngCore>(
    rng: &mut R,
    enc: ContentEncryptionAlgorithm,
) -> ContentEncryptionKey {
    let mut key = vec![0u8; enc.cek_size()];
    rng.fill_bytes(&mut key);
    ContentEncryptionKey::new(key)
}

/// Draws a fresh initialization vector sized for `enc`.
///
/// Every envelope gets its own IV; IVs are never reused, even though each
/// envelope also gets its own CEK.
pub fn generate_iv<R: CryptoRngCore>(rng: &mut R, enc: ContentEncryptionAlgorithm) -> Vec<u8> {
    let mut iv = vec![0u8; enc.iv_size()];
    rng.fill_bytes(&mut iv);
    iv
}

/// Wraps a content encryption key under the recipient's public key.
///
/// # Errors
///
/// Returns [`Error::WrapFailed`] if the modulus is too small for the
/// padding scheme plus the CEK, or if the RSA operation fails. The caller
/// must not proceed to content encryption on failure.
pub fn wrap_cek<R: CryptoRngCore>(
    rng: &mut R,
    alg: KeyManagementAlgorithm,
    public_key: &RsaPublicKey,
    cek: &ContentEncryptionKey,
) -> Result<Vec<u8>> {
    match alg {
        KeyManagementAlgorithm::RsaOaep => public_key
            .encrypt(rng, Oaep::new::<Sha256>(), cek.as_bytes())
            .map_err(|_| Error::WrapFailed),
        KeyManagementAlgorithm::Rsa1_5 => public_key
            .encrypt(rng, Pkcs1v15Encrypt, cek.as_bytes())
            .map_err(|_| Error::WrapFailed),
    }
}

/// Draws a fresh CEK and wraps it in a single step.
///
/// # Errors
///
/// Returns [`Error::WrapFailed`] as for [`wrap_cek`].
pub fn generate_wrapped_cek<R: CryptoRngCore>(
    rng: &mut R,
    enc: ContentEncryptionAlgorithm,
    alg: KeyManagementAlgorithm,
    public_key: &RsaPublicKey,
) -> Result<(ContentEncryptionKey, Vec<u8>)> {
    let cek = generate_cek(rng, enc);
    let wrapped = wrap_cek(rng, alg, public_key, &cek)?;
    Ok((cek, wrapped))
}

/// Unwraps a wrapped content encryption key with the recipient's private
/// key.
///
/// # Errors
///
/// Returns [`Error::KeyUnwrapFailed`] on any failure. Wrong key and bad
/// padding are indistinguishable by design.
pub fn unwrap_cek(
    alg: KeyManagementAlgorithm,
    private_key: &RsaPrivateKey,
    wrapped: &[u8],
) -> Result<ContentEncryptionKey> {
    let key = match alg {
        KeyManagementAlgorithm::RsaOaep => private_key.decrypt(Oaep::new::<Sha256>(), wrapped),
        KeyManagementAlgorithm::Rsa1_5 => private_key.decrypt(Pkcs1v15Encrypt, wrapped),
    }
    .map_err(|_| Error::KeyUnwrapFailed)?;
    Ok(ContentEncryptionKey::new(key))
}
