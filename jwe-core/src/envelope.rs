//! JWE envelope assembly.
//!
//! [`Jwe::encrypt`] walks the forward path: validate headers, generate and
//! wrap a CEK, generate an IV, seal the plaintext with the encoded header
//! as AAD, and assemble the five segments. [`Jwe::decrypt`] reverses it,
//! and any failed step short-circuits: no partial plaintext or
//! intermediate secret survives a failure.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand_core::{CryptoRngCore, OsRng};
use rsa::{RsaPrivateKey, RsaPublicKey};

use crate::algorithms;
use crate::error::{Error, Result};
use crate::header::JoseHeaders;
use crate::key_wrapping::{generate_iv, generate_wrapped_cek, unwrap_cek};

/// A JWE envelope: the five base64url segments of the compact form.
///
/// Immutable once constructed. The content encryption key is not part of
/// the envelope; it exists only inside the encrypt or decrypt call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Jwe {
    /// The protected header (base64url-encoded)
    pub protected: String,
    /// The wrapped content encryption key (base64url-encoded)
    pub encrypted_key: String,
    /// The initialization vector (base64url-encoded)
    pub iv: String,
    /// The ciphertext (base64url-encoded)
    pub ciphertext: String,
    /// The authentication tag (base64url-encoded)
    pub tag: String,
}

impl Jwe {
    /// Encrypts `plaintext` for the recipient using the system random
    /// source.
    ///
    /// # Errors
    ///
    /// See [`Jwe::encrypt_with_rng`].
    pub fn encrypt(
        headers: &JoseHeaders,
        recipient: &RsaPublicKey,
        plaintext: &[u8],
    ) -> Result<Self> {
        Self::encrypt_with_rng(&mut OsRng, headers, recipient, plaintext)
    }

    /// Encrypts `plaintext` with an injected random source.
    ///
    /// Everything random about the envelope (CEK, IV, RSA padding) is
    /// drawn from `rng`, so tests can pass a seeded source.
    ///
    /// # Errors
    ///
    /// Returns [`Error::HeaderEncoding`] if the header does not
    /// serialize, or [`Error::WrapFailed`] if the recipient key cannot
    /// carry the CEK.
    #[tracing::instrument(skip_all, fields(alg = %headers.alg, enc = %headers.enc))]
    pub fn encrypt_with_rng<R: CryptoRngCore>(
        rng: &mut R,
        headers: &JoseHeaders,
        recipient: &RsaPublicKey,
        plaintext: &[u8],
    ) -> Result<Self> {
        let protected = headers.to_protected()?;
        let (cek, encrypted_key) =
            generate_wrapped_cek(rng, headers.enc, headers.alg, recipient)?;
        let iv = generate_iv(rng, headers.enc);

        // The encoded protected header is the AAD for both cipher families.
        let (ciphertext, tag) = algorithms::seal(
            headers.enc,
            cek.as_bytes(),
            &iv,
            protected.as_bytes(),
            plaintext,
        )?;

        Ok(Self {
            protected,
            encrypted_key: URL_SAFE_NO_PAD.encode(encrypted_key),
            iv: URL_SAFE_NO_PAD.encode(iv),
            ciphertext: URL_SAFE_NO_PAD.encode(ciphertext),
            tag: URL_SAFE_NO_PAD.encode(tag),
        })
    }

    /// Decrypts the envelope with the recipient's private key.
    ///
    /// Header validation runs first, then CEK unwrap, then tag
    /// verification and decryption; the first failure is terminal.
    ///
    /// # Errors
    ///
    /// [`Error::MalformedEnvelope`] or [`Error::UnsupportedAlgorithm`]
    /// for header problems, [`Error::KeyUnwrapFailed`] if the CEK cannot
    /// be recovered, [`Error::AuthenticationFailed`] if the tag does not
    /// verify.
    #[tracing::instrument(skip_all)]
    pub fn decrypt(&self, private_key: &RsaPrivateKey) -> Result<Vec<u8>> {
        let headers = JoseHeaders::from_protected(&self.protected)?;
        tracing::debug!(alg = %headers.alg, enc = %headers.enc, "decrypting envelope");

        let encrypted_key = decode_segment(&self.encrypted_key, "encrypted key")?;
        let iv = decode_segment(&self.iv, "initialization vector")?;
        let ciphertext = decode_segment(&self.ciphertext, "ciphertext")?;
        let tag = decode_segment(&self.tag, "authentication tag")?;

        let cek = unwrap_cek(headers.alg, private_key, &encrypted_key)?;
        if cek.as_bytes().len() != headers.enc.cek_size() {
            // An unwrapped key that does not fit the declared algorithm is
            // treated exactly like an unwrap failure.
            tracing::debug!("unwrapped key does not match declared content encryption algorithm");
            return Err(Error::KeyUnwrapFailed);
        }

        // The received protected segment is the AAD, byte for byte; it is
        // never re-encoded.
        algorithms::open(
            headers.enc,
            cek.as_bytes(),
            &iv,
            self.protected.as_bytes(),
            &ciphertext,
            &tag,
        )
    }
}

fn decode_segment(segment: &str, name: &str) -> Result<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| Error::MalformedEnvelope(format!("{name}: {e}")))
}
