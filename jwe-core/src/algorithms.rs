//! Content encryption for JWE envelopes.
//!
//! Two cipher families sit behind a single [`seal`]/[`open`] dispatcher:
//!
//! - AES-GCM: single-pass AEAD. The tag is the seal operation's real
//!   output over the ciphertext, with the encoded protected header as
//!   additional authenticated data.
//! - AES-CBC with HMAC-SHA-2: composite encrypt-then-MAC. The CEK splits
//!   in half (MAC key first, encryption key second); the MAC covers
//!   `AAD ‖ IV ‖ ciphertext ‖ AL`, where AL is the 64-bit big-endian bit
//!   count of the AAD, and the tag is the MAC output truncated to half.
//!
//! The composite construction is sealed: key splitting, padding,
//! encryption, and MAC computation never leave this module, and the open
//! path verifies the tag in constant time before any block is decrypted.
//! Tag and padding faults surface as the same error.

use aes::cipher::generic_array::typenum::U12;
use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};
use aes::{Aes128, Aes192, Aes256};
use aes_gcm::aead::{Aead, AeadCore, Payload};
use aes_gcm::{Aes128Gcm, Aes256Gcm, AesGcm, Nonce};
use hmac::{Hmac, Mac};
use sha2::{Sha256, Sha384, Sha512};

use crate::error::{Error, Result};
use crate::types::ContentEncryptionAlgorithm;

/// AES block size in bytes, also the CBC IV size.
const BLOCK_SIZE: usize = 16;

/// AES-192-GCM, not predefined by the aes-gcm crate.
type Aes192Gcm = AesGcm<Aes192, U12>;

/// Encrypts `plaintext` under the declared content encryption algorithm,
/// authenticating `aad`.
///
/// Returns the ciphertext and the authentication tag.
///
/// # Errors
///
/// Returns [`Error::InvalidKeyMaterial`] if `cek` or `iv` does not fit
/// `enc`.
pub fn seal(
    enc: ContentEncryptionAlgorithm,
    cek: &[u8],
    iv: &[u8],
    aad: &[u8],
    plaintext: &[u8],
) -> Result<(Vec<u8>, Vec<u8>)> {
    check_material(enc, cek, iv)?;
    match enc {
        ContentEncryptionAlgorithm::A128Gcm => seal_gcm::<Aes128Gcm>(cek, iv, aad, plaintext),
        ContentEncryptionAlgorithm::A192Gcm => seal_gcm::<Aes192Gcm>(cek, iv, aad, plaintext),
        ContentEncryptionAlgorithm::A256Gcm => seal_gcm::<Aes256Gcm>(cek, iv, aad, plaintext),
        ContentEncryptionAlgorithm::A128CbcHs256 => {
            seal_cbc_hmac::<Aes128, Hmac<Sha256>>(cek, iv, aad, plaintext)
        }
        ContentEncryptionAlgorithm::A192CbcHs384 => {
            seal_cbc_hmac::<Aes192, Hmac<Sha384>>(cek, iv, aad, plaintext)
        }
        ContentEncryptionAlgorithm::A256CbcHs512 => {
            seal_cbc_hmac::<Aes256, Hmac<Sha512>>(cek, iv, aad, plaintext)
        }
    }
}

/// Verifies the tag and decrypts `ciphertext` under the declared content
/// encryption algorithm.
///
/// # Errors
///
/// Returns [`Error::AuthenticationFailed`] if the tag does not verify,
/// with no partial plaintext and no indication of which byte differed.
/// Wire-supplied material of the wrong size (IV, tag) fails the same way.
/// Returns [`Error::InvalidKeyMaterial`] if `cek` does not fit `enc`.
pub fn open(
    enc: ContentEncryptionAlgorithm,
    cek: &[u8],
    iv: &[u8],
    aad: &[u8],
    ciphertext: &[u8],
    tag: &[u8],
) -> Result<Vec<u8>> {
    if cek.len() != enc.cek_size() {
        return Err(Error::InvalidKeyMaterial(format!(
            "{enc} needs a {}-byte key",
            enc.cek_size()
        )));
    }
    if iv.len() != enc.iv_size() || tag.len() != enc.tag_size() {
        return Err(Error::AuthenticationFailed);
    }
    match enc {
        ContentEncryptionAlgorithm::A128Gcm => open_gcm::<Aes128Gcm>(cek, iv, aad, ciphertext, tag),
        ContentEncryptionAlgorithm::A192Gcm => open_gcm::<Aes192Gcm>(cek, iv, aad, ciphertext, tag),
        ContentEncryptionAlgorithm::A256Gcm => open_gcm::<Aes256Gcm>(cek, iv, aad, ciphertext, tag),
        ContentEncryptionAlgorithm::A128CbcHs256 => {
            open_cbc_hmac::<Aes128, Hmac<Sha256>>(cek, iv, aad, ciphertext, tag)
        }
        ContentEncryptionAlgorithm::A192CbcHs384 => {
            open_cbc_hmac::<Aes192, Hmac<Sha384>>(cek, iv, aad, ciphertext, tag)
        }
        ContentEncryptionAlgorithm::A256CbcHs512 => {
            open_cbc_hmac::<Aes256, Hmac<Sha512>>(cek, iv, aad, ciphertext, tag)
        }
    }
}

fn check_material(enc: ContentEncryptionAlgorithm, cek: &[u8], iv: &[u8]) -> Result<()> {
    if cek.len() != enc.cek_size() {
        return Err(Error::InvalidKeyMaterial(format!(
            "{enc} needs a {}-byte key",
            enc.cek_size()
        )));
    }
    if iv.len() != enc.iv_size() {
        return Err(Error::InvalidKeyMaterial(format!(
            "{enc} needs a {}-byte IV",
            enc.iv_size()
        )));
    }
    Ok(())
}

fn seal_gcm<C>(cek: &[u8], iv: &[u8], aad: &[u8], plaintext: &[u8]) -> Result<(Vec<u8>, Vec<u8>)>
where
    C: Aead + KeyInit + AeadCore<NonceSize = U12>,
{
    let cipher =
        C::new_from_slice(cek).map_err(|e| Error::InvalidKeyMaterial(e.to_string()))?;
    let nonce = Nonce::from_slice(iv);

    cipher
        .encrypt(
            nonce,
            Payload {
                msg: plaintext,
                aad,
            },
        )
        .map_err(|_| Error::InvalidKeyMaterial("AEAD seal failed".to_string()))
        .map(|mut sealed| {
            let tag = sealed.split_off(sealed.len() - 16);
            (sealed, tag)
        })
}

fn open_gcm<C>(
    cek: &[u8],
    iv: &[u8],
    aad: &[u8],
    ciphertext: &[u8],
    tag: &[u8],
) -> Result<Vec<u8>>
where
    C: Aead + KeyInit + AeadCore<NonceSize = U12>,
{
    let cipher =
        C::new_from_slice(cek).map_err(|e| Error::InvalidKeyMaterial(e.to_string()))?;
    let nonce = Nonce::from_slice(iv);

    // The aead API verifies over ciphertext ‖ tag in one call.
    let mut sealed = Vec::with_capacity(ciphertext.len() + tag.len());
    sealed.extend_from_slice(ciphertext);
    sealed.extend_from_slice(tag);

    cipher
        .decrypt(
            nonce,
            Payload {
                msg: &sealed,
                aad,
            },
        )
        .map_err(|_| Error::AuthenticationFailed)
}

fn seal_cbc_hmac<C, M>(
    cek: &[u8],
    iv: &[u8],
    aad: &[u8],
    plaintext: &[u8],
) -> Result<(Vec<u8>, Vec<u8>)>
where
    C: BlockEncrypt + KeyInit,
    M: Mac + KeyInit,
{
    let (mac_key, enc_key) = cek.split_at(cek.len() / 2);
    let cipher =
        C::new_from_slice(enc_key).map_err(|e| Error::InvalidKeyMaterial(e.to_string()))?;

    // PKCS#7: always at least one byte of padding
    let padding_len = BLOCK_SIZE - (plaintext.len() % BLOCK_SIZE);
    let mut padded = plaintext.to_vec();
    padded.extend(std::iter::repeat(padding_len as u8).take(padding_len));

    let mut ciphertext = Vec::with_capacity(padded.len());
    let mut prev_block = [0u8; BLOCK_SIZE];
    prev_block.copy_from_slice(iv);

    for chunk in padded.chunks(BLOCK_SIZE) {
        let mut block = [0u8; BLOCK_SIZE];
        block.copy_from_slice(chunk);

        // XOR with the previous ciphertext block (the IV for the first)
        for (b, p) in block.iter_mut().zip(prev_block.iter()) {
            *b ^= p;
        }

        cipher.encrypt_block(GenericArray::from_mut_slice(&mut block));
        ciphertext.extend_from_slice(&block);
        prev_block = block;
    }

    let tag = compute_tag::<M>(mac_key, aad, iv, &ciphertext)?;
    Ok((ciphertext, tag))
}

fn open_cbc_hmac<C, M>(
    cek: &[u8],
    iv: &[u8],
    aad: &[u8],
    ciphertext: &[u8],
    tag: &[u8],
) -> Result<Vec<u8>>
where
    C: BlockDecrypt + KeyInit,
    M: Mac + KeyInit,
{
    let (mac_key, enc_key) = cek.split_at(cek.len() / 2);

    // Encrypt-then-MAC: the tag is verified, in constant time, before a
    // single block is decrypted.
    mac_over::<M>(mac_key, aad, iv, ciphertext)?
        .verify_truncated_left(tag)
        .map_err(|_| Error::AuthenticationFailed)?;

    if ciphertext.is_empty() || ciphertext.len() % BLOCK_SIZE != 0 {
        return Err(Error::AuthenticationFailed);
    }

    let cipher =
        C::new_from_slice(enc_key).map_err(|e| Error::InvalidKeyMaterial(e.to_string()))?;

    let mut plaintext = Vec::with_capacity(ciphertext.len());
    let mut prev_block = [0u8; BLOCK_SIZE];
    prev_block.copy_from_slice(iv);

    for chunk in ciphertext.chunks(BLOCK_SIZE) {
        let mut block = [0u8; BLOCK_SIZE];
        block.copy_from_slice(chunk);
        let encrypted_block = block;

        cipher.decrypt_block(GenericArray::from_mut_slice(&mut block));

        for (b, p) in block.iter_mut().zip(prev_block.iter()) {
            *b ^= p;
        }

        plaintext.extend_from_slice(&block);
        prev_block = encrypted_block;
    }

    // Padding faults are indistinguishable from tag faults.
    let padding_len = *plaintext.last().ok_or(Error::AuthenticationFailed)? as usize;
    if padding_len == 0 || padding_len > BLOCK_SIZE {
        return Err(Error::AuthenticationFailed);
    }
    if plaintext[plaintext.len() - padding_len..]
        .iter()
        .any(|&b| b != padding_len as u8)
    {
        return Err(Error::AuthenticationFailed);
    }
    plaintext.truncate(plaintext.len() - padding_len);

    Ok(plaintext)
}

fn compute_tag<M: Mac + KeyInit>(
    mac_key: &[u8],
    aad: &[u8],
    iv: &[u8],
    ciphertext: &[u8],
) -> Result<Vec<u8>> {
    let full = mac_over::<M>(mac_key, aad, iv, ciphertext)?
        .finalize()
        .into_bytes();
    Ok(full[..full.len() / 2].to_vec())
}

/// MAC over `AAD ‖ IV ‖ ciphertext ‖ AL`.
fn mac_over<M: Mac + KeyInit>(
    mac_key: &[u8],
    aad: &[u8],
    iv: &[u8],
    ciphertext: &[u8],
) -> Result<M> {
    let mut mac =
        <M as Mac>::new_from_slice(mac_key).map_err(|e| Error::InvalidKeyMaterial(e.to_string()))?;
    mac.update(aad);
    mac.update(iv);
    mac.update(ciphertext);
    mac.update(&aad_bit_length(aad));
    Ok(mac)
}

/// The AL block of the MAC input: the AAD length in bits, as a 64-bit
/// big-endian integer.
fn aad_bit_length(aad: &[u8]) -> [u8; 8] {
    ((aad.len() as u64) * 8).to_be_bytes()
}
