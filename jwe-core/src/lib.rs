//! JWE compact envelope engine.
//!
//! This crate produces and consumes the compact, five-part JWE envelope
//! (RFC 7516 style): a freshly generated content encryption key is
//! wrapped under the recipient's RSA public key, the payload is sealed
//! with an authenticated cipher, and the result serializes as five
//! base64url segments joined by `.`.
//!
//! # Features
//!
//! - `RSA-OAEP` and `RSA1_5` key management
//! - Two content encryption families:
//!   - AES-GCM (`A128GCM`, `A192GCM`, `A256GCM`)
//!   - AES-CBC with HMAC-SHA-2 (`A128CBC-HS256`, `A192CBC-HS384`,
//!     `A256CBC-HS512`)
//! - Strict compact-form parsing and header validation before any
//!   cryptographic operation
//! - Injectable random source for deterministic testing
//!
//! # Architecture
//!
//! The crate is organized into these main modules:
//! - `header`: the protected header model and its canonical encoding
//! - `key_wrapping`: CEK generation and RSA key wrap/unwrap
//! - `algorithms`: the two content cipher families
//! - `envelope`: envelope assembly — the encrypt and decrypt paths
//! - `error`: error types and handling
//!
//! # Examples
//!
//! ```rust,no_run
//! use jwe_core::{ContentEncryptionAlgorithm, JoseHeaders, Jwe, KeyManagementAlgorithm};
//! use rand_core::OsRng;
//! use rsa::{RsaPrivateKey, RsaPublicKey};
//!
//! # fn main() -> jwe_core::Result<()> {
//! let private = RsaPrivateKey::new(&mut OsRng, 2048).expect("key generation");
//! let public = RsaPublicKey::from(&private);
//!
//! let headers = JoseHeaders::new(
//!     KeyManagementAlgorithm::RsaOaep,
//!     ContentEncryptionAlgorithm::A128CbcHs256,
//! );
//! let jwe = Jwe::encrypt(&headers, &public, b"I have a message for you.")?;
//! let compact = jwe.compact();
//!
//! let received = Jwe::from_compact(&compact)?;
//! let plaintext = received.decrypt(&private)?;
//! assert_eq!(plaintext, b"I have a message for you.");
//! # Ok(())
//! # }
//! ```
//!
//! # Security Considerations
//!
//! - Every envelope gets a fresh CEK and IV; key material is zeroized
//!   when dropped and never logged
//! - Tags are verified in constant time before any decryption; tag and
//!   padding faults are indistinguishable to a caller
//! - Key unwrap failures carry no padding detail
//! - Each call is self-contained and synchronous; calls may run in
//!   parallel, each owning its own key material and buffers
//! - This crate never generates or stores long-term keys; the caller
//!   supplies the RSA key pair

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod algorithms;
mod compact;
pub mod envelope;
pub mod error;
pub mod header;
pub mod key_wrapping;
pub mod types;

#[cfg(test)]
pub(crate) mod tests;

pub use envelope::Jwe;
pub use error::{Error, Result};
pub use header::JoseHeaders;
pub use key_wrapping::ContentEncryptionKey;
pub use types::{ContentEncryptionAlgorithm, KeyManagementAlgorithm};
