//! Compact serialization of JWE envelopes.
//!
//! The compact form is the five base64url segments joined by `.`:
//!
//! ```text
//! <protected>.<encrypted-key>.<iv>.<ciphertext>.<tag>
//! ```

use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

use crate::envelope::Jwe;
use crate::error::{Error, Result};

/// Number of dot-separated segments in the compact form.
const SEGMENT_COUNT: usize = 5;

const SEGMENT_NAMES: [&str; SEGMENT_COUNT] = [
    "protected header",
    "encrypted key",
    "initialization vector",
    "ciphertext",
    "tag",
];

impl Jwe {
    /// Serializes the envelope to its compact form.
    #[must_use]
    pub fn compact(&self) -> String {
        [
            self.protected.as_str(),
            self.encrypted_key.as_str(),
            self.iv.as_str(),
            self.ciphertext.as_str(),
            self.tag.as_str(),
        ]
        .join(".")
    }

    /// Parses an envelope from its compact form.
    ///
    /// The input must contain exactly five non-empty segments, each valid
    /// base64url. The protected header is not interpreted here beyond the
    /// base64url check; header validation runs at decrypt time, before
    /// any cryptographic step.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedEnvelope`] on any violation.
    pub fn from_compact(input: &str) -> Result<Self> {
        let segments: Vec<&str> = input.split('.').collect();
        if segments.len() != SEGMENT_COUNT {
            return Err(Error::MalformedEnvelope(format!(
                "expected {SEGMENT_COUNT} segments, got {}",
                segments.len()
            )));
        }

        for (segment, name) in segments.iter().zip(SEGMENT_NAMES) {
            if segment.is_empty() {
                return Err(Error::MalformedEnvelope(format!("empty {name} segment")));
            }
            URL_SAFE_NO_PAD
                .decode(segment)
                .map_err(|e| Error::MalformedEnvelope(format!("{name}: {e}")))?;
        }

        Ok(Self {
            protected: segments[0].to_owned(),
            encrypted_key: segments[1].to_owned(),
            iv: segments[2].to_owned(),
            ciphertext: segments[3].to_owned(),
            tag: segments[4].to_owned(),
        })
    }
}

impl fmt::Display for Jwe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.compact())
    }
}

impl FromStr for Jwe {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_compact(s)
    }
}
