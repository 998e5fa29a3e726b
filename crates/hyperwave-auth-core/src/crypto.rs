//! Cryptographic utilities for secure operations
//!
//! This module provides security-critical primitives that must be implemented
//! correctly to prevent timing attacks and other side-channel vulnerabilities.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

/// Pre-keyed HMAC-SHA256 instance.
///
/// Keying HMAC hashes the key into the inner/outer pads once; signing clones
/// the keyed state instead of re-deriving it.
#[derive(Clone)]
pub struct HmacKey {
    mac: Hmac<Sha256>,
    key_length: usize,
}

impl HmacKey {
    /// Minimum allowed key length in bytes (256 bits)
    pub const MIN_KEY_LENGTH: usize = 32;

    /// Create a new HMAC key from bytes.
    ///
    /// # Errors
    /// Returns error if key is too short (less than 32 bytes).
    pub fn new(key: impl AsRef<[u8]>) -> Result<Self, HmacKeyError> {
        let key_bytes = key.as_ref();
        if key_bytes.len() < Self::MIN_KEY_LENGTH {
            return Err(HmacKeyError::KeyTooShort {
                actual: key_bytes.len(),
                minimum: Self::MIN_KEY_LENGTH,
            });
        }
        let mac = Hmac::<Sha256>::new_from_slice(key_bytes).map_err(|_| HmacKeyError::Rejected)?;
        Ok(Self {
            mac,
            key_length: key_bytes.len(),
        })
    }

    /// Sign data and return the MAC bytes
    pub fn sign(&self, data: &[u8]) -> [u8; 32] {
        let mut mac = self.mac.clone();
        mac.update(data);
        mac.finalize().into_bytes().into()
    }

    /// Verify a signature in constant time
    pub fn verify(&self, data: &[u8], signature: &[u8]) -> bool {
        let expected = self.sign(data);
        constant_time_eq(&expected, signature)
    }

    /// Key length in bytes
    pub fn len(&self) -> usize {
        self.key_length
    }

    /// Always false; keys shorter than [`Self::MIN_KEY_LENGTH`] cannot exist
    pub fn is_empty(&self) -> bool {
        self.key_length == 0
    }
}

impl std::fmt::Debug for HmacKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HmacKey")
            .field("key_length", &self.key_length)
            .finish_non_exhaustive()
    }
}

/// Errors that can occur when creating an HMAC key
#[derive(Debug, Clone, thiserror::Error)]
pub enum HmacKeyError {
    #[error("HMAC key too short: got {actual} bytes, need at least {minimum}")]
    KeyTooShort { actual: usize, minimum: usize },

    #[error("HMAC key rejected")]
    Rejected,
}

/// Constant-time byte slice comparison.
///
/// Returns `false` immediately if lengths differ (length is not secret);
/// otherwise the comparison time does not depend on where the slices differ.
#[inline]
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}
