//! Zeroizing cryptographic key types
//!
//! Wrappers for symmetric key material that clear memory on drop.

use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Key material had the wrong length
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("invalid length: expected {expected} bytes, got {got}")]
pub struct KeyError {
    pub expected: usize,
    pub got: usize,
}

/// AES-128 key (16 bytes) that zeroizes on drop
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Aes128Key(pub(crate) [u8; 16]);

impl Aes128Key {
    /// Create a new AES key from a 16-byte slice
    pub fn from_slice(bytes: &[u8]) -> Result<Self, KeyError> {
        if bytes.len() != 16 {
            return Err(KeyError {
                expected: 16,
                got: bytes.len(),
            });
        }
        let mut key = [0u8; 16];
        key.copy_from_slice(bytes);
        Ok(Aes128Key(key))
    }

    /// Get a reference to the key bytes
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }
}

/// CBC initialization vector (16 bytes). IVs travel in cleartext inside
/// the header, so no zeroization is needed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Iv(pub [u8; 16]);

impl Iv {
    /// Create an IV from a 16-byte slice
    pub fn from_slice(bytes: &[u8]) -> Result<Self, KeyError> {
        if bytes.len() != 16 {
            return Err(KeyError {
                expected: 16,
                got: bytes.len(),
            });
        }
        let mut iv = [0u8; 16];
        iv.copy_from_slice(bytes);
        Ok(Iv(iv))
    }

    /// Get a reference to the IV bytes
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }
}
