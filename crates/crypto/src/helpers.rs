//! Entropy helpers
//!
//! The ENC build draws one key and one IV per build from a
//! caller-supplied CSPRNG, which tests replace with a deterministic
//! generator.

use crate::types::{Aes128Key, Iv};
use rand::{CryptoRng, RngCore};

/// Generate a random 16-byte AES key
pub fn generate_key_16<R: RngCore + CryptoRng>(rng: &mut R) -> Aes128Key {
    let mut key = [0u8; 16];
    rng.fill_bytes(&mut key);
    Aes128Key(key)
}

/// Generate a random 16-byte CBC IV
pub fn generate_iv<R: RngCore + CryptoRng>(rng: &mut R) -> Iv {
    let mut iv = Iv::default();
    rng.fill_bytes(&mut iv.0);
    iv
}
