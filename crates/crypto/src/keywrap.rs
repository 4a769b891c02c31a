//! RSA PKCS#1 v1.5 key wrap for the ENC profile
//!
//! The AES key travels to the device wrapped under the device's public
//! key; only the device's private key can recover it.

use crate::error::CryptoError;
use crate::types::Aes128Key;
use rand::{CryptoRng, RngCore};
use rsa::{Pkcs1v15Encrypt, RsaPrivateKey, RsaPublicKey};
use zeroize::Zeroize;

/// Wrap an AES key with the recipient's RSA public key
pub fn wrap_key<R: RngCore + CryptoRng>(
    rng: &mut R,
    recipient: &RsaPublicKey,
    key: &Aes128Key,
) -> Result<Vec<u8>, CryptoError> {
    Ok(recipient.encrypt(rng, Pkcs1v15Encrypt, key.as_slice())?)
}

/// Unwrap an AES key with the recipient's RSA private key
pub fn unwrap_key(recipient: &RsaPrivateKey, wrapped: &[u8]) -> Result<Aes128Key, CryptoError> {
    let mut bytes = recipient.decrypt(Pkcs1v15Encrypt, wrapped)?;
    let key = Aes128Key::from_slice(&bytes);
    bytes.zeroize();
    Ok(key?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    #[test]
    fn test_wrap_unwrap_roundtrip() {
        let private = RsaPrivateKey::new(&mut OsRng, 1024).unwrap();
        let public = RsaPublicKey::from(&private);
        let key = Aes128Key::from_slice(&[0x42; 16]).unwrap();

        let wrapped = wrap_key(&mut OsRng, &public, &key).unwrap();
        assert_eq!(wrapped.len(), 128);
        let unwrapped = unwrap_key(&private, &wrapped).unwrap();
        assert_eq!(unwrapped.as_slice(), key.as_slice());
    }

    #[test]
    fn test_unwrap_garbage_fails() {
        let private = RsaPrivateKey::new(&mut OsRng, 1024).unwrap();
        assert!(unwrap_key(&private, &[0u8; 128]).is_err());
    }
}
