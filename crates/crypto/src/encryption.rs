//! AES-128-CBC over caller-padded buffers
//!
//! The ENC profile pads with 0x0D bytes of an explicit count carried in
//! the header, so the cipher layer runs with no padding of its own and
//! requires block-aligned input.

use crate::error::CryptoError;
use crate::types::{Aes128Key, Iv};
use aes::Aes128;
use cipher::block_padding::NoPadding;
use cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};

type Aes128CbcEnc = ::cbc::Encryptor<Aes128>;
type Aes128CbcDec = ::cbc::Decryptor<Aes128>;

/// Encrypt a block-aligned buffer
pub fn aes128_cbc_encrypt(
    key: &Aes128Key,
    iv: &Iv,
    padded: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    if padded.len() % 16 != 0 {
        return Err(CryptoError::NotBlockAligned { len: padded.len() });
    }
    let cipher = Aes128CbcEnc::new((&key.0).into(), (&iv.0).into());
    Ok(cipher.encrypt_padded_vec_mut::<NoPadding>(padded))
}

/// Decrypt a block-aligned buffer. Stripping the 0x0D padding is the
/// caller's job, driven by the header's explicit count.
pub fn aes128_cbc_decrypt(
    key: &Aes128Key,
    iv: &Iv,
    ciphertext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    if ciphertext.len() % 16 != 0 {
        return Err(CryptoError::NotBlockAligned {
            len: ciphertext.len(),
        });
    }
    let cipher = Aes128CbcDec::new((&key.0).into(), (&iv.0).into());
    cipher
        .decrypt_padded_vec_mut::<NoPadding>(ciphertext)
        .map_err(|_| CryptoError::NotBlockAligned {
            len: ciphertext.len(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_key_iv() -> (Aes128Key, Iv) {
        (
            Aes128Key::from_slice(&[0x11; 16]).unwrap(),
            Iv::from_slice(&[0x22; 16]).unwrap(),
        )
    }

    #[test]
    fn test_roundtrip() {
        let (key, iv) = fixed_key_iv();
        let plaintext = [0x0Du8; 48];

        let ciphertext = aes128_cbc_encrypt(&key, &iv, &plaintext).unwrap();
        assert_eq!(ciphertext.len(), plaintext.len());
        assert_ne!(ciphertext.as_slice(), &plaintext[..]);

        let recovered = aes128_cbc_decrypt(&key, &iv, &ciphertext).unwrap();
        assert_eq!(recovered, plaintext);
    }

    #[test]
    fn test_iv_changes_ciphertext() {
        let (key, iv) = fixed_key_iv();
        let other_iv = Iv::from_slice(&[0x23; 16]).unwrap();
        let plaintext = [0u8; 16];

        let a = aes128_cbc_encrypt(&key, &iv, &plaintext).unwrap();
        let b = aes128_cbc_encrypt(&key, &other_iv, &plaintext).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_unaligned_input_rejected() {
        let (key, iv) = fixed_key_iv();
        assert!(matches!(
            aes128_cbc_encrypt(&key, &iv, &[0u8; 15]),
            Err(CryptoError::NotBlockAligned { len: 15 })
        ));
        assert!(matches!(
            aes128_cbc_decrypt(&key, &iv, &[0u8; 17]),
            Err(CryptoError::NotBlockAligned { len: 17 })
        ));
    }
}
