//! Crypto-layer errors

use thiserror::Error;

/// Errors from certificate access, signing, wrapping, and the cipher
#[derive(Debug, Error)]
pub enum CryptoError {
    /// PEM decoding failed or held no usable block
    #[error("invalid PEM: {0}")]
    Pem(String),

    /// DER did not yield a usable X.509 certificate
    #[error("invalid certificate: {0}")]
    InvalidCertificate(String),

    /// Public or private key is neither RSA nor (where permitted) EC
    #[error("unsupported key type: {0}")]
    UnsupportedKeyType(String),

    /// Cryptographic signature verification failed
    #[error("signature verification failed")]
    InvalidSignature,

    /// An RSA primitive failed (sign, encrypt, decrypt)
    #[error("RSA operation failed: {0}")]
    Rsa(#[from] rsa::Error),

    /// Key or IV material had the wrong length
    #[error(transparent)]
    Key(#[from] crate::types::KeyError),

    /// A CBC buffer is not a whole number of AES blocks
    #[error("buffer length {len} is not a multiple of the AES block size")]
    NotBlockAligned { len: usize },
}
