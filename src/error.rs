//! Unified error type for the tlvseal public API
//!
//! Internal crates maintain their domain-specific errors for precise
//! handling; this type consolidates them for SDK consumers. Every error
//! propagates to the caller — nothing is retried internally, and a
//! build failure never cleans up bytes already written.

use thiserror::Error;
use tlvseal_crypto::CryptoError;
use tlvseal_protocol::TlvError;

/// Unified error type for all envelope operations
///
/// # Error Categories
///
/// - **Io**: file open/read/write failed
/// - **Tlv**: structural violations while encoding or walking buffers
/// - **Crypto**: certificate access, signing, wrapping, or cipher failures
/// - everything else: profile-level rule violations
#[derive(Debug, Error)]
pub enum SealError {
    /// File open/read/write failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Structural TLV violation
    #[error("TLV error: {0}")]
    Tlv(#[from] TlvError),

    /// Cryptographic operation error
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// Decrypted configuration hashed to something other than the
    /// header's ENCRYPTION_HASH
    #[error("decrypted configuration hash does not match ENCRYPTION_HASH")]
    HashMismatch,

    /// The device-configuration XML is unusable
    #[error("configuration XML error: {0}")]
    BadConfigXml(String),

    /// A trust list needs exactly one signing-authority record
    #[error("trust list has no signing-authority record")]
    MissingSigningAuthority,

    /// No signing-authority record's serial matches the header signer
    #[error("signer serial matches no signing-authority record")]
    SignerSerialMismatch,

    /// RSA modulus size outside the signature-length table
    #[error("unsupported RSA key size: {bits} bits")]
    UnsupportedKeySize { bits: usize },

    /// Builds only produce SHA-1 and SHA-512 signatures
    #[error("digest {digest} is not supported for signing")]
    UnsupportedSigningDigest { digest: &'static str },

    /// The identity PEM held no private key, or a path convention
    /// was violated
    #[error("{0}")]
    BadInput(String),
}

impl SealError {
    /// Returns true if this is a cryptographic error
    pub fn is_crypto_error(&self) -> bool {
        matches!(self, Self::Crypto(_))
    }

    /// Returns true if this is a structural (TLV) error
    pub fn is_structural_error(&self) -> bool {
        matches!(self, Self::Tlv(_))
    }
}
