//! Signer and recipient identities
//!
//! A signer identity is a certificate plus its RSA private key, usually
//! loaded from one PEM file holding both blocks. Recipient devices are
//! identified by certificate alone.

use crate::error::SealError;
use std::fs;
use std::path::Path;
use tlvseal_crypto::{
    Certificate, RsaPrivateKey, issuer_rfc4514, load_certificate_pem, load_identity_pem,
    rsa_signature_len, serial_bytes, subject_rfc4514,
};
use tlvseal_protocol::SignatureModulus;

/// The certificate-bearing authority whose key signs envelopes
pub struct SignerIdentity {
    certificate: Certificate,
    private_key: RsaPrivateKey,
}

impl SignerIdentity {
    /// Pair a certificate with its private key
    pub fn new(certificate: Certificate, private_key: RsaPrivateKey) -> Self {
        Self {
            certificate,
            private_key,
        }
    }

    /// Load from a PEM document that holds the certificate and key
    pub fn from_pem(text: &str) -> Result<Self, SealError> {
        let (certificate, private_key) = load_identity_pem(text)?;
        let private_key = private_key
            .ok_or_else(|| SealError::BadInput("signer PEM holds no private key".to_string()))?;
        Ok(Self {
            certificate,
            private_key,
        })
    }

    /// Load from a PEM file
    pub fn from_pem_file(path: impl AsRef<Path>) -> Result<Self, SealError> {
        let text = fs::read_to_string(path)?;
        Self::from_pem(&text)
    }

    pub fn certificate(&self) -> &Certificate {
        &self.certificate
    }

    pub fn private_key(&self) -> &RsaPrivateKey {
        &self.private_key
    }

    /// RFC 4514 subject, the SIGNER_NAME bytes before NUL termination
    pub fn subject(&self) -> String {
        subject_rfc4514(&self.certificate)
    }

    /// RFC 4514 issuer
    pub fn issuer(&self) -> String {
        issuer_rfc4514(&self.certificate)
    }

    /// Minimum-width unsigned big-endian serial
    pub fn serial(&self) -> Vec<u8> {
        serial_bytes(&self.certificate)
    }

    /// Signature-length table entry for this key. Only RSA-2048 and
    /// RSA-4096 sign envelopes; the shorter table entries exist for
    /// parse compatibility and are refused here, before any bytes are
    /// written.
    pub fn signature_modulus(&self) -> Result<SignatureModulus, SealError> {
        let len = rsa_signature_len(&self.private_key);
        match SignatureModulus::from_signature_len(len) {
            Some(modulus @ (SignatureModulus::Len256 | SignatureModulus::Len512)) => Ok(modulus),
            _ => Err(SealError::UnsupportedKeySize { bits: len * 8 }),
        }
    }
}

/// Load a bare certificate (e.g. a recipient device certificate) from a
/// PEM file
pub fn load_certificate_file(path: impl AsRef<Path>) -> Result<Certificate, SealError> {
    let text = fs::read_to_string(path)?;
    Ok(load_certificate_pem(&text)?)
}
