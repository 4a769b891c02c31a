//! PEM loading
//!
//! A signer identity file may carry its certificate and private key as
//! consecutive PEM blocks; the loader accepts both orders and ignores
//! unrelated blocks.

use crate::error::CryptoError;
use der::Decode;
use rsa::RsaPrivateKey;
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::DecodePrivateKey;
use x509_cert::Certificate;

/// Load a certificate and, when present, the accompanying RSA private
/// key from one PEM document.
pub fn load_identity_pem(text: &str) -> Result<(Certificate, Option<RsaPrivateKey>), CryptoError> {
    let blocks = ::pem::parse_many(text).map_err(|e| CryptoError::Pem(e.to_string()))?;

    let mut certificate = None;
    let mut private_key = None;
    for block in &blocks {
        match block.tag() {
            "CERTIFICATE" => {
                if certificate.is_none() {
                    certificate = Some(
                        Certificate::from_der(block.contents())
                            .map_err(|e| CryptoError::InvalidCertificate(e.to_string()))?,
                    );
                }
            }
            "RSA PRIVATE KEY" => {
                private_key = Some(
                    RsaPrivateKey::from_pkcs1_der(block.contents())
                        .map_err(|e| CryptoError::Pem(e.to_string()))?,
                );
            }
            "PRIVATE KEY" => {
                private_key = Some(
                    RsaPrivateKey::from_pkcs8_der(block.contents()).map_err(|e| {
                        CryptoError::UnsupportedKeyType(format!("not an RSA private key: {e}"))
                    })?,
                );
            }
            "EC PRIVATE KEY" => {
                return Err(CryptoError::UnsupportedKeyType(
                    "EC private keys cannot sign envelopes".to_string(),
                ));
            }
            _ => {}
        }
    }

    let certificate = certificate
        .ok_or_else(|| CryptoError::Pem("no CERTIFICATE block in PEM document".to_string()))?;
    Ok((certificate, private_key))
}

/// Load just a certificate (e.g. a recipient device certificate)
pub fn load_certificate_pem(text: &str) -> Result<Certificate, CryptoError> {
    let (certificate, _) = load_identity_pem(text)?;
    Ok(certificate)
}
