//! PKCS#1 v1.5 signatures over the declared digest
//!
//! The hash algorithm declared in the envelope header must be the one
//! used for the signature; the padding object carries the matching
//! DigestInfo prefix.

use crate::error::CryptoError;
use rsa::traits::PublicKeyParts;
use rsa::{Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey};
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha512};
use tlvseal_protocol::HashAlgorithm;

/// Digest `data` with the wire-declared algorithm
pub fn digest(algorithm: HashAlgorithm, data: &[u8]) -> Vec<u8> {
    match algorithm {
        HashAlgorithm::Sha1 => Sha1::digest(data).to_vec(),
        HashAlgorithm::Sha256 => Sha256::digest(data).to_vec(),
        HashAlgorithm::Sha512 => Sha512::digest(data).to_vec(),
    }
}

fn padding_for(algorithm: HashAlgorithm) -> Pkcs1v15Sign {
    match algorithm {
        HashAlgorithm::Sha1 => Pkcs1v15Sign::new::<Sha1>(),
        HashAlgorithm::Sha256 => Pkcs1v15Sign::new::<Sha256>(),
        HashAlgorithm::Sha512 => Pkcs1v15Sign::new::<Sha512>(),
    }
}

/// Sign the exact byte image with RSA PKCS#1 v1.5
pub fn sign_pkcs1v15(
    key: &RsaPrivateKey,
    data: &[u8],
    algorithm: HashAlgorithm,
) -> Result<Vec<u8>, CryptoError> {
    Ok(key.sign(padding_for(algorithm), &digest(algorithm, data))?)
}

/// Verify an RSA PKCS#1 v1.5 signature over the exact byte image
pub fn rsa_verify(
    key: &RsaPublicKey,
    data: &[u8],
    signature: &[u8],
    algorithm: HashAlgorithm,
) -> Result<(), CryptoError> {
    key.verify(padding_for(algorithm), &digest(algorithm, data), signature)
        .map_err(|_| CryptoError::InvalidSignature)
}

/// Signature length in bytes for this key (the modulus size)
pub fn rsa_signature_len(key: &RsaPrivateKey) -> usize {
    key.size()
}

/// Verify an ECDSA signature (DER form) with a P-256 public key given
/// as an X9.62 uncompressed point. ECDSA P-256 digests with SHA-256.
pub fn ec_verify_p256(point: &[u8], data: &[u8], signature_der: &[u8]) -> Result<(), CryptoError> {
    use p256::ecdsa::signature::Verifier;
    use p256::ecdsa::{Signature, VerifyingKey};

    let key = VerifyingKey::from_sec1_bytes(point)
        .map_err(|e| CryptoError::UnsupportedKeyType(format!("not a P-256 point: {e}")))?;
    let signature = Signature::from_der(signature_der).map_err(|_| CryptoError::InvalidSignature)?;
    key.verify(data, &signature)
        .map_err(|_| CryptoError::InvalidSignature)
}
