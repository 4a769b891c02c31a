//! tlvseal Cryptographic Operations
//!
//! This crate is the narrow crypto interface the envelope engine
//! consumes:
//! - PEM loading (a single file may hold a certificate and its key)
//! - X.509 accessors: RFC 4514 names, serial, fingerprints, key material
//! - RSA PKCS#1 v1.5 signatures and key wrap
//! - AES-128-CBC over caller-padded buffers
//! - SHA-1 / SHA-256 / SHA-512 / MD5 digests
//!
//! # Security Features
//!
//! - **Zeroization**: AES key material uses `zeroize` to clear memory
//!   on drop
//! - **No scheme agility**: the wire format fixes PKCS#1 v1.5 and
//!   AES-128-CBC; nothing here negotiates algorithms

pub mod encryption;
pub mod error;
pub mod helpers;
pub mod keywrap;
pub mod pem;
pub mod sign;
pub mod types;
pub mod x509;

pub use encryption::{aes128_cbc_decrypt, aes128_cbc_encrypt};
pub use error::CryptoError;
pub use helpers::{generate_iv, generate_key_16};
pub use keywrap::{unwrap_key, wrap_key};
pub use pem::{load_certificate_pem, load_identity_pem};
pub use sign::{digest, ec_verify_p256, rsa_signature_len, rsa_verify, sign_pkcs1v15};
pub use types::{Aes128Key, Iv, KeyError};
pub use x509::{
    FingerprintAlgorithm, KeyMaterial, certificate_der, fingerprint, issuer_rfc4514,
    parse_certificate, public_key, public_key_wire, serial_bytes, signature_bytes,
    subject_rfc4514,
};

// Re-export the underlying certificate and key types used at the API
// boundary.
pub use rsa::{RsaPrivateKey, RsaPublicKey};
pub use x509_cert::Certificate;
