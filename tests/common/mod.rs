//! Shared test fixtures: throwaway RSA keys and self-signed certificates
//!
//! Certificates are minted per test run with the `x509-cert` builder so
//! no fixture files need maintaining. RSA-2048 matches the signing keys
//! the ecosystem deploys.

use rand::rngs::OsRng;
use rsa::pkcs8::EncodePublicKey;
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;
use std::str::FromStr;
use std::time::Duration;
use tlvseal::SignerIdentity;
use x509_cert::Certificate;
use x509_cert::builder::{Builder, CertificateBuilder, Profile};
use x509_cert::der::Decode;
use x509_cert::name::Name;
use x509_cert::serial_number::SerialNumber;
use x509_cert::spki::SubjectPublicKeyInfoOwned;
use x509_cert::time::Validity;

/// Self-sign a certificate over `key` with the given subject CN and
/// serial
pub fn self_signed(common_name: &str, serial: &[u8], key: &RsaPrivateKey) -> Certificate {
    let public_key = RsaPublicKey::from(key);
    let spki_der = public_key.to_public_key_der().unwrap();
    let spki = SubjectPublicKeyInfoOwned::from_der(spki_der.as_bytes()).unwrap();

    let subject = Name::from_str(&format!("CN={common_name},O=tlvseal test")).unwrap();
    let signer = rsa::pkcs1v15::SigningKey::<Sha256>::new(key.clone());
    let builder = CertificateBuilder::new(
        Profile::Root,
        SerialNumber::new(serial).unwrap(),
        Validity::from_now(Duration::from_secs(3600)).unwrap(),
        subject,
        spki,
        &signer,
    )
    .unwrap();
    builder.build::<rsa::pkcs1v15::Signature>().unwrap()
}

/// A fresh certificate and private key with the given bit size
pub fn generate_keypair(common_name: &str, serial: &[u8], bits: usize) -> (Certificate, RsaPrivateKey) {
    let key = RsaPrivateKey::new(&mut OsRng, bits).unwrap();
    let cert = self_signed(common_name, serial, &key);
    (cert, key)
}

/// A fresh RSA-2048 signer identity
pub fn test_signer(common_name: &str, serial: &[u8]) -> SignerIdentity {
    let (cert, key) = generate_keypair(common_name, serial, 2048);
    SignerIdentity::new(cert, key)
}

/// A fresh self-signed P-256 certificate, for trust-list member roles
/// that deploy EC keys
#[allow(dead_code)]
pub fn generate_ec_certificate(common_name: &str, serial: &[u8]) -> Certificate {
    let signing = p256::ecdsa::SigningKey::random(&mut OsRng);
    let spki_der = signing.verifying_key().to_public_key_der().unwrap();
    let spki = SubjectPublicKeyInfoOwned::from_der(spki_der.as_bytes()).unwrap();

    let subject = Name::from_str(&format!("CN={common_name},O=tlvseal test")).unwrap();
    let builder = CertificateBuilder::new(
        Profile::Root,
        SerialNumber::new(serial).unwrap(),
        Validity::from_now(Duration::from_secs(3600)).unwrap(),
        subject,
        spki,
        &signing,
    )
    .unwrap();
    builder.build::<p256::ecdsa::DerSignature>().unwrap()
}
