//! X.509 accessors
//!
//! Everything the envelope engine needs out of a certificate: the
//! RFC 4514 subject and issuer strings that become SIGNER_NAME and
//! ISSUER_NAME bytes, the minimum-width serial, the key material in its
//! wire encoding, the certificate's own signature, and fingerprints.
//!
//! Name rendering is a compatibility commitment: RDNs are joined with
//! `","`, which is what the `x509-cert` Display implementation emits.

use crate::error::CryptoError;
use const_oid::db::rfc5912::{ID_EC_PUBLIC_KEY, RSA_ENCRYPTION};
use der::{Decode, Encode};
use md5::Md5;
use rsa::RsaPublicKey;
use rsa::pkcs1::DecodeRsaPublicKey;
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha512};
use x509_cert::Certificate;

/// Public key material in the encoding the wire format carries:
/// PKCS#1 `RSAPublicKey` DER for RSA, X9.62 uncompressed point for EC
#[derive(Debug, Clone)]
pub enum KeyMaterial {
    Rsa(RsaPublicKey),
    Ec(Vec<u8>),
}

/// Digest choices for certificate fingerprints. MD5 exists solely for
/// the pointer file's `certHash`; envelope signatures never use it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FingerprintAlgorithm {
    Md5,
    Sha1,
    Sha256,
    Sha512,
}

/// Parse a certificate from DER
pub fn parse_certificate(der: &[u8]) -> Result<Certificate, CryptoError> {
    Certificate::from_der(der).map_err(|e| CryptoError::InvalidCertificate(e.to_string()))
}

/// RFC 4514 rendering of the subject distinguished name
pub fn subject_rfc4514(cert: &Certificate) -> String {
    cert.tbs_certificate.subject.to_string()
}

/// RFC 4514 rendering of the issuer distinguished name
pub fn issuer_rfc4514(cert: &Certificate) -> String {
    cert.tbs_certificate.issuer.to_string()
}

/// Serial number as a minimum-width unsigned big-endian integer.
/// DER's sign-padding zero, when present, is stripped.
pub fn serial_bytes(cert: &Certificate) -> Vec<u8> {
    let raw = cert.tbs_certificate.serial_number.as_bytes();
    let mut start = 0;
    while start + 1 < raw.len() && raw[start] == 0 {
        start += 1;
    }
    raw[start..].to_vec()
}

/// The certificate's own signature bytes, copied verbatim
pub fn signature_bytes(cert: &Certificate) -> Result<Vec<u8>, CryptoError> {
    cert.signature
        .as_bytes()
        .map(|b| b.to_vec())
        .ok_or_else(|| {
            CryptoError::InvalidCertificate("certificate signature is not octet-aligned".into())
        })
}

/// Re-encode the certificate to DER
pub fn certificate_der(cert: &Certificate) -> Result<Vec<u8>, CryptoError> {
    cert.to_der()
        .map_err(|e| CryptoError::InvalidCertificate(e.to_string()))
}

fn spki_key_bytes(cert: &Certificate) -> Result<&[u8], CryptoError> {
    cert.tbs_certificate
        .subject_public_key_info
        .subject_public_key
        .as_bytes()
        .ok_or_else(|| {
            CryptoError::InvalidCertificate("subject public key is not octet-aligned".into())
        })
}

/// Extract the public key as a tagged union over the supported types
pub fn public_key(cert: &Certificate) -> Result<KeyMaterial, CryptoError> {
    let oid = cert
        .tbs_certificate
        .subject_public_key_info
        .algorithm
        .oid;
    let key_bytes = spki_key_bytes(cert)?;
    if oid == RSA_ENCRYPTION {
        let key = RsaPublicKey::from_pkcs1_der(key_bytes)
            .map_err(|e| CryptoError::InvalidCertificate(e.to_string()))?;
        Ok(KeyMaterial::Rsa(key))
    } else if oid == ID_EC_PUBLIC_KEY {
        if key_bytes.first() != Some(&0x04) {
            return Err(CryptoError::UnsupportedKeyType(
                "EC public key is not an uncompressed point".to_string(),
            ));
        }
        Ok(KeyMaterial::Ec(key_bytes.to_vec()))
    } else {
        Err(CryptoError::UnsupportedKeyType(oid.to_string()))
    }
}

/// The key bytes a trust-list record carries in PUBLIC_KEY: for both
/// supported types this is exactly the SPKI bit-string content
pub fn public_key_wire(cert: &Certificate) -> Result<Vec<u8>, CryptoError> {
    // Validates the type while borrowing the same bytes.
    match public_key(cert)? {
        KeyMaterial::Rsa(_) | KeyMaterial::Ec(_) => Ok(spki_key_bytes(cert)?.to_vec()),
    }
}

/// Fingerprint over the certificate DER
pub fn fingerprint(
    cert: &Certificate,
    algorithm: FingerprintAlgorithm,
) -> Result<Vec<u8>, CryptoError> {
    let der = certificate_der(cert)?;
    let bytes = match algorithm {
        FingerprintAlgorithm::Md5 => Md5::digest(&der).to_vec(),
        FingerprintAlgorithm::Sha1 => Sha1::digest(&der).to_vec(),
        FingerprintAlgorithm::Sha256 => Sha256::digest(&der).to_vec(),
        FingerprintAlgorithm::Sha512 => Sha512::digest(&der).to_vec(),
    };
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;
    use rsa::RsaPrivateKey;
    use rsa::pkcs8::EncodePublicKey;
    use std::str::FromStr;
    use std::time::Duration;
    use x509_cert::builder::{Builder, CertificateBuilder, Profile};
    use x509_cert::name::Name;
    use x509_cert::serial_number::SerialNumber;
    use x509_cert::spki::SubjectPublicKeyInfoOwned;
    use x509_cert::time::Validity;

    fn cert_params(common_name: &str, serial: &[u8]) -> (SerialNumber, Validity, Name) {
        (
            SerialNumber::new(serial).unwrap(),
            Validity::from_now(Duration::from_secs(3600)).unwrap(),
            Name::from_str(&format!("CN={common_name},O=tlvseal test")).unwrap(),
        )
    }

    fn rsa_certificate(common_name: &str, serial: &[u8]) -> (Certificate, RsaPrivateKey) {
        let key = RsaPrivateKey::new(&mut OsRng, 512).unwrap();
        let spki_der = RsaPublicKey::from(&key).to_public_key_der().unwrap();
        let spki = SubjectPublicKeyInfoOwned::from_der(spki_der.as_bytes()).unwrap();
        let (serial, validity, subject) = cert_params(common_name, serial);
        let signer = rsa::pkcs1v15::SigningKey::<Sha256>::new(key.clone());
        let builder =
            CertificateBuilder::new(Profile::Root, serial, validity, subject, spki, &signer)
                .unwrap();
        (builder.build::<rsa::pkcs1v15::Signature>().unwrap(), key)
    }

    fn ec_certificate(common_name: &str, serial: &[u8]) -> (Certificate, p256::ecdsa::VerifyingKey) {
        let signing = p256::ecdsa::SigningKey::random(&mut OsRng);
        let verifying = *signing.verifying_key();
        let spki_der = verifying.to_public_key_der().unwrap();
        let spki = SubjectPublicKeyInfoOwned::from_der(spki_der.as_bytes()).unwrap();
        let (serial, validity, subject) = cert_params(common_name, serial);
        let builder =
            CertificateBuilder::new(Profile::Root, serial, validity, subject, spki, &signing)
                .unwrap();
        (builder.build::<p256::ecdsa::DerSignature>().unwrap(), verifying)
    }

    #[test]
    fn test_names_join_rdns_with_comma() {
        let (cert, _) = rsa_certificate("unit", &[0x42]);

        let subject = subject_rfc4514(&cert);
        assert!(subject.contains("CN=unit"));
        assert!(subject.contains("O=tlvseal test"));
        assert_eq!(subject.matches(',').count(), 1);
        assert!(!subject.contains(';'));
        // Self-signed: issuer renders identically.
        assert_eq!(issuer_rfc4514(&cert), subject);
    }

    #[test]
    fn test_serial_strips_der_sign_padding() {
        // 0xFF needs a sign-padding zero in DER; the wire form drops it.
        let (cert, _) = rsa_certificate("serial", &[0x00, 0xFF]);
        assert_eq!(serial_bytes(&cert), vec![0xFF]);

        // Redundant zeros collapse to the minimum-width magnitude.
        let (cert, _) = rsa_certificate("serial", &[0x00, 0x00, 0x01]);
        assert_eq!(serial_bytes(&cert), vec![0x01]);
    }

    #[test]
    fn test_serial_minimum_width_preserved() {
        let (cert, _) = rsa_certificate("serial", &[0x42]);
        assert_eq!(serial_bytes(&cert), vec![0x42]);

        let (cert, _) = rsa_certificate("serial", &[0x01, 0x02]);
        assert_eq!(serial_bytes(&cert), vec![0x01, 0x02]);

        // A zero serial keeps its single byte.
        let (cert, _) = rsa_certificate("serial", &[0x00]);
        assert_eq!(serial_bytes(&cert), vec![0x00]);
    }

    #[test]
    fn test_public_key_rsa_branch() {
        let (cert, key) = rsa_certificate("rsa", &[0x42]);

        match public_key(&cert).unwrap() {
            KeyMaterial::Rsa(public) => assert_eq!(public, RsaPublicKey::from(&key)),
            KeyMaterial::Ec(_) => panic!("expected RSA key material"),
        }

        // The wire bytes are the PKCS#1 RSAPublicKey DER.
        let wire = public_key_wire(&cert).unwrap();
        assert_eq!(wire[0], 0x30);
        let decoded = RsaPublicKey::from_pkcs1_der(&wire).unwrap();
        assert_eq!(decoded, RsaPublicKey::from(&key));
    }

    #[test]
    fn test_public_key_ec_branch() {
        let (cert, verifying) = ec_certificate("ec", &[0x42]);
        let expected = verifying.to_encoded_point(false);

        match public_key(&cert).unwrap() {
            KeyMaterial::Ec(point) => {
                assert_eq!(point.len(), 65);
                assert_eq!(point[0], 0x04);
                assert_eq!(point, expected.as_bytes());
            }
            KeyMaterial::Rsa(_) => panic!("expected EC key material"),
        }
        assert_eq!(public_key_wire(&cert).unwrap(), expected.as_bytes());
    }

    #[test]
    fn test_signature_and_der_roundtrip() {
        let (cert, _) = rsa_certificate("roundtrip", &[0x42]);
        assert!(!signature_bytes(&cert).unwrap().is_empty());

        let der = certificate_der(&cert).unwrap();
        let reparsed = parse_certificate(&der).unwrap();
        assert_eq!(subject_rfc4514(&reparsed), subject_rfc4514(&cert));
        assert_eq!(serial_bytes(&reparsed), serial_bytes(&cert));
    }

    #[test]
    fn test_fingerprint_algorithms() {
        let (cert, _) = rsa_certificate("digest", &[0x42]);
        let der = certificate_der(&cert).unwrap();

        for (algorithm, len) in [
            (FingerprintAlgorithm::Md5, 16),
            (FingerprintAlgorithm::Sha1, 20),
            (FingerprintAlgorithm::Sha256, 32),
            (FingerprintAlgorithm::Sha512, 64),
        ] {
            assert_eq!(fingerprint(&cert, algorithm).unwrap().len(), len);
        }
        assert_eq!(
            fingerprint(&cert, FingerprintAlgorithm::Md5).unwrap(),
            Md5::digest(&der).to_vec()
        );
        assert_eq!(
            fingerprint(&cert, FingerprintAlgorithm::Sha1).unwrap(),
            Sha1::digest(&der).to_vec()
        );
    }
}
