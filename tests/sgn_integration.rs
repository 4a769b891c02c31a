//! SGN end-to-end tests: build, strip, verify, tamper, file drivers

mod common;

use common::{generate_keypair, test_signer};
use tlvseal::{HashAlgorithm, SealError, Sgn, SignatureVerdict, SignerIdentity};
use tlvseal_protocol::walk_header;

const PAYLOAD: &[u8] = b"hello";

#[test]
fn test_build_starts_with_prelude() {
    let signer = test_signer("tftp", &[0x10]);
    let signed = Sgn::sign(PAYLOAD.to_vec())
        .hash(HashAlgorithm::Sha1)
        .to_bytes(&signer)
        .unwrap();

    // 01 00 02 <major=1> <minor=0> then HEADER_LENGTH framing
    assert_eq!(&signed[..5], &[0x01, 0x00, 0x02, 0x01, 0x00]);
    assert_eq!(&signed[5..8], &[0x02, 0x00, 0x02]);
}

#[test]
fn test_build_strip_roundtrip() {
    let signer = test_signer("tftp", &[0x10]);
    let signed = Sgn::sign(PAYLOAD.to_vec()).to_bytes(&signer).unwrap();
    assert_eq!(Sgn::strip(&signed).unwrap(), PAYLOAD);
}

#[test]
fn test_header_invariants() {
    let signer = test_signer("tftp", &[0x10]);
    let signed = Sgn::sign(PAYLOAD.to_vec())
        .filename("payload.bin.sgn")
        .to_bytes(&signer)
        .unwrap();

    let view = walk_header(&signed).unwrap();
    assert!(view.header_length <= signed.len());
    assert_eq!(view.header_length % 4, 0);
    assert_eq!(view.filename.as_deref(), Some("payload.bin.sgn"));
    assert_eq!(view.signer_serial.as_deref(), Some(&[0x10][..]));
    let span = view.signature_span.unwrap();
    assert!(span.end <= view.header_length);
    // RSA-2048: 256 signature bytes plus 3 framing bytes
    assert_eq!(span.len(), 259);
}

#[test]
fn test_verify_and_payload_tamper() {
    let signer = test_signer("tftp", &[0x10]);
    let signed = Sgn::sign(PAYLOAD.to_vec()).to_bytes(&signer).unwrap();

    assert_eq!(
        Sgn::verify(&signed, signer.certificate()).unwrap(),
        SignatureVerdict::Valid
    );

    // Flipping any single payload byte must flip the verdict.
    let mut tampered = signed.clone();
    let last = tampered.len() - 1;
    tampered[last] ^= 0x01;
    assert_eq!(
        Sgn::verify(&tampered, signer.certificate()).unwrap(),
        SignatureVerdict::Invalid
    );
}

#[test]
fn test_verify_with_wrong_certificate() {
    let signer = test_signer("tftp", &[0x10]);
    let other = test_signer("rogue", &[0x11]);
    let signed = Sgn::sign(PAYLOAD.to_vec()).to_bytes(&signer).unwrap();

    assert_eq!(
        Sgn::verify(&signed, other.certificate()).unwrap(),
        SignatureVerdict::Invalid
    );
}

#[test]
fn test_sha512_build_verifies() {
    let signer = test_signer("tftp", &[0x10]);
    let signed = Sgn::sign(PAYLOAD.to_vec())
        .hash(HashAlgorithm::Sha512)
        .to_bytes(&signer)
        .unwrap();

    let view = walk_header(&signed).unwrap();
    assert_eq!(view.hash_algorithm, Some(HashAlgorithm::Sha512));
    assert_eq!(
        Sgn::verify(&signed, signer.certificate()).unwrap(),
        SignatureVerdict::Valid
    );
}

#[test]
fn test_sha256_refused_for_signing() {
    let signer = test_signer("tftp", &[0x10]);
    let err = Sgn::sign(PAYLOAD.to_vec())
        .hash(HashAlgorithm::Sha256)
        .to_bytes(&signer)
        .unwrap_err();
    assert!(matches!(err, SealError::UnsupportedSigningDigest { .. }));
}

#[test]
fn test_1024_bit_key_refused() {
    let (cert, key) = generate_keypair("short", &[0x12], 1024);
    let signer = SignerIdentity::new(cert, key);
    let err = Sgn::sign(PAYLOAD.to_vec()).to_bytes(&signer).unwrap_err();
    assert!(matches!(
        err,
        SealError::UnsupportedKeySize { bits: 1024 }
    ));
}

#[test]
fn test_strip_of_unsigned_header_only_envelope_is_empty() {
    // VERSION + HEADER_LENGTH and nothing else.
    let minimal = [0x01, 0x00, 0x02, 0x01, 0x00, 0x02, 0x00, 0x02, 0x00, 0x0A];
    assert_eq!(Sgn::strip(&minimal).unwrap(), Vec::<u8>::new());
}

#[test]
fn test_file_drivers() {
    let signer = test_signer("tftp", &[0x10]);
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("image.bin");
    std::fs::write(&input, PAYLOAD).unwrap();

    let signed_path = tlvseal::sign_file(&input, &signer, HashAlgorithm::Sha1).unwrap();
    assert_eq!(signed_path, dir.path().join("image.bin.sgn"));
    assert_eq!(
        tlvseal::verify_file(&signed_path, signer.certificate()).unwrap(),
        SignatureVerdict::Valid
    );

    // Stripping drops the last extension, recovering the original path.
    std::fs::remove_file(&input).unwrap();
    let stripped = tlvseal::strip_file(&signed_path).unwrap();
    assert_eq!(stripped, input);
    assert_eq!(std::fs::read(&stripped).unwrap(), PAYLOAD);
}
