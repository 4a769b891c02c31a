//! Encrypted payload profile: ENC configuration envelopes
//!
//! An ENC build hashes the plaintext configuration, pads it with 0x0D
//! bytes of an explicit count, AES-128-CBC encrypts it under a
//! once-drawn key and IV, wraps the key for the recipient device, signs
//! the envelope, and produces a companion pointer envelope telling the
//! device which certificate hash to use and that configuration is
//! encrypted. Decryption reverses the steps and asserts the plaintext
//! digest against ENCRYPTION_HASH.

use crate::config_xml::DeviceConfig;
use crate::error::SealError;
use crate::identity::SignerIdentity;
use crate::sgn::{Sgn, SignatureVerdict, build_signed, ensure_signing_digest, now_posix, verify_envelope};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use tlvseal_crypto::{
    Certificate, FingerprintAlgorithm, Iv, KeyMaterial, RsaPrivateKey, aes128_cbc_decrypt,
    aes128_cbc_encrypt, digest, fingerprint, generate_iv, generate_key_16, public_key,
    unwrap_key, wrap_key,
};
use tlvseal_protocol::{EncryptionSpec, HashAlgorithm, HeaderSpec, TlvError, walk_header};
use tracing::info;

/// The padding fill byte. It equals the PADDING tag value by design;
/// the decoder must rely on the explicit ENCRYPTION_PADDING count and
/// never scan for this byte.
const PAD_BYTE: u8 = 0x0D;

/// Both output images of an ENC build
#[derive(Debug)]
pub struct EncBuild {
    /// The signed envelope around the ciphertext (`base.enc.sgn`)
    pub encrypted: Vec<u8>,
    /// The signed pointer envelope (`base.sgn`)
    pub pointer: Vec<u8>,
}

/// High-level ENC operations
///
/// # Examples
///
/// ```no_run
/// use tlvseal::{EncConfig, SignerIdentity, load_certificate_file};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let tftp = SignerIdentity::from_pem_file("tftp.pem")?;
/// let device = load_certificate_file("device.pem")?;
///
/// let xml = b"<device><loadInformation>X</loadInformation></device>";
/// let build = EncConfig::encrypt(xml.to_vec()).build(&device, &tftp)?;
/// # Ok(())
/// # }
/// ```
pub struct EncConfig;

impl EncConfig {
    /// Encrypt a device-configuration document. Returns a builder; the
    /// default entropy source is the OS CSPRNG.
    pub fn encrypt(plaintext_xml: impl Into<Vec<u8>>) -> EncBuilder<OsRng> {
        EncBuilder::new(plaintext_xml.into())
    }

    /// Decrypt an ENC envelope with the recipient device's private key,
    /// returning the plaintext configuration
    pub fn decrypt(file: &[u8], recipient_key: &RsaPrivateKey) -> Result<Vec<u8>, SealError> {
        let view = walk_header(file)?;
        let enc = view.require_encryption()?;

        let key = unwrap_key(recipient_key, &enc.wrapped_key)?;
        let padded = aes128_cbc_decrypt(&key, &Iv(enc.iv), &file[view.header_length..])?;

        let padding = usize::from(enc.padding);
        if padding == 0 || padding > 16 || padding > padded.len() {
            return Err(SealError::Tlv(TlvError::BadLength {
                field: "ENCRYPTION_PADDING",
                len: padding,
            }));
        }
        let plaintext = &padded[..padded.len() - padding];

        if digest(enc.hash_algorithm, plaintext) != enc.hash {
            return Err(SealError::HashMismatch);
        }
        info!(len = plaintext.len(), "decrypted ENC configuration");
        Ok(plaintext.to_vec())
    }

    /// Check the envelope signature against a trusted certificate
    pub fn verify(file: &[u8], trusted: &Certificate) -> Result<SignatureVerdict, SealError> {
        let view = walk_header(file)?;
        verify_envelope(file, &view, trusted)
    }
}

/// Builder for ENC envelopes. The entropy source is injectable so tests
/// can run deterministically.
pub struct EncBuilder<R: RngCore + CryptoRng> {
    plaintext: Vec<u8>,
    version: (u8, u8),
    hash: HashAlgorithm,
    filename: Option<String>,
    pointer_filename: Option<String>,
    timestamp: Option<u32>,
    rng: R,
}

impl EncBuilder<OsRng> {
    fn new(plaintext: Vec<u8>) -> Self {
        Self {
            plaintext,
            version: (1, 0),
            hash: HashAlgorithm::Sha1,
            filename: None,
            pointer_filename: None,
            timestamp: None,
            rng: OsRng,
        }
    }
}

impl<R: RngCore + CryptoRng> EncBuilder<R> {
    /// Replace the entropy source
    pub fn rng<R2: RngCore + CryptoRng>(self, rng: R2) -> EncBuilder<R2> {
        EncBuilder {
            plaintext: self.plaintext,
            version: self.version,
            hash: self.hash,
            filename: self.filename,
            pointer_filename: self.pointer_filename,
            timestamp: self.timestamp,
            rng,
        }
    }

    /// Envelope version, default 1.0
    pub fn version(mut self, major: u8, minor: u8) -> Self {
        self.version = (major, minor);
        self
    }

    /// Digest for both the signature and ENCRYPTION_HASH, default SHA-1
    pub fn hash(mut self, hash: HashAlgorithm) -> Self {
        self.hash = hash;
        self
    }

    /// FILENAME element of the encrypted envelope
    pub fn filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// FILENAME element of the pointer envelope
    pub fn pointer_filename(mut self, filename: impl Into<String>) -> Self {
        self.pointer_filename = Some(filename.into());
        self
    }

    /// TIMESTAMP for both envelopes, default now
    pub fn timestamp(mut self, posix_seconds: u32) -> Self {
        self.timestamp = Some(posix_seconds);
        self
    }

    /// Run the build: hash, pad, encrypt, wrap, assemble, sign, and
    /// derive the pointer envelope.
    pub fn build(
        mut self,
        recipient: &Certificate,
        identity: &SignerIdentity,
    ) -> Result<EncBuild, SealError> {
        ensure_signing_digest(self.hash)?;
        let config = DeviceConfig::parse(
            std::str::from_utf8(&self.plaintext)
                .map_err(|e| SealError::BadConfigXml(e.to_string()))?,
        )?;

        let recipient_rsa = match public_key(recipient)? {
            KeyMaterial::Rsa(key) => key,
            KeyMaterial::Ec(_) => {
                return Err(SealError::Crypto(
                    tlvseal_crypto::CryptoError::UnsupportedKeyType(
                        "ENC recipient must hold an RSA public key".to_string(),
                    ),
                ));
            }
        };

        let plaintext_hash = digest(self.hash, &self.plaintext);

        // One draw per build, never retried.
        let iv = generate_iv(&mut self.rng);
        let key = generate_key_16(&mut self.rng);

        let padding = 16 - (self.plaintext.len() % 16);
        let mut padded = self.plaintext.clone();
        padded.resize(padded.len() + padding, PAD_BYTE);
        let ciphertext = aes128_cbc_encrypt(&key, &iv, &padded)?;

        let wrapped_key = wrap_key(&mut self.rng, &recipient_rsa, &key)?;

        let timestamp = self.timestamp.unwrap_or_else(now_posix);
        let spec = HeaderSpec {
            version: self.version,
            signer_name: identity.subject(),
            issuer_name: identity.issuer(),
            signer_serial: identity.serial(),
            hash_algorithm: self.hash,
            signature_modulus: identity.signature_modulus()?,
            filename: self.filename,
            timestamp: Some(timestamp),
            signer_version: None,
            encryption: Some(EncryptionSpec {
                iv: iv.0,
                padding: padding as u16,
                key_size_bits: 128,
                wrapped_key,
                hash_algorithm: self.hash,
                hash: plaintext_hash,
            }),
        };
        let encrypted = build_signed(&spec, &ciphertext, identity, self.hash)?;

        let cert_hash = fingerprint(recipient, FingerprintAlgorithm::Md5)?;
        let pointer_xml = config.pointer_document(&hex::encode(cert_hash))?;
        let mut pointer = Sgn::sign(pointer_xml)
            .version(1, 0)
            .hash(self.hash)
            .timestamp(timestamp);
        if let Some(name) = self.pointer_filename {
            pointer = pointer.filename(name);
        }
        let pointer = pointer.to_bytes(identity)?;

        info!(
            ciphertext_len = ciphertext.len(),
            padding, "built ENC envelope pair"
        );
        Ok(EncBuild { encrypted, pointer })
    }
}

fn append_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut os = OsString::from(path.as_os_str());
    os.push(suffix);
    PathBuf::from(os)
}

/// Encrypt a configuration file in place: writes `input + ".enc.sgn"`
/// and the pointer `input + ".sgn"`, then deletes the plaintext input —
/// only after both outputs are on disk.
pub fn encrypt_config_file(
    input: impl AsRef<Path>,
    recipient: &Certificate,
    identity: &SignerIdentity,
    hash: HashAlgorithm,
) -> Result<(PathBuf, PathBuf), SealError> {
    let input = input.as_ref();
    let plaintext = fs::read(input)?;

    let encrypted_path = append_suffix(input, ".enc.sgn");
    let pointer_path = append_suffix(input, ".sgn");

    let mut builder = EncConfig::encrypt(plaintext).hash(hash);
    if let Some(name) = encrypted_path.file_name() {
        builder = builder.filename(name.to_string_lossy().into_owned());
    }
    if let Some(name) = pointer_path.file_name() {
        builder = builder.pointer_filename(name.to_string_lossy().into_owned());
    }
    let build = builder.build(recipient, identity)?;

    fs::write(&encrypted_path, &build.encrypted)?;
    fs::write(&pointer_path, &build.pointer)?;
    fs::remove_file(input)?;
    info!(
        encrypted = %encrypted_path.display(),
        pointer = %pointer_path.display(),
        "encrypted configuration"
    );
    Ok((encrypted_path, pointer_path))
}

/// Decrypt `base.enc.sgn` back to `base`, unlinking the pointer file
/// and the encrypted file once the plaintext is written
pub fn decrypt_config_file(
    input: impl AsRef<Path>,
    recipient_key: &RsaPrivateKey,
) -> Result<PathBuf, SealError> {
    let input = input.as_ref();
    let input_str = input.to_string_lossy();
    let base = input_str.strip_suffix(".enc.sgn").ok_or_else(|| {
        SealError::BadInput(format!("encrypted configuration path must end in .enc.sgn: {input_str}"))
    })?;
    let base = PathBuf::from(base);

    let file = fs::read(input)?;
    let plaintext = EncConfig::decrypt(&file, recipient_key)?;

    fs::write(&base, &plaintext)?;
    let pointer = append_suffix(&base, ".sgn");
    if pointer.exists() {
        fs::remove_file(&pointer)?;
    }
    fs::remove_file(input)?;
    info!(path = %base.display(), "recovered configuration");
    Ok(base)
}
