//! Opaque payload profile: SGN envelopes
//!
//! An SGN file is a signed header followed by raw payload bytes.
//! Stripping copies everything past the header length and needs neither
//! keys nor signature verification.

use crate::error::SealError;
use crate::identity::SignerIdentity;
use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tlvseal_crypto::{Certificate, KeyMaterial, public_key, rsa_verify, sign_pkcs1v15};
use tlvseal_protocol::{
    HashAlgorithm, HeaderSpec, HeaderView, assemble_header, extract_signature, splice_signature,
    walk_header,
};
use tracing::info;

/// Outcome of a signature check. Structural problems surface as errors;
/// a well-formed envelope whose signature does not verify is a verdict,
/// not an error, so parsers can still report everything they decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureVerdict {
    Valid,
    Invalid,
}

impl fmt::Display for SignatureVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignatureVerdict::Valid => f.write_str("Valid signature"),
            SignatureVerdict::Invalid => f.write_str("Invalid signature"),
        }
    }
}

/// Current time as the wire format's 4-byte POSIX seconds; values past
/// 2106 saturate rather than wrap.
pub(crate) fn now_posix() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u32::try_from(d.as_secs()).unwrap_or(u32::MAX))
        .unwrap_or(0)
}

/// Builds only produce SHA-1 and SHA-512 signatures; SHA-256 is parsed
/// but never emitted.
pub(crate) fn ensure_signing_digest(algorithm: HashAlgorithm) -> Result<(), SealError> {
    match algorithm {
        HashAlgorithm::Sha1 | HashAlgorithm::Sha512 => Ok(()),
        HashAlgorithm::Sha256 => Err(SealError::UnsupportedSigningDigest { digest: "SHA256" }),
    }
}

/// Sign an envelope over an already-assembled header spec and payload.
/// Shared by every profile: assemble with the signature hole recorded,
/// sign the hole-free image, splice the framed signature in.
pub(crate) fn build_signed(
    spec: &HeaderSpec,
    payload: &[u8],
    identity: &SignerIdentity,
    algorithm: HashAlgorithm,
) -> Result<Vec<u8>, SealError> {
    let assembled = assemble_header(spec)?;
    let mut unsigned = assembled.bytes;
    unsigned.extend_from_slice(payload);
    let signature = sign_pkcs1v15(identity.private_key(), &unsigned, algorithm)?;
    Ok(splice_signature(
        &unsigned,
        &signature,
        assembled.signature_insert_offset,
    )?)
}

/// Verify the envelope signature of any container shape against a
/// trusted certificate.
pub(crate) fn verify_envelope(
    file: &[u8],
    view: &HeaderView,
    trusted: &Certificate,
) -> Result<SignatureVerdict, SealError> {
    let span = view.require_signature_span()?;
    let algorithm = view.require_hash_algorithm()?;
    let (unsigned, signature) = extract_signature(file, &span)?;
    let key = match public_key(trusted)? {
        KeyMaterial::Rsa(key) => key,
        KeyMaterial::Ec(_) => {
            return Err(SealError::Crypto(
                tlvseal_crypto::CryptoError::UnsupportedKeyType(
                    "envelope verification requires an RSA certificate".to_string(),
                ),
            ));
        }
    };
    match rsa_verify(&key, &unsigned, &signature, algorithm) {
        Ok(()) => Ok(SignatureVerdict::Valid),
        Err(tlvseal_crypto::CryptoError::InvalidSignature) => Ok(SignatureVerdict::Invalid),
        Err(e) => Err(e.into()),
    }
}

/// High-level SGN operations
///
/// # Examples
///
/// ```no_run
/// use tlvseal::{Sgn, SignerIdentity};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let identity = SignerIdentity::from_pem_file("tftp.pem")?;
/// let signed = Sgn::sign(b"firmware image".to_vec())
///     .filename("firmware.bin.sgn")
///     .to_bytes(&identity)?;
/// let payload = Sgn::strip(&signed)?;
/// # Ok(())
/// # }
/// ```
pub struct Sgn;

impl Sgn {
    /// Sign an opaque payload. Returns a builder for header options.
    pub fn sign(payload: impl Into<Vec<u8>>) -> SgnBuilder {
        SgnBuilder::new(payload.into())
    }

    /// Recover the payload by copying everything past the header. No
    /// keys and no signature are needed; an unsigned header-only
    /// envelope yields an empty payload.
    pub fn strip(file: &[u8]) -> Result<Vec<u8>, SealError> {
        let view = walk_header(file)?;
        Ok(file[view.header_length..].to_vec())
    }

    /// Check the envelope signature against a trusted certificate
    pub fn verify(file: &[u8], trusted: &Certificate) -> Result<SignatureVerdict, SealError> {
        let view = walk_header(file)?;
        let verdict = verify_envelope(file, &view, trusted)?;
        info!(%verdict, filename = view.filename.as_deref(), "verified SGN envelope");
        Ok(verdict)
    }
}

/// Builder for SGN envelopes
pub struct SgnBuilder {
    payload: Vec<u8>,
    version: (u8, u8),
    hash: HashAlgorithm,
    filename: Option<String>,
    timestamp: Option<u32>,
}

impl SgnBuilder {
    fn new(payload: Vec<u8>) -> Self {
        Self {
            payload,
            version: (1, 0),
            hash: HashAlgorithm::Sha1,
            filename: None,
            timestamp: None,
        }
    }

    /// Envelope version, default 1.0
    pub fn version(mut self, major: u8, minor: u8) -> Self {
        self.version = (major, minor);
        self
    }

    /// Signature digest, default SHA-1
    pub fn hash(mut self, hash: HashAlgorithm) -> Self {
        self.hash = hash;
        self
    }

    /// FILENAME header element, typically the output basename
    pub fn filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// TIMESTAMP header element, default now
    pub fn timestamp(mut self, posix_seconds: u32) -> Self {
        self.timestamp = Some(posix_seconds);
        self
    }

    /// Assemble, sign, and splice into the final file image
    pub fn to_bytes(self, identity: &SignerIdentity) -> Result<Vec<u8>, SealError> {
        ensure_signing_digest(self.hash)?;
        let spec = HeaderSpec {
            version: self.version,
            signer_name: identity.subject(),
            issuer_name: identity.issuer(),
            signer_serial: identity.serial(),
            hash_algorithm: self.hash,
            signature_modulus: identity.signature_modulus()?,
            filename: self.filename,
            timestamp: Some(self.timestamp.unwrap_or_else(now_posix)),
            signer_version: None,
            encryption: None,
        };
        build_signed(&spec, &self.payload, identity, self.hash)
    }

    /// Build and write the file image. The FILENAME element defaults to
    /// the output basename.
    pub fn to_file(
        mut self,
        path: impl AsRef<Path>,
        identity: &SignerIdentity,
    ) -> Result<(), SealError> {
        let path = path.as_ref();
        if self.filename.is_none() {
            if let Some(name) = path.file_name() {
                self.filename = Some(name.to_string_lossy().into_owned());
            }
        }
        let bytes = self.to_bytes(identity)?;
        fs::write(path, &bytes)?;
        info!(path = %path.display(), len = bytes.len(), "wrote SGN envelope");
        Ok(())
    }
}

/// Sign `input`, writing `input + ".sgn"`
pub fn sign_file(
    input: impl AsRef<Path>,
    identity: &SignerIdentity,
    hash: HashAlgorithm,
) -> Result<PathBuf, SealError> {
    let input = input.as_ref();
    let payload = fs::read(input)?;

    let mut out = OsString::from(input.as_os_str());
    out.push(".sgn");
    let out = PathBuf::from(out);

    Sgn::sign(payload).hash(hash).to_file(&out, identity)?;
    Ok(out)
}

/// Strip a signed file, writing the payload to the input path minus its
/// last extension (handles both `.sgn` and `.sha512`)
pub fn strip_file(input: impl AsRef<Path>) -> Result<PathBuf, SealError> {
    let input = input.as_ref();
    let file = fs::read(input)?;
    let payload = Sgn::strip(&file)?;

    let out = input.with_extension("");
    fs::write(&out, &payload)?;
    info!(path = %out.display(), len = payload.len(), "stripped SGN envelope");
    Ok(out)
}

/// Verify a signed file against a trusted certificate
pub fn verify_file(
    input: impl AsRef<Path>,
    trusted: &Certificate,
) -> Result<SignatureVerdict, SealError> {
    let file = fs::read(input)?;
    Sgn::verify(&file, trusted)
}
