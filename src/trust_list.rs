//! Record payload profile: trust lists
//!
//! A trust list binds a set of role-tagged certificates under one
//! envelope signature so devices can install root trust. Exactly one
//! record carries the signing-authority role, and its serial must match
//! the header's signer serial; verification resolves that record and
//! uses its certificate's public key.

use crate::error::SealError;
use crate::identity::SignerIdentity;
use crate::sgn::{SignatureVerdict, build_signed, ensure_signing_digest, now_posix, verify_envelope};
use std::fmt;
use std::fs;
use std::path::Path;
use tlvseal_crypto::{
    Certificate, certificate_der, issuer_rfc4514, parse_certificate, public_key_wire,
    serial_bytes, signature_bytes, subject_rfc4514,
};
use tlvseal_protocol::{
    HashAlgorithm, HeaderSpec, RecordFields, RecordView, Role, encode_record, parse_records,
    walk_header,
};
use tracing::info;

/// High-level trust-list operations
///
/// # Examples
///
/// ```no_run
/// use tlvseal::{HashAlgorithm, Role, SignerIdentity, TrustList};
/// # use tlvseal::load_certificate_file;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let sast = SignerIdentity::from_pem_file("sast.pem")?;
/// let ccm = load_certificate_file("ccm.pem")?;
///
/// TrustList::build()
///     .record(sast.certificate().clone(), Role::SigningAuthority)
///     .record(ccm, Role::CallManager)
///     .hash(HashAlgorithm::Sha512)
///     .to_file("install.tlv", &sast)?;
/// # Ok(())
/// # }
/// ```
pub struct TrustList;

impl TrustList {
    /// Start a trust-list build
    pub fn build() -> TrustListBuilder {
        TrustListBuilder::new()
    }

    /// Parse a trust-list file, resolve the signing-authority record
    /// matching the header's signer serial, and verify the envelope
    /// signature with that record's certificate.
    pub fn parse(file: &[u8]) -> Result<TrustListReport, SealError> {
        let view = walk_header(file)?;
        let records = parse_records(&file[view.header_length..])?;
        let digest = view.require_hash_algorithm()?;
        let signer_serial = view.require_signer_serial()?.to_vec();

        let authorities: Vec<&RecordView> = records
            .iter()
            .filter(|r| r.role == Role::SigningAuthority)
            .collect();
        if authorities.is_empty() {
            return Err(SealError::MissingSigningAuthority);
        }
        let signer_record = authorities
            .iter()
            .find(|r| r.serial == signer_serial)
            .ok_or(SealError::SignerSerialMismatch)?;

        let signer_cert = parse_certificate(&signer_record.certificate)?;
        let verdict = verify_envelope(file, &view, &signer_cert)?;
        info!(
            records = records.len(),
            %digest,
            %verdict,
            "parsed trust list"
        );

        Ok(TrustListReport {
            version: view.version,
            signer_version: view.signer_version,
            digest,
            signer_name: view.signer_name,
            signer_serial,
            records,
            verdict,
        })
    }
}

/// Builder for trust-list envelopes
pub struct TrustListBuilder {
    records: Vec<(Certificate, Role)>,
    version: (u8, u8),
    signer_version: (u8, u8),
    hash: HashAlgorithm,
    filename: Option<String>,
    timestamp: Option<u32>,
}

impl TrustListBuilder {
    fn new() -> Self {
        Self {
            records: Vec::new(),
            version: (1, 0),
            signer_version: (1, 1),
            hash: HashAlgorithm::Sha1,
            filename: None,
            timestamp: None,
        }
    }

    /// Append a certificate record with its role
    pub fn record(mut self, certificate: Certificate, role: Role) -> Self {
        self.records.push((certificate, role));
        self
    }

    /// Envelope version, default 1.0
    pub fn version(mut self, major: u8, minor: u8) -> Self {
        self.version = (major, minor);
        self
    }

    /// Trust-list layout version (tag 28), default 1.1
    pub fn signer_version(mut self, major: u8, minor: u8) -> Self {
        self.signer_version = (major, minor);
        self
    }

    /// Signature digest, default SHA-1
    pub fn hash(mut self, hash: HashAlgorithm) -> Self {
        self.hash = hash;
        self
    }

    /// FILENAME header element
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

        let mut sast_serials = self
            .records
            .iter()
            .filter(|(_, role)| *role == Role::SigningAuthority)
            .map(|(cert, _)| serial_bytes(cert));
        let sast_serial = sast_serials.next().ok_or(SealError::MissingSigningAuthority)?;
        if sast_serials.next().is_some() {
            return Err(SealError::BadInput(
                "trust list must carry exactly one signing-authority record".to_string(),
            ));
        }
        if sast_serial != identity.serial() {
            return Err(SealError::SignerSerialMismatch);
        }

        let mut payload = Vec::new();
        for (certificate, role) in &self.records {
            let fields = RecordFields {
                subject: subject_rfc4514(certificate),
                issuer: issuer_rfc4514(certificate),
                serial: serial_bytes(certificate),
                role: *role,
                public_key: public_key_wire(certificate)?,
                signature: signature_bytes(certificate)?,
                certificate: certificate_der(certificate)?,
            };
            payload.extend(encode_record(&fields)?);
        }

        let spec = HeaderSpec {
            version: self.version,
            signer_name: identity.subject(),
            issuer_name: identity.issuer(),
            signer_serial: identity.serial(),
            hash_algorithm: self.hash,
            signature_modulus: identity.signature_modulus()?,
            filename: self.filename,
            timestamp: Some(self.timestamp.unwrap_or_else(now_posix)),
            signer_version: Some(self.signer_version),
            encryption: None,
        };
        build_signed(&spec, &payload, identity, self.hash)
    }

    /// Build and write the file image. Trust-list paths must end in
    /// `.tlv`; the FILENAME element defaults to the output basename.
    pub fn to_file(
        mut self,
        path: impl AsRef<Path>,
        identity: &SignerIdentity,
    ) -> Result<(), SealError> {
        let path = path.as_ref();
        if path.extension().and_then(|e| e.to_str()) != Some("tlv") {
            return Err(SealError::BadInput(format!(
                "trust list path must end in .tlv: {}",
                path.display()
            )));
        }
        if self.filename.is_none() {
            if let Some(name) = path.file_name() {
                self.filename = Some(name.to_string_lossy().into_owned());
            }
        }
        let bytes = self.to_bytes(identity)?;
        fs::write(path, &bytes)?;
        info!(path = %path.display(), len = bytes.len(), "wrote trust list");
        Ok(())
    }
}

/// Everything a parse decoded, plus the signature verdict
#[derive(Debug, Clone)]
pub struct TrustListReport {
    pub version: (u8, u8),
    pub signer_version: Option<(u8, u8)>,
    pub digest: HashAlgorithm,
    pub signer_name: Option<String>,
    pub signer_serial: Vec<u8>,
    pub records: Vec<RecordView>,
    pub verdict: SignatureVerdict,
}

impl fmt::Display for TrustListReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Version: {}.{}", self.version.0, self.version.1)?;
        if let Some((major, minor)) = self.signer_version {
            writeln!(f, "Signer Version: {major}.{minor}")?;
        }
        writeln!(f, "Digest Algorithm: {}", self.digest)?;
        if let Some(name) = &self.signer_name {
            writeln!(f, "Signer: {name}")?;
        }
        writeln!(f, "Signer Serial: {}", hex::encode(&self.signer_serial))?;
        for (index, record) in self.records.iter().enumerate() {
            writeln!(f)?;
            writeln!(f, "Record #{}:", index + 1)?;
            writeln!(f, "  Subject: {}", record.subject)?;
            writeln!(f, "  Issuer: {}", record.issuer)?;
            writeln!(f, "  Serial Number: {}", hex::encode(&record.serial))?;
            writeln!(f, "  Role: {}", record.role)?;
        }
        writeln!(f)?;
        write!(f, "{}", self.verdict)
    }
}
