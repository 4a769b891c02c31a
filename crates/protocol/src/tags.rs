//! Tag registries and wire-level enums
//!
//! The single source of truth for tag numbering. Other modules never
//! hand-code tag bytes. Envelope tags and record tags are separate
//! namespaces: envelope tag 1 is VERSION while record tag 1 opens a
//! certificate record with its total length.

use crate::error::TlvError;
use std::fmt;

/// Envelope header tag namespace
pub mod envelope {
    /// Two bytes, major then minor
    pub const VERSION: u8 = 1;
    /// u16 total header length, inclusive of the (possibly absent) signature framing
    pub const HEADER_LENGTH: u8 = 2;
    /// Container: signer identity
    pub const SIGNER_INFO: u8 = 3;
    /// NUL-terminated UTF-8 RFC 4514 subject
    pub const SIGNER_NAME: u8 = 4;
    /// Minimum-width unsigned big-endian integer
    pub const SERIAL_NUMBER: u8 = 5;
    /// NUL-terminated UTF-8 RFC 4514 issuer
    pub const ISSUER_NAME: u8 = 6;
    /// Container: digest and signature parameters, nested length fixed at 15
    pub const SIGNATURE_INFO: u8 = 7;
    /// One byte: 1=SHA-1, 2=SHA-256, 3=SHA-512
    pub const HASH_ALGORITHM: u8 = 8;
    /// Container: signature algorithm parameters, nested length fixed at 8
    pub const SIGNATURE_ALGORITHM_INFO: u8 = 9;
    /// One byte, always 0 (RSA PKCS#1 v1.5)
    pub const SIGNATURE_ALGORITHM: u8 = 10;
    /// One byte indexing the signature length table
    pub const SIGNATURE_MODULUS: u8 = 11;
    /// The envelope signature; the only element the binder may move
    pub const SIGNATURE: u8 = 12;
    /// Bare filler byte with no length field
    pub const PADDING: u8 = 13;
    /// NUL-terminated UTF-8 file basename
    pub const FILENAME: u8 = 14;
    /// 4-byte big-endian POSIX seconds
    pub const TIMESTAMP: u8 = 15;
    /// Container: ENC profile encryption parameters
    pub const ENCRYPTION_INFO: u8 = 16;
    /// Container: IV and padding count
    pub const ENCRYPTION_IV_INFO: u8 = 17;
    /// One byte, always 0
    pub const ENCRYPTION_UNKNOWN1: u8 = 18;
    /// 16 bytes
    pub const ENCRYPTION_IV: u8 = 19;
    /// u16 count of 0x0D padding bytes appended to the plaintext
    pub const ENCRYPTION_PADDING: u8 = 20;
    /// Container: wrapped key parameters
    pub const ENCRYPTION_KEY_INFO: u8 = 21;
    /// One byte, always 0
    pub const ENCRYPTION_UNKNOWN2: u8 = 22;
    /// u16 key size in bits
    pub const ENCRYPTION_KEY_SIZE: u8 = 23;
    /// One byte, always 1 (AES-CBC)
    pub const ENCRYPTION_KEY_ALGORITHM: u8 = 24;
    /// RSA-wrapped AES key
    pub const ENCRYPTION_KEY: u8 = 25;
    /// One byte hash code for ENCRYPTION_HASH
    pub const ENCRYPTION_HASH_ALGORITHM: u8 = 26;
    /// Digest of the plaintext configuration
    pub const ENCRYPTION_HASH: u8 = 27;
    /// Two bytes, major then minor; trust lists only
    pub const SIGNER_VERSION: u8 = 28;
}

/// Certificate-record tag namespace (trust-list payload)
pub mod record {
    /// Opens a record: `tag:u8 | total_record_length:u16`, no value field
    pub const RECORD_LENGTH: u8 = 1;
    /// NUL-terminated UTF-8 RFC 4514 subject
    pub const SUBJECT_NAME: u8 = 3;
    /// u16 role code
    pub const ROLE: u8 = 4;
    /// NUL-terminated UTF-8 RFC 4514 issuer
    pub const ISSUER_NAME: u8 = 5;
    /// Minimum-width unsigned big-endian integer
    pub const SERIAL_NUMBER: u8 = 6;
    /// RSA PKCS#1 DER or EC X9.62 uncompressed point
    pub const PUBLIC_KEY: u8 = 7;
    /// The certificate's own DER signature, copied verbatim
    pub const SIGNATURE: u8 = 8;
    /// Full X.509 DER
    pub const CERTIFICATE: u8 = 9;
    /// Recognized on parse, never emitted
    pub const IP_ADDRESS: u8 = 10;
    /// Recognized on parse, never emitted
    pub const CERT_HASH: u8 = 11;
    /// Recognized on parse, never emitted
    pub const HASH_ALGORITHM: u8 = 12;
}

/// Human-readable name of an envelope header tag, for trace output
pub fn envelope_tag_name(tag: u8) -> &'static str {
    match tag {
        envelope::VERSION => "VERSION",
        envelope::HEADER_LENGTH => "HEADER_LENGTH",
        envelope::SIGNER_INFO => "SIGNER_INFO",
        envelope::SIGNER_NAME => "SIGNER_NAME",
        envelope::SERIAL_NUMBER => "SERIAL_NUMBER",
        envelope::ISSUER_NAME => "ISSUER_NAME",
        envelope::SIGNATURE_INFO => "SIGNATURE_INFO",
        envelope::HASH_ALGORITHM => "HASH_ALGORITHM",
        envelope::SIGNATURE_ALGORITHM_INFO => "SIGNATURE_ALGORITHM_INFO",
        envelope::SIGNATURE_ALGORITHM => "SIGNATURE_ALGORITHM",
        envelope::SIGNATURE_MODULUS => "SIGNATURE_MODULUS",
        envelope::SIGNATURE => "SIGNATURE",
        envelope::PADDING => "PADDING",
        envelope::FILENAME => "FILENAME",
        envelope::TIMESTAMP => "TIMESTAMP",
        envelope::ENCRYPTION_INFO => "ENCRYPTION_INFO",
        envelope::ENCRYPTION_IV_INFO => "ENCRYPTION_IV_INFO",
        envelope::ENCRYPTION_UNKNOWN1 => "ENCRYPTION_UNKNOWN1",
        envelope::ENCRYPTION_IV => "ENCRYPTION_IV",
        envelope::ENCRYPTION_PADDING => "ENCRYPTION_PADDING",
        envelope::ENCRYPTION_KEY_INFO => "ENCRYPTION_KEY_INFO",
        envelope::ENCRYPTION_UNKNOWN2 => "ENCRYPTION_UNKNOWN2",
        envelope::ENCRYPTION_KEY_SIZE => "ENCRYPTION_KEY_SIZE",
        envelope::ENCRYPTION_KEY_ALGORITHM => "ENCRYPTION_KEY_ALGORITHM",
        envelope::ENCRYPTION_KEY => "ENCRYPTION_KEY",
        envelope::ENCRYPTION_HASH_ALGORITHM => "ENCRYPTION_HASH_ALGORITHM",
        envelope::ENCRYPTION_HASH => "ENCRYPTION_HASH",
        envelope::SIGNER_VERSION => "SIGNER_VERSION",
        _ => "UNKNOWN",
    }
}

/// Digest algorithm codes carried in HASH_ALGORITHM and
/// ENCRYPTION_HASH_ALGORITHM elements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum HashAlgorithm {
    Sha1 = 1,
    /// Recognized on parse; builds never produce it
    Sha256 = 2,
    Sha512 = 3,
}

impl HashAlgorithm {
    /// Parse from the wire byte
    pub fn from_wire(code: u8) -> Result<Self, TlvError> {
        match code {
            1 => Ok(HashAlgorithm::Sha1),
            2 => Ok(HashAlgorithm::Sha256),
            3 => Ok(HashAlgorithm::Sha512),
            _ => Err(TlvError::UnsupportedAlgorithm { code }),
        }
    }

    /// Convert to the wire byte
    pub fn to_wire(self) -> u8 {
        self as u8
    }

    /// Digest output length in bytes
    pub fn digest_len(self) -> usize {
        match self {
            HashAlgorithm::Sha1 => 20,
            HashAlgorithm::Sha256 => 32,
            HashAlgorithm::Sha512 => 64,
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HashAlgorithm::Sha1 => "SHA1",
            HashAlgorithm::Sha256 => "SHA256",
            HashAlgorithm::Sha512 => "SHA512",
        };
        f.write_str(name)
    }
}

/// SIGNATURE_MODULUS wire values, indexing the signature length table
/// `[64, 128, 256, 512]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SignatureModulus {
    Len64 = 0,
    Len128 = 1,
    Len256 = 2,
    Len512 = 3,
}

impl SignatureModulus {
    /// Parse from the wire byte
    pub fn from_wire(code: u8) -> Result<Self, TlvError> {
        match code {
            0 => Ok(SignatureModulus::Len64),
            1 => Ok(SignatureModulus::Len128),
            2 => Ok(SignatureModulus::Len256),
            3 => Ok(SignatureModulus::Len512),
            _ => Err(TlvError::UnsupportedAlgorithm { code }),
        }
    }

    /// Convert to the wire byte
    pub fn to_wire(self) -> u8 {
        self as u8
    }

    /// Signature length in bytes
    pub fn signature_len(self) -> usize {
        match self {
            SignatureModulus::Len64 => 64,
            SignatureModulus::Len128 => 128,
            SignatureModulus::Len256 => 256,
            SignatureModulus::Len512 => 512,
        }
    }

    /// Look up the table entry for an RSA signature of `len` bytes.
    /// Returns `None` for moduli outside the table; builds must refuse
    /// such keys before any bytes are written.
    pub fn from_signature_len(len: usize) -> Option<Self> {
        match len {
            64 => Some(SignatureModulus::Len64),
            128 => Some(SignatureModulus::Len128),
            256 => Some(SignatureModulus::Len256),
            512 => Some(SignatureModulus::Len512),
            _ => None,
        }
    }
}

/// Certificate roles carried in trust-list records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// SAST: the identity whose key signs envelopes
    SigningAuthority,
    /// CCM: call manager
    CallManager,
    /// CCM+TFTP: call manager that also serves files
    CallManagerFileServer,
    /// TFTP: file server
    FileServer,
    /// CAPF: certificate authority proxy function
    AuthenticationProxy,
    /// Application server
    ApplicationServer,
    /// TVS: telephony verification service
    TelephonyVerification,
    /// A code outside the known table, preserved for forensic output
    Other(u16),
}

impl Role {
    /// Parse from the u16 wire code
    pub fn from_wire(code: u16) -> Self {
        match code {
            0 => Role::SigningAuthority,
            1 => Role::CallManager,
            2 => Role::CallManagerFileServer,
            3 => Role::FileServer,
            4 => Role::AuthenticationProxy,
            7 => Role::ApplicationServer,
            21 => Role::TelephonyVerification,
            other => Role::Other(other),
        }
    }

    /// Convert to the u16 wire code
    pub fn to_wire(self) -> u16 {
        match self {
            Role::SigningAuthority => 0,
            Role::CallManager => 1,
            Role::CallManagerFileServer => 2,
            Role::FileServer => 3,
            Role::AuthenticationProxy => 4,
            Role::ApplicationServer => 7,
            Role::TelephonyVerification => 21,
            Role::Other(code) => code,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::SigningAuthority => f.write_str("SAST"),
            Role::CallManager => f.write_str("CCM"),
            Role::CallManagerFileServer => f.write_str("CCM+TFTP"),
            Role::FileServer => f.write_str("TFTP"),
            Role::AuthenticationProxy => f.write_str("CAPF"),
            Role::ApplicationServer => f.write_str("APP-SERVER"),
            Role::TelephonyVerification => f.write_str("TVS"),
            Role::Other(code) => write!(f, "ROLE({code})"),
        }
    }
}
