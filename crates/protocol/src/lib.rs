//! tlvseal Protocol Types
//!
//! This crate implements the tag-length-value grammar shared by the three
//! container shapes of the device-security ecosystem:
//! - SGN: a signed envelope around an opaque payload
//! - Trust list: a signed envelope around certificate records
//! - ENC: a signed envelope around an AES-encrypted configuration
//!
//! ## Format Overview
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │ Header (VERSION, HEADER_LENGTH,     │
//! │   SIGNER_INFO, SIGNATURE_INFO,      │
//! │   SIGNATURE, FILENAME, TIMESTAMP,   │
//! │   profile extras, 0x0D padding)     │
//! ├─────────────────────────────────────┤
//! │ Payload (profile-defined)           │
//! └─────────────────────────────────────┘
//! ```
//!
//! All multi-byte integers are big-endian. Framed elements are
//! `tag:u8 | length:u16 | value`, with one exception: PADDING (tag 13)
//! is a bare `0x0D` byte with no length field.
//!
//! This crate contains NO cryptographic operations and NO file I/O.
//! It is purely focused on byte layout: encoding, walking, and the
//! signature splice/extract transforms that keep signed and unsigned
//! envelope images interchangeable.

pub mod binary;
pub mod envelope;
pub mod error;
pub mod records;
pub mod tags;
pub mod tlv;

pub use envelope::{
    AssembledHeader, EncryptionFields, EncryptionSpec, HeaderSpec, HeaderView,
    assemble_header, extract_signature, splice_signature, walk_header,
};
pub use error::TlvError;
pub use records::{RecordFields, RecordView, encode_record, parse_records};
pub use tags::{HashAlgorithm, Role, SignatureModulus};
pub use tlv::{RawElement, decode_next, encode, push_element};
