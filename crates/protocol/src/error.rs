//! Structural errors raised while encoding or walking TLV buffers

use thiserror::Error;

/// Errors from the TLV codec, the envelope schema, and the record layout
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TlvError {
    /// The walk ran past the end of the buffer
    #[error("buffer truncated at offset {offset}")]
    Truncated { offset: usize },

    /// A specific tag was required at this position
    #[error("expected tag {expected} at offset {offset}, found tag {found}")]
    BadTag {
        expected: u8,
        found: u8,
        offset: usize,
    },

    /// A tag outside the schema was encountered
    #[error("unknown tag {tag} at offset {offset}")]
    UnknownTag { tag: u8, offset: usize },

    /// A framed value exceeds the u16 length field
    #[error("value of {len} bytes exceeds the 65535-byte framing limit")]
    LengthOverflow { len: usize },

    /// A hash or signature-modulus code outside the supported set
    #[error("unsupported algorithm code {code}")]
    UnsupportedAlgorithm { code: u8 },

    /// A mandatory header or record field was absent
    #[error("missing mandatory field {field}")]
    MissingField { field: &'static str },

    /// A fixed-layout field carried the wrong number of bytes
    #[error("field {field} has invalid length {len}")]
    BadLength { field: &'static str, len: usize },

    /// The SIGNATURE element must live entirely inside the header
    #[error("signature element at offset {offset} extends past the header boundary")]
    SignatureOutsideHeader { offset: usize },
}
