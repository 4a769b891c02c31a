//! Envelope schema: header walking, header assembly, signature splicing
//!
//! Every envelope begins with VERSION then HEADER_LENGTH. The value of
//! HEADER_LENGTH is the byte offset at which the payload begins, and it
//! counts the signature's framed bytes even when the signature is absent
//! from the buffer. That rule is what keeps the signed and unsigned
//! images interchangeable: a header is assembled with a recorded hole
//! where the signature belongs, the hole-free buffer is signed, and the
//! framed signature is spliced into the hole. Extraction is the exact
//! inverse and must reproduce the signed image byte for byte.

use crate::binary::{patch_u16_be, read_u16_be, read_u32_be};
use crate::error::TlvError;
use crate::tags::{HashAlgorithm, SignatureModulus, envelope as tag, envelope_tag_name};
use crate::tlv::{decode_next, nul_string, push_element, push_nul_string};
use std::ops::Range;
use tracing::debug;

/// Byte length of a framed signature element minus the signature itself
/// (tag plus u16 length)
const SIGNATURE_FRAMING: usize = 3;

/// Decoded view of an envelope header. Field presence is enforced by the
/// consumer: a verify path demands a signature span, a decrypt path
/// demands encryption fields, a bare strip needs neither.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderView {
    pub version: (u8, u8),
    /// Offset at which the post-header payload begins
    pub header_length: usize,
    pub signer_name: Option<String>,
    pub issuer_name: Option<String>,
    pub signer_serial: Option<Vec<u8>>,
    pub hash_algorithm: Option<HashAlgorithm>,
    /// Framed span of the SIGNATURE element within the buffer
    pub signature_span: Option<Range<usize>>,
    pub filename: Option<String>,
    pub timestamp: Option<u32>,
    pub signer_version: Option<(u8, u8)>,
    pub encryption: Option<EncryptionFields>,
}

impl HeaderView {
    pub fn require_signature_span(&self) -> Result<Range<usize>, TlvError> {
        self.signature_span
            .clone()
            .ok_or(TlvError::MissingField { field: "SIGNATURE" })
    }

    pub fn require_hash_algorithm(&self) -> Result<HashAlgorithm, TlvError> {
        self.hash_algorithm.ok_or(TlvError::MissingField {
            field: "HASH_ALGORITHM",
        })
    }

    pub fn require_signer_serial(&self) -> Result<&[u8], TlvError> {
        self.signer_serial
            .as_deref()
            .ok_or(TlvError::MissingField {
                field: "SERIAL_NUMBER",
            })
    }

    pub fn require_encryption(&self) -> Result<&EncryptionFields, TlvError> {
        self.encryption.as_ref().ok_or(TlvError::MissingField {
            field: "ENCRYPTION_INFO",
        })
    }
}

/// ENC-profile fields recovered from the header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptionFields {
    pub iv: [u8; 16],
    /// Count of 0x0D bytes appended to the plaintext before encryption.
    /// The decoder trusts this count exclusively; it never scans for the
    /// byte value.
    pub padding: u16,
    pub key_size_bits: u16,
    pub key_algorithm: u8,
    pub wrapped_key: Vec<u8>,
    pub hash_algorithm: HashAlgorithm,
    pub hash: Vec<u8>,
}

/// ENC-profile fields supplied when assembling a header
#[derive(Debug, Clone)]
pub struct EncryptionSpec {
    pub iv: [u8; 16],
    pub padding: u16,
    pub key_size_bits: u16,
    pub wrapped_key: Vec<u8>,
    pub hash_algorithm: HashAlgorithm,
    pub hash: Vec<u8>,
}

/// Inputs to [`assemble_header`]
#[derive(Debug, Clone)]
pub struct HeaderSpec {
    pub version: (u8, u8),
    pub signer_name: String,
    pub issuer_name: String,
    pub signer_serial: Vec<u8>,
    pub hash_algorithm: HashAlgorithm,
    pub signature_modulus: SignatureModulus,
    pub filename: Option<String>,
    pub timestamp: Option<u32>,
    pub signer_version: Option<(u8, u8)>,
    pub encryption: Option<EncryptionSpec>,
}

/// Output of [`assemble_header`]: the header bytes without a signature,
/// plus the offsets the binder needs
#[derive(Debug, Clone)]
pub struct AssembledHeader {
    pub bytes: Vec<u8>,
    /// Where the framed signature belongs
    pub signature_insert_offset: usize,
    /// The value back-patched into HEADER_LENGTH; counts the signature
    /// framing that is not yet present in `bytes`
    pub header_length: usize,
}

fn expect_len(field: &'static str, value: &[u8], len: usize) -> Result<(), TlvError> {
    if value.len() != len {
        return Err(TlvError::BadLength {
            field,
            len: value.len(),
        });
    }
    Ok(())
}

/// Accumulates ENC fields as the flat walk encounters them
#[derive(Default)]
struct EncryptionAccum {
    seen: bool,
    iv: Option<[u8; 16]>,
    padding: Option<u16>,
    key_size_bits: Option<u16>,
    key_algorithm: Option<u8>,
    wrapped_key: Option<Vec<u8>>,
    hash_algorithm: Option<HashAlgorithm>,
    hash: Option<Vec<u8>>,
}

impl EncryptionAccum {
    fn finish(self) -> Result<Option<EncryptionFields>, TlvError> {
        if !self.seen {
            return Ok(None);
        }
        Ok(Some(EncryptionFields {
            iv: self.iv.ok_or(TlvError::MissingField {
                field: "ENCRYPTION_IV",
            })?,
            padding: self.padding.ok_or(TlvError::MissingField {
                field: "ENCRYPTION_PADDING",
            })?,
            key_size_bits: self.key_size_bits.ok_or(TlvError::MissingField {
                field: "ENCRYPTION_KEY_SIZE",
            })?,
            key_algorithm: self.key_algorithm.ok_or(TlvError::MissingField {
                field: "ENCRYPTION_KEY_ALGORITHM",
            })?,
            wrapped_key: self.wrapped_key.ok_or(TlvError::MissingField {
                field: "ENCRYPTION_KEY",
            })?,
            hash_algorithm: self.hash_algorithm.ok_or(TlvError::MissingField {
                field: "ENCRYPTION_HASH_ALGORITHM",
            })?,
            hash: self.hash.ok_or(TlvError::MissingField {
                field: "ENCRYPTION_HASH",
            })?,
        }))
    }
}

/// Walk an envelope header, recording spans and field values.
///
/// Asserts that VERSION then HEADER_LENGTH come first, then iterates
/// elements until the header length is reached. Container elements are
/// entered transparently: their nested elements appear as peers in the
/// flat iteration. Each element is traced at debug level as it is
/// decoded, so a structural failure still leaves the partial decode in
/// the log.
pub fn walk_header(buf: &[u8]) -> Result<HeaderView, TlvError> {
    let version_el = decode_next(buf, 0)?;
    if version_el.tag != tag::VERSION {
        return Err(TlvError::BadTag {
            expected: tag::VERSION,
            found: version_el.tag,
            offset: 0,
        });
    }
    expect_len("VERSION", version_el.value, 2)?;
    let version = (version_el.value[0], version_el.value[1]);

    let hl_el = decode_next(buf, version_el.next_offset)?;
    if hl_el.tag != tag::HEADER_LENGTH {
        return Err(TlvError::BadTag {
            expected: tag::HEADER_LENGTH,
            found: hl_el.tag,
            offset: version_el.next_offset,
        });
    }
    expect_len("HEADER_LENGTH", hl_el.value, 2)?;
    let header_length = usize::from(u16::from_be_bytes([hl_el.value[0], hl_el.value[1]]));
    if header_length > buf.len() {
        return Err(TlvError::Truncated { offset: buf.len() });
    }
    debug!(version.major = version.0, version.minor = version.1, header_length, "envelope prelude");

    let mut view = HeaderView {
        version,
        header_length,
        ..HeaderView::default()
    };
    let mut enc = EncryptionAccum::default();

    let mut offset = hl_el.next_offset;
    while offset < header_length {
        let el = decode_next(buf, offset)?;
        debug!(
            offset = el.start,
            tag = el.tag,
            name = envelope_tag_name(el.tag),
            len = el.value.len(),
            "header element"
        );
        match el.tag {
            tag::PADDING => {}
            // Containers frame nested elements; descend transparently.
            tag::SIGNER_INFO | tag::SIGNATURE_INFO | tag::SIGNATURE_ALGORITHM_INFO => {
                offset = el.value_offset;
                continue;
            }
            tag::ENCRYPTION_INFO | tag::ENCRYPTION_IV_INFO | tag::ENCRYPTION_KEY_INFO => {
                enc.seen = true;
                offset = el.value_offset;
                continue;
            }
            tag::SIGNER_NAME => view.signer_name = Some(nul_string(el.value)),
            tag::ISSUER_NAME => view.issuer_name = Some(nul_string(el.value)),
            tag::SERIAL_NUMBER => view.signer_serial = Some(el.value.to_vec()),
            tag::HASH_ALGORITHM => {
                expect_len("HASH_ALGORITHM", el.value, 1)?;
                view.hash_algorithm = Some(HashAlgorithm::from_wire(el.value[0])?);
            }
            // Read and ignored during parse; the scheme is fixed and the
            // signature length is evident from the SIGNATURE element.
            tag::SIGNATURE_ALGORITHM | tag::SIGNATURE_MODULUS => {
                expect_len("SIGNATURE_ALGORITHM", el.value, 1)?;
            }
            tag::SIGNATURE => {
                if el.next_offset > header_length {
                    return Err(TlvError::SignatureOutsideHeader { offset: el.start });
                }
                view.signature_span = Some(el.start..el.next_offset);
            }
            tag::FILENAME => view.filename = Some(nul_string(el.value)),
            tag::TIMESTAMP => {
                expect_len("TIMESTAMP", el.value, 4)?;
                view.timestamp = Some(read_u32_be(buf, el.value_offset)?);
            }
            tag::SIGNER_VERSION => {
                expect_len("SIGNER_VERSION", el.value, 2)?;
                view.signer_version = Some((el.value[0], el.value[1]));
            }
            tag::ENCRYPTION_UNKNOWN1 | tag::ENCRYPTION_UNKNOWN2 => {
                expect_len("ENCRYPTION_UNKNOWN", el.value, 1)?;
            }
            tag::ENCRYPTION_IV => {
                expect_len("ENCRYPTION_IV", el.value, 16)?;
                let mut iv = [0u8; 16];
                iv.copy_from_slice(el.value);
                enc.iv = Some(iv);
            }
            tag::ENCRYPTION_PADDING => {
                expect_len("ENCRYPTION_PADDING", el.value, 2)?;
                enc.padding = Some(read_u16_be(buf, el.value_offset)?);
            }
            tag::ENCRYPTION_KEY_SIZE => {
                expect_len("ENCRYPTION_KEY_SIZE", el.value, 2)?;
                enc.key_size_bits = Some(read_u16_be(buf, el.value_offset)?);
            }
            tag::ENCRYPTION_KEY_ALGORITHM => {
                expect_len("ENCRYPTION_KEY_ALGORITHM", el.value, 1)?;
                enc.key_algorithm = Some(el.value[0]);
            }
            tag::ENCRYPTION_KEY => enc.wrapped_key = Some(el.value.to_vec()),
            tag::ENCRYPTION_HASH_ALGORITHM => {
                expect_len("ENCRYPTION_HASH_ALGORITHM", el.value, 1)?;
                enc.hash_algorithm = Some(HashAlgorithm::from_wire(el.value[0])?);
            }
            tag::ENCRYPTION_HASH => enc.hash = Some(el.value.to_vec()),
            other => {
                return Err(TlvError::UnknownTag {
                    tag: other,
                    offset: el.start,
                });
            }
        }
        offset = el.next_offset;
    }
    if offset != header_length {
        return Err(TlvError::Truncated {
            offset: header_length,
        });
    }

    view.encryption = enc.finish()?;
    Ok(view)
}

/// Assemble a header, leaving a recorded hole where the signature will
/// be spliced.
///
/// Emits every header element except SIGNATURE, pads with bare 0x0D
/// bytes until the eventual header length is a multiple of 4, then
/// back-patches HEADER_LENGTH with the length the header will have once
/// the framed signature is present.
pub fn assemble_header(spec: &HeaderSpec) -> Result<AssembledHeader, TlvError> {
    let sig_len = spec.signature_modulus.signature_len();
    let mut out = Vec::new();

    push_element(&mut out, tag::VERSION, &[spec.version.0, spec.version.1])?;
    let header_length_slot = out.len() + 3;
    push_element(&mut out, tag::HEADER_LENGTH, &[0, 0])?;

    if let Some((major, minor)) = spec.signer_version {
        push_element(&mut out, tag::SIGNER_VERSION, &[major, minor])?;
    }

    let mut signer_info = Vec::new();
    push_nul_string(&mut signer_info, tag::SIGNER_NAME, &spec.signer_name)?;
    push_nul_string(&mut signer_info, tag::ISSUER_NAME, &spec.issuer_name)?;
    push_element(&mut signer_info, tag::SERIAL_NUMBER, &spec.signer_serial)?;
    push_element(&mut out, tag::SIGNER_INFO, &signer_info)?;

    let mut algorithm_info = Vec::new();
    push_element(&mut algorithm_info, tag::SIGNATURE_ALGORITHM, &[0])?;
    push_element(
        &mut algorithm_info,
        tag::SIGNATURE_MODULUS,
        &[spec.signature_modulus.to_wire()],
    )?;
    let mut signature_info = Vec::new();
    push_element(
        &mut signature_info,
        tag::HASH_ALGORITHM,
        &[spec.hash_algorithm.to_wire()],
    )?;
    push_element(
        &mut signature_info,
        tag::SIGNATURE_ALGORITHM_INFO,
        &algorithm_info,
    )?;
    push_element(&mut out, tag::SIGNATURE_INFO, &signature_info)?;

    // The signature lives after SIGNATURE_INFO and before FILENAME.
    let signature_insert_offset = out.len();

    if let Some(filename) = &spec.filename {
        push_nul_string(&mut out, tag::FILENAME, filename)?;
    }
    if let Some(ts) = spec.timestamp {
        push_element(&mut out, tag::TIMESTAMP, &ts.to_be_bytes())?;
    }

    if let Some(enc) = &spec.encryption {
        let mut iv_info = Vec::new();
        push_element(&mut iv_info, tag::ENCRYPTION_UNKNOWN1, &[0])?;
        push_element(&mut iv_info, tag::ENCRYPTION_IV, &enc.iv)?;
        push_element(&mut iv_info, tag::ENCRYPTION_PADDING, &enc.padding.to_be_bytes())?;

        let mut key_info = Vec::new();
        push_element(&mut key_info, tag::ENCRYPTION_UNKNOWN2, &[0])?;
        push_element(
            &mut key_info,
            tag::ENCRYPTION_KEY_SIZE,
            &enc.key_size_bits.to_be_bytes(),
        )?;
        push_element(&mut key_info, tag::ENCRYPTION_KEY_ALGORITHM, &[1])?;
        push_element(&mut key_info, tag::ENCRYPTION_KEY, &enc.wrapped_key)?;

        let mut encryption_info = Vec::new();
        push_element(&mut encryption_info, tag::ENCRYPTION_IV_INFO, &iv_info)?;
        push_element(&mut encryption_info, tag::ENCRYPTION_KEY_INFO, &key_info)?;
        push_element(&mut out, tag::ENCRYPTION_INFO, &encryption_info)?;

        push_element(
            &mut out,
            tag::ENCRYPTION_HASH_ALGORITHM,
            &[enc.hash_algorithm.to_wire()],
        )?;
        push_element(&mut out, tag::ENCRYPTION_HASH, &enc.hash)?;
    }

    while (out.len() + SIGNATURE_FRAMING + sig_len) % 4 != 0 {
        out.push(tag::PADDING);
    }

    let header_length = out.len() + SIGNATURE_FRAMING + sig_len;
    if header_length > usize::from(u16::MAX) {
        return Err(TlvError::LengthOverflow { len: header_length });
    }
    patch_u16_be(&mut out, header_length_slot, header_length as u16);

    Ok(AssembledHeader {
        bytes: out,
        signature_insert_offset,
        header_length,
    })
}

/// Splice a framed signature into the hole recorded at assembly time.
/// The result is the file image written to disk.
pub fn splice_signature(
    unsigned: &[u8],
    signature: &[u8],
    insert_offset: usize,
) -> Result<Vec<u8>, TlvError> {
    if insert_offset > unsigned.len() {
        return Err(TlvError::Truncated {
            offset: insert_offset,
        });
    }
    let mut out = Vec::with_capacity(unsigned.len() + SIGNATURE_FRAMING + signature.len());
    out.extend_from_slice(&unsigned[..insert_offset]);
    push_element(&mut out, tag::SIGNATURE, signature)?;
    out.extend_from_slice(&unsigned[insert_offset..]);
    Ok(out)
}

/// Split a signed file into the signature and the byte image that was
/// signed. Must be the exact inverse of [`splice_signature`], or
/// verification fails.
pub fn extract_signature(
    file: &[u8],
    signature_span: &Range<usize>,
) -> Result<(Vec<u8>, Vec<u8>), TlvError> {
    if signature_span.end > file.len() || signature_span.len() < SIGNATURE_FRAMING {
        return Err(TlvError::Truncated {
            offset: signature_span.start,
        });
    }
    let signature = file[signature_span.start + SIGNATURE_FRAMING..signature_span.end].to_vec();
    let mut unsigned = Vec::with_capacity(file.len() - signature_span.len());
    unsigned.extend_from_slice(&file[..signature_span.start]);
    unsigned.extend_from_slice(&file[signature_span.end..]);
    Ok((unsigned, signature))
}
