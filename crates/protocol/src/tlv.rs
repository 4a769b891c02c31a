//! The tag-length-value codec
//!
//! Framed elements are `tag:u8 | length:u16 BE | value`. PADDING
//! (tag 13) breaks the regularity: it is a single bare byte, so the
//! decoder must switch on the tag before reading a length.

use crate::binary::{put_u16_be, read_u16_be, read_u8};
use crate::error::TlvError;
use crate::tags::envelope::PADDING;

/// One decoded element and the offsets around it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawElement<'a> {
    pub tag: u8,
    /// Offset of the tag byte
    pub start: usize,
    /// Offset of the first value byte
    pub value_offset: usize,
    pub value: &'a [u8],
    /// Offset of the next element
    pub next_offset: usize,
}

/// Encode one framed element. PADDING encodes as the bare byte 13.
pub fn encode(tag: u8, value: &[u8]) -> Result<Vec<u8>, TlvError> {
    let mut out = Vec::with_capacity(3 + value.len());
    push_element(&mut out, tag, value)?;
    Ok(out)
}

/// Append one framed element to `out`. PADDING appends the bare byte 13.
pub fn push_element(out: &mut Vec<u8>, tag: u8, value: &[u8]) -> Result<(), TlvError> {
    if tag == PADDING {
        out.push(PADDING);
        return Ok(());
    }
    if value.len() > usize::from(u16::MAX) {
        return Err(TlvError::LengthOverflow { len: value.len() });
    }
    out.push(tag);
    put_u16_be(out, value.len() as u16);
    out.extend_from_slice(value);
    Ok(())
}

/// Append a NUL-terminated UTF-8 string element; the framed length
/// includes the NUL.
pub(crate) fn push_nul_string(out: &mut Vec<u8>, tag: u8, s: &str) -> Result<(), TlvError> {
    let mut value = Vec::with_capacity(s.len() + 1);
    value.extend_from_slice(s.as_bytes());
    value.push(0);
    push_element(out, tag, &value)
}

/// Decode a NUL-terminated UTF-8 string value, tolerating a missing NUL
pub(crate) fn nul_string(value: &[u8]) -> String {
    let trimmed = value.strip_suffix(&[0u8]).unwrap_or(value);
    String::from_utf8_lossy(trimmed).into_owned()
}

/// Decode the element starting at `offset`.
///
/// For PADDING the element is zero-length and `next_offset` is
/// `offset + 1`; no length field is read.
pub fn decode_next(buf: &[u8], offset: usize) -> Result<RawElement<'_>, TlvError> {
    let tag = read_u8(buf, offset)?;
    if tag == PADDING {
        return Ok(RawElement {
            tag,
            start: offset,
            value_offset: offset + 1,
            value: &[],
            next_offset: offset + 1,
        });
    }
    let len = usize::from(read_u16_be(buf, offset + 1)?);
    let value_offset = offset + 3;
    let value = buf
        .get(value_offset..value_offset + len)
        .ok_or(TlvError::Truncated { offset: value_offset })?;
    Ok(RawElement {
        tag,
        start: offset,
        value_offset,
        value,
        next_offset: value_offset + len,
    })
}
