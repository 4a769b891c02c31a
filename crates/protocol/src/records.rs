//! Certificate-record layout for trust-list payloads
//!
//! A trust-list payload is a concatenation of records. Each record opens
//! with `RECORD_LENGTH` framing that carries the total record length in
//! its own length field (`tag:u8 | total:u16`, no value bytes), followed
//! by ordinary TLV elements in the record tag namespace.

use crate::binary::{patch_u16_be, put_u16_be, read_u16_be, read_u8};
use crate::error::TlvError;
use crate::tags::{Role, record as tag};
use crate::tlv::{decode_next, nul_string, push_element, push_nul_string};
use tracing::debug;

/// Inputs for one encoded record
#[derive(Debug, Clone)]
pub struct RecordFields {
    pub subject: String,
    pub issuer: String,
    pub serial: Vec<u8>,
    pub role: Role,
    /// RSA PKCS#1 DER or EC X9.62 uncompressed point
    pub public_key: Vec<u8>,
    /// The certificate's own DER signature, copied verbatim
    pub signature: Vec<u8>,
    /// Full X.509 DER
    pub certificate: Vec<u8>,
}

/// One decoded record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordView {
    pub subject: String,
    pub issuer: String,
    pub serial: Vec<u8>,
    pub role: Role,
    pub public_key: Vec<u8>,
    pub signature: Vec<u8>,
    pub certificate: Vec<u8>,
    /// Recognized on parse, never emitted
    pub ip_address: Option<Vec<u8>>,
    /// Recognized on parse, never emitted
    pub cert_hash: Option<Vec<u8>>,
    /// Recognized on parse, never emitted
    pub cert_hash_algorithm: Option<u8>,
}

/// Encode one record, back-patching the total length once the fields
/// are in place.
pub fn encode_record(fields: &RecordFields) -> Result<Vec<u8>, TlvError> {
    let mut out = Vec::new();
    out.push(tag::RECORD_LENGTH);
    put_u16_be(&mut out, 0);

    push_nul_string(&mut out, tag::SUBJECT_NAME, &fields.subject)?;
    push_nul_string(&mut out, tag::ISSUER_NAME, &fields.issuer)?;
    push_element(&mut out, tag::SERIAL_NUMBER, &fields.serial)?;
    push_element(&mut out, tag::ROLE, &fields.role.to_wire().to_be_bytes())?;
    push_element(&mut out, tag::PUBLIC_KEY, &fields.public_key)?;
    push_element(&mut out, tag::SIGNATURE, &fields.signature)?;
    push_element(&mut out, tag::CERTIFICATE, &fields.certificate)?;

    if out.len() > usize::from(u16::MAX) {
        return Err(TlvError::LengthOverflow { len: out.len() });
    }
    let total = out.len() as u16;
    patch_u16_be(&mut out, 1, total);
    Ok(out)
}

#[derive(Default)]
struct PartialRecord {
    subject: Option<String>,
    issuer: Option<String>,
    serial: Option<Vec<u8>>,
    role: Option<Role>,
    public_key: Option<Vec<u8>>,
    signature: Option<Vec<u8>>,
    certificate: Option<Vec<u8>>,
    ip_address: Option<Vec<u8>>,
    cert_hash: Option<Vec<u8>>,
    cert_hash_algorithm: Option<u8>,
}

impl PartialRecord {
    fn finish(self) -> Result<RecordView, TlvError> {
        Ok(RecordView {
            subject: self.subject.ok_or(TlvError::MissingField {
                field: "SUBJECT_NAME",
            })?,
            issuer: self.issuer.ok_or(TlvError::MissingField {
                field: "ISSUER_NAME",
            })?,
            serial: self.serial.ok_or(TlvError::MissingField {
                field: "SERIAL_NUMBER",
            })?,
            role: self.role.ok_or(TlvError::MissingField { field: "ROLE" })?,
            public_key: self.public_key.ok_or(TlvError::MissingField {
                field: "PUBLIC_KEY",
            })?,
            signature: self.signature.ok_or(TlvError::MissingField {
                field: "SIGNATURE",
            })?,
            certificate: self.certificate.ok_or(TlvError::MissingField {
                field: "CERTIFICATE",
            })?,
            ip_address: self.ip_address,
            cert_hash: self.cert_hash,
            cert_hash_algorithm: self.cert_hash_algorithm,
        })
    }
}

/// Parse a concatenation of records covering the whole of `payload`.
///
/// Each record is traced at debug level as it is decoded, so partial
/// output is available when a later record is malformed.
pub fn parse_records(payload: &[u8]) -> Result<Vec<RecordView>, TlvError> {
    let mut records = Vec::new();
    let mut offset = 0;
    while offset < payload.len() {
        let opener = read_u8(payload, offset)?;
        if opener != tag::RECORD_LENGTH {
            return Err(TlvError::BadTag {
                expected: tag::RECORD_LENGTH,
                found: opener,
                offset,
            });
        }
        let total = usize::from(read_u16_be(payload, offset + 1)?);
        let record_end = offset + total;
        if total < 3 || record_end > payload.len() {
            return Err(TlvError::Truncated { offset });
        }

        let record = parse_one(payload, offset + 3, record_end)?;
        debug!(
            index = records.len(),
            subject = %record.subject,
            role = %record.role,
            "trust-list record"
        );
        records.push(record);
        offset = record_end;
    }
    Ok(records)
}

fn parse_one(payload: &[u8], start: usize, end: usize) -> Result<RecordView, TlvError> {
    let mut partial = PartialRecord::default();

    let mut offset = start;
    while offset < end {
        let el = decode_next(payload, offset)?;
        if el.next_offset > end {
            return Err(TlvError::Truncated { offset });
        }
        match el.tag {
            tag::SUBJECT_NAME => partial.subject = Some(nul_string(el.value)),
            tag::ISSUER_NAME => partial.issuer = Some(nul_string(el.value)),
            tag::SERIAL_NUMBER => partial.serial = Some(el.value.to_vec()),
            tag::ROLE => {
                if el.value.len() != 2 {
                    return Err(TlvError::BadLength {
                        field: "ROLE",
                        len: el.value.len(),
                    });
                }
                let code = u16::from_be_bytes([el.value[0], el.value[1]]);
                partial.role = Some(Role::from_wire(code));
            }
            tag::PUBLIC_KEY => partial.public_key = Some(el.value.to_vec()),
            tag::SIGNATURE => partial.signature = Some(el.value.to_vec()),
            tag::CERTIFICATE => partial.certificate = Some(el.value.to_vec()),
            tag::IP_ADDRESS => partial.ip_address = Some(el.value.to_vec()),
            tag::CERT_HASH => partial.cert_hash = Some(el.value.to_vec()),
            tag::HASH_ALGORITHM => {
                if el.value.len() != 1 {
                    return Err(TlvError::BadLength {
                        field: "HASH_ALGORITHM",
                        len: el.value.len(),
                    });
                }
                partial.cert_hash_algorithm = Some(el.value[0]);
            }
            other => {
                return Err(TlvError::UnknownTag {
                    tag: other,
                    offset: el.start,
                });
            }
        }
        offset = el.next_offset;
    }
    partial.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_fields(role: Role, serial: &[u8]) -> RecordFields {
        RecordFields {
            subject: "CN=device-ca,O=lab".to_string(),
            issuer: "CN=root,O=lab".to_string(),
            serial: serial.to_vec(),
            role,
            public_key: vec![0x30, 0x82, 0x01, 0x0A],
            signature: vec![0x9C; 256],
            certificate: vec![0x30, 0x82, 0x02, 0x00, 0xAA, 0xBB],
        }
    }

    #[test]
    fn test_record_length_framing() {
        let encoded = encode_record(&sample_fields(Role::SigningAuthority, &[0x42])).unwrap();
        assert_eq!(encoded[0], tag::RECORD_LENGTH);
        let total = u16::from_be_bytes([encoded[1], encoded[2]]);
        assert_eq!(usize::from(total), encoded.len());
    }

    #[test]
    fn test_encode_parse_roundtrip() {
        let sast = sample_fields(Role::SigningAuthority, &[0x42]);
        let ccm = sample_fields(Role::CallManager, &[0x01, 0xFE]);
        let mut payload = encode_record(&sast).unwrap();
        payload.extend(encode_record(&ccm).unwrap());

        let records = parse_records(&payload).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].role, Role::SigningAuthority);
        assert_eq!(records[0].serial, vec![0x42]);
        assert_eq!(records[0].subject, "CN=device-ca,O=lab");
        assert_eq!(records[1].role, Role::CallManager);
        assert_eq!(records[1].serial, vec![0x01, 0xFE]);
        assert_eq!(records[1].certificate, ccm.certificate);
        assert!(records[0].ip_address.is_none());
    }

    #[test]
    fn test_missing_mandatory_field() {
        // A record holding only a subject.
        let mut body = Vec::new();
        push_nul_string(&mut body, tag::SUBJECT_NAME, "CN=x").unwrap();
        let mut record = vec![tag::RECORD_LENGTH];
        put_u16_be(&mut record, (body.len() + 3) as u16);
        record.extend(body);

        match parse_records(&record) {
            Err(TlvError::MissingField { field }) => assert_eq!(field, "ISSUER_NAME"),
            other => panic!("expected MissingField, got {other:?}"),
        }
    }

    #[test]
    fn test_bad_record_opener() {
        let buf = [0x09, 0x00, 0x05, 0x00, 0x00];
        match parse_records(&buf) {
            Err(TlvError::BadTag {
                expected, found, ..
            }) => {
                assert_eq!(expected, tag::RECORD_LENGTH);
                assert_eq!(found, 0x09);
            }
            other => panic!("expected BadTag, got {other:?}"),
        }
    }

    #[test]
    fn test_record_length_past_payload() {
        let buf = [tag::RECORD_LENGTH, 0x00, 0x20, 0x00];
        assert_eq!(
            parse_records(&buf),
            Err(TlvError::Truncated { offset: 0 })
        );
    }

    #[test]
    fn test_recognized_but_unemitted_tags_parse() {
        let fields = sample_fields(Role::FileServer, &[0x05]);
        let mut encoded = encode_record(&fields).unwrap();
        // Append IP_ADDRESS + CERT_HASH + HASH_ALGORITHM inside the record.
        let mut extra = Vec::new();
        push_element(&mut extra, tag::IP_ADDRESS, &[10, 0, 0, 1]).unwrap();
        push_element(&mut extra, tag::CERT_HASH, &[0xAB; 20]).unwrap();
        push_element(&mut extra, tag::HASH_ALGORITHM, &[1]).unwrap();
        encoded.extend_from_slice(&extra);
        let total = encoded.len() as u16;
        encoded[1..3].copy_from_slice(&total.to_be_bytes());

        let records = parse_records(&encoded).unwrap();
        assert_eq!(records[0].ip_address.as_deref(), Some(&[10, 0, 0, 1][..]));
        assert_eq!(records[0].cert_hash.as_deref(), Some(&[0xAB; 20][..]));
        assert_eq!(records[0].cert_hash_algorithm, Some(1));
    }
}
