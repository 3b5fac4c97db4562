use std::io;
use std::ops::Range;

use bytes::Buf;
use thiserror::Error;

use crate::common::{Header, RecordKind};
use crate::hex::{self, InvalidHexDigit};

const TYPE_OFFSET: usize = 1;
const BYTE_COUNT_FIELD: Range<usize> = 2..4;
const ADDRESS_FIELD: Range<usize> = 4..8;
const HEADER_LEN: usize = 8;
const PAYLOAD_OFFSET: usize = HEADER_LEN;

/// The length field counts the two address bytes and the checksum byte too.
const ADDRESS_AND_CHECKSUM_BYTES: u8 = 3;

/// Decodes the fixed-width header of an `S1` or `S9` record.
///
/// For `S9` records the length field is not decoded and the byte count is always 0.
pub fn parse_header(line: impl AsRef<[u8]>) -> RecordResult<Header> {
    let header = fixed_width(line.as_ref(), HEADER_LEN)?;

    let kind_val = hex::decode_hex_digit(header[TYPE_OFFSET])
        .map_err(|e| invalid_hex_error(TYPE_OFFSET, e))?;
    let kind = RecordKind::from_int(kind_val).ok_or(RecordError::UnsupportedRecordType(kind_val))?;

    let byte_count = match kind {
        RecordKind::Data => {
            let len = decode_field(header, BYTE_COUNT_FIELD)?.as_slice().get_u8();
            len.checked_sub(ADDRESS_AND_CHECKSUM_BYTES)
                .ok_or(RecordError::ByteCountTooSmall(len))?
        }
        RecordKind::StartAddress => 0,
    };
    let addr = decode_field(header, ADDRESS_FIELD)?.as_slice().get_u16();

    Ok(Header {
        kind,
        byte_count,
        addr,
    })
}

/// Decodes `byte_count` payload bytes following the header.
/// Pair `i` occupies line characters `8 + 2*i` and `8 + 2*i + 1`; the checksum is left alone.
pub fn decode_payload(line: impl AsRef<[u8]>, byte_count: u8) -> RecordResult<Vec<u8>> {
    let end = PAYLOAD_OFFSET + byte_count as usize * 2;
    let record = fixed_width(line.as_ref(), end)?;
    decode_field(record, PAYLOAD_OFFSET..end)
}

fn fixed_width(line: &[u8], expected: usize) -> RecordResult<&[u8]> {
    line.get(..expected).ok_or(RecordError::TruncatedLine {
        expected,
        actual: line.len(),
    })
}

fn decode_field(line: &[u8], field: Range<usize>) -> RecordResult<Vec<u8>> {
    let offset = field.start;
    hex::hex_string_to_bytes(&line[field]).map_err(|e| invalid_hex_error(offset, e))
}

fn invalid_hex_error(field_offset: usize, error: InvalidHexDigit) -> RecordError {
    RecordError::InvalidHexCharacter {
        offset: field_offset + error.index,
        byte: error.digit,
    }
}

fn describe_byte(byte: &u8) -> String {
    if byte.is_ascii_graphic() {
        format!("{:?}", *byte as char)
    } else {
        format!("{byte:#04x}")
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("malformed record on line {line_no}: {kind}")]
    MalformedRecord { line_no: usize, kind: RecordError },
}

impl Error {
    pub(crate) fn malformed(line_no: usize, kind: RecordError) -> Self {
        Error::MalformedRecord { line_no, kind }
    }
}

/// Why a single record line could not be decoded. `offset` is a 0-based byte index into the line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("invalid hex character {} at offset {offset}", describe_byte(.byte))]
    InvalidHexCharacter { offset: usize, byte: u8 },
    #[error("unsupported record type S{0:X}")]
    UnsupportedRecordType(u8),
    #[error("line truncated: expected at least {expected} bytes, found {actual}")]
    TruncatedLine { expected: usize, actual: usize },
    #[error("byte count {0:#04x} does not cover the address and checksum")]
    ByteCountTooSmall(u8),
}

pub type RecordResult<T> = std::result::Result<T, RecordError>;

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod test {
    use super::*;

    fn synthetic_header(byte_count: u8, addr: u16) -> String {
        format!("S1{:02X}{:04X}", byte_count + ADDRESS_AND_CHECKSUM_BYTES, addr)
    }

    #[test]
    fn data_record_header() {
        let header = parse_header("S1040000DEAD24").expect("parse failed");
        assert_eq!(header.kind, RecordKind::Data);
        assert_eq!(header.byte_count, 1);
        assert_eq!(header.addr, 0x0000);
    }

    #[test]
    fn address_is_big_endian() {
        let header = parse_header("S1051234AABB00").expect("parse failed");
        assert_eq!(header.byte_count, 2);
        assert_eq!(header.addr, 0x1234);
    }

    #[test]
    fn start_address_header() {
        let header = parse_header("S9030100FB").expect("parse failed");
        assert_eq!(header.kind, RecordKind::StartAddress);
        assert_eq!(header.byte_count, 0);
        assert_eq!(header.addr, 0x0100);
    }

    #[test]
    fn start_address_length_field_is_not_decoded() {
        let header = parse_header("S9ZZ0100FB").expect("parse failed");
        assert_eq!(header.addr, 0x0100);
    }

    #[test]
    fn header_round_trip() {
        for &(byte_count, addr) in &[(0u8, 0u16), (1, 0x0001), (16, 0x8000), (32, 0xFFFF), (252, 0xABCD)] {
            let header = parse_header(&synthetic_header(byte_count, addr)).expect("parse failed");
            assert_eq!(header.byte_count, byte_count);
            assert_eq!(header.addr, addr);
        }
    }

    #[test]
    fn unsupported_record_type() {
        assert_eq!(
            parse_header("S2080000000102030405"),
            Err(RecordError::UnsupportedRecordType(2))
        );
        assert_eq!(
            parse_header("S0030000FC"),
            Err(RecordError::UnsupportedRecordType(0))
        );
    }

    #[test]
    fn invalid_type_character() {
        assert_eq!(
            parse_header("SX030000FC"),
            Err(RecordError::InvalidHexCharacter {
                offset: 1,
                byte: b'X'
            })
        );
    }

    #[test]
    fn invalid_address_character() {
        assert_eq!(
            parse_header("S10400G0DE1D"),
            Err(RecordError::InvalidHexCharacter {
                offset: 6,
                byte: b'G'
            })
        );
    }

    #[test]
    fn lowercase_is_invalid() {
        assert_eq!(
            parse_header("S1040a00DE1D"),
            Err(RecordError::InvalidHexCharacter {
                offset: 5,
                byte: b'a'
            })
        );
    }

    #[test]
    fn truncated_header() {
        assert_eq!(
            parse_header("S10400"),
            Err(RecordError::TruncatedLine {
                expected: 8,
                actual: 6
            })
        );
        assert_eq!(
            parse_header(""),
            Err(RecordError::TruncatedLine {
                expected: 8,
                actual: 0
            })
        );
    }

    #[test]
    fn byte_count_too_small() {
        assert_eq!(
            parse_header("S1020000FD"),
            Err(RecordError::ByteCountTooSmall(2))
        );
    }

    #[test]
    fn decodes_payload_without_checksum() {
        assert_eq!(decode_payload("S1040000DEAD24", 1), Ok(vec![0xDE]));
        assert_eq!(
            decode_payload("S1070010CAFEBABE00", 4),
            Ok(vec![0xCA, 0xFE, 0xBA, 0xBE])
        );
    }

    #[test]
    fn empty_payload() {
        assert_eq!(decode_payload("S1030000AA54", 0), Ok(vec![]));
    }

    #[test]
    fn truncated_payload() {
        assert_eq!(
            decode_payload("S1060000DEAD", 3),
            Err(RecordError::TruncatedLine {
                expected: 14,
                actual: 12
            })
        );
    }

    #[test]
    fn invalid_payload_character() {
        assert_eq!(
            decode_payload("S1050000DEA?00", 2),
            Err(RecordError::InvalidHexCharacter {
                offset: 11,
                byte: b'?'
            })
        );
    }

    #[test]
    fn non_ascii_byte_is_reported_as_is() {
        assert_eq!(
            decode_payload(b"S1040000\xE9E00", 1),
            Err(RecordError::InvalidHexCharacter {
                offset: 8,
                byte: 0xE9
            })
        );
        assert_eq!(
            decode_payload("S1040000\u{e9}00", 1),
            Err(RecordError::InvalidHexCharacter {
                offset: 8,
                byte: 0xC3
            })
        );
    }

    #[test]
    fn invalid_hex_message() {
        let printable = RecordError::InvalidHexCharacter { offset: 6, byte: b'G' };
        assert_eq!(printable.to_string(), "invalid hex character 'G' at offset 6");
        let raw = RecordError::InvalidHexCharacter { offset: 8, byte: 0xE9 };
        assert_eq!(raw.to_string(), "invalid hex character 0xe9 at offset 8");
    }

    #[test]
    fn malformed_record_message() {
        let error = Error::malformed(3, RecordError::UnsupportedRecordType(5));
        assert_eq!(
            error.to_string(),
            "malformed record on line 3: unsupported record type S5"
        );
    }
}
