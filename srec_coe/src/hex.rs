use std::fmt;

const DIGITS_PER_BYTE: usize = 2;

/// Decodes pairs of ASCII hex digits into bytes.
/// Only `0-9` and uppercase `A-F` are accepted, which is all an S-record ever carries.
pub fn hex_string_to_bytes(hex_string: &[u8]) -> Result<Vec<u8>> {
    debug_assert!(
        hex_string.len() % DIGITS_PER_BYTE == 0,
        "hex string must consist of pairs of hex digits"
    );
    let mut bytes = Vec::with_capacity(hex_string.len() / DIGITS_PER_BYTE);
    for (pair_idx, hex_digit_pair) in hex_string.chunks_exact(DIGITS_PER_BYTE).enumerate() {
        let index = pair_idx * DIGITS_PER_BYTE;
        let high_nibble = decode_hex_digit(hex_digit_pair[0]).map_err(|e| e.shifted(index))?;
        let low_nibble = decode_hex_digit(hex_digit_pair[1]).map_err(|e| e.shifted(index + 1))?;
        bytes.push(high_nibble << 4 | low_nibble);
    }
    Ok(bytes)
}

pub fn decode_hex_digit(digit: u8) -> Result<u8> {
    match digit {
        b'0'..=b'9' => Ok(digit - b'0'),
        b'A'..=b'F' => Ok(10 + (digit - b'A')),
        d => Err(InvalidHexDigit { index: 0, digit: d }),
    }
}

/// A digit outside `0-9A-F`, with its index in the decoded string.
#[derive(Debug, PartialEq, Eq)]
pub struct InvalidHexDigit {
    pub index: usize,
    pub digit: u8,
}

impl InvalidHexDigit {
    fn shifted(self, by: usize) -> Self {
        InvalidHexDigit {
            index: self.index + by,
            ..self
        }
    }
}

impl fmt::Display for InvalidHexDigit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid hex digit '{}' at index {}", self.digit as char, self.index)
    }
}

impl std::error::Error for InvalidHexDigit {}

type Result<T> = std::result::Result<T, InvalidHexDigit>;
