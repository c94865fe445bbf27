//! ASCIIHexDecode filter.
//!
//! PDF Spec: ISO 32000-1:2008, Section 7.4.2. Whitespace is ignored,
//! `>` marks end of data, and a trailing odd digit is padded with zero.

use crate::error::{Error, Result};

/// Decode ASCII-hex stream data.
pub fn decode(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(data.len() / 2);
    let mut high: Option<u8> = None;

    for &byte in data {
        let digit = match byte {
            b'0'..=b'9' => byte - b'0',
            b'a'..=b'f' => byte - b'a' + 10,
            b'A'..=b'F' => byte - b'A' + 10,
            b'>' => break,
            0x00 | 0x09 | 0x0A | 0x0C | 0x0D | 0x20 => continue,
            other => {
                return Err(Error::Decode(format!(
                    "invalid ASCIIHexDecode byte 0x{:02X}",
                    other
                )));
            },
        };

        match high.take() {
            Some(h) => out.push((h << 4) | digit),
            None => high = Some(digit),
        }
    }

    // Odd digit count: final digit is the high nibble, low nibble zero.
    if let Some(h) = high {
        out.push(h << 4);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_simple() {
        assert_eq!(decode(b"48656C6C6F>").unwrap(), b"Hello");
    }

    #[test]
    fn test_decode_with_whitespace() {
        assert_eq!(decode(b"48 65 6C\n6C 6F>").unwrap(), b"Hello");
    }

    #[test]
    fn test_decode_odd_digit_padded() {
        assert_eq!(decode(b"7>").unwrap(), vec![0x70]);
    }

    #[test]
    fn test_decode_without_eod_marker() {
        assert_eq!(decode(b"4142").unwrap(), b"AB");
    }

    #[test]
    fn test_decode_invalid_byte() {
        assert!(decode(b"4G>").is_err());
    }
}
