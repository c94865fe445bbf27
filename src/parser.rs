//! PDF object parser.
//!
//! Combines lexer tokens into complete objects using recursive descent:
//! read a token, decide how to parse from its type, and for composite
//! types (arrays, dictionaries) recurse into the contents. Parsing
//! functions return `IResult` from nom, like the lexer they sit on.

use crate::error::{Error, Result};
use crate::lexer::{self, Token, token};
use crate::object::{Object, ObjectRef};
use nom::error::{Error as NomError, ErrorKind};
use nom::IResult;
use std::collections::HashMap;

/// Decode escape sequences in PDF literal strings.
///
/// Per ISO 32000-1:2008, Section 7.3.4.2: `\n \r \t \b \f \( \) \\`,
/// octal `\ddd` (1-3 digits), and `\<newline>` line continuations.
pub fn decode_literal_string_escapes(raw: &[u8]) -> Vec<u8> {
    let mut result = Vec::with_capacity(raw.len());
    let mut i = 0;

    while i < raw.len() {
        if raw[i] == b'\\' && i + 1 < raw.len() {
            match raw[i + 1] {
                b'n' => {
                    result.push(b'\n');
                    i += 2;
                },
                b'r' => {
                    result.push(b'\r');
                    i += 2;
                },
                b't' => {
                    result.push(b'\t');
                    i += 2;
                },
                b'b' => {
                    result.push(8);
                    i += 2;
                },
                b'f' => {
                    result.push(12);
                    i += 2;
                },
                b'(' => {
                    result.push(b'(');
                    i += 2;
                },
                b')' => {
                    result.push(b')');
                    i += 2;
                },
                b'\\' => {
                    result.push(b'\\');
                    i += 2;
                },
                // Line continuation: backslash-newline is dropped.
                b'\n' => {
                    i += 2;
                },
                b'\r' => {
                    i += 2;
                    if i < raw.len() && raw[i] == b'\n' {
                        i += 1;
                    }
                },
                c if (b'0'..b'8').contains(&c) => {
                    let mut value = 0u32;
                    let mut len = 0;
                    while len < 3 && i + 1 + len < raw.len() {
                        let digit = raw[i + 1 + len];
                        if (b'0'..b'8').contains(&digit) {
                            value = value * 8 + (digit - b'0') as u32;
                            len += 1;
                        } else {
                            break;
                        }
                    }
                    result.push((value & 0xFF) as u8);
                    i += 1 + len;
                },
                other => {
                    // Unknown escape: the backslash is dropped.
                    result.push(other);
                    i += 2;
                },
            }
        } else {
            result.push(raw[i]);
            i += 1;
        }
    }

    result
}

/// Decode the digit pairs of a hex string. Whitespace is ignored and a
/// trailing odd digit is padded with zero.
fn decode_hex_string(raw: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(raw.len() / 2);
    let mut high: Option<u8> = None;
    for &b in raw {
        let digit = match b {
            b'0'..=b'9' => b - b'0',
            b'a'..=b'f' => b - b'a' + 10,
            b'A'..=b'F' => b - b'A' + 10,
            _ => continue,
        };
        match high.take() {
            Some(h) => out.push((h << 4) | digit),
            None => high = Some(digit),
        }
    }
    if let Some(h) = high {
        out.push(h << 4);
    }
    out
}

/// Parse one object from the input.
///
/// Indirect references (`n g R`) are recognized by lookahead: an integer
/// followed by another non-negative integer and the keyword `R` collapses
/// into [`Object::Reference`].
pub fn parse_object(input: &[u8]) -> IResult<&[u8], Object> {
    let (rest, tok) = token(input)?;

    match tok {
        Token::Integer(i) => {
            // Lookahead for "gen R".
            if i >= 0 {
                if let Ok((after_gen, Token::Integer(gen))) = token(rest) {
                    if (0..=u16::MAX as i64).contains(&gen) {
                        if let Ok((after_r, Token::Keyword(b"R"))) = token(after_gen) {
                            return Ok((
                                after_r,
                                Object::Reference(ObjectRef::new(i as u32, gen as u16)),
                            ));
                        }
                    }
                }
            }
            Ok((rest, Object::Integer(i)))
        },
        Token::Real(r) => Ok((rest, Object::Real(r))),
        Token::Name(n) => Ok((rest, Object::Name(n))),
        Token::LiteralString(raw) => {
            Ok((rest, Object::String(decode_literal_string_escapes(raw))))
        },
        Token::HexString(raw) => Ok((rest, Object::String(decode_hex_string(raw)))),
        Token::ArrayStart => parse_array_body(rest),
        Token::DictStart => parse_dict_body(rest),
        Token::Keyword(b"true") => Ok((rest, Object::Boolean(true))),
        Token::Keyword(b"false") => Ok((rest, Object::Boolean(false))),
        Token::Keyword(b"null") => Ok((rest, Object::Null)),
        _ => Err(nom::Err::Error(NomError::new(input, ErrorKind::Tag))),
    }
}

/// Parse array elements up to the closing `]`.
fn parse_array_body(mut input: &[u8]) -> IResult<&[u8], Object> {
    let mut items = Vec::new();
    loop {
        if let Ok((rest, Token::ArrayEnd)) = token(input) {
            return Ok((rest, Object::Array(items)));
        }
        let (rest, obj) = parse_object(input)?;
        items.push(obj);
        input = rest;
    }
}

/// Parse dictionary entries up to the closing `>>`.
fn parse_dict_body(mut input: &[u8]) -> IResult<&[u8], Object> {
    let mut dict = HashMap::new();
    loop {
        match token(input)? {
            (rest, Token::DictEnd) => return Ok((rest, Object::Dictionary(dict))),
            (rest, Token::Name(key)) => {
                let (rest, value) = parse_object(rest)?;
                dict.insert(key, value);
                input = rest;
            },
            _ => return Err(nom::Err::Error(NomError::new(input, ErrorKind::Tag))),
        }
    }
}

/// Convenience wrapper mapping nom errors into crate errors.
pub fn parse_object_at(data: &[u8], offset: usize) -> Result<(usize, Object)> {
    if offset >= data.len() {
        return Err(Error::UnexpectedEof);
    }
    let input = &data[offset..];
    let (rest, obj) = parse_object(input).map_err(|_| Error::ParseError {
        offset,
        reason: "malformed object".to_string(),
    })?;
    Ok((data.len() - rest.len(), obj))
}

/// Parse an indirect object (`n g obj ... endobj`) at a byte offset.
///
/// When the object body is a dictionary followed by the `stream` keyword,
/// the raw stream payload is captured. `/Length` is honored when it is a
/// direct integer and actually lands on `endstream`; otherwise the
/// payload is recovered by scanning for the `endstream` keyword, which
/// tolerates indirect or wrong `/Length` values.
pub fn parse_indirect_object_at(data: &[u8], offset: usize) -> Result<(ObjectRef, Object)> {
    if offset >= data.len() {
        return Err(Error::UnexpectedEof);
    }
    let input = &data[offset..];
    let err = |reason: &str| Error::ParseError {
        offset,
        reason: reason.to_string(),
    };

    let (rest, id_tok) = token(input).map_err(|_| err("expected object number"))?;
    let (rest, gen_tok) = token(rest).map_err(|_| err("expected generation number"))?;
    let (rest, obj_kw) = token(rest).map_err(|_| err("expected 'obj'"))?;

    let (Token::Integer(id), Token::Integer(gen), Token::Keyword(b"obj")) =
        (id_tok, gen_tok, obj_kw)
    else {
        return Err(err("malformed indirect object header"));
    };
    if id < 0 || !(0..=u16::MAX as i64).contains(&gen) {
        return Err(err("invalid object or generation number"));
    }
    let obj_ref = ObjectRef::new(id as u32, gen as u16);

    let (rest, body) = parse_object(rest).map_err(|_| err("malformed object body"))?;

    // A dictionary may be followed by a stream payload.
    if let Object::Dictionary(dict) = &body {
        let after = lexer::skip_whitespace(rest);
        if after.starts_with(b"stream") {
            let mut payload_start = &after[b"stream".len()..];
            // Single EOL marker after the keyword (CRLF or LF).
            if payload_start.starts_with(b"\r\n") {
                payload_start = &payload_start[2..];
            } else if payload_start.starts_with(b"\n") || payload_start.starts_with(b"\r") {
                payload_start = &payload_start[1..];
            }

            let declared = dict.get("Length").and_then(|o| o.as_integer());
            let payload = extract_stream_payload(payload_start, declared)
                .ok_or_else(|| err("unterminated stream"))?;

            return Ok((
                obj_ref,
                Object::Stream {
                    dict: dict.clone(),
                    data: bytes::Bytes::copy_from_slice(payload),
                },
            ));
        }
    }

    Ok((obj_ref, body))
}

/// Slice the stream payload out of `input` (which starts at the payload).
fn extract_stream_payload(input: &[u8], declared_length: Option<i64>) -> Option<&[u8]> {
    if let Some(len) = declared_length {
        let len = usize::try_from(len).ok()?;
        if len <= input.len() {
            let tail = lexer::skip_whitespace(&input[len..]);
            if tail.starts_with(b"endstream") {
                return Some(&input[..len]);
            }
        }
        log::debug!("stream /Length {} unusable, scanning for endstream", len);
    }

    // Scan for the endstream keyword and trim the trailing EOL marker.
    let pos = find_keyword(input, b"endstream")?;
    let mut end = pos;
    if end > 0 && input[end - 1] == b'\n' {
        end -= 1;
    }
    if end > 0 && input[end - 1] == b'\r' {
        end -= 1;
    }
    Some(&input[..end])
}

/// Find the first occurrence of `needle` in `haystack`.
pub fn find_keyword(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
