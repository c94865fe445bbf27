//! Byte-level tokenizer for PDF syntax.
//!
//! Produces one token at a time from a byte slice. The parser combines
//! tokens into complete objects; the lexer knows nothing about object
//! structure, only about the lexical classes of ISO 32000-1:2008
//! Section 7.2 (whitespace, delimiters, regular characters).

use nom::error::{Error as NomError, ErrorKind};
use nom::IResult;

/// A lexical token.
#[derive(Debug, Clone, PartialEq)]
pub enum Token<'a> {
    /// Integer number
    Integer(i64),
    /// Real number
    Real(f64),
    /// Name object payload (after `/`, `#xx` escapes decoded)
    Name(String),
    /// Literal string payload, raw bytes with escapes still intact
    LiteralString(&'a [u8]),
    /// Hex string payload, raw bytes between `<` and `>`
    HexString(&'a [u8]),
    /// `[`
    ArrayStart,
    /// `]`
    ArrayEnd,
    /// `<<`
    DictStart,
    /// `>>`
    DictEnd,
    /// Bare keyword: `true`, `false`, `null`, `obj`, `endobj`, `stream`,
    /// `R`, `xref`, `trailer`, `startxref`, ...
    Keyword(&'a [u8]),
}

/// PDF whitespace per ISO 32000-1:2008 Table 1.
pub fn is_whitespace(byte: u8) -> bool {
    matches!(byte, 0x00 | 0x09 | 0x0A | 0x0C | 0x0D | 0x20)
}

/// PDF delimiter characters per ISO 32000-1:2008 Table 2.
pub fn is_delimiter(byte: u8) -> bool {
    matches!(
        byte,
        b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%'
    )
}

/// A regular character: neither whitespace nor delimiter.
pub fn is_regular(byte: u8) -> bool {
    !is_whitespace(byte) && !is_delimiter(byte)
}

/// Skip whitespace and `%` comments (which run to end of line).
pub fn skip_whitespace(mut input: &[u8]) -> &[u8] {
    loop {
        while !input.is_empty() && is_whitespace(input[0]) {
            input = &input[1..];
        }
        if input.first() == Some(&b'%') {
            while !input.is_empty() && input[0] != b'\n' && input[0] != b'\r' {
                input = &input[1..];
            }
        } else {
            return input;
        }
    }
}

fn lex_error<T>(input: &[u8]) -> IResult<&[u8], T> {
    Err(nom::Err::Error(NomError::new(input, ErrorKind::Tag)))
}

/// Read the next token, skipping leading whitespace and comments.
pub fn token(input: &[u8]) -> IResult<&[u8], Token<'_>> {
    let input = skip_whitespace(input);
    let Some(&first) = input.first() else {
        return Err(nom::Err::Error(NomError::new(input, ErrorKind::Eof)));
    };

    match first {
        b'[' => Ok((&input[1..], Token::ArrayStart)),
        b']' => Ok((&input[1..], Token::ArrayEnd)),
        b'<' => {
            if input.get(1) == Some(&b'<') {
                Ok((&input[2..], Token::DictStart))
            } else {
                lex_hex_string(&input[1..])
            }
        },
        b'>' => {
            if input.get(1) == Some(&b'>') {
                Ok((&input[2..], Token::DictEnd))
            } else {
                lex_error(input)
            }
        },
        b'(' => lex_literal_string(&input[1..]),
        b'/' => lex_name(&input[1..]),
        b'+' | b'-' | b'.' | b'0'..=b'9' => lex_number(input),
        c if c.is_ascii_alphabetic() || c == b'\'' || c == b'"' => lex_keyword(input),
        _ => lex_error(input),
    }
}

/// Lex a literal string; `input` starts just after `(`.
///
/// Parentheses balance per Section 7.3.4.2; escaped parens do not count.
fn lex_literal_string(input: &[u8]) -> IResult<&[u8], Token<'_>> {
    let mut depth = 1usize;
    let mut i = 0usize;
    while i < input.len() {
        match input[i] {
            b'\\' => i += 1, // skip the escaped byte
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Ok((&input[i + 1..], Token::LiteralString(&input[..i])));
                }
            },
            _ => {},
        }
        i += 1;
    }
    Err(nom::Err::Error(NomError::new(input, ErrorKind::Eof)))
}

/// Lex a hex string; `input` starts just after `<`.
fn lex_hex_string(input: &[u8]) -> IResult<&[u8], Token<'_>> {
    match input.iter().position(|&b| b == b'>') {
        Some(end) => Ok((&input[end + 1..], Token::HexString(&input[..end]))),
        None => Err(nom::Err::Error(NomError::new(input, ErrorKind::Eof))),
    }
}

/// Lex a name; `input` starts just after `/`. Decodes `#xx` escapes.
fn lex_name(input: &[u8]) -> IResult<&[u8], Token<'_>> {
    let mut name = String::new();
    let mut i = 0usize;
    while i < input.len() && is_regular(input[i]) {
        if input[i] == b'#' && i + 2 < input.len() {
            let hex = std::str::from_utf8(&input[i + 1..i + 3]).ok();
            if let Some(value) = hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                name.push(value as char);
                i += 3;
                continue;
            }
        }
        name.push(input[i] as char);
        i += 1;
    }
    // An empty name (bare "/") is legal.
    Ok((&input[i..], Token::Name(name)))
}

/// Lex an integer or real number.
fn lex_number(input: &[u8]) -> IResult<&[u8], Token<'_>> {
    let mut i = 0usize;
    let mut seen_digit = false;
    let mut seen_dot = false;

    if matches!(input.first(), Some(&b'+') | Some(&b'-')) {
        i += 1;
    }
    while i < input.len() {
        match input[i] {
            b'0'..=b'9' => {
                seen_digit = true;
                i += 1;
            },
            b'.' if !seen_dot => {
                seen_dot = true;
                i += 1;
            },
            _ => break,
        }
    }
    if !seen_digit {
        return lex_error(input);
    }

    let text = std::str::from_utf8(&input[..i])
        .map_err(|_| nom::Err::Error(NomError::new(input, ErrorKind::Digit)))?;

    if seen_dot {
        match normalize_real(text).parse::<f64>() {
            Ok(value) => Ok((&input[i..], Token::Real(value))),
            Err(_) => lex_error(input),
        }
    } else {
        match text.parse::<i64>() {
            Ok(value) => Ok((&input[i..], Token::Integer(value))),
            Err(_) => lex_error(input),
        }
    }
}

/// `4.` and `-.5` are valid PDF reals but not valid Rust float literals.
fn normalize_real(text: &str) -> String {
    let mut s = text.to_string();
    if s.ends_with('.') {
        s.push('0');
    }
    if let Some(stripped) = s.strip_prefix('.') {
        s = format!("0.{}", stripped);
    } else if let Some(stripped) = s.strip_prefix("-.") {
        s = format!("-0.{}", stripped);
    } else if let Some(stripped) = s.strip_prefix("+.") {
        s = format!("0.{}", stripped);
    }
    s
}

/// Lex a bare keyword (alphabetic run, or the `'` / `"` text operators).
fn lex_keyword(input: &[u8]) -> IResult<&[u8], Token<'_>> {
    if input[0] == b'\'' || input[0] == b'"' {
        return Ok((&input[1..], Token::Keyword(&input[..1])));
    }
    let mut i = 0usize;
    while i < input.len() && (input[i].is_ascii_alphabetic() || input[i] == b'*') {
        i += 1;
    }
    Ok((&input[i..], Token::Keyword(&input[..i])))
}
