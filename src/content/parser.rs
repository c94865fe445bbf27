//! Content stream parser.
//!
//! Content streams use postfix notation where operands precede the
//! operator: `100 200 Td` means "move text position to (100, 200)".
//! Operands are parsed with the regular object parser; when a bare
//! keyword appears, the collected operands are folded into an
//! [`Operator`]. Malformed bytes are skipped rather than failing the
//! whole stream, which keeps extraction alive on sloppy generators.

use crate::content::operators::{Operator, TextElement};
use crate::error::Result;
use crate::lexer::{self, Token};
use crate::object::Object;
use crate::parser::{find_keyword, parse_object};

/// Parse a decoded content stream into a sequence of operators.
pub fn parse_content_stream(data: &[u8]) -> Result<Vec<Operator>> {
    let mut operators = Vec::new();
    let mut operands: Vec<Object> = Vec::new();
    let mut input = lexer::skip_whitespace(data);

    while !input.is_empty() {
        // Operand (number, string, name, array, dict)?
        if let Ok((rest, obj)) = parse_object(input) {
            operands.push(obj);
            input = lexer::skip_whitespace(rest);
            continue;
        }

        // Otherwise it must be an operator keyword.
        match lexer::token(input) {
            Ok((rest, Token::Keyword(name))) if !name.is_empty() => {
                let name = String::from_utf8_lossy(name).to_string();
                if name == "BI" {
                    // Inline image: skip the binary payload to "EI".
                    input = skip_inline_image(rest);
                    operands.clear();
                    continue;
                }
                operators.push(build_operator(&name, std::mem::take(&mut operands)));
                input = lexer::skip_whitespace(rest);
            },
            _ => {
                // Unparseable byte: drop it and resynchronize.
                operands.clear();
                input = &input[1..];
            },
        }
    }

    Ok(operators)
}

/// Skip past an inline image's binary data (`BI ... ID ... EI`).
fn skip_inline_image(input: &[u8]) -> &[u8] {
    match find_keyword(input, b"EI") {
        Some(pos) => &input[pos + 2..],
        None => &[],
    }
}

/// Fold an operator name and its operands into an [`Operator`].
fn build_operator(name: &str, operands: Vec<Object>) -> Operator {
    match name {
        "BT" => Operator::BeginText,
        "ET" => Operator::EndText,
        "Td" => match (get_number(&operands, 0), get_number(&operands, 1)) {
            (Some(tx), Some(ty)) => Operator::Td { tx, ty },
            _ => raw(name),
        },
        "TD" => match (get_number(&operands, 0), get_number(&operands, 1)) {
            (Some(tx), Some(ty)) => Operator::TD { tx, ty },
            _ => raw(name),
        },
        "Tm" => match get_matrix(&operands) {
            Some([a, b, c, d, e, f]) => Operator::Tm { a, b, c, d, e, f },
            None => raw(name),
        },
        "T*" => Operator::TStar,
        "TL" => match get_number(&operands, 0) {
            Some(leading) => Operator::TL { leading },
            None => raw(name),
        },
        "Tc" => match get_number(&operands, 0) {
            Some(char_space) => Operator::Tc { char_space },
            None => raw(name),
        },
        "Tw" => match get_number(&operands, 0) {
            Some(word_space) => Operator::Tw { word_space },
            None => raw(name),
        },
        "Tz" => match get_number(&operands, 0) {
            Some(scale) => Operator::Tz { scale },
            None => raw(name),
        },
        "Tf" => match (get_name(&operands, 0), get_number(&operands, 1)) {
            (Some(font), Some(size)) => Operator::Tf {
                font: font.to_string(),
                size,
            },
            _ => raw(name),
        },
        "Tj" => match get_string(&operands, 0) {
            Some(text) => Operator::Tj { text },
            None => raw(name),
        },
        "TJ" => match operands.first() {
            Some(Object::Array(items)) => Operator::TJ {
                array: items
                    .iter()
                    .filter_map(|item| match item {
                        Object::String(s) => Some(TextElement::Text(s.clone())),
                        Object::Integer(i) => Some(TextElement::Offset(*i as f32)),
                        Object::Real(r) => Some(TextElement::Offset(*r as f32)),
                        _ => None,
                    })
                    .collect(),
            },
            _ => raw(name),
        },
        "'" => match get_string(&operands, 0) {
            Some(text) => Operator::Quote { text },
            None => raw(name),
        },
        "\"" => match (
            get_number(&operands, 0),
            get_number(&operands, 1),
            get_string(&operands, 2),
        ) {
            (Some(word_space), Some(char_space), Some(text)) => Operator::DoubleQuote {
                word_space,
                char_space,
                text,
            },
            _ => raw(name),
        },
        "q" => Operator::SaveState,
        "Q" => Operator::RestoreState,
        "cm" => match get_matrix(&operands) {
            Some([a, b, c, d, e, f]) => Operator::Cm { a, b, c, d, e, f },
            None => raw(name),
        },
        _ => raw(name),
    }
}

fn raw(name: &str) -> Operator {
    Operator::Raw {
        name: name.to_string(),
    }
}

fn get_number(operands: &[Object], index: usize) -> Option<f32> {
    operands.get(index).and_then(|o| o.as_number()).map(|n| n as f32)
}

fn get_string(operands: &[Object], index: usize) -> Option<Vec<u8>> {
    operands.get(index).and_then(|o| o.as_string()).map(|s| s.to_vec())
}

fn get_name(operands: &[Object], index: usize) -> Option<&str> {
    operands.get(index).and_then(|o| o.as_name())
}

fn get_matrix(operands: &[Object]) -> Option<[f32; 6]> {
    if operands.len() < 6 {
        return None;
    }
    let mut m = [0f32; 6];
    for (slot, obj) in m.iter_mut().zip(operands.iter()) {
        *slot = obj.as_number()? as f32;
    }
    Some(m)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_text() {
        let stream = b"BT /F1 12 Tf 100 700 Td (Hello) Tj ET";
        let ops = parse_content_stream(stream).unwrap();
        assert_eq!(
            ops,
            vec![
                Operator::BeginText,
                Operator::Tf {
                    font: "F1".to_string(),
                    size: 12.0
                },
                Operator::Td { tx: 100.0, ty: 700.0 },
                Operator::Tj {
                    text: b"Hello".to_vec()
                },
                Operator::EndText,
            ]
        );
    }

    #[test]
    fn test_parse_text_matrix() {
        let ops = parse_content_stream(b"1 0 0 1 50 60 Tm").unwrap();
        assert_eq!(
            ops,
            vec![Operator::Tm {
                a: 1.0,
                b: 0.0,
                c: 0.0,
                d: 1.0,
                e: 50.0,
                f: 60.0
            }]
        );
    }

    #[test]
    fn test_parse_tj_array() {
        let ops = parse_content_stream(b"[(He) -20 (llo)] TJ").unwrap();
        assert_eq!(
            ops,
            vec![Operator::TJ {
                array: vec![
                    TextElement::Text(b"He".to_vec()),
                    TextElement::Offset(-20.0),
                    TextElement::Text(b"llo".to_vec()),
                ]
            }]
        );
    }

    #[test]
    fn test_parse_graphics_state() {
        let ops = parse_content_stream(b"q 2 0 0 2 0 0 cm Q").unwrap();
        assert_eq!(
            ops,
            vec![
                Operator::SaveState,
                Operator::Cm {
                    a: 2.0,
                    b: 0.0,
                    c: 0.0,
                    d: 2.0,
                    e: 0.0,
                    f: 0.0
                },
                Operator::RestoreState,
            ]
        );
    }

    #[test]
    fn test_unknown_operator_kept_raw() {
        let ops = parse_content_stream(b"0.5 0.5 0.5 rg 10 10 50 20 re f").unwrap();
        assert_eq!(
            ops,
            vec![
                Operator::Raw {
                    name: "rg".to_string()
                },
                Operator::Raw {
                    name: "re".to_string()
                },
                Operator::Raw {
                    name: "f".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_quote_operators() {
        let ops = parse_content_stream(b"(next) ' 1 2 (word) \"").unwrap();
        assert_eq!(
            ops,
            vec![
                Operator::Quote {
                    text: b"next".to_vec()
                },
                Operator::DoubleQuote {
                    word_space: 1.0,
                    char_space: 2.0,
                    text: b"word".to_vec()
                },
            ]
        );
    }

    #[test]
    fn test_inline_image_skipped() {
        let ops = parse_content_stream(b"BI /W 1 /H 1 ID \x00\xFF\x12 EI (after) Tj").unwrap();
        assert_eq!(
            ops,
            vec![Operator::Tj {
                text: b"after".to_vec()
            }]
        );
    }

    #[test]
    fn test_parse_empty_stream() {
        assert!(parse_content_stream(b"").unwrap().is_empty());
        assert!(parse_content_stream(b"   \n  ").unwrap().is_empty());
    }
}
