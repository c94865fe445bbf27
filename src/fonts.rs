//! Simple-font width and decoding model.
//!
//! Exam papers overwhelmingly use simple (single-byte) fonts, so this is
//! a deliberately small model: `/Widths` arrays when the font dictionary
//! carries them, built-in metrics for the standard Helvetica and Courier
//! families, and a flat default otherwise. Composite (Type0/CID) fonts
//! fall back to the default width; their bytes rarely decode to
//! searchable text anyway and the bounding-box fallback covers them.

use crate::document::PdfDocument;
use crate::object::Object;
use std::collections::HashMap;

/// Glyph-space width (1/1000 em) used when nothing better is known.
const DEFAULT_WIDTH: f32 = 500.0;

/// Helvetica advance widths for codes 0x20..=0x7E (Adobe AFM data).
#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333,
    278, 278, 556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278,
    584, 584, 584, 556, 1015, 667, 667, 722, 722, 667, 611, 778, 722, 278,
    500, 667, 556, 833, 722, 778, 667, 778, 722, 667, 611, 722, 667, 944,
    667, 667, 611, 278, 278, 278, 469, 556, 333, 556, 556, 500, 556, 556,
    278, 556, 556, 222, 222, 500, 222, 833, 556, 556, 556, 556, 333, 500,
    278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Builtin {
    Helvetica,
    Courier,
    None,
}

/// Width and decoding information for one page font.
#[derive(Debug, Clone)]
pub struct SimpleFont {
    first_char: i64,
    widths: Option<Vec<f32>>,
    builtin: Builtin,
}

impl SimpleFont {
    /// A font with no metrics at all (flat default width).
    pub fn fallback() -> Self {
        Self {
            first_char: 0,
            widths: None,
            builtin: Builtin::None,
        }
    }

    /// Build from a font dictionary, resolving `/Widths` and `/FirstChar`.
    ///
    /// Total: metric lookups degrade to defaults rather than failing.
    pub fn from_dict(doc: &mut PdfDocument, dict: &HashMap<String, Object>) -> Self {
        let base_font = dict
            .get("BaseFont")
            .and_then(|o| o.as_name())
            .unwrap_or("");
        // Subset tags look like "ABCDEF+Helvetica".
        let family = base_font.rsplit('+').next().unwrap_or(base_font);

        let builtin = if family.contains("Helvetica") || family.contains("Arial") {
            Builtin::Helvetica
        } else if family.contains("Courier") {
            Builtin::Courier
        } else {
            Builtin::None
        };

        let first_char = dict
            .get("FirstChar")
            .and_then(|o| o.as_integer())
            .unwrap_or(0);

        let widths = dict
            .get("Widths")
            .map(|w| doc.resolve(w))
            .and_then(|r| r.ok())
            .and_then(|resolved| match resolved {
                Object::Array(arr) => Some(
                    arr.iter()
                        .map(|o| o.as_number().unwrap_or(DEFAULT_WIDTH as f64) as f32)
                        .collect::<Vec<f32>>(),
                ),
                _ => None,
            });

        Self {
            first_char,
            widths,
            builtin,
        }
    }

    /// Advance width for a character code, in glyph space (1/1000 em).
    pub fn width(&self, code: u8) -> f32 {
        if let Some(widths) = &self.widths {
            let index = code as i64 - self.first_char;
            if index >= 0 {
                if let Some(&w) = widths.get(index as usize) {
                    if w > 0.0 {
                        return w;
                    }
                }
            }
        }
        match self.builtin {
            Builtin::Helvetica => {
                if (0x20..=0x7E).contains(&code) {
                    HELVETICA_WIDTHS[(code - 0x20) as usize] as f32
                } else {
                    DEFAULT_WIDTH
                }
            },
            Builtin::Courier => 600.0,
            Builtin::None => DEFAULT_WIDTH,
        }
    }

    /// Decode a character code to a Unicode character.
    ///
    /// Latin-1 plus the WinAnsi punctuation block; control codes decode
    /// to `None` and never reach the search index.
    pub fn decode_byte(&self, code: u8) -> Option<char> {
        match code {
            0x00..=0x1F | 0x7F => None,
            // WinAnsiEncoding punctuation (differs from Latin-1 C1 range).
            0x85 => Some('\u{2026}'),
            0x91 => Some('\u{2018}'),
            0x92 => Some('\u{2019}'),
            0x93 => Some('\u{201C}'),
            0x94 => Some('\u{201D}'),
            0x95 => Some('\u{2022}'),
            0x96 => Some('\u{2013}'),
            0x97 => Some('\u{2014}'),
            0x80..=0x9F => None,
            other => Some(other as char),
        }
    }
}

/// Measure a string in glyph-space units using Helvetica metrics.
///
/// Used to center badge labels; unknown characters use the default width.
pub fn helvetica_string_width(text: &str) -> f32 {
    text.chars()
        .map(|c| {
            let code = c as u32;
            if (0x20..=0x7E).contains(&code) {
                HELVETICA_WIDTHS[(code - 0x20) as usize] as f32
            } else {
                DEFAULT_WIDTH
            }
        })
        .sum()
}
