//! Literal text search with position tracking.
//!
//! A [`PageTextIndex`] concatenates a page's extracted characters into a
//! searchable string (inserting synthetic spaces at line breaks and wide
//! gaps) while remembering which byte of the string came from which
//! character. Matches map back to per-line rectangles, ready to be
//! highlighted.
//!
//! Search is case-insensitive and whitespace-flexible: any whitespace run
//! in the needle matches any whitespace run on the page. That mirrors how
//! extraction artifacts differ from the visual text.

use crate::extractors::TextChar;
use crate::geometry::Rect;
use regex::RegexBuilder;

/// Horizontal gap (relative to glyph height) treated as a word break.
const GAP_FACTOR: f32 = 0.3;

/// One search hit with its page-space rectangles (one per line).
#[derive(Debug, Clone)]
pub struct TextMatch {
    /// The matched page text
    pub text: String,
    /// Rectangles covering the match, one per text line
    pub rects: Vec<Rect>,
}

/// Searchable index of one page's text.
pub struct PageTextIndex {
    chars: Vec<TextChar>,
    text: String,
    /// Byte offset in `text` -> index into `chars` (None for synthetic
    /// whitespace).
    positions: Vec<(usize, Option<usize>)>,
}

impl PageTextIndex {
    /// Build the index from extracted characters (content-stream order).
    pub fn new(chars: Vec<TextChar>) -> Self {
        let mut text = String::new();
        let mut positions = Vec::with_capacity(chars.len());

        for (idx, ch) in chars.iter().enumerate() {
            if idx > 0 {
                let prev = &chars[idx - 1];
                if needs_separator(prev, ch) && !text.ends_with(' ') {
                    positions.push((text.len(), None));
                    text.push(' ');
                }
            }
            positions.push((text.len(), Some(idx)));
            text.push(ch.ch);
        }

        Self {
            chars,
            text,
            positions,
        }
    }

    /// The concatenated page text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// True when the page produced no searchable characters.
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Find every occurrence of `needle` on the page.
    ///
    /// Returns one [`TextMatch`] per occurrence; an empty or
    /// whitespace-only needle yields no matches.
    pub fn find(&self, needle: &str) -> Vec<TextMatch> {
        let parts: Vec<&str> = needle.split_whitespace().collect();
        if parts.is_empty() {
            return Vec::new();
        }

        let pattern = parts
            .iter()
            .map(|p| regex::escape(p))
            .collect::<Vec<_>>()
            .join(r"\s+");

        let regex = match RegexBuilder::new(&pattern).case_insensitive(true).build() {
            Ok(r) => r,
            Err(e) => {
                log::warn!("search pattern failed to compile: {}", e);
                return Vec::new();
            },
        };

        regex
            .find_iter(&self.text)
            .map(|m| {
                let matched: Vec<&TextChar> = self
                    .positions
                    .iter()
                    .filter(|(offset, _)| *offset >= m.start() && *offset < m.end())
                    .filter_map(|(_, idx)| idx.map(|i| &self.chars[i]))
                    .collect();
                TextMatch {
                    text: m.as_str().to_string(),
                    rects: group_line_rects(&matched),
                }
            })
            .filter(|m| !m.rects.is_empty())
            .collect()
    }
}

/// Whether a synthetic space belongs between two consecutive characters.
fn needs_separator(prev: &TextChar, next: &TextChar) -> bool {
    let height = prev.bbox.height.max(next.bbox.height).max(1.0);
    let line_break = (next.bbox.center().y - prev.bbox.center().y).abs() > height / 2.0;
    let gap = next.bbox.left() - prev.bbox.right() > height * GAP_FACTOR;
    line_break || gap
}

/// Merge matched characters into one rectangle per text line.
fn group_line_rects(chars: &[&TextChar]) -> Vec<Rect> {
    let mut rects: Vec<Rect> = Vec::new();
    let mut current: Option<Rect> = None;

    for ch in chars {
        match current {
            Some(rect) => {
                let height = rect.height.max(ch.bbox.height).max(1.0);
                let same_line =
                    (ch.bbox.center().y - rect.center().y).abs() <= height / 2.0;
                if same_line {
                    current = Some(rect.union(&ch.bbox));
                } else {
                    rects.push(rect);
                    current = Some(ch.bbox);
                }
            },
            None => current = Some(ch.bbox),
        }
    }
    if let Some(rect) = current {
        rects.push(rect);
    }
    rects
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Lay out a string of 10pt-high, 5pt-wide glyphs starting at (x, y).
    fn line(text: &str, x: f32, y: f32, seq_start: usize) -> Vec<TextChar> {
        text.chars()
            .enumerate()
            .map(|(i, ch)| TextChar {
                ch,
                bbox: Rect::new(x + i as f32 * 5.0, y, 5.0, 10.0),
                sequence: seq_start + i,
            })
            .collect()
    }

    #[test]
    fn test_exact_match_single_line() {
        let index = PageTextIndex::new(line("The capital is Paris", 72.0, 100.0, 0));
        let matches = index.find("Paris");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].rects.len(), 1);
        let rect = matches[0].rects[0];
        // "Paris" starts at character 15.
        assert_eq!(rect.x, 72.0 + 15.0 * 5.0);
        assert_eq!(rect.width, 25.0);
    }

    #[test]
    fn test_case_insensitive() {
        let index = PageTextIndex::new(line("Answer: PARIS", 0.0, 0.0, 0));
        assert_eq!(index.find("paris").len(), 1);
    }

    #[test]
    fn test_multiple_occurrences() {
        let index = PageTextIndex::new(line("yes no yes", 0.0, 0.0, 0));
        assert_eq!(index.find("yes").len(), 2);
    }

    #[test]
    fn test_gap_becomes_space() {
        let mut chars = line("ab", 0.0, 0.0, 0);
        chars.extend(line("cd", 50.0, 0.0, 2)); // 40pt gap
        let index = PageTextIndex::new(chars);
        assert_eq!(index.text(), "ab cd");
        assert_eq!(index.find("ab cd").len(), 1);
    }

    #[test]
    fn test_match_across_lines_yields_rect_per_line() {
        let mut chars = line("first", 10.0, 0.0, 0);
        chars.extend(line("second", 10.0, 20.0, 5));
        let index = PageTextIndex::new(chars);
        let matches = index.find("first second");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].rects.len(), 2);
        assert_eq!(matches[0].rects[0].y, 0.0);
        assert_eq!(matches[0].rects[1].y, 20.0);
    }

    #[test]
    fn test_no_match() {
        let index = PageTextIndex::new(line("something", 0.0, 0.0, 0));
        assert!(index.find("absent").is_empty());
    }

    #[test]
    fn test_blank_needle_matches_nothing() {
        let index = PageTextIndex::new(line("text", 0.0, 0.0, 0));
        assert!(index.find("").is_empty());
        assert!(index.find("   ").is_empty());
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        let index = PageTextIndex::new(line("f(x) = 2", 0.0, 0.0, 0));
        assert_eq!(index.find("f(x)").len(), 1);
    }

    #[test]
    fn test_empty_page() {
        let index = PageTextIndex::new(Vec::new());
        assert!(index.is_empty());
        assert!(index.find("x").is_empty());
    }
}
