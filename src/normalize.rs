//! Answer text normalization.
//!
//! Text transcribed from scanned PDFs arrives with form-marker glyphs,
//! stray symbols and irregular whitespace. [`clean_answer_text`] strips
//! those down to a canonical single-spaced form before the text is
//! compared or searched for.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Checkbox and form-field marker glyphs.
    static ref CHECKBOX_GLYPHS: Regex = Regex::new("[□■☐☑☒]").unwrap();
    /// Anything outside word characters, whitespace and basic punctuation.
    static ref DISALLOWED: Regex = Regex::new(r#"[^\w\s.,;:?!'"-]"#).unwrap();
    /// Runs of whitespace.
    static ref WHITESPACE_RUNS: Regex = Regex::new(r"\s+").unwrap();
}

/// Normalize raw extracted answer text.
///
/// Removes checkbox glyphs and characters outside
/// `[\w \s . , ; : ? ! ' " -]`, collapses whitespace runs to single
/// spaces and trims. Total and idempotent: character stripping happens
/// before whitespace collapsing, so a second pass is always a no-op.
pub fn clean_answer_text(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let no_glyphs = CHECKBOX_GLYPHS.replace_all(raw, "");
    let allowed = DISALLOWED.replace_all(&no_glyphs, "");
    let collapsed = WHITESPACE_RUNS.replace_all(&allowed, " ");
    collapsed.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_collapses_whitespace() {
        assert_eq!(clean_answer_text("a  b\t\nc"), "a b c");
        assert_eq!(clean_answer_text("  padded  "), "padded");
    }

    #[test]
    fn test_strips_checkbox_glyphs() {
        assert_eq!(clean_answer_text("☑ Paris"), "Paris");
        assert_eq!(clean_answer_text("a ☐ b"), "a b");
        assert_eq!(clean_answer_text("□■☐☑☒"), "");
    }

    #[test]
    fn test_strips_disallowed_symbols() {
        assert_eq!(clean_answer_text("x = 2 € [sic]"), "x 2 sic");
        assert_eq!(clean_answer_text("don't \"quote\" me."), "don't \"quote\" me.");
    }

    #[test]
    fn test_keeps_unicode_word_characters() {
        assert_eq!(clean_answer_text("héllo wörld"), "héllo wörld");
    }

    #[test]
    fn test_empty_and_blank() {
        assert_eq!(clean_answer_text(""), "");
        assert_eq!(clean_answer_text("   \n\t "), "");
    }

    #[test]
    fn test_idempotent_on_glyph_removal() {
        // A stripped glyph between spaces must not leave a double space.
        let once = clean_answer_text("a ☑ b");
        assert_eq!(once, "a b");
        assert_eq!(clean_answer_text(&once), once);
    }

    proptest! {
        #[test]
        fn prop_total_never_panics(s in "\\PC*") {
            let _ = clean_answer_text(&s);
        }

        #[test]
        fn prop_idempotent(s in "\\PC*") {
            let once = clean_answer_text(&s);
            prop_assert_eq!(clean_answer_text(&once), once);
        }

        #[test]
        fn prop_output_is_single_spaced(s in "\\PC*") {
            let cleaned = clean_answer_text(&s);
            prop_assert!(!cleaned.contains("  "));
            prop_assert_eq!(cleaned.trim(), cleaned.as_str());
        }
    }
}
