//! Answer location strategies.
//!
//! The precedence chain is data, not control flow: an ordered list of
//! strategies, each tried in sequence until one yields a non-empty
//! result. That keeps the order testable in isolation:
//!
//! 1. exact text search
//! 2. prefix search, 10 then 5 then 3 characters (only for answers
//!    longer than 10 characters)
//! 3. the stored normalized bounding box, scaled to the page: a last
//!    resort, never preferred over a text match

use crate::geometry::Rect;
use crate::records::AnswerRecord;
use crate::search::PageTextIndex;

/// Page-level inputs a strategy may consult.
pub struct LocateContext<'a> {
    /// Searchable text of the target page
    pub index: &'a PageTextIndex,
    /// The page's media box `[x0, y0, x1, y1]`
    pub media_box: [f32; 4],
}

/// One way of resolving an answer to page rectangles.
pub trait LocateStrategy: Send + Sync {
    /// Human-readable strategy name for coverage logging.
    fn describe(&self) -> String;

    /// Try to locate the answer; `None` means "not found, try the next
    /// strategy". A returned vector is never empty.
    fn locate(&self, ctx: &LocateContext<'_>, answer: &AnswerRecord) -> Option<Vec<Rect>>;
}

/// Verbatim search for the full answer text.
pub struct ExactTextStrategy;

impl LocateStrategy for ExactTextStrategy {
    fn describe(&self) -> String {
        "exact text".to_string()
    }

    fn locate(&self, ctx: &LocateContext<'_>, answer: &AnswerRecord) -> Option<Vec<Rect>> {
        let text = answer.answer_text.trim();
        let rects: Vec<Rect> = ctx
            .index
            .find(text)
            .into_iter()
            .flat_map(|m| m.rects)
            .collect();
        if rects.is_empty() {
            None
        } else {
            Some(rects)
        }
    }
}

/// Search for a fixed-length prefix of the answer text.
///
/// Applies only when the trimmed text is longer than 10 characters,
/// matching the engine's documented fallback gate.
pub struct PrefixTextStrategy {
    /// Prefix length in characters
    pub length: usize,
}

impl LocateStrategy for PrefixTextStrategy {
    fn describe(&self) -> String {
        format!("{}-char prefix", self.length)
    }

    fn locate(&self, ctx: &LocateContext<'_>, answer: &AnswerRecord) -> Option<Vec<Rect>> {
        let text = answer.answer_text.trim();
        if text.chars().count() <= 10 {
            return None;
        }
        let prefix: String = text.chars().take(self.length).collect();
        let rects: Vec<Rect> = ctx
            .index
            .find(&prefix)
            .into_iter()
            .flat_map(|m| m.rects)
            .collect();
        if rects.is_empty() {
            None
        } else {
            Some(rects)
        }
    }
}

/// Scale the stored normalized bounding box to page coordinates.
pub struct BoundingBoxStrategy;

impl LocateStrategy for BoundingBoxStrategy {
    fn describe(&self) -> String {
        "bounding box".to_string()
    }

    fn locate(&self, ctx: &LocateContext<'_>, answer: &AnswerRecord) -> Option<Vec<Rect>> {
        let bbox = answer.location.bounding_box.as_ref()?;
        let [x0, y0, x1, y1] = ctx.media_box;
        let width = x1 - x0;
        let height = y1 - y0;

        Some(vec![Rect::from_points(
            x0 + bbox.x1 * width,
            bbox.y1 * height,
            x0 + bbox.x2 * width,
            bbox.y2 * height,
        )])
    }
}

/// The engine's default precedence chain.
pub fn default_strategies() -> Vec<Box<dyn LocateStrategy>> {
    vec![
        Box::new(ExactTextStrategy),
        Box::new(PrefixTextStrategy { length: 10 }),
        Box::new(PrefixTextStrategy { length: 5 }),
        Box::new(PrefixTextStrategy { length: 3 }),
        Box::new(BoundingBoxStrategy),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::TextChar;
    use crate::records::{AnswerLocation, BoundingBox, Correctness};

    fn page_index(text: &str) -> PageTextIndex {
        let chars = text
            .chars()
            .enumerate()
            .map(|(i, ch)| TextChar {
                ch,
                bbox: Rect::new(i as f32 * 5.0, 100.0, 5.0, 10.0),
                sequence: i,
            })
            .collect();
        PageTextIndex::new(chars)
    }

    fn answer(text: &str, bbox: Option<BoundingBox>) -> AnswerRecord {
        AnswerRecord {
            question_number: "1".to_string(),
            answer_text: text.to_string(),
            correctness: Correctness::Unknown,
            location: AnswerLocation {
                page: 1,
                bounding_box: bbox,
                text_spans: Vec::new(),
            },
        }
    }

    fn ctx(index: &PageTextIndex) -> LocateContext<'_> {
        LocateContext {
            index,
            media_box: [0.0, 0.0, 600.0, 800.0],
        }
    }

    #[test]
    fn test_exact_wins_when_present() {
        let index = page_index("the answer is Paris obviously");
        let located = ExactTextStrategy
            .locate(&ctx(&index), &answer("Paris", None))
            .unwrap();
        assert_eq!(located.len(), 1);
    }

    #[test]
    fn test_prefix_gate_requires_long_text() {
        let index = page_index("Paris is the capital");
        // 5 chars: too short for the prefix chain.
        assert!(PrefixTextStrategy { length: 3 }
            .locate(&ctx(&index), &answer("Paris", None))
            .is_none());
        // 22 chars: the 5-char prefix "Paris" is searchable.
        assert!(PrefixTextStrategy { length: 5 }
            .locate(&ctx(&index), &answer("Paris is the capital!!", None))
            .is_some());
    }

    #[test]
    fn test_prefix_takes_characters_not_bytes() {
        let index = page_index("héllo wörld and more text");
        let located = PrefixTextStrategy { length: 5 }
            .locate(&ctx(&index), &answer("héllo wörld and more", None));
        assert!(located.is_some());
    }

    #[test]
    fn test_bounding_box_scales_to_page() {
        let index = page_index("");
        let bbox = BoundingBox {
            x1: 0.25,
            y1: 0.5,
            x2: 0.75,
            y2: 0.625,
        };
        let located = BoundingBoxStrategy
            .locate(&ctx(&index), &answer("anything", Some(bbox)))
            .unwrap();
        assert_eq!(located.len(), 1);
        let rect = located[0];
        assert_eq!(rect.x, 150.0);
        assert_eq!(rect.y, 400.0);
        assert_eq!(rect.width, 300.0);
        assert_eq!(rect.height, 100.0);
    }

    #[test]
    fn test_bounding_box_requires_location() {
        let index = page_index("");
        assert!(BoundingBoxStrategy
            .locate(&ctx(&index), &answer("anything", None))
            .is_none());
    }

    #[test]
    fn test_default_chain_order() {
        let strategies = default_strategies();
        let names: Vec<String> = strategies.iter().map(|s| s.describe()).collect();
        assert_eq!(
            names,
            vec![
                "exact text",
                "10-char prefix",
                "5-char prefix",
                "3-char prefix",
                "bounding box"
            ]
        );
    }

    #[test]
    fn test_chain_falls_through_to_prefix() {
        // Page contains only the first 10 characters of the answer.
        let index = page_index("introducti");
        let record = answer("introduction to algorithms", None);
        let context = ctx(&index);

        let hit = default_strategies()
            .iter()
            .find_map(|s| s.locate(&context, &record).map(|r| (s.describe(), r)));
        let (method, _) = hit.unwrap();
        assert_eq!(method, "10-char prefix");
    }

    #[test]
    fn test_chain_falls_through_to_bbox() {
        let index = page_index("entirely unrelated content");
        let bbox = BoundingBox {
            x1: 0.1,
            y1: 0.1,
            x2: 0.2,
            y2: 0.2,
        };
        let record = answer("missing text", Some(bbox));
        let context = ctx(&index);

        let hit = default_strategies()
            .iter()
            .find_map(|s| s.locate(&context, &record).map(|r| (s.describe(), r)));
        let (method, _) = hit.unwrap();
        assert_eq!(method, "bounding box");
    }
}
