//! The answer locator / highlighter engine.
//!
//! Given a source PDF and a set of [`AnswerRecord`]s, finds each answer's
//! position in the page text layer and overlays a color-coded, labelled
//! mark. Per-answer failures (blank text, bad page, no match) are soft:
//! they are counted in the [`HighlightReport`] and processing continues.
//! Only document-level failures (unreadable source, render error) abort.

pub mod overlay;
pub mod strategy;

use crate::document::PdfDocument;
use crate::error::Result;
use crate::extractors::extract_page_chars;
use crate::geometry::Rect;
use crate::records::{AnswerRecord, Correctness};
use crate::search::PageTextIndex;
use std::collections::{BTreeMap, HashMap};

pub use strategy::{default_strategies, LocateContext, LocateStrategy};

/// An RGB color with components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    /// Red component
    pub r: f32,
    /// Green component
    pub g: f32,
    /// Blue component
    pub b: f32,
}

impl Color {
    /// Create a color from components.
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }
}

/// Visual style for one correctness state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkStyle {
    /// Fill and stroke color of the highlight rectangle
    pub fill: Color,
    /// Fill opacity of the highlight rectangle
    pub fill_opacity: f32,
    /// Opaque color of the question-number badge
    pub badge: Color,
}

/// Rendering configuration for the highlighter.
#[derive(Debug, Clone, PartialEq)]
pub struct HighlightConfig {
    /// Margin added around every located rectangle
    pub padding: f32,
    /// Stroke width of the highlight rectangle
    pub stroke_width: f32,
    /// Radius of the question-number badge
    pub badge_radius: f32,
    /// Horizontal offset of the badge center from the rectangle's left edge
    pub badge_offset: f32,
    /// Font size of the badge label
    pub label_font_size: f32,
    /// Style for incorrect answers
    pub incorrect: MarkStyle,
    /// Style for correct answers
    pub correct: MarkStyle,
    /// Style for unevaluated answers
    pub unknown: MarkStyle,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            padding: 3.0,
            stroke_width: 1.5,
            badge_radius: 8.0,
            badge_offset: 10.0,
            label_font_size: 8.0,
            incorrect: MarkStyle {
                fill: Color::new(1.0, 0.0, 0.0),
                fill_opacity: 0.3,
                badge: Color::new(0.9, 0.0, 0.0),
            },
            correct: MarkStyle {
                fill: Color::new(0.0, 0.7, 0.0),
                fill_opacity: 0.2,
                badge: Color::new(0.0, 0.6, 0.0),
            },
            unknown: MarkStyle {
                fill: Color::new(0.0, 0.0, 1.0),
                fill_opacity: 0.2,
                badge: Color::new(0.0, 0.0, 0.9),
            },
        }
    }
}

impl HighlightConfig {
    /// The style used for a correctness state.
    pub fn style_for(&self, correctness: Correctness) -> &MarkStyle {
        match correctness {
            Correctness::Incorrect => &self.incorrect,
            Correctness::Correct => &self.correct,
            Correctness::Unknown => &self.unknown,
        }
    }
}

/// One resolved annotation, ready to draw. Ephemeral: produced per
/// answer, consumed by the overlay painter.
#[derive(Debug, Clone)]
pub struct HighlightSpec {
    /// Padded rectangle in top-down page coordinates
    pub rect: Rect,
    /// Visual style
    pub style: MarkStyle,
    /// Badge label ("Q3"); empty suppresses the badge
    pub label: String,
}

/// Why answers were skipped, by category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkipCounts {
    /// Correct answers suppressed by errors-only mode
    pub filtered: usize,
    /// Answers with no text after trimming
    pub blank_text: usize,
    /// Answers pointing outside the document
    pub invalid_page: usize,
    /// Answers no strategy could locate
    pub no_match: usize,
}

/// Per-call diagnostics: enough for the caller to log coverage without
/// treating partial matches as errors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HighlightReport {
    /// Answers considered (length of the input slice)
    pub total_answers: usize,
    /// Answers located by some strategy
    pub matched_answers: usize,
    /// Rectangles actually drawn (one answer may produce several)
    pub drawn_regions: usize,
    /// Skipped answers by reason
    pub skipped: SkipCounts,
}

impl HighlightReport {
    /// Total answers skipped for any reason.
    pub fn skipped_total(&self) -> usize {
        self.skipped.filtered
            + self.skipped.blank_text
            + self.skipped.invalid_page
            + self.skipped.no_match
    }
}

/// The annotated output document plus its diagnostics.
#[derive(Debug, Clone)]
pub struct HighlightedDocument {
    /// Complete PDF bytes with overlays applied
    pub bytes: Vec<u8>,
    /// Coverage diagnostics for this call
    pub report: HighlightReport,
}

/// The highlighter engine.
pub struct Highlighter {
    config: HighlightConfig,
    strategies: Vec<Box<dyn LocateStrategy>>,
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl Highlighter {
    /// Engine with default configuration and strategy order.
    pub fn new() -> Self {
        Self::with_config(HighlightConfig::default())
    }

    /// Engine with explicit configuration.
    pub fn with_config(config: HighlightConfig) -> Self {
        Self {
            config,
            strategies: default_strategies(),
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &HighlightConfig {
        &self.config
    }

    /// Produce a highlighted copy of `source`.
    ///
    /// With `errors_only`, answers marked correct get no visual mark;
    /// unevaluated answers are still drawn (in the unknown style).
    pub fn highlight_document(
        &self,
        source: &[u8],
        answers: &[AnswerRecord],
        errors_only: bool,
    ) -> Result<HighlightedDocument> {
        let mut doc = PdfDocument::from_bytes(source.to_vec())?;
        let page_count = doc.page_count()?;
        log::info!(
            "highlighting {} answers over {} pages (errors_only: {})",
            answers.len(),
            page_count,
            errors_only
        );

        let mut report = HighlightReport {
            total_answers: answers.len(),
            ..Default::default()
        };

        let mut page_indexes: HashMap<usize, PageTextIndex> = HashMap::new();
        let mut page_boxes: HashMap<usize, [f32; 4]> = HashMap::new();
        let mut marks: BTreeMap<usize, Vec<HighlightSpec>> = BTreeMap::new();

        for answer in answers {
            if errors_only && answer.correctness == Correctness::Correct {
                report.skipped.filtered += 1;
                continue;
            }

            let text = answer.answer_text.trim();
            if text.is_empty() {
                log::warn!("no answer text for question {}", answer.question_number);
                report.skipped.blank_text += 1;
                continue;
            }

            let page = answer.location.page as usize;
            if page == 0 || page > page_count {
                log::warn!(
                    "invalid page {} for question {}",
                    page,
                    answer.question_number
                );
                report.skipped.invalid_page += 1;
                continue;
            }
            let page_idx = page - 1;

            if !page_indexes.contains_key(&page_idx) {
                let index = match extract_page_chars(&mut doc, page_idx) {
                    Ok(chars) => PageTextIndex::new(chars),
                    Err(e) => {
                        // A page we cannot read is a soft failure: the
                        // bounding-box fallback may still place a mark.
                        log::warn!("text extraction failed on page {}: {}", page, e);
                        PageTextIndex::new(Vec::new())
                    },
                };
                page_indexes.insert(page_idx, index);
                page_boxes.insert(page_idx, doc.page_media_box(page_idx)?);
            }

            let ctx = LocateContext {
                index: &page_indexes[&page_idx],
                media_box: page_boxes[&page_idx],
            };

            let located = self
                .strategies
                .iter()
                .find_map(|s| s.locate(&ctx, answer).map(|rects| (s.describe(), rects)));

            match located {
                Some((method, rects)) => {
                    log::info!(
                        "question {}: {} region(s) via {} on page {}",
                        answer.question_number,
                        rects.len(),
                        method,
                        page
                    );
                    report.matched_answers += 1;
                    let style = *self.config.style_for(answer.correctness);
                    let label = if answer.question_number.is_empty() {
                        String::new()
                    } else {
                        format!("Q{}", answer.question_number)
                    };
                    for rect in rects {
                        marks.entry(page_idx).or_default().push(HighlightSpec {
                            rect: rect.expand(self.config.padding),
                            style,
                            label: label.clone(),
                        });
                        report.drawn_regions += 1;
                    }
                },
                None => {
                    let preview: String = text.chars().take(20).collect();
                    log::warn!(
                        "no match found for question {} ('{}')",
                        answer.question_number,
                        preview
                    );
                    report.skipped.no_match += 1;
                },
            }
        }

        let bytes = overlay::apply_overlays(&mut doc, &marks, &self.config)?;
        log::info!(
            "drew {} regions for {}/{} answers ({} skipped)",
            report.drawn_regions,
            report.matched_answers,
            report.total_answers,
            report.skipped_total()
        );
        Ok(HighlightedDocument { bytes, report })
    }
}

/// Convenience wrapper: default configuration, one call.
pub fn create_highlighted_document(
    source: &[u8],
    answers: &[AnswerRecord],
    errors_only: bool,
) -> Result<HighlightedDocument> {
    Highlighter::new().highlight_document(source, answers, errors_only)
}
