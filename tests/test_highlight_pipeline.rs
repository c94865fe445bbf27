//! End-to-end highlighter tests over generated fixture documents.

use redpen::document::PdfDocument;
use redpen::extractors::extract_page_chars;
use redpen::search::PageTextIndex;
use redpen::{
    create_highlighted_document, AnswerLocation, AnswerRecord, BoundingBox, Correctness,
    DocumentBuilder, Highlighter,
};

/// Two-page exam: page 1 carries two answers, page 2 one.
fn exam_fixture() -> Vec<u8> {
    let mut builder = DocumentBuilder::new();
    let mut page = builder.add_letter_page();
    page.text(72.0, 720.0, 12.0, "Q1: The capital of France is Paris");
    page.text(72.0, 690.0, 12.0, "Q2: Napoleon crowned himself emperor");
    let mut page = page.finish().add_letter_page();
    page.text(72.0, 720.0, 12.0, "Q3: Water boils at 100 degrees");
    page.finish();
    builder.finish().expect("fixture builds")
}

fn answer(q: &str, text: &str, correct: Option<bool>, page: u32) -> AnswerRecord {
    AnswerRecord {
        question_number: q.to_string(),
        answer_text: text.to_string(),
        correctness: Correctness::from(correct),
        location: AnswerLocation {
            page,
            bounding_box: None,
            text_spans: Vec::new(),
        },
    }
}

fn page_text(bytes: &[u8], page: usize) -> PageTextIndex {
    let mut doc = PdfDocument::from_bytes(bytes.to_vec()).expect("output reopens");
    let chars = extract_page_chars(&mut doc, page).expect("extraction works");
    PageTextIndex::new(chars)
}

#[test]
fn preserves_page_count() {
    let source = exam_fixture();
    let answers = vec![
        answer("1", "Paris", Some(false), 1),
        answer("3", "100 degrees", Some(false), 2),
    ];
    let out = create_highlighted_document(&source, &answers, false).unwrap();

    let mut doc = PdfDocument::from_bytes(out.bytes).unwrap();
    assert_eq!(doc.page_count().unwrap(), 2);
}

#[test]
fn preserves_page_count_with_no_answers() {
    let source = exam_fixture();
    let out = create_highlighted_document(&source, &[], false).unwrap();
    let mut doc = PdfDocument::from_bytes(out.bytes).unwrap();
    assert_eq!(doc.page_count().unwrap(), 2);
}

#[test]
fn errors_only_suppresses_correct_answers() {
    let source = exam_fixture();
    let answers = vec![answer("1", "Paris", Some(true), 1)];

    let out = create_highlighted_document(&source, &answers, true).unwrap();
    assert_eq!(out.report.drawn_regions, 0);
    assert_eq!(out.report.skipped.filtered, 1);

    // The output is still a complete document.
    let mut doc = PdfDocument::from_bytes(out.bytes).unwrap();
    assert_eq!(doc.page_count().unwrap(), 2);
}

#[test]
fn full_mode_never_draws_less_than_errors_only() {
    let source = exam_fixture();
    let answers = vec![
        answer("1", "Paris", Some(true), 1),
        answer("2", "Napoleon", Some(false), 1),
    ];

    let errors_only = create_highlighted_document(&source, &answers, true).unwrap();
    let full = create_highlighted_document(&source, &answers, false).unwrap();
    assert!(full.report.drawn_regions >= errors_only.report.drawn_regions);
    assert_eq!(errors_only.report.drawn_regions, 1);
    assert_eq!(full.report.drawn_regions, 2);
}

#[test]
fn unknown_answers_are_drawn_in_errors_only_mode() {
    let source = exam_fixture();
    let answers = vec![answer("2", "Napoleon", None, 1)];
    let out = create_highlighted_document(&source, &answers, true).unwrap();
    assert_eq!(out.report.drawn_regions, 1);
}

#[test]
fn blank_text_is_soft_skipped() {
    let source = exam_fixture();
    let answers = vec![answer("1", "   ", Some(false), 1)];
    let out = create_highlighted_document(&source, &answers, false).unwrap();
    assert_eq!(out.report.skipped.blank_text, 1);
    assert_eq!(out.report.drawn_regions, 0);
}

#[test]
fn out_of_bounds_page_is_soft_skipped() {
    let source = exam_fixture();
    let answers = vec![
        answer("1", "Paris", Some(false), 99),
        answer("1", "Paris", Some(false), 0),
    ];
    let out = create_highlighted_document(&source, &answers, false).unwrap();
    assert_eq!(out.report.skipped.invalid_page, 2);
    assert_eq!(out.report.drawn_regions, 0);
}

#[test]
fn unmatchable_answer_is_soft_skipped() {
    let source = exam_fixture();
    let answers = vec![answer("1", "zebra quartz", Some(false), 1)];
    let out = create_highlighted_document(&source, &answers, false).unwrap();
    assert_eq!(out.report.skipped.no_match, 1);
    assert_eq!(out.report.matched_answers, 0);
}

#[test]
fn prefix_fallback_locates_partial_text() {
    let source = exam_fixture();
    // Not on the page verbatim, but its 5-char prefix "Paris" is.
    let answers = vec![answer("1", "Paris shall be the answer", Some(false), 1)];
    let out = create_highlighted_document(&source, &answers, false).unwrap();
    assert_eq!(out.report.matched_answers, 1);
    assert!(out.report.drawn_regions >= 1);
}

#[test]
fn bounding_box_is_last_resort() {
    let source = exam_fixture();
    let mut record = answer("1", "text that appears nowhere at all", Some(false), 1);
    record.location.bounding_box = Some(BoundingBox {
        x1: 0.1,
        y1: 0.2,
        x2: 0.4,
        y2: 0.25,
    });
    let out = create_highlighted_document(&source, &[record], false).unwrap();
    assert_eq!(out.report.matched_answers, 1);
    assert_eq!(out.report.drawn_regions, 1);
    assert_eq!(out.report.skipped.no_match, 0);
}

#[test]
fn multiple_occurrences_all_marked() {
    let mut builder = DocumentBuilder::new();
    let mut page = builder.add_letter_page();
    page.text(72.0, 720.0, 12.0, "answer: yes");
    page.text(72.0, 700.0, 12.0, "confirmation: yes");
    page.finish();
    let source = builder.finish().unwrap();

    let answers = vec![answer("1", "yes", Some(false), 1)];
    let out = create_highlighted_document(&source, &answers, false).unwrap();
    assert_eq!(out.report.matched_answers, 1);
    assert_eq!(out.report.drawn_regions, 2);
}

#[test]
fn original_text_survives_highlighting() {
    let source = exam_fixture();
    let answers = vec![answer("1", "Paris", Some(false), 1)];
    let out = create_highlighted_document(&source, &answers, false).unwrap();

    let index = page_text(&out.bytes, 0);
    assert_eq!(index.find("The capital of France is Paris").len(), 1);
}

#[test]
fn overlay_stream_is_appended_to_contents() {
    let source = exam_fixture();
    let answers = vec![answer("1", "Paris", Some(false), 1)];
    let out = create_highlighted_document(&source, &answers, false).unwrap();

    let mut doc = PdfDocument::from_bytes(out.bytes).unwrap();
    // Wrapper + original + overlay.
    let page = doc.page_dict(0).unwrap();
    let contents = page.get("Contents").and_then(|c| c.as_array().cloned()).unwrap();
    assert_eq!(contents.len(), 3);

    let content = doc.page_content(0).unwrap();
    let text = String::from_utf8_lossy(&content);
    assert!(text.contains(" re"), "overlay rectangle missing");
    assert!(text.contains("1 0 0 rg"), "incorrect-answer fill color missing");
    assert!(text.contains("(Q1) Tj"), "badge label missing");
}

#[test]
fn highlighted_output_reopens_after_second_pass() {
    let source = exam_fixture();
    let answers = vec![answer("1", "Paris", Some(false), 1)];
    let first = create_highlighted_document(&source, &answers, false).unwrap();

    // Run the highlighter over its own output.
    let second =
        create_highlighted_document(&first.bytes, &[answer("2", "Napoleon", None, 1)], false)
            .unwrap();
    let mut doc = PdfDocument::from_bytes(second.bytes).unwrap();
    assert_eq!(doc.page_count().unwrap(), 2);
}

#[test]
fn unreadable_source_is_fatal() {
    let answers = vec![answer("1", "Paris", Some(false), 1)];
    assert!(create_highlighted_document(b"%FDP not a pdf", &answers, false).is_err());
}

#[test]
fn custom_padding_is_respected() {
    use redpen::HighlightConfig;

    let source = exam_fixture();
    let config = HighlightConfig {
        padding: 12.0,
        ..Default::default()
    };
    let answers = vec![answer("1", "Paris", Some(false), 1)];
    let out = Highlighter::with_config(config)
        .highlight_document(&source, &answers, false)
        .unwrap();
    assert_eq!(out.report.drawn_regions, 1);
}
