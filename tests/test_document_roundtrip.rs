//! Reader/writer round trips over generated documents.

use redpen::document::PdfDocument;
use redpen::extractors::extract_page_chars;
use redpen::search::PageTextIndex;
use redpen::writer::document_builder::BuilderConfig;
use redpen::DocumentBuilder;

#[test]
fn built_document_reports_its_shape() {
    let mut builder = DocumentBuilder::new();
    let mut page = builder.add_page(400.0, 500.0);
    page.text(50.0, 450.0, 10.0, "small page");
    page.finish();
    let bytes = builder.finish().unwrap();

    let mut doc = PdfDocument::from_bytes(bytes).unwrap();
    assert_eq!(doc.version(), (1, 7));
    assert_eq!(doc.page_count().unwrap(), 1);
    assert_eq!(doc.page_media_box(0).unwrap(), [0.0, 0.0, 400.0, 500.0]);
}

#[test]
fn text_positions_follow_baselines() {
    let mut builder = DocumentBuilder::new();
    let mut page = builder.add_letter_page();
    page.text(100.0, 700.0, 12.0, "upper line");
    page.text(100.0, 600.0, 12.0, "lower line");
    page.finish();
    let bytes = builder.finish().unwrap();

    let mut doc = PdfDocument::from_bytes(bytes).unwrap();
    let chars = extract_page_chars(&mut doc, 0).unwrap();
    let index = PageTextIndex::new(chars);

    let upper = &index.find("upper line")[0].rects[0];
    let lower = &index.find("lower line")[0].rects[0];
    assert!(upper.y < lower.y, "top-down coordinates expected");
    assert!((lower.y - upper.y - 100.0).abs() < 0.5);
    assert!((upper.x - 100.0).abs() < 0.5);
}

#[test]
fn compressed_and_plain_extract_identically() {
    let build = |compress: bool| {
        let mut builder = DocumentBuilder::with_config(BuilderConfig {
            compress,
            ..Default::default()
        });
        let mut page = builder.add_letter_page();
        page.text(72.0, 720.0, 11.0, "identical content");
        page.finish();
        builder.finish().unwrap()
    };

    for bytes in [build(false), build(true)] {
        let mut doc = PdfDocument::from_bytes(bytes).unwrap();
        let chars = extract_page_chars(&mut doc, 0).unwrap();
        assert_eq!(PageTextIndex::new(chars).find("identical content").len(), 1);
    }
}

#[test]
fn builder_output_survives_save_and_open() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fixture.pdf");

    let mut builder = DocumentBuilder::new();
    let mut page = builder.add_letter_page();
    page.text(72.0, 720.0, 12.0, "saved to disk");
    page.finish();
    builder.save(&path).unwrap();

    let mut doc = PdfDocument::open(&path).unwrap();
    assert_eq!(doc.page_count().unwrap(), 1);
}

#[test]
fn missing_file_is_io_error() {
    match PdfDocument::open("/definitely/not/here.pdf") {
        Err(redpen::Error::Io(_)) => {},
        other => panic!("expected Io error, got {:?}", other.map(|_| ())),
    }
}
