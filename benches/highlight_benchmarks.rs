//! Full-pipeline benchmark: build a fixture exam, then locate and
//! highlight a batch of answers.

use criterion::{criterion_group, criterion_main, Criterion};
use redpen::{
    create_highlighted_document, AnswerLocation, AnswerRecord, Correctness, DocumentBuilder,
};

fn fixture(pages: usize) -> Vec<u8> {
    let mut builder = DocumentBuilder::new();
    for p in 0..pages {
        let mut page = builder.add_letter_page();
        for line in 0..20 {
            let y = 740.0 - line as f32 * 24.0;
            page.text(
                72.0,
                y,
                11.0,
                &format!("Page {} line {} with some answer text", p + 1, line),
            );
        }
        page.finish();
    }
    builder.finish().expect("fixture builds")
}

fn answers(pages: usize) -> Vec<AnswerRecord> {
    (0..pages)
        .flat_map(|p| {
            (0..5).map(move |q| AnswerRecord {
                question_number: format!("{}", p * 5 + q + 1),
                answer_text: format!("line {} with some", q * 3),
                correctness: if q % 2 == 0 {
                    Correctness::Incorrect
                } else {
                    Correctness::Correct
                },
                location: AnswerLocation {
                    page: p as u32 + 1,
                    bounding_box: None,
                    text_spans: Vec::new(),
                },
            })
        })
        .collect()
}

fn bench_highlight(c: &mut Criterion) {
    let source = fixture(4);
    let records = answers(4);

    c.bench_function("highlight_4_pages_20_answers", |b| {
        b.iter(|| create_highlighted_document(&source, &records, false).unwrap())
    });
}

criterion_group!(benches, bench_highlight);
criterion_main!(benches);
