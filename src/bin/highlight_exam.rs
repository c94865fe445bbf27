//! Highlight a student's answers on their exam PDF.
//!
//! Usage:
//!   cargo run --bin highlight_exam -- <exam.pdf> <student.json> <out.pdf>
//!   cargo run --bin highlight_exam -- <exam.pdf> <student.json> <out.pdf> --all

use redpen::{Highlighter, StudentExam};
use std::path::PathBuf;
use std::process::ExitCode;

struct Args {
    exam_pdf: PathBuf,
    student_json: PathBuf,
    output_pdf: PathBuf,
    errors_only: bool,
}

impl Args {
    fn from_env() -> Option<Self> {
        let mut positional = Vec::new();
        let mut errors_only = true;

        for arg in std::env::args().skip(1) {
            match arg.as_str() {
                "--all" => errors_only = false,
                "--errors-only" => errors_only = true,
                _ => positional.push(PathBuf::from(arg)),
            }
        }

        let [exam_pdf, student_json, output_pdf] = <[PathBuf; 3]>::try_from(positional).ok()?;
        Some(Self {
            exam_pdf,
            student_json,
            output_pdf,
            errors_only,
        })
    }
}

fn main() -> ExitCode {
    env_logger::init();

    let Some(args) = Args::from_env() else {
        eprintln!("usage: highlight_exam <exam.pdf> <student.json> <out.pdf> [--all]");
        return ExitCode::from(2);
    };

    let source = match std::fs::read(&args.exam_pdf) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("error: cannot read {}: {}", args.exam_pdf.display(), e);
            return ExitCode::FAILURE;
        },
    };

    let exam = match StudentExam::load(&args.student_json) {
        Ok(exam) => exam,
        Err(e) => {
            eprintln!("error: cannot load {}: {}", args.student_json.display(), e);
            return ExitCode::FAILURE;
        },
    };

    let answers = exam.to_highlight_inputs();
    let result = Highlighter::new().highlight_document(&source, &answers, args.errors_only);

    match result {
        Ok(highlighted) => {
            if let Err(e) = std::fs::write(&args.output_pdf, &highlighted.bytes) {
                eprintln!("error: cannot write {}: {}", args.output_pdf.display(), e);
                return ExitCode::FAILURE;
            }
            let report = highlighted.report;
            println!(
                "{}: {} regions drawn for {}/{} answers",
                args.output_pdf.display(),
                report.drawn_regions,
                report.matched_answers,
                report.total_answers
            );
            println!(
                "skipped: {} filtered, {} blank, {} bad page, {} unmatched",
                report.skipped.filtered,
                report.skipped.blank_text,
                report.skipped.invalid_page,
                report.skipped.no_match
            );
            ExitCode::SUCCESS
        },
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        },
    }
}
