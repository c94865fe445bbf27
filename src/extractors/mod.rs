//! Extraction of positioned page content.

pub mod text;

pub use text::{extract_page_chars, TextChar};
