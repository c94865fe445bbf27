//! Content stream parsing.
//!
//! Content streams hold the page's drawing program: postfix operators
//! whose operands come first. Only the text and state operators the
//! extractor consumes are modelled explicitly; everything else is kept
//! as a raw marker so the stream walk never derails.

pub mod operators;
pub mod parser;

pub use operators::{Operator, TextElement};
pub use parser::parse_content_stream;
