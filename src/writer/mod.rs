//! PDF output: object serialization, content streams, and document
//! assembly (header, body, xref table, trailer).

pub mod content_stream;
pub mod document_builder;
pub mod object_serializer;
pub mod pdf_writer;

pub use content_stream::ContentStreamBuilder;
pub use document_builder::DocumentBuilder;
pub use object_serializer::ObjectSerializer;
pub use pdf_writer::assemble_document;
