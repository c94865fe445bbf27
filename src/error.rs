//! Error types for the exam-highlighting library.
//!
//! Document-level failures (cannot open, cannot render) are fatal for a
//! call and surface here. Per-answer conditions (invalid page, no match,
//! blank text) are soft skips counted in the highlight report instead.

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while reading, searching or rewriting a PDF.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid PDF header (expected '%PDF-')
    #[error("Invalid PDF header: expected '%PDF-', found '{0}'")]
    InvalidHeader(String),

    /// Parse error at specific byte offset
    #[error("Failed to parse object at byte {offset}: {reason}")]
    ParseError {
        /// Byte offset where error occurred
        offset: usize,
        /// Reason for parse failure
        reason: String,
    },

    /// Invalid cross-reference table
    #[error("Invalid cross-reference table")]
    InvalidXref,

    /// Referenced object not found in cross-reference table
    #[error("Object not found: {0} {1} R")]
    ObjectNotFound(u32, u16),

    /// Object has wrong type
    #[error("Invalid object type: expected {expected}, found {found}")]
    InvalidObjectType {
        /// Expected object type
        expected: String,
        /// Actual object type found
        found: String,
    },

    /// Unexpected end of file
    #[error("End of file reached unexpectedly")]
    UnexpectedEof,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid PDF structure (generic)
    #[error("Invalid PDF: {0}")]
    InvalidPdf(String),

    /// Stream decoding error
    #[error("Stream decoding error: {0}")]
    Decode(String),

    /// Unsupported stream filter
    #[error("Unsupported filter: {0}")]
    UnsupportedFilter(String),

    /// Unsupported feature
    #[error("Unsupported feature: {0}")]
    Unsupported(String),

    /// Page index outside the document's page range
    #[error("Page {page} out of bounds (document has {count} pages)")]
    PageOutOfBounds {
        /// Requested 0-indexed page
        page: usize,
        /// Number of pages in the document
        count: usize,
    },

    /// Failure while assembling or serializing the output document
    #[error("Render error: {0}")]
    Render(String),

    /// Image decoding or encoding error
    #[error("Image error: {0}")]
    Image(String),

    /// Malformed persisted record (student exam / answer key JSON)
    #[error("Record error: {0}")]
    Record(String),
}
