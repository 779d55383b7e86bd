//! Error types for the docstruct library.

use std::io;
use thiserror::Error;

/// Result type alias for docstruct operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while inferring document structure.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The layout collaborator could not open or decode the document.
    #[error("failed to open or read PDF: {0}")]
    Open(String),

    /// The document has zero pages.
    #[error("empty or invalid PDF")]
    EmptyDocument,

    /// Style profiling found no text spans anywhere in the document.
    #[error("PDF contains no text content")]
    NoTextContent,

    /// An unexpected condition during the title or heading passes.
    #[error("failed during content extraction: {0}")]
    Extraction(String),

    /// Error serializing the output record.
    #[error("rendering error: {0}")]
    Render(String),
}

impl Error {
    /// Render this error as the degraded title string of an error-shaped
    /// output record. The outline of such a record is always empty.
    pub fn as_record_title(&self) -> String {
        match self {
            Error::Io(e) => format!("Error: Failed to open or read PDF: {}", e),
            Error::Open(msg) => format!("Error: Failed to open or read PDF: {}", msg),
            Error::EmptyDocument => "Error: Empty or invalid PDF.".to_string(),
            Error::NoTextContent => "Error: PDF contains no text content.".to_string(),
            Error::Extraction(msg) => {
                format!("Error: Failed during content extraction: {}", msg)
            }
            Error::Render(msg) => format!("Error: Failed during content extraction: {}", msg),
        }
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        Error::Open(err.to_string())
    }
}
