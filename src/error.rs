//! Error types for pdf-outline.

use std::io;
use thiserror::Error;

/// Result type alias for pdf-outline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while extracting an outline.
///
/// The outline pipeline itself is total over well-formed fragments; every
/// failure comes from reading the document or from the surrounding I/O.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The document reader could not produce a fragment stream.
    #[error("Unreadable document: {0}")]
    UnreadableDocument(String),

    /// Outline options failed validation.
    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    /// Error while rendering a result (JSON, Markdown).
    #[error("Rendering error: {0}")]
    Render(String),
}

impl Error {
    /// Whether this error means the input document could not be read.
    pub fn is_unreadable_document(&self) -> bool {
        matches!(self, Error::UnreadableDocument(_))
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => {
                Error::UnreadableDocument("document is encrypted".to_string())
            }
            _ => Error::UnreadableDocument(err.to_string()),
        }
    }
}
