//! Error types for bankstmt.

use std::io;
use thiserror::Error;

/// Result type alias for bankstmt operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a statement extraction run.
///
/// Only structurally fatal conditions are represented here. Per-cell
/// anomalies (an unparsable amount, a malformed date) never become an
/// `Error`: they degrade to zero or are dropped by the validator.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading the statement or a config file.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF version header is malformed.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// lopdf could not parse the document structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// The PDF document is encrypted.
    #[error("Statement PDF is encrypted")]
    Encrypted,

    /// A page's content stream could not be turned into text fragments.
    #[error("Text extraction error: {0}")]
    TextExtract(String),

    /// Requested page is beyond the last page.
    #[error("Page {0} does not exist (statement has {1} pages)")]
    PageOutOfRange(u32, u32),

    /// Invalid page range string.
    #[error("Invalid page range: {0}")]
    InvalidPageRange(String),

    /// Invalid engine configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error while rendering records (JSON, text).
    #[error("Output error: {0}")]
    Render(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Encrypted;
        assert_eq!(err.to_string(), "Statement PDF is encrypted");

        let err = Error::PageOutOfRange(4, 2);
        assert_eq!(
            err.to_string(),
            "Page 4 does not exist (statement has 2 pages)"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "statement.pdf");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_json_error_becomes_config_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{ nope").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Config(_)));
    }
}
