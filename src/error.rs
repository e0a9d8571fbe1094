//! Error types for pdfdeck.

use std::io;
use thiserror::Error;

/// Result type alias for pdfdeck operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while extracting, editing or exporting.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input is not recognized as a PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF version is not supported.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// The PDF document is encrypted.
    #[error("Document is encrypted")]
    Encrypted,

    /// A glyph run is missing geometry or carries non-finite values.
    #[error("Malformed glyph run {index} on page {page}: {reason}")]
    MalformedGlyphRun {
        page: u32,
        index: usize,
        reason: String,
    },

    /// A page is too large to rasterize.
    #[error("Page bitmap of {width}x{height} pixels exceeds the rasterizer limit")]
    CanvasTooLarge { width: u32, height: u32 },

    /// A page bitmap could not be encoded.
    #[error("Image encoding error: {0}")]
    ImageEncode(String),

    /// Page number is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(u32, u32),

    /// Invalid page range specification.
    #[error("Invalid page range: {0}")]
    InvalidPageRange(String),

    /// Export was requested with no content.
    #[error("Nothing to export: {0}")]
    EmptyInput(String),

    /// Error writing the presentation archive.
    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// A remote service could not be reached or answered badly.
    #[error("Network error: {0}")]
    Network(String),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

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

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::ImageEncode(err.to_string())
    }
}

#[cfg(feature = "network")]
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Network(err.to_string())
    }
}
