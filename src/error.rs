//! Error types for the readability library

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the readability library
#[derive(Error, Debug)]
pub enum Error {
    /// Input bytes are not a readable PDF, or the PDF has no pages
    #[error("Failed to parse PDF: {0}")]
    DocumentParse(String),

    /// Color is not exactly six hex digits
    #[error("Invalid color {input:?}: expected 6 hex digits such as F7F1E4")]
    InvalidColor { input: String },

    /// A page's MediaBox cannot be used to size its background
    #[error("Cannot compose background for page {page}: {reason}")]
    PageComposition { page: u32, reason: String },

    /// Downloading a remote PDF failed
    #[error("Failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// PDF object access error
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Invalid glob pattern
    #[error("Invalid glob pattern: {0}")]
    InvalidGlob(String),

    /// No files matched pattern
    #[error("No PDF files found matching pattern: {0}")]
    NoFilesMatched(String),

    /// General error
    #[error("{0}")]
    General(String),
}
