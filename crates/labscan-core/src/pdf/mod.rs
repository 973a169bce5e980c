//! PDF input: embedded text and scanned page images.

mod extractor;

pub use extractor::PdfExtractor;

use crate::error::PdfError;

/// What a loaded PDF mostly consists of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdfKind {
    /// Carries enough embedded text to skip OCR.
    Text,
    /// Scanned pages; text has to be recognized from images.
    Scanned,
}

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;
