//! Error types for the labscan-core library.

use thiserror::Error;

/// Main error type for the labscan library.
#[derive(Error, Debug)]
pub enum LabscanError {
    /// The document-type discriminator is not one of the supported formats.
    #[error("Invalid file format: {0}")]
    UnsupportedFormat(String),

    /// The document text itself is structurally unusable.
    #[error("{0}")]
    Extraction(#[from] ExtractionError),

    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// OCR processing error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Image decoding error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl LabscanError {
    /// Whether the failure came from the rendering/OCR collaborators rather
    /// than from the extraction core.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            LabscanError::Pdf(_) | LabscanError::Ocr(_) | LabscanError::Image(_) | LabscanError::Io(_)
        )
    }
}

/// Document-level failure handed to the caller.
///
/// Every failure, whatever its origin, is reported with the same prefix so
/// the boundary can surface it verbatim.
#[derive(Error, Debug)]
#[error("Extraction failed: {source}")]
pub struct ExtractionFailed {
    #[from]
    source: LabscanError,
}

impl ExtractionFailed {
    /// The underlying cause.
    pub fn cause(&self) -> &LabscanError {
        &self.source
    }
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// Failed to extract images from PDF.
    #[error("failed to extract images: {0}")]
    ImageExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),
}

/// Errors related to OCR processing.
#[derive(Error, Debug)]
pub enum OcrError {
    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Text recognition failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// OCR is required for this document but no backend is configured.
    #[error("no OCR backend available for {0}")]
    Unavailable(String),
}

/// Structural failures of the document text.
///
/// A field that cannot be found is not an error; it is simply absent from
/// the record.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ExtractionError {
    /// The text contains NUL bytes, i.e. binary content was fed in as text.
    #[error("malformed input: text contains binary data at byte {0}")]
    BinaryContent(usize),

    /// The input file type is not one the loader understands.
    #[error("unsupported input file: {0}")]
    UnsupportedInput(String),
}

/// Result type for the labscan library.
pub type Result<T> = std::result::Result<T, LabscanError>;
