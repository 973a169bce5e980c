//! Core library for clinical document field extraction.
//!
//! This crate provides:
//! - Pattern libraries for prescriptions, patient details forms, general
//!   lab reports and full blood counts
//! - First-match field matching with exclusion rules and unit normalization
//! - A line-proximity fallback for tabular lab layouts
//! - PDF and image input, with OCR through a pluggable backend

pub mod error;
pub mod extraction;
pub mod models;
pub mod ocr;
pub mod pdf;
pub mod pipeline;
pub mod source;

pub use error::{ExtractionFailed, LabscanError, Result};
pub use extraction::{
    Diagnostic, DiagnosticSink, DocumentFormat, FormatRouter, NullSink, ParseReport, PatternParser,
    RecordingSink, ReportParser, TracingSink,
};
pub use models::{Document, ExtractionConfig, ExtractionRecord, LabscanConfig};
pub use ocr::OcrBackend;
#[cfg(feature = "native")]
pub use ocr::PureOcrEngine;
pub use pipeline::{extract_file, extract_text, ErrorPayload, ExtractionOutcome};
pub use source::DocumentLoader;
