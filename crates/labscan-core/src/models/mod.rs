//! Data models: configuration, documents, and extraction records.

pub mod config;
pub mod record;

pub use config::{ExtractionConfig, LabscanConfig, OcrConfig, PdfConfig};
pub use record::{Document, ExtractionRecord};
