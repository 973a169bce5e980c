//! End-to-end extraction: route, load, parse, and assemble the result.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::ExtractionFailed;
use crate::extraction::{DiagnosticSink, FormatRouter, ReportParser};
use crate::models::{ExtractionConfig, ExtractionRecord, LabscanConfig};
use crate::ocr::OcrBackend;
use crate::source::DocumentLoader;

/// Extract a record from an input file.
///
/// The discriminator is checked before the file is touched, so an
/// unsupported format never costs an OCR run. Failures of any stage come
/// back as one [`ExtractionFailed`], with no partial record.
pub fn extract_file(
    path: &Path,
    discriminator: &str,
    config: &LabscanConfig,
    ocr: Option<&dyn OcrBackend>,
    sink: &dyn DiagnosticSink,
) -> Result<ExtractionRecord, ExtractionFailed> {
    let run = || {
        let parser = FormatRouter::new(config.extraction.clone()).route(discriminator)?;

        let mut loader = DocumentLoader::new(config.pdf.clone());
        if let Some(backend) = ocr {
            loader = loader.with_ocr(backend);
        }
        let document = loader.load(path, sink)?;

        parser.parse(&document.text, sink)
    };

    run().map_err(|e| {
        error!("Extraction of {} failed: {}", path.display(), e);
        ExtractionFailed::from(e)
    })
}

/// Extract a record from text that has already been recognized.
pub fn extract_text(
    text: &str,
    discriminator: &str,
    config: &ExtractionConfig,
    sink: &dyn DiagnosticSink,
) -> Result<ExtractionRecord, ExtractionFailed> {
    let parser = FormatRouter::new(config.clone()).route(discriminator)?;
    let record = parser.parse(text, sink)?;
    debug!("Extracted {} fields", record.len());
    Ok(record)
}

/// Error object handed to the caller on failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub error: String,
}

/// Terminal artifact of one extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionOutcome {
    Success(ExtractionRecord),
    Failure(ErrorPayload),
}

impl From<Result<ExtractionRecord, ExtractionFailed>> for ExtractionOutcome {
    fn from(result: Result<ExtractionRecord, ExtractionFailed>) -> Self {
        match result {
            Ok(record) => ExtractionOutcome::Success(record),
            Err(e) => ExtractionOutcome::Failure(ErrorPayload {
                error: e.to_string(),
            }),
        }
    }
}

impl ExtractionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ExtractionOutcome::Success(_))
    }

    /// Process exit status for this outcome.
    pub fn exit_code(&self) -> u8 {
        match self {
            ExtractionOutcome::Success(_) => 0,
            ExtractionOutcome::Failure(_) => 1,
        }
    }

    /// Compact JSON: the record object or `{"error": ...}`.
    pub fn to_json(&self) -> serde_json::Result<String> {
        match self {
            ExtractionOutcome::Success(record) => serde_json::to_string(record),
            ExtractionOutcome::Failure(payload) => serde_json::to_string(payload),
        }
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        match self {
            ExtractionOutcome::Success(record) => serde_json::to_string_pretty(record),
            ExtractionOutcome::Failure(payload) => serde_json::to_string_pretty(payload),
        }
    }
}
