//! Table-driven report parser.

use std::time::Instant;

use tracing::{debug, info};

use crate::error::{ExtractionError, Result};
use crate::models::{ExtractionConfig, ExtractionRecord};

use super::diagnostics::{Diagnostic, DiagnosticSink};
use super::router::DocumentFormat;
use super::rules::{FieldMatcher, PatternLibrary, TabularFallbackScanner, UnitNormalizer};

/// Outcome of one parse, with bookkeeping for callers that want it.
#[derive(Debug, Clone)]
pub struct ParseReport {
    /// Extracted fields.
    pub record: ExtractionRecord,
    /// Number of fields set by the primary pass.
    pub primary_fields: usize,
    /// Whether the tabular fallback was run.
    pub fallback_ran: bool,
    /// Fields of the library that ended up absent.
    pub missing: Vec<&'static str>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Parses OCR text of one document type into a record.
pub trait ReportParser {
    /// Document type handled by this parser.
    fn format(&self) -> DocumentFormat;

    /// Parse `text`, narrating to `sink`.
    ///
    /// Missing fields are not errors. Only structurally unusable text fails.
    fn parse(&self, text: &str, sink: &dyn DiagnosticSink) -> Result<ExtractionRecord>;
}

/// Parser driven by a [`PatternLibrary`].
///
/// One instance serves one document type. Parsing is a pure function of the
/// text: repeated calls on the same input give the same record.
#[derive(Debug, Clone)]
pub struct PatternParser {
    library: &'static PatternLibrary,
    matcher: FieldMatcher,
    normalizer: UnitNormalizer,
    fallback: TabularFallbackScanner,
    /// The fallback runs when the primary pass finds fewer fields than this.
    fallback_min_fields: usize,
    fallback_enabled: bool,
}

impl PatternParser {
    /// Parser for `format` with default settings.
    pub fn new(format: DocumentFormat) -> Self {
        Self::from_library(format.library())
    }

    pub fn from_library(library: &'static PatternLibrary) -> Self {
        let defaults = ExtractionConfig::default();
        Self {
            library,
            matcher: FieldMatcher::new(),
            normalizer: UnitNormalizer::new(),
            fallback: TabularFallbackScanner::new(defaults.fallback_window),
            fallback_min_fields: defaults.fallback_min_fields,
            fallback_enabled: defaults.enable_fallback,
        }
    }

    /// Apply extraction settings.
    pub fn with_config(self, config: &ExtractionConfig) -> Self {
        let parser = self
            .with_fallback_min_fields(config.fallback_min_fields)
            .with_fallback_window(config.fallback_window);
        if config.enable_fallback {
            parser
        } else {
            parser.without_fallback()
        }
    }

    /// Set the fallback threshold.
    pub fn with_fallback_min_fields(mut self, min_fields: usize) -> Self {
        self.fallback_min_fields = min_fields;
        self
    }

    /// Set how many lines after a label line the fallback looks at.
    pub fn with_fallback_window(mut self, window: usize) -> Self {
        self.fallback = TabularFallbackScanner::new(window);
        self
    }

    /// Never run the tabular fallback.
    pub fn without_fallback(mut self) -> Self {
        self.fallback_enabled = false;
        self
    }

    pub fn library(&self) -> &'static PatternLibrary {
        self.library
    }

    /// Parse and report what happened along the way.
    pub fn parse_detailed(&self, text: &str, sink: &dyn DiagnosticSink) -> Result<ParseReport> {
        let start = Instant::now();
        let format = self.library.format;

        if let Some(offset) = text.find('\0') {
            return Err(ExtractionError::BinaryContent(offset).into());
        }

        sink.emit(&Diagnostic::ParseStarted {
            format,
            fields: self.library.fields.len(),
        });

        let mut record = ExtractionRecord::new();
        let mut missing = Vec::new();

        for spec in &self.library.fields {
            let Some(found) = self.matcher.find(text, spec) else {
                sink.emit(&Diagnostic::FieldMissing { field: spec.name });
                missing.push(spec.name);
                continue;
            };

            let value = match spec.unit {
                Some(unit) => self.normalizer.normalize(&found.value, unit),
                None => found.value,
            };
            sink.emit(&Diagnostic::FieldMatched {
                field: spec.name,
                candidate: found.candidate,
                value: &value,
                excluded: found.excluded,
            });
            record.insert(spec.name, value);
        }

        let primary_fields = record.len();
        let fallback_ran = self.fallback_enabled
            && self.library.has_fallback()
            && primary_fields < self.fallback_min_fields;

        if fallback_ran {
            debug!(
                "{}: primary pass found {} fields, running tabular fallback",
                format, primary_fields
            );
            sink.emit(&Diagnostic::FallbackStarted {
                found: primary_fields,
                threshold: self.fallback_min_fields,
            });

            for hit in self.fallback.scan(text, &self.library.fallback_labels) {
                let kept = record.insert(hit.field, hit.value.clone());
                sink.emit(&Diagnostic::FallbackHit {
                    field: hit.field,
                    line: hit.label_line,
                    value: &hit.value,
                    kept,
                });
                if kept {
                    missing.retain(|name| *name != hit.field);
                }
            }
        }

        sink.emit(&Diagnostic::ParseFinished {
            format,
            fields: record.len(),
        });

        let processing_time_ms = start.elapsed().as_millis() as u64;
        info!(
            "Parsed {} document: {} fields in {}ms",
            format,
            record.len(),
            processing_time_ms
        );

        Ok(ParseReport {
            record,
            primary_fields,
            fallback_ran,
            missing,
            processing_time_ms,
        })
    }
}

impl ReportParser for PatternParser {
    fn format(&self) -> DocumentFormat {
        self.library.format
    }

    fn parse(&self, text: &str, sink: &dyn DiagnosticSink) -> Result<ExtractionRecord> {
        self.parse_detailed(text, sink).map(|report| report.record)
    }
}
