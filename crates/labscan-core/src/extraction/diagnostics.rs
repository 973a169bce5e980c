//! Side-channel narration of an extraction run.
//!
//! Parsers never print. They report what they see to a [`DiagnosticSink`]
//! handed in by the caller, which decides where (if anywhere) it goes.

use std::fmt;
use std::sync::Mutex;

use tracing::{debug, trace};

use super::router::DocumentFormat;

/// Target used by [`TracingSink`], so the narration can be filtered with
/// `RUST_LOG=labscan::diagnostics=trace`.
pub const DIAGNOSTICS_TARGET: &str = "labscan::diagnostics";

/// One diagnostic event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic<'a> {
    /// Text recognized on one page (1-based).
    PageText { page: usize, text: &'a str },
    /// The assembled document text.
    DocumentText { pages: usize, text: &'a str },
    ParseStarted { format: DocumentFormat, fields: usize },
    FieldMatched {
        field: &'a str,
        candidate: usize,
        value: &'a str,
        /// Occurrences rejected by the field's exclusion before the hit.
        excluded: usize,
    },
    FieldMissing { field: &'a str },
    FallbackStarted { found: usize, threshold: usize },
    FallbackHit {
        field: &'a str,
        line: usize,
        value: &'a str,
        /// False when the primary pass already set the field.
        kept: bool,
    },
    ParseFinished { format: DocumentFormat, fields: usize },
}

impl fmt::Display for Diagnostic<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::PageText { page, text } => {
                write!(f, "page {} text ({} chars)", page, text.chars().count())
            }
            Diagnostic::DocumentText { pages, text } => {
                write!(f, "document text: {} pages, {} chars", pages, text.chars().count())
            }
            Diagnostic::ParseStarted { format, fields } => {
                write!(f, "parsing {} ({} fields)", format, fields)
            }
            Diagnostic::FieldMatched {
                field,
                candidate,
                value,
                excluded,
            } => {
                write!(f, "{}: {:?} (candidate {})", field, value, candidate)?;
                if *excluded > 0 {
                    write!(f, ", {} excluded", excluded)?;
                }
                Ok(())
            }
            Diagnostic::FieldMissing { field } => write!(f, "{}: not found", field),
            Diagnostic::FallbackStarted { found, threshold } => {
                write!(f, "fallback: {} fields found, threshold {}", found, threshold)
            }
            Diagnostic::FallbackHit {
                field,
                line,
                value,
                kept,
            } => {
                let outcome = if *kept { "kept" } else { "ignored" };
                write!(f, "fallback {}: {:?} at line {} ({})", field, value, line + 1, outcome)
            }
            Diagnostic::ParseFinished { format, fields } => {
                write!(f, "parsed {}: {} fields", format, fields)
            }
        }
    }
}

/// Receiver for diagnostic events.
///
/// Sinks are shared across worker threads in batch mode.
pub trait DiagnosticSink: Send + Sync {
    fn emit(&self, event: &Diagnostic<'_>);
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for &S {
    fn emit(&self, event: &Diagnostic<'_>) {
        (**self).emit(event)
    }
}

/// Forwards events to `tracing`.
///
/// Raw page and document text go out at TRACE, everything else at DEBUG.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn emit(&self, event: &Diagnostic<'_>) {
        match event {
            Diagnostic::PageText { page, text } => {
                debug!(target: DIAGNOSTICS_TARGET, page, "{}", event);
                trace!(target: DIAGNOSTICS_TARGET, page, "\n{}", text);
            }
            Diagnostic::DocumentText { text, .. } => {
                debug!(target: DIAGNOSTICS_TARGET, "{}", event);
                trace!(target: DIAGNOSTICS_TARGET, "\n{}", text);
            }
            _ => debug!(target: DIAGNOSTICS_TARGET, "{}", event),
        }
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn emit(&self, _event: &Diagnostic<'_>) {}
}

/// Keeps rendered events in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rendered events in emission order.
    pub fn events(&self) -> Vec<String> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// Whether any recorded event starts with `prefix`.
    pub fn contains(&self, prefix: &str) -> bool {
        self.events().iter().any(|e| e.starts_with(prefix))
    }
}

impl DiagnosticSink for RecordingSink {
    fn emit(&self, event: &Diagnostic<'_>) {
        let rendered = event.to_string();
        match self.events.lock() {
            Ok(mut events) => events.push(rendered),
            Err(poisoned) => poisoned.into_inner().push(rendered),
        }
    }
}
