//! Field extraction from OCR text of clinical documents.

pub mod diagnostics;
mod parser;
pub mod router;
pub mod rules;

pub use diagnostics::{Diagnostic, DiagnosticSink, NullSink, RecordingSink, TracingSink};
pub use parser::{ParseReport, PatternParser, ReportParser};
pub use router::{DocumentFormat, FormatRouter};
