//! Document-type discriminators and their parsers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{LabscanError, Result};
use crate::models::ExtractionConfig;

use super::parser::PatternParser;
use super::rules::patterns::{
    FBC_LIBRARY, LAB_REPORT_LIBRARY, PATIENT_DETAILS_LIBRARY, PRESCRIPTION_LIBRARY,
};
use super::rules::PatternLibrary;

/// Supported document types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentFormat {
    Prescription,
    PatientDetails,
    LabReport,
    Fbc,
}

/// Discriminator lookup table.
static FORMAT_TABLE: [(&str, DocumentFormat); 4] = [
    ("prescription", DocumentFormat::Prescription),
    ("patient_details", DocumentFormat::PatientDetails),
    ("lab_report", DocumentFormat::LabReport),
    ("fbc", DocumentFormat::Fbc),
];

impl DocumentFormat {
    pub const ALL: [DocumentFormat; 4] = [
        DocumentFormat::Prescription,
        DocumentFormat::PatientDetails,
        DocumentFormat::LabReport,
        DocumentFormat::Fbc,
    ];

    /// The discriminator string.
    pub fn as_str(self) -> &'static str {
        FORMAT_TABLE
            .iter()
            .find(|(_, format)| *format == self)
            .map(|(name, _)| *name)
            .unwrap_or("unknown")
    }

    /// Human-readable name.
    pub fn description(self) -> &'static str {
        match self {
            DocumentFormat::Prescription => "Prescription",
            DocumentFormat::PatientDetails => "Patient details form",
            DocumentFormat::LabReport => "General laboratory report",
            DocumentFormat::Fbc => "Full blood count",
        }
    }

    /// The field table for this document type.
    pub fn library(self) -> &'static PatternLibrary {
        match self {
            DocumentFormat::Prescription => &PRESCRIPTION_LIBRARY,
            DocumentFormat::PatientDetails => &PATIENT_DETAILS_LIBRARY,
            DocumentFormat::LabReport => &LAB_REPORT_LIBRARY,
            DocumentFormat::Fbc => &FBC_LIBRARY,
        }
    }
}

impl FromStr for DocumentFormat {
    type Err = LabscanError;

    fn from_str(s: &str) -> Result<Self> {
        FORMAT_TABLE
            .iter()
            .find(|(name, _)| *name == s)
            .map(|(_, format)| *format)
            .ok_or_else(|| LabscanError::UnsupportedFormat(s.to_string()))
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps discriminators to configured parsers.
#[derive(Debug, Clone, Default)]
pub struct FormatRouter {
    config: ExtractionConfig,
}

impl FormatRouter {
    pub fn new(config: ExtractionConfig) -> Self {
        Self { config }
    }

    /// Parser for `discriminator`.
    ///
    /// Fails with [`LabscanError::UnsupportedFormat`] for anything outside
    /// the supported set. Matching is exact: `FBC` is not `fbc`.
    pub fn route(&self, discriminator: &str) -> Result<PatternParser> {
        let format = discriminator.parse::<DocumentFormat>()?;
        debug!("Routing '{}' to {} parser", discriminator, format.description());
        Ok(self.parser_for(format))
    }

    pub fn parser_for(&self, format: DocumentFormat) -> PatternParser {
        PatternParser::new(format).with_config(&self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::ReportParser;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_discriminators_round_trip() {
        for format in DocumentFormat::ALL {
            assert_eq!(format.as_str().parse::<DocumentFormat>().unwrap(), format);
            assert_eq!(format.library().format, format);
        }
    }

    #[test]
    fn test_unsupported_discriminator() {
        let err = FormatRouter::default().route("xray").unwrap_err();
        assert!(matches!(err, LabscanError::UnsupportedFormat(ref d) if d == "xray"));
        assert_eq!(err.to_string(), "Invalid file format: xray");
    }

    #[test]
    fn test_matching_is_exact() {
        assert!("FBC".parse::<DocumentFormat>().is_err());
        assert!(" fbc".parse::<DocumentFormat>().is_err());
        assert!("".parse::<DocumentFormat>().is_err());
    }

    #[test]
    fn test_route_returns_matching_parser() {
        let parser = FormatRouter::default().route("lab_report").unwrap();
        assert_eq!(parser.format(), DocumentFormat::LabReport);
    }

    #[test]
    fn test_serde_uses_discriminator() {
        let json = serde_json::to_string(&DocumentFormat::PatientDetails).unwrap();
        assert_eq!(json, "\"patient_details\"");
    }
}
