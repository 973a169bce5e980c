//! Rendering of extraction results.

use labscan_core::{ExtractionOutcome, ExtractionRecord};

/// Output format of a successful extraction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON object of field -> value
    Json,
    /// Two-column CSV (field,value)
    Csv,
    /// One "Field: value" line per field
    Text,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

/// Render an outcome.
///
/// Failures are always the JSON error object, whatever the format, so that
/// callers parsing stdout see one shape for errors.
pub fn render(outcome: &ExtractionOutcome, format: OutputFormat, pretty: bool) -> anyhow::Result<String> {
    match (outcome, format) {
        (ExtractionOutcome::Success(record), OutputFormat::Csv) => record_to_csv(record),
        (ExtractionOutcome::Success(record), OutputFormat::Text) => Ok(record_to_text(record)),
        _ if pretty => Ok(outcome.to_json_pretty()?),
        _ => Ok(outcome.to_json()?),
    }
}

pub fn record_to_csv(record: &ExtractionRecord) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["field", "value"])?;
    for (field, value) in record.iter() {
        wtr.write_record([field, value])?;
    }
    Ok(String::from_utf8(wtr.into_inner()?)?)
}

pub fn record_to_text(record: &ExtractionRecord) -> String {
    let width = record.field_names().map(str::len).max().unwrap_or(0);
    record
        .iter()
        .map(|(field, value)| format!("{:<width$}  {}\n", format!("{}:", field), value, width = width + 1))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ExtractionRecord {
        let mut record = ExtractionRecord::new();
        record.insert("Patient", "Doe, Jane");
        record.insert("RBC", "4.8 x 10^12/L");
        record
    }

    #[test]
    fn test_csv_quotes_values() {
        assert_eq!(
            record_to_csv(&record()).unwrap(),
            "field,value\nPatient,\"Doe, Jane\"\nRBC,4.8 x 10^12/L\n"
        );
    }

    #[test]
    fn test_text_aligns_values() {
        assert_eq!(
            record_to_text(&record()),
            "Patient:  Doe, Jane\nRBC:      4.8 x 10^12/L\n"
        );
    }

    #[test]
    fn test_failure_is_json_in_every_format() {
        let outcome = ExtractionOutcome::Failure(labscan_core::ErrorPayload {
            error: "Extraction failed: Invalid file format: xray".to_string(),
        });
        for format in [OutputFormat::Json, OutputFormat::Csv, OutputFormat::Text] {
            assert_eq!(
                render(&outcome, format, false).unwrap(),
                r#"{"error":"Extraction failed: Invalid file format: xray"}"#
            );
        }
    }
}
