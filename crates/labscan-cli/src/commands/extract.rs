//! Extract command - fields from one scanned document.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::debug;

use labscan_core::{
    extract_file, DocumentFormat, ExtractionFailed, ExtractionOutcome, ExtractionRecord,
    LabscanConfig, TracingSink,
};

use super::output::{render, OutputFormat};
use super::{load_ocr_backend, needs_ocr};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input file (PDF, image, or OCR'd text)
    #[arg(required = true)]
    file: PathBuf,

    /// Document type: prescription, patient_details, lab_report or fbc
    #[arg(required = true, value_name = "FORMAT")]
    document_type: String,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Pretty-print JSON
    #[arg(long)]
    pretty: bool,
}

pub async fn run(args: ExtractArgs, config: &LabscanConfig) -> anyhow::Result<ExitCode> {
    let start = Instant::now();

    let outcome = ExtractionOutcome::from(extract(&args, config));
    let rendered = render(&outcome, args.format, args.pretty)?;

    match (&outcome, &args.output) {
        (ExtractionOutcome::Success(_), Some(path)) => {
            fs::write(path, &rendered)?;
            eprintln!("{} Output written to {}", style("✓").green(), path.display());
        }
        _ => println!("{}", rendered.trim_end()),
    }

    debug!("Total processing time: {:?}", start.elapsed());
    Ok(ExitCode::from(outcome.exit_code()))
}

fn extract(args: &ExtractArgs, config: &LabscanConfig) -> Result<ExtractionRecord, ExtractionFailed> {
    // Reject unknown document types before loading any models.
    args.document_type.parse::<DocumentFormat>()?;

    let backend = if needs_ocr(&args.file) {
        load_ocr_backend(&config.ocr)?
    } else {
        None
    };

    extract_file(
        &args.file,
        &args.document_type,
        config,
        backend.as_deref(),
        &TracingSink,
    )
}
