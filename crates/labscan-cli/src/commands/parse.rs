//! Parse command - fields from text that has already been recognized.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Args;
use console::style;

use labscan_core::{
    ExtractionFailed, ExtractionOutcome, FormatRouter, LabscanConfig, LabscanError, ParseReport,
    TracingSink,
};

use super::output::{render, OutputFormat};

/// Arguments for the parse command.
#[derive(Args)]
pub struct ParseArgs {
    /// Document type: prescription, patient_details, lab_report or fbc
    #[arg(required = true, value_name = "FORMAT")]
    document_type: String,

    /// Text file to parse ("-" or nothing reads stdin)
    input: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Pretty-print JSON
    #[arg(long)]
    pretty: bool,

    /// Report fallback use and missing fields on stderr
    #[arg(long)]
    report: bool,
}

pub async fn run(args: ParseArgs, config: &LabscanConfig) -> anyhow::Result<ExitCode> {
    let result = parse(&args, config);

    if let (Ok(report), true) = (&result, args.report) {
        print_report(report);
    }

    let outcome = ExtractionOutcome::from(result.map(|report| report.record));
    println!("{}", render(&outcome, args.format, args.pretty)?.trim_end());
    Ok(ExitCode::from(outcome.exit_code()))
}

fn parse(args: &ParseArgs, config: &LabscanConfig) -> Result<ParseReport, ExtractionFailed> {
    let parser = FormatRouter::new(config.extraction.clone()).route(&args.document_type)?;
    let text = read_input(args.input.as_deref()).map_err(LabscanError::from)?;
    Ok(parser.parse_detailed(&text, &TracingSink)?)
}

fn read_input(path: Option<&Path>) -> std::io::Result<String> {
    match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path),
        _ => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

fn print_report(report: &ParseReport) {
    eprintln!(
        "{} {} fields ({} from the primary pass) in {}ms",
        style("ℹ").blue(),
        report.record.len(),
        report.primary_fields,
        report.processing_time_ms
    );
    if report.fallback_ran {
        eprintln!("{} Tabular fallback was used", style("ℹ").blue());
    }
    if !report.missing.is_empty() {
        eprintln!("{} Missing: {}", style("!").yellow(), report.missing.join(", "));
    }
}
