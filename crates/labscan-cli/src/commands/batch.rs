//! Batch command - extract fields from many documents in parallel.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use labscan_core::source::InputKind;
use labscan_core::{extract_file, DocumentFormat, ExtractionOutcome, LabscanConfig, TracingSink};

use super::output::{render, OutputFormat};
use super::{load_ocr_backend, needs_ocr};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern of input files
    #[arg(required = true)]
    input: String,

    /// Document type shared by all inputs
    #[arg(required = true, value_name = "FORMAT")]
    document_type: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Number of parallel workers
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Result of processing a single file.
struct FileResult {
    path: PathBuf,
    outcome: ExtractionOutcome,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config: &LabscanConfig) -> anyhow::Result<ExitCode> {
    let start = Instant::now();

    // Fail fast on a bad document type instead of once per file.
    let format: DocumentFormat = args.document_type.parse()?;

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| InputKind::from_path(p).is_some())
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process as {}",
        style("ℹ").blue(),
        files.len(),
        format
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let progress = ProgressBar::new(files.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let stop = Arc::new(AtomicBool::new(false));
    let chunk_size = files.len().div_ceil(args.jobs.max(1));
    let mut workers = Vec::new();

    for chunk in files.chunks(chunk_size) {
        let worker = Worker {
            files: chunk.to_vec(),
            document_type: args.document_type.clone(),
            config: config.clone(),
            stop: Arc::clone(&stop),
            continue_on_error: args.continue_on_error,
            progress: progress.clone(),
        };
        workers.push(tokio::task::spawn_blocking(move || worker.run()));
    }

    let mut results = Vec::with_capacity(files.len());
    for worker in workers {
        results.extend(worker.await?);
    }
    progress.finish_and_clear();

    if let Some(ref output_dir) = args.output_dir {
        for result in &results {
            write_output(output_dir, result, args.format)?;
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let failed: Vec<_> = results.iter().filter(|r| !r.outcome.is_success()).collect();

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(results.len() - failed.len()).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!("  - {}: {}", result.path.display(), error_message(&result.outcome));
        }
        if !args.continue_on_error {
            anyhow::bail!("Processing failed: {}", error_message(&failed[0].outcome));
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// One job slot: a share of the inputs and its own OCR backend.
struct Worker {
    files: Vec<PathBuf>,
    document_type: String,
    config: LabscanConfig,
    stop: Arc<AtomicBool>,
    continue_on_error: bool,
    progress: ProgressBar,
}

impl Worker {
    fn run(self) -> Vec<FileResult> {
        let backend = if self.files.iter().any(|p| needs_ocr(p)) {
            load_ocr_backend(&self.config.ocr).unwrap_or_else(|e| {
                warn!("Failed to load OCR models: {}", e);
                None
            })
        } else {
            None
        };

        let mut results = Vec::with_capacity(self.files.len());
        for path in self.files {
            if self.stop.load(Ordering::Relaxed) {
                break;
            }

            let file_start = Instant::now();
            let outcome = ExtractionOutcome::from(extract_file(
                &path,
                &self.document_type,
                &self.config,
                backend.as_deref(),
                &TracingSink,
            ));
            let processing_time_ms = file_start.elapsed().as_millis() as u64;

            if !outcome.is_success() {
                if self.continue_on_error {
                    warn!("Failed to process {}: {}", path.display(), error_message(&outcome));
                } else {
                    error!("Failed to process {}: {}", path.display(), error_message(&outcome));
                    self.stop.store(true, Ordering::Relaxed);
                }
            }

            results.push(FileResult {
                path,
                outcome,
                processing_time_ms,
            });
            self.progress.inc(1);
        }
        results
    }
}

fn error_message(outcome: &ExtractionOutcome) -> &str {
    match outcome {
        ExtractionOutcome::Failure(payload) => &payload.error,
        ExtractionOutcome::Success(_) => "",
    }
}

fn output_stem(path: &Path) -> &str {
    path.file_stem().and_then(|s| s.to_str()).unwrap_or("document")
}

/// Write a per-file result; failures are written as JSON error objects.
fn write_output(output_dir: &Path, result: &FileResult, format: OutputFormat) -> anyhow::Result<()> {
    let format = if result.outcome.is_success() {
        format
    } else {
        OutputFormat::Json
    };
    let output_path = output_dir.join(format!("{}.{}", output_stem(&result.path), format.extension()));

    fs::write(&output_path, render(&result.outcome, format, true)?)?;
    debug!("Wrote output to {}", output_path.display());
    Ok(())
}

fn write_summary(path: &Path, results: &[FileResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record(["filename", "status", "field_count", "fields", "processing_time_ms", "error"])?;

    for result in results {
        let filename = result.path.file_name().and_then(|s| s.to_str()).unwrap_or("");
        let time = result.processing_time_ms.to_string();

        match &result.outcome {
            ExtractionOutcome::Success(record) => {
                let fields = record.field_names().collect::<Vec<_>>().join(";");
                wtr.write_record([
                    filename,
                    "success",
                    &record.len().to_string(),
                    &fields,
                    &time,
                    "",
                ])?;
            }
            ExtractionOutcome::Failure(payload) => {
                wtr.write_record([filename, "error", "0", "", &time, &payload.error])?;
            }
        }
    }

    wtr.flush()?;
    Ok(())
}
