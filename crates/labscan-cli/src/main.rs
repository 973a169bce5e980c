//! CLI application for clinical document field extraction.

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{batch, config, extract, formats, parse};

/// labscan - Extract structured fields from scanned clinical documents
#[derive(Parser)]
#[command(name = "labscan")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract fields from a PDF, image or text file
    Extract(extract::ExtractArgs),

    /// Parse already recognized text
    Parse(parse::ParseArgs),

    /// Extract fields from many files
    Batch(batch::BatchArgs),

    /// List supported document types and their fields
    Formats(formats::FormatsArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // RUST_LOG wins over -v when set.
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // Logs and diagnostics go to stderr; stdout carries only results.
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Config(args) => config::run(args, config_path).await,
        Commands::Formats(args) => formats::run(args).await,
        Commands::Extract(args) => extract::run(args, &commands::load_config(config_path)?).await,
        Commands::Parse(args) => parse::run(args, &commands::load_config(config_path)?).await,
        Commands::Batch(args) => batch::run(args, &commands::load_config(config_path)?).await,
    }
}
