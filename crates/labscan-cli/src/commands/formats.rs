//! Formats command - list supported document types and their fields.

use std::process::ExitCode;

use clap::Args;
use console::style;
use serde_json::{json, Map, Value};

use labscan_core::extraction::rules::canonical_unit;
use labscan_core::DocumentFormat;

/// Arguments for the formats command.
#[derive(Args)]
pub struct FormatsArgs {
    /// Print as JSON
    #[arg(long)]
    json: bool,
}

pub async fn run(args: FormatsArgs) -> anyhow::Result<ExitCode> {
    if args.json {
        let mut formats = Map::new();
        for format in DocumentFormat::ALL {
            let library = format.library();
            formats.insert(
                format.as_str().to_string(),
                json!({
                    "description": format.description(),
                    "fields": library.field_names().collect::<Vec<_>>(),
                    "tabular_fallback": library.has_fallback(),
                }),
            );
        }
        println!("{}", serde_json::to_string_pretty(&Value::Object(formats))?);
        return Ok(ExitCode::SUCCESS);
    }

    for format in DocumentFormat::ALL {
        let library = format.library();
        println!(
            "{} {}",
            style(format.as_str()).bold().cyan(),
            style(format!("({})", format.description())).dim()
        );
        for field in library.field_names() {
            match canonical_unit(field) {
                Some(unit) => println!("  {:<20} {}", field, style(unit.canonical()).dim()),
                None => println!("  {}", field),
            }
        }
        if library.has_fallback() {
            println!("  {}", style("+ tabular fallback for bare values").dim());
        }
        println!();
    }

    Ok(ExitCode::SUCCESS)
}
