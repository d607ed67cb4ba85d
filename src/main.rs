use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use find_meals::{find_meals, render_lines, render_table, DeliveryRequest};

mod cli;

use cli::{Args, Format, LogLevel};

/// Logs go to stderr so stdout only ever carries meals.
fn initialize_tracing(log_level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.as_filter_directive()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &Args) -> Result<String> {
    let request = DeliveryRequest::from_args(&args.request_parameters())
        .context("invalid delivery request")?;
    let meals = find_meals(&request, args.now)
        .with_context(|| format!("failed to load {}", request.catalogue_path().display()))?;
    debug!(eligible = meals.len(), "search finished");

    Ok(match args.format {
        Format::Lines => render_lines(&meals),
        Format::Table => render_table(&meals),
    })
}

fn main() -> ExitCode {
    let args = Args::parse();
    initialize_tracing(args.log_level);

    match run(&args) {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
