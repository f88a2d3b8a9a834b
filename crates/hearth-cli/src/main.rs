//! Hearth CLI - Housing market analytics
//!
//! Usage:
//!   hearth run sales.csv --out-dir output   Run the full pipeline
//!   hearth audit sales.csv                  Data quality report

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Run {
            input,
            out_dir,
            config,
            cohort_size,
            underpriced,
            overpriced,
        } => {
            let overrides = commands::RunOverrides {
                cohort_size,
                underpriced,
                overpriced,
            };
            commands::cmd_run(&input, &out_dir, config.as_deref(), &overrides)
        }
        Commands::Audit { input, json } => commands::cmd_audit(&input, json),
    }
}
