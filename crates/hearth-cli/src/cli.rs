//! CLI argument definitions using clap
//!
//! The command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Hearth - Housing market analytics from property sale records
#[derive(Parser)]
#[command(name = "hearth")]
#[command(about = "Clean, analyze and report on property sales data", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full pipeline and write tables and the report bundle
    Run {
        /// Raw sales CSV
        input: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = "output")]
        out_dir: PathBuf,

        /// Pipeline config file (defaults to the data dir override, then
        /// built-in defaults)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Number of highest-volume suburbs to analyze
        #[arg(long)]
        cohort_size: Option<usize>,

        /// Deviation below which a sale is underpriced (e.g. -0.3)
        #[arg(long, allow_hyphen_values = true)]
        underpriced: Option<f64>,

        /// Deviation above which a sale is overpriced (e.g. 0.5)
        #[arg(long, allow_hyphen_values = true)]
        overpriced: Option<f64>,
    },

    /// Print data quality metrics for a raw sales CSV
    Audit {
        /// Raw sales CSV
        input: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}
