//! CLI command implementations
//!
//! - `run` - Full pipeline run with table and report output
//! - `audit` - Data quality report for a raw file

pub mod audit;
pub mod run;

// Re-export command functions for main.rs
pub use audit::*;
pub use run::*;

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use hearth_core::{ingest::parse_csv, RawTable};

/// Load a raw sales CSV
pub fn load_table(input: &Path) -> Result<RawTable> {
    let file =
        File::open(input).with_context(|| format!("Failed to open file: {}", input.display()))?;
    parse_csv(file).with_context(|| format!("Failed to parse {}", input.display()))
}

/// Pad or truncate a string to a fixed display width
pub fn fit(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        format!("{:<width$}", s, width = width)
    } else {
        let kept: String = s.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
