//! Data quality audit

use std::path::Path;

use anyhow::Result;
use hearth_core::ingest::{audit, AuditReport};

use super::{fit, load_table};

/// Audit a raw file without running the pipeline
pub fn audit_file(input: &Path) -> Result<AuditReport> {
    let table = load_table(input)?;
    Ok(audit(&table))
}

pub fn cmd_audit(input: &Path, json: bool) -> Result<()> {
    let report = audit_file(input)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!();
    println!("🔍 Data Quality: {}", input.display());
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Rows:          {}", report.total_rows);
    println!("   Columns:       {}", report.total_columns);
    println!("   Completeness:  {:.1}%", report.completeness_pct);

    let mut incomplete: Vec<_> = report
        .missing_by_column
        .iter()
        .filter(|c| c.missing > 0)
        .collect();
    incomplete.sort_by(|a, b| b.missing.cmp(&a.missing));

    if incomplete.is_empty() {
        println!();
        println!("   ✅ No missing values");
    } else {
        println!();
        println!("   Missing values:");
        for column in incomplete {
            println!("   {} {:>8}", fit(&column.column, 20), column.missing);
        }
    }

    Ok(())
}
