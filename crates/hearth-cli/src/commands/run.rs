//! Full pipeline run

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};
use hearth_core::{
    export,
    report::{CsvBundleSink, MarketReport, ReportSink, ReportStyle, SheetKind},
    PipelineConfig, PipelineOutput,
};

use super::{fit, load_table};

/// Command-line values that take precedence over the config file
#[derive(Debug, Default, Clone)]
pub struct RunOverrides {
    pub cohort_size: Option<usize>,
    pub underpriced: Option<f64>,
    pub overpriced: Option<f64>,
}

impl RunOverrides {
    pub fn apply(&self, config: &mut PipelineConfig) {
        if let Some(size) = self.cohort_size {
            config.cohort_size = size;
        }
        if let Some(underpriced) = self.underpriced {
            config.thresholds.underpriced = underpriced;
        }
        if let Some(overpriced) = self.overpriced {
            config.thresholds.overpriced = overpriced;
        }
    }
}

/// Resolve the config file and apply command-line overrides
pub fn resolve_config(path: Option<&Path>, overrides: &RunOverrides) -> Result<PipelineConfig> {
    let mut config = PipelineConfig::load(path).context("Failed to load pipeline config")?;
    overrides.apply(&mut config);
    config.validate()?;
    tracing::debug!(?config, "Resolved pipeline config");
    Ok(config)
}

pub fn cmd_run(
    input: &Path,
    out_dir: &Path,
    config_path: Option<&Path>,
    overrides: &RunOverrides,
) -> Result<()> {
    let config = resolve_config(config_path, overrides)?;

    println!("📥 Loading {}...", input.display());
    let table = load_table(input)?;
    println!("   Found {} sales", table.len());

    let output = hearth_core::run(&table, &config).context("Pipeline failed")?;

    let report = MarketReport::from_output(&output);
    let style = ReportStyle::default();
    write_outputs(&output, &report, &style, out_dir)?;
    print_summary(&output, &report, &style);
    println!();
    println!("📁 Output written to {}", out_dir.display());

    Ok(())
}

/// Persist listing tables and the report bundle
pub fn write_outputs(
    output: &PipelineOutput,
    report: &MarketReport,
    style: &ReportStyle,
    out_dir: &Path,
) -> Result<()> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    let cleaned_path = out_dir.join("cleaned.csv");
    let file = File::create(&cleaned_path)
        .with_context(|| format!("Failed to create {}", cleaned_path.display()))?;
    export::write_cleaned(BufWriter::new(file), &output.cleaned)?;

    let analysis_path = out_dir.join("analysis.csv");
    let file = File::create(&analysis_path)
        .with_context(|| format!("Failed to create {}", analysis_path.display()))?;
    export::write_analysis(
        BufWriter::new(file),
        &output.cleaned.extra_headers,
        &output.annotated.listings,
    )?;

    let mut sink = CsvBundleSink::new(out_dir.join("report"));
    sink.write(report, style)
        .context("Failed to write report bundle")?;

    Ok(())
}

fn print_summary(output: &PipelineOutput, report: &MarketReport, style: &ReportStyle) {
    let stats = &output.cleaning;

    println!();
    println!("📊 Market Analysis");
    println!("   ─────────────────────────────────────────────────────────────");
    println!(
        "   Cleaned:   {} of {} sales kept ({} land size rejections)",
        stats.final_count, stats.initial_count, stats.landsize_rejections
    );
    if let Some(summary) = report.sheet(SheetKind::Summary) {
        for row in &summary.rows {
            if let [metric, value] = row.as_slice() {
                println!("   {} {}", fit(&metric.raw_text(), 20), style.format_cell(value));
            }
        }
    }

    if !output.tables.suburbs.is_empty() {
        println!();
        println!("🏘️  Top Suburbs by Median Price");
        for row in output.tables.suburbs.iter().take(10) {
            let median = row
                .median_price
                .map(|p| style.format_price(p))
                .unwrap_or_else(|| "undefined".to_string());
            let rating = row.rating.map(|r| r.as_str()).unwrap_or("undefined");
            println!(
                "   {} {:>14}  {:<12} ({} sales)",
                fit(&row.suburb, 24),
                median,
                rating,
                row.transaction_count
            );
        }
    }

    if !output.insights.findings.is_empty() {
        println!();
        println!("💡 Insights");
        for finding in &output.insights.findings {
            println!("   • {}", finding.summary);
        }
    }

    if !output.insights.failures.is_empty() {
        println!();
        println!("⚠️  Skipped insights");
        for failure in &output.insights.failures {
            println!("   • {}: {}", failure.key, failure.error);
        }
    }
}
