//! End-to-end pipeline run
//!
//! clean -> features -> cohort -> annotate -> aggregate -> insights. Each
//! stage borrows the previous stage's output and returns a new table; the
//! output keeps every intermediate table for persistence and reporting.

use tracing::info;

use crate::aggregate::{aggregate, AggregateTables};
use crate::clean::{clean, CleaningStats};
use crate::cohort::{select_cohort, Cohort};
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::features::add_features;
use crate::insights::{AnalysisContext, InsightEngine, InsightReport};
use crate::models::{FeaturedListing, RawTable};
use crate::outliers::{annotate, Annotated};

/// Every table produced by one run
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub cleaned: RawTable,
    pub cleaning: CleaningStats,
    pub featured: Vec<FeaturedListing>,
    pub cohort: Cohort,
    pub annotated: Annotated,
    pub tables: AggregateTables,
    pub insights: InsightReport,
}

/// Run every stage over the loaded table
pub fn run(table: &RawTable, config: &PipelineConfig) -> Result<PipelineOutput> {
    config.validate()?;
    info!(rows = table.len(), columns = table.column_count(), "Pipeline started");

    let (cleaned, cleaning) = clean(table);
    let featured = add_features(&cleaned.listings, config.strict_property_types)?;
    let cohort = select_cohort(&featured, config.cohort_size);
    let annotated = annotate(&cohort, &config.thresholds)?;
    let tables = aggregate(&annotated.listings, &config.aggregate)?;

    let engine = InsightEngine::from_settings(&config.insights);
    let insights = engine.analyze_all(&AnalysisContext::new(&tables));

    info!(
        cleaned = cleaned.len(),
        cohort_listings = cohort.listings.len(),
        suburbs = tables.suburbs.len(),
        findings = insights.findings.len(),
        "Pipeline complete"
    );

    Ok(PipelineOutput {
        cleaned,
        cleaning,
        featured,
        cohort,
        annotated,
        tables,
        insights,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::models::RawTable;
    use crate::test_utils::ListingBuilder;

    fn table() -> RawTable {
        let listings = (0..6)
            .map(|i| {
                let suburb = if i < 4 { "kew" } else { " coburg " };
                ListingBuilder::new(suburb)
                    .row(i + 1)
                    .price(500_000.0 + 100_000.0 * i as f64)
                    .build()
            })
            .collect();
        RawTable::new(vec![], listings)
    }

    #[test]
    fn test_run_stages_in_order() {
        let config = PipelineConfig {
            cohort_size: 1,
            ..PipelineConfig::default()
        };
        let output = run(&table(), &config).unwrap();

        assert_eq!(output.cleaning.renamed_count, 6);
        assert_eq!(output.featured.len(), 6);
        assert_eq!(output.cohort.ranking.len(), 1);
        assert_eq!(output.cohort.ranking[0].suburb, "Kew");
        assert_eq!(output.annotated.listings.len(), 4);
        assert_eq!(output.tables.suburbs.len(), 1);
        // Default comparisons and trend quarters are absent from this data
        assert!(output.insights.findings.is_empty());
        assert_eq!(output.insights.failures.len(), 4);
    }

    #[test]
    fn test_malformed_date_aborts_run() {
        let mut table = table();
        table.listings[2].date = Some("2016-07-01".into());
        assert!(matches!(
            run(&table, &PipelineConfig::default()),
            Err(Error::MalformedDate { row: 3, .. })
        ));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = PipelineConfig {
            cohort_size: 0,
            ..PipelineConfig::default()
        };
        assert!(matches!(run(&table(), &config), Err(Error::Config(_))));
    }
}
