//! Hearth Core Library
//!
//! Housing market analytics over property sale records:
//! - CSV ingestion and data quality audit
//! - Cleaning (suburb normalization, land size sanity bounds)
//! - Derived features (price per sqm, quarter, property type)
//! - Top-N suburb cohort and cohort-local outlier annotation
//! - Suburb, quarter and property type aggregates
//! - Comparative insights (suburb gaps, premiums, market growth)
//! - Report tables and CSV/JSON persistence

pub mod aggregate;
pub mod clean;
pub mod cohort;
pub mod config;
pub mod error;
pub mod export;
pub mod features;
pub mod ingest;
pub mod insights;
pub mod models;
pub mod outliers;
pub mod pipeline;
pub mod report;
pub mod stats;

/// Test utilities including listing fixtures
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use aggregate::{
    AdviceThresholds, AggregateOptions, AggregateTables, BedroomLevels, DistanceCheck,
    RatingThresholds,
};
pub use clean::CleaningStats;
pub use cohort::{Cohort, RankedSuburb};
pub use config::{InsightSettings, PipelineConfig, SuburbPair};
pub use error::{Error, Result};
pub use ingest::{audit, parse_csv, AuditReport};
pub use insights::{Finding, InsightEngine, InsightReport, InsightType};
pub use models::{
    AnnotatedListing, FeaturedListing, Listing, PremiumAdvice, PriceBand, PropertyType, RawTable,
    SuburbRating,
};
pub use outliers::{Annotated, OutlierThresholds};
pub use pipeline::{run, PipelineOutput};
pub use report::{CsvBundleSink, MarketReport, ReportSink, ReportStyle, SheetKind};
