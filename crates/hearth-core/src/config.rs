//! Pipeline configuration
//!
//! ## Configuration Resolution
//!
//! 1. Explicit path (`--config`), which must exist
//! 2. Override in data dir (~/.local/share/hearth/config/pipeline.toml)
//! 3. Embedded defaults (compiled into binary)
//!
//! Every key is optional; missing keys keep [`PipelineConfig::default`].

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::aggregate::{
    AdviceThresholds, AggregateOptions, BedroomLevels, DistanceCheck, RatingThresholds,
};
use crate::cohort::DEFAULT_COHORT_SIZE;
use crate::error::{Error, Result};
use crate::outliers::OutlierThresholds;

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/pipeline.toml");

/// A (value suburb, premium suburb) pair compared by the gap insight
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuburbPair {
    pub value: String,
    pub premium: String,
}

impl SuburbPair {
    pub fn new(value: impl Into<String>, premium: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            premium: premium.into(),
        }
    }
}

/// Settings for the insight synthesizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightSettings {
    /// Rows reported by the top-K premium insights
    pub top_k: usize,
    /// Quarter label the market growth is measured from
    pub trend_from: String,
    pub trend_to: String,
    pub comparisons: Vec<SuburbPair>,
}

impl Default for InsightSettings {
    fn default() -> Self {
        Self {
            top_k: 5,
            trend_from: "2016Q2".to_string(),
            trend_to: "2017Q3".to_string(),
            comparisons: vec![
                SuburbPair::new("Reservoir", "Northcote"),
                SuburbPair::new("Glenroy", "Moonee Ponds"),
                SuburbPair::new("Coburg", "Brunswick"),
            ],
        }
    }
}

/// Full pipeline configuration
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub cohort_size: usize,
    pub thresholds: OutlierThresholds,
    pub strict_property_types: bool,
    pub aggregate: AggregateOptions,
    pub insights: InsightSettings,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            cohort_size: DEFAULT_COHORT_SIZE,
            thresholds: OutlierThresholds::default(),
            strict_property_types: false,
            aggregate: AggregateOptions::default(),
            insights: InsightSettings::default(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration, preferring `path`, then the data dir override,
    /// then the embedded defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let content = match path {
            Some(path) => read_config(path)?,
            None => match default_config_path() {
                Some(default_path) if default_path.exists() => read_config(&default_path)?,
                _ => DEFAULT_CONFIG.to_string(),
            },
        };

        parse_config(&content)
    }

    /// The embedded defaults
    pub fn embedded() -> Result<Self> {
        parse_config(DEFAULT_CONFIG)
    }

    /// Reject combinations no run can use
    pub fn validate(&self) -> Result<()> {
        if self.cohort_size == 0 {
            return Err(Error::Config("cohort size must be at least 1".into()));
        }
        if self.thresholds.underpriced >= self.thresholds.overpriced {
            return Err(Error::Config(format!(
                "underpriced threshold ({}) must be below overpriced threshold ({})",
                self.thresholds.underpriced, self.thresholds.overpriced
            )));
        }
        let ratings = self.aggregate.ratings;
        if !(ratings.value_buy < ratings.below_market && ratings.below_market < ratings.at_market) {
            return Err(Error::Config(format!(
                "rating thresholds must increase: {} < {} < {}",
                ratings.value_buy, ratings.below_market, ratings.at_market
            )));
        }
        let advice = self.aggregate.advice;
        if advice.unit_value >= advice.high_premium {
            return Err(Error::Config(format!(
                "unit_value threshold ({}) must be below high_premium threshold ({})",
                advice.unit_value, advice.high_premium
            )));
        }
        let rooms = self.aggregate.bedrooms;
        if rooms.base == rooms.upper {
            return Err(Error::Config(format!(
                "bedroom levels must differ (both are {})",
                rooms.base
            )));
        }
        Ok(())
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("hearth").join("config").join("pipeline.toml"))
}

fn read_config(path: &Path) -> Result<String> {
    debug!(path = %path.display(), "Reading pipeline config");
    fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    cohort: Option<RawCohort>,
    outliers: Option<RawOutliers>,
    validation: Option<RawValidation>,
    bedrooms: Option<RawBedrooms>,
    ratings: Option<RawRatings>,
    recommendations: Option<RawRecommendations>,
    insights: Option<RawInsights>,
}

#[derive(Debug, Deserialize)]
struct RawCohort {
    size: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct RawOutliers {
    underpriced: Option<f64>,
    overpriced: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawValidation {
    strict_property_types: Option<bool>,
    distance_check: Option<DistanceCheck>,
}

#[derive(Debug, Deserialize)]
struct RawBedrooms {
    base: Option<u32>,
    upper: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RawRatings {
    value_buy: Option<f64>,
    below_market: Option<f64>,
    at_market: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawRecommendations {
    high_premium: Option<f64>,
    unit_value: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawInsights {
    top_k: Option<usize>,
    trend_from: Option<String>,
    trend_to: Option<String>,
    comparisons: Option<Vec<SuburbPair>>,
}

/// Parse config from TOML content, merged over the defaults
pub fn parse_config(content: &str) -> Result<PipelineConfig> {
    let raw: RawConfig =
        toml::from_str(content).map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    let mut config = PipelineConfig::default();

    if let Some(size) = raw.cohort.and_then(|c| c.size) {
        config.cohort_size = size;
    }

    if let Some(outliers) = raw.outliers {
        if let Some(underpriced) = outliers.underpriced {
            config.thresholds.underpriced = underpriced;
        }
        if let Some(overpriced) = outliers.overpriced {
            config.thresholds.overpriced = overpriced;
        }
    }

    if let Some(validation) = raw.validation {
        if let Some(strict) = validation.strict_property_types {
            config.strict_property_types = strict;
        }
        if let Some(check) = validation.distance_check {
            config.aggregate.distance_check = check;
        }
    }

    if let Some(bedrooms) = raw.bedrooms {
        let defaults = BedroomLevels::default();
        config.aggregate.bedrooms = BedroomLevels {
            base: bedrooms.base.unwrap_or(defaults.base),
            upper: bedrooms.upper.unwrap_or(defaults.upper),
        };
    }

    if let Some(ratings) = raw.ratings {
        let defaults = RatingThresholds::default();
        config.aggregate.ratings = RatingThresholds {
            value_buy: ratings.value_buy.unwrap_or(defaults.value_buy),
            below_market: ratings.below_market.unwrap_or(defaults.below_market),
            at_market: ratings.at_market.unwrap_or(defaults.at_market),
        };
    }

    if let Some(recommendations) = raw.recommendations {
        let defaults = AdviceThresholds::default();
        config.aggregate.advice = AdviceThresholds {
            high_premium: recommendations.high_premium.unwrap_or(defaults.high_premium),
            unit_value: recommendations.unit_value.unwrap_or(defaults.unit_value),
        };
    }

    if let Some(insights) = raw.insights {
        if let Some(top_k) = insights.top_k {
            config.insights.top_k = top_k;
        }
        if let Some(from) = insights.trend_from {
            config.insights.trend_from = from;
        }
        if let Some(to) = insights.trend_to {
            config.insights.trend_to = to;
        }
        // A configured list replaces the default pairs
        if let Some(comparisons) = insights.comparisons {
            config.insights.comparisons = comparisons;
        }
    }

    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_config_matches_defaults() {
        let config = PipelineConfig::embedded().unwrap();
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config = parse_config(
            r#"
            [cohort]
            size = 5

            [outliers]
            overpriced = 0.75

            [validation]
            distance_check = "strict"
            "#,
        )
        .unwrap();

        assert_eq!(config.cohort_size, 5);
        assert_eq!(config.thresholds.underpriced, -0.30);
        assert_eq!(config.thresholds.overpriced, 0.75);
        assert_eq!(config.aggregate.distance_check, DistanceCheck::Strict);
        assert_eq!(config.insights, InsightSettings::default());
    }

    #[test]
    fn test_comparisons_replace_defaults() {
        let config = parse_config(
            r#"
            [[insights.comparisons]]
            value = "Sunshine"
            premium = "Footscray"
            "#,
        )
        .unwrap();

        assert_eq!(
            config.insights.comparisons,
            vec![SuburbPair::new("Sunshine", "Footscray")]
        );
        assert_eq!(config.insights.top_k, 5);
    }

    #[test]
    fn test_rating_and_advice_overrides() {
        let config = parse_config(
            r#"
            [ratings]
            value_buy = -0.2

            [recommendations]
            high_premium = 0.8
            "#,
        )
        .unwrap();

        assert_eq!(config.aggregate.ratings.value_buy, -0.2);
        assert_eq!(config.aggregate.ratings.at_market, 0.30);
        assert_eq!(config.aggregate.advice.high_premium, 0.8);
        assert_eq!(config.aggregate.advice.unit_value, 0.5);

        assert!(matches!(
            parse_config("[ratings]
at_market = -0.5"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            parse_config("[recommendations]
unit_value = 1.5"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(parse_config("").unwrap(), PipelineConfig::default());
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            parse_config("[cohort]\nsize = 0"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            parse_config("[outliers]\nunderpriced = 0.6"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            parse_config("[bedrooms]\nbase = 4"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            parse_config("[validation]\ndistance_check = \"sometimes\""),
            Err(Error::Config(_))
        ));
        assert!(matches!(parse_config("[cohort"), Err(Error::Config(_))));
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.toml");
        fs::write(&path, "[insights]\ntop_k = 3\n").unwrap();

        let config = PipelineConfig::load(Some(&path)).unwrap();
        assert_eq!(config.insights.top_k, 3);
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(
            PipelineConfig::load(Some(&missing)),
            Err(Error::Config(_))
        ));
    }
}
