//! Core types for the insight synthesizer

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Types of insights that can be generated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightType {
    /// Price gap between a value suburb and a nearby premium suburb
    SuburbGap,
    /// Suburbs where houses command the largest premium over units
    TypePremium,
    /// Suburbs where an extra bedroom adds the most to house prices
    BedroomPremium,
    /// Median price growth between two quarters
    MarketGrowth,
}

impl InsightType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsightType::SuburbGap => "suburb_gap",
            InsightType::TypePremium => "type_premium",
            InsightType::BedroomPremium => "bedroom_premium",
            InsightType::MarketGrowth => "market_growth",
        }
    }
}

impl fmt::Display for InsightType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for InsightType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "suburb_gap" => Ok(InsightType::SuburbGap),
            "type_premium" => Ok(InsightType::TypePremium),
            "bedroom_premium" => Ok(InsightType::BedroomPremium),
            "market_growth" => Ok(InsightType::MarketGrowth),
            _ => Err(format!("Unknown insight type: {}", s)),
        }
    }
}

/// A finding produced by an insight analyzer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    /// Type of insight that generated this finding
    pub insight_type: InsightType,
    /// Unique key within a run (e.g., "gap:Reservoir:Northcote")
    pub key: String,
    /// Short title for the finding
    pub title: String,
    /// One-line summary (e.g., "Reservoir trades 45% below Northcote")
    pub summary: String,
    /// Insight-specific structured data
    pub data: serde_json::Value,
}

impl Finding {
    pub fn new(
        insight_type: InsightType,
        key: impl Into<String>,
        title: impl Into<String>,
        summary: impl Into<String>,
    ) -> Self {
        Self {
            insight_type,
            key: key.into(),
            title: title.into(),
            summary: summary.into(),
            data: serde_json::Value::Null,
        }
    }

    /// Add structured data payload
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = data;
        self
    }
}

/// An analyzer that failed; the run continues without its findings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightFailure {
    pub insight_type: InsightType,
    /// Analyzer instance key (e.g., "growth:2016Q2:2017Q3")
    pub key: String,
    pub error: String,
}

/// Everything the synthesizer produced in one run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InsightReport {
    pub findings: Vec<Finding>,
    pub failures: Vec<InsightFailure>,
}

impl InsightReport {
    pub fn by_type(&self, insight_type: InsightType) -> impl Iterator<Item = &Finding> {
        self.findings
            .iter()
            .filter(move |f| f.insight_type == insight_type)
    }
}

/// Data for the suburb gap insight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuburbGapData {
    pub value_suburb: String,
    pub premium_suburb: String,
    pub value_price: Option<f64>,
    pub premium_price: Option<f64>,
    /// Whole-percent discount of the value suburb; null when the premium
    /// price is zero or undefined
    pub discount_pct: Option<f64>,
}

/// Data for one row of a top-K premium ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedPremiumData {
    /// 1-based position in the ranking
    pub rank: usize,
    pub suburb: String,
    /// Label of the compared-from group (e.g., "Unit", "3 bedrooms")
    pub base_label: String,
    pub base_median: f64,
    pub upper_label: String,
    pub upper_median: f64,
    pub premium: Option<f64>,
}

/// Data for the market growth insight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketGrowthData {
    pub from_quarter: String,
    pub to_quarter: String,
    pub from_median: Option<f64>,
    pub to_median: Option<f64>,
    /// Relative growth of the median, null when undefined
    pub growth: Option<f64>,
}

/// Percent text for summaries, "undefined" when there is no value
pub(crate) fn percent_text(fraction: Option<f64>) -> String {
    match fraction {
        Some(f) => format!("{:.0}%", f * 100.0),
        None => "undefined".to_string(),
    }
}

/// Whole-dollar text for summaries
pub(crate) fn price_text(price: Option<f64>) -> String {
    match price {
        Some(p) => format!("${:.0}", p),
        None => "undefined".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insight_type_serialization() {
        assert_eq!(InsightType::SuburbGap.as_str(), "suburb_gap");
        assert_eq!(
            InsightType::from_str("market_growth").unwrap(),
            InsightType::MarketGrowth
        );
        assert!(InsightType::from_str("forecast").is_err());
        assert_eq!(
            serde_json::to_string(&InsightType::BedroomPremium).unwrap(),
            "\"bedroom_premium\""
        );
    }

    #[test]
    fn test_finding_builder() {
        let finding = Finding::new(
            InsightType::SuburbGap,
            "gap:A:B",
            "Value Suburb",
            "A trades 10% below B",
        )
        .with_data(serde_json::json!({"discount_pct": 10.0}));

        assert_eq!(finding.key, "gap:A:B");
        assert_eq!(finding.data["discount_pct"], 10.0);
    }

    #[test]
    fn test_undefined_serializes_as_null() {
        let data = SuburbGapData {
            value_suburb: "A".into(),
            premium_suburb: "B".into(),
            value_price: Some(1.0),
            premium_price: Some(0.0),
            discount_pct: None,
        };
        let value = serde_json::to_value(&data).unwrap();
        assert!(value["discount_pct"].is_null());
    }

    #[test]
    fn test_summary_text() {
        assert_eq!(percent_text(Some(0.2)), "20%");
        assert_eq!(percent_text(None), "undefined");
        assert_eq!(price_text(Some(700_000.4)), "$700000");
    }
}
