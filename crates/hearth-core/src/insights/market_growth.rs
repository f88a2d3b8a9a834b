//! Market Growth Insight
//!
//! Median price growth between two named quarters. Both quarters must be
//! present in the quarterly table; no fallback quarter is substituted.

use crate::error::{Error, Result};
use crate::stats;

use super::engine::{AnalysisContext, Insight};
use super::types::{percent_text, price_text, Finding, InsightType, MarketGrowthData};

pub struct MarketGrowthInsight {
    from_quarter: String,
    to_quarter: String,
}

impl MarketGrowthInsight {
    pub fn new(from_quarter: impl Into<String>, to_quarter: impl Into<String>) -> Self {
        Self {
            from_quarter: from_quarter.into(),
            to_quarter: to_quarter.into(),
        }
    }

    fn median_of(&self, ctx: &AnalysisContext<'_>, quarter: &str) -> Result<Option<f64>> {
        ctx.tables
            .quarter(quarter)
            .map(|row| row.median_price)
            .ok_or_else(|| Error::MissingLookup {
                stage: "insights",
                key: quarter.to_string(),
            })
    }
}

impl Insight for MarketGrowthInsight {
    fn id(&self) -> InsightType {
        InsightType::MarketGrowth
    }

    fn name(&self) -> &'static str {
        "Market Growth"
    }

    fn key(&self) -> String {
        format!("growth:{}:{}", self.from_quarter, self.to_quarter)
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Result<Vec<Finding>> {
        let from_median = self.median_of(ctx, &self.from_quarter)?;
        let to_median = self.median_of(ctx, &self.to_quarter)?;

        let growth = match (to_median, from_median) {
            (Some(to), Some(from)) => stats::relative_change(to, from),
            _ => None,
        };

        let summary = format!(
            "{} -> {}: {} market growth ({} -> {})",
            self.from_quarter,
            self.to_quarter,
            percent_text(growth),
            price_text(from_median),
            price_text(to_median)
        );

        let data = MarketGrowthData {
            from_quarter: self.from_quarter.clone(),
            to_quarter: self.to_quarter.clone(),
            from_median,
            to_median,
            growth,
        };

        Ok(vec![Finding::new(InsightType::MarketGrowth, self.key(), self.name(), summary)
            .with_data(serde_json::to_value(&data).unwrap_or_default())])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{aggregate, AggregateOptions, AggregateTables};
    use crate::models::PropertyType;
    use crate::test_utils::{annotate_all, featured_with};

    fn tables() -> AggregateTables {
        let listings = vec![
            featured_with("Kew", 700_000.0, PropertyType::House, 3, "2016Q2"),
            featured_with("Kew", 760_000.0, PropertyType::House, 3, "2016Q4"),
            featured_with("Kew", 840_000.0, PropertyType::House, 3, "2017Q3"),
        ];
        aggregate(&annotate_all(listings), &AggregateOptions::default()).unwrap()
    }

    #[test]
    fn test_growth_between_quarters() {
        let tables = tables();
        let findings = MarketGrowthInsight::new("2016Q2", "2017Q3")
            .analyze(&AnalysisContext::new(&tables))
            .unwrap();

        let growth = findings[0].data["growth"].as_f64().unwrap();
        assert!((growth - 0.2).abs() < 1e-9);
        assert!(findings[0].summary.contains("20% market growth"));
    }

    #[test]
    fn test_absent_quarter_is_lookup_error() {
        let tables = tables();
        let err = MarketGrowthInsight::new("2016Q2", "2018Q1")
            .analyze(&AnalysisContext::new(&tables))
            .unwrap_err();
        assert!(matches!(err, Error::MissingLookup { key, .. } if key == "2018Q1"));
    }
}
