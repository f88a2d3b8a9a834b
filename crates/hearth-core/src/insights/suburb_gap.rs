//! Suburb Gap Insight
//!
//! Compares a value suburb's median price with a nearby premium suburb:
//! discount = (premium - value) / premium, as a whole percent.

use crate::error::{Error, Result};
use crate::stats;

use super::engine::{AnalysisContext, Insight};
use super::types::{percent_text, price_text, Finding, InsightType, SuburbGapData};

/// Gap between one configured (value, premium) suburb pair
pub struct SuburbGapInsight {
    value_suburb: String,
    premium_suburb: String,
}

impl SuburbGapInsight {
    pub fn new(value_suburb: impl Into<String>, premium_suburb: impl Into<String>) -> Self {
        Self {
            value_suburb: value_suburb.into(),
            premium_suburb: premium_suburb.into(),
        }
    }

    fn median_of(&self, ctx: &AnalysisContext<'_>, suburb: &str) -> Result<Option<f64>> {
        ctx.tables
            .suburb(suburb)
            .map(|row| row.median_price)
            .ok_or_else(|| Error::MissingLookup {
                stage: "insights",
                key: suburb.to_string(),
            })
    }
}

/// Whole-percent discount of `value` against `premium`
///
/// Undefined when the premium price is zero.
pub fn discount_pct(value: f64, premium: f64) -> Option<f64> {
    stats::ratio(premium - value, premium).map(|d| (d * 100.0).round())
}

impl Insight for SuburbGapInsight {
    fn id(&self) -> InsightType {
        InsightType::SuburbGap
    }

    fn name(&self) -> &'static str {
        "Suburb Gap"
    }

    fn key(&self) -> String {
        format!("gap:{}:{}", self.value_suburb, self.premium_suburb)
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Result<Vec<Finding>> {
        let value_price = self.median_of(ctx, &self.value_suburb)?;
        let premium_price = self.median_of(ctx, &self.premium_suburb)?;

        let discount = match (value_price, premium_price) {
            (Some(value), Some(premium)) => discount_pct(value, premium),
            _ => None,
        };

        let summary = match discount {
            Some(pct) => format!(
                "{} ({}) trades {:.0}% below {}",
                self.value_suburb,
                price_text(value_price),
                pct,
                self.premium_suburb
            ),
            None => format!(
                "{} vs {}: discount {}",
                self.value_suburb,
                self.premium_suburb,
                percent_text(None)
            ),
        };

        let data = SuburbGapData {
            value_suburb: self.value_suburb.clone(),
            premium_suburb: self.premium_suburb.clone(),
            value_price,
            premium_price,
            discount_pct: discount,
        };

        Ok(vec![Finding::new(InsightType::SuburbGap, self.key(), "Value Suburb", summary)
            .with_data(serde_json::to_value(&data).unwrap_or_default())])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{aggregate, AggregateOptions, AggregateTables};
    use crate::test_utils::{annotate_all, featured};

    fn tables(listings: Vec<crate::models::FeaturedListing>) -> AggregateTables {
        aggregate(&annotate_all(listings), &AggregateOptions::default()).unwrap()
    }

    #[test]
    fn test_discount_rounding() {
        assert_eq!(discount_pct(550_000.0, 1_000_000.0), Some(45.0));
        assert_eq!(discount_pct(2.0, 3.0), Some(33.0));
        assert_eq!(discount_pct(1.0, 0.0), None);
    }

    #[test]
    fn test_gap_finding() {
        let tables = tables(vec![
            featured("Reservoir", 550_000.0),
            featured("Northcote", 1_000_000.0),
        ]);
        let findings = SuburbGapInsight::new("Reservoir", "Northcote")
            .analyze(&AnalysisContext::new(&tables))
            .unwrap();

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].key, "gap:Reservoir:Northcote");
        assert_eq!(findings[0].data["discount_pct"], 45.0);
        assert!(findings[0].summary.contains("45% below Northcote"));
    }

    #[test]
    fn test_absent_suburb_is_lookup_error() {
        let tables = tables(vec![featured("Reservoir", 550_000.0)]);
        let err = SuburbGapInsight::new("Reservoir", "Northcote")
            .analyze(&AnalysisContext::new(&tables))
            .unwrap_err();

        match err {
            Error::MissingLookup { stage, key } => {
                assert_eq!(stage, "insights");
                assert_eq!(key, "Northcote");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_zero_premium_price_is_undefined_not_zero() {
        let tables = tables(vec![featured("Reservoir", 550_000.0), featured("Northcote", 0.0)]);
        let findings = SuburbGapInsight::new("Reservoir", "Northcote")
            .analyze(&AnalysisContext::new(&tables))
            .unwrap();

        assert!(findings[0].data["discount_pct"].is_null());
        assert!(findings[0].summary.contains("undefined"));
    }
}
