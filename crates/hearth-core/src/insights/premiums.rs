//! Top-K premium rankings
//!
//! Both tables arrive sorted by descending premium from the aggregator, so
//! the ranking is a slice of the first K rows.

use crate::error::Result;

use super::engine::{AnalysisContext, Insight};
use super::types::{percent_text, Finding, InsightType, RankedPremiumData};

fn ranked_finding(insight_type: InsightType, title: &str, data: RankedPremiumData) -> Finding {
    let key = format!("{}:{}:{}", insight_type.as_str(), data.rank, data.suburb);
    let summary = format!(
        "{}: {} {} premium over {}",
        data.suburb,
        data.upper_label,
        percent_text(data.premium),
        data.base_label
    );
    Finding::new(insight_type, key, title, summary)
        .with_data(serde_json::to_value(&data).unwrap_or_default())
}

/// Suburbs with the largest house over unit premium
pub struct TypePremiumInsight {
    top_k: usize,
}

impl TypePremiumInsight {
    pub fn new(top_k: usize) -> Self {
        Self { top_k }
    }
}

impl Insight for TypePremiumInsight {
    fn id(&self) -> InsightType {
        InsightType::TypePremium
    }

    fn name(&self) -> &'static str {
        "House vs Unit Premium"
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Result<Vec<Finding>> {
        Ok(ctx
            .tables
            .type_premiums
            .iter()
            .take(self.top_k)
            .enumerate()
            .map(|(index, row)| {
                ranked_finding(
                    self.id(),
                    self.name(),
                    RankedPremiumData {
                        rank: index + 1,
                        suburb: row.suburb.clone(),
                        base_label: "Unit".to_string(),
                        base_median: row.unit,
                        upper_label: "House".to_string(),
                        upper_median: row.house,
                        premium: row.premium,
                    },
                )
            })
            .collect())
    }
}

/// Suburbs where the extra bedroom adds the most to house prices
pub struct BedroomPremiumInsight {
    top_k: usize,
}

impl BedroomPremiumInsight {
    pub fn new(top_k: usize) -> Self {
        Self { top_k }
    }
}

impl Insight for BedroomPremiumInsight {
    fn id(&self) -> InsightType {
        InsightType::BedroomPremium
    }

    fn name(&self) -> &'static str {
        "Bedroom Premium"
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Result<Vec<Finding>> {
        let table = &ctx.tables.bedroom_premiums;
        let base_label = format!("{} bedrooms", table.base_rooms);
        let upper_label = format!("{} bedrooms", table.upper_rooms);

        Ok(table
            .rows
            .iter()
            .take(self.top_k)
            .enumerate()
            .map(|(index, row)| {
                ranked_finding(
                    self.id(),
                    self.name(),
                    RankedPremiumData {
                        rank: index + 1,
                        suburb: row.suburb.clone(),
                        base_label: base_label.clone(),
                        base_median: row.base_median,
                        upper_label: upper_label.clone(),
                        upper_median: row.upper_median,
                        premium: row.premium,
                    },
                )
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{aggregate, AggregateOptions, AggregateTables};
    use crate::models::PropertyType;
    use crate::test_utils::{annotate_all, featured_with};

    fn tables() -> AggregateTables {
        let mut listings = Vec::new();
        // Suburb i: houses at 100 * (i + 2), units at 100; 4 bedroom houses
        // at 1.1 * i + 1 times the 3 bedroom price
        for i in 0..7u32 {
            let suburb = format!("S{}", i);
            let house = 100.0 * f64::from(i + 2);
            listings.push(featured_with(&suburb, house, PropertyType::House, 3, "2016Q3"));
            listings.push(featured_with(&suburb, 100.0, PropertyType::Unit, 2, "2016Q3"));
            listings.push(featured_with(
                &suburb,
                house * (1.0 + 0.1 * f64::from(i)),
                PropertyType::House,
                4,
                "2016Q3",
            ));
        }
        aggregate(&annotate_all(listings), &AggregateOptions::default()).unwrap()
    }

    #[test]
    fn test_type_premium_top_k() {
        let tables = tables();
        let findings = TypePremiumInsight::new(5)
            .analyze(&AnalysisContext::new(&tables))
            .unwrap();

        assert_eq!(findings.len(), 5);
        assert_eq!(findings[0].data["suburb"], "S6");
        assert_eq!(findings[0].data["rank"], 1);
        assert_eq!(findings[4].data["suburb"], "S2");
        assert_eq!(findings[0].key, "type_premium:1:S6");
    }

    #[test]
    fn test_bedroom_premium_top_k() {
        let tables = tables();
        let findings = BedroomPremiumInsight::new(3)
            .analyze(&AnalysisContext::new(&tables))
            .unwrap();

        assert_eq!(findings.len(), 3);
        assert_eq!(findings[0].data["suburb"], "S6");
        assert_eq!(findings[0].data["base_label"], "3 bedrooms");
        assert!(findings[0].summary.contains("60%"));
    }

    #[test]
    fn test_top_k_larger_than_table() {
        let tables = tables();
        let findings = TypePremiumInsight::new(50)
            .analyze(&AnalysisContext::new(&tables))
            .unwrap();
        assert_eq!(findings.len(), 7);
    }
}
