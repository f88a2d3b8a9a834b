//! Per-listing price deviation from the suburb median
//!
//! Runs on the cohort only: medians are cohort-local, so annotation takes a
//! [`Cohort`] rather than an arbitrary listing slice.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::cohort::Cohort;
use crate::error::{Error, Result};
use crate::models::{AnnotatedListing, FeaturedListing, PriceBand};
use crate::stats;

/// Deviation thresholds for price classification
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutlierThresholds {
    /// Deviation below this is underpriced (default -0.30)
    pub underpriced: f64,
    /// Deviation above this is overpriced (default 0.50)
    pub overpriced: f64,
}

impl Default for OutlierThresholds {
    fn default() -> Self {
        Self {
            underpriced: -0.30,
            overpriced: 0.50,
        }
    }
}

impl OutlierThresholds {
    pub fn classify(&self, deviation: f64) -> PriceBand {
        if deviation < self.underpriced {
            PriceBand::Underpriced
        } else if deviation > self.overpriced {
            PriceBand::Overpriced
        } else {
            PriceBand::Typical
        }
    }
}

/// Annotated cohort listings and band counts
#[derive(Debug, Clone)]
pub struct Annotated {
    pub listings: Vec<AnnotatedListing>,
    pub underpriced: usize,
    pub typical: usize,
    pub overpriced: usize,
    /// Listings whose deviation is undefined
    pub unclassified: usize,
}

/// Median price per suburb over the given listings
///
/// Suburbs whose listings carry no price map to None.
pub fn suburb_medians(listings: &[FeaturedListing]) -> BTreeMap<String, Option<f64>> {
    let mut prices: BTreeMap<String, Vec<f64>> = BTreeMap::new();

    for listing in listings {
        let Some(suburb) = listing.suburb() else {
            continue;
        };
        let entry = prices.entry(suburb.to_string()).or_default();
        if let Some(price) = listing.price() {
            entry.push(price);
        }
    }

    prices
        .into_iter()
        .map(|(suburb, values)| {
            let median = stats::median(&values);
            (suburb, median)
        })
        .collect()
}

/// Annotate every cohort listing with its suburb median and deviation
pub fn annotate(cohort: &Cohort, thresholds: &OutlierThresholds) -> Result<Annotated> {
    let medians = suburb_medians(&cohort.listings);

    for suburb in cohort.suburbs() {
        if !medians.contains_key(suburb) {
            return Err(Error::Invariant(format!(
                "cohort suburb '{}' has no member listings",
                suburb
            )));
        }
    }

    let mut annotated = Annotated {
        listings: Vec::with_capacity(cohort.listings.len()),
        underpriced: 0,
        typical: 0,
        overpriced: 0,
        unclassified: 0,
    };

    for listing in &cohort.listings {
        let suburb = listing.suburb().ok_or_else(|| {
            Error::Invariant(format!(
                "cohort listing at row {} has no suburb",
                listing.listing.row
            ))
        })?;
        let suburb_median = medians.get(suburb).copied().flatten();

        let deviation = match (listing.price(), suburb_median) {
            (Some(price), Some(median)) => stats::relative_change(price, median),
            _ => None,
        };
        let band = deviation.map(|d| thresholds.classify(d));

        match band {
            Some(PriceBand::Underpriced) => annotated.underpriced += 1,
            Some(PriceBand::Typical) => annotated.typical += 1,
            Some(PriceBand::Overpriced) => annotated.overpriced += 1,
            None => annotated.unclassified += 1,
        }

        annotated.listings.push(AnnotatedListing {
            featured: listing.clone(),
            suburb_median,
            deviation,
            band,
        });
    }

    info!(
        underpriced = annotated.underpriced,
        overpriced = annotated.overpriced,
        unclassified = annotated.unclassified,
        "Outliers annotated"
    );

    Ok(annotated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cohort::{select_cohort, RankedSuburb};
    use crate::test_utils::featured;

    #[test]
    fn test_classify_thresholds() {
        let t = OutlierThresholds::default();
        assert_eq!(t.classify(-0.31), PriceBand::Underpriced);
        assert_eq!(t.classify(-0.30), PriceBand::Typical);
        assert_eq!(t.classify(0.0), PriceBand::Typical);
        assert_eq!(t.classify(0.50), PriceBand::Typical);
        assert_eq!(t.classify(0.51), PriceBand::Overpriced);
    }

    #[test]
    fn test_deviation_from_suburb_median() {
        let listings = vec![
            featured("Kew", 600_000.0),
            featured("Kew", 1_000_000.0),
            featured("Kew", 2_000_000.0),
        ];
        let cohort = select_cohort(&listings, 5);
        let annotated = annotate(&cohort, &OutlierThresholds::default()).unwrap();

        let deviations: Vec<f64> = annotated
            .listings
            .iter()
            .map(|l| l.deviation.unwrap())
            .collect();
        assert!((deviations[0] + 0.4).abs() < 1e-12);
        assert!(deviations[1].abs() < 1e-12);
        assert!((deviations[2] - 1.0).abs() < 1e-12);

        assert_eq!(annotated.underpriced, 1);
        assert_eq!(annotated.typical, 1);
        assert_eq!(annotated.overpriced, 1);
        assert!(annotated
            .listings
            .iter()
            .all(|l| l.suburb_median == Some(1_000_000.0)));
    }

    #[test]
    fn test_custom_thresholds() {
        let listings = vec![
            featured("Kew", 800_000.0),
            featured("Kew", 1_000_000.0),
            featured("Kew", 1_200_000.0),
        ];
        let cohort = select_cohort(&listings, 5);
        let thresholds = OutlierThresholds {
            underpriced: -0.1,
            overpriced: 0.1,
        };
        let annotated = annotate(&cohort, &thresholds).unwrap();
        assert_eq!(annotated.underpriced, 1);
        assert_eq!(annotated.overpriced, 1);
    }

    #[test]
    fn test_zero_median_gives_undefined_deviation() {
        let listings = vec![featured("Kew", 0.0), featured("Kew", 0.0), featured("Kew", 5.0)];
        let cohort = select_cohort(&listings, 5);
        let annotated = annotate(&cohort, &OutlierThresholds::default()).unwrap();
        assert!(annotated.listings.iter().all(|l| l.deviation.is_none()));
        assert_eq!(annotated.unclassified, 3);
    }

    #[test]
    fn test_missing_price_is_unclassified() {
        let mut no_price = featured("Kew", 1.0);
        no_price.listing.price = None;
        let listings = vec![featured("Kew", 500_000.0), no_price];
        let cohort = select_cohort(&listings, 5);
        let annotated = annotate(&cohort, &OutlierThresholds::default()).unwrap();
        assert_eq!(annotated.listings[1].deviation, None);
        assert_eq!(annotated.listings[1].suburb_median, Some(500_000.0));
        assert_eq!(annotated.unclassified, 1);
    }

    #[test]
    fn test_cohort_medians_exclude_non_members() {
        let listings = vec![
            featured("Kew", 1_000_000.0),
            featured("Kew", 1_200_000.0),
            featured("Reservoir", 600_000.0),
        ];

        let global = suburb_medians(&listings);
        let cohort = select_cohort(&listings, 1);
        let local = suburb_medians(&cohort.listings);

        assert_ne!(global, local);
        assert!(global.contains_key("Reservoir"));
        assert!(!local.contains_key("Reservoir"));
    }

    #[test]
    fn test_empty_cohort_suburb_violates_invariant() {
        let cohort = Cohort {
            ranking: vec![RankedSuburb {
                suburb: "Ghost".into(),
                transaction_count: 3,
            }],
            listings: vec![],
            retained_fraction: None,
        };
        assert!(matches!(
            annotate(&cohort, &OutlierThresholds::default()),
            Err(Error::Invariant(_))
        ));
    }
}
