//! Grouped market statistics over the annotated cohort
//!
//! Three reductions feed both the insight synthesizer and the report:
//! - by suburb
//! - by quarter, with quarter-over-quarter growth
//! - by suburb x property type (and suburb x bedrooms for houses), computed
//!   as a grouping pass followed by a separate pivot pass
//!
//! Suburb rows also carry their distance to the market median and a rating,
//! and house vs unit premiums carry buying advice; both use configured
//! thresholds.
//!
//! All values are kept at full precision. Rounding for display happens in
//! the report layer, after every ratio has been computed.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::models::{
    AnnotatedListing, BedroomPremium, BedroomPremiumTable, PremiumAdvice, PropertyType,
    PropertyTypeMedians, PropertyTypePremium, QuarterSummary, SuburbRating, SuburbSummary,
};
use crate::stats;

/// How to treat suburbs whose listings disagree on distance to the CBD
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceCheck {
    /// Fail the run
    Strict,
    /// Log, keep the first observed value and flag the row
    #[default]
    Warn,
}

impl std::str::FromStr for DistanceCheck {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "warn" => Ok(Self::Warn),
            _ => Err(format!(
                "Unknown distance check: {} (valid: strict, warn)",
                s
            )),
        }
    }
}

/// Room counts compared by the bedroom premium
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BedroomLevels {
    pub base: u32,
    pub upper: u32,
}

impl Default for BedroomLevels {
    fn default() -> Self {
        Self { base: 3, upper: 4 }
    }
}

/// Cut-offs on a suburb's distance to the market median
///
/// A suburb is a value buy below `value_buy`, below market under
/// `below_market`, at market under `at_market`, and premium otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingThresholds {
    pub value_buy: f64,
    pub below_market: f64,
    pub at_market: f64,
}

impl Default for RatingThresholds {
    fn default() -> Self {
        Self {
            value_buy: -0.30,
            below_market: 0.0,
            at_market: 0.30,
        }
    }
}

impl RatingThresholds {
    pub fn rate(&self, vs_market: f64) -> SuburbRating {
        if vs_market < self.value_buy {
            SuburbRating::ValueBuy
        } else if vs_market < self.below_market {
            SuburbRating::BelowMarket
        } else if vs_market < self.at_market {
            SuburbRating::AtMarket
        } else {
            SuburbRating::Premium
        }
    }
}

/// Cut-offs on the house vs unit premium
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdviceThresholds {
    /// Premium above this suggests buying a unit (default 1.0)
    pub high_premium: f64,
    /// Premium above this makes units good value (default 0.5)
    pub unit_value: f64,
}

impl Default for AdviceThresholds {
    fn default() -> Self {
        Self {
            high_premium: 1.0,
            unit_value: 0.5,
        }
    }
}

impl AdviceThresholds {
    pub fn advise(&self, premium: f64) -> PremiumAdvice {
        if premium > self.high_premium {
            PremiumAdvice::BuyUnit
        } else if premium > self.unit_value {
            PremiumAdvice::UnitValue
        } else {
            PremiumAdvice::Competitive
        }
    }
}

/// Options for the aggregation stage
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AggregateOptions {
    pub distance_check: DistanceCheck,
    pub bedrooms: BedroomLevels,
    pub ratings: RatingThresholds,
    pub advice: AdviceThresholds,
}

/// Every aggregate table produced by one run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateTables {
    /// Median price over every aggregated listing
    pub market_median: Option<f64>,
    pub suburbs: Vec<SuburbSummary>,
    pub quarters: Vec<QuarterSummary>,
    pub property_types: Vec<PropertyTypeMedians>,
    pub type_premiums: Vec<PropertyTypePremium>,
    pub bedroom_premiums: BedroomPremiumTable,
}

impl AggregateTables {
    pub fn suburb(&self, name: &str) -> Option<&SuburbSummary> {
        self.suburbs.iter().find(|s| s.suburb == name)
    }

    pub fn quarter(&self, label: &str) -> Option<&QuarterSummary> {
        self.quarters.iter().find(|q| q.quarter == label)
    }

    /// First and last quarter with sales
    pub fn date_range(&self) -> Option<(&str, &str)> {
        let first = self.quarters.first()?;
        let last = self.quarters.last()?;
        Some((first.quarter.as_str(), last.quarter.as_str()))
    }
}

/// Run all reductions over the annotated cohort
pub fn aggregate(
    listings: &[AnnotatedListing],
    options: &AggregateOptions,
) -> Result<AggregateTables> {
    let prices: Vec<f64> = listings.iter().filter_map(|l| l.price()).collect();
    let market_median = stats::median(&prices);

    let mut suburbs = by_suburb(listings, options.distance_check)?;
    rate_suburbs(&mut suburbs, market_median, &options.ratings);
    let quarters = by_quarter(listings);

    let type_medians = group_medians(listings, |l| {
        Some((l.suburb()?.to_string(), l.featured.property_type?))
    });
    let property_types = pivot_property_types(&type_medians);
    let type_premiums = property_type_premiums(&property_types, &options.advice);
    let bedroom_premiums = bedroom_premiums(listings, options.bedrooms);

    info!(
        suburbs = suburbs.len(),
        quarters = quarters.len(),
        type_premiums = type_premiums.len(),
        bedroom_premiums = bedroom_premiums.rows.len(),
        "Aggregation complete"
    );

    Ok(AggregateTables {
        market_median,
        suburbs,
        quarters,
        property_types,
        type_premiums,
        bedroom_premiums,
    })
}

/// Descending order with undefined values last
fn desc_undefined_last(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn collect_values(
    listings: &[&AnnotatedListing],
    value: impl Fn(&AnnotatedListing) -> Option<f64>,
) -> Vec<f64> {
    listings.iter().filter_map(|&l| value(l)).collect()
}

/// Per-suburb statistics, sorted by descending median price
///
/// Distance is the first observed value. Its uniqueness within the suburb
/// is checked according to `check`.
pub fn by_suburb(
    listings: &[AnnotatedListing],
    check: DistanceCheck,
) -> Result<Vec<SuburbSummary>> {
    let mut groups: BTreeMap<&str, Vec<&AnnotatedListing>> = BTreeMap::new();
    for listing in listings {
        if let Some(suburb) = listing.suburb() {
            groups.entry(suburb).or_default().push(listing);
        }
    }

    let mut rows = Vec::with_capacity(groups.len());

    for (suburb, members) in groups {
        let prices = collect_values(&members, |l| l.price());
        let distances = collect_values(&members, |l| l.featured.listing.distance);

        let distance = distances.first().copied();
        let distance_consistent = distances
            .iter()
            .all(|d| distance.is_some_and(|first| (d - first).abs() < 1e-9));

        if !distance_consistent {
            match check {
                DistanceCheck::Strict => {
                    return Err(Error::Invariant(format!(
                        "suburb '{}' has more than one distance to the CBD",
                        suburb
                    )));
                }
                DistanceCheck::Warn => {
                    warn!(suburb, "Suburb listings disagree on distance; using first observed");
                }
            }
        }

        rows.push(SuburbSummary {
            suburb: suburb.to_string(),
            transaction_count: members.len(),
            median_price: stats::median(&prices),
            mean_price: stats::mean(&prices),
            min_price: prices.iter().copied().reduce(f64::min),
            max_price: prices.iter().copied().reduce(f64::max),
            median_price_per_sqm: stats::median(&collect_values(&members, |l| {
                l.featured.price_per_sqm
            })),
            median_rooms: stats::median(&collect_values(&members, |l| {
                l.featured.listing.rooms.map(f64::from)
            })),
            median_landsize: stats::median(&collect_values(&members, |l| {
                l.featured.listing.landsize
            })),
            distance,
            distance_consistent,
            vs_market: None,
            rating: None,
        });
    }

    rows.sort_by(|a, b| desc_undefined_last(a.median_price, b.median_price));
    Ok(rows)
}

/// Rating pass: compare each suburb median with the market median
///
/// Rows stay unrated when either median is undefined or the market
/// median is zero.
pub fn rate_suburbs(
    rows: &mut [SuburbSummary],
    market_median: Option<f64>,
    thresholds: &RatingThresholds,
) {
    for row in rows {
        row.vs_market = match (row.median_price, market_median) {
            (Some(median), Some(market)) => stats::relative_change(median, market),
            _ => None,
        };
        row.rating = row.vs_market.map(|v| thresholds.rate(v));
    }
}

/// Per-quarter statistics in chronological order with growth over the
/// previous quarter
pub fn by_quarter(listings: &[AnnotatedListing]) -> Vec<QuarterSummary> {
    let mut groups: BTreeMap<&str, Vec<&AnnotatedListing>> = BTreeMap::new();
    for listing in listings {
        if let Some(quarter) = listing.featured.quarter.as_deref() {
            groups.entry(quarter).or_default().push(listing);
        }
    }

    let mut rows: Vec<QuarterSummary> = Vec::with_capacity(groups.len());
    let mut previous_median: Option<f64> = None;

    // BTreeMap iteration is lexicographic, which is chronological for
    // "YYYYQn" labels
    for (index, (quarter, members)) in groups.into_iter().enumerate() {
        let prices = collect_values(&members, |l| l.price());
        let median_price = stats::median(&prices);

        let qoq_growth = if index == 0 {
            None
        } else {
            match (median_price, previous_median) {
                (Some(current), Some(previous)) => stats::relative_change(current, previous),
                _ => None,
            }
        };

        rows.push(QuarterSummary {
            quarter: quarter.to_string(),
            transaction_count: members.len(),
            median_price,
            mean_price: stats::mean(&prices),
            median_price_per_sqm: stats::median(&collect_values(&members, |l| {
                l.featured.price_per_sqm
            })),
            qoq_growth,
        });
        previous_median = median_price;
    }

    rows
}

/// Grouping pass: median price per (suburb, key)
///
/// Listings for which `key` returns None are skipped, as are groups with
/// no priced listing.
pub fn group_medians<K: Ord>(
    listings: &[AnnotatedListing],
    key: impl Fn(&AnnotatedListing) -> Option<(String, K)>,
) -> BTreeMap<(String, K), f64> {
    let mut groups: BTreeMap<(String, K), Vec<f64>> = BTreeMap::new();
    for listing in listings {
        let (Some(group), Some(price)) = (key(listing), listing.price()) else {
            continue;
        };
        groups.entry(group).or_default().push(price);
    }

    groups
        .into_iter()
        .filter_map(|(group, prices)| stats::median(&prices).map(|m| (group, m)))
        .collect()
}

/// Pivot pass: one wide row per suburb with a median per property type
pub fn pivot_property_types(
    medians: &BTreeMap<(String, PropertyType), f64>,
) -> Vec<PropertyTypeMedians> {
    let mut rows: BTreeMap<&str, PropertyTypeMedians> = BTreeMap::new();

    for ((suburb, property_type), median) in medians {
        let row = rows
            .entry(suburb.as_str())
            .or_insert_with(|| PropertyTypeMedians {
                suburb: suburb.clone(),
                house: None,
                unit: None,
                townhouse: None,
            });
        match property_type {
            PropertyType::House => row.house = Some(*median),
            PropertyType::Unit => row.unit = Some(*median),
            PropertyType::Townhouse => row.townhouse = Some(*median),
        }
    }

    rows.into_values().collect()
}

/// House vs unit premium for suburbs with both types, highest first
pub fn property_type_premiums(
    pivot: &[PropertyTypeMedians],
    advice: &AdviceThresholds,
) -> Vec<PropertyTypePremium> {
    let mut premiums: Vec<PropertyTypePremium> = pivot
        .iter()
        .filter_map(|row| {
            let (house, unit) = (row.house?, row.unit?);
            let premium = stats::relative_change(house, unit);
            Some(PropertyTypePremium {
                suburb: row.suburb.clone(),
                house,
                unit,
                townhouse: row.townhouse,
                premium,
                advice: premium.map(|p| advice.advise(p)),
            })
        })
        .collect();

    debug!(
        suburbs = pivot.len(),
        with_both = premiums.len(),
        "Property type premiums computed"
    );

    premiums.sort_by(|a, b| desc_undefined_last(a.premium, b.premium));
    premiums
}

/// Bedroom premium for houses: upper vs base room count per suburb
///
/// Suburbs without a priced house at both room counts are excluded.
pub fn bedroom_premiums(
    listings: &[AnnotatedListing],
    levels: BedroomLevels,
) -> BedroomPremiumTable {
    let medians = group_medians(listings, |l| {
        if l.featured.property_type != Some(PropertyType::House) {
            return None;
        }
        Some((l.suburb()?.to_string(), l.featured.listing.rooms?))
    });

    // Pivot to suburb -> rooms -> median
    let mut pivot: BTreeMap<&str, BTreeMap<u32, f64>> = BTreeMap::new();
    for ((suburb, rooms), median) in &medians {
        pivot.entry(suburb.as_str()).or_default().insert(*rooms, *median);
    }

    let mut rows: Vec<BedroomPremium> = pivot
        .into_iter()
        .filter_map(|(suburb, by_rooms)| {
            let base_median = *by_rooms.get(&levels.base)?;
            let upper_median = *by_rooms.get(&levels.upper)?;
            Some(BedroomPremium {
                suburb: suburb.to_string(),
                base_median,
                upper_median,
                premium: stats::relative_change(upper_median, base_median),
            })
        })
        .collect();

    rows.sort_by(|a, b| desc_undefined_last(a.premium, b.premium));

    BedroomPremiumTable {
        base_rooms: levels.base,
        upper_rooms: levels.upper,
        rows,
    }
}
