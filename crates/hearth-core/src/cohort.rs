//! Top-N suburb cohort selection
//!
//! Bounds the reporting scope to the suburbs with the most sales. The
//! ranking is computed once over the full featured set and every later
//! stage works on the resulting subset.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::info;

use crate::models::FeaturedListing;
use crate::stats;

/// Default number of suburbs kept for analysis
pub const DEFAULT_COHORT_SIZE: usize = 20;

/// A suburb's position in the volume ranking
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedSuburb {
    pub suburb: String,
    pub transaction_count: usize,
}

/// The analysis cohort: ranked suburbs and their listings
#[derive(Debug, Clone)]
pub struct Cohort {
    /// Suburbs by descending sales count, ties in first-seen order
    pub ranking: Vec<RankedSuburb>,
    /// Listings whose suburb is in the ranking, in input order
    pub listings: Vec<FeaturedListing>,
    /// Listings kept / listings supplied
    pub retained_fraction: Option<f64>,
}

impl Cohort {
    pub fn suburbs(&self) -> impl Iterator<Item = &str> {
        self.ranking.iter().map(|r| r.suburb.as_str())
    }

    pub fn contains(&self, suburb: &str) -> bool {
        self.ranking.iter().any(|r| r.suburb == suburb)
    }
}

/// Rank suburbs by sales count
///
/// Ties keep the order in which suburbs were first encountered. Listings
/// without a suburb are not counted.
pub fn rank_suburbs(listings: &[FeaturedListing]) -> Vec<RankedSuburb> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut first_seen: Vec<&str> = Vec::new();

    for suburb in listings.iter().filter_map(FeaturedListing::suburb) {
        let count = counts.entry(suburb).or_insert_with(|| {
            first_seen.push(suburb);
            0
        });
        *count += 1;
    }

    let mut ranking: Vec<RankedSuburb> = first_seen
        .into_iter()
        .map(|suburb| RankedSuburb {
            suburb: suburb.to_string(),
            transaction_count: counts[suburb],
        })
        .collect();

    // Stable sort keeps first-seen order among equal counts
    ranking.sort_by(|a, b| b.transaction_count.cmp(&a.transaction_count));
    ranking
}

/// Select the top `size` suburbs and their listings
pub fn select_cohort(listings: &[FeaturedListing], size: usize) -> Cohort {
    let mut ranking = rank_suburbs(listings);
    ranking.truncate(size);

    let members: HashSet<&str> = ranking.iter().map(|r| r.suburb.as_str()).collect();
    let subset: Vec<FeaturedListing> = listings
        .iter()
        .filter(|l| l.suburb().is_some_and(|s| members.contains(s)))
        .cloned()
        .collect();

    let retained_fraction = stats::ratio(subset.len() as f64, listings.len() as f64);

    info!(
        suburbs = ranking.len(),
        listings = subset.len(),
        retained_fraction = ?retained_fraction,
        "Cohort selected"
    );

    Cohort {
        ranking,
        listings: subset,
        retained_fraction,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::featured;

    fn suburbs(names: &[&str]) -> Vec<FeaturedListing> {
        names.iter().map(|n| featured(n, 500_000.0)).collect()
    }

    #[test]
    fn test_rank_by_count_descending() {
        let listings = suburbs(&["A", "B", "B", "C", "B", "C"]);
        let ranking = rank_suburbs(&listings);
        let names: Vec<&str> = ranking.iter().map(|r| r.suburb.as_str()).collect();
        assert_eq!(names, vec!["B", "C", "A"]);
        assert_eq!(ranking[0].transaction_count, 3);
    }

    #[test]
    fn test_ties_break_by_first_seen() {
        let listings = suburbs(&["Kew", "Coburg", "Brunswick", "Coburg", "Kew", "Brunswick"]);
        let ranking = rank_suburbs(&listings);
        let names: Vec<&str> = ranking.iter().map(|r| r.suburb.as_str()).collect();
        assert_eq!(names, vec!["Kew", "Coburg", "Brunswick"]);
    }

    #[test]
    fn test_selection_is_deterministic() {
        let listings = suburbs(&["A", "B", "C", "D", "C", "B", "D", "A"]);
        let first = select_cohort(&listings, 2);
        let second = select_cohort(&listings, 2);
        assert_eq!(first.ranking, second.ranking);
        assert_eq!(first.listings, second.listings);
    }

    #[test]
    fn test_subset_and_retained_fraction() {
        let listings = suburbs(&["A", "A", "A", "B", "B", "C"]);
        let cohort = select_cohort(&listings, 2);
        assert_eq!(cohort.listings.len(), 5);
        assert!(cohort.contains("A"));
        assert!(cohort.contains("B"));
        assert!(!cohort.contains("C"));
        assert!((cohort.retained_fraction.unwrap() - 5.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_listings_without_suburb_never_rank() {
        let mut listings = suburbs(&["A"]);
        let mut orphan = featured("x", 1.0);
        orphan.listing.suburb = None;
        listings.push(orphan.clone());
        listings.push(orphan);

        let cohort = select_cohort(&listings, 5);
        assert_eq!(cohort.ranking.len(), 1);
        assert_eq!(cohort.listings.len(), 1);
    }

    #[test]
    fn test_empty_input_has_undefined_fraction() {
        let cohort = select_cohort(&[], 20);
        assert!(cohort.ranking.is_empty());
        assert_eq!(cohort.retained_fraction, None);
    }
}
