//! Cleaning rules for raw sales data
//!
//! Rules:
//! 1. Normalize suburb names (trim, title case)
//! 2. Reject listings with land size <= 0 or > 50,000 sqm
//! 3. Fill missing car spaces with 0
//!
//! Nothing else is repaired. Listings missing price, land size or suburb
//! pass through and produce undefined derived values downstream.

use serde::Serialize;
use tracing::{debug, info};

use crate::models::{Listing, RawTable};

/// Upper sanity bound for land size (sqm)
pub const MAX_LANDSIZE: f64 = 50_000.0;

/// What the cleaner changed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleaningStats {
    pub initial_count: usize,
    pub final_count: usize,
    pub removed_count: usize,
    pub renamed_count: usize,
    pub landsize_rejections: usize,
    /// Completeness before cleaning (percent, one decimal)
    pub completeness_before: f64,
    /// Completeness after cleaning (percent, one decimal)
    pub completeness_after: f64,
}

/// Title-case a suburb name after trimming surrounding whitespace
///
/// The first letter of every alphabetic run is upper-cased and the rest
/// lower-cased, so "st kilda east" becomes "St Kilda East" and
/// "o'connor" becomes "O'Connor".
pub fn normalize_suburb(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_word = false;

    for c in raw.trim().chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                // Multi-char expansions ("ß" -> "SS") keep only the first upper
                let mut upper = c.to_uppercase();
                out.extend(upper.next());
                out.extend(upper.flat_map(char::to_lowercase));
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }

    out
}

/// Whether a land size passes the sanity bounds
///
/// Missing land sizes are not rejected.
pub fn landsize_is_valid(landsize: Option<f64>) -> bool {
    match landsize {
        Some(size) => size > 0.0 && size <= MAX_LANDSIZE,
        None => true,
    }
}

/// Apply the cleaning rules, returning the cleaned table and its statistics
pub fn clean(table: &RawTable) -> (RawTable, CleaningStats) {
    let initial_count = table.len();
    let completeness_before = table.completeness_pct();

    let mut renamed_count = 0;
    let mut landsize_rejections = 0;
    let mut listings = Vec::with_capacity(table.len());

    for listing in &table.listings {
        let suburb = listing.suburb.as_deref().map(|raw| {
            let normalized = normalize_suburb(raw);
            if normalized != raw {
                renamed_count += 1;
            }
            normalized
        });

        if !landsize_is_valid(listing.landsize) {
            landsize_rejections += 1;
            debug!(
                row = listing.row,
                landsize = ?listing.landsize,
                "Rejected listing with invalid land size"
            );
            continue;
        }

        listings.push(Listing {
            suburb,
            car: Some(listing.car.unwrap_or(0.0)),
            ..listing.clone()
        });
    }

    let cleaned = RawTable::new(table.extra_headers.clone(), listings);
    let final_count = cleaned.len();

    let stats = CleaningStats {
        initial_count,
        final_count,
        removed_count: initial_count - final_count,
        renamed_count,
        landsize_rejections,
        completeness_before: round_one_decimal(completeness_before),
        completeness_after: round_one_decimal(cleaned.completeness_pct()),
    };

    info!(
        initial = stats.initial_count,
        kept = stats.final_count,
        renamed = stats.renamed_count,
        landsize_rejections = stats.landsize_rejections,
        "Cleaning complete"
    );

    (cleaned, stats)
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::ListingBuilder;

    #[test]
    fn test_normalize_suburb() {
        assert_eq!(normalize_suburb("  st kilda "), "St Kilda");
        assert_eq!(normalize_suburb("MOONEE PONDS"), "Moonee Ponds");
        assert_eq!(normalize_suburb("o'connor"), "O'Connor");
        assert_eq!(normalize_suburb("Box Hill-north"), "Box Hill-North");
    }

    #[test]
    fn test_normalize_suburb_is_idempotent() {
        for raw in ["  st kilda ", "RESERVOIR", "glen iris", "Kew East", "ßchwabing"] {
            let once = normalize_suburb(raw);
            assert_eq!(normalize_suburb(&once), once);
            assert_eq!(once.trim(), once);
        }
    }

    #[test]
    fn test_normalize_suburb_expanding_uppercase() {
        assert_eq!(normalize_suburb("ßchwabing"), "Sschwabing");
        assert_eq!(normalize_suburb("Sschwabing"), "Sschwabing");
    }

    #[test]
    fn test_zero_landsize_is_rejected() {
        let table = RawTable::new(
            vec![],
            vec![
                ListingBuilder::new("Reservoir").landsize(0.0).build(),
                ListingBuilder::new("Reservoir").landsize(500.0).build(),
            ],
        );

        let (cleaned, stats) = clean(&table);
        assert_eq!(cleaned.len(), 1);
        assert_eq!(stats.landsize_rejections, 1);
        assert_eq!(stats.removed_count, 1);
        assert!(cleaned
            .listings
            .iter()
            .all(|l| l.landsize.is_some_and(|s| s > 0.0)));
    }

    #[test]
    fn test_landsize_bounds() {
        assert!(!landsize_is_valid(Some(-1.0)));
        assert!(!landsize_is_valid(Some(0.0)));
        assert!(landsize_is_valid(Some(1.0)));
        assert!(landsize_is_valid(Some(MAX_LANDSIZE)));
        assert!(!landsize_is_valid(Some(MAX_LANDSIZE + 1.0)));
        assert!(landsize_is_valid(None));
    }

    #[test]
    fn test_renamed_count_and_car_fill() {
        let table = RawTable::new(
            vec![],
            vec![
                ListingBuilder::new(" coburg").car(None).build(),
                ListingBuilder::new("Coburg").car(Some(2.0)).build(),
                ListingBuilder::new("BRUNSWICK").build(),
            ],
        );

        let (cleaned, stats) = clean(&table);
        assert_eq!(stats.renamed_count, 2);
        assert_eq!(cleaned.listings[0].suburb.as_deref(), Some("Coburg"));
        assert_eq!(cleaned.listings[0].car, Some(0.0));
        assert_eq!(cleaned.listings[1].car, Some(2.0));
        assert_eq!(cleaned.listings[2].suburb.as_deref(), Some("Brunswick"));
    }

    #[test]
    fn test_missing_required_fields_pass_through() {
        let mut no_suburb = ListingBuilder::new("x").price(None).build();
        no_suburb.suburb = None;
        let table = RawTable::new(vec![], vec![no_suburb]);

        let (cleaned, stats) = clean(&table);
        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned.listings[0].suburb, None);
        assert_eq!(cleaned.listings[0].price, None);
        assert_eq!(stats.renamed_count, 0);
    }

    #[test]
    fn test_completeness_improves_with_car_fill() {
        let table = RawTable::new(
            vec![],
            vec![
                ListingBuilder::new("Kew").car(None).build(),
                ListingBuilder::new("Kew").build(),
            ],
        );

        let (_, stats) = clean(&table);
        // 16 cells, one missing car before cleaning
        assert_eq!(stats.completeness_before, 93.8);
        assert_eq!(stats.completeness_after, 100.0);
    }
}
