//! Derived per-listing features
//!
//! Features added:
//! - Price per sqm (price / land size)
//! - Year, month and quarter label from the sale date
//! - Human-readable property type from the type code

use chrono::{Datelike, NaiveDate};
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::models::{FeaturedListing, Listing, PropertyType};
use crate::stats;

/// Fixed sale-date format of the source data (e.g. 3/12/2016)
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// Parse a sale date in the fixed day/month/year format
pub fn parse_sale_date(row: usize, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| Error::MalformedDate {
        row,
        value: value.to_string(),
    })
}

/// Quarter label such as "2016Q2" (quarter = ceil(month / 3))
pub fn quarter_label(date: NaiveDate) -> String {
    format!("{}Q{}", date.year(), date.month().div_ceil(3))
}

/// Derive features for every cleaned listing
///
/// One output per input, in input order. A date that is present but does
/// not match the fixed format fails the whole run. Unrecognized type codes
/// produce an undefined label, or an error when `strict_property_types`
/// is set.
pub fn add_features(
    listings: &[Listing],
    strict_property_types: bool,
) -> Result<Vec<FeaturedListing>> {
    let mut featured = Vec::with_capacity(listings.len());
    let mut unknown_codes = 0usize;

    for listing in listings {
        let date = listing
            .date
            .as_deref()
            .map(|value| parse_sale_date(listing.row, value))
            .transpose()?;

        let property_type = match listing.type_code.as_deref() {
            Some(code) => {
                let mapped = PropertyType::from_code(code);
                if mapped.is_none() {
                    if strict_property_types {
                        return Err(Error::UnknownPropertyType {
                            row: listing.row,
                            code: code.to_string(),
                        });
                    }
                    unknown_codes += 1;
                }
                mapped
            }
            None => None,
        };

        let price_per_sqm = match (listing.price, listing.landsize) {
            (Some(price), Some(landsize)) => stats::ratio(price, landsize),
            _ => None,
        };

        featured.push(FeaturedListing {
            listing: listing.clone(),
            price_per_sqm,
            year: date.map(|d| d.year()),
            month: date.map(|d| d.month()),
            quarter: date.map(quarter_label),
            property_type,
        });
    }

    if unknown_codes > 0 {
        warn!(
            count = unknown_codes,
            "Listings with unrecognized property type codes left unlabeled"
        );
    }
    info!(count = featured.len(), "Features added");

    Ok(featured)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::ListingBuilder;

    #[test]
    fn test_quarter_label() {
        let cases = [
            (1, "2016Q1"),
            (3, "2016Q1"),
            (4, "2016Q2"),
            (6, "2016Q2"),
            (9, "2016Q3"),
            (10, "2016Q4"),
            (12, "2016Q4"),
        ];
        for (month, expected) in cases {
            let date = NaiveDate::from_ymd_opt(2016, month, 15).unwrap();
            assert_eq!(quarter_label(date), expected);
        }
    }

    #[test]
    fn test_parse_sale_date() {
        assert_eq!(
            parse_sale_date(1, "3/12/2016").unwrap(),
            NaiveDate::from_ymd_opt(2016, 12, 3).unwrap()
        );
        assert_eq!(
            parse_sale_date(1, "04/02/2016").unwrap(),
            NaiveDate::from_ymd_opt(2016, 2, 4).unwrap()
        );
    }

    #[test]
    fn test_malformed_date_fails_run() {
        let listings = vec![
            ListingBuilder::new("Kew").date("3/12/2016").build(),
            ListingBuilder::new("Kew").date("2016-12-03").row(2).build(),
        ];

        let err = add_features(&listings, false).unwrap_err();
        match err {
            Error::MalformedDate { row, value } => {
                assert_eq!(row, 2);
                assert_eq!(value, "2016-12-03");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_features_derived() {
        let listings = vec![ListingBuilder::new("Kew")
            .price(1_000_000.0)
            .landsize(400.0)
            .date("15/08/2017")
            .type_code("u")
            .build()];

        let featured = add_features(&listings, false).unwrap();
        assert_eq!(featured.len(), 1);
        let f = &featured[0];
        assert_eq!(f.price_per_sqm, Some(2500.0));
        assert_eq!(f.year, Some(2017));
        assert_eq!(f.month, Some(8));
        assert_eq!(f.quarter.as_deref(), Some("2017Q3"));
        assert_eq!(f.property_type, Some(PropertyType::Unit));
    }

    #[test]
    fn test_unknown_type_code_is_undefined_label() {
        let listings = vec![ListingBuilder::new("Kew").type_code("x").build()];
        let featured = add_features(&listings, false).unwrap();
        assert_eq!(featured[0].property_type, None);
    }

    #[test]
    fn test_unknown_type_code_strict_mode() {
        let listings = vec![ListingBuilder::new("Kew").type_code("x").build()];
        assert!(matches!(
            add_features(&listings, true),
            Err(Error::UnknownPropertyType { .. })
        ));
    }

    #[test]
    fn test_missing_inputs_give_undefined_features() {
        let listings = vec![ListingBuilder::new("Kew")
            .price(None)
            .date(None)
            .build()];
        let featured = add_features(&listings, false).unwrap();
        assert_eq!(featured[0].price_per_sqm, None);
        assert_eq!(featured[0].quarter, None);
        assert_eq!(featured[0].year, None);
    }
}
