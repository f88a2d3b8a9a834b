//! Persisted listing tables and insight export
//!
//! Supports:
//! - Cleaned listings CSV (source columns only)
//! - Analysis CSV (source columns, then derived and annotation columns)
//! - Insight JSON
//!
//! Column order is stable across runs: known source columns, extra source
//! columns in file order, then derived columns in a fixed order. Missing
//! source cells are written empty; undefined derived values are written as
//! `undefined`.

use std::io::Write;

use crate::error::Result;
use crate::insights::InsightReport;
use crate::models::{AnnotatedListing, Listing, RawTable, KNOWN_COLUMNS};

/// Text written for an undefined derived value
pub const UNDEFINED: &str = "undefined";

/// Columns added by the feature engine
pub const DERIVED_COLUMNS: [&str; 5] = [
    "Price_per_sqm",
    "Year",
    "Month",
    "Quarter",
    "PropertyType",
];

/// Columns added by the outlier annotator
pub const ANNOTATION_COLUMNS: [&str; 3] = ["Suburb_Median", "Price_Deviation", "Price_Band"];

/// Derived value text, `undefined` when absent
pub fn derived(value: Option<impl ToString>) -> String {
    value.map_or_else(|| UNDEFINED.to_string(), |v| v.to_string())
}

fn source(value: Option<impl ToString>) -> String {
    value.map_or_else(String::new, |v| v.to_string())
}

fn source_headers(extra_headers: &[String]) -> Vec<String> {
    KNOWN_COLUMNS
        .iter()
        .map(|c| c.to_string())
        .chain(extra_headers.iter().cloned())
        .collect()
}

fn source_record(listing: &Listing) -> Vec<String> {
    let mut record = vec![
        source(listing.suburb.as_deref()),
        source(listing.rooms),
        source(listing.type_code.as_deref()),
        source(listing.price),
        source(listing.date.as_deref()),
        source(listing.distance),
        source(listing.car),
        source(listing.landsize),
    ];
    record.extend(listing.extras.iter().map(|e| source(e.as_deref())));
    record
}

/// Write the cleaned table
pub fn write_cleaned<W: Write>(writer: W, table: &RawTable) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(source_headers(&table.extra_headers))?;

    for listing in &table.listings {
        csv.write_record(source_record(listing))?;
    }

    csv.flush()?;
    Ok(())
}

/// Header of the analysis table
pub fn analysis_headers(extra_headers: &[String]) -> Vec<String> {
    let mut headers = source_headers(extra_headers);
    headers.extend(DERIVED_COLUMNS.iter().map(|c| c.to_string()));
    headers.extend(ANNOTATION_COLUMNS.iter().map(|c| c.to_string()));
    headers
}

/// Write the annotated cohort listings
pub fn write_analysis<W: Write>(
    writer: W,
    extra_headers: &[String],
    listings: &[AnnotatedListing],
) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(analysis_headers(extra_headers))?;

    for annotated in listings {
        let featured = &annotated.featured;
        let mut record = source_record(&featured.listing);
        record.extend([
            derived(featured.price_per_sqm),
            derived(featured.year),
            derived(featured.month),
            derived(featured.quarter.as_deref()),
            derived(featured.property_type),
            derived(annotated.suburb_median),
            derived(annotated.deviation),
            derived(annotated.band),
        ]);
        csv.write_record(record)?;
    }

    csv.flush()?;
    Ok(())
}

/// Write findings and analyzer failures as pretty JSON
pub fn write_insights<W: Write>(writer: W, report: &InsightReport) -> Result<()> {
    serde_json::to_writer_pretty(writer, report)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{annotate_all, featured, ListingBuilder};

    fn render(write: impl FnOnce(&mut Vec<u8>) -> Result<()>) -> String {
        let mut buf = Vec::new();
        write(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_cleaned_headers_and_missing_cells() {
        let mut listing = ListingBuilder::new("Kew").price(None).build();
        listing.extras = vec![Some("Smith St".into()), None];
        let table = RawTable::new(vec!["Address".into(), "SellerG".into()], vec![listing]);

        let out = render(|w| write_cleaned(w, &table));
        let mut lines = out.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Suburb,Rooms,Type,Price,Date,Distance,Car,Landsize,Address,SellerG"
        );
        assert_eq!(lines.next().unwrap(), "Kew,3,h,,1/07/2016,5,1,500,Smith St,");
    }

    #[test]
    fn test_analysis_undefined_ratios() {
        let mut listings = vec![featured("Kew", 0.0), featured("Kew", 0.0)];
        listings[1].price_per_sqm = None;
        let annotated = annotate_all(listings);

        let out = render(|w| write_analysis(w, &[], &annotated));
        let mut lines = out.lines();
        let header = lines.next().unwrap();
        assert!(header.ends_with(
            "Price_per_sqm,Year,Month,Quarter,PropertyType,Suburb_Median,Price_Deviation,Price_Band"
        ));
        let second = out.lines().nth(2).unwrap();
        assert!(second.ends_with("undefined,2016,7,2016Q3,House,0,undefined,undefined"));
    }

    #[test]
    fn test_insights_json_nulls() {
        let report = InsightReport::default();
        let out = render(|w| write_insights(w, &report));
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert!(value["findings"].as_array().unwrap().is_empty());
        assert!(value["failures"].as_array().unwrap().is_empty());
    }
}
