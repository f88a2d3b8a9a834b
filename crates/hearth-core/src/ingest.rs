//! CSV ingestion and data-quality audit for raw sales data

use csv::{ReaderBuilder, StringRecord};
use serde::Serialize;
use std::io::Read;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{Listing, RawTable, KNOWN_COLUMNS};

/// Cell values treated as missing in addition to the empty string
const MISSING_TOKENS: [&str; 5] = ["NA", "N/A", "NaN", "nan", "null"];

/// Column positions of the known fields within a source file
struct ColumnMap {
    suburb: usize,
    rooms: usize,
    type_code: usize,
    price: usize,
    date: usize,
    distance: usize,
    car: usize,
    landsize: usize,
    extras: Vec<usize>,
}

impl ColumnMap {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| -> Result<usize> {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| Error::MalformedInput {
                    row: 0,
                    field: name.to_string(),
                    reason: "required column missing from header".into(),
                })
        };

        let extras = headers
            .iter()
            .enumerate()
            .filter(|(_, h)| !KNOWN_COLUMNS.contains(&h.trim()))
            .map(|(i, _)| i)
            .collect();

        Ok(Self {
            suburb: find("Suburb")?,
            rooms: find("Rooms")?,
            type_code: find("Type")?,
            price: find("Price")?,
            date: find("Date")?,
            distance: find("Distance")?,
            car: find("Car")?,
            landsize: find("Landsize")?,
            extras,
        })
    }
}

/// Parse a headed CSV of property sales into a raw table
///
/// Known columns are located by name; every other column is carried
/// through untouched. Empty cells are missing values. A non-empty cell
/// that does not parse as its column's type aborts the load.
pub fn parse_csv<R: Read>(reader: R) -> Result<RawTable> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let columns = ColumnMap::from_headers(&headers)?;
    let extra_headers = columns
        .extras
        .iter()
        .filter_map(|&i| headers.get(i))
        .map(|h| h.trim().to_string())
        .collect();

    let mut listings = Vec::new();

    for (idx, result) in rdr.records().enumerate() {
        let record = result?;
        let row = idx + 1;

        listings.push(Listing {
            row,
            // Suburb keeps its raw spelling so the cleaner can count fixes
            suburb: raw_cell(&record, columns.suburb).map(str::to_string),
            rooms: parse_count(row, "Rooms", cell(&record, columns.rooms))?,
            type_code: cell(&record, columns.type_code).map(str::to_string),
            price: parse_number(row, "Price", cell(&record, columns.price))?,
            date: cell(&record, columns.date).map(str::to_string),
            distance: parse_number(row, "Distance", cell(&record, columns.distance))?,
            car: parse_number(row, "Car", cell(&record, columns.car))?,
            landsize: parse_number(row, "Landsize", cell(&record, columns.landsize))?,
            extras: columns
                .extras
                .iter()
                .map(|&i| raw_cell(&record, i).map(str::to_string))
                .collect(),
        });
    }

    debug!(
        rows = listings.len(),
        extra_columns = columns.extras.len(),
        "Parsed sales CSV"
    );
    Ok(RawTable::new(extra_headers, listings))
}

/// Untrimmed cell value, or None when the cell is missing
fn raw_cell(record: &StringRecord, idx: usize) -> Option<&str> {
    let value = record.get(idx)?;
    let trimmed = value.trim();
    if trimmed.is_empty() || MISSING_TOKENS.contains(&trimmed) {
        None
    } else {
        Some(value)
    }
}

/// Trimmed cell value, or None when the cell is missing
fn cell(record: &StringRecord, idx: usize) -> Option<&str> {
    raw_cell(record, idx).map(str::trim)
}

/// Parse a numeric cell, tolerating currency symbols and thousands separators
///
/// NaN and infinity spellings (`-nan`, `NAN`, `inf`) are missing values.
fn parse_number(row: usize, field: &str, value: Option<&str>) -> Result<Option<f64>> {
    let Some(value) = value else {
        return Ok(None);
    };
    let cleaned = value.replace(['$', ','], "");
    let number = cleaned.parse::<f64>().map_err(|_| Error::MalformedInput {
        row,
        field: field.to_string(),
        reason: format!("expected a number, found '{}'", value),
    })?;
    Ok(number.is_finite().then_some(number))
}

/// Parse a whole-number cell; "3.0" is accepted as 3
fn parse_count(row: usize, field: &str, value: Option<&str>) -> Result<Option<u32>> {
    let Some(number) = parse_number(row, field, value)? else {
        return Ok(None);
    };
    if number < 0.0 || number.fract() != 0.0 || number > u32::MAX as f64 {
        return Err(Error::MalformedInput {
            row,
            field: field.to_string(),
            reason: format!("expected a whole number, found '{}'", value.unwrap_or_default()),
        });
    }
    Ok(Some(number as u32))
}

/// Missing-value count for one column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnMissing {
    pub column: String,
    pub missing: usize,
}

/// Data-quality snapshot of a table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditReport {
    pub total_rows: usize,
    pub total_columns: usize,
    pub completeness_pct: f64,
    pub missing_by_column: Vec<ColumnMissing>,
}

fn count_missing(listings: &[Listing], present: impl Fn(&Listing) -> bool) -> usize {
    listings.iter().filter(|l| !present(l)).count()
}

/// Compute completeness and per-column missing counts
pub fn audit(table: &RawTable) -> AuditReport {
    let listings = table.listings.as_slice();

    let mut missing_by_column = vec![
        ColumnMissing {
            column: "Suburb".into(),
            missing: count_missing(listings, |l| l.suburb.is_some()),
        },
        ColumnMissing {
            column: "Rooms".into(),
            missing: count_missing(listings, |l| l.rooms.is_some()),
        },
        ColumnMissing {
            column: "Type".into(),
            missing: count_missing(listings, |l| l.type_code.is_some()),
        },
        ColumnMissing {
            column: "Price".into(),
            missing: count_missing(listings, |l| l.price.is_some()),
        },
        ColumnMissing {
            column: "Date".into(),
            missing: count_missing(listings, |l| l.date.is_some()),
        },
        ColumnMissing {
            column: "Distance".into(),
            missing: count_missing(listings, |l| l.distance.is_some()),
        },
        ColumnMissing {
            column: "Car".into(),
            missing: count_missing(listings, |l| l.car.is_some()),
        },
        ColumnMissing {
            column: "Landsize".into(),
            missing: count_missing(listings, |l| l.landsize.is_some()),
        },
    ];

    for (i, header) in table.extra_headers.iter().enumerate() {
        missing_by_column.push(ColumnMissing {
            column: header.clone(),
            missing: count_missing(listings, |l| l.extras.get(i).is_some_and(|e| e.is_some())),
        });
    }

    AuditReport {
        total_rows: table.len(),
        total_columns: table.column_count(),
        completeness_pct: table.completeness_pct(),
        missing_by_column,
    }
}
