//! Report tables handed to the report builder
//!
//! [`MarketReport::from_output`] turns a pipeline run into display sheets:
//! price and count fields rounded to whole units, ratio fields left at full
//! precision. Presentation settings live in a [`ReportStyle`] value passed
//! to each [`ReportSink`]; nothing here is process-wide.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::Result;
use crate::export;
use crate::insights::{InsightReport, InsightType};
use crate::pipeline::PipelineOutput;
use crate::stats;

/// The sheets of a market report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SheetKind {
    Summary,
    SuburbAnalysis,
    QuarterlyTrends,
    PropertyTypes,
    TypePremiums,
    BedroomPremiums,
    RawData,
}

impl SheetKind {
    pub fn default_name(&self) -> &'static str {
        match self {
            Self::Summary => "Summary",
            Self::SuburbAnalysis => "Suburb_Analysis",
            Self::QuarterlyTrends => "Quarterly_Trends",
            Self::PropertyTypes => "Property_Types",
            Self::TypePremiums => "House_vs_Unit_Premium",
            Self::BedroomPremiums => "Bedroom_Premium",
            Self::RawData => "Raw_Data",
        }
    }
}

/// One display value
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(Option<String>),
    Count(usize),
    /// Price-like value, already rounded to whole units
    Price(Option<f64>),
    /// Plain measurement shown as-is (e.g., distance in km)
    Number(Option<f64>),
    /// Unrounded fraction shown as a percentage
    Ratio(Option<f64>),
    Flag(bool),
}

impl Cell {
    fn price(value: Option<f64>) -> Self {
        Self::Price(stats::round_display(value))
    }

    fn text(value: impl Into<String>) -> Self {
        Self::Text(Some(value.into()))
    }

    /// Machine-readable text, `undefined` for a missing value
    pub fn raw_text(&self) -> String {
        match self {
            Self::Text(v) => export::derived(v.as_deref()),
            Self::Count(n) => n.to_string(),
            Self::Price(v) | Self::Number(v) | Self::Ratio(v) => export::derived(*v),
            Self::Flag(b) => b.to_string(),
        }
    }
}

/// A named table with fixed headers
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub kind: SheetKind,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    fn new(kind: SheetKind, headers: &[&str]) -> Self {
        Self {
            kind,
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Cell in `row` under the named header
    pub fn cell(&self, row: usize, header: &str) -> Option<&Cell> {
        let column = self.headers.iter().position(|h| h == header)?;
        self.rows.get(row)?.get(column)
    }
}

/// Everything the report builder consumes from one run
#[derive(Debug, Clone)]
pub struct MarketReport {
    pub sheets: Vec<Sheet>,
    pub insights: InsightReport,
}

impl MarketReport {
    pub fn from_output(output: &PipelineOutput) -> Self {
        let sheets = vec![
            summary_sheet(output),
            suburb_sheet(output),
            quarter_sheet(output),
            property_type_sheet(output),
            type_premium_sheet(output),
            bedroom_sheet(output),
            raw_data_sheet(output),
        ];

        Self {
            sheets,
            insights: output.insights.clone(),
        }
    }

    pub fn sheet(&self, kind: SheetKind) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.kind == kind)
    }
}

fn summary_sheet(output: &PipelineOutput) -> Sheet {
    let mut sheet = Sheet::new(SheetKind::Summary, &["Metric", "Value"]);

    let prices: Vec<f64> = output
        .annotated
        .listings
        .iter()
        .filter_map(|l| l.price())
        .collect();
    let growth = output
        .insights
        .by_type(InsightType::MarketGrowth)
        .next()
        .and_then(|f| f.data["growth"].as_f64());

    let metrics = [
        ("Total_Properties", Cell::Count(output.annotated.listings.len())),
        ("Suburbs_Analyzed", Cell::Count(output.cohort.ranking.len())),
        ("Median_Price", Cell::price(stats::median(&prices))),
        ("Market_Growth", Cell::Ratio(growth)),
        ("Cohort_Share", Cell::Ratio(output.cohort.retained_fraction)),
        ("Underpriced_Sales", Cell::Count(output.annotated.underpriced)),
        ("Overpriced_Sales", Cell::Count(output.annotated.overpriced)),
        (
            "Data_Completeness",
            Cell::Ratio(Some(output.cleaning.completeness_after / 100.0)),
        ),
        ("Records_Removed", Cell::Count(output.cleaning.removed_count)),
        (
            "Date_Range",
            Cell::Text(
                output
                    .tables
                    .date_range()
                    .map(|(first, last)| format!("{} - {}", first, last)),
            ),
        ),
    ];

    for (metric, value) in metrics {
        sheet.rows.push(vec![Cell::text(metric), value]);
    }
    sheet
}

fn suburb_sheet(output: &PipelineOutput) -> Sheet {
    let mut sheet = Sheet::new(
        SheetKind::SuburbAnalysis,
        &[
            "Suburb",
            "Transaction_Count",
            "Median_Price",
            "Mean_Price",
            "Min_Price",
            "Max_Price",
            "Median_Price_per_sqm",
            "Median_Rooms",
            "Median_Landsize",
            "Distance_to_CBD",
            "Distance_Consistent",
            "Vs_Market",
            "Rating",
        ],
    );

    for row in &output.tables.suburbs {
        sheet.rows.push(vec![
            Cell::text(&row.suburb),
            Cell::Count(row.transaction_count),
            Cell::price(row.median_price),
            Cell::price(row.mean_price),
            Cell::price(row.min_price),
            Cell::price(row.max_price),
            Cell::price(row.median_price_per_sqm),
            Cell::price(row.median_rooms),
            Cell::price(row.median_landsize),
            Cell::Number(row.distance),
            Cell::Flag(row.distance_consistent),
            Cell::Ratio(row.vs_market),
            Cell::Text(row.rating.map(|r| r.to_string())),
        ]);
    }
    sheet
}

fn quarter_sheet(output: &PipelineOutput) -> Sheet {
    let mut sheet = Sheet::new(
        SheetKind::QuarterlyTrends,
        &[
            "Quarter",
            "Transaction_Count",
            "Median_Price",
            "Mean_Price",
            "Median_Price_per_sqm",
            "QoQ_Growth",
        ],
    );

    for row in &output.tables.quarters {
        sheet.rows.push(vec![
            Cell::text(&row.quarter),
            Cell::Count(row.transaction_count),
            Cell::price(row.median_price),
            Cell::price(row.mean_price),
            Cell::price(row.median_price_per_sqm),
            Cell::Ratio(row.qoq_growth),
        ]);
    }
    sheet
}

fn property_type_sheet(output: &PipelineOutput) -> Sheet {
    let mut sheet = Sheet::new(
        SheetKind::PropertyTypes,
        &["Suburb", "House", "Unit", "Townhouse"],
    );

    for row in &output.tables.property_types {
        sheet.rows.push(vec![
            Cell::text(&row.suburb),
            Cell::price(row.house),
            Cell::price(row.unit),
            Cell::price(row.townhouse),
        ]);
    }
    sheet
}

fn type_premium_sheet(output: &PipelineOutput) -> Sheet {
    let mut sheet = Sheet::new(
        SheetKind::TypePremiums,
        &[
            "Suburb",
            "House",
            "Unit",
            "Townhouse",
            "House_vs_Unit_Premium",
            "Recommendation",
        ],
    );

    for row in &output.tables.type_premiums {
        sheet.rows.push(vec![
            Cell::text(&row.suburb),
            Cell::price(Some(row.house)),
            Cell::price(Some(row.unit)),
            Cell::price(row.townhouse),
            Cell::Ratio(row.premium),
            Cell::Text(row.advice.map(|a| a.to_string())),
        ]);
    }
    sheet
}

fn bedroom_sheet(output: &PipelineOutput) -> Sheet {
    let table = &output.tables.bedroom_premiums;
    let base = format!("{}BR_Median", table.base_rooms);
    let upper = format!("{}BR_Median", table.upper_rooms);
    let premium = format!("{}BR_vs_{}BR_Premium", table.upper_rooms, table.base_rooms);
    let mut sheet = Sheet::new(
        SheetKind::BedroomPremiums,
        &["Suburb", base.as_str(), upper.as_str(), premium.as_str()],
    );

    for row in &table.rows {
        sheet.rows.push(vec![
            Cell::text(&row.suburb),
            Cell::price(Some(row.base_median)),
            Cell::price(Some(row.upper_median)),
            Cell::Ratio(row.premium),
        ]);
    }
    sheet
}

fn raw_data_sheet(output: &PipelineOutput) -> Sheet {
    let mut sheet = Sheet::new(
        SheetKind::RawData,
        &[
            "Suburb",
            "PropertyType",
            "Rooms",
            "Price",
            "Date",
            "Quarter",
            "Landsize",
            "Price_per_sqm",
            "Suburb_Median",
            "Price_Deviation",
            "Price_Band",
        ],
    );

    for annotated in &output.annotated.listings {
        let featured = &annotated.featured;
        let listing = &featured.listing;
        sheet.rows.push(vec![
            Cell::Text(listing.suburb.clone()),
            Cell::Text(featured.property_type.map(|t| t.to_string())),
            Cell::Number(listing.rooms.map(f64::from)),
            Cell::price(listing.price),
            Cell::Text(listing.date.clone()),
            Cell::Text(featured.quarter.clone()),
            Cell::Number(listing.landsize),
            Cell::price(featured.price_per_sqm),
            Cell::price(annotated.suburb_median),
            Cell::Ratio(annotated.deviation),
            Cell::Text(annotated.band.map(|b| b.to_string())),
        ]);
    }
    sheet
}

/// Presentation settings for report sinks
#[derive(Debug, Clone, PartialEq)]
pub struct ReportStyle {
    pub currency_symbol: String,
    pub thousands_separator: char,
    pub percent_decimals: usize,
    /// Per-sheet name overrides; unlisted sheets use their default name
    pub sheet_names: HashMap<SheetKind, String>,
}

impl Default for ReportStyle {
    fn default() -> Self {
        Self {
            currency_symbol: "$".to_string(),
            thousands_separator: ',',
            percent_decimals: 1,
            sheet_names: HashMap::new(),
        }
    }
}

impl ReportStyle {
    pub fn sheet_name(&self, kind: SheetKind) -> &str {
        self.sheet_names
            .get(&kind)
            .map(String::as_str)
            .unwrap_or_else(|| kind.default_name())
    }

    /// Whole units with the currency symbol and grouped thousands
    pub fn format_price(&self, value: f64) -> String {
        let rounded = value.round();
        let sign = if rounded < 0.0 { "-" } else { "" };
        let digits = format!("{:.0}", rounded.abs());

        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(self.thousands_separator);
            }
            grouped.push(ch);
        }

        format!("{}{}{}", sign, self.currency_symbol, grouped)
    }

    pub fn format_percent(&self, fraction: f64) -> String {
        format!("{:.*}%", self.percent_decimals, fraction * 100.0)
    }

    /// Human-readable text for a cell
    pub fn format_cell(&self, cell: &Cell) -> String {
        match cell {
            Cell::Price(Some(v)) => self.format_price(*v),
            Cell::Ratio(Some(v)) => self.format_percent(*v),
            other => other.raw_text(),
        }
    }
}

/// Destination for a finished report
pub trait ReportSink {
    fn write(&mut self, report: &MarketReport, style: &ReportStyle) -> Result<()>;
}

/// Writes one CSV per sheet plus `insights.json` into a directory
pub struct CsvBundleSink {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl CsvBundleSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            written: Vec::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Files written by the last call to [`ReportSink::write`]
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn write_sheet(&self, sheet: &Sheet, path: &Path) -> Result<()> {
        let mut csv = csv::Writer::from_path(path)?;
        csv.write_record(&sheet.headers)?;
        for row in &sheet.rows {
            csv.write_record(row.iter().map(Cell::raw_text))?;
        }
        csv.flush()?;
        Ok(())
    }
}

impl ReportSink for CsvBundleSink {
    fn write(&mut self, report: &MarketReport, style: &ReportStyle) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        self.written.clear();

        for sheet in &report.sheets {
            let path = self.dir.join(format!("{}.csv", style.sheet_name(sheet.kind)));
            self.write_sheet(sheet, &path)?;
            self.written.push(path);
        }

        let insights_path = self.dir.join("insights.json");
        export::write_insights(BufWriter::new(File::create(&insights_path)?), &report.insights)?;
        self.written.push(insights_path);

        info!(
            dir = %self.dir.display(),
            files = self.written.len(),
            "Report bundle written"
        );
        Ok(())
    }
}
