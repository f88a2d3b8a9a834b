//! Data models for Hearth
//!
//! Records flow through the pipeline as progressively richer owned values:
//! [`Listing`] (raw or cleaned) -> [`FeaturedListing`] -> [`AnnotatedListing`].
//! Aggregate rows are plain structs recomputed on every run.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Known source columns, in the order they are persisted
pub const KNOWN_COLUMNS: [&str; 8] = [
    "Suburb", "Rooms", "Type", "Price", "Date", "Distance", "Car", "Landsize",
];

/// One property sale as loaded from the source file
///
/// Every field is optional because raw cells may be empty. Columns the
/// pipeline does not interpret are carried in `extras`, aligned with
/// [`RawTable::extra_headers`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Listing {
    /// 1-based data row in the source file (header excluded)
    pub row: usize,
    pub suburb: Option<String>,
    pub rooms: Option<u32>,
    /// Property type code (h, u, t)
    pub type_code: Option<String>,
    pub price: Option<f64>,
    /// Sale date as written in the source (dd/mm/YYYY)
    pub date: Option<String>,
    /// Distance to the CBD in km
    pub distance: Option<f64>,
    /// Car spaces
    pub car: Option<f64>,
    /// Land size in sqm
    pub landsize: Option<f64>,
    pub extras: Vec<Option<String>>,
}

impl Listing {
    /// Number of non-missing cells across known and extra columns
    pub fn present_cells(&self) -> usize {
        let known = [
            self.suburb.is_some(),
            self.rooms.is_some(),
            self.type_code.is_some(),
            self.price.is_some(),
            self.date.is_some(),
            self.distance.is_some(),
            self.car.is_some(),
            self.landsize.is_some(),
        ];
        known.iter().filter(|present| **present).count()
            + self.extras.iter().filter(|e| e.is_some()).count()
    }
}

/// A loaded dataset: listings plus the headers of uninterpreted columns
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub extra_headers: Vec<String>,
    pub listings: Vec<Listing>,
}

impl RawTable {
    pub fn new(extra_headers: Vec<String>, listings: Vec<Listing>) -> Self {
        Self {
            extra_headers,
            listings,
        }
    }

    pub fn column_count(&self) -> usize {
        KNOWN_COLUMNS.len() + self.extra_headers.len()
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    /// Mean fraction of non-missing cells, as a percentage
    ///
    /// Returns 0 for an empty table.
    pub fn completeness_pct(&self) -> f64 {
        let cells = self.listings.len() * self.column_count();
        if cells == 0 {
            return 0.0;
        }
        let present: usize = self.listings.iter().map(Listing::present_cells).sum();
        present as f64 / cells as f64 * 100.0
    }
}

/// Human-readable property type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PropertyType {
    House,
    Unit,
    Townhouse,
}

impl PropertyType {
    /// Map a source type code; unmapped codes yield None
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "h" => Some(Self::House),
            "u" => Some(Self::Unit),
            "t" => Some(Self::Townhouse),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::House => "House",
            Self::Unit => "Unit",
            Self::Townhouse => "Townhouse",
        }
    }

    pub fn all() -> &'static [PropertyType] {
        &[Self::House, Self::Unit, Self::Townhouse]
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PropertyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "House" => Ok(Self::House),
            "Unit" => Ok(Self::Unit),
            "Townhouse" => Ok(Self::Townhouse),
            _ => Err(format!("Unknown property type: {}", s)),
        }
    }
}

/// A cleaned listing with derived fields
#[derive(Debug, Clone, PartialEq)]
pub struct FeaturedListing {
    pub listing: Listing,
    pub price_per_sqm: Option<f64>,
    pub year: Option<i32>,
    pub month: Option<u32>,
    /// Quarter label such as "2016Q2"
    pub quarter: Option<String>,
    pub property_type: Option<PropertyType>,
}

impl FeaturedListing {
    pub fn suburb(&self) -> Option<&str> {
        self.listing.suburb.as_deref()
    }

    pub fn price(&self) -> Option<f64> {
        self.listing.price
    }
}

/// Price classification relative to the suburb median
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceBand {
    Underpriced,
    Typical,
    Overpriced,
}

impl PriceBand {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Underpriced => "underpriced",
            Self::Typical => "typical",
            Self::Overpriced => "overpriced",
        }
    }
}

impl fmt::Display for PriceBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Suburb rating from its median's distance to the market median
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuburbRating {
    ValueBuy,
    BelowMarket,
    AtMarket,
    Premium,
}

impl SuburbRating {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValueBuy => "VALUE BUY",
            Self::BelowMarket => "BELOW MARKET",
            Self::AtMarket => "AT MARKET",
            Self::Premium => "PREMIUM",
        }
    }
}

impl fmt::Display for SuburbRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Buying advice from a suburb's house vs unit premium
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PremiumAdvice {
    BuyUnit,
    UnitValue,
    Competitive,
}

impl PremiumAdvice {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BuyUnit => "Buy Unit - High House Premium",
            Self::UnitValue => "Unit offers value",
            Self::Competitive => "Competitive pricing",
        }
    }
}

impl fmt::Display for PremiumAdvice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A cohort listing annotated with its deviation from the suburb median
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedListing {
    pub featured: FeaturedListing,
    pub suburb_median: Option<f64>,
    /// (price - suburb_median) / suburb_median
    pub deviation: Option<f64>,
    pub band: Option<PriceBand>,
}

impl AnnotatedListing {
    pub fn suburb(&self) -> Option<&str> {
        self.featured.suburb()
    }

    pub fn price(&self) -> Option<f64> {
        self.featured.price()
    }
}

// ========== Aggregate rows ==========

/// Per-suburb summary statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuburbSummary {
    pub suburb: String,
    pub transaction_count: usize,
    pub median_price: Option<f64>,
    pub mean_price: Option<f64>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub median_price_per_sqm: Option<f64>,
    pub median_rooms: Option<f64>,
    pub median_landsize: Option<f64>,
    /// First observed distance to the CBD
    pub distance: Option<f64>,
    /// False when the suburb's listings disagree on distance
    pub distance_consistent: bool,
    /// (suburb median - market median) / market median
    pub vs_market: Option<f64>,
    /// None when `vs_market` is undefined
    pub rating: Option<SuburbRating>,
}

/// Per-quarter market statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuarterSummary {
    pub quarter: String,
    pub transaction_count: usize,
    pub median_price: Option<f64>,
    pub mean_price: Option<f64>,
    pub median_price_per_sqm: Option<f64>,
    /// Growth of the median over the previous quarter
    pub qoq_growth: Option<f64>,
}

/// Median price per property type for one suburb (wide pivot row)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyTypeMedians {
    pub suburb: String,
    pub house: Option<f64>,
    pub unit: Option<f64>,
    pub townhouse: Option<f64>,
}

impl PropertyTypeMedians {
    pub fn get(&self, property_type: PropertyType) -> Option<f64> {
        match property_type {
            PropertyType::House => self.house,
            PropertyType::Unit => self.unit,
            PropertyType::Townhouse => self.townhouse,
        }
    }
}

/// House vs unit premium for a suburb with both types present
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyTypePremium {
    pub suburb: String,
    pub house: f64,
    pub unit: f64,
    pub townhouse: Option<f64>,
    /// (house - unit) / unit
    pub premium: Option<f64>,
    pub advice: Option<PremiumAdvice>,
}

/// Bedroom premium for houses in a suburb with both room levels present
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BedroomPremium {
    pub suburb: String,
    pub base_median: f64,
    pub upper_median: f64,
    /// (upper - base) / base
    pub premium: Option<f64>,
}

/// Bedroom premiums with the room levels they compare
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BedroomPremiumTable {
    pub base_rooms: u32,
    pub upper_rooms: u32,
    pub rows: Vec<BedroomPremium>,
}
