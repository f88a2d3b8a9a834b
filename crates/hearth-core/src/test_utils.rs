//! Test utilities for hearth-core
//!
//! Listing fixtures shared by unit tests and downstream crates' tests.

use crate::cohort::select_cohort;
use crate::models::{AnnotatedListing, FeaturedListing, Listing, PropertyType};
use crate::outliers::{annotate, OutlierThresholds};

/// Builder for raw listings with sensible defaults
///
/// Defaults: 3 rooms, house, $1,000,000, sold 1/07/2016, 5 km from the
/// CBD, 1 car space, 500 sqm.
pub struct ListingBuilder {
    listing: Listing,
}

impl ListingBuilder {
    pub fn new(suburb: &str) -> Self {
        Self {
            listing: Listing {
                row: 1,
                suburb: Some(suburb.to_string()),
                rooms: Some(3),
                type_code: Some("h".to_string()),
                price: Some(1_000_000.0),
                date: Some("1/07/2016".to_string()),
                distance: Some(5.0),
                car: Some(1.0),
                landsize: Some(500.0),
                extras: vec![],
            },
        }
    }

    pub fn row(mut self, row: usize) -> Self {
        self.listing.row = row;
        self
    }

    pub fn rooms(mut self, rooms: impl Into<Option<u32>>) -> Self {
        self.listing.rooms = rooms.into();
        self
    }

    pub fn type_code(mut self, code: impl Into<Option<&'static str>>) -> Self {
        self.listing.type_code = code.into().map(str::to_string);
        self
    }

    pub fn price(mut self, price: impl Into<Option<f64>>) -> Self {
        self.listing.price = price.into();
        self
    }

    pub fn date(mut self, date: impl Into<Option<&'static str>>) -> Self {
        self.listing.date = date.into().map(str::to_string);
        self
    }

    pub fn distance(mut self, distance: impl Into<Option<f64>>) -> Self {
        self.listing.distance = distance.into();
        self
    }

    pub fn car(mut self, car: impl Into<Option<f64>>) -> Self {
        self.listing.car = car.into();
        self
    }

    pub fn landsize(mut self, landsize: impl Into<Option<f64>>) -> Self {
        self.listing.landsize = landsize.into();
        self
    }

    pub fn build(self) -> Listing {
        self.listing
    }
}

/// A featured house sale in 2016Q3 with the given suburb and price
pub fn featured(suburb: &str, price: f64) -> FeaturedListing {
    let listing = ListingBuilder::new(suburb).price(price).build();
    FeaturedListing {
        price_per_sqm: listing.landsize.map(|size| price / size),
        listing,
        year: Some(2016),
        month: Some(7),
        quarter: Some("2016Q3".to_string()),
        property_type: Some(PropertyType::House),
    }
}

/// A featured sale with explicit type, rooms and quarter
pub fn featured_with(
    suburb: &str,
    price: f64,
    property_type: PropertyType,
    rooms: u32,
    quarter: &str,
) -> FeaturedListing {
    let mut listing = featured(suburb, price);
    listing.listing.rooms = Some(rooms);
    listing.property_type = Some(property_type);
    listing.quarter = Some(quarter.to_string());
    listing
}

/// Annotate listings as one cohort containing every suburb
pub fn annotate_all(listings: Vec<FeaturedListing>) -> Vec<AnnotatedListing> {
    let cohort = select_cohort(&listings, usize::MAX);
    annotate(&cohort, &OutlierThresholds::default())
        .expect("fixture cohort is self-consistent")
        .listings
}
