//! Insight Engine - comparative market findings
//!
//! Pluggable analyzers derive findings from the aggregate tables. Each one
//! runs independently; a failing analyzer is recorded without stopping the
//! others.
//!
//! ## Core Insight Types
//!
//! - **Suburb Gap** - discount of a value suburb against a premium neighbour
//! - **Type Premium** - top-K house vs unit premiums
//! - **Bedroom Premium** - top-K upper vs base bedroom premiums
//! - **Market Growth** - median growth between two quarters
//!
//! ## Usage
//!
//! ```rust,ignore
//! use hearth_core::insights::{AnalysisContext, InsightEngine};
//!
//! let engine = InsightEngine::from_settings(&config.insights);
//! let report = engine.analyze_all(&AnalysisContext::new(&tables));
//! ```

pub mod engine;
pub mod market_growth;
pub mod premiums;
pub mod suburb_gap;
pub mod types;

pub use engine::{AnalysisContext, Insight, InsightEngine};
pub use market_growth::MarketGrowthInsight;
pub use premiums::{BedroomPremiumInsight, TypePremiumInsight};
pub use suburb_gap::SuburbGapInsight;
pub use types::{
    Finding, InsightFailure, InsightReport, InsightType, MarketGrowthData, RankedPremiumData,
    SuburbGapData,
};
