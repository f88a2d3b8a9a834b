//! Insight Engine - runs every analyzer over the aggregate tables

use crate::aggregate::AggregateTables;
use crate::config::InsightSettings;
use crate::Result;

use super::types::{Finding, InsightFailure, InsightReport, InsightType};
use super::{BedroomPremiumInsight, MarketGrowthInsight, SuburbGapInsight, TypePremiumInsight};

/// Context provided to insight analyzers
pub struct AnalysisContext<'a> {
    pub tables: &'a AggregateTables,
}

impl<'a> AnalysisContext<'a> {
    pub fn new(tables: &'a AggregateTables) -> Self {
        Self { tables }
    }
}

/// Trait for insight analyzers
pub trait Insight {
    /// Insight type this analyzer produces
    fn id(&self) -> InsightType;

    /// Human-readable name
    fn name(&self) -> &'static str;

    /// Identifies this analyzer instance among others of the same type
    fn key(&self) -> String {
        self.id().as_str().to_string()
    }

    /// Analyze the tables and produce findings
    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Result<Vec<Finding>>;
}

/// The engine that runs the registered analyzers
#[derive(Default)]
pub struct InsightEngine {
    insights: Vec<Box<dyn Insight>>,
}

impl InsightEngine {
    /// An engine with no analyzers
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with the built-in analyzers for these settings
    ///
    /// One gap analyzer is registered per configured suburb pair.
    pub fn from_settings(settings: &InsightSettings) -> Self {
        let mut engine = Self::new();

        for pair in &settings.comparisons {
            engine.register(Box::new(SuburbGapInsight::new(
                pair.value.clone(),
                pair.premium.clone(),
            )));
        }
        engine.register(Box::new(TypePremiumInsight::new(settings.top_k)));
        engine.register(Box::new(BedroomPremiumInsight::new(settings.top_k)));
        engine.register(Box::new(MarketGrowthInsight::new(
            settings.trend_from.clone(),
            settings.trend_to.clone(),
        )));

        engine
    }

    /// Register an insight analyzer
    pub fn register(&mut self, insight: Box<dyn Insight>) {
        self.insights.push(insight);
    }

    /// Run all analyzers in registration order
    ///
    /// A failing analyzer is recorded in the report and the others still
    /// run.
    pub fn analyze_all(&self, ctx: &AnalysisContext<'_>) -> InsightReport {
        let mut report = InsightReport::default();

        for insight in &self.insights {
            match insight.analyze(ctx) {
                Ok(findings) => {
                    tracing::debug!(
                        insight = insight.id().as_str(),
                        key = %insight.key(),
                        count = findings.len(),
                        "Insight analysis complete"
                    );
                    report.findings.extend(findings);
                }
                Err(e) => {
                    tracing::warn!(
                        insight = insight.id().as_str(),
                        key = %insight.key(),
                        error = %e,
                        "Insight analysis failed"
                    );
                    report.failures.push(InsightFailure {
                        insight_type: insight.id(),
                        key: insight.key(),
                        error: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            findings = report.findings.len(),
            failures = report.failures.len(),
            "Insights synthesized"
        );
        report
    }

    /// Registered analyzer keys, in run order
    pub fn insight_keys(&self) -> Vec<String> {
        self.insights.iter().map(|i| i.key()).collect()
    }
}
