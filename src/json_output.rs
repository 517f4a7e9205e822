//! JSON output format for decision reports
//!
//! `--format json` prints one document per run instead of the text blocks.

use crate::decision::{DecisionConfig, DecisionOutcome};
use crate::record::MetricType;
use serde::Serialize;

/// A comparison that was skipped or failed
#[derive(Debug, Clone, Serialize)]
pub struct JsonComparisonIssue {
    pub metric: MetricType,
    pub source: String,
    pub reason: String,
}

/// Run-level counters
#[derive(Debug, Clone, Default, Serialize)]
pub struct JsonSummary {
    pub comparisons: usize,
    pub significant: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Complete JSON output structure
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// Crate version
    pub version: String,
    /// Format identifier
    pub format: String,
    /// Significance level used for every test
    pub significance_level: f64,
    pub min_sample_size: usize,
    pub summary: JsonSummary,
    pub comparisons: Vec<DecisionOutcome>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<JsonComparisonIssue>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed: Vec<JsonComparisonIssue>,
}

impl JsonOutput {
    /// Create a new JSON output structure
    pub fn new(config: &DecisionConfig) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            format: "clusterstat-json-v1".to_string(),
            significance_level: config.significance_level,
            min_sample_size: config.min_sample_size,
            summary: JsonSummary::default(),
            comparisons: Vec::new(),
            skipped: Vec::new(),
            failed: Vec::new(),
        }
    }

    pub fn add_outcome(&mut self, outcome: DecisionOutcome) {
        self.summary.comparisons += 1;
        if outcome.significant() {
            self.summary.significant += 1;
        }
        self.comparisons.push(outcome);
    }

    pub fn add_skipped(&mut self, issue: JsonComparisonIssue) {
        self.summary.skipped += 1;
        self.skipped.push(issue);
    }

    pub fn add_failed(&mut self, issue: JsonComparisonIssue) {
        self.summary.failed += 1;
        self.failed.push(issue);
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
