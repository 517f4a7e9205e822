//! Group extraction: one comparison per eligible (metric type, source)
//!
//! Records are partitioned by metric type and source, then split into one
//! sample per technology in the layout's technology order. Pairs whose
//! source domain does not match the metric domain (node metrics on a
//! container, container metrics on a node) are never formed.

use crate::layout::ReportLayout;
use crate::record::{MetricRecord, MetricType};
use std::collections::{BTreeSet, HashMap};

/// Values measured for one technology
#[derive(Debug, Clone, PartialEq)]
pub struct TechnologySample {
    pub technology: String,
    pub values: Vec<f64>,
}

/// All samples of one metric type on one source
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonGroup {
    pub metric: MetricType,
    pub source: String,
    /// One entry per technology that has data, in layout order
    pub samples: Vec<TechnologySample>,
}

impl ComparisonGroup {
    /// Technologies present, in layout order
    pub fn technologies(&self) -> Vec<String> {
        self.samples.iter().map(|s| s.technology.clone()).collect()
    }

    /// Sample vectors in layout order
    pub fn sample_slices(&self) -> Vec<&[f64]> {
        self.samples.iter().map(|s| s.values.as_slice()).collect()
    }

    /// Values of one technology, if present
    pub fn values_of(&self, technology: &str) -> Option<&[f64]> {
        self.samples
            .iter()
            .find(|s| s.technology == technology)
            .map(|s| s.values.as_slice())
    }

    /// Total number of values across technologies
    pub fn len(&self) -> usize {
        self.samples.iter().map(|s| s.values.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Smallest and largest value in the group
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.samples
            .iter()
            .flat_map(|s| s.values.iter().copied())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

/// Build the comparison group of one (metric type, source) pair
pub fn extract_group(
    records: &[MetricRecord],
    layout: &ReportLayout,
    metric: MetricType,
    source: &str,
) -> ComparisonGroup {
    let mut by_technology: HashMap<&str, Vec<f64>> = HashMap::new();
    for record in records
        .iter()
        .filter(|r| r.metric_type == metric && r.source == source)
    {
        by_technology
            .entry(record.technology.as_str())
            .or_default()
            .push(record.value);
    }

    let samples = layout
        .technologies
        .iter()
        .filter_map(|technology| {
            by_technology
                .remove(technology.as_str())
                .map(|values| TechnologySample {
                    technology: technology.clone(),
                    values,
                })
        })
        .collect();

    ComparisonGroup {
        metric,
        source: source.to_string(),
        samples,
    }
}

/// Build every eligible comparison group
///
/// Sources are visited in layout order (nodes, then containers) and, per
/// source, metric types in report order. Groups without any data are
/// included; deciding what to do with them is up to the caller.
pub fn extract_groups(records: &[MetricRecord], layout: &ReportLayout) -> Vec<ComparisonGroup> {
    warn_unknown_labels(records, layout);

    layout
        .all_sources()
        .flat_map(|source| {
            MetricType::ALL
                .into_iter()
                .filter(move |metric| layout.is_eligible(*metric, source))
                .map(move |metric| extract_group(records, layout, metric, source))
        })
        .collect()
}

/// Records outside the layout can never appear in a report; say so once
fn warn_unknown_labels(records: &[MetricRecord], layout: &ReportLayout) {
    let unknown_technologies: BTreeSet<&str> = records
        .iter()
        .filter(|r| layout.technology_index(&r.technology).is_none())
        .map(|r| r.technology.as_str())
        .collect();
    if !unknown_technologies.is_empty() {
        tracing::warn!(
            "Ignoring records of technologies outside the layout: {:?}",
            unknown_technologies
        );
    }

    let misplaced: usize = records
        .iter()
        .filter(|r| !layout.is_eligible(r.metric_type, &r.source))
        .count();
    if misplaced > 0 {
        tracing::warn!(
            "Ignoring {} records whose source is unknown or outside the metric's domain",
            misplaced
        );
    }
}
