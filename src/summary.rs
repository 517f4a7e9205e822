//! Summary statistics pivoted into per-metric tables
//!
//! Values are grouped by (metric type, source, technology) and reduced to a
//! median, a median absolute deviation, and a sample standard deviation. Each
//! statistic of each metric type becomes one `SummaryTable` with the metric
//! domain's sources as rows and the technologies as columns, both in layout
//! order. Cells without data (or a standard deviation of a single value) are
//! `None`.

use crate::decision::{median, median_absolute_deviation, sample_std_dev};
use crate::layout::ReportLayout;
use crate::record::{MetricRecord, MetricType};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Statistic shown in a summary table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Statistic {
    Median,
    MedianAbsoluteDeviation,
    StandardDeviation,
}

impl Statistic {
    /// Statistics in report order
    pub const ALL: [Statistic; 3] = [
        Statistic::Median,
        Statistic::MedianAbsoluteDeviation,
        Statistic::StandardDeviation,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Statistic::Median => "Median",
            Statistic::MedianAbsoluteDeviation => "Median Absolute Deviation",
            Statistic::StandardDeviation => "Standard Deviation",
        }
    }

    pub fn compute(self, values: &[f64]) -> Option<f64> {
        match self {
            Statistic::Median => median(values),
            Statistic::MedianAbsoluteDeviation => median_absolute_deviation(values),
            Statistic::StandardDeviation => sample_std_dev(values),
        }
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One statistic of one metric type: sources x technologies
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryTable {
    pub metric: MetricType,
    pub statistic: Statistic,
    /// `<summary caption> - <statistic>`
    pub caption: String,
    /// Source names, in layout order
    pub rows: Vec<String>,
    /// Technology names, in layout order
    pub columns: Vec<String>,
    /// `cells[row][column]`
    pub cells: Vec<Vec<Option<f64>>>,
}

impl SummaryTable {
    pub fn get(&self, source: &str, technology: &str) -> Option<f64> {
        let row = self.rows.iter().position(|r| r == source)?;
        let column = self.columns.iter().position(|c| c == technology)?;
        self.cells[row][column]
    }

    /// Smallest and largest defined value of one row
    pub fn row_range(&self, row: usize) -> Option<(f64, f64)> {
        self.cells.get(row)?.iter().flatten().fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }
}

/// Groups record values for the summary tables
#[derive(Debug)]
pub struct SummaryAggregator<'a> {
    layout: &'a ReportLayout,
    /// metric type -> source -> technology -> values
    groups: HashMap<MetricType, HashMap<&'a str, HashMap<&'a str, Vec<f64>>>>,
}

impl<'a> SummaryAggregator<'a> {
    pub fn new(records: &'a [MetricRecord], layout: &'a ReportLayout) -> Self {
        let mut groups: HashMap<MetricType, HashMap<&str, HashMap<&str, Vec<f64>>>> =
            HashMap::new();
        for record in records {
            groups
                .entry(record.metric_type)
                .or_default()
                .entry(record.source.as_str())
                .or_default()
                .entry(record.technology.as_str())
                .or_default()
                .push(record.value);
        }
        Self { layout, groups }
    }

    /// Values of one (metric type, source, technology) group
    pub fn values(&self, metric: MetricType, source: &str, technology: &str) -> Option<&[f64]> {
        self.groups
            .get(&metric)?
            .get(source)?
            .get(technology)
            .map(Vec::as_slice)
    }

    /// One statistic of one (metric type, source, technology) group
    pub fn statistic(
        &self,
        metric: MetricType,
        source: &str,
        technology: &str,
        statistic: Statistic,
    ) -> Option<f64> {
        self.values(metric, source, technology)
            .and_then(|values| statistic.compute(values))
    }

    /// Pivot table of one statistic for one metric type
    pub fn table(&self, metric: MetricType, statistic: Statistic) -> SummaryTable {
        let rows = self.layout.sources(metric.domain()).to_vec();
        let columns = self.layout.technologies.clone();
        let cells = rows
            .iter()
            .map(|source| {
                columns
                    .iter()
                    .map(|technology| self.statistic(metric, source, technology, statistic))
                    .collect()
            })
            .collect();

        SummaryTable {
            metric,
            statistic,
            caption: format!(
                "{} - {}",
                self.layout.labels(metric).summary_caption,
                statistic.name()
            ),
            rows,
            columns,
            cells,
        }
    }

    /// Every table: metric types in report order, statistics in report order
    pub fn tables(&self) -> Vec<SummaryTable> {
        MetricType::ALL
            .into_iter()
            .flat_map(|metric| {
                Statistic::ALL
                    .into_iter()
                    .map(move |statistic| self.table(metric, statistic))
            })
            .collect()
    }
}
