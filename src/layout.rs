//! Report layout: canonical orderings and per-metric labels
//!
//! Every component that needs to know the technology order, which sources
//! belong to which domain, or how a metric type is labelled receives a
//! `ReportLayout`. The built-in layout describes the edge/cloud benchmark;
//! a TOML file with the same shape can replace it for a single run.

use crate::record::{Domain, MetricType};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

/// Errors for layout loading and validation
#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("Failed to read layout file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse layout file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid layout: {0}")]
    Invalid(String),
}

/// Labels used for one metric type's plots, files, and tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricLabels {
    /// Plot title, e.g. "Node CPU Usage"
    pub title: String,
    /// X axis description
    pub x_label: String,
    /// Y axis description (unit)
    pub y_label: String,
    /// Stem of the statistics plot file name
    pub filename: String,
    /// Stem of the overview plot file name
    pub overview_filename: String,
    /// Caption prefix of the summary tables, e.g. "Nodes CPU Usage [%]"
    pub summary_caption: String,
}

impl MetricLabels {
    fn new(
        title: &str,
        y_label: &str,
        filename: &str,
        overview_filename: &str,
        summary_caption: &str,
    ) -> Self {
        Self {
            title: title.to_string(),
            x_label: "Technology".to_string(),
            y_label: y_label.to_string(),
            filename: filename.to_string(),
            overview_filename: overview_filename.to_string(),
            summary_caption: summary_caption.to_string(),
        }
    }
}

/// Labels for every metric type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelTable {
    pub nodes_cpu: MetricLabels,
    pub nodes_memory: MetricLabels,
    pub containers_cpu: MetricLabels,
    pub containers_memory: MetricLabels,
}

impl Default for LabelTable {
    fn default() -> Self {
        Self {
            nodes_cpu: MetricLabels::new(
                "Node CPU Usage",
                "[%]",
                "node-cpu-usage",
                "node-cpu",
                "Nodes CPU Usage [%]",
            ),
            nodes_memory: MetricLabels::new(
                "Node Memory Usage",
                "[%]",
                "node-memory-usage",
                "node-memory",
                "Nodes Memory Usage [%]",
            ),
            containers_cpu: MetricLabels::new(
                "Container CPU Usage",
                "[millicores]",
                "container-cpu-usage",
                "container-cpu",
                "Containers CPU Usage [millicores]",
            ),
            containers_memory: MetricLabels::new(
                "Container Memory Usage",
                "[MB]",
                "container-memory-usage",
                "container-memory",
                "Containers Memory Usage [MB]",
            ),
        }
    }
}

/// Canonical orderings and labels for one report run
///
/// # Example
/// ```
/// use clusterstat::layout::ReportLayout;
/// use clusterstat::record::MetricType;
///
/// let layout = ReportLayout::default();
/// assert_eq!(layout.technologies[0], "k3s");
/// assert!(layout.is_eligible(MetricType::NodesCpu, "edge"));
/// assert!(!layout.is_eligible(MetricType::NodesCpu, "kafka-edge"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportLayout {
    /// Technologies in display order (box plot x axis, table columns)
    pub technologies: Vec<String>,
    /// Node sources in display order
    pub node_sources: Vec<String>,
    /// Container sources in display order
    pub container_sources: Vec<String>,
    /// Per-metric labels
    #[serde(default)]
    pub labels: LabelTable,
}

impl Default for ReportLayout {
    fn default() -> Self {
        let owned = |names: &[&str]| names.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        Self {
            technologies: owned(&["k3s", "microk8s", "kubernetes", "kubeedge"]),
            node_sources: owned(&["control-plane", "cloud", "edge", "infra"]),
            container_sources: owned(&[
                "app-cloud",
                "kafka-cloud",
                "app-edge",
                "app-sensor",
                "kafka-edge",
                "kafka-ui",
                "kafka-mirror",
            ]),
            labels: LabelTable::default(),
        }
    }
}

impl ReportLayout {
    /// Load a layout from a TOML file and validate it
    pub fn from_file(path: &Path) -> Result<Self, LayoutError> {
        let content = std::fs::read_to_string(path).map_err(|source| LayoutError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse a layout from TOML text and validate it
    pub fn from_toml(content: &str) -> Result<Self, LayoutError> {
        let layout: ReportLayout = toml::from_str(content)?;
        layout.validate()?;
        Ok(layout)
    }

    /// Validate orderings: non-empty, no duplicates, domains disjoint
    pub fn validate(&self) -> Result<(), LayoutError> {
        for (name, list) in [
            ("technologies", &self.technologies),
            ("node_sources", &self.node_sources),
            ("container_sources", &self.container_sources),
        ] {
            if list.is_empty() {
                return Err(LayoutError::Invalid(format!("{} must not be empty", name)));
            }
            let mut seen = HashSet::new();
            if let Some(dup) = list.iter().find(|item| !seen.insert(item.as_str())) {
                return Err(LayoutError::Invalid(format!(
                    "{} lists '{}' more than once",
                    name, dup
                )));
            }
        }

        if let Some(shared) = self
            .node_sources
            .iter()
            .find(|s| self.container_sources.contains(s))
        {
            return Err(LayoutError::Invalid(format!(
                "source '{}' is listed as both a node and a container",
                shared
            )));
        }

        Ok(())
    }

    /// Sources of a domain in display order
    pub fn sources(&self, domain: Domain) -> &[String] {
        match domain {
            Domain::Node => &self.node_sources,
            Domain::Container => &self.container_sources,
        }
    }

    /// Every known source: node sources first, then container sources
    pub fn all_sources(&self) -> impl Iterator<Item = &String> {
        self.node_sources.iter().chain(self.container_sources.iter())
    }

    /// Domain of a source, if the layout knows it
    pub fn source_domain(&self, source: &str) -> Option<Domain> {
        if self.node_sources.iter().any(|s| s == source) {
            Some(Domain::Node)
        } else if self.container_sources.iter().any(|s| s == source) {
            Some(Domain::Container)
        } else {
            None
        }
    }

    /// Whether a (metric type, source) pair is a comparison worth running
    pub fn is_eligible(&self, metric: MetricType, source: &str) -> bool {
        self.source_domain(source) == Some(metric.domain())
    }

    /// Position of a technology in display order
    pub fn technology_index(&self, technology: &str) -> Option<usize> {
        self.technologies.iter().position(|t| t == technology)
    }

    /// Labels for a metric type
    pub fn labels(&self, metric: MetricType) -> &MetricLabels {
        match metric {
            MetricType::NodesCpu => &self.labels.nodes_cpu,
            MetricType::NodesMemory => &self.labels.nodes_memory,
            MetricType::ContainersCpu => &self.labels.containers_cpu,
            MetricType::ContainersMemory => &self.labels.containers_memory,
        }
    }
}
