//! Metric records as they come out of the metrics store
//!
//! One row per sample: which technology was deployed, which node or container
//! the sample was taken from, what was measured, and the measured value.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Where a metric was collected: on a cluster node or inside a container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Node,
    Container,
}

/// The four measured quantities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricType {
    /// Node CPU usage in percent
    NodesCpu,
    /// Node memory usage in percent
    NodesMemory,
    /// Container CPU usage in millicores
    ContainersCpu,
    /// Container memory usage in megabytes
    ContainersMemory,
}

impl MetricType {
    /// All metric types in report order
    pub const ALL: [MetricType; 4] = [
        MetricType::NodesCpu,
        MetricType::NodesMemory,
        MetricType::ContainersCpu,
        MetricType::ContainersMemory,
    ];

    /// Identifier used in the metrics store (`MetricType` column)
    pub fn as_str(self) -> &'static str {
        match self {
            MetricType::NodesCpu => "nodes_cpu",
            MetricType::NodesMemory => "nodes_memory",
            MetricType::ContainersCpu => "containers_cpu",
            MetricType::ContainersMemory => "containers_memory",
        }
    }

    /// Domain of sources this metric is collected from
    pub fn domain(self) -> Domain {
        match self {
            MetricType::NodesCpu | MetricType::NodesMemory => Domain::Node,
            MetricType::ContainersCpu | MetricType::ContainersMemory => Domain::Container,
        }
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unrecognized `MetricType` identifier
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown metric type '{0}' (expected nodes_cpu, nodes_memory, containers_cpu or containers_memory)")]
pub struct UnknownMetricType(pub String);

impl FromStr for MetricType {
    type Err = UnknownMetricType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MetricType::ALL
            .into_iter()
            .find(|m| m.as_str() == s.trim())
            .ok_or_else(|| UnknownMetricType(s.to_string()))
    }
}

/// A single measured sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    #[serde(rename = "Technology")]
    pub technology: String,
    #[serde(rename = "Source")]
    pub source: String,
    #[serde(rename = "MetricType")]
    pub metric_type: MetricType,
    #[serde(rename = "Value")]
    pub value: f64,
}

impl MetricRecord {
    pub fn new(
        technology: impl Into<String>,
        source: impl Into<String>,
        metric_type: MetricType,
        value: f64,
    ) -> Self {
        Self {
            technology: technology.into(),
            source: source.into(),
            metric_type,
            value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_type_round_trips_store_identifier() {
        for metric in MetricType::ALL {
            assert_eq!(metric.as_str().parse::<MetricType>().unwrap(), metric);
        }
    }

    #[test]
    fn test_metric_type_rejects_unknown() {
        let err = "disk_io".parse::<MetricType>().unwrap_err();
        assert!(err.to_string().contains("disk_io"));
    }

    #[test]
    fn test_metric_domains() {
        assert_eq!(MetricType::NodesCpu.domain(), Domain::Node);
        assert_eq!(MetricType::NodesMemory.domain(), Domain::Node);
        assert_eq!(MetricType::ContainersCpu.domain(), Domain::Container);
        assert_eq!(MetricType::ContainersMemory.domain(), Domain::Container);
    }
}
