// Configuration for the statistical decision tree

use crate::decision::error::StatsError;
use serde::{Deserialize, Serialize};

/// Configuration for the statistical decision tree
///
/// One significance level gates every step: normality (p > alpha means the
/// sample looks normal), variance homogeneity (p > alpha means equal
/// variances), and the omnibus test (p > alpha means no significant
/// difference, so no post-hoc test runs).
///
/// # Example
/// ```
/// use clusterstat::decision::DecisionConfig;
///
/// let config = DecisionConfig::default();
/// assert_eq!(config.significance_level, 0.05);
/// assert_eq!(config.min_sample_size, 3);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionConfig {
    /// Significance level (alpha) shared by all tests in the tree
    pub significance_level: f64,

    /// Minimum number of values per technology
    ///
    /// Shapiro-Wilk is undefined below 3 values, so this can not go lower.
    pub min_sample_size: usize,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            significance_level: 0.05,
            min_sample_size: 3,
        }
    }
}

impl DecisionConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), StatsError> {
        if !(self.significance_level > 0.0 && self.significance_level < 1.0) {
            return Err(StatsError::InvalidConfig(format!(
                "significance_level must be in (0, 1), got {}",
                self.significance_level
            )));
        }

        if self.min_sample_size < 3 {
            return Err(StatsError::InvalidConfig(format!(
                "min_sample_size must be >= 3 for Shapiro-Wilk, got {}",
                self.min_sample_size
            )));
        }

        Ok(())
    }

    /// Whether a p-value clears the significance level (p > alpha)
    pub fn accepts_null(&self, p_value: f64) -> bool {
        p_value > self.significance_level
    }
}
