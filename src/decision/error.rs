//! Errors raised when a statistical test is undefined for its input

use thiserror::Error;

/// Why a statistic could not be computed
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StatsError {
    #[error("{test} needs at least {required} values per sample, got {actual}")]
    InsufficientData {
        test: &'static str,
        required: usize,
        actual: usize,
    },

    #[error("{test} needs at least {required} samples, got {actual}")]
    TooFewGroups {
        test: &'static str,
        required: usize,
        actual: usize,
    },

    #[error("{test} is undefined for zero-variance input")]
    ZeroVariance { test: &'static str },

    #[error("{test} is undefined: {reason}")]
    Undefined { test: &'static str, reason: String },

    #[error("technology '{technology}': {source}")]
    Sample {
        technology: String,
        #[source]
        source: Box<StatsError>,
    },

    #[error("Invalid decision configuration: {0}")]
    InvalidConfig(String),

    #[error("Distribution error: {0}")]
    Distribution(String),
}

impl StatsError {
    /// Attach the technology whose sample caused the error
    pub fn for_technology(self, technology: &str) -> Self {
        StatsError::Sample {
            technology: technology.to_string(),
            source: Box::new(self),
        }
    }
}

pub type Result<T> = std::result::Result<T, StatsError>;

pub(crate) fn distribution_error(e: impl std::fmt::Display) -> StatsError {
    StatsError::Distribution(e.to_string())
}
