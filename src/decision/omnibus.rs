// Omnibus tests: is there any difference among the samples at all?
//
// - One-way ANOVA (parametric, assumes normality and equal variances)
// - Kruskal-Wallis H test (rank based, tie corrected)

use crate::decision::describe::{mean, sum_sq_dev};
use crate::decision::error::{distribution_error, Result, StatsError};
use crate::decision::ranks::rank_average;
use serde::Serialize;
use statrs::distribution::{ChiSquared, ContinuousCDF, FisherSnedecor};
use std::fmt;

/// Statistic and p-value of a global test
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TestResult {
    pub statistic: f64,
    pub p_value: f64,
}

/// Which omnibus test the decision tree picked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum OmnibusTest {
    Anova,
    KruskalWallis,
}

impl OmnibusTest {
    /// Display name used in plot titles and reports
    pub fn name(self) -> &'static str {
        match self {
            OmnibusTest::Anova => "One-way ANOVA",
            OmnibusTest::KruskalWallis => "Kruskal-Wallis",
        }
    }

    /// Run this test across the samples
    pub fn run(self, samples: &[&[f64]]) -> Result<TestResult> {
        match self {
            OmnibusTest::Anova => one_way_anova(samples),
            OmnibusTest::KruskalWallis => kruskal_wallis(samples),
        }
    }
}

impl fmt::Display for OmnibusTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Validate a set of samples: at least two, each with `min_each` values
///
/// Returns the pooled sample size.
pub(crate) fn check_samples(
    test: &'static str,
    samples: &[&[f64]],
    min_each: usize,
) -> Result<usize> {
    if samples.len() < 2 {
        return Err(StatsError::TooFewGroups {
            test,
            required: 2,
            actual: samples.len(),
        });
    }
    if let Some(short) = samples.iter().find(|s| s.len() < min_each) {
        return Err(StatsError::InsufficientData {
            test,
            required: min_each,
            actual: short.len(),
        });
    }
    Ok(samples.iter().map(|s| s.len()).sum())
}

/// One-way analysis of variance
///
/// # Example
/// ```
/// use clusterstat::decision::one_way_anova;
///
/// let low = [9.8, 10.1, 10.0, 9.9, 10.2];
/// let high = [49.9, 50.2, 50.1, 49.8, 50.0];
/// let result = one_way_anova(&[&low, &high]).unwrap();
/// assert!(result.p_value < 1e-6);
/// ```
pub fn one_way_anova(samples: &[&[f64]]) -> Result<TestResult> {
    const TEST: &str = "One-way ANOVA";
    let total = check_samples(TEST, samples, 1)?;
    let k = samples.len();
    if total <= k {
        return Err(StatsError::InsufficientData {
            test: TEST,
            required: 2,
            actual: total / k,
        });
    }

    let pooled: Vec<f64> = samples.iter().flat_map(|s| s.iter().copied()).collect();
    let grand_mean = mean(&pooled).unwrap_or_default();

    let between: f64 = samples
        .iter()
        .map(|s| s.len() as f64 * (mean(s).unwrap_or_default() - grand_mean).powi(2))
        .sum();
    let within: f64 = samples.iter().map(|s| sum_sq_dev(s)).sum();
    if within <= 0.0 {
        return Err(StatsError::ZeroVariance { test: TEST });
    }

    let df_between = (k - 1) as f64;
    let df_within = (total - k) as f64;
    let statistic = (between / df_between) / (within / df_within);

    let f = FisherSnedecor::new(df_between, df_within).map_err(distribution_error)?;
    Ok(TestResult {
        statistic,
        p_value: f.sf(statistic),
    })
}

/// Kruskal-Wallis H test with tie correction
///
/// # Example
/// ```
/// use clusterstat::decision::kruskal_wallis;
///
/// let x = [1.0, 3.0, 5.0, 7.0, 9.0];
/// let y = [2.0, 4.0, 6.0, 8.0, 10.0];
/// let result = kruskal_wallis(&[&x, &y]).unwrap();
/// assert!((result.statistic - 0.2727272727272734).abs() < 1e-9);
/// ```
pub fn kruskal_wallis(samples: &[&[f64]]) -> Result<TestResult> {
    const TEST: &str = "Kruskal-Wallis";
    let total = check_samples(TEST, samples, 1)?;
    let k = samples.len();

    let pooled: Vec<f64> = samples.iter().flat_map(|s| s.iter().copied()).collect();
    let ranking = rank_average(&pooled);

    let n = total as f64;
    let tie_correction = 1.0 - ranking.tie_term() / (n * n * n - n);
    if tie_correction <= 0.0 {
        return Err(StatsError::Undefined {
            test: TEST,
            reason: "all values are identical".to_string(),
        });
    }

    let mut offset = 0;
    let mut rank_term = 0.0;
    for s in samples {
        let rank_sum: f64 = ranking.ranks[offset..offset + s.len()].iter().sum();
        rank_term += rank_sum * rank_sum / s.len() as f64;
        offset += s.len();
    }

    let h = 12.0 / (n * (n + 1.0)) * rank_term - 3.0 * (n + 1.0);
    let statistic = (h / tie_correction).max(0.0);

    let chi2 = ChiSquared::new((k - 1) as f64).map_err(distribution_error)?;
    Ok(TestResult {
        statistic,
        p_value: chi2.sf(statistic),
    })
}
