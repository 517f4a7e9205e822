// Levene's test for homogeneity of variance
//
// Median-centred variant (Brown-Forsythe), which keeps its size under the
// skewed distributions resource metrics tend to have. Runs once across all
// samples, not pairwise.

use crate::decision::describe::median;
use crate::decision::error::{distribution_error, Result, StatsError};
use crate::decision::omnibus::{check_samples, TestResult};
use statrs::distribution::{ContinuousCDF, FisherSnedecor};

const TEST: &str = "Levene";

/// Run Levene's test across all samples
///
/// # Example
/// ```
/// use clusterstat::decision::levene;
///
/// let a = [8.88, 9.12, 9.04, 8.98, 9.00, 9.08, 9.01, 8.85, 9.06, 8.99];
/// let b = [8.88, 8.95, 9.29, 9.44, 9.15, 9.58, 8.36, 9.18, 8.67, 9.05];
/// let c = [8.95, 9.12, 8.95, 8.85, 9.03, 8.84, 9.07, 8.98, 8.86, 8.98];
/// let result = levene(&[&a, &b, &c]).unwrap();
/// assert!(result.p_value < 0.01); // b is far more spread out
/// ```
pub fn levene(samples: &[&[f64]]) -> Result<TestResult> {
    let total = check_samples(TEST, samples, 1)?;
    let k = samples.len();
    if total <= k {
        return Err(StatsError::InsufficientData {
            test: TEST,
            required: 2,
            actual: total / k,
        });
    }

    // absolute deviations from each sample's median
    let deviations: Vec<Vec<f64>> = samples
        .iter()
        .map(|s| {
            let center = median(s).unwrap_or_default();
            s.iter().map(|v| (v - center).abs()).collect()
        })
        .collect();

    let group_means: Vec<f64> = deviations
        .iter()
        .map(|z| z.iter().sum::<f64>() / z.len() as f64)
        .collect();
    let grand_mean = deviations.iter().flatten().sum::<f64>() / total as f64;

    let between: f64 = deviations
        .iter()
        .zip(&group_means)
        .map(|(z, zm)| z.len() as f64 * (zm - grand_mean).powi(2))
        .sum();
    let within: f64 = deviations
        .iter()
        .zip(&group_means)
        .map(|(z, zm)| z.iter().map(|v| (v - zm).powi(2)).sum::<f64>())
        .sum();

    if within <= 0.0 {
        return Err(StatsError::Undefined {
            test: TEST,
            reason: "absolute deviations are constant within every sample".to_string(),
        });
    }

    let df_between = (k - 1) as f64;
    let df_within = (total - k) as f64;
    let statistic = (df_within * between) / (df_between * within);

    let f = FisherSnedecor::new(df_between, df_within).map_err(distribution_error)?;
    Ok(TestResult {
        statistic,
        p_value: f.sf(statistic),
    })
}
