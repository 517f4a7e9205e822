// Shapiro-Wilk normality test
//
// Royston's approximation (Applied Statistics algorithm AS R94, 1995):
// the weights are approximated from expected normal order statistics and
// the p-value from a normalizing transform of ln(1 - W). Valid for
// 3 <= n <= 5000; larger samples are accepted but the p-value becomes
// increasingly conservative.

use crate::decision::error::{distribution_error, Result, StatsError};
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};
use std::f64::consts::{FRAC_1_SQRT_2, PI};

const TEST: &str = "Shapiro-Wilk";

/// Range below which the sample is treated as constant
const SMALL: f64 = 1e-19;

const G: [f64; 2] = [-2.273, 0.459];
const C1: [f64; 6] = [0.0, 0.221157, -0.147981, -2.07119, 4.434685, -2.706056];
const C2: [f64; 6] = [0.0, 0.042981, -0.293762, -1.752461, 5.682633, -3.582633];
const C3: [f64; 4] = [0.544, -0.39978, 0.025054, -6.714e-4];
const C4: [f64; 4] = [1.3822, -0.77857, 0.062767, -0.0020322];
const C5: [f64; 4] = [-1.5861, -0.31082, -0.083751, 0.0038915];
const C6: [f64; 3] = [-0.4803, -0.082676, 0.0030302];

/// Result of a Shapiro-Wilk test
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ShapiroWilk {
    /// W statistic in (0, 1]; values near 1 indicate normality
    pub statistic: f64,
    /// Probability of a W this small under normality
    pub p_value: f64,
}

/// `c[0] + c[1] x + c[2] x^2 + ...`
fn poly(c: &[f64], x: f64) -> f64 {
    c.iter().rev().fold(0.0, |acc, &coef| acc * x + coef)
}

/// Weights for the lower half of the ordered sample
fn coefficients(n: usize, normal: &Normal) -> Vec<f64> {
    let half = n / 2;
    if n == 3 {
        return vec![FRAC_1_SQRT_2];
    }

    let an = n as f64;
    let an25 = an + 0.25;
    let m: Vec<f64> = (1..=half)
        .map(|i| normal.inverse_cdf((i as f64 - 0.375) / an25))
        .collect();
    let summ2 = 2.0 * m.iter().map(|v| v * v).sum::<f64>();
    let ssumm2 = summ2.sqrt();
    let rsn = 1.0 / an.sqrt();
    let a1 = poly(&C1, rsn) - m[0] / ssumm2;

    let mut a = vec![0.0; half];
    a[0] = a1;
    let (first_scaled, fac) = if n > 5 {
        let a2 = -m[1] / ssumm2 + poly(&C2, rsn);
        a[1] = a2;
        let fac = ((summ2 - 2.0 * m[0] * m[0] - 2.0 * m[1] * m[1])
            / (1.0 - 2.0 * a1 * a1 - 2.0 * a2 * a2))
            .sqrt();
        (2, fac)
    } else {
        let fac = ((summ2 - 2.0 * m[0] * m[0]) / (1.0 - 2.0 * a1 * a1)).sqrt();
        (1, fac)
    };
    for i in first_scaled..half {
        a[i] = -m[i] / fac;
    }
    a
}

/// Upper-tail probability of W for a sample of size n
fn p_value(w: f64, n: usize, normal: &Normal) -> f64 {
    if w >= 1.0 {
        return 1.0;
    }
    if n == 3 {
        // exact distribution for n = 3
        let p = (6.0 / PI) * (w.sqrt().asin() - PI / 3.0);
        return p.clamp(0.0, 1.0);
    }

    let an = n as f64;
    let w1 = (1.0 - w).ln();
    let (y, m, s) = if n <= 11 {
        let gamma = poly(&G, an);
        if w1 >= gamma {
            return 1e-99;
        }
        (-(gamma - w1).ln(), poly(&C3, an), poly(&C4, an).exp())
    } else {
        let ln_n = an.ln();
        (w1, poly(&C5, ln_n), poly(&C6, ln_n).exp())
    };
    normal.sf((y - m) / s)
}

/// Run the Shapiro-Wilk test on one sample
///
/// Fails with `InsufficientData` below three values and with `ZeroVariance`
/// when every value is the same.
///
/// # Example
/// ```
/// use clusterstat::decision::shapiro_wilk;
///
/// // evenly spaced points of size 3 are perfectly "normal"
/// let result = shapiro_wilk(&[1.0, 2.0, 3.0]).unwrap();
/// assert!((result.statistic - 1.0).abs() < 1e-12);
/// assert!((result.p_value - 1.0).abs() < 1e-12);
/// ```
pub fn shapiro_wilk(sample: &[f64]) -> Result<ShapiroWilk> {
    let n = sample.len();
    if n < 3 {
        return Err(StatsError::InsufficientData {
            test: TEST,
            required: 3,
            actual: n,
        });
    }
    if n > 5000 {
        tracing::warn!("Shapiro-Wilk p-value may be inaccurate for n = {} > 5000", n);
    }

    let mut x = sample.to_vec();
    x.sort_by(|a, b| a.total_cmp(b));
    let range = x[n - 1] - x[0];
    if range < SMALL {
        return Err(StatsError::ZeroVariance { test: TEST });
    }

    let normal = Normal::new(0.0, 1.0).map_err(distribution_error)?;
    let a = coefficients(n, &normal);

    // scale by the range to keep the sums well conditioned
    let scaled: Vec<f64> = x.iter().map(|v| (v - x[0]) / range).collect();
    let mean = scaled.iter().sum::<f64>() / n as f64;
    let ssq: f64 = scaled.iter().map(|v| (v - mean).powi(2)).sum();
    let b: f64 = a
        .iter()
        .enumerate()
        .map(|(i, ai)| ai * (scaled[n - 1 - i] - scaled[i]))
        .sum();
    let statistic = (b * b / ssq).min(1.0);

    Ok(ShapiroWilk {
        statistic,
        p_value: p_value(statistic, n, &normal),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normal_scores(n: usize, mean: f64, sd: f64) -> Vec<f64> {
        let normal = Normal::new(0.0, 1.0).unwrap();
        (1..=n)
            .map(|i| mean + sd * normal.inverse_cdf((i as f64 - 0.375) / (n as f64 + 0.25)))
            .collect()
    }

    #[test]
    fn test_poly_evaluates_ascending_coefficients() {
        assert_eq!(poly(&[1.0, 2.0, 3.0], 2.0), 1.0 + 4.0 + 12.0);
    }

    #[test]
    fn test_coefficients_are_unit_norm() {
        let normal = Normal::new(0.0, 1.0).unwrap();
        for n in [4, 5, 6, 10, 25, 100] {
            let a = coefficients(n, &normal);
            let norm: f64 = 2.0 * a.iter().map(|v| v * v).sum::<f64>();
            assert!((norm - 1.0).abs() < 1e-6, "n={} norm={}", n, norm);
            assert!(a.windows(2).all(|w| w[0] > w[1]), "n={} {:?}", n, a);
        }
    }

    #[test]
    fn test_normal_scores_look_normal() {
        for n in [5, 8, 12, 30, 200] {
            let result = shapiro_wilk(&normal_scores(n, 40.0, 3.0)).unwrap();
            assert!(result.statistic > 0.95, "n={} W={}", n, result.statistic);
            assert!(result.p_value > 0.5, "n={} p={}", n, result.p_value);
        }
    }

    #[test]
    fn test_exponential_sample_is_not_normal() {
        let n = 40;
        let skewed: Vec<f64> = (1..=n)
            .map(|i| -(1.0 - (i as f64 - 0.5) / n as f64).ln() * 10.0)
            .collect();
        let result = shapiro_wilk(&skewed).unwrap();
        assert!(result.p_value < 0.01, "p={}", result.p_value);
    }

    #[test]
    fn test_outlier_small_sample_is_not_normal() {
        let result = shapiro_wilk(&[1.0, 1.1, 1.2, 1.05, 1.15, 9.0]).unwrap();
        assert!(result.p_value < 0.05, "p={}", result.p_value);
    }

    #[test]
    fn test_location_and_scale_invariance() {
        let base = [2.1, 3.4, 1.9, 5.6, 4.4, 3.3, 2.8, 4.0, 3.1, 6.2];
        let shifted: Vec<f64> = base.iter().map(|v| v * 12.5 + 1000.0).collect();
        let a = shapiro_wilk(&base).unwrap();
        let b = shapiro_wilk(&shifted).unwrap();
        assert!((a.statistic - b.statistic).abs() < 1e-9);
        assert!((a.p_value - b.p_value).abs() < 1e-9);
    }

    #[test]
    fn test_too_few_values() {
        assert_eq!(
            shapiro_wilk(&[1.0, 2.0]),
            Err(StatsError::InsufficientData {
                test: TEST,
                required: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn test_constant_sample() {
        assert_eq!(
            shapiro_wilk(&[4.0, 4.0, 4.0, 4.0]),
            Err(StatsError::ZeroVariance { test: TEST })
        );
    }
}
