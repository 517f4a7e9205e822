// Post-hoc pairwise tests
//
// - Tukey HSD (Tukey-Kramer for unequal sample sizes) after ANOVA
// - Dunn's test with Bonferroni correction after Kruskal-Wallis
//
// Both produce a symmetric technology x technology matrix of p-values with
// an undefined diagonal. Annotation only needs each unordered pair once, so
// `PairwiseMatrix::upper_triangle` keeps the strictly upper triangle.

use crate::decision::describe::{mean, sum_sq_dev};
use crate::decision::error::{distribution_error, Result, StatsError};
use crate::decision::omnibus::{check_samples, OmnibusTest};
use crate::decision::ranks::rank_average;
use crate::decision::studentized_range::ptukey;
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};
use std::fmt;

/// Which post-hoc test ran
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PosthocTest {
    TukeyHsd,
    DunnBonferroni,
}

impl PosthocTest {
    /// The post-hoc test that follows an omnibus test
    pub fn following(omnibus: OmnibusTest) -> Self {
        match omnibus {
            OmnibusTest::Anova => PosthocTest::TukeyHsd,
            OmnibusTest::KruskalWallis => PosthocTest::DunnBonferroni,
        }
    }

    /// Display name used in plot titles and reports
    pub fn name(self) -> &'static str {
        match self {
            PosthocTest::TukeyHsd => "Tukey HSD",
            PosthocTest::DunnBonferroni => "Dunn",
        }
    }

    /// Run this test over labelled samples
    pub fn run(self, technologies: &[String], samples: &[&[f64]]) -> Result<PairwiseMatrix> {
        match self {
            PosthocTest::TukeyHsd => tukey_hsd(technologies, samples),
            PosthocTest::DunnBonferroni => dunn_bonferroni(technologies, samples),
        }
    }
}

impl fmt::Display for PosthocTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One technology pair and its (adjusted) p-value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairwiseResult {
    pub technology_a: String,
    pub technology_b: String,
    pub p_value: f64,
}

/// Symmetric matrix of pairwise p-values
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairwiseMatrix {
    /// Row/column labels
    pub technologies: Vec<String>,
    /// `p_values[i][j]`; `None` where undefined (the diagonal)
    pub p_values: Vec<Vec<Option<f64>>>,
}

impl PairwiseMatrix {
    /// Build a symmetric matrix from a function of the index pair `i < j`
    pub fn from_upper<F>(technologies: &[String], mut p_value: F) -> Self
    where
        F: FnMut(usize, usize) -> Option<f64>,
    {
        let k = technologies.len();
        let mut p_values = vec![vec![None; k]; k];
        for i in 0..k {
            for j in (i + 1)..k {
                let p = p_value(i, j);
                p_values[i][j] = p;
                p_values[j][i] = p;
            }
        }
        Self {
            technologies: technologies.to_vec(),
            p_values,
        }
    }

    /// p-value for a pair of technologies, in either order
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.technologies.iter().position(|t| t == a)?;
        let j = self.technologies.iter().position(|t| t == b)?;
        self.p_values.get(i)?.get(j).copied().flatten()
    }

    /// Strictly-upper-triangular entries with a defined p-value, row-major
    ///
    /// Each unordered pair appears once; the diagonal and the mirrored lower
    /// triangle are dropped, as is any undefined entry.
    ///
    /// # Example
    /// ```
    /// use clusterstat::decision::PairwiseMatrix;
    ///
    /// let techs: Vec<String> = ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect();
    /// let matrix = PairwiseMatrix::from_upper(&techs, |i, j| Some((i * 10 + j) as f64 / 100.0));
    /// let pairs = matrix.upper_triangle();
    /// assert_eq!(pairs.len(), 6);
    /// assert_eq!((pairs[0].technology_a.as_str(), pairs[0].technology_b.as_str()), ("a", "b"));
    /// assert_eq!((pairs[5].technology_a.as_str(), pairs[5].technology_b.as_str()), ("c", "d"));
    /// ```
    pub fn upper_triangle(&self) -> Vec<PairwiseResult> {
        let mut pairs = Vec::new();
        for (i, row) in self.p_values.iter().enumerate() {
            for (j, cell) in row.iter().enumerate().skip(i + 1) {
                if let Some(p) = cell.filter(|p| !p.is_nan()) {
                    pairs.push(PairwiseResult {
                        technology_a: self.technologies[i].clone(),
                        technology_b: self.technologies[j].clone(),
                        p_value: p,
                    });
                }
            }
        }
        pairs
    }
}

fn check_labels(technologies: &[String], samples: &[&[f64]]) -> Result<()> {
    if technologies.len() != samples.len() {
        return Err(StatsError::Undefined {
            test: "post-hoc",
            reason: format!(
                "{} labels for {} samples",
                technologies.len(),
                samples.len()
            ),
        });
    }
    Ok(())
}

/// Tukey's honestly significant difference test
///
/// Uses the pooled within-group mean square and the Tukey-Kramer standard
/// error, so unequal sample sizes are allowed.
pub fn tukey_hsd(technologies: &[String], samples: &[&[f64]]) -> Result<PairwiseMatrix> {
    const TEST: &str = "Tukey HSD";
    check_labels(technologies, samples)?;
    let total = check_samples(TEST, samples, 1)?;
    let k = samples.len();
    if total < k + 2 {
        return Err(StatsError::InsufficientData {
            test: TEST,
            required: 2,
            actual: total / k,
        });
    }

    let df = (total - k) as f64;
    let within: f64 = samples.iter().map(|s| sum_sq_dev(s)).sum();
    if within <= 0.0 {
        return Err(StatsError::ZeroVariance { test: TEST });
    }
    let mse = within / df;
    let means: Vec<f64> = samples.iter().map(|s| mean(s).unwrap_or_default()).collect();

    Ok(PairwiseMatrix::from_upper(technologies, |i, j| {
        let n_i = samples[i].len() as f64;
        let n_j = samples[j].len() as f64;
        let se = (mse / 2.0 * (1.0 / n_i + 1.0 / n_j)).sqrt();
        let q = (means[i] - means[j]).abs() / se;
        let p = 1.0 - ptukey(q, 1.0, k as f64, df);
        Some(p.clamp(0.0, 1.0))
    }))
}

/// Dunn's test on pooled ranks with Bonferroni adjustment
///
/// Ties shrink the rank variance by `sum(t^3 - t) / (12 (N - 1))`. Each raw
/// two-sided p-value is multiplied by the number of pairs and capped at 1.
pub fn dunn_bonferroni(technologies: &[String], samples: &[&[f64]]) -> Result<PairwiseMatrix> {
    const TEST: &str = "Dunn";
    check_labels(technologies, samples)?;
    let total = check_samples(TEST, samples, 1)?;
    let k = samples.len();

    let pooled: Vec<f64> = samples.iter().flat_map(|s| s.iter().copied()).collect();
    let ranking = rank_average(&pooled);

    let mut mean_ranks = Vec::with_capacity(k);
    let mut offset = 0;
    for s in samples {
        let ranks = &ranking.ranks[offset..offset + s.len()];
        mean_ranks.push(ranks.iter().sum::<f64>() / s.len() as f64);
        offset += s.len();
    }

    let n = total as f64;
    let variance = n * (n + 1.0) / 12.0 - ranking.tie_term() / (12.0 * (n - 1.0));
    if variance <= 0.0 {
        return Err(StatsError::Undefined {
            test: TEST,
            reason: "all values are identical".to_string(),
        });
    }

    let normal = Normal::new(0.0, 1.0).map_err(distribution_error)?;
    let comparisons = (k * (k - 1) / 2) as f64;

    Ok(PairwiseMatrix::from_upper(technologies, |i, j| {
        let n_i = samples[i].len() as f64;
        let n_j = samples[j].len() as f64;
        let z = (mean_ranks[i] - mean_ranks[j]) / (variance * (1.0 / n_i + 1.0 / n_j)).sqrt();
        let raw = 2.0 * normal.sf(z.abs());
        Some((raw * comparisons).min(1.0))
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_upper_triangle_of_4x4_has_six_unique_pairs() {
        let techs = labels(&["k3s", "microk8s", "kubernetes", "kubeedge"]);
        let matrix = PairwiseMatrix::from_upper(&techs, |i, j| Some(0.01 * (i + j) as f64));
        let pairs = matrix.upper_triangle();
        assert_eq!(pairs.len(), 6);
        for pair in &pairs {
            assert_ne!(pair.technology_a, pair.technology_b);
            assert!(!pairs.iter().any(|other| other.technology_a == pair.technology_b
                && other.technology_b == pair.technology_a));
        }
        let order: Vec<(&str, &str)> = pairs
            .iter()
            .map(|p| (p.technology_a.as_str(), p.technology_b.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![
                ("k3s", "microk8s"),
                ("k3s", "kubernetes"),
                ("k3s", "kubeedge"),
                ("microk8s", "kubernetes"),
                ("microk8s", "kubeedge"),
                ("kubernetes", "kubeedge"),
            ]
        );
    }

    #[test]
    fn test_upper_triangle_drops_undefined_entries() {
        let techs = labels(&["a", "b", "c"]);
        let matrix = PairwiseMatrix::from_upper(&techs, |i, j| {
            if (i, j) == (0, 2) {
                None
            } else {
                Some(0.5)
            }
        });
        let pairs = matrix.upper_triangle();
        assert_eq!(pairs.len(), 2);
        assert!(matrix.get("a", "c").is_none());
        assert_eq!(matrix.get("c", "b"), Some(0.5));
        assert_eq!(matrix.get("a", "a"), None);
    }

    #[test]
    fn test_tukey_reference_example() {
        // scipy.stats.tukey_hsd documentation example
        let g0 = [24.5, 23.5, 26.4, 27.1, 29.9];
        let g1 = [28.4, 34.2, 29.5, 32.2, 30.1];
        let g2 = [26.1, 28.3, 24.3, 26.2, 27.8];
        let techs = labels(&["g0", "g1", "g2"]);
        let matrix = tukey_hsd(&techs, &[&g0, &g1, &g2]).unwrap();
        let p01 = matrix.get("g0", "g1").unwrap();
        let p02 = matrix.get("g0", "g2").unwrap();
        let p12 = matrix.get("g1", "g2").unwrap();
        assert!((p01 - 0.014).abs() < 0.002, "p01={}", p01);
        assert!((p02 - 0.980).abs() < 0.002, "p02={}", p02);
        assert!((p12 - 0.020).abs() < 0.002, "p12={}", p12);
    }

    #[test]
    fn test_tukey_equal_means() {
        let a = [1.0, 2.0, 3.0];
        let techs = labels(&["a", "b"]);
        let matrix = tukey_hsd(&techs, &[&a, &a]).unwrap();
        assert_eq!(matrix.get("a", "b"), Some(1.0));
    }

    #[test]
    fn test_tukey_zero_variance() {
        let a = [1.0, 1.0];
        let b = [2.0, 2.0];
        let techs = labels(&["a", "b"]);
        assert!(matches!(
            tukey_hsd(&techs, &[&a, &b]),
            Err(StatsError::ZeroVariance { .. })
        ));
    }

    #[test]
    fn test_dunn_bonferroni_hand_computed() {
        // mean ranks 2, 5, 8 of N = 9 without ties; sigma^2 = 7.5
        let a = [1.0, 2.0, 3.0];
        let b = [4.0, 5.0, 6.0];
        let c = [7.0, 8.0, 9.0];
        let techs = labels(&["a", "b", "c"]);
        let matrix = dunn_bonferroni(&techs, &[&a, &b, &c]).unwrap();
        let p_ab = matrix.get("a", "b").unwrap();
        let p_ac = matrix.get("a", "c").unwrap();
        let p_bc = matrix.get("b", "c").unwrap();
        assert!((p_ab - 0.5392).abs() < 1e-3, "p_ab={}", p_ab);
        assert!((p_ac - 0.02187).abs() < 1e-3, "p_ac={}", p_ac);
        assert!((p_ab - p_bc).abs() < 1e-12);
    }

    #[test]
    fn test_dunn_caps_at_one() {
        let a = [1.0, 5.0, 9.0];
        let b = [2.0, 5.0, 8.0];
        let techs = labels(&["a", "b"]);
        let matrix = dunn_bonferroni(&techs, &[&a, &b]).unwrap();
        assert!(matrix.get("a", "b").unwrap() <= 1.0);
    }

    #[test]
    fn test_posthoc_follows_omnibus() {
        assert_eq!(PosthocTest::following(OmnibusTest::Anova), PosthocTest::TukeyHsd);
        assert_eq!(
            PosthocTest::following(OmnibusTest::KruskalWallis),
            PosthocTest::DunnBonferroni
        );
    }

    #[test]
    fn test_label_count_mismatch() {
        let a = [1.0, 2.0, 3.0];
        let b = [4.0, 5.0, 6.0];
        assert!(tukey_hsd(&labels(&["a"]), &[&a, &b]).is_err());
    }
}
