// Decision tree driver: normality -> variance -> omnibus -> post-hoc
//
// Each step's outcome decides whether and how the next one runs, so the
// steps execute strictly in order. The result is assembled once into a
// `DecisionOutcome` instead of being threaded through mutable flags.

use crate::decision::config::DecisionConfig;
use crate::decision::error::{Result, StatsError};
use crate::decision::normality::shapiro_wilk;
use crate::decision::omnibus::OmnibusTest;
use crate::decision::posthoc::{PairwiseMatrix, PairwiseResult, PosthocTest};
use crate::decision::variance::levene;
use crate::groups::ComparisonGroup;
use crate::record::MetricType;
use serde::Serialize;

/// Shapiro-Wilk outcome for one technology
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalityCheck {
    pub technology: String,
    pub sample_size: usize,
    pub statistic: f64,
    pub p_value: f64,
    /// p > alpha
    pub normal: bool,
}

/// Levene outcome across all technologies
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VarianceCheck {
    pub statistic: f64,
    pub p_value: f64,
    /// p > alpha
    pub equal: bool,
}

/// The omnibus test that ran and its result
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OmnibusResult {
    pub test: OmnibusTest,
    pub statistic: f64,
    pub p_value: f64,
}

/// Pairwise follow-up of a significant omnibus result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PosthocResult {
    pub test: PosthocTest,
    pub matrix: PairwiseMatrix,
    /// Upper-triangle pairs in row-major order
    pub pairs: Vec<PairwiseResult>,
}

/// Final gate of the decision tree
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    /// Omnibus p > alpha: post-hoc testing is skipped
    NoSignificantDifference,
    /// Omnibus p <= alpha: pairwise results follow
    Significant(PosthocResult),
}

/// Everything the decision tree found for one comparison group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionOutcome {
    pub metric: MetricType,
    pub source: String,
    pub normality: Vec<NormalityCheck>,
    /// Every technology passed Shapiro-Wilk
    pub is_normal: bool,
    pub variance: VarianceCheck,
    pub is_equal_variance: bool,
    pub omnibus: OmnibusResult,
    pub verdict: Verdict,
}

impl DecisionOutcome {
    pub fn significant(&self) -> bool {
        matches!(self.verdict, Verdict::Significant(_))
    }

    pub fn posthoc(&self) -> Option<&PosthocResult> {
        match &self.verdict {
            Verdict::Significant(posthoc) => Some(posthoc),
            Verdict::NoSignificantDifference => None,
        }
    }

    pub fn posthoc_test(&self) -> Option<PosthocTest> {
        self.posthoc().map(|p| p.test)
    }

    /// Pairwise results; empty when no post-hoc test ran
    pub fn pairs(&self) -> &[PairwiseResult] {
        self.posthoc().map(|p| p.pairs.as_slice()).unwrap_or(&[])
    }

    /// Names of the tests used, as shown under the plot title
    ///
    /// e.g. `One-way ANOVA + Tukey HSD` or
    /// `No Significant Difference Among the Groups - Kruskal-Wallis`
    pub fn title_suffix(&self) -> String {
        match &self.verdict {
            Verdict::Significant(posthoc) => {
                format!("{} + {}", self.omnibus.test.name(), posthoc.test.name())
            }
            Verdict::NoSignificantDifference => format!(
                "No Significant Difference Among the Groups - {}",
                self.omnibus.test.name()
            ),
        }
    }

    /// Generate human-readable report
    pub fn to_report_string(&self) -> String {
        let mut report = format!("**** {} / {} ****\n", self.metric, self.source);

        for check in &self.normality {
            report.push_str(&format!(
                "  Shapiro-Wilk {:<12} n={:<4} W={:.3} p={:.3}  {}\n",
                check.technology,
                check.sample_size,
                check.statistic,
                check.p_value,
                if check.normal {
                    "looks normal"
                } else {
                    "does NOT look normal"
                }
            ));
        }

        report.push_str(&format!(
            "  Levene W={:.3} p={:.3}  {}\n",
            self.variance.statistic,
            self.variance.p_value,
            if self.variance.equal {
                "equal variances"
            } else {
                "unequal variances"
            }
        ));

        report.push_str(&format!(
            "  {} statistic={:.3} p={:.3e}\n",
            self.omnibus.test, self.omnibus.statistic, self.omnibus.p_value
        ));

        match &self.verdict {
            Verdict::NoSignificantDifference => {
                report.push_str("  No significant difference - post-hoc test skipped\n");
            }
            Verdict::Significant(posthoc) => {
                report.push_str(&format!("  Significant difference - {}:\n", posthoc.test));
                for pair in &posthoc.pairs {
                    report.push_str(&format!(
                        "    {} vs {}: p={:.3e}\n",
                        pair.technology_a, pair.technology_b, pair.p_value
                    ));
                }
            }
        }

        report
    }
}

/// Omnibus test for the observed assumptions
///
/// ANOVA only when every sample looks normal and variances are equal;
/// Kruskal-Wallis otherwise.
pub fn select_omnibus(is_normal: bool, is_equal_variance: bool) -> OmnibusTest {
    if is_normal && is_equal_variance {
        OmnibusTest::Anova
    } else {
        OmnibusTest::KruskalWallis
    }
}

/// Run the full decision tree on one comparison group
pub fn decide(group: &ComparisonGroup, config: &DecisionConfig) -> Result<DecisionOutcome> {
    config.validate()?;

    if group.samples.len() < 2 {
        return Err(StatsError::TooFewGroups {
            test: "comparison",
            required: 2,
            actual: group.samples.len(),
        });
    }
    for sample in &group.samples {
        if sample.values.len() < config.min_sample_size {
            return Err(StatsError::InsufficientData {
                test: "comparison",
                required: config.min_sample_size,
                actual: sample.values.len(),
            }
            .for_technology(&sample.technology));
        }
    }

    let technologies = group.technologies();
    let samples = group.sample_slices();

    // Step 1: normality, failing closed
    let normality = group
        .samples
        .iter()
        .map(|sample| {
            let result =
                shapiro_wilk(&sample.values).map_err(|e| e.for_technology(&sample.technology))?;
            tracing::debug!(
                "{}/{} {}: SHAPIRO={:.3}, p={:.3}",
                group.metric,
                group.source,
                sample.technology,
                result.statistic,
                result.p_value
            );
            Ok(NormalityCheck {
                technology: sample.technology.clone(),
                sample_size: sample.values.len(),
                statistic: result.statistic,
                p_value: result.p_value,
                normal: config.accepts_null(result.p_value),
            })
        })
        .collect::<Result<Vec<_>>>()?;
    let is_normal = normality.iter().all(|check| check.normal);

    // Step 2: variance homogeneity across all samples at once
    let lev = levene(&samples)?;
    let is_equal_variance = config.accepts_null(lev.p_value);
    tracing::debug!(
        "{}/{}: LEVENE={:.3}, p={:.3}",
        group.metric,
        group.source,
        lev.statistic,
        lev.p_value
    );

    // Step 3: omnibus test, the single gate for post-hoc testing
    let test = select_omnibus(is_normal, is_equal_variance);
    let omnibus = test.run(&samples)?;
    tracing::debug!(
        "{}/{}: {} H={:.3}, p={:.3e}",
        group.metric,
        group.source,
        test,
        omnibus.statistic,
        omnibus.p_value
    );

    // Step 4: post-hoc test mirrors the omnibus branch
    let verdict = if config.accepts_null(omnibus.p_value) {
        tracing::debug!(
            "{}/{}: no significant difference - skipping post-hoc tests",
            group.metric,
            group.source
        );
        Verdict::NoSignificantDifference
    } else {
        let posthoc = PosthocTest::following(test);
        let matrix = posthoc.run(&technologies, &samples)?;
        let pairs = matrix.upper_triangle();
        Verdict::Significant(PosthocResult {
            test: posthoc,
            matrix,
            pairs,
        })
    };

    Ok(DecisionOutcome {
        metric: group.metric,
        source: group.source.clone(),
        normality,
        is_normal,
        variance: VarianceCheck {
            statistic: lev.statistic,
            p_value: lev.p_value,
            equal: is_equal_variance,
        },
        is_equal_variance,
        omnibus: OmnibusResult {
            test,
            statistic: omnibus.statistic,
            p_value: omnibus.p_value,
        },
        verdict,
    })
}
