// Statistical decision engine for comparing technologies
//
// For one comparison group (one metric type on one source, one sample per
// technology) the engine walks the classic decision tree:
//
//   1. Shapiro-Wilk per technology          -> is the group normal?
//   2. Levene (median-centred) across groups -> are variances equal?
//   3. One-way ANOVA if both hold, Kruskal-Wallis otherwise
//   4. If the omnibus test is significant: Tukey HSD after ANOVA,
//      Dunn with Bonferroni correction after Kruskal-Wallis
//
// The outcome is a `DecisionOutcome` built once per group and handed to the
// plot and summary renderers. Every test is a pure function of its inputs;
// degenerate inputs (too few values, zero variance) surface as `StatsError`.
//
// Distributions (normal, F, chi-squared) and log-gamma come from statrs.

mod config;
mod describe;
mod engine;
mod error;
mod normality;
mod omnibus;
mod posthoc;
mod ranks;
mod studentized_range;
mod variance;

pub use config::DecisionConfig;
pub use describe::{mean, median, median_absolute_deviation, sample_std_dev};
pub use engine::{
    decide, select_omnibus, DecisionOutcome, NormalityCheck, OmnibusResult, PosthocResult,
    VarianceCheck, Verdict,
};
pub use error::{Result, StatsError};
pub use normality::{shapiro_wilk, ShapiroWilk};
pub use omnibus::{kruskal_wallis, one_way_anova, OmnibusTest, TestResult};
pub use posthoc::{dunn_bonferroni, tukey_hsd, PairwiseMatrix, PairwiseResult, PosthocTest};
pub use ranks::{rank_average, Ranking};
pub use studentized_range::ptukey;
pub use variance::levene;
