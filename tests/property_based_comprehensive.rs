//! Property-based tests for the statistical building blocks
//!
//! Properties covered:
//! 1. Pair extraction (unique unordered pairs, row-major order)
//! 2. Median absolute deviation (non-negative, shift/scale behaviour)
//! 3. Average ranks (sum is n(n+1)/2, order preserving)
//! 4. Shapiro-Wilk (statistic and p-value in range)
//! 5. Omnibus and post-hoc p-values in [0, 1]

use clusterstat::decision::{
    dunn_bonferroni, kruskal_wallis, median, median_absolute_deviation, rank_average,
    shapiro_wilk, PairwiseMatrix,
};
use proptest::prelude::*;
use std::collections::HashSet;

fn labels(k: usize) -> Vec<String> {
    (0..k).map(|i| format!("tech-{}", i)).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_upper_triangle_has_each_pair_once(k in 2usize..8, seed in 0u64..1000) {
        let techs = labels(k);
        let matrix = PairwiseMatrix::from_upper(&techs, |i, j| {
            Some(((seed as usize + i * 7 + j * 13) % 100) as f64 / 100.0)
        });
        let pairs = matrix.upper_triangle();

        prop_assert_eq!(pairs.len(), k * (k - 1) / 2);

        let mut seen = HashSet::new();
        for pair in &pairs {
            prop_assert_ne!(&pair.technology_a, &pair.technology_b);
            let a = techs.iter().position(|t| t == &pair.technology_a).unwrap();
            let b = techs.iter().position(|t| t == &pair.technology_b).unwrap();
            prop_assert!(a < b);
            prop_assert!(seen.insert((a, b)));
            prop_assert_eq!(matrix.get(&pair.technology_b, &pair.technology_a), Some(pair.p_value));
        }

        // row-major: sorted by (row, column)
        let order: Vec<(usize, usize)> = pairs
            .iter()
            .map(|p| {
                (
                    techs.iter().position(|t| t == &p.technology_a).unwrap(),
                    techs.iter().position(|t| t == &p.technology_b).unwrap(),
                )
            })
            .collect();
        let mut sorted = order.clone();
        sorted.sort();
        prop_assert_eq!(order, sorted);
    }

    #[test]
    fn prop_upper_triangle_drops_undefined(k in 2usize..7, hole in 0usize..21) {
        let techs = labels(k);
        let mut index = 0;
        let matrix = PairwiseMatrix::from_upper(&techs, |_, _| {
            let p = if index == hole { None } else { Some(0.5) };
            index += 1;
            p
        });
        let expected = k * (k - 1) / 2 - usize::from(hole < k * (k - 1) / 2);
        prop_assert_eq!(matrix.upper_triangle().len(), expected);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_mad_non_negative_and_shift_invariant(
        values in prop::collection::vec(-1000.0f64..1000.0, 1..50),
        shift in -500.0f64..500.0,
    ) {
        let mad = median_absolute_deviation(&values).unwrap();
        prop_assert!(mad >= 0.0);

        let shifted: Vec<f64> = values.iter().map(|v| v + shift).collect();
        let mad_shifted = median_absolute_deviation(&shifted).unwrap();
        prop_assert!((mad - mad_shifted).abs() < 1e-6);
    }

    #[test]
    fn prop_mad_scales_linearly(
        values in prop::collection::vec(-100.0f64..100.0, 1..50),
        scale in 0.1f64..10.0,
    ) {
        let mad = median_absolute_deviation(&values).unwrap();
        let scaled: Vec<f64> = values.iter().map(|v| v * scale).collect();
        let mad_scaled = median_absolute_deviation(&scaled).unwrap();
        prop_assert!((mad * scale - mad_scaled).abs() < 1e-6 * (1.0 + mad_scaled));
    }

    #[test]
    fn prop_median_between_extremes(values in prop::collection::vec(-1e6f64..1e6, 1..60)) {
        let m = median(&values).unwrap();
        let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        prop_assert!(m >= lo && m <= hi);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_rank_sum_is_triangular(values in prop::collection::vec(0u8..20, 1..80)) {
        let values: Vec<f64> = values.into_iter().map(f64::from).collect();
        let ranking = rank_average(&values);
        let n = values.len() as f64;
        let sum: f64 = ranking.ranks.iter().sum();
        prop_assert!((sum - n * (n + 1.0) / 2.0).abs() < 1e-9);
        prop_assert!(ranking.tie_term() >= 0.0);
    }

    #[test]
    fn prop_ranks_preserve_order(values in prop::collection::vec(-50.0f64..50.0, 2..40)) {
        let ranking = rank_average(&values);
        for i in 0..values.len() {
            for j in 0..values.len() {
                if values[i] < values[j] {
                    prop_assert!(ranking.ranks[i] < ranking.ranks[j]);
                } else if values[i] == values[j] {
                    prop_assert_eq!(ranking.ranks[i], ranking.ranks[j]);
                }
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn prop_shapiro_wilk_in_range(values in prop::collection::vec(0.0f64..100.0, 3..200)) {
        prop_assume!(values.iter().any(|v| (v - values[0]).abs() > 1e-6));
        let result = shapiro_wilk(&values).unwrap();
        prop_assert!(result.statistic > 0.0 && result.statistic <= 1.0);
        prop_assert!(result.p_value >= 0.0 && result.p_value <= 1.0);
    }

    #[test]
    fn prop_rank_tests_give_probabilities(
        a in prop::collection::vec(0.0f64..10.0, 3..30),
        b in prop::collection::vec(0.0f64..10.0, 3..30),
        c in prop::collection::vec(5.0f64..15.0, 3..30),
    ) {
        let samples: Vec<&[f64]> = vec![&a, &b, &c];
        let kw = kruskal_wallis(&samples).unwrap();
        prop_assert!(kw.statistic >= 0.0);
        prop_assert!(kw.p_value >= 0.0 && kw.p_value <= 1.0);

        let matrix = dunn_bonferroni(&labels(3), &samples).unwrap();
        for pair in matrix.upper_triangle() {
            prop_assert!(pair.p_value >= 0.0 && pair.p_value <= 1.0);
        }
    }
}
