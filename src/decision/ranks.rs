//! Average ranks with tie bookkeeping for the rank-based tests

/// Ranks of a pooled sample
#[derive(Debug, Clone, PartialEq)]
pub struct Ranking {
    /// 1-based ranks in input order; ties share their average rank
    pub ranks: Vec<f64>,
    /// Sizes of every run of tied values (only runs longer than one)
    pub tie_sizes: Vec<usize>,
}

impl Ranking {
    /// Tie term `sum(t^3 - t)` over all tie runs
    pub fn tie_term(&self) -> f64 {
        self.tie_sizes
            .iter()
            .map(|&t| {
                let t = t as f64;
                t * t * t - t
            })
            .sum()
    }
}

/// Rank values, assigning tied values the mean of the ranks they span
///
/// # Example
/// ```
/// use clusterstat::decision::rank_average;
///
/// let ranking = rank_average(&[10.0, 20.0, 10.0, 30.0]);
/// assert_eq!(ranking.ranks, vec![1.5, 3.0, 1.5, 4.0]);
/// assert_eq!(ranking.tie_sizes, vec![2]);
/// ```
pub fn rank_average(values: &[f64]) -> Ranking {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    let mut tie_sizes = Vec::new();

    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && values[order[end]] == values[order[start]] {
            end += 1;
        }
        // positions start..end hold ranks start+1 ..= end
        let average = (start + 1 + end) as f64 / 2.0;
        for &idx in &order[start..end] {
            ranks[idx] = average;
        }
        if end - start > 1 {
            tie_sizes.push(end - start);
        }
        start = end;
    }

    Ranking { ranks, tie_sizes }
}
