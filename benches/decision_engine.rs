//! Decision engine benchmark
//!
//! Measures one full decision (Shapiro-Wilk per technology, Levene, omnibus,
//! post-hoc) for four technologies at realistic sample sizes, plus the
//! studentized range CDF that dominates the Tukey path.
//!
//! # Run Instructions
//!
//! ```bash
//! cargo bench --bench decision_engine
//! ```

use clusterstat::decision::{decide, ptukey, DecisionConfig};
use clusterstat::groups::{ComparisonGroup, TechnologySample};
use clusterstat::record::MetricType;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

/// Deterministic, roughly normal values around `center`
fn sample(n: usize, center: f64, seed: u64) -> Vec<f64> {
    let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    (0..n)
        .map(|_| {
            // sum of four uniforms
            let mut acc = 0.0;
            for _ in 0..4 {
                state = state
                    .wrapping_mul(6364136223846793005)
                    .wrapping_add(1442695040888963407);
                acc += (state >> 11) as f64 / (1u64 << 53) as f64;
            }
            center + (acc - 2.0)
        })
        .collect()
}

fn group(n: usize, centers: [f64; 4]) -> ComparisonGroup {
    let technologies = ["k3s", "microk8s", "kubernetes", "kubeedge"];
    ComparisonGroup {
        metric: MetricType::NodesCpu,
        source: "edge".to_string(),
        samples: technologies
            .iter()
            .zip(centers)
            .enumerate()
            .map(|(i, (technology, center))| TechnologySample {
                technology: technology.to_string(),
                values: sample(n, center, i as u64 + 1),
            })
            .collect(),
    }
}

fn bench_decide(c: &mut Criterion) {
    let config = DecisionConfig::default();
    let mut bench = c.benchmark_group("decide");

    for n in [30usize, 300, 3000] {
        let same = group(n, [10.0; 4]);
        let shifted = group(n, [10.0, 10.5, 30.0, 50.0]);

        bench.bench_with_input(BenchmarkId::new("no_difference", n), &same, |b, g| {
            b.iter(|| decide(black_box(g), &config))
        });
        bench.bench_with_input(BenchmarkId::new("significant", n), &shifted, |b, g| {
            b.iter(|| decide(black_box(g), &config))
        });
    }

    bench.finish();
}

fn bench_ptukey(c: &mut Criterion) {
    let mut bench = c.benchmark_group("ptukey");
    for df in [10.0, 100.0, 1000.0] {
        bench.bench_with_input(BenchmarkId::from_parameter(df), &df, |b, &df| {
            b.iter(|| ptukey(black_box(3.5), 1.0, 4.0, df))
        });
    }
    bench.finish();
}

criterion_group!(benches, bench_decide, bench_ptukey);
criterion_main!(benches);
