//! Design generation and analysis benchmarks
//!
//! Run with: cargo bench --bench design_generation

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use molding_doe::analysis::stats;
use molding_doe::config::{DesignType, RecipePolicy};
use molding_doe::design::{generate, DesignParams};
use molding_doe::experiment::{ExperimentId, FieldDefinition, FieldId, FieldKind, RecipeId};
use molding_doe::factor::{FactorMode, FactorSpec};
use molding_doe::materialize::materialize;
use molding_doe::rng::SplitMix64;

fn range_factors(k: usize, levels: u32) -> Vec<FactorSpec> {
    (1..=k as u64)
        .map(|id| FactorSpec {
            field_id: FieldId(id),
            code: format!("f{id}"),
            label: format!("Factor {id}"),
            mode: FactorMode::Range {
                min: 100.0,
                max: 100.0 + 50.0 * id as f64,
            },
            level_count: levels,
        })
        .collect()
}

/// Benchmark every generator at growing factor counts
fn bench_generators(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");
    let params = DesignParams {
        seed: 42,
        center_points: 3,
        max_runs: 200,
    };

    for k in [3usize, 6, 10] {
        let factors = range_factors(k, 3);
        for design in [
            DesignType::Screening,
            DesignType::Factorial,
            DesignType::BoxBehnken,
            DesignType::Simulation,
        ] {
            group.bench_with_input(
                BenchmarkId::new(design.code(), k),
                &factors,
                |b, factors| {
                    b.iter(|| generate(design, black_box(factors), &params));
                },
            );
        }
    }

    group.finish();
}

/// Benchmark recipe × replicate expansion of a Box-Behnken design
fn bench_materialize(c: &mut Criterion) {
    let factors = range_factors(5, 3);
    let params = DesignParams {
        seed: 42,
        center_points: 3,
        max_runs: 200,
    };
    let design = generate(DesignType::BoxBehnken, &factors, &params).expect("design");
    let mut fields: Vec<FieldDefinition> = factors
        .iter()
        .map(|f| FieldDefinition::new(f.field_id, f.code.clone(), f.label.clone(), FieldKind::Input))
        .collect();
    fields.extend((100..104).map(|id| {
        FieldDefinition::new(FieldId(id), format!("out{id}"), format!("Output {id}"), FieldKind::Output)
    }));
    let policy = RecipePolicy::Block((1..=4).map(RecipeId).collect());

    c.bench_function("materialize_bbd5_x4_recipes_x3_replicates", |b| {
        b.iter(|| {
            materialize(
                ExperimentId(1),
                black_box(&design.runs),
                &policy,
                3,
                &fields,
                &[],
            )
        });
    });
}

/// Benchmark OLS on a noisy three-factor response
fn bench_regression(c: &mut Criterion) {
    let mut group = c.benchmark_group("ols");

    for n in [50usize, 500, 5_000] {
        let mut rng = SplitMix64::new(7);
        let x: Vec<Vec<f64>> = (0..n)
            .map(|_| vec![1.0, rng.next_f64(), rng.next_f64(), rng.next_f64()])
            .collect();
        let y: Vec<f64> = x
            .iter()
            .map(|row| 3.0 + 2.0 * row[1] - row[2] + 0.5 * row[3] + 0.01 * rng.next_f64())
            .collect();

        group.bench_with_input(BenchmarkId::new("normal_equations", n), &(y, x), |b, (y, x)| {
            b.iter(|| stats::ols(black_box(y), black_box(x)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_generators, bench_materialize, bench_regression);
criterion_main!(benches);
