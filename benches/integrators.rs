//! Integrator and ensemble benchmarks
//!
//! - Performance (time per step on the Lorenz field) - Lower time is better
//! - Accuracy (error after one oscillator period) - Lower values are better
//! - Work-precision (error against a tight reference for each substep count) - Lower error is better
//! - Ensemble throughput (sequential vs task pool) - Lower time is better
//!
//! Note: Accuracy benchmarks report error values as durations (scaled by 1e9)
//! to work with Criterion's framework. Lower values indicate better accuracy.

use criterion::{BenchmarkId, Criterion, PlotConfiguration, criterion_group, criterion_main};
use std::hint::black_box;

use lorenz_ensemble::ensemble::{
    EnsembleConfig, SolverConfig, TimeGrid, integrate_ensemble, sample_initial_states, solve_member,
};
use lorenz_ensemble::integrators::registry::IntegratorRegistry;
use lorenz_ensemble::integrators::{DormandPrince, Integrator, StepControl, VectorField};
use lorenz_ensemble::{LorenzField, LorenzParameters, Scalar, Vector};

const PI: Scalar = std::f64::consts::PI;

/// Harmonic oscillator in (x, v, 0) form
struct HarmonicOscillator {
    omega: Scalar,
}

impl VectorField for HarmonicOscillator {
    fn at(&self, _time: Scalar, state: Vector) -> Vector {
        Vector::new(state.y, -self.omega * self.omega * state.x, 0.0)
    }
}

fn get_integrators() -> Vec<(String, Box<dyn Integrator>)> {
    let registry = IntegratorRegistry::default();
    registry
        .list_available()
        .into_iter()
        .filter_map(|name| registry.create(&name).ok().map(|i| (name, i)))
        .collect()
}

fn duration_from_error(error: Scalar) -> std::time::Duration {
    std::time::Duration::from_nanos((error * 1e9) as u64)
}

// =============================================================================
// Performance Benchmarks (Raw Speed)
// =============================================================================

fn bench_integrator_performance(c: &mut Criterion) {
    let mut group = c.benchmark_group("integrator_performance");
    group
        .plot_config(PlotConfiguration::default().summary_scale(criterion::AxisScale::Logarithmic));

    let field = LorenzField::default();

    for (name, integrator) in &get_integrators() {
        group.bench_function(name.as_str(), |b| {
            b.iter(|| {
                let state = black_box(Vector::new(1.0, 1.0, 1.0));
                let dt = black_box(0.001);
                black_box(integrator.step(&field, 0.0, state, dt));
            });
        });
    }

    group.finish();
}

// =============================================================================
// Accuracy Benchmarks
// =============================================================================

fn bench_integrator_accuracy(c: &mut Criterion) {
    let mut group = c.benchmark_group("integrator_accuracy");
    group
        .plot_config(PlotConfiguration::default().summary_scale(criterion::AxisScale::Logarithmic));

    let oscillator = HarmonicOscillator { omega: 2.0 * PI };
    let exact = Vector::new(1.0, 0.0, 0.0);

    for (name, integrator) in &get_integrators() {
        group.bench_function(BenchmarkId::new("harmonic", name.as_str()), |b| {
            b.iter_custom(|iters| {
                let mut total_error = 0.0;

                for _ in 0..iters {
                    let mut state = Vector::new(1.0, 0.0, 0.0);
                    let dt = 0.01;
                    for i in 0..100 {
                        state = integrator.step(&oscillator, dt * i as Scalar, state, dt);
                    }
                    total_error += (state - exact).length();
                }

                duration_from_error(total_error / iters as Scalar)
            });
        });
    }

    group.finish();
}

// =============================================================================
// Work-Precision Benchmarks
// =============================================================================

fn bench_work_precision(c: &mut Criterion) {
    // Final-state error on the Lorenz system against a tight adaptive reference
    let mut group = c.benchmark_group("work_precision");
    group.sample_size(10);
    group
        .plot_config(PlotConfiguration::default().summary_scale(criterion::AxisScale::Logarithmic));

    let grid = TimeGrid::new(1.0, 250).expect("valid grid");
    let field = LorenzField::default();
    let initial = sample_initial_states(1)[0];
    let reference_control = StepControl {
        absolute_tolerance: 1e-12,
        relative_tolerance: 1e-12,
        ..Default::default()
    };
    let reference = solve_member(0, initial, &grid, &field, &DormandPrince, &reference_control)
        .expect("reference solve");
    let reference_end = reference[reference.len() - 1];

    for (name, integrator) in &get_integrators() {
        if integrator.is_adaptive() {
            continue;
        }
        for substeps in [1, 2, 4, 8] {
            let control = StepControl {
                substeps,
                ..Default::default()
            };
            group.bench_with_input(
                BenchmarkId::new(name.as_str(), substeps),
                &control,
                |b, control| {
                    b.iter_custom(|iters| {
                        let mut total_error = 0.0;
                        for _ in 0..iters {
                            total_error += solve_member(
                                0,
                                initial,
                                &grid,
                                &field,
                                integrator.as_ref(),
                                control,
                            )
                            .map(|trajectory| (trajectory[trajectory.len() - 1] - reference_end).length())
                            .unwrap_or(Scalar::MAX);
                        }
                        duration_from_error(total_error / iters as Scalar)
                    });
                },
            );
        }
    }

    group.finish();
}

// =============================================================================
// Ensemble Throughput
// =============================================================================

fn bench_ensemble_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("ensemble_throughput");
    group.sample_size(10);

    let parameters = LorenzParameters::default();

    for member_count in [1, 10, 50] {
        let config = EnsembleConfig {
            member_count,
            ..Default::default()
        };

        group.bench_with_input(
            BenchmarkId::new("sequential", member_count),
            &config,
            |b, config| {
                let solver = SolverConfig::default().sequential();
                b.iter(|| integrate_ensemble(black_box(config), &parameters, &solver));
            },
        );

        group.bench_with_input(
            BenchmarkId::new("parallel", member_count),
            &config,
            |b, config| {
                let solver = SolverConfig::default();
                b.iter(|| integrate_ensemble(black_box(config), &parameters, &solver));
            },
        );
    }

    group.finish();
}

criterion_group!(performance, bench_integrator_performance);

criterion_group!(accuracy, bench_integrator_accuracy, bench_work_precision);

criterion_group!(ensemble, bench_ensemble_throughput);

criterion_main!(performance, accuracy, ensemble);
