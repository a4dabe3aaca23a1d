//! Trajectory ensemble integration
//!
//! [`integrate`] is the entry point: it samples the initial state set, builds
//! the shared [`TimeGrid`], solves one initial-value problem per member, and
//! assembles the results into a [`TrajectoryEnsemble`] in member order.
//!
//! Members share no mutable state. With [`SolverConfig::parallel`] set they
//! are solved on the compute task pool, and the assembled output is identical
//! to a sequential run.

pub mod sampling;
pub mod statistics;

use crate::error::{ConfigurationError, EnsembleError, FailureReason, IntegrationError};
use crate::physics::integrators::registry::IntegratorRegistry;
use crate::physics::integrators::{Integrator, StepControl, VectorField};
use crate::physics::lorenz::{LorenzField, LorenzParameters};
use crate::physics::math::{Scalar, Vector, linspace, sample_count};
use bevy::log::{debug, info};
use bevy::prelude::Deref;
use bevy::tasks::{ComputeTaskPool, TaskPool};
use serde::{Deserialize, Serialize};

pub use sampling::{INITIAL_STATE_SEED, sample_initial_states};
pub use statistics::Histogram;

/// Lowest convergence order accepted for ensemble runs.
///
/// First- and second-order methods drift visibly on the Lorenz attractor well
/// within the default horizon.
pub const MINIMUM_ORDER: usize = 4;

/// Longest time grid [`TimeGrid::new`] will allocate
pub const MAX_TIME_GRID_LEN: usize = 1 << 24;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(default)]
pub struct EnsembleConfig {
    pub member_count: usize,
    pub max_time: Scalar,
    pub samples_per_unit_time: u32,
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        Self {
            member_count: 10,
            max_time: 4.0,
            samples_per_unit_time: 250,
        }
    }
}

/// Solver selection and step-size policy
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct SolverConfig {
    /// Registry name or alias of the integrator
    pub integrator: String,
    /// Equal substeps per sample interval, for fixed-step integrators
    pub substeps_per_sample: u32,
    pub absolute_tolerance: Scalar,
    pub relative_tolerance: Scalar,
    /// Step budget per sample interval, for adaptive integrators
    pub max_steps_per_sample: u64,
    /// Solve members on the compute task pool
    pub parallel: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        let control = StepControl::default();
        Self {
            integrator: "rk4".to_string(),
            substeps_per_sample: control.substeps,
            absolute_tolerance: control.absolute_tolerance,
            relative_tolerance: control.relative_tolerance,
            max_steps_per_sample: control.max_steps,
            parallel: true,
        }
    }
}

impl SolverConfig {
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    pub fn with_integrator(mut self, name: impl Into<String>) -> Self {
        self.integrator = name.into();
        self
    }

    pub fn step_control(&self) -> StepControl {
        StepControl {
            substeps: self.substeps_per_sample,
            absolute_tolerance: self.absolute_tolerance,
            relative_tolerance: self.relative_tolerance,
            max_steps: self.max_steps_per_sample,
        }
    }

    /// Look up the configured integrator and check it is usable for an ensemble run
    pub fn resolve(
        &self,
        registry: &IntegratorRegistry,
    ) -> Result<Box<dyn Integrator>, ConfigurationError> {
        let integrator = registry.create(&self.integrator)?;

        if integrator.convergence_order() < MINIMUM_ORDER {
            return Err(ConfigurationError::InsufficientOrder {
                name: integrator.name().to_string(),
                order: integrator.convergence_order(),
            });
        }

        if integrator.is_adaptive() {
            let (absolute, relative) = (self.absolute_tolerance, self.relative_tolerance);
            let valid = absolute.is_finite()
                && relative.is_finite()
                && absolute >= 0.0
                && relative >= 0.0
                && absolute + relative > 0.0;
            if !valid {
                return Err(ConfigurationError::InvalidTolerance { absolute, relative });
            }
        } else if self.substeps_per_sample == 0 {
            return Err(ConfigurationError::ZeroSubsteps);
        }

        Ok(integrator)
    }
}

/// Evenly spaced report times from `0` to `max_time` inclusive
#[derive(Deref, Clone, Debug, PartialEq)]
pub struct TimeGrid(Vec<Scalar>);

impl TimeGrid {
    /// Build a grid of `round(samples_per_unit_time * max_time)` points.
    ///
    /// Grids longer than [`MAX_TIME_GRID_LEN`] are rejected before allocating.
    pub fn new(max_time: Scalar, samples_per_unit_time: u32) -> Result<Self, ConfigurationError> {
        if !(max_time.is_finite() && max_time > 0.0) {
            return Err(ConfigurationError::NonPositiveMaxTime(max_time));
        }
        if samples_per_unit_time == 0 {
            return Err(ConfigurationError::ZeroSamplesPerUnitTime);
        }

        let count = sample_count(samples_per_unit_time, max_time);
        if count == 0 {
            return Err(ConfigurationError::EmptyTimeGrid {
                max_time,
                samples_per_unit_time,
            });
        }
        if count > MAX_TIME_GRID_LEN {
            return Err(ConfigurationError::TimeGridTooLarge {
                max_time,
                samples_per_unit_time,
            });
        }

        Ok(Self(linspace(0.0, max_time, count)))
    }

    pub fn from_config(config: &EnsembleConfig) -> Result<Self, ConfigurationError> {
        Self::new(config.max_time, config.samples_per_unit_time)
    }

    /// Distance between consecutive grid points, zero for a single-point grid
    pub fn spacing(&self) -> Scalar {
        match self.0.as_slice() {
            [first, second, ..] => second - first,
            _ => 0.0,
        }
    }

    pub fn into_inner(self) -> Vec<Scalar> {
        self.0
    }
}

/// Solved trajectories stored member-major, shape `(members, samples, 3)`
#[derive(Clone, Debug, PartialEq)]
pub struct TrajectoryEnsemble {
    samples: usize,
    states: Vec<Vector>,
}

impl TrajectoryEnsemble {
    fn from_trajectories(samples: usize, trajectories: Vec<Vec<Vector>>) -> Self {
        let mut states = Vec::with_capacity(samples * trajectories.len());
        for trajectory in trajectories {
            debug_assert_eq!(trajectory.len(), samples);
            states.extend(trajectory);
        }
        Self { samples, states }
    }

    pub fn member_count(&self) -> usize {
        if self.samples == 0 {
            0
        } else {
            self.states.len() / self.samples
        }
    }

    pub fn sample_count(&self) -> usize {
        self.samples
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// `(members, samples, 3)`
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.member_count(), self.samples, 3)
    }

    /// The trajectory of one member, one state per grid time
    pub fn member(&self, index: usize) -> Option<&[Vector]> {
        let start = index.checked_mul(self.samples)?;
        let end = start.checked_add(self.samples)?;
        self.states.get(start..end)
    }

    pub fn state(&self, member: usize, sample: usize) -> Option<Vector> {
        self.member(member)?.get(sample).copied()
    }

    pub fn trajectories(&self) -> impl Iterator<Item = &[Vector]> {
        self.states.chunks_exact(self.samples.max(1))
    }

    pub fn initial_states(&self) -> Vec<Vector> {
        self.trajectories().map(|trajectory| trajectory[0]).collect()
    }

    pub fn final_states(&self) -> Vec<Vector> {
        self.trajectories()
            .map(|trajectory| trajectory[trajectory.len() - 1])
            .collect()
    }

    /// All states in member-major order
    pub fn as_slice(&self) -> &[Vector] {
        &self.states
    }

    /// Nested `[member][sample][coordinate]` copy for consumers that want plain arrays
    pub fn to_nested(&self) -> Vec<Vec<[Scalar; 3]>> {
        self.trajectories()
            .map(|trajectory| trajectory.iter().map(|state| state.to_array()).collect())
            .collect()
    }
}

/// Integrate a Lorenz ensemble with the default solver.
///
/// `member_count` may be zero, in which case the ensemble is empty but the
/// time grid is still built and validated.
pub fn integrate(
    member_count: usize,
    max_time: Scalar,
    sigma: Scalar,
    beta: Scalar,
    rho: Scalar,
    samples_per_unit_time: u32,
) -> Result<(TimeGrid, TrajectoryEnsemble), EnsembleError> {
    let config = EnsembleConfig {
        member_count,
        max_time,
        samples_per_unit_time,
    };
    integrate_ensemble(
        &config,
        &LorenzParameters::new(sigma, beta, rho),
        &SolverConfig::default(),
    )
}

/// Integrate a Lorenz ensemble with explicit configuration.
pub fn integrate_ensemble(
    config: &EnsembleConfig,
    parameters: &LorenzParameters,
    solver: &SolverConfig,
) -> Result<(TimeGrid, TrajectoryEnsemble), EnsembleError> {
    let grid = TimeGrid::from_config(config)?;
    let initial_states = sample_initial_states(config.member_count);
    let ensemble = solve_ensemble(&initial_states, &grid, &LorenzField::new(*parameters), solver)?;

    info!(
        "Integrated {} members over {} samples (max_time = {})",
        ensemble.member_count(),
        grid.len(),
        config.max_time
    );

    Ok((grid, ensemble))
}

/// Solve one trajectory per initial state over any vector field.
///
/// The first failing member (lowest index) is reported; no partial ensemble
/// is returned.
pub fn solve_ensemble(
    initial_states: &[Vector],
    grid: &TimeGrid,
    field: &dyn VectorField,
    solver: &SolverConfig,
) -> Result<TrajectoryEnsemble, EnsembleError> {
    let integrator = solver.resolve(IntegratorRegistry::standard())?;
    let control = solver.step_control();

    debug!(
        "Solving {} members with {} on {} samples (spacing {}, parallel: {})",
        initial_states.len(),
        integrator.name(),
        grid.len(),
        grid.spacing(),
        solver.parallel
    );

    let integrator: &dyn Integrator = integrator.as_ref();
    let results: Vec<Result<Vec<Vector>, IntegrationError>> = if solver.parallel {
        let pool = ComputeTaskPool::get_or_init(TaskPool::default);
        pool.scope(|scope| {
            for (member, &initial_state) in initial_states.iter().enumerate() {
                let control = &control;
                scope.spawn(async move {
                    solve_member(member, initial_state, grid, field, integrator, control)
                });
            }
        })
    } else {
        initial_states
            .iter()
            .enumerate()
            .map(|(member, &initial_state)| {
                solve_member(member, initial_state, grid, field, integrator, &control)
            })
            .collect()
    };

    let trajectories = results.into_iter().collect::<Result<Vec<_>, _>>()?;

    Ok(TrajectoryEnsemble::from_trajectories(grid.len(), trajectories))
}

/// Integrate a single member, reporting its state at every grid time.
pub fn solve_member(
    member: usize,
    initial_state: Vector,
    grid: &TimeGrid,
    field: &dyn VectorField,
    integrator: &dyn Integrator,
    control: &StepControl,
) -> Result<Vec<Vector>, IntegrationError> {
    let failure = |time, reason| IntegrationError {
        member,
        initial_state,
        time,
        reason,
    };

    if !initial_state.is_finite() {
        return Err(failure(0.0, FailureReason::NonFinite));
    }

    let mut trajectory = Vec::with_capacity(grid.len());
    let mut state = initial_state;
    trajectory.push(state);

    for window in grid.windows(2) {
        let (start, end) = (window[0], window[1]);
        state = integrator
            .advance(field, start, state, end - start, control)
            .map_err(|reason| failure(start, reason))?;

        if !state.is_finite() {
            return Err(failure(start, FailureReason::NonFinite));
        }

        trajectory.push(state);
    }

    Ok(trajectory)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_grid_length_and_endpoints() {
        let grid = TimeGrid::new(2.0, 250).unwrap();
        assert_eq!(grid.len(), 500);
        assert_eq!(grid[0], 0.0);
        assert_eq!(grid[499], 2.0);
        assert!((grid.spacing() - 2.0 / 499.0).abs() < 1e-15);
    }

    #[test]
    fn test_time_grid_rejects_bad_horizons() {
        for max_time in [0.0, -1.0, Scalar::NAN, Scalar::INFINITY] {
            assert!(matches!(
                TimeGrid::new(max_time, 250),
                Err(ConfigurationError::NonPositiveMaxTime(_))
            ));
        }
        assert_eq!(
            TimeGrid::new(1.0, 0),
            Err(ConfigurationError::ZeroSamplesPerUnitTime)
        );
        assert!(matches!(
            TimeGrid::new(0.001, 250),
            Err(ConfigurationError::EmptyTimeGrid { .. })
        ));
    }

    #[test]
    fn test_time_grid_rejects_oversized_horizons() {
        for max_time in [1e300, 4e14, Scalar::MAX] {
            assert_eq!(
                TimeGrid::new(max_time, 250),
                Err(ConfigurationError::TimeGridTooLarge {
                    max_time,
                    samples_per_unit_time: 250
                })
            );
        }

        let just_over = MAX_TIME_GRID_LEN as Scalar / 250.0 + 1.0;
        assert!(matches!(
            TimeGrid::new(just_over, 250),
            Err(ConfigurationError::TimeGridTooLarge { .. })
        ));
    }

    #[test]
    fn test_single_point_grid() {
        let grid = TimeGrid::new(0.004, 250).unwrap();
        assert_eq!(grid.len(), 1);
        assert_eq!(grid.spacing(), 0.0);

        let (_, ensemble) = integrate_ensemble(
            &EnsembleConfig {
                member_count: 2,
                max_time: 0.004,
                samples_per_unit_time: 250,
            },
            &LorenzParameters::default(),
            &SolverConfig::default(),
        )
        .unwrap();
        assert_eq!(ensemble.shape(), (2, 1, 3));
        assert_eq!(ensemble.initial_states(), sample_initial_states(2));
    }

    #[test]
    fn test_resolve_rejects_low_order() {
        let registry = IntegratorRegistry::default();
        let solver = SolverConfig::default().with_integrator("euler");
        assert_eq!(
            solver.resolve(&registry).err(),
            Some(ConfigurationError::InsufficientOrder {
                name: "explicit_euler".to_string(),
                order: 1
            })
        );
    }

    #[test]
    fn test_resolve_validates_step_control() {
        let registry = IntegratorRegistry::default();

        let mut solver = SolverConfig::default();
        solver.substeps_per_sample = 0;
        assert_eq!(
            solver.resolve(&registry).err(),
            Some(ConfigurationError::ZeroSubsteps)
        );

        let mut solver = SolverConfig::default().with_integrator("dopri5");
        solver.absolute_tolerance = 0.0;
        solver.relative_tolerance = 0.0;
        assert!(matches!(
            solver.resolve(&registry),
            Err(ConfigurationError::InvalidTolerance { .. })
        ));
    }

    #[test]
    fn test_solve_member_stationary_at_origin() {
        let grid = TimeGrid::new(1.0, 50).unwrap();
        let trajectory = solve_member(
            0,
            Vector::ZERO,
            &grid,
            &LorenzField::default(),
            &crate::physics::integrators::RungeKuttaFourthOrder,
            &StepControl::default(),
        )
        .unwrap();
        assert_eq!(trajectory.len(), 50);
        assert!(trajectory.iter().all(|state| *state == Vector::ZERO));
    }

    #[test]
    fn test_divergent_member_reports_index() {
        struct Explosive;

        impl VectorField for Explosive {
            fn at(&self, _time: Scalar, state: Vector) -> Vector {
                state * state.length_squared()
            }
        }

        let grid = TimeGrid::new(1.0, 10).unwrap();
        let states = [Vector::ZERO, Vector::splat(100.0), Vector::ZERO];
        let result = solve_ensemble(&states, &grid, &Explosive, &SolverConfig::default());

        match result {
            Err(EnsembleError::Integration(err)) => {
                assert_eq!(err.member, 1);
                assert_eq!(err.initial_state, Vector::splat(100.0));
                assert_eq!(err.reason, FailureReason::NonFinite);
            }
            other => panic!("Expected integration error, got {other:?}"),
        }
    }

    #[test]
    fn test_ensemble_accessors() {
        let grid = TimeGrid::new(0.2, 50).unwrap();
        let states = sample_initial_states(3);
        let ensemble = solve_ensemble(
            &states,
            &grid,
            &LorenzField::default(),
            &SolverConfig::default().sequential(),
        )
        .unwrap();

        assert_eq!(ensemble.shape(), (3, 10, 3));
        assert_eq!(ensemble.member(2).map(<[Vector]>::len), Some(10));
        assert!(ensemble.member(3).is_none());
        assert_eq!(ensemble.state(1, 0), Some(states[1]));
        assert_eq!(ensemble.state(0, 10), None);
        assert_eq!(ensemble.final_states()[2], ensemble.member(2).unwrap()[9]);

        let nested = ensemble.to_nested();
        assert_eq!(nested.len(), 3);
        assert_eq!(nested[0].len(), 10);
        assert_eq!(nested[0][0], states[0].to_array());
    }
}
