//! Explicit Euler integration method (forward Euler)
//!
//! WARNING: This integrator is provided for comparison purposes only. On the
//! Lorenz system its error grows visibly within a few time units, so ensemble
//! runs refuse it (see [`MINIMUM_ORDER`](crate::ensemble::MINIMUM_ORDER)).

use super::{Integrator, VectorField};
use crate::physics::math::{Scalar, Vector};

/// Explicit Euler integrator (forward Euler method)
///
/// # Algorithm
///
/// ```text
/// y(t+dt) = y(t) + f(t, y(t)) * dt
/// ```
///
/// # Mathematical Properties
///
/// - **Order of accuracy**: O(dt) global error
/// - **Derivative evaluations**: 1 per step
/// - **Stability**: Conditionally stable (small stability region)
///
/// # Comparison with Other Methods
///
/// | Property       | Explicit Euler | RK4   | RK 3/8 | Dormand-Prince |
/// |----------------|----------------|-------|--------|----------------|
/// | Order          | 1              | 4     | 4      | 5 (adaptive)   |
/// | Evaluations    | 1              | 4     | 4      | 7 per attempt  |
/// | Use case       | Baseline       | Default | Cross-check | Tight tolerances |
#[derive(Debug, Copy, Clone, Default)]
pub struct ExplicitEuler;

impl Integrator for ExplicitEuler {
    fn clone_box(&self) -> Box<dyn Integrator> {
        Box::new(*self)
    }

    fn step(&self, field: &dyn VectorField, time: Scalar, state: Vector, dt: Scalar) -> Vector {
        state + field.at(time, state) * dt
    }

    fn convergence_order(&self) -> usize {
        1
    }

    fn name(&self) -> &'static str {
        "explicit_euler"
    }

    fn aliases(&self) -> Vec<&'static str> {
        vec!["euler", "forward_euler"]
    }
}
