//! Numerical integration methods for first-order ODE systems

use crate::error::FailureReason;
use crate::physics::math::{Scalar, Vector};

pub mod dormand_prince;
pub mod explicit_euler;
pub mod registry;
pub mod runge_kutta;

pub use dormand_prince::DormandPrince;
pub use explicit_euler::ExplicitEuler;
pub use runge_kutta::{RungeKuttaFourthOrder, RungeKuttaThreeEighths};

/// Right-hand side of an autonomous or non-autonomous system `dy/dt = f(t, y)`
///
/// Implementations must be free of interior mutability so that one field can
/// be evaluated from many worker threads at once.
pub trait VectorField: Sync {
    /// Evaluate the derivative at an arbitrary time and state
    fn at(&self, time: Scalar, state: Vector) -> Vector;
}

/// Step-size settings handed to [`Integrator::advance`]
///
/// Fixed-step methods read `substeps`; adaptive methods read the tolerances
/// and `max_steps`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepControl {
    /// Equal substeps taken across one sample interval
    pub substeps: u32,
    pub absolute_tolerance: Scalar,
    pub relative_tolerance: Scalar,
    /// Upper bound on attempted steps across one sample interval
    pub max_steps: u64,
}

impl Default for StepControl {
    fn default() -> Self {
        Self {
            substeps: 4,
            absolute_tolerance: 1e-9,
            relative_tolerance: 1e-9,
            max_steps: 100_000,
        }
    }
}

/// Base trait for all integrators
pub trait Integrator: Send + Sync {
    fn clone_box(&self) -> Box<dyn Integrator>;

    /// Take a single explicit step of size `dt` from `(time, state)`
    fn step(&self, field: &dyn VectorField, time: Scalar, state: Vector, dt: Scalar) -> Vector;

    /// Carry `state` from `time` to `time + interval`
    ///
    /// The default implementation splits the interval into
    /// `control.substeps` equal steps and stops at the first non-finite
    /// state. Adaptive methods override this with their own step control, but
    /// must land exactly on `time + interval`.
    fn advance(
        &self,
        field: &dyn VectorField,
        time: Scalar,
        state: Vector,
        interval: Scalar,
        control: &StepControl,
    ) -> Result<Vector, FailureReason> {
        let substeps = control.substeps.max(1);
        let dt = interval / substeps as Scalar;
        let mut state = state;

        for i in 0..substeps {
            state = self.step(field, time + dt * i as Scalar, state, dt);
            if !state.is_finite() {
                return Err(FailureReason::NonFinite);
            }
        }

        Ok(state)
    }

    /// Order of the global truncation error
    fn convergence_order(&self) -> usize;

    /// Whether the method chooses its own internal step sizes
    fn is_adaptive(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str;

    fn aliases(&self) -> Vec<&'static str> {
        Vec::new()
    }
}
