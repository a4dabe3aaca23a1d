//! The Lorenz vector field
//!
//! ```text
//! dx/dt = sigma * (y - x)
//! dy/dt = x * (rho - z) - y
//! dz/dt = x * y - beta * z
//! ```
//!
//! Parameters travel alongside the state as plain data, so a single
//! [`LorenzField`] can be shared by every worker integrating the ensemble.

use crate::physics::integrators::VectorField;
use crate::physics::math::{Scalar, Vector};
use serde::{Deserialize, Serialize};

/// Parameters of the Lorenz system.
///
/// No validation is performed. Any real values are accepted, including ones
/// that produce unbounded trajectories.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(default)]
pub struct LorenzParameters {
    pub sigma: Scalar,
    pub beta: Scalar,
    pub rho: Scalar,
}

impl LorenzParameters {
    pub fn new(sigma: Scalar, beta: Scalar, rho: Scalar) -> Self {
        Self { sigma, beta, rho }
    }
}

impl Default for LorenzParameters {
    fn default() -> Self {
        Self {
            sigma: 10.0,
            beta: 8.0 / 3.0,
            rho: 28.0,
        }
    }
}

/// Time derivative of `state` under the Lorenz equations.
#[inline]
pub fn lorenz_derivative(state: Vector, parameters: &LorenzParameters) -> Vector {
    let LorenzParameters { sigma, beta, rho } = *parameters;
    Vector::new(
        sigma * (state.y - state.x),
        state.x * (rho - state.z) - state.y,
        state.x * state.y - beta * state.z,
    )
}

/// [`VectorField`] adapter over [`lorenz_derivative`]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LorenzField {
    pub parameters: LorenzParameters,
}

impl LorenzField {
    pub fn new(parameters: LorenzParameters) -> Self {
        Self { parameters }
    }
}

impl VectorField for LorenzField {
    fn at(&self, _time: Scalar, state: Vector) -> Vector {
        lorenz_derivative(state, &self.parameters)
    }
}
