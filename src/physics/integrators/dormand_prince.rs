//! Dormand-Prince 5(4) embedded Runge-Kutta pair with adaptive step control
//!
//! The fifth-order solution is propagated and the embedded fourth-order
//! solution supplies the local error estimate. Step sizes follow a standard
//! I-controller, clipped so every sample interval ends exactly on its grid
//! point.
//!
//! Reference: J. R. Dormand and P. J. Prince, "A family of embedded
//! Runge-Kutta formulae", J. Comp. Appl. Math. 6 (1980).

use super::{Integrator, StepControl, VectorField};
use crate::error::FailureReason;
use crate::physics::math::{Scalar, Vector};

const C2: Scalar = 1.0 / 5.0;
const C3: Scalar = 3.0 / 10.0;
const C4: Scalar = 4.0 / 5.0;
const C5: Scalar = 8.0 / 9.0;

const A21: Scalar = 1.0 / 5.0;
const A31: Scalar = 3.0 / 40.0;
const A32: Scalar = 9.0 / 40.0;
const A41: Scalar = 44.0 / 45.0;
const A42: Scalar = -56.0 / 15.0;
const A43: Scalar = 32.0 / 9.0;
const A51: Scalar = 19372.0 / 6561.0;
const A52: Scalar = -25360.0 / 2187.0;
const A53: Scalar = 64448.0 / 6561.0;
const A54: Scalar = -212.0 / 729.0;
const A61: Scalar = 9017.0 / 3168.0;
const A62: Scalar = -355.0 / 33.0;
const A63: Scalar = 46732.0 / 5247.0;
const A64: Scalar = 49.0 / 176.0;
const A65: Scalar = -5103.0 / 18656.0;

// Fifth-order weights (also the last row of A, giving first-same-as-last)
const B1: Scalar = 35.0 / 384.0;
const B3: Scalar = 500.0 / 1113.0;
const B4: Scalar = 125.0 / 192.0;
const B5: Scalar = -2187.0 / 6784.0;
const B6: Scalar = 11.0 / 84.0;

// Fifth-order minus fourth-order weights
const E1: Scalar = 71.0 / 57600.0;
const E3: Scalar = -71.0 / 16695.0;
const E4: Scalar = 71.0 / 1920.0;
const E5: Scalar = -17253.0 / 339200.0;
const E6: Scalar = 22.0 / 525.0;
const E7: Scalar = -1.0 / 40.0;

const SAFETY: Scalar = 0.9;
const MIN_FACTOR: Scalar = 0.2;
const MAX_FACTOR: Scalar = 5.0;
const EXPONENT: Scalar = 1.0 / 5.0;

/// Adaptive Dormand-Prince 5(4) integrator
///
/// [`Integrator::step`] takes one uncontrolled fifth-order step, which is what
/// fixed-step benchmarks compare against. [`Integrator::advance`] runs the
/// full error-controlled loop using the tolerances in [`StepControl`].
#[derive(Debug, Copy, Clone, Default)]
pub struct DormandPrince;

impl DormandPrince {
    /// One attempted step: the fifth-order candidate and its error vector
    fn attempt(
        &self,
        field: &dyn VectorField,
        time: Scalar,
        state: Vector,
        k1: Vector,
        h: Scalar,
    ) -> (Vector, Vector) {
        let k2 = field.at(time + C2 * h, state + k1 * (A21 * h));
        let k3 = field.at(time + C3 * h, state + (k1 * A31 + k2 * A32) * h);
        let k4 = field.at(time + C4 * h, state + (k1 * A41 + k2 * A42 + k3 * A43) * h);
        let k5 = field.at(
            time + C5 * h,
            state + (k1 * A51 + k2 * A52 + k3 * A53 + k4 * A54) * h,
        );
        let k6 = field.at(
            time + h,
            state + (k1 * A61 + k2 * A62 + k3 * A63 + k4 * A64 + k5 * A65) * h,
        );

        let candidate = state + (k1 * B1 + k3 * B3 + k4 * B4 + k5 * B5 + k6 * B6) * h;
        let k7 = field.at(time + h, candidate);

        let error = (k1 * E1 + k3 * E3 + k4 * E4 + k5 * E5 + k6 * E6 + k7 * E7) * h;

        (candidate, error)
    }

    /// Root-mean-square of the error scaled by the mixed tolerance
    fn error_norm(
        state: Vector,
        candidate: Vector,
        error: Vector,
        control: &StepControl,
    ) -> Scalar {
        let scale = Vector::splat(control.absolute_tolerance)
            + state.abs().max(candidate.abs()) * control.relative_tolerance;
        let scaled = error / scale;
        (scaled.length_squared() / 3.0).sqrt()
    }
}

impl Integrator for DormandPrince {
    fn clone_box(&self) -> Box<dyn Integrator> {
        Box::new(*self)
    }

    fn step(&self, field: &dyn VectorField, time: Scalar, state: Vector, dt: Scalar) -> Vector {
        let k1 = field.at(time, state);
        self.attempt(field, time, state, k1, dt).0
    }

    fn advance(
        &self,
        field: &dyn VectorField,
        time: Scalar,
        state: Vector,
        interval: Scalar,
        control: &StepControl,
    ) -> Result<Vector, FailureReason> {
        let end = time + interval;
        let mut t = time;
        let mut y = state;
        let mut h = interval;
        let mut attempts: u64 = 0;

        while t < end {
            if attempts >= control.max_steps {
                return Err(FailureReason::MaxStepsExceeded);
            }
            attempts += 1;

            let min_step = Scalar::EPSILON * t.abs().max(1.0);
            let remaining = end - t;
            // Within rounding of the grid point
            if remaining <= min_step {
                break;
            }

            let last = h >= remaining;
            if last {
                h = remaining;
            }

            if h < min_step {
                return Err(FailureReason::StepSizeUnderflow);
            }

            let k1 = field.at(t, y);
            let (candidate, error) = self.attempt(field, t, y, k1, h);

            // An overflowing candidate is rejected like any oversized step
            if !candidate.is_finite() || !error.is_finite() {
                h *= MIN_FACTOR;
                continue;
            }

            let norm = Self::error_norm(y, candidate, error, control);
            let factor = if norm == 0.0 {
                MAX_FACTOR
            } else {
                (SAFETY * norm.powf(-EXPONENT)).clamp(MIN_FACTOR, MAX_FACTOR)
            };

            if norm <= 1.0 {
                y = candidate;
                t = if last { end } else { t + h };
                h *= factor;
            } else {
                h *= factor.min(1.0);
            }
        }

        Ok(y)
    }

    fn convergence_order(&self) -> usize {
        5
    }

    fn is_adaptive(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "dopri5"
    }

    fn aliases(&self) -> Vec<&'static str> {
        vec!["rk45", "dormand_prince"]
    }
}
