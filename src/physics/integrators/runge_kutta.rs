//! Fixed-step fourth-order Runge-Kutta methods

use super::{Integrator, VectorField};
use crate::physics::math::{Scalar, Vector};

/// Fourth-order Runge-Kutta integrator (RK4)
///
/// A classic multi-stage integrator that provides fourth-order accuracy
/// by combining four intermediate evaluations of the derivative.
///
/// The RK4 algorithm:
/// 1. k1 = f(t, y)
/// 2. k2 = f(t + dt/2, y + k1*dt/2)
/// 3. k3 = f(t + dt/2, y + k2*dt/2)
/// 4. k4 = f(t + dt, y + k3*dt)
/// 5. y(t+dt) = y(t) + dt/6 * (k1 + 2*k2 + 2*k3 + k4)
///
/// This is the default ensemble integrator. With the default four substeps
/// per sample at 250 samples per unit time the internal step is 0.001, well
/// inside the stability region for the classic Lorenz parameters.
#[derive(Debug, Copy, Clone, Default)]
pub struct RungeKuttaFourthOrder;

impl Integrator for RungeKuttaFourthOrder {
    fn clone_box(&self) -> Box<dyn Integrator> {
        Box::new(*self)
    }

    fn step(&self, field: &dyn VectorField, time: Scalar, state: Vector, dt: Scalar) -> Vector {
        let half_dt = dt * 0.5;

        let k1 = field.at(time, state);
        let k2 = field.at(time + half_dt, state + k1 * half_dt);
        let k3 = field.at(time + half_dt, state + k2 * half_dt);
        let k4 = field.at(time + dt, state + k3 * dt);

        state + (k1 + k2 * 2.0 + k3 * 2.0 + k4) * (dt / 6.0)
    }

    fn convergence_order(&self) -> usize {
        4
    }

    fn name(&self) -> &'static str {
        "rk4"
    }

    fn aliases(&self) -> Vec<&'static str> {
        vec!["runge_kutta_4", "classical"]
    }
}

/// Kutta's 3/8-rule, a fourth-order sibling of [`RungeKuttaFourthOrder`]
///
/// ```text
/// k1 = f(t, y)
/// k2 = f(t + dt/3,   y + dt * k1/3)
/// k3 = f(t + 2dt/3,  y + dt * (-k1/3 + k2))
/// k4 = f(t + dt,     y + dt * (k1 - k2 + k3))
/// y(t+dt) = y(t) + dt/8 * (k1 + 3*k2 + 3*k3 + k4)
/// ```
///
/// Same order and cost as RK4 with a slightly smaller error constant. Useful
/// as an independent cross-check of RK4 results.
#[derive(Debug, Copy, Clone, Default)]
pub struct RungeKuttaThreeEighths;

impl Integrator for RungeKuttaThreeEighths {
    fn clone_box(&self) -> Box<dyn Integrator> {
        Box::new(*self)
    }

    fn step(&self, field: &dyn VectorField, time: Scalar, state: Vector, dt: Scalar) -> Vector {
        let third = 1.0 / 3.0;

        let k1 = field.at(time, state);
        let k2 = field.at(time + dt * third, state + k1 * (dt * third));
        let k3 = field.at(
            time + dt * 2.0 * third,
            state + (k2 - k1 * third) * dt,
        );
        let k4 = field.at(time + dt, state + (k1 - k2 + k3) * dt);

        state + (k1 + k2 * 3.0 + k3 * 3.0 + k4) * (dt / 8.0)
    }

    fn convergence_order(&self) -> usize {
        4
    }

    fn name(&self) -> &'static str {
        "rk38"
    }

    fn aliases(&self) -> Vec<&'static str> {
        vec!["three_eighths"]
    }
}
