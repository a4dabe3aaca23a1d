//! Vector fields, math types, and numerical integrators

pub mod integrators;
pub mod lorenz;
pub mod math;
