//! Lorenz ensemble library
//!
//! Integrates an ensemble of randomly sampled initial conditions through the
//! Lorenz system and returns the shared time grid together with every
//! member's trajectory. Rendering and interactive front ends consume this
//! output; none of that lives here.

pub mod config;
pub mod ensemble;
pub mod error;
pub mod physics;
pub mod prelude;

// Re-export commonly used items
pub use config::LorenzConfig;
pub use ensemble::{
    EnsembleConfig, SolverConfig, TimeGrid, TrajectoryEnsemble, integrate, integrate_ensemble,
};
pub use error::{ConfigurationError, EnsembleError, FailureReason, IntegrationError};
pub use physics::{
    integrators,
    lorenz::{LorenzField, LorenzParameters, lorenz_derivative},
    math::{Scalar, Vector},
};
