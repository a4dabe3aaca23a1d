//! Lorenz ensemble prelude module
//!
//! Re-exports the types most callers need to run and inspect an ensemble.

pub use crate::config::{LorenzConfig, ViewConfig};
pub use crate::ensemble::{
    EnsembleConfig, Histogram, SolverConfig, TimeGrid, TrajectoryEnsemble, integrate,
    integrate_ensemble, sample_initial_states, solve_ensemble,
};
pub use crate::error::{ConfigurationError, EnsembleError, FailureReason, IntegrationError};
pub use crate::physics::integrators::registry::IntegratorRegistry;
pub use crate::physics::integrators::{Integrator, StepControl, VectorField};
pub use crate::physics::lorenz::{LorenzField, LorenzParameters, lorenz_derivative};
pub use crate::physics::math::{Scalar, Vector};
