//! Error types returned by the ensemble integrator
//!
//! Two families are kept apart: [`ConfigurationError`] is raised before any
//! solver work begins and is always fixable by correcting the input, while
//! [`IntegrationError`] names the ensemble member whose solve failed. Neither
//! is retried, since the same inputs reproduce the same failure.

use crate::physics::math::{Scalar, Vector};
use std::fmt;

/// Invalid input to an integration run
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    /// `max_time` was zero, negative, NaN or infinite
    NonPositiveMaxTime(Scalar),
    /// `samples_per_unit_time` was zero
    ZeroSamplesPerUnitTime,
    /// The horizon is too short to hold a single sample at this density
    EmptyTimeGrid {
        max_time: Scalar,
        samples_per_unit_time: u32,
    },
    /// The grid would exceed [`MAX_TIME_GRID_LEN`](crate::ensemble::MAX_TIME_GRID_LEN) points
    TimeGridTooLarge {
        max_time: Scalar,
        samples_per_unit_time: u32,
    },
    /// No integrator is registered under the requested name
    UnknownIntegrator(String),
    /// The integrator is too low-order for a chaotic system
    InsufficientOrder { name: String, order: usize },
    /// Adaptive tolerances must be finite, non-negative, and not both zero
    InvalidTolerance { absolute: Scalar, relative: Scalar },
    /// Fixed-step integrators need at least one substep per sample interval
    ZeroSubsteps,
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigurationError::NonPositiveMaxTime(max_time) => {
                write!(f, "max_time must be positive and finite, got {max_time}")
            }
            ConfigurationError::ZeroSamplesPerUnitTime => {
                write!(f, "samples_per_unit_time must be positive")
            }
            ConfigurationError::EmptyTimeGrid {
                max_time,
                samples_per_unit_time,
            } => write!(
                f,
                "time grid would be empty: round({samples_per_unit_time} * {max_time}) is 0"
            ),
            ConfigurationError::TimeGridTooLarge {
                max_time,
                samples_per_unit_time,
            } => write!(
                f,
                "time grid too large: round({samples_per_unit_time} * {max_time}) exceeds {} points",
                crate::ensemble::MAX_TIME_GRID_LEN
            ),
            ConfigurationError::UnknownIntegrator(msg) => write!(f, "{msg}"),
            ConfigurationError::InsufficientOrder { name, order } => write!(
                f,
                "integrator '{name}' has order {order}; at least 4 is required"
            ),
            ConfigurationError::InvalidTolerance { absolute, relative } => write!(
                f,
                "invalid tolerances: absolute {absolute}, relative {relative}"
            ),
            ConfigurationError::ZeroSubsteps => {
                write!(f, "substeps_per_sample must be at least 1")
            }
        }
    }
}

impl std::error::Error for ConfigurationError {}

/// Why a single member's solve stopped
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FailureReason {
    /// The state left the finite floating-point range
    NonFinite,
    /// The adaptive controller shrank the step below representable precision
    StepSizeUnderflow,
    /// The adaptive controller exhausted its step budget within one sample interval
    MaxStepsExceeded,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::NonFinite => write!(f, "state became non-finite"),
            FailureReason::StepSizeUnderflow => write!(f, "step size underflow"),
            FailureReason::MaxStepsExceeded => write!(f, "maximum step count exceeded"),
        }
    }
}

/// Numerical failure for one ensemble member
#[derive(Debug, Clone, PartialEq)]
pub struct IntegrationError {
    /// Index of the failing member in the initial state set
    pub member: usize,
    /// The member's sampled initial state
    pub initial_state: Vector,
    /// Start of the sample interval in which the failure was detected
    pub time: Scalar,
    pub reason: FailureReason,
}

impl fmt::Display for IntegrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "integration of member {} (initial state [{}, {}, {}]) failed near t = {}: {}",
            self.member,
            self.initial_state.x,
            self.initial_state.y,
            self.initial_state.z,
            self.time,
            self.reason
        )
    }
}

impl std::error::Error for IntegrationError {}

/// Any failure of [`integrate`](crate::ensemble::integrate)
#[derive(Debug, Clone, PartialEq)]
pub enum EnsembleError {
    Configuration(ConfigurationError),
    Integration(IntegrationError),
}

impl fmt::Display for EnsembleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnsembleError::Configuration(err) => write!(f, "Configuration error: {err}"),
            EnsembleError::Integration(err) => write!(f, "Integration error: {err}"),
        }
    }
}

impl std::error::Error for EnsembleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EnsembleError::Configuration(err) => Some(err),
            EnsembleError::Integration(err) => Some(err),
        }
    }
}

impl From<ConfigurationError> for EnsembleError {
    fn from(err: ConfigurationError) -> Self {
        EnsembleError::Configuration(err)
    }
}

impl From<IntegrationError> for EnsembleError {
    fn from(err: IntegrationError) -> Self {
        EnsembleError::Integration(err)
    }
}
