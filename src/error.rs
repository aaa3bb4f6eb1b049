//! Integration errors.

use thiserror::Error;

/// Errors that can occur during integration
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IntegrationError {
    /// A suggested step size no longer advances time
    #[error("step size {dt} too small at t = {t}")]
    StepSizeTooSmall {
        /// Time at which step size became too small
        t: f64,
        /// Step size that was too small
        dt: f64,
    },
    /// Maximum number of steps exceeded
    #[error("maximum number of integration steps ({max_steps}) exceeded")]
    MaxStepsExceeded {
        /// The configured step budget
        max_steps: u64,
    },
    /// Invalid input parameters
    #[error("invalid input: {message}")]
    InvalidInput {
        /// Description of the invalid input
        message: String,
    },
    /// Non-finite position or velocity produced by the acceleration field
    #[error("non-finite state detected at t = {t}")]
    NonFiniteState {
        /// Start time of the step that produced the non-finite state
        t: f64,
    },
}

impl IntegrationError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }
}
