//! Error types for molding-doe
//!
//! Validation errors surface before any design is generated or any stored
//! run is touched, so a failed call never leaves an experiment half-regenerated.

use thiserror::Error;

use crate::experiment::{ExperimentId, RunId};

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// molding-doe error types
#[derive(Error, Debug)]
pub enum Error {
    /// A factor's stored configuration cannot be turned into a factor spec
    #[error("Invalid factor configuration for '{factor}': {reason}")]
    InvalidFactorConfig {
        /// Factor code
        factor: String,
        /// What is wrong with it
        reason: String,
    },

    /// The experiment id does not resolve
    #[error("Experiment {0} not found")]
    ExperimentNotFound(ExperimentId),

    /// The run id does not resolve
    #[error("Run {0} not found")]
    RunNotFound(RunId),

    /// The factor set cannot produce the requested design
    #[error("Invalid design: {0}")]
    InvalidDesign(String),

    /// Experiment parameters are out of range
    #[error("Invalid experiment configuration: {0}")]
    InvalidConfig(String),

    /// JSON (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a new `InvalidFactorConfig` error.
    #[must_use]
    pub fn invalid_factor(factor: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidFactorConfig {
            factor: factor.into(),
            reason: reason.into(),
        }
    }
}
