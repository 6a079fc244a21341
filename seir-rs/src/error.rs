use crate::prelude::Real;
use thiserror::Error;

/// Errors raised by the simulator and by the data loaders.
///
/// The first three variants are the simulator's own failure modes. The others
/// come from the boundary (configuration files, CSV data) and wrap the
/// underlying library errors.
#[derive(Debug, Error)]
pub enum Error {
    /// A configuration value is outside its domain.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// The model equations are undefined for the given parameters.
    #[error("degenerate model: {0}")]
    DegenerateModel(String),

    /// The solver could not advance the solution within tolerance.
    #[error("integration failure at t = {time:.6}: {reason}")]
    IntegrationFailure { time: Real, reason: String },

    #[error("unknown region: {0}")]
    UnknownRegion(String),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] toml::de::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Error::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    pub(crate) fn integration(time: Real, reason: impl Into<String>) -> Self {
        Error::IntegrationFailure {
            time,
            reason: reason.into(),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
