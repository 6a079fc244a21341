//! Epidemiological parameters of the SEIR model with hospital capacity.
//!
//! Parameters come in two flavors. [`SEIRConfig`] is the mutable, defaulted
//! set of options read from configuration files. [`SEIRParams`] is the
//! validated and immutable set used by a single simulation run and is obtained
//! from a config with [`SEIRConfig::build`] or `SEIRParams::try_from`.
mod config;
mod constants;
mod seir_params;

pub use config::*;
pub use constants::*;
pub use seir_params::*;
