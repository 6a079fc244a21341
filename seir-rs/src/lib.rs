//! Deterministic SEIR model with hospital capacity feedback.
//!
//! The simulator tracks eight normalized compartments (see [`Compartment`])
//! and integrates them with an adaptive embedded Runge-Kutta solver. Use
//! [`compute`] for the common case of going straight from a configuration to
//! an [`OutputSeries`], or build a [`Simulation`] to control the solver.
pub mod data;
pub mod error;
pub mod models;
pub mod params;
pub mod prelude;
pub mod sim;
pub mod solver;

pub use crate::error::{Error, Result};
pub use crate::models::{Compartment, SEIRModel, State};
pub use crate::params::{SEIRConfig, SEIRParams};
pub use crate::sim::{compute, compute_many, OutputSeries, Simulation};
pub use crate::solver::{Method, SolverOptions, Trajectory};
