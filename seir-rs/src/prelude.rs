pub use crate::data::{CsvRegionSource, DailyRecord, RegionSeries, RegionSource};
pub use crate::error::{Error, Result};
pub use crate::models::{Compartment, SEIRModel, State, STATE_SIZE};
pub use crate::params::{SEIRConfig, SEIRParams};
pub use crate::sim::{compute, compute_many, OutputSeries, Simulation};
pub use crate::solver::{Method, OdeSystem, SolverOptions, SolverStats, Trajectory};

/// Basic representation of time. This crate measures time in days.
pub type Time = Real;

/// Base Real type used by this crate. Uses an alias to easily change precision
/// if necessary.
pub type Real = f64;
pub(crate) const INF: Real = Real::INFINITY;
