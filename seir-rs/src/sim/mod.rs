mod output;
pub use output::*;

use crate::{
    error::Result,
    models::SEIRModel,
    params::{SEIRConfig, SEIRParams},
    prelude::Time,
    solver::{integrate, SolverOptions, Trajectory},
};
use getset::{Getters, Setters};
use log::*;
use rayon::prelude::*;

/// A single simulation run: a parameter set plus the solver configuration.
///
/// Runs share no state, so any number of them may execute concurrently.
#[derive(Debug, Clone, PartialEq, Getters, Setters)]
#[getset(get = "pub")]
pub struct Simulation {
    params: SEIRParams,
    #[getset(set = "pub")]
    solver: SolverOptions,
}

impl Simulation {
    pub fn new(params: SEIRParams) -> Self {
        Simulation {
            params,
            solver: SolverOptions::default(),
        }
    }

    /// Validate configuration and create a simulation with default solver.
    pub fn from_config(cfg: &SEIRConfig) -> Result<Self> {
        Ok(Self::new(cfg.build()?))
    }

    pub fn with_solver(mut self, solver: SolverOptions) -> Self {
        self.solver = solver;
        self
    }

    /// Output sampling times.
    pub fn times(&self) -> Vec<Time> {
        (0..self.params.nsteps())
            .map(|k| self.params.sample_time(k))
            .collect()
    }

    /// Integrate the model and return normalized compartment fractions.
    pub fn trajectory(&self) -> Result<Trajectory> {
        let model = SEIRModel::new(self.params)?;
        let times = self.times();
        debug!(
            target: "sim",
            "running {} days (R0 = {}, {} samples, {:?})",
            self.params.duration_days(),
            self.params.r0(),
            times.len(),
            self.solver.method
        );
        integrate(&model, model.initial_state(), &times, &self.solver)
    }

    /// Integrate the model and return absolute head counts.
    pub fn compute(&self) -> Result<OutputSeries> {
        let traj = self.trajectory()?;
        info!(
            target: "sim",
            "simulation finished: {} samples, {} steps ({} rejected)",
            traj.len(),
            traj.stats.accepted,
            traj.stats.rejected
        );
        Ok(OutputSeries::from_trajectory(&traj, self.params.population()))
    }
}

/// Run a simulation straight from a configuration with the default solver.
pub fn compute(cfg: &SEIRConfig) -> Result<OutputSeries> {
    Simulation::from_config(cfg)?.compute()
}

/// Run independent simulations in parallel. Results keep the input order.
pub fn compute_many(params: &[SEIRParams], solver: &SolverOptions) -> Vec<Result<OutputSeries>> {
    params
        .par_iter()
        .map(|p| Simulation::new(*p).with_solver(*solver).compute())
        .collect()
}
