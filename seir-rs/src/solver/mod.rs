//! Adaptive explicit integrators for small systems of ODEs.
//!
//! The solver advances an [`OdeSystem`] with an embedded Runge-Kutta pair and
//! records the solution at a fixed set of output times. Output times and the
//! system's discontinuities are used as breakpoints: steps are clamped so the
//! solution lands exactly on them, which avoids interpolation and keeps the
//! error controller from stepping blindly over a jump in the derivative.
mod integrate;
mod options;
mod tableau;

pub use integrate::*;
pub use options::*;
pub use tableau::*;

use crate::prelude::{Real, Time};
use ndarray::{Array2, ArrayView1};

/// Right-hand side of an ODE system `dy/dt = f(t, y)` with N components.
pub trait OdeSystem<const N: usize> {
    /// Evaluate f(t, y).
    fn rhs(&self, t: Time, y: &[Real; N]) -> [Real; N];

    /// Times in the interval [t0, t1) at which f jumps.
    ///
    /// The convention is that f is left-continuous: the value at a
    /// discontinuity belongs to the regime that ends there.
    fn discontinuities(&self, _t0: Time, _t1: Time) -> Vec<Time> {
        vec![]
    }
}

/// Counters describing the work done by the solver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolverStats {
    pub accepted: usize,
    pub rejected: usize,
    pub evaluations: usize,
}

/// Solution sampled at the requested output times.
///
/// `states` has one row per sample and one column per component of the
/// system.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    pub time: Vec<Time>,
    pub states: Array2<Real>,
    pub stats: SolverStats,
}

impl Trajectory {
    /// Number of samples.
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// State at the i-th sample.
    pub fn state(&self, i: usize) -> ArrayView1<'_, Real> {
        self.states.row(i)
    }

    /// Time series of the j-th component.
    pub fn component(&self, j: usize) -> ArrayView1<'_, Real> {
        self.states.column(j)
    }

    /// Sum of components in each sample.
    pub fn totals(&self) -> Vec<Real> {
        self.states.rows().into_iter().map(|row| row.sum()).collect()
    }
}
