use super::{Tableau, CASH_KARP_45, DORMAND_PRINCE_45};
use crate::{
    error::{Error, Result},
    prelude::{Real, INF},
};
use serde::{Deserialize, Serialize};

/// Embedded Runge-Kutta pair used by the solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    DormandPrince45,
    CashKarp45,
}

impl Method {
    pub fn tableau(self) -> &'static Tableau {
        match self {
            Method::DormandPrince45 => &DORMAND_PRINCE_45,
            Method::CashKarp45 => &CASH_KARP_45,
        }
    }
}

impl Default for Method {
    fn default() -> Self {
        Method::DormandPrince45
    }
}

/// Configuration of the adaptive solver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolverOptions {
    pub method: Method,
    /// Relative tolerance.
    pub rtol: Real,
    /// Absolute tolerance.
    pub atol: Real,
    /// Initial step size. Zero selects it from the integration span.
    pub initial_step: Real,
    /// Steps controlled below this size abort the integration.
    pub min_step: Real,
    pub max_step: Real,
    /// Budget of attempted (accepted + rejected) steps.
    pub max_steps: usize,
    /// Restart integration at each discontinuity of the system.
    pub split_at_discontinuities: bool,
}

impl Default for SolverOptions {
    fn default() -> Self {
        SolverOptions {
            method: Method::default(),
            rtol: 1e-8,
            atol: 1e-12,
            initial_step: 0.0,
            min_step: 1e-10,
            max_step: INF,
            max_steps: 100_000,
            split_at_discontinuities: true,
        }
    }
}

impl SolverOptions {
    pub fn validate(&self) -> Result<()> {
        if !self.rtol.is_finite() || self.rtol <= 0.0 {
            return Err(Error::invalid("rtol", "must be finite and positive"));
        }
        if !self.atol.is_finite() || self.atol <= 0.0 {
            return Err(Error::invalid("atol", "must be finite and positive"));
        }
        if !self.initial_step.is_finite() || self.initial_step < 0.0 {
            return Err(Error::invalid("initial_step", "must be finite and non-negative"));
        }
        if !(self.min_step > 0.0) || self.min_step > self.max_step {
            return Err(Error::invalid("min_step", "must be positive and below max_step"));
        }
        if self.max_steps == 0 {
            return Err(Error::invalid("max_steps", "must be positive"));
        }
        Ok(())
    }

    /// First trial step for an integration spanning `span`.
    pub(crate) fn first_step(&self, span: Real) -> Real {
        let h = if self.initial_step > 0.0 {
            self.initial_step
        } else {
            span * 1e-3
        };
        h.min(span).min(self.max_step).max(self.min_step)
    }
}
