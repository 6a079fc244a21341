use super::{OdeSystem, SolverOptions, SolverStats, Tableau, Trajectory};
use crate::{
    error::{Error, Result},
    prelude::{Real, Time, INF},
};
use log::*;
use ndarray::Array2;

const SAFETY: Real = 0.9;
const MIN_FACTOR: Real = 0.2;
const MAX_FACTOR: Real = 5.0;

/// Integrate `sys` from `y0` and sample the solution at `times`.
///
/// The first output time is the initial time and its sample is `y0` itself.
/// Output times must be finite and strictly increasing. Any failure to meet
/// the tolerances within the step budget is reported as
/// [`Error::IntegrationFailure`] and no partial trajectory is returned.
pub fn integrate<S, const N: usize>(
    sys: &S,
    y0: [Real; N],
    times: &[Time],
    opts: &SolverOptions,
) -> Result<Trajectory>
where
    S: OdeSystem<N>,
{
    opts.validate()?;
    check_times(times)?;
    if y0.iter().any(|x| !x.is_finite()) {
        return Err(Error::invalid("initial state", "must be finite"));
    }

    let t0 = times[0];
    let t1 = times[times.len() - 1];
    let mut jumps = if opts.split_at_discontinuities {
        sys.discontinuities(t0, t1)
    } else {
        vec![]
    };
    let mut from_jump = jumps.contains(&t0);
    jumps.retain(|&t| t > t0 && t < t1);
    jumps.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    jumps.dedup();

    let mut stepper = Stepper::new(sys, opts, t1 - t0);
    let mut states = Array2::zeros((times.len(), N));
    let mut t = t0;
    let mut y = y0;
    let mut jumps = jumps.into_iter().peekable();
    write_row(&mut states, 0, &y);

    for (k, &t_out) in times.iter().enumerate().skip(1) {
        while let Some(&jump) = jumps.peek() {
            if jump > t_out {
                break;
            }
            jumps.next();
            stepper.advance(&mut t, &mut y, jump, from_jump)?;
            debug!(target: "solver", "crossing discontinuity at t={}", jump);
            from_jump = true;
        }
        if t < t_out {
            stepper.advance(&mut t, &mut y, t_out, from_jump)?;
            from_jump = false;
        }
        write_row(&mut states, k, &y);
    }

    debug!(
        target: "solver",
        "integrated [{}, {}]: {} accepted, {} rejected, {} evaluations",
        t0, t1, stepper.stats.accepted, stepper.stats.rejected, stepper.stats.evaluations
    );
    Ok(Trajectory {
        time: times.to_vec(),
        states,
        stats: stepper.stats,
    })
}

fn check_times(times: &[Time]) -> Result<()> {
    if times.is_empty() {
        return Err(Error::invalid("output times", "at least one time is required"));
    }
    if times.iter().any(|t| !t.is_finite()) {
        return Err(Error::invalid("output times", "must be finite"));
    }
    if times.windows(2).any(|w| w[1] <= w[0]) {
        return Err(Error::invalid("output times", "must be strictly increasing"));
    }
    Ok(())
}

fn write_row<const N: usize>(states: &mut Array2<Real>, i: usize, y: &[Real; N]) {
    for (dst, src) in states.row_mut(i).iter_mut().zip(y.iter()) {
        *dst = *src;
    }
}

/// Smallest time strictly to the right of t, up to a couple of ulps.
fn right_of(t: Time) -> Time {
    t + Real::EPSILON * t.abs().max(1.0)
}

/// Adaptive stepping state shared between integration intervals.
struct Stepper<'a, S> {
    sys: &'a S,
    tableau: &'static Tableau,
    opts: &'a SolverOptions,
    stats: SolverStats,
    h: Real,
}

impl<'a, S> Stepper<'a, S> {
    fn new(sys: &'a S, opts: &'a SolverOptions, span: Real) -> Self {
        Stepper {
            sys,
            tableau: opts.method.tableau(),
            opts,
            stats: SolverStats::default(),
            h: opts.first_step(span),
        }
    }

    /// Advance (t, y) until t == end.
    ///
    /// When `from_jump` is set, t is a discontinuity of the system and stage
    /// evaluations at t use the regime that starts there.
    fn advance<const N: usize>(
        &mut self,
        t: &mut Time,
        y: &mut [Real; N],
        end: Time,
        from_jump: bool,
    ) -> Result<()>
    where
        S: OdeSystem<N>,
    {
        let start = *t;
        while *t < end {
            if self.stats.accepted + self.stats.rejected >= self.opts.max_steps {
                return Err(Error::integration(
                    *t,
                    format!("step budget of {} steps exhausted", self.opts.max_steps),
                ));
            }

            let remaining = end - *t;
            let clamped = self.h >= remaining;
            let h = if clamped { remaining } else { self.h };
            let (y_new, err) = self.attempt(*t, y, h, start, from_jump);
            let factor = if err == 0.0 {
                MAX_FACTOR
            } else {
                let exponent = -1.0 / (self.tableau.error_order + 1) as Real;
                (SAFETY * err.powf(exponent)).max(MIN_FACTOR).min(MAX_FACTOR)
            };

            if err <= 1.0 {
                *t = if clamped { end } else { *t + h };
                *y = y_new;
                self.stats.accepted += 1;
                // a step shortened to hit a breakpoint says little about the
                // step the controller would have chosen
                self.h = if clamped { (h * factor).max(self.h) } else { h * factor };
            } else {
                self.stats.rejected += 1;
                trace!(target: "solver", "rejected step at t={} (h={:.3e}, err={:.3e})", *t, h, err);
                self.h = h * factor.min(1.0);
            }
            self.h = self.h.min(self.opts.max_step);

            if self.h < self.opts.min_step {
                return Err(Error::integration(
                    *t,
                    format!(
                        "step size {:.3e} fell below the minimum of {:.3e}",
                        self.h, self.opts.min_step
                    ),
                ));
            }
        }
        Ok(())
    }

    /// Try a single step of size h and return the candidate solution with its
    /// scaled RMS error norm. Non-finite candidates have infinite error.
    fn attempt<const N: usize>(
        &mut self,
        t: Time,
        y: &[Real; N],
        h: Real,
        start: Time,
        from_jump: bool,
    ) -> ([Real; N], Real)
    where
        S: OdeSystem<N>,
    {
        let tab = self.tableau;
        let mut k = vec![[0.0; N]; tab.stages()];

        for (i, (&ci, ai)) in tab.c.iter().zip(tab.a.iter()).enumerate() {
            let mut yi = *y;
            for (j, &aij) in ai.iter().enumerate() {
                if aij != 0.0 {
                    for n in 0..N {
                        yi[n] += h * aij * k[j][n];
                    }
                }
            }
            let mut ti = t + ci * h;
            if from_jump && ti <= start {
                ti = right_of(start);
            }
            k[i] = self.sys.rhs(ti, &yi);
            self.stats.evaluations += 1;
        }

        let mut y_new = *y;
        let mut err_norm = 0.0;
        for n in 0..N {
            let mut incr = 0.0;
            let mut err = 0.0;
            for i in 0..tab.stages() {
                incr += tab.b[i] * k[i][n];
                err += tab.e[i] * k[i][n];
            }
            y_new[n] = y[n] + h * incr;
            let scale = self.opts.atol + self.opts.rtol * y[n].abs().max(y_new[n].abs());
            err_norm += (h * err / scale).powi(2);
        }
        let err_norm = (err_norm / N as Real).sqrt();

        if err_norm.is_finite() && y_new.iter().all(|x| x.is_finite()) {
            (y_new, err_norm)
        } else {
            (y_new, INF)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::Method;
    use assert_approx_eq::assert_approx_eq;

    struct Decay;

    impl OdeSystem<1> for Decay {
        fn rhs(&self, _t: Time, y: &[Real; 1]) -> [Real; 1] {
            [-y[0]]
        }
    }

    struct Oscillator;

    impl OdeSystem<2> for Oscillator {
        fn rhs(&self, _t: Time, y: &[Real; 2]) -> [Real; 2] {
            [y[1], -y[0]]
        }
    }

    /// Unit flow that stops at t = 1.
    struct Switch;

    impl OdeSystem<1> for Switch {
        fn rhs(&self, t: Time, _y: &[Real; 1]) -> [Real; 1] {
            if t > 1.0 {
                [0.0]
            } else {
                [1.0]
            }
        }

        fn discontinuities(&self, _t0: Time, _t1: Time) -> Vec<Time> {
            vec![1.0]
        }
    }

    struct Blowup;

    impl OdeSystem<1> for Blowup {
        fn rhs(&self, _t: Time, y: &[Real; 1]) -> [Real; 1] {
            [y[0] * y[0]]
        }
    }

    fn grid(n: usize, dt: Real) -> Vec<Time> {
        (0..n).map(|k| k as Real * dt).collect()
    }

    #[test]
    fn exponential_decay() {
        let times = grid(11, 0.5);
        for &method in &[Method::DormandPrince45, Method::CashKarp45] {
            let opts = SolverOptions {
                method,
                ..Default::default()
            };
            let sol = integrate(&Decay, [1.0], &times, &opts).unwrap();
            assert_eq!(sol.len(), 11);
            for (i, &t) in sol.time.iter().enumerate() {
                assert_approx_eq!(sol.states[[i, 0]], (-t).exp(), 1e-7);
            }
        }
    }

    #[test]
    fn oscillator_keeps_phase() {
        let times = grid(21, std::f64::consts::PI / 2.0);
        let sol = integrate(&Oscillator, [1.0, 0.0], &times, &SolverOptions::default()).unwrap();
        let last = sol.state(20);
        assert_approx_eq!(last[0], 1.0, 1e-6);
        assert_approx_eq!(last[1], 0.0, 1e-6);
    }

    #[test]
    fn lands_on_discontinuity() {
        let times = grid(5, 0.75);
        let sol = integrate(&Switch, [0.0], &times, &SolverOptions::default()).unwrap();
        assert_approx_eq!(sol.states[[1, 0]], 0.75, 1e-12);
        for i in 2..5 {
            assert_approx_eq!(sol.states[[i, 0]], 1.0, 1e-12);
        }
    }

    #[test]
    fn adaptive_control_handles_unsplit_discontinuity() {
        let opts = SolverOptions {
            split_at_discontinuities: false,
            ..Default::default()
        };
        let sol = integrate(&Switch, [0.0], &grid(3, 1.5), &opts).unwrap();
        assert_approx_eq!(sol.states[[2, 0]], 1.0, 1e-6);
    }

    #[test]
    fn exhausted_budget_is_an_error() {
        let opts = SolverOptions {
            max_steps: 3,
            ..Default::default()
        };
        let res = integrate(&Decay, [1.0], &grid(101, 1.0), &opts);
        assert!(matches!(res, Err(Error::IntegrationFailure { .. })));
    }

    #[test]
    fn finite_time_blowup_is_an_error() {
        // y' = y^2 with y(0) = 1 diverges at t = 1
        let res = integrate(&Blowup, [1.0], &[0.0, 2.0], &SolverOptions::default());
        assert!(matches!(res, Err(Error::IntegrationFailure { .. })));
    }

    #[test]
    fn rejects_unordered_times() {
        let res = integrate(&Decay, [1.0], &[0.0, 2.0, 1.0], &SolverOptions::default());
        assert!(matches!(res, Err(Error::InvalidParameter { .. })));
    }

    #[test]
    fn single_time_returns_initial_state() {
        let sol = integrate(&Decay, [0.5], &[3.0], &SolverOptions::default()).unwrap();
        assert_eq!(sol.len(), 1);
        assert_eq!(sol.states[[0, 0]], 0.5);
        assert_eq!(sol.stats.accepted, 0);
    }
}
