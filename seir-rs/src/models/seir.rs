use super::{State, STATE_SIZE};
use crate::{
    error::{Error, Result},
    params::SEIRParams,
    prelude::{Real, Time},
    solver::OdeSystem,
};

/// Compartmental SEIR model with a mild/severe split, hospitalization and a
/// fatality rate that worsens once hospitals are above capacity.
///
/// State is [susceptible, exposed, infectious, mild, severe, hospitalized,
/// fatal, recovered], all as fractions of the population.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SEIRModel {
    params: SEIRParams,
}

impl SEIRModel {
    /// Create model from a validated parameter set.
    ///
    /// Parameters already reject p_severe = 0, but the model divides by it so
    /// the check is repeated here.
    pub fn new(params: SEIRParams) -> Result<Self> {
        if !(params.p_severe() > 0.0) {
            return Err(Error::DegenerateModel(
                "p_severe must be positive to split fatal outcomes".into(),
            ));
        }
        Ok(SEIRModel { params })
    }

    pub fn params(&self) -> &SEIRParams {
        &self.params
    }

    /// Initial condition: a single exposed individual, everyone else is
    /// susceptible. Components sum to one.
    pub fn initial_state(&self) -> State {
        let seed = 1.0 / self.params.population() as Real;
        let mut state = [0.0; STATE_SIZE];
        state[0] = 1.0 - seed;
        state[1] = seed;
        state
    }

    /// True while the intervention reduces transmission.
    pub fn intervention_active(&self, t: Time) -> bool {
        let p = &self.params;
        if !p.has_intervention() || t <= p.intervention_time() {
            return false;
        }
        match p.intervention_end() {
            Some(end) => t <= end,
            None => true,
        }
    }

    /// Reproduction number in effect at time t.
    pub fn effective_r0(&self, t: Time) -> Real {
        let r0 = self.params.r0();
        if self.intervention_active(t) {
            r0 * (1.0 - self.params.intervention_r0_reduction())
        } else {
            r0
        }
    }

    /// Probability of a fatal outcome for hospitalized severe cases given the
    /// hospitalized fraction h.
    ///
    /// Below capacity all patients get proper care. Above it, the share of
    /// patients exceeding capacity dies at the no-hospital rate.
    pub fn prob_fatal_severe(&self, h: Real) -> Real {
        let p = &self.params;
        let p_hos = p.p_fatal() / p.p_severe();
        let p_no_hos = p.p_fatal_no_hospital() / p.p_severe();
        if h == 0.0 {
            return p_hos;
        }
        let ratio = p.hospital_capacity() / h;
        (1.0 - ratio).max(0.0) * p_no_hos + ratio.min(1.0) * p_hos
    }

    /// Time derivative of the state.
    pub fn derivative(&self, t: Time, state: &State) -> State {
        let p = &self.params;
        let [s, e, i, m, se, h, _f, _r] = *state;

        let r0 = self.effective_r0(t);
        let p_fs = self.prob_fatal_severe(h);

        // susceptible people becoming exposed
        let ds = -r0 / p.infectious_period() * i * s;

        // in: newly exposed, out: exposed becoming infectious
        let de = -ds - e / p.incubation_period();

        // out: infectious people developing mild or severe symptoms
        let di = e / p.incubation_period() - i / p.infectious_period();

        let dm = p.p_mild() * i / p.infectious_period() - m / p.mild_recovery_time();
        let dse = p.p_severe() * i / p.infectious_period() - se / p.time_to_hospital();

        // out 1: hospitalized dying, out 2: hospitalized recovering
        let dh = se / p.time_to_hospital()
            - p_fs * h / p.fatal_time()
            - (1.0 - p_fs) * h / p.severe_recovery_time();

        let df = p_fs * h / p.fatal_time();
        let dr = m / p.mild_recovery_time() + (1.0 - p_fs) * h / p.severe_recovery_time();

        [ds, de, di, dm, dse, dh, df, dr]
    }
}

impl OdeSystem<STATE_SIZE> for SEIRModel {
    fn rhs(&self, t: Time, y: &State) -> State {
        self.derivative(t, y)
    }

    fn discontinuities(&self, t0: Time, t1: Time) -> Vec<Time> {
        let p = &self.params;
        if !p.has_intervention() {
            return vec![];
        }
        std::iter::once(p.intervention_time())
            .chain(p.intervention_end())
            .filter(|&t| t >= t0 && t < t1)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::SEIRConfig;
    use assert_approx_eq::assert_approx_eq;

    fn model(f: impl FnOnce(&mut SEIRConfig)) -> SEIRModel {
        let mut cfg = SEIRConfig::default();
        f(&mut cfg);
        SEIRModel::new(cfg.build().unwrap()).unwrap()
    }

    #[test]
    fn derivatives_sum_to_zero() {
        let m = model(|cfg| {
            cfg.set_hospital_capacity_fraction(0.01);
        });
        let states = [
            m.initial_state(),
            [0.5, 0.1, 0.1, 0.1, 0.05, 0.05, 0.02, 0.08],
            [0.2, 0.0, 0.05, 0.0, 0.0, 0.3, 0.1, 0.35],
        ];
        for state in &states {
            for &t in &[0.0, 10.0, 250.0] {
                let total: Real = m.derivative(t, state).iter().sum();
                assert_approx_eq!(total, 0.0, 1e-15);
            }
        }
    }

    #[test]
    fn initial_state_has_one_exposed() {
        let m = model(|cfg| {
            cfg.set_population(1000);
        });
        let state = m.initial_state();
        assert_approx_eq!(state[0], 0.999, 1e-15);
        assert_approx_eq!(state[1], 1e-3, 1e-15);
        assert_eq!(state.iter().sum::<Real>(), 1.0);
        assert!(state[2..].iter().all(|&x| x == 0.0));
    }

    #[test]
    fn intervention_changes_r0_after_its_start() {
        let m = model(|cfg| {
            cfg.set_r0(4.0).set_intervention_time(30.0);
        });
        assert_eq!(m.effective_r0(0.0), 4.0);
        assert_eq!(m.effective_r0(30.0), 4.0);
        assert_approx_eq!(m.effective_r0(30.5), 1.0, 1e-12);
        assert_approx_eq!(m.effective_r0(1000.0), 1.0, 1e-12);
        assert_eq!(m.discontinuities(0.0, 300.0), vec![30.0]);
        assert!(m.discontinuities(0.0, 20.0).is_empty());
    }

    #[test]
    fn intervention_can_end() {
        let m = model(|cfg| {
            cfg.set_r0(4.0)
                .set_intervention_time(30.0)
                .set_intervention_duration(Some(20.0));
        });
        assert_approx_eq!(m.effective_r0(50.0), 1.0, 1e-12);
        assert_eq!(m.effective_r0(50.5), 4.0);
        assert_eq!(m.discontinuities(0.0, 300.0), vec![30.0, 50.0]);
    }

    #[test]
    fn no_intervention_when_time_is_negative() {
        let m = model(|cfg| {
            cfg.set_intervention_time(-1.0).set_intervention_duration(Some(5.0));
        });
        assert_eq!(m.effective_r0(100.0), m.params().r0());
        assert!(m.discontinuities(-10.0, 300.0).is_empty());
    }

    #[test]
    fn intervention_at_time_zero_applies_immediately() {
        let m = model(|cfg| {
            cfg.set_intervention_time(0.0);
        });
        assert!(!m.intervention_active(0.0));
        assert!(m.intervention_active(1e-9));
        assert_eq!(m.discontinuities(0.0, 300.0), vec![0.0]);
    }

    #[test]
    fn fatality_split_blends_regimes() {
        let m = model(|cfg| {
            cfg.set_hospital_capacity_fraction(0.01)
                .set_p_severe(0.2)
                .set_p_fatal(0.01)
                .set_p_fatal_no_hospital(0.05);
        });
        // empty or below capacity: hospital rate
        assert_approx_eq!(m.prob_fatal_severe(0.0), 0.05, 1e-12);
        assert_approx_eq!(m.prob_fatal_severe(0.005), 0.05, 1e-12);
        assert_approx_eq!(m.prob_fatal_severe(0.01), 0.05, 1e-12);
        // twice the capacity: half of the patients without care
        assert_approx_eq!(m.prob_fatal_severe(0.02), 0.5 * 0.25 + 0.5 * 0.05, 1e-12);
        // overwhelmed hospitals approach the no-hospital rate
        assert!(m.prob_fatal_severe(10.0) > 0.24);
    }
}
