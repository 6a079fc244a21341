use super::{constants::MAX_OUTPUT_SAMPLES, SEIRConfig};
use crate::{
    error::{Error, Result},
    prelude::{Real, Time},
};
use getset::CopyGetters;
use std::{convert::TryFrom, fmt};

/// Validated and immutable parameters of a single simulation run.
///
/// All time constants are 1/e characteristic times measured in days.
#[derive(CopyGetters, Debug, PartialEq, Copy, Clone)]
#[getset(get_copy = "pub")]
pub struct SEIRParams {
    r0: Real,
    intervention_time: Time,
    intervention_r0_reduction: Real,
    intervention_duration: Option<Time>,
    incubation_period: Real,
    infectious_period: Real,
    mild_recovery_time: Real,
    time_to_hospital: Real,
    severe_recovery_time: Real,
    fatal_time: Real,
    p_fatal: Real,
    p_fatal_no_hospital: Real,
    p_severe: Real,
    population: u64,
    duration_days: u32,
    hospital_capacity_fraction: Real,
    output_step_days: Time,
}

impl SEIRParams {
    /// Validate a configuration.
    ///
    /// Out of domain values raise [`Error::InvalidParameter`]. A null
    /// probability of severe symptoms makes the fatality split undefined and
    /// raises [`Error::DegenerateModel`].
    pub fn new(cfg: &SEIRConfig) -> Result<Self> {
        let population = match cfg.population() {
            n if n > 0 => n as u64,
            n => return Err(Error::invalid("population", format!("must be positive, got {}", n))),
        };
        let duration_days = match cfg.duration_days() {
            n if n > 0 && n <= u32::MAX as i64 => n as u32,
            n => {
                return Err(Error::invalid(
                    "duration_days",
                    format!("must be a positive number of days, got {}", n),
                ))
            }
        };

        let intervention_time = finite("intervention_time", cfg.intervention_time())?;
        let intervention_duration = match cfg.intervention_duration() {
            Some(value) => Some(positive("intervention_duration", value)?),
            None => None,
        };

        let params = SEIRParams {
            r0: positive("r0", cfg.r0())?,
            intervention_time,
            intervention_r0_reduction: probability(
                "intervention_r0_reduction",
                cfg.intervention_r0_reduction(),
            )?,
            intervention_duration,
            incubation_period: positive("incubation_period", cfg.incubation_period())?,
            infectious_period: positive("infectious_period", cfg.infectious_period())?,
            mild_recovery_time: positive("mild_recovery_time", cfg.mild_recovery_time())?,
            time_to_hospital: positive("time_to_hospital", cfg.time_to_hospital())?,
            severe_recovery_time: positive("severe_recovery_time", cfg.severe_recovery_time())?,
            fatal_time: positive("fatal_time", cfg.fatal_time())?,
            p_fatal: probability("p_fatal", cfg.p_fatal())?,
            p_fatal_no_hospital: probability("p_fatal_no_hospital", cfg.p_fatal_no_hospital())?,
            p_severe: probability("p_severe", cfg.p_severe())?,
            population,
            duration_days,
            hospital_capacity_fraction: capacity(cfg.hospital_capacity_fraction())?,
            output_step_days: positive("output_step_days", cfg.output_step_days())?,
        };

        if params.p_severe == 0.0 {
            return Err(Error::DegenerateModel(
                "p_severe = 0 leaves the probability of fatal given severe undefined".into(),
            ));
        }
        for &(name, value) in &[
            ("p_fatal", params.p_fatal),
            ("p_fatal_no_hospital", params.p_fatal_no_hospital),
        ] {
            if value > params.p_severe {
                return Err(Error::invalid(
                    name,
                    format!("{} exceeds p_severe = {}", value, params.p_severe),
                ));
            }
        }
        match sample_count(params.duration(), params.output_step_days) {
            Some(n) if n <= MAX_OUTPUT_SAMPLES => Ok(params),
            _ => Err(Error::invalid(
                "output_step_days",
                format!(
                    "{} days sampled every {} days exceeds {} samples",
                    params.duration_days, params.output_step_days, MAX_OUTPUT_SAMPLES
                ),
            )),
        }
    }

    /// Probability of mild (or no) symptoms given infection.
    pub fn p_mild(&self) -> Real {
        1.0 - self.p_severe
    }

    /// Hospital capacity in normalized population units. Since the state is
    /// normalized to one, this coincides with the capacity fraction.
    pub fn hospital_capacity(&self) -> Real {
        self.hospital_capacity_fraction
    }

    /// True if an intervention is scheduled.
    pub fn has_intervention(&self) -> bool {
        self.intervention_time >= 0.0
    }

    /// Time at which the intervention stops, if it ever does.
    pub fn intervention_end(&self) -> Option<Time> {
        if !self.has_intervention() {
            return None;
        }
        self.intervention_duration
            .map(|duration| self.intervention_time + duration)
    }

    /// Simulation horizon as a time value.
    pub fn duration(&self) -> Time {
        self.duration_days as Time
    }

    /// Number of output samples: t = 0, dt, 2 dt, ... up to the horizon.
    ///
    /// Bounded by [`MAX_OUTPUT_SAMPLES`], which construction enforces.
    pub fn nsteps(&self) -> usize {
        sample_count(self.duration(), self.output_step_days)
            .map_or(MAX_OUTPUT_SAMPLES, |n| n.min(MAX_OUTPUT_SAMPLES))
    }

    /// Time of the k-th output sample.
    pub fn sample_time(&self, k: usize) -> Time {
        (k as Time * self.output_step_days).min(self.duration())
    }
}

impl TryFrom<SEIRConfig> for SEIRParams {
    type Error = Error;

    fn try_from(cfg: SEIRConfig) -> Result<Self> {
        SEIRParams::new(&cfg)
    }
}

impl TryFrom<&SEIRConfig> for SEIRParams {
    type Error = Error;

    fn try_from(cfg: &SEIRConfig) -> Result<Self> {
        SEIRParams::new(cfg)
    }
}

impl fmt::Display for SEIRParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "S(usceptible), E(xposed), I(nfectious), R(emoved) Model")?;
        writeln!(f, "{:>41}: {:.2}", "R0", self.r0)?;
        if self.has_intervention() {
            writeln!(f, "{:>41}: {:.1} Days", "Intervention Time", self.intervention_time)?;
            writeln!(
                f,
                "{:>41}: {:.2}%",
                "R0 Reduction at Intervention",
                100.0 * self.intervention_r0_reduction
            )?;
            if let Some(duration) = self.intervention_duration {
                writeln!(f, "{:>41}: {:.1} Days", "Intervention Duration", duration)?;
            }
        }
        writeln!(f, "{:>41}: {}", "Population", self.population)?;
        writeln!(f, "{:>41}: {:.2} Days", "Incubation Period", self.incubation_period)?;
        writeln!(f, "{:>41}: {:.2} Days", "Infectious Period", self.infectious_period)?;
        writeln!(f, "{:>41}: {:.2} Days", "Mild recovery", self.mild_recovery_time)?;
        writeln!(f, "{:>41}: {:.2} Days", "Time to hospital", self.time_to_hospital)?;
        writeln!(f, "{:>41}: {:.2} Days", "Severe recovery", self.severe_recovery_time)?;
        writeln!(f, "{:>41}: {:.2} Days", "Time to fatal", self.fatal_time)?;
        writeln!(f, "{:>41}: {:.2}", "Probability of severe", self.p_severe)?;
        writeln!(f, "{:>41}: {:.2}", "Probability of fatal", self.p_fatal)?;
        writeln!(
            f,
            "{:>41}: {:.2}",
            "Probability of non-hospitalized fatal", self.p_fatal_no_hospital
        )?;
        writeln!(
            f,
            "{:>41}: {:.2}% of population",
            "Hospital capacity",
            100.0 * self.hospital_capacity_fraction
        )?;
        write!(f, "{:>41}: {} Days", "Simulation Duration", self.duration_days)
    }
}

/// Samples in [0, duration] taken every `step`, or None if the count does
/// not fit in a usize.
fn sample_count(duration: Time, step: Time) -> Option<usize> {
    let ratio = duration / step;
    // tolerate round-off when the horizon is a multiple of the step
    let intervals = (ratio + 1e-9 * ratio.max(1.0)).floor();
    if !intervals.is_finite() || intervals >= usize::MAX as Real {
        return None;
    }
    (intervals as usize).checked_add(1)
}

fn finite(name: &'static str, value: Real) -> Result<Real> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(Error::invalid(name, format!("must be finite, got {}", value)))
    }
}

fn positive(name: &'static str, value: Real) -> Result<Real> {
    if finite(name, value)? > 0.0 {
        Ok(value)
    } else {
        Err(Error::invalid(name, format!("must be positive, got {}", value)))
    }
}

fn probability(name: &'static str, value: Real) -> Result<Real> {
    if (0.0..=1.0).contains(&finite(name, value)?) {
        Ok(value)
    } else {
        Err(Error::invalid(name, format!("must lie in [0, 1], got {}", value)))
    }
}

fn capacity(value: Real) -> Result<Real> {
    let name = "hospital_capacity_fraction";
    if finite(name, value)? > 0.0 && value <= 1.0 {
        Ok(value)
    } else {
        Err(Error::invalid(name, format!("must lie in (0, 1], got {}", value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invalid_name(cfg: &SEIRConfig) -> &'static str {
        match SEIRParams::new(cfg) {
            Err(Error::InvalidParameter { name, .. }) => name,
            other => panic!("expected InvalidParameter, got {:?}", other),
        }
    }

    #[test]
    fn defaults_are_valid() {
        let params = SEIRConfig::default().build().unwrap();
        assert_eq!(params.population(), 1_000_000);
        assert_eq!(params.duration_days(), 300);
        assert_eq!(params.nsteps(), 301);
        assert!(!params.has_intervention());
        assert!(params.intervention_end().is_none());
    }

    #[test]
    fn rejects_non_positive_population() {
        let mut cfg = SEIRConfig::default();
        cfg.set_population(0);
        assert_eq!(invalid_name(&cfg), "population");
        cfg.set_population(-10);
        assert_eq!(invalid_name(&cfg), "population");
    }

    #[test]
    fn rejects_out_of_domain_values() {
        let mut cfg = SEIRConfig::default();
        cfg.set_duration_days(0);
        assert_eq!(invalid_name(&cfg), "duration_days");

        let mut cfg = SEIRConfig::default();
        cfg.set_p_fatal(1.5);
        assert_eq!(invalid_name(&cfg), "p_fatal");

        let mut cfg = SEIRConfig::default();
        cfg.set_incubation_period(-2.0);
        assert_eq!(invalid_name(&cfg), "incubation_period");

        let mut cfg = SEIRConfig::default();
        cfg.set_hospital_capacity_fraction(0.0);
        assert_eq!(invalid_name(&cfg), "hospital_capacity_fraction");

        let mut cfg = SEIRConfig::default();
        cfg.set_r0(Real::NAN);
        assert_eq!(invalid_name(&cfg), "r0");

        let mut cfg = SEIRConfig::default();
        cfg.set_intervention_time(10.0).set_intervention_duration(Some(0.0));
        assert_eq!(invalid_name(&cfg), "intervention_duration");
    }

    #[test]
    fn fatality_cannot_exceed_severity() {
        let mut cfg = SEIRConfig::default();
        cfg.set_p_severe(0.04);
        assert_eq!(invalid_name(&cfg), "p_fatal_no_hospital");
    }

    #[test]
    fn zero_severity_is_degenerate() {
        let mut cfg = SEIRConfig::default();
        cfg.set_p_mild(1.0);
        assert!(matches!(SEIRParams::new(&cfg), Err(Error::DegenerateModel(_))));
    }

    #[test]
    fn output_samples() {
        let mut cfg = SEIRConfig::default();
        cfg.set_duration_days(10).set_output_step_days(0.1);
        let params = cfg.build().unwrap();
        assert_eq!(params.nsteps(), 101);
        assert_eq!(params.sample_time(100), 10.0);

        cfg.set_output_step_days(3.0);
        let params = cfg.build().unwrap();
        assert_eq!(params.nsteps(), 4);
        assert_eq!(params.sample_time(3), 9.0);
    }

    #[test]
    fn rejects_too_many_samples() {
        let mut cfg = SEIRConfig::default();
        cfg.set_output_step_days(1e-300);
        assert_eq!(invalid_name(&cfg), "output_step_days");

        cfg.set_output_step_days(1e-9);
        assert_eq!(invalid_name(&cfg), "output_step_days");

        let mut cfg = SEIRConfig::default();
        cfg.set_duration_days(u32::MAX as i64);
        assert_eq!(invalid_name(&cfg), "output_step_days");

        let mut cfg = SEIRConfig::default();
        cfg.set_duration_days(10).set_output_step_days(1e-5);
        assert_eq!(cfg.build().unwrap().nsteps(), 1_000_001);
    }

    #[test]
    fn intervention_window() {
        let mut cfg = SEIRConfig::default();
        cfg.set_intervention_time(20.0)
            .set_intervention_duration(Some(30.0));
        let params = cfg.build().unwrap();
        assert!(params.has_intervention());
        assert_eq!(params.intervention_end(), Some(50.0));
    }

    #[test]
    fn display_mentions_intervention_only_when_set() {
        let params = SEIRConfig::default().build().unwrap();
        assert!(!format!("{}", params).contains("Intervention"));

        let mut cfg = SEIRConfig::default();
        cfg.set_intervention_time(30.0);
        let text = format!("{}", cfg.build().unwrap());
        assert!(text.contains("Intervention Time"));
        assert!(text.contains("75.00%"));
    }
}
