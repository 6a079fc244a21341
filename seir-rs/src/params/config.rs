use super::{constants as cte, SEIRParams};
use crate::{error::Result, prelude::Real};
use getset::{CopyGetters, Setters};
use serde::{Deserialize, Deserializer, Serialize};

/// User facing set of options for a simulation run.
///
/// Every option has a default, so an empty TOML document is a valid
/// configuration. Unknown keys are rejected during deserialization.
///
/// The probability of severe illness is stored once: `p_mild` is just the
/// complement of `p_severe`, and setting either one updates the same value.
#[derive(CopyGetters, Setters, Debug, PartialEq, Copy, Clone, Serialize)]
#[getset(get_copy = "pub", set = "pub")]
pub struct SEIRConfig {
    /// Basic reproduction number.
    r0: Real,

    /// Time of public intervention. Negative values disable it.
    intervention_time: Real,

    /// Fraction of R0 removed while the intervention is active.
    intervention_r0_reduction: Real,

    /// How long the intervention lasts. `None` means it never ends.
    #[serde(skip_serializing_if = "Option::is_none")]
    intervention_duration: Option<Real>,

    incubation_period: Real,
    infectious_period: Real,
    mild_recovery_time: Real,
    time_to_hospital: Real,
    severe_recovery_time: Real,
    fatal_time: Real,

    /// Probability of a fatal outcome with hospital access.
    p_fatal: Real,

    /// Probability of a fatal outcome without hospital access.
    p_fatal_no_hospital: Real,

    /// Probability of severe symptoms given infection.
    p_severe: Real,

    population: i64,
    duration_days: i64,

    /// Hospital capacity as a fraction of the population.
    hospital_capacity_fraction: Real,

    /// Interval between output samples.
    output_step_days: Real,
}

impl SEIRConfig {
    /// Probability of mild (or no) symptoms given infection.
    pub fn p_mild(&self) -> Real {
        1.0 - self.p_severe
    }

    /// Set the probability of mild symptoms, which updates p_severe.
    pub fn set_p_mild(&mut self, value: Real) -> &mut Self {
        self.p_severe = 1.0 - value;
        self
    }

    /// Parse configuration from a TOML document.
    pub fn from_toml_str(data: &str) -> Result<Self> {
        Ok(toml::from_str(data)?)
    }

    /// Validate options and return the immutable parameter set.
    pub fn build(&self) -> Result<SEIRParams> {
        SEIRParams::new(self)
    }
}

impl Default for SEIRConfig {
    fn default() -> Self {
        _SEIRConfig::default().into()
    }
}

/// Raw representation used for deserialization. It keeps both views of the
/// severity probability so the precedence rule can be applied once.
#[derive(Debug, PartialEq, Copy, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct _SEIRConfig {
    r0: Real,
    intervention_time: Real,
    intervention_r0_reduction: Real,
    intervention_duration: Option<Real>,
    incubation_period: Real,
    infectious_period: Real,
    mild_recovery_time: Real,
    time_to_hospital: Real,
    severe_recovery_time: Real,
    fatal_time: Real,
    p_fatal: Real,
    p_fatal_no_hospital: Real,
    p_mild: Option<Real>,
    p_severe: Option<Real>,
    population: i64,
    duration_days: i64,
    hospital_capacity_fraction: Real,
    output_step_days: Real,
}

impl Default for _SEIRConfig {
    fn default() -> Self {
        _SEIRConfig {
            r0: cte::R0,
            intervention_time: cte::INTERVENTION_TIME,
            intervention_r0_reduction: cte::INTERVENTION_R0_REDUCTION,
            intervention_duration: None,
            incubation_period: cte::INCUBATION_PERIOD,
            infectious_period: cte::INFECTIOUS_PERIOD,
            mild_recovery_time: cte::MILD_RECOVERY_TIME,
            time_to_hospital: cte::TIME_TO_HOSPITAL,
            severe_recovery_time: cte::SEVERE_RECOVERY_TIME,
            fatal_time: cte::FATAL_TIME,
            p_fatal: cte::PROB_FATAL,
            p_fatal_no_hospital: cte::PROB_FATAL_NO_HOSPITAL,
            p_mild: None,
            p_severe: None,
            population: cte::POPULATION,
            duration_days: cte::DURATION_DAYS,
            hospital_capacity_fraction: cte::HOSPITAL_CAPACITY_FRACTION,
            output_step_days: cte::OUTPUT_STEP_DAYS,
        }
    }
}

impl From<_SEIRConfig> for SEIRConfig {
    fn from(c: _SEIRConfig) -> SEIRConfig {
        // p_severe takes precedence over p_mild when both are given
        let p_severe = match (c.p_severe, c.p_mild) {
            (Some(p), _) => p,
            (None, Some(p)) => 1.0 - p,
            (None, None) => cte::PROB_SEVERE,
        };
        SEIRConfig {
            r0: c.r0,
            intervention_time: c.intervention_time,
            intervention_r0_reduction: c.intervention_r0_reduction,
            intervention_duration: c.intervention_duration,
            incubation_period: c.incubation_period,
            infectious_period: c.infectious_period,
            mild_recovery_time: c.mild_recovery_time,
            time_to_hospital: c.time_to_hospital,
            severe_recovery_time: c.severe_recovery_time,
            fatal_time: c.fatal_time,
            p_fatal: c.p_fatal,
            p_fatal_no_hospital: c.p_fatal_no_hospital,
            p_severe,
            population: c.population,
            duration_days: c.duration_days,
            hospital_capacity_fraction: c.hospital_capacity_fraction,
            output_step_days: c.output_step_days,
        }
    }
}

impl<'de> Deserialize<'de> for SEIRConfig {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        _SEIRConfig::deserialize(deserializer).map(SEIRConfig::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn roundtrip() {
        let mut cfg = SEIRConfig::default();
        cfg.set_r0(2.5).set_intervention_time(40.0);
        let data = toml::to_string(&cfg).unwrap();
        let cfg_: SEIRConfig = toml::from_str(&data).unwrap();
        assert_eq!(cfg, cfg_);
    }

    #[test]
    fn empty_document_uses_defaults() {
        let cfg = SEIRConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, SEIRConfig::default());
        assert_eq!(cfg.population(), 1_000_000);
        assert_eq!(cfg.duration_days(), 300);
        assert_approx_eq!(cfg.p_severe(), 0.2, 1e-12);
        assert!(cfg.intervention_duration().is_none());
    }

    #[test]
    fn p_mild_and_p_severe_are_one_value() {
        let mut cfg = SEIRConfig::default();
        cfg.set_p_mild(0.7);
        assert_approx_eq!(cfg.p_severe(), 0.3, 1e-12);
        cfg.set_p_severe(0.1);
        assert_approx_eq!(cfg.p_mild(), 0.9, 1e-12);
    }

    #[test]
    fn p_severe_wins_over_p_mild() {
        let cfg = SEIRConfig::from_toml_str("p_mild = 0.5\np_severe = 0.1").unwrap();
        assert_approx_eq!(cfg.p_severe(), 0.1, 1e-12);

        let cfg = SEIRConfig::from_toml_str("p_mild = 0.6").unwrap();
        assert_approx_eq!(cfg.p_severe(), 0.4, 1e-12);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let res = SEIRConfig::from_toml_str("r0 = 2.0\nhospital_beds = 10");
        assert!(matches!(res, Err(Error::Config(_))));
    }
}
