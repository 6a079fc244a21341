use crate::prelude::Real;

///////////////////////////////////////////////////////////////////////////////
// Default param values (all times in days)
///////////////////////////////////////////////////////////////////////////////

pub const R0: Real = 3.2;
pub const INTERVENTION_TIME: Real = -1.0;
pub const INTERVENTION_R0_REDUCTION: Real = 0.75;
pub const INCUBATION_PERIOD: Real = 2.0;
pub const INFECTIOUS_PERIOD: Real = 5.0;
pub const MILD_RECOVERY_TIME: Real = 12.0;
pub const TIME_TO_HOSPITAL: Real = 5.0;
pub const SEVERE_RECOVERY_TIME: Real = 30.0;
pub const FATAL_TIME: Real = 30.0;
pub const PROB_FATAL: Real = 0.01;
pub const PROB_FATAL_NO_HOSPITAL: Real = 0.05;
pub const PROB_MILD: Real = 0.8;
pub const PROB_SEVERE: Real = 1.0 - PROB_MILD;
pub const POPULATION: i64 = 1_000_000;
pub const DURATION_DAYS: i64 = 300;
pub const HOSPITAL_CAPACITY_FRACTION: Real = 1.0;
pub const OUTPUT_STEP_DAYS: Real = 1.0;

/// Upper bound on the number of output samples of a single run.
pub const MAX_OUTPUT_SAMPLES: usize = 10_000_000;
