use crate::{
    models::{Compartment, STATE_SIZE},
    prelude::{Real, Time},
    solver::Trajectory,
};
use log::*;
use paste::paste;
use serde::Serialize;

/// Negative fractions above this magnitude are reported as solver defects.
const NEGATIVE_TOLERANCE: Real = 1e-9;

/// Simulated epidemic curves in absolute head counts.
///
/// Serializes as a mapping with a `time` key plus one key per compartment,
/// all sequences aligned index by index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputSeries {
    time: Vec<Time>,
    susceptible: Vec<Real>,
    exposed: Vec<Real>,
    infectious: Vec<Real>,
    mild: Vec<Real>,
    severe: Vec<Real>,
    hospitalized: Vec<Real>,
    fatal: Vec<Real>,
    recovered: Vec<Real>,
}

macro_rules! series_accessors {
    ($($name:ident),* $(,)?) => {
        paste! {
            $(
                pub fn $name(&self) -> &[Real] {
                    &self.$name
                }

                pub fn [<final_ $name>](&self) -> Real {
                    self.$name.last().copied().unwrap_or(0.0)
                }
            )*
        }
    };
}

impl OutputSeries {
    series_accessors!(
        susceptible,
        exposed,
        infectious,
        mild,
        severe,
        hospitalized,
        fatal,
        recovered,
    );

    /// Rescale a normalized trajectory to absolute counts.
    ///
    /// Negative fractions are clamped to zero; anything below the round-off
    /// tolerance is logged as a warning.
    pub fn from_trajectory(traj: &Trajectory, population: u64) -> Self {
        let scale = population as Real;
        let mut columns: Vec<Vec<Real>> = Vec::with_capacity(STATE_SIZE);
        for c in Compartment::ALL.iter() {
            let col = traj.component(c.index());
            let values = col
                .iter()
                .zip(traj.time.iter())
                .map(|(&x, &t)| {
                    if x < -NEGATIVE_TOLERANCE {
                        warn!(target: "output", "negative {} fraction {:.3e} at t={}", c, x, t);
                    }
                    x.max(0.0) * scale
                })
                .collect();
            columns.push(values);
        }
        let mut columns = columns.into_iter();
        let mut next = || columns.next().unwrap_or_default();

        OutputSeries {
            time: traj.time.clone(),
            susceptible: next(),
            exposed: next(),
            infectious: next(),
            mild: next(),
            severe: next(),
            hospitalized: next(),
            fatal: next(),
            recovered: next(),
        }
    }

    pub fn time(&self) -> &[Time] {
        &self.time
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Curve for the given compartment.
    pub fn series(&self, c: Compartment) -> &[Real] {
        match c {
            Compartment::Susceptible => &self.susceptible,
            Compartment::Exposed => &self.exposed,
            Compartment::Infectious => &self.infectious,
            Compartment::Mild => &self.mild,
            Compartment::Severe => &self.severe,
            Compartment::Hospitalized => &self.hospitalized,
            Compartment::Fatal => &self.fatal,
            Compartment::Recovered => &self.recovered,
        }
    }

    /// Curve rounded to whole head counts.
    pub fn counts(&self, c: Compartment) -> Vec<u64> {
        self.series(c).iter().map(|x| x.round() as u64).collect()
    }

    /// Last value of the given curve.
    pub fn final_value(&self, c: Compartment) -> Real {
        self.series(c).last().copied().unwrap_or(0.0)
    }

    /// Time and value of the maximum of the given curve.
    pub fn peak(&self, c: Compartment) -> Option<(Time, Real)> {
        self.time
            .iter()
            .zip(self.series(c))
            .fold(None, |acc: Option<(Time, Real)>, (&t, &x)| match acc {
                Some((_, best)) if best >= x => acc,
                _ => Some((t, x)),
            })
    }

    /// Total head count at the i-th sample.
    pub fn total(&self, i: usize) -> Real {
        Compartment::ALL.iter().map(|&c| self.series(c)[i]).sum()
    }

    /// Render curves as CSV data with a header row.
    pub fn render_csv(&self, sep: char) -> String {
        let mut data = String::from("time");
        for c in Compartment::ALL.iter() {
            data.push(sep);
            data.push_str(c.name());
        }
        for i in 0..self.len() {
            data.push('\n');
            data.push_str(&format!("{}", self.time[i]));
            for &c in Compartment::ALL.iter() {
                data.push_str(&format!("{}{}", sep, self.series(c)[i]));
            }
        }
        data
    }
}
