use serde::{Deserialize, Serialize};
use std::{convert::TryFrom, fmt};

mod seir;
pub use seir::*;

/// Number of compartments in the model.
pub const STATE_SIZE: usize = 8;

/// Normalized population fractions, indexed by [`Compartment::index`].
pub type State = [crate::prelude::Real; STATE_SIZE];

/// Enumeration of the disease-progression buckets tracked by the model.
///
/// The declaration order is the order of components in a [`State`].
#[derive(Debug, Clone, Copy, Eq, PartialEq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compartment {
    Susceptible,
    Exposed,
    Infectious,
    Mild,
    Severe,
    Hospitalized,
    Fatal,
    Recovered,
}

impl Compartment {
    pub const CSV_HEADER: &'static str =
        "susceptible,exposed,infectious,mild,severe,hospitalized,fatal,recovered";
    pub const ALL: [Compartment; STATE_SIZE] = [
        Compartment::Susceptible,
        Compartment::Exposed,
        Compartment::Infectious,
        Compartment::Mild,
        Compartment::Severe,
        Compartment::Hospitalized,
        Compartment::Fatal,
        Compartment::Recovered,
    ];

    /// Position of compartment in the state vector.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Name used as key in the output series.
    pub fn name(self) -> &'static str {
        match self {
            Compartment::Susceptible => "susceptible",
            Compartment::Exposed => "exposed",
            Compartment::Infectious => "infectious",
            Compartment::Mild => "mild",
            Compartment::Severe => "severe",
            Compartment::Hospitalized => "hospitalized",
            Compartment::Fatal => "fatal",
            Compartment::Recovered => "recovered",
        }
    }

    /// Absorbing compartments only accumulate population.
    pub fn is_absorbing(self) -> bool {
        matches!(self, Compartment::Fatal | Compartment::Recovered)
    }
}

impl fmt::Display for Compartment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<usize> for Compartment {
    type Error = &'static str;

    fn try_from(n: usize) -> Result<Self, Self::Error> {
        Compartment::ALL
            .get(n)
            .copied()
            .ok_or("integer outside bounds")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_matches_declaration_order() {
        for (i, c) in Compartment::ALL.iter().enumerate() {
            assert_eq!(c.index(), i);
            assert_eq!(Compartment::try_from(i), Ok(*c));
        }
        assert!(Compartment::try_from(STATE_SIZE).is_err());
    }

    #[test]
    fn csv_header_lists_names() {
        let names: Vec<_> = Compartment::ALL.iter().map(|c| c.name()).collect();
        assert_eq!(names.join(","), Compartment::CSV_HEADER);
    }
}
