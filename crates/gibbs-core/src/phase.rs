//! Sublattice description of a phase.
//!
//! A [`Phase`] owns an ordered list of [`Sublattice`]s. Each sublattice has a
//! stoichiometric coefficient (sites per formula unit) and an ordered list of
//! candidate species. Both orders matter: they fix the order in which site
//! fraction variables are numbered.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Name of the vacancy pseudo-species. Vacancies occupy sites but are not atoms.
pub const VACANCY: &str = "VA";

/// Returns true if `species` is the vacancy pseudo-species.
pub fn is_vacancy(species: &str) -> bool {
    species == VACANCY
}

/// One sublattice of a phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sublattice {
    /// Sites per formula unit
    pub stoichiometry: f64,
    /// Candidate species, in index order
    pub species: Vec<String>,
}

impl Sublattice {
    pub fn new<S: Into<String>>(stoichiometry: f64, species: impl IntoIterator<Item = S>) -> Self {
        Self {
            stoichiometry,
            species: species.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, species: &str) -> bool {
        self.species.iter().any(|s| s == species)
    }
}

/// A phase and its sublattice hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phase {
    /// Filled from the database key when loaded from a file
    #[serde(default)]
    pub name: String,
    pub sublattices: Vec<Sublattice>,
}

impl Phase {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sublattices: Vec::new(),
        }
    }

    /// Append a sublattice (builder style).
    pub fn with_sublattice(mut self, sublattice: Sublattice) -> Self {
        self.sublattices.push(sublattice);
        self
    }

    /// Check the structural rules a phase must satisfy before it can be used.
    pub fn validate(&self) -> CoreResult<()> {
        if self.name.is_empty() {
            return Err(CoreError::Validation("phase with an empty name".into()));
        }
        if self.sublattices.is_empty() {
            return Err(CoreError::Validation(format!(
                "phase {} has no sublattices",
                self.name
            )));
        }
        for (idx, sublattice) in self.sublattices.iter().enumerate() {
            if !(sublattice.stoichiometry > 0.0) {
                return Err(CoreError::Validation(format!(
                    "phase {} sublattice {} has non-positive stoichiometry {}",
                    self.name, idx, sublattice.stoichiometry
                )));
            }
            if sublattice.species.is_empty() {
                return Err(CoreError::Validation(format!(
                    "phase {} sublattice {} has no species",
                    self.name, idx
                )));
            }
            for (pos, species) in sublattice.species.iter().enumerate() {
                if sublattice.species[..pos].contains(species) {
                    return Err(CoreError::Validation(format!(
                        "phase {} sublattice {} lists {} twice",
                        self.name, idx, species
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sigma() -> Phase {
        Phase::new("SIGMA")
            .with_sublattice(Sublattice::new(8.0, ["FE", "NI"]))
            .with_sublattice(Sublattice::new(4.0, ["CR"]))
            .with_sublattice(Sublattice::new(18.0, ["CR", "FE", "NI"]))
    }

    #[test]
    fn test_valid_phase() {
        assert!(sigma().validate().is_ok());
    }

    #[test]
    fn test_rejects_empty_sublattice() {
        let phase = Phase::new("BAD").with_sublattice(Sublattice::new(1.0, Vec::<String>::new()));
        let err = phase.validate().unwrap_err();
        assert!(err.to_string().contains("no species"), "got {err}");
    }

    #[test]
    fn test_rejects_zero_stoichiometry() {
        let phase = Phase::new("BAD").with_sublattice(Sublattice::new(0.0, ["CU"]));
        assert!(phase.validate().is_err());
    }

    #[test]
    fn test_rejects_duplicate_species() {
        let phase = Phase::new("BAD").with_sublattice(Sublattice::new(1.0, ["CU", "NI", "CU"]));
        let err = phase.validate().unwrap_err();
        assert!(err.to_string().contains("twice"), "got {err}");
    }

    #[test]
    fn test_vacancy_name() {
        assert!(is_vacancy("VA"));
        assert!(!is_vacancy("V"));
    }
}
