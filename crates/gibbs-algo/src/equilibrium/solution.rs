//! Final assignment and solution records.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::mole_fraction::{mole_fraction, Occupancy};

/// How the backend terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolutionStatus {
    /// Converged to the requested tolerance
    Optimal,
    /// Converged to the backend's relaxed tolerance
    Acceptable,
    /// The mass-balance targets cannot be met by the entered phases
    Infeasible,
    IterationLimit,
    NumericalError,
    Unknown,
}

impl SolutionStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, SolutionStatus::Optimal | SolutionStatus::Acceptable)
    }
}

impl fmt::Display for SolutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SolutionStatus::Optimal => "optimal",
            SolutionStatus::Acceptable => "acceptable",
            SolutionStatus::Infeasible => "infeasible",
            SolutionStatus::IterationLimit => "iteration limit",
            SolutionStatus::NumericalError => "numerical error",
            SolutionStatus::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// One phase of the final assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseResult {
    pub fraction: f64,
    /// `(stoichiometry, species -> site fraction)` per sublattice
    pub sublattices: Vec<Occupancy>,
}

impl PhaseResult {
    pub fn site_fraction(&self, sublattice: usize, species: &str) -> Option<f64> {
        self.sublattices.get(sublattice)?.fraction_of(species)
    }

    pub fn mole_fraction(&self, species: &str) -> f64 {
        mole_fraction(species, &self.sublattices)
    }

    /// Mole fractions of every atomic species present in the phase.
    pub fn mole_fractions(&self) -> BTreeMap<String, f64> {
        let mut out = BTreeMap::new();
        for occ in &self.sublattices {
            for (species, _) in &occ.site_fractions {
                if gibbs_core::is_vacancy(species) || out.contains_key(species) {
                    continue;
                }
                out.insert(species.clone(), self.mole_fraction(species));
            }
        }
        out
    }
}

/// Final assignment keyed by phase name.
pub type PhaseMap = BTreeMap<String, PhaseResult>;

/// Result of one equilibrium calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GibbsSolution {
    pub status: SolutionStatus,
    /// Total Gibbs energy in J per mole of atoms
    pub objective: f64,
    pub iterations: usize,
    pub solve_time_ms: u128,
    /// Largest constraint residual or bound violation at the returned point
    pub constraint_violation: f64,
    pub phases: PhaseMap,
}

impl GibbsSolution {
    pub fn converged(&self) -> bool {
        self.status.is_success()
    }

    pub fn phase(&self, name: &str) -> Option<&PhaseResult> {
        self.phases.get(name)
    }

    /// `sum_p f_p x_species(p)`
    pub fn overall_mole_fraction(&self, species: &str) -> f64 {
        self.phases
            .values()
            .map(|p| p.fraction * p.mole_fraction(species))
            .sum()
    }
}
