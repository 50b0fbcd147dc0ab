//! Mole fractions of a species inside one phase, from its site fractions.
//!
//! ```text
//!            sum_s a_s y(s, i)
//! x_i = --------------------------
//!        sum_s a_s sum_{j != VA} y(s, j)
//! ```
//!
//! `a_s` is the stoichiometry of sublattice `s`. Vacancies occupy sites but
//! are not atoms, so they never enter the denominator.

use gibbs_core::is_vacancy;
use serde::{Deserialize, Serialize};

/// Site fractions of one sublattice, in species order, with its stoichiometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Occupancy {
    pub stoichiometry: f64,
    pub site_fractions: Vec<(String, f64)>,
}

impl Occupancy {
    pub fn fraction_of(&self, species: &str) -> Option<f64> {
        self.site_fractions
            .iter()
            .find(|(s, _)| s == species)
            .map(|(_, y)| *y)
    }

    /// Atoms on this sublattice per formula unit.
    fn atoms(&self) -> f64 {
        self.stoichiometry
            * self
                .site_fractions
                .iter()
                .filter(|(s, _)| !is_vacancy(s))
                .map(|(_, y)| y)
                .sum::<f64>()
    }
}

/// Snapshot of every sublattice of one phase.
pub type Constitution = Vec<Occupancy>;

fn numerator(species: &str, constitution: &[Occupancy]) -> f64 {
    constitution
        .iter()
        .map(|occ| occ.stoichiometry * occ.fraction_of(species).unwrap_or(0.0))
        .sum()
}

fn denominator(constitution: &[Occupancy]) -> f64 {
    constitution.iter().map(Occupancy::atoms).sum()
}

/// Mole fraction of `species` in a phase with the given constitution.
/// Returns 0 when the phase holds no atoms.
pub fn mole_fraction(species: &str, constitution: &[Occupancy]) -> f64 {
    let den = denominator(constitution);
    if den == 0.0 {
        return 0.0;
    }
    numerator(species, constitution) / den
}

/// d x_species / d y(sublattice, wrt_species).
pub fn mole_fraction_derivative(
    species: &str,
    wrt_species: &str,
    sublattice: usize,
    constitution: &[Occupancy],
) -> f64 {
    let Some(occ) = constitution.get(sublattice) else {
        return 0.0;
    };
    let den = denominator(constitution);
    if den == 0.0 {
        return 0.0;
    }
    let num = numerator(species, constitution);
    let d_num = if wrt_species == species {
        occ.stoichiometry
    } else {
        0.0
    };
    let d_den = if is_vacancy(wrt_species) {
        0.0
    } else {
        occ.stoichiometry
    };
    (d_num * den - num * d_den) / (den * den)
}
