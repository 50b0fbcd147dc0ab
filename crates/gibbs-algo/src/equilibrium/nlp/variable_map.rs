//! # Variable Map
//!
//! Flattens the active-phase hierarchy into the solver's index space.
//!
//! ## Layout
//!
//! Active phases are visited in name order. Each phase contributes its phase
//! fraction, then one site fraction per admissible species of each sublattice:
//!
//! ```text
//! x = [ f_A, y_A(0,i), y_A(0,j), y_A(1,k), ...,  f_B, y_B(0,i), ... ]
//!     |<──────────── phase A ──────────────>|<──── phase B ────>|
//! ```
//!
//! A species is admissible on a sublattice when the sublattice lists it and
//! the condition set names it among the elements. Indices form a contiguous
//! permutation of `[0, n)`; the map is read-only after construction.

use std::collections::HashMap;

use gibbs_core::{EvalConditions, Phase, Variable, VariableLookup};

use crate::error::GibbsError;
use crate::mole_fraction::{Constitution, Occupancy};

/// Phase fraction variable of one active phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseFractionEntry {
    pub index: usize,
    /// Position of the phase in the active-phase list
    pub phase: usize,
}

/// One admissible (sublattice, species) slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteFractionSlot {
    pub index: usize,
    pub species: String,
}

/// Admissible slots of one sublattice.
#[derive(Debug, Clone, PartialEq)]
pub struct SublatticeSlots {
    pub stoichiometry: f64,
    pub slots: Vec<SiteFractionSlot>,
}

impl SublatticeSlots {
    /// Sublattices with at least two admissible species carry a balance row.
    pub fn is_balanced(&self) -> bool {
        self.slots.len() >= 2
    }

    /// Sublattices with one admissible species have it pinned to 1.
    pub fn is_pinned(&self) -> bool {
        self.slots.len() == 1
    }
}

#[derive(Debug, Clone)]
pub struct VariableMap {
    phase_names: Vec<String>,
    phase_fractions: Vec<PhaseFractionEntry>,
    /// `site_fractions[phase][sublattice]`
    site_fractions: Vec<Vec<SublatticeSlots>>,
    descriptors: Vec<Variable>,
    indices: HashMap<Variable, usize>,
}

impl VariableMap {
    /// Number the variables of `phases`, which must be the active phases in
    /// their stable order.
    pub fn build(phases: &[Phase], conditions: &EvalConditions) -> Result<Self, GibbsError> {
        if conditions.elements.is_empty() {
            return Err(GibbsError::MissingElements);
        }
        if phases.is_empty() {
            return Err(GibbsError::NoActivePhases);
        }

        let mut map = VariableMap {
            phase_names: Vec::with_capacity(phases.len()),
            phase_fractions: Vec::with_capacity(phases.len()),
            site_fractions: Vec::with_capacity(phases.len()),
            descriptors: Vec::new(),
            indices: HashMap::new(),
        };

        for (position, phase) in phases.iter().enumerate() {
            let index = map.push(Variable::phase_fraction(&phase.name));
            map.phase_fractions.push(PhaseFractionEntry {
                index,
                phase: position,
            });
            map.phase_names.push(phase.name.clone());

            let mut sublattices = Vec::with_capacity(phase.sublattices.len());
            for (s, sublattice) in phase.sublattices.iter().enumerate() {
                let mut slots = Vec::new();
                for species in &sublattice.species {
                    if !conditions.is_element(species) {
                        continue;
                    }
                    let index = map.push(Variable::site_fraction(&phase.name, s, species));
                    slots.push(SiteFractionSlot {
                        index,
                        species: species.clone(),
                    });
                }
                sublattices.push(SublatticeSlots {
                    stoichiometry: sublattice.stoichiometry,
                    slots,
                });
            }
            map.site_fractions.push(sublattices);
        }

        Ok(map)
    }

    fn push(&mut self, variable: Variable) -> usize {
        let index = self.descriptors.len();
        self.indices.insert(variable.clone(), index);
        self.descriptors.push(variable);
        index
    }

    /// Total number of variables.
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn phase_count(&self) -> usize {
        self.phase_fractions.len()
    }

    pub fn phase_names(&self) -> &[String] {
        &self.phase_names
    }

    pub fn position_of(&self, phase: &str) -> Option<usize> {
        self.phase_names.iter().position(|p| p == phase)
    }

    pub fn phase_fractions(&self) -> &[PhaseFractionEntry] {
        &self.phase_fractions
    }

    pub fn phase_fraction(&self, position: usize) -> &PhaseFractionEntry {
        &self.phase_fractions[position]
    }

    pub fn sublattices(&self, position: usize) -> &[SublatticeSlots] {
        &self.site_fractions[position]
    }

    pub fn site_fraction_index(
        &self,
        position: usize,
        sublattice: usize,
        species: &str,
    ) -> Option<usize> {
        self.site_fractions
            .get(position)?
            .get(sublattice)?
            .slots
            .iter()
            .find(|slot| slot.species == species)
            .map(|slot| slot.index)
    }

    /// Structural description of variable `index`.
    pub fn descriptor(&self, index: usize) -> &Variable {
        &self.descriptors[index]
    }

    /// Descriptors in index order.
    pub fn descriptors(&self) -> &[Variable] {
        &self.descriptors
    }

    /// Every `(phase position, sublattice, slots)` in traversal order.
    pub fn sublattice_slots(&self) -> impl Iterator<Item = (usize, usize, &SublatticeSlots)> + '_ {
        self.site_fractions
            .iter()
            .enumerate()
            .flat_map(|(p, subs)| subs.iter().enumerate().map(move |(s, slots)| (p, s, slots)))
    }

    /// Site fraction snapshot of one phase at `x`.
    pub fn constitution(&self, position: usize, x: &[f64]) -> Constitution {
        self.site_fractions[position]
            .iter()
            .map(|sub| Occupancy {
                stoichiometry: sub.stoichiometry,
                site_fractions: sub
                    .slots
                    .iter()
                    .map(|slot| (slot.species.clone(), x[slot.index]))
                    .collect(),
            })
            .collect()
    }
}

impl VariableLookup for VariableMap {
    fn index_of(&self, variable: &Variable) -> Option<usize> {
        self.indices.get(variable).copied()
    }
}
