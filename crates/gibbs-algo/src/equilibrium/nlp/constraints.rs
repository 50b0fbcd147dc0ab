//! # Constraint Catalogue
//!
//! Every equality constraint of the minimization, enumerated once from the
//! variable map and the condition set. Rows come in three groups:
//!
//! ```text
//! row 0            sum_p f_p - 1 = 0                     only when P > 1
//! rows 1 .. S      sum_i y(p, s, i) - 1 = 0              one per balanced sublattice
//! rows .. m        sum_p f_p x_k(p) - X_k = 0            one per mass-balance species
//! ```
//!
//! Each row carries the ordered list of its Jacobian entries. Structure and
//! value passes both walk [`ConstraintCatalogue::entries`], so the order in
//! which `(row, col)` pairs are reported is the order values are produced.
//!
//! ## Closed-form counts
//!
//! With `P` active phases, `S` balanced sublattices holding `B` slots, `K`
//! mass-balance species and `E` slots whose species carries a mass-balance
//! target:
//!
//! ```text
//! m   = [P > 1] + S + K
//! nnz = [P > 1] P + B + K P + E
//! ```
//!
//! [`HierarchyCounts`] computes these from the hierarchy alone; the problem
//! asserts the enumerated catalogue against them.

use gibbs_core::EvalConditions;

use super::variable_map::VariableMap;

/// What a constraint row enforces.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstraintKind {
    /// Phase fractions sum to one
    PhaseFractionBalance,
    /// Site fractions of one sublattice sum to one
    SiteFractionBalance { phase: usize, sublattice: usize },
    /// Overall mole fraction of `species` equals `target`
    MassBalance { species: String, target: f64 },
}

impl ConstraintKind {
    /// Species of a mass-balance row.
    pub fn species(&self) -> Option<&str> {
        match self {
            ConstraintKind::MassBalance { species, .. } => Some(species),
            _ => None,
        }
    }
}

/// How the value of a Jacobian entry is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JacobianTerm {
    /// Derivative of a sum of fractions with respect to one of its terms
    Unit,
    /// d/df_p of a mass-balance row: mole fraction of the row species in phase `phase`
    PhaseMoleFraction { phase: usize },
    /// d/dy of a mass-balance row: `f_p dx/dy` for the row species on `sublattice`
    SiteMoleFraction { phase: usize, sublattice: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JacobianEntry {
    pub row: usize,
    pub col: usize,
    pub term: JacobianTerm,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintRow {
    pub kind: ConstraintKind,
    pub entries: Vec<JacobianEntry>,
}

/// Ordered constraint rows, fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintCatalogue {
    rows: Vec<ConstraintRow>,
}

impl ConstraintCatalogue {
    pub fn build(variables: &VariableMap, conditions: &EvalConditions) -> Self {
        let mut rows: Vec<ConstraintRow> = Vec::new();

        if variables.phase_count() > 1 {
            let row = rows.len();
            rows.push(ConstraintRow {
                kind: ConstraintKind::PhaseFractionBalance,
                entries: variables
                    .phase_fractions()
                    .iter()
                    .map(|pf| JacobianEntry {
                        row,
                        col: pf.index,
                        term: JacobianTerm::Unit,
                    })
                    .collect(),
            });
        }

        for (phase, sublattice, sub) in variables.sublattice_slots() {
            if !sub.is_balanced() {
                continue;
            }
            let row = rows.len();
            rows.push(ConstraintRow {
                kind: ConstraintKind::SiteFractionBalance { phase, sublattice },
                entries: sub
                    .slots
                    .iter()
                    .map(|slot| JacobianEntry {
                        row,
                        col: slot.index,
                        term: JacobianTerm::Unit,
                    })
                    .collect(),
            });
        }

        for (species, target) in &conditions.mole_fractions {
            let row = rows.len();
            let mut entries: Vec<JacobianEntry> = variables
                .phase_fractions()
                .iter()
                .map(|pf| JacobianEntry {
                    row,
                    col: pf.index,
                    term: JacobianTerm::PhaseMoleFraction { phase: pf.phase },
                })
                .collect();
            for (phase, sublattice, sub) in variables.sublattice_slots() {
                for slot in sub.slots.iter().filter(|slot| &slot.species == species) {
                    entries.push(JacobianEntry {
                        row,
                        col: slot.index,
                        term: JacobianTerm::SiteMoleFraction { phase, sublattice },
                    });
                }
            }
            rows.push(ConstraintRow {
                kind: ConstraintKind::MassBalance {
                    species: species.clone(),
                    target: *target,
                },
                entries,
            });
        }

        Self { rows }
    }

    /// Number of constraints, `m`.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[ConstraintRow] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> &ConstraintRow {
        &self.rows[index]
    }

    /// Number of Jacobian nonzeros.
    pub fn nnz(&self) -> usize {
        self.rows.iter().map(|r| r.entries.len()).sum()
    }

    /// Jacobian entries in reporting order.
    pub fn entries(&self) -> impl Iterator<Item = &JacobianEntry> + '_ {
        self.rows.iter().flat_map(|r| r.entries.iter())
    }

    /// Equality bounds, `[0, 0]` for every row.
    pub fn bounds(&self) -> (Vec<f64>, Vec<f64>) {
        (vec![0.0; self.len()], vec![0.0; self.len()])
    }
}

/// Quantities of the hierarchy the constraint counts depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HierarchyCounts {
    /// Active phases, `P`
    pub phases: usize,
    /// Sublattices with two or more admissible species, `S`
    pub balanced_sublattices: usize,
    /// Slots inside balanced sublattices, `B`
    pub balanced_slots: usize,
    /// Slots whose species carries a mass-balance target, `E`
    pub mass_balance_slots: usize,
    /// Mass-balance species, `K`
    pub mass_balance_species: usize,
}

impl HierarchyCounts {
    pub fn from_hierarchy(variables: &VariableMap, conditions: &EvalConditions) -> Self {
        let mut counts = HierarchyCounts {
            phases: variables.phase_count(),
            balanced_sublattices: 0,
            balanced_slots: 0,
            mass_balance_slots: 0,
            mass_balance_species: conditions.constrained_species_count(),
        };
        for (_, _, sub) in variables.sublattice_slots() {
            if sub.is_balanced() {
                counts.balanced_sublattices += 1;
                counts.balanced_slots += sub.slots.len();
            }
            counts.mass_balance_slots += sub
                .slots
                .iter()
                .filter(|slot| conditions.mole_fractions.contains_key(&slot.species))
                .count();
        }
        counts
    }

    fn phase_balance_rows(&self) -> usize {
        usize::from(self.phases > 1)
    }

    /// `m = [P > 1] + S + K`
    pub fn constraint_count(&self) -> usize {
        self.phase_balance_rows() + self.balanced_sublattices + self.mass_balance_species
    }

    /// `nnz = [P > 1] P + B + K P + E`
    pub fn jacobian_nonzeros(&self) -> usize {
        self.phase_balance_rows() * self.phases
            + self.balanced_slots
            + self.mass_balance_species * self.phases
            + self.mass_balance_slots
    }
}
