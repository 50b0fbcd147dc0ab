//! # Gibbs Energy Minimization Problem
//!
//! [`GibbsProblem`] holds everything the solver callbacks read: the active
//! phases, the condition set, the [`VariableMap`], the master objective and the
//! [`ConstraintCatalogue`]. All of it is built once in [`GibbsProblem::new`]
//! and never mutated; every callback takes `&self` and the solver's current
//! point.
//!
//! ## Problem statement
//!
//! ```text
//! minimize    G(x) = sum_p f_p G_p(y_p)
//!
//! subject to  sum_p f_p = 1                          (P > 1)
//!             sum_i y(p, s, i) = 1                   (balanced sublattices)
//!             sum_p f_p x_k(p) = X_k                 (mass-balance species)
//!             0 <= f_p, y <= 1
//! ```
//!
//! A lone active phase has its fraction pinned to 1, and a sublattice with a
//! single admissible species has that site fraction pinned to 1. Neither gets
//! a balance row.
//!
//! ## Callbacks
//!
//! | Callback | Method |
//! |----------|--------|
//! | problem size | [`GibbsProblem::nlp_info`] |
//! | bounds | [`GibbsProblem::variable_bounds`], [`GibbsProblem::constraint_bounds`] |
//! | starting point | [`GibbsProblem::initial_point`] |
//! | f, grad f | [`GibbsProblem::objective`], [`GibbsProblem::objective_gradient`] |
//! | g | [`GibbsProblem::constraints`] |
//! | Jacobian | [`super::jacobian`] |
//! | Hessian | not provided (`nnz_h_lag = 0`) |
//! | finalization | [`GibbsProblem::finalize`] |

use gibbs_core::{differentiate, evaluate, Database, EvalConditions, Expr, Phase};
use tracing::info;

use super::constraints::{ConstraintCatalogue, ConstraintKind, HierarchyCounts};
use super::objective::ObjectiveAssembler;
use super::variable_map::VariableMap;
use crate::equilibrium::solution::{PhaseMap, PhaseResult};
use crate::error::GibbsError;
use crate::mole_fraction::{mole_fraction, Constitution};

/// Row/column numbering convention of sparse index arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexStyle {
    /// Zero-based
    CStyle,
    /// One-based
    FortranStyle,
}

/// Problem size reported to the solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NlpInfo {
    pub n: usize,
    pub m: usize,
    pub nnz_jac_g: usize,
    pub nnz_h_lag: usize,
    pub index_style: IndexStyle,
}

#[derive(Debug, Clone)]
pub struct GibbsProblem {
    conditions: EvalConditions,
    phases: Vec<Phase>,
    variables: VariableMap,
    objective: Expr,
    catalogue: ConstraintCatalogue,
}

impl GibbsProblem {
    /// Build with the standard reference, ideal mixing and Redlich-Kister models.
    pub fn new(database: &Database, conditions: &EvalConditions) -> Result<Self, GibbsError> {
        Self::with_models(database, conditions, &ObjectiveAssembler::default())
    }

    pub fn with_models(
        database: &Database,
        conditions: &EvalConditions,
        assembler: &ObjectiveAssembler,
    ) -> Result<Self, GibbsError> {
        if conditions.elements.is_empty() {
            return Err(GibbsError::MissingElements);
        }
        let phases: Vec<Phase> = database
            .phases
            .values()
            .filter(|phase| conditions.is_entered(&phase.name))
            .cloned()
            .collect();
        if phases.is_empty() {
            return Err(GibbsError::NoActivePhases);
        }
        conditions
            .validate()
            .map_err(|e| GibbsError::InvalidCondition(e.to_string()))?;
        for phase in &phases {
            phase.validate()?;
        }

        let variables = VariableMap::build(&phases, conditions)?;
        let objective = assembler.assemble(&phases, &variables, &database.parameters);
        let catalogue = ConstraintCatalogue::build(&variables, conditions);

        let counts = HierarchyCounts::from_hierarchy(&variables, conditions);
        assert_eq!(
            catalogue.len(),
            counts.constraint_count(),
            "constraint rows disagree with the hierarchy: {counts:?}"
        );
        assert_eq!(
            catalogue.nnz(),
            counts.jacobian_nonzeros(),
            "Jacobian nonzeros disagree with the hierarchy: {counts:?}"
        );

        info!(
            phases = phases.len(),
            n = variables.len(),
            m = catalogue.len(),
            nnz_jac_g = catalogue.nnz(),
            "built Gibbs energy minimization problem"
        );

        Ok(Self {
            conditions: conditions.clone(),
            phases,
            variables,
            objective,
            catalogue,
        })
    }

    pub fn conditions(&self) -> &EvalConditions {
        &self.conditions
    }

    /// Active phases in variable order.
    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    pub fn variables(&self) -> &VariableMap {
        &self.variables
    }

    pub fn objective_expr(&self) -> &Expr {
        &self.objective
    }

    pub fn catalogue(&self) -> &ConstraintCatalogue {
        &self.catalogue
    }

    pub fn nlp_info(&self) -> NlpInfo {
        NlpInfo {
            n: self.variables.len(),
            m: self.catalogue.len(),
            nnz_jac_g: self.catalogue.nnz(),
            nnz_h_lag: 0,
            index_style: IndexStyle::CStyle,
        }
    }

    fn check_len(&self, x: &[f64]) {
        assert_eq!(
            x.len(),
            self.variables.len(),
            "variable vector has the wrong length"
        );
    }

    /// `[0, 1]` for every fraction; pinned fractions get `[1, 1]`.
    pub fn variable_bounds(&self) -> (Vec<f64>, Vec<f64>) {
        let n = self.variables.len();
        let mut lower = vec![0.0; n];
        let upper = vec![1.0; n];

        if self.variables.phase_count() == 1 {
            lower[self.variables.phase_fraction(0).index] = 1.0;
        }
        for (_, _, sub) in self.variables.sublattice_slots() {
            if sub.is_pinned() {
                lower[sub.slots[0].index] = 1.0;
            }
        }
        (lower, upper)
    }

    pub fn constraint_bounds(&self) -> (Vec<f64>, Vec<f64>) {
        self.catalogue.bounds()
    }

    /// Phase fractions at `1/P`, site fractions at `1/(admissible species)`.
    ///
    /// The last member of each group takes the remainder so every balance
    /// row sums to exactly 1.
    pub fn initial_point(&self) -> Vec<f64> {
        let n = self.variables.len();
        let mut x = vec![0.0; n];
        let mut assigned = 0;

        let phase_indices: Vec<usize> =
            self.variables.phase_fractions().iter().map(|pf| pf.index).collect();
        assigned += fill_uniform(&mut x, &phase_indices);
        for (_, _, sub) in self.variables.sublattice_slots() {
            let slot_indices: Vec<usize> = sub.slots.iter().map(|slot| slot.index).collect();
            assigned += fill_uniform(&mut x, &slot_indices);
        }

        assert_eq!(assigned, n, "starting point does not cover every variable");
        x
    }

    /// Total Gibbs energy at `x`.
    pub fn objective(&self, x: &[f64]) -> Result<f64, GibbsError> {
        self.check_len(x);
        Ok(evaluate(&self.objective, &self.conditions, &self.variables, x)?)
    }

    /// Gradient of the objective, one partial derivative per variable descriptor.
    pub fn objective_gradient(&self, x: &[f64]) -> Result<Vec<f64>, GibbsError> {
        self.check_len(x);
        let mut grad = vec![0.0; x.len()];
        for (index, variable) in self.variables.descriptors().iter().enumerate() {
            grad[index] =
                differentiate(&self.objective, &self.conditions, variable, &self.variables, x)?;
        }
        Ok(grad)
    }

    /// Site fraction snapshots of every active phase.
    pub fn constitutions(&self, x: &[f64]) -> Vec<Constitution> {
        (0..self.variables.phase_count())
            .map(|p| self.variables.constitution(p, x))
            .collect()
    }

    /// Constraint residuals, in catalogue order.
    pub fn constraints(&self, x: &[f64]) -> Vec<f64> {
        self.check_len(x);
        let constitutions = self.constitutions(x);
        let g: Vec<f64> = self
            .catalogue
            .rows()
            .iter()
            .map(|row| match &row.kind {
                ConstraintKind::PhaseFractionBalance | ConstraintKind::SiteFractionBalance { .. } => {
                    row.entries.iter().map(|e| x[e.col]).sum::<f64>() - 1.0
                }
                ConstraintKind::MassBalance { species, target } => {
                    self.variables
                        .phase_fractions()
                        .iter()
                        .map(|pf| x[pf.index] * mole_fraction(species, &constitutions[pf.phase]))
                        .sum::<f64>()
                        - target
                }
            })
            .collect();
        assert_eq!(g.len(), self.catalogue.len());
        g
    }

    /// Largest constraint residual or bound violation at `x`.
    pub fn max_violation(&self, x: &[f64]) -> f64 {
        let (lower, upper) = self.variable_bounds();
        let bounds = x
            .iter()
            .zip(lower.iter().zip(&upper))
            .map(|(xi, (lo, hi))| (lo - xi).max(xi - hi).max(0.0));
        self.constraints(x)
            .into_iter()
            .map(f64::abs)
            .chain(bounds)
            .fold(0.0, f64::max)
    }

    /// Read the phase and site fractions of `x` back out through the variable map.
    pub fn finalize(&self, x: &[f64]) -> PhaseMap {
        self.check_len(x);
        self.variables
            .phase_fractions()
            .iter()
            .map(|pf| {
                (
                    self.variables.phase_names()[pf.phase].clone(),
                    PhaseResult {
                        fraction: x[pf.index],
                        sublattices: self.variables.constitution(pf.phase, x),
                    },
                )
            })
            .collect()
    }
}

/// Spread a unit total over `indices`, summing left to right like the balance rows do.
fn fill_uniform(x: &mut [f64], indices: &[usize]) -> usize {
    let Some((&last, rest)) = indices.split_last() else {
        return 0;
    };
    let share = 1.0 / indices.len() as f64;
    let mut sum = 0.0;
    for &index in rest {
        x[index] = share;
        sum += share;
    }
    x[last] = 1.0 - sum;
    indices.len()
}
