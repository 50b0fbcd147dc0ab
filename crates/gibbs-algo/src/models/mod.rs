//! # Energy Model Builders
//!
//! Each builder turns one phase plus the parameter set into an expression for
//! one contribution to the molar Gibbs energy of that phase:
//!
//! | Builder | Contribution |
//! |---------|--------------|
//! | [`PureCompoundModel`] | reference energy of the end-members |
//! | [`IdealMixingModel`] | configurational entropy, `R T sum a_s y ln y` |
//! | [`RedlichKisterModel`] | excess energy from `L` interaction parameters |
//!
//! All three return energy per mole of atoms. The per-formula-unit expression
//! is divided by the number of atoms per formula unit,
//!
//! ```text
//! N = sum_s a_s sum_{i != VA} y(s, i)
//! ```
//!
//! so that phase fractions weight comparable quantities.
//!
//! Builders only reference site fractions the variable map knows about:
//! end-members and interactions that involve an inadmissible species are
//! skipped.

mod ideal_mixing;
mod pure_compound;
mod redlich_kister;

pub use ideal_mixing::IdealMixingModel;
pub use pure_compound::PureCompoundModel;
pub use redlich_kister::RedlichKisterModel;

use gibbs_core::{is_vacancy, Expr, ParameterSet, Phase, Variable};

use crate::equilibrium::nlp::VariableMap;

/// Molar gas constant in J/(mol K).
pub const GAS_CONSTANT: f64 = 8.3145;

/// Builds one energy contribution for one phase.
pub trait EnergyModel: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    fn build(&self, phase: &Phase, variables: &VariableMap, parameters: &ParameterSet) -> Expr;
}

pub(crate) fn site_fraction(phase: &Phase, sublattice: usize, species: &str) -> Expr {
    Expr::var(Variable::site_fraction(&phase.name, sublattice, species))
}

/// Site fraction factors for every listed constituent, or `None` if any of
/// them is not admissible.
pub(crate) fn constituent_factors(
    phase: &Phase,
    position: usize,
    constituents: &[Vec<String>],
    variables: &VariableMap,
) -> Option<Vec<Expr>> {
    if constituents.len() != phase.sublattices.len() {
        return None;
    }
    let mut factors = Vec::new();
    for (s, species) in constituents.iter().enumerate() {
        for sp in species {
            variables.site_fraction_index(position, s, sp)?;
            factors.push(site_fraction(phase, s, sp));
        }
    }
    Some(factors)
}

/// Atoms per formula unit, `N`. `None` when no admissible species is an atom.
pub(crate) fn atoms_per_formula_unit(
    phase: &Phase,
    position: usize,
    variables: &VariableMap,
) -> Option<Expr> {
    let mut terms = Vec::new();
    for (s, sub) in variables.sublattices(position).iter().enumerate() {
        for slot in sub.slots.iter().filter(|slot| !is_vacancy(&slot.species)) {
            terms.push(Expr::product(vec![
                Expr::constant(sub.stoichiometry),
                site_fraction(phase, s, &slot.species),
            ]));
        }
    }
    if terms.is_empty() {
        None
    } else {
        Some(Expr::sum(terms))
    }
}

/// `sum(terms) / N`, or a literal zero when there are no terms.
pub(crate) fn per_mole_of_atoms(
    terms: Vec<Expr>,
    phase: &Phase,
    position: usize,
    variables: &VariableMap,
) -> Expr {
    if terms.is_empty() {
        return Expr::constant(0.0);
    }
    match atoms_per_formula_unit(phase, position, variables) {
        Some(atoms) => Expr::product(vec![Expr::sum(terms), Expr::pow(atoms, -1.0)]),
        None => Expr::sum(terms),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{binary_conditions, two_phase_database};
    use gibbs_core::{evaluate, EvalConditions};

    fn fixture() -> (gibbs_core::Database, EvalConditions, VariableMap) {
        let db = two_phase_database();
        let conds = binary_conditions();
        let phases: Vec<Phase> = db.phases.values().cloned().collect();
        let map = VariableMap::build(&phases, &conds).unwrap();
        (db, conds, map)
    }

    #[test]
    fn test_atoms_skip_vacancies() {
        let (db, conds, map) = fixture();
        let fcc = db.phase("FCC_A1").unwrap();
        let n = atoms_per_formula_unit(fcc, 0, &map).unwrap();
        let x = [1.0, 0.3, 0.7, 1.0, 1.0, 0.5, 0.5];
        assert!((evaluate(&n, &conds, &map, &x).unwrap() - 1.0).abs() < 1e-15);
    }

    #[test]
    fn test_inadmissible_constituent_yields_none() {
        let (db, _, map) = fixture();
        let fcc = db.phase("FCC_A1").unwrap();
        let constituents = vec![vec!["FE".to_string()], vec!["VA".to_string()]];
        assert!(constituent_factors(fcc, 0, &constituents, &map).is_none());
    }

    #[test]
    fn test_models_are_object_safe() {
        fn _accepts(_m: &dyn EnergyModel) {}
        fn _assert_send_sync<T: Send + Sync>() {}
        _assert_send_sync::<Box<dyn EnergyModel>>();
    }
}
