use gibbs_core::{Expr, ParameterSet, Phase};

use super::{per_mole_of_atoms, site_fraction, EnergyModel, GAS_CONSTANT};
use crate::equilibrium::nlp::VariableMap;

/// Ideal configurational mixing, `R T sum_s a_s sum_i y ln y`.
///
/// Only sublattices with at least two admissible species mix; a pinned
/// sublattice has `y ln y = 0`.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdealMixingModel;

impl EnergyModel for IdealMixingModel {
    fn name(&self) -> &'static str {
        "ideal mixing"
    }

    fn build(&self, phase: &Phase, variables: &VariableMap, _parameters: &ParameterSet) -> Expr {
        let Some(position) = variables.position_of(&phase.name) else {
            return Expr::constant(0.0);
        };

        let mut entropy = Vec::new();
        for (s, sub) in variables.sublattices(position).iter().enumerate() {
            if !sub.is_balanced() {
                continue;
            }
            for slot in &sub.slots {
                let y = site_fraction(phase, s, &slot.species);
                entropy.push(Expr::product(vec![
                    Expr::constant(sub.stoichiometry),
                    y.clone(),
                    Expr::ln(y),
                ]));
            }
        }
        if entropy.is_empty() {
            return Expr::constant(0.0);
        }

        let mixing = Expr::product(vec![
            Expr::constant(GAS_CONSTANT),
            Expr::temperature(),
            Expr::sum(entropy),
        ]);
        per_mole_of_atoms(vec![mixing], phase, position, variables)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{binary_conditions, two_phase_database};
    use gibbs_core::evaluate;

    #[test]
    fn test_equimolar_mixing_entropy() {
        let db = two_phase_database();
        let conds = binary_conditions();
        let phases: Vec<Phase> = db.phases.values().cloned().collect();
        let map = VariableMap::build(&phases, &conds).unwrap();
        let fcc = db.phase("FCC_A1").unwrap();

        let expr = IdealMixingModel.build(fcc, &map, &db.parameters);
        let x = [0.5, 0.5, 0.5, 1.0, 0.5, 0.5, 0.5];
        let value = evaluate(&expr, &conds, &map, &x).unwrap();
        let expected = GAS_CONSTANT * conds.temperature * 0.5_f64.ln();
        assert!((value - expected).abs() < 1e-9, "{value} vs {expected}");
    }

    #[test]
    fn test_pinned_sublattice_has_no_entropy_term() {
        let db = two_phase_database();
        let conds = binary_conditions();
        let phases: Vec<Phase> = db.phases.values().cloned().collect();
        let map = VariableMap::build(&phases, &conds).unwrap();
        let fcc = db.phase("FCC_A1").unwrap();

        let expr = IdealMixingModel.build(fcc, &map, &db.parameters);
        let mut vars = Vec::new();
        expr.for_each_variable(&mut |v| vars.push(v.to_string()));
        assert!(!vars.iter().any(|v| v == "FCC_A1_1_VA"));
    }
}
