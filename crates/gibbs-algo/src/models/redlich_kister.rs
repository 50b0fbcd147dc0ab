use gibbs_core::{Expr, ParameterKind, ParameterSet, Phase};

use super::{constituent_factors, per_mole_of_atoms, site_fraction, EnergyModel};
use crate::equilibrium::nlp::VariableMap;

/// Redlich-Kister excess energy.
///
/// For an `L` parameter of order `k` mixing species A and B on one
/// sublattice:
///
/// ```text
/// G_ex = (prod of every listed y) (y_A - y_B)^k L_k(T)
/// ```
///
/// Interactions among three or more species use only the order-0 product.
#[derive(Debug, Clone, Copy, Default)]
pub struct RedlichKisterModel;

impl EnergyModel for RedlichKisterModel {
    fn name(&self) -> &'static str {
        "excess"
    }

    fn build(&self, phase: &Phase, variables: &VariableMap, parameters: &ParameterSet) -> Expr {
        let Some(position) = variables.position_of(&phase.name) else {
            return Expr::constant(0.0);
        };

        let mut terms = Vec::new();
        for param in parameters.of_kind(&phase.name, ParameterKind::L) {
            let Some((s, mixing)) = param
                .constituents
                .iter()
                .enumerate()
                .find(|(_, species)| species.len() > 1)
            else {
                continue;
            };
            if mixing.len() > 2 && param.order > 0 {
                continue;
            }
            let Some(mut factors) =
                constituent_factors(phase, position, &param.constituents, variables)
            else {
                continue;
            };
            if param.order > 0 {
                let difference = Expr::difference(
                    site_fraction(phase, s, &mixing[0]),
                    site_fraction(phase, s, &mixing[1]),
                );
                factors.push(Expr::pow(difference, f64::from(param.order)));
            }
            factors.push(param.value.to_expr());
            terms.push(Expr::product(factors));
        }

        per_mole_of_atoms(terms, phase, position, variables)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{binary_conditions, two_phase_database};
    use gibbs_core::{evaluate, EvalConditions, Parameter, PiecewiseFunction, Sublattice};

    #[test]
    fn test_subregular_liquid() {
        let db = two_phase_database();
        let conds = binary_conditions();
        let phases: Vec<Phase> = db.phases.values().cloned().collect();
        let map = VariableMap::build(&phases, &conds).unwrap();
        let liquid = db.phase("LIQUID").unwrap();

        let expr = RedlichKisterModel.build(liquid, &map, &db.parameters);
        let x = [0.5, 0.5, 0.5, 1.0, 0.5, 0.6, 0.4];
        let value = evaluate(&expr, &conds, &map, &x).unwrap();

        let t = conds.temperature;
        let l0 = 11760.0 + 1.084 * t;
        let l1 = -1671.8;
        let expected = 0.6 * 0.4 * (l0 + (0.6 - 0.4) * l1);
        assert!((value - expected).abs() < 1e-6, "{value} vs {expected}");
    }

    #[test]
    fn test_ternary_interaction_uses_order_zero_only() {
        let phase = Phase::new("LIQUID").with_sublattice(Sublattice::new(1.0, ["A", "B", "C"]));
        let abc = vec![vec!["A".to_string(), "B".to_string(), "C".to_string()]];
        let db = gibbs_core::Database::new()
            .with_phase(phase.clone())
            .with_parameter(Parameter::new(
                "LIQUID",
                ParameterKind::L,
                abc.clone(),
                0,
                PiecewiseFunction::constant(900.0),
            ))
            .with_parameter(Parameter::new(
                "LIQUID",
                ParameterKind::L,
                abc,
                1,
                PiecewiseFunction::constant(-5e5),
            ));
        let conds = EvalConditions::new(1000.0)
            .with_element("A")
            .with_element("B")
            .with_element("C");
        let map = VariableMap::build(&[phase.clone()], &conds).unwrap();

        let expr = RedlichKisterModel.build(&phase, &map, &db.parameters);
        let x = [1.0, 0.2, 0.3, 0.5];
        let value = evaluate(&expr, &conds, &map, &x).unwrap();
        assert!((value - 0.2 * 0.3 * 0.5 * 900.0).abs() < 1e-9, "got {value}");
    }
}
