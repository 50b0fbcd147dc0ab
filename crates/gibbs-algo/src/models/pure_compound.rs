use gibbs_core::{Expr, ParameterKind, ParameterSet, Phase};

use super::{constituent_factors, per_mole_of_atoms, EnergyModel};
use crate::equilibrium::nlp::VariableMap;

/// Reference energy: `sum over end-members (prod_s y(s, i_s)) G(T)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PureCompoundModel;

impl EnergyModel for PureCompoundModel {
    fn name(&self) -> &'static str {
        "reference"
    }

    fn build(&self, phase: &Phase, variables: &VariableMap, parameters: &ParameterSet) -> Expr {
        let Some(position) = variables.position_of(&phase.name) else {
            return Expr::constant(0.0);
        };

        let terms: Vec<Expr> = parameters
            .of_kind(&phase.name, ParameterKind::G)
            .filter(|param| param.constituents.iter().all(|c| c.len() == 1))
            .filter_map(|param| {
                let mut factors =
                    constituent_factors(phase, position, &param.constituents, variables)?;
                factors.push(param.value.to_expr());
                Some(Expr::product(factors))
            })
            .collect();

        per_mole_of_atoms(terms, phase, position, variables)
    }
}
