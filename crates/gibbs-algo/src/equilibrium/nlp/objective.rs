//! Assembly of the master objective.
//!
//! ```text
//! G = sum_p f_p (G_mix,p + (G_ref,p + G_ex,p))
//! ```
//!
//! Phase terms are folded left in active-phase order, so the tree for phases
//! A, B, C is `((A + B) + C)`.

use gibbs_core::{Expr, ParameterSet, Phase, Variable};
use tracing::debug;

use super::variable_map::VariableMap;
use crate::models::{EnergyModel, IdealMixingModel, PureCompoundModel, RedlichKisterModel};

/// The three energy contributions combined per phase.
pub struct ObjectiveAssembler {
    reference: Box<dyn EnergyModel>,
    mixing: Box<dyn EnergyModel>,
    excess: Box<dyn EnergyModel>,
}

impl Default for ObjectiveAssembler {
    fn default() -> Self {
        Self {
            reference: Box::new(PureCompoundModel),
            mixing: Box::new(IdealMixingModel),
            excess: Box::new(RedlichKisterModel),
        }
    }
}

impl ObjectiveAssembler {
    pub fn new(
        reference: Box<dyn EnergyModel>,
        mixing: Box<dyn EnergyModel>,
        excess: Box<dyn EnergyModel>,
    ) -> Self {
        Self {
            reference,
            mixing,
            excess,
        }
    }

    pub fn with_reference(mut self, model: Box<dyn EnergyModel>) -> Self {
        self.reference = model;
        self
    }

    pub fn with_mixing(mut self, model: Box<dyn EnergyModel>) -> Self {
        self.mixing = model;
        self
    }

    pub fn with_excess(mut self, model: Box<dyn EnergyModel>) -> Self {
        self.excess = model;
        self
    }

    /// Molar Gibbs energy of one phase, `G_mix + (G_ref + G_ex)`.
    pub fn phase_energy(
        &self,
        phase: &Phase,
        variables: &VariableMap,
        parameters: &ParameterSet,
    ) -> Expr {
        let reference = self.reference.build(phase, variables, parameters);
        debug!(phase = %phase.name, model = self.reference.name(), expr = %reference);
        let mixing = self.mixing.build(phase, variables, parameters);
        debug!(phase = %phase.name, model = self.mixing.name(), expr = %mixing);
        let excess = self.excess.build(phase, variables, parameters);
        debug!(phase = %phase.name, model = self.excess.name(), expr = %excess);

        Expr::sum(vec![mixing, Expr::sum(vec![reference, excess])])
    }

    /// Phase-fraction weighted sum over `phases`, folded left.
    pub fn assemble(
        &self,
        phases: &[Phase],
        variables: &VariableMap,
        parameters: &ParameterSet,
    ) -> Expr {
        let mut master: Option<Expr> = None;
        for phase in phases {
            let weighted = Expr::product(vec![
                Expr::var(Variable::phase_fraction(&phase.name)),
                self.phase_energy(phase, variables, parameters),
            ]);
            master = Some(match master {
                None => weighted,
                Some(acc) => Expr::sum(vec![acc, weighted]),
            });
        }
        let master = master.unwrap_or_else(|| Expr::constant(0.0));
        debug!(nodes = master.node_count(), expr = %master, "master objective");
        master
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{binary_conditions, two_phase_database};
    use gibbs_core::evaluate;

    struct Constant(f64);

    impl EnergyModel for Constant {
        fn name(&self) -> &'static str {
            "constant"
        }

        fn build(&self, _: &Phase, _: &VariableMap, _: &ParameterSet) -> Expr {
            Expr::constant(self.0)
        }
    }

    #[test]
    fn test_fold_is_left_associated() {
        let db = two_phase_database();
        let conds = binary_conditions();
        let phases: Vec<Phase> = db.phases.values().cloned().collect();
        let map = VariableMap::build(&phases, &conds).unwrap();
        let assembler = ObjectiveAssembler::new(
            Box::new(Constant(1.0)),
            Box::new(Constant(2.0)),
            Box::new(Constant(3.0)),
        );
        let expr = assembler.assemble(&phases, &map, &db.parameters);
        assert_eq!(
            expr.to_string(),
            "(+ (* FCC_A1_FRAC (+ 2 (+ 1 3))) (* LIQUID_FRAC (+ 2 (+ 1 3))))"
        );
    }

    #[test]
    fn test_objective_weights_phase_energies() {
        let db = two_phase_database();
        let conds = binary_conditions();
        let phases: Vec<Phase> = db.phases.values().cloned().collect();
        let map = VariableMap::build(&phases, &conds).unwrap();
        let assembler = ObjectiveAssembler::default();
        let master = assembler.assemble(&phases, &map, &db.parameters);

        let x = [0.25, 0.6, 0.4, 1.0, 0.75, 0.3, 0.7];
        let g_fcc = assembler.phase_energy(&phases[0], &map, &db.parameters);
        let g_liq = assembler.phase_energy(&phases[1], &map, &db.parameters);
        let expected = 0.25 * evaluate(&g_fcc, &conds, &map, &x).unwrap()
            + 0.75 * evaluate(&g_liq, &conds, &map, &x).unwrap();
        let value = evaluate(&master, &conds, &map, &x).unwrap();
        assert!((value - expected).abs() < 1e-9 * expected.abs());
    }

    #[test]
    fn test_with_builders_replace_models() {
        let db = two_phase_database();
        let conds = binary_conditions();
        let phases: Vec<Phase> = db.phases.values().cloned().collect();
        let map = VariableMap::build(&phases, &conds).unwrap();
        let assembler = ObjectiveAssembler::default()
            .with_reference(Box::new(Constant(0.0)))
            .with_mixing(Box::new(Constant(0.0)))
            .with_excess(Box::new(Constant(-10.0)));
        let expr = assembler.assemble(&phases[..1], &map, &db.parameters);
        let value = evaluate(&expr, &conds, &map, &[0.5; 7]).unwrap();
        assert_eq!(value, -5.0);
    }
}
