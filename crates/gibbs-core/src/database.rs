//! Thermodynamic database: phases plus the parameter set their energy models read.
//!
//! Databases load from TOML or JSON:
//!
//! ```toml
//! [phases.LIQUID]
//! sublattices = [{ stoichiometry = 1.0, species = ["CU", "NI"] }]
//!
//! [[parameters]]
//! phase = "LIQUID"
//! kind = "G"
//! constituents = [["CU"]]
//! value = [{ low = 298.15, high = 3200.0, a = 5194.3, b = 120.97, c = -24.11 }]
//!
//! [[parameters]]
//! phase = "LIQUID"
//! kind = "L"
//! constituents = [["CU", "NI"]]
//! order = 1
//! value = [{ a = -4000.0 }]
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::expr::{Expr, PiecewiseBranch, StateVariable};
use crate::phase::Phase;

// ============================================================================
// TEMPERATURE FUNCTIONS
// ============================================================================

/// Extra `coefficient * T^power` term beyond the standard polynomial.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerTerm {
    pub coefficient: f64,
    pub power: f64,
}

/// `a + b T + c T ln T + d T^2 + e T^3 + f / T + extra`, valid for `low <= T < high`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureRange {
    #[serde(default)]
    pub low: f64,
    #[serde(default = "unbounded")]
    pub high: f64,
    #[serde(default)]
    pub a: f64,
    #[serde(default)]
    pub b: f64,
    #[serde(default)]
    pub c: f64,
    #[serde(default)]
    pub d: f64,
    #[serde(default)]
    pub e: f64,
    #[serde(default)]
    pub f: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra: Vec<PowerTerm>,
}

fn unbounded() -> f64 {
    f64::INFINITY
}

impl TemperatureRange {
    /// Constant over all temperatures.
    pub fn constant(a: f64) -> Self {
        Self {
            low: 0.0,
            high: f64::INFINITY,
            a,
            b: 0.0,
            c: 0.0,
            d: 0.0,
            e: 0.0,
            f: 0.0,
            extra: Vec::new(),
        }
    }

    pub fn contains(&self, t: f64) -> bool {
        self.low <= t && t < self.high
    }

    fn value_at(&self, t: f64) -> f64 {
        let mut v = self.a + self.b * t + self.d * t * t + self.e * t * t * t;
        if self.c != 0.0 {
            v += self.c * t * t.ln();
        }
        if self.f != 0.0 {
            v += self.f / t;
        }
        for term in &self.extra {
            v += term.coefficient * t.powf(term.power);
        }
        v
    }

    fn to_expr(&self) -> Expr {
        let t = Expr::temperature;
        let mut terms = Vec::new();
        if self.a != 0.0 {
            terms.push(Expr::constant(self.a));
        }
        if self.b != 0.0 {
            terms.push(Expr::product(vec![Expr::constant(self.b), t()]));
        }
        if self.c != 0.0 {
            terms.push(Expr::product(vec![Expr::constant(self.c), t(), Expr::ln(t())]));
        }
        for (coef, power) in [(self.d, 2.0), (self.e, 3.0), (self.f, -1.0)] {
            if coef != 0.0 {
                terms.push(Expr::product(vec![Expr::constant(coef), Expr::pow(t(), power)]));
            }
        }
        for term in &self.extra {
            terms.push(Expr::product(vec![
                Expr::constant(term.coefficient),
                Expr::pow(t(), term.power),
            ]));
        }
        match terms.len() {
            0 => Expr::constant(0.0),
            1 => terms.remove(0),
            _ => Expr::sum(terms),
        }
    }
}

/// Temperature function made of ranges; zero outside every range.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PiecewiseFunction {
    pub ranges: Vec<TemperatureRange>,
}

impl PiecewiseFunction {
    pub fn new(ranges: Vec<TemperatureRange>) -> Self {
        Self { ranges }
    }

    pub fn constant(value: f64) -> Self {
        Self::new(vec![TemperatureRange::constant(value)])
    }

    pub fn value_at(&self, t: f64) -> f64 {
        self.ranges
            .iter()
            .find(|r| r.contains(t))
            .map(|r| r.value_at(t))
            .unwrap_or(0.0)
    }

    /// Expression in the temperature state variable.
    pub fn to_expr(&self) -> Expr {
        Expr::Piecewise {
            var: StateVariable::Temperature,
            branches: self
                .ranges
                .iter()
                .map(|r| PiecewiseBranch {
                    low: r.low,
                    high: r.high,
                    expr: r.to_expr(),
                })
                .collect(),
        }
    }
}

// ============================================================================
// PARAMETERS
// ============================================================================

/// `G` parameters hold end-member reference energies, `L` parameters hold
/// interaction energies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParameterKind {
    G,
    L,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub phase: String,
    pub kind: ParameterKind,
    /// One species list per sublattice
    pub constituents: Vec<Vec<String>>,
    /// Redlich-Kister order, ignored for `G`
    #[serde(default)]
    pub order: u32,
    pub value: PiecewiseFunction,
}

impl Parameter {
    pub fn new(
        phase: impl Into<String>,
        kind: ParameterKind,
        constituents: Vec<Vec<String>>,
        order: u32,
        value: PiecewiseFunction,
    ) -> Self {
        Self {
            phase: phase.into(),
            kind,
            constituents,
            order,
            value,
        }
    }
}

/// All parameters of a database.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterSet {
    pub parameters: Vec<Parameter>,
}

impl ParameterSet {
    pub fn push(&mut self, parameter: Parameter) {
        self.parameters.push(parameter);
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    pub fn for_phase<'a>(&'a self, phase: &'a str) -> impl Iterator<Item = &'a Parameter> + 'a {
        self.parameters.iter().filter(move |p| p.phase == phase)
    }

    pub fn of_kind<'a>(
        &'a self,
        phase: &'a str,
        kind: ParameterKind,
    ) -> impl Iterator<Item = &'a Parameter> + 'a {
        self.for_phase(phase).filter(move |p| p.kind == kind)
    }
}

// ============================================================================
// DATABASE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Database {
    /// Phases keyed by name; iteration is in name order
    pub phases: BTreeMap<String, Phase>,
    #[serde(default)]
    pub parameters: ParameterSet,
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_phase(mut self, phase: Phase) -> Self {
        self.phases.insert(phase.name.clone(), phase);
        self
    }

    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn phase(&self, name: &str) -> Option<&Phase> {
        self.phases.get(name)
    }

    pub fn from_toml_str(text: &str) -> CoreResult<Self> {
        let db: Database = toml::from_str(text)?;
        db.finish()
    }

    pub fn from_json_str(text: &str) -> CoreResult<Self> {
        let db: Database = serde_json::from_str(text)?;
        db.finish()
    }

    /// Load from a `.json` file, or from TOML for any other extension.
    pub fn from_path(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&text),
            _ => Self::from_toml_str(&text),
        }
    }

    pub fn to_toml_string(&self) -> CoreResult<String> {
        toml::to_string(self).map_err(|e| CoreError::Parse(e.to_string()))
    }

    fn finish(mut self) -> CoreResult<Self> {
        for (name, phase) in self.phases.iter_mut() {
            if phase.name.is_empty() {
                phase.name = name.clone();
            } else if &phase.name != name {
                return Err(CoreError::Validation(format!(
                    "phase stored under {name} is named {}",
                    phase.name
                )));
            }
        }
        self.validate()?;
        Ok(self)
    }

    /// Check phases and that every parameter fits the phase it names.
    pub fn validate(&self) -> CoreResult<()> {
        for phase in self.phases.values() {
            phase.validate()?;
        }
        for param in &self.parameters.parameters {
            let phase = self.phases.get(&param.phase).ok_or_else(|| {
                CoreError::Validation(format!("parameter refers to unknown phase {}", param.phase))
            })?;
            if param.constituents.len() != phase.sublattices.len() {
                return Err(CoreError::Validation(format!(
                    "{:?} parameter for {} lists {} sublattices, phase has {}",
                    param.kind,
                    param.phase,
                    param.constituents.len(),
                    phase.sublattices.len()
                )));
            }
            for (idx, (species, sublattice)) in
                param.constituents.iter().zip(&phase.sublattices).enumerate()
            {
                if species.is_empty() {
                    return Err(CoreError::Validation(format!(
                        "{:?} parameter for {} has no constituent on sublattice {idx}",
                        param.kind, param.phase
                    )));
                }
                if let Some(missing) = species.iter().find(|s| !sublattice.contains(s)) {
                    return Err(CoreError::Validation(format!(
                        "{:?} parameter for {} puts {missing} on sublattice {idx}, which does not hold it",
                        param.kind, param.phase
                    )));
                }
            }
            let mixed = param.constituents.iter().filter(|c| c.len() > 1).count();
            match param.kind {
                ParameterKind::G if mixed != 0 => {
                    return Err(CoreError::Validation(format!(
                        "G parameter for {} must name one species per sublattice",
                        param.phase
                    )));
                }
                ParameterKind::L if mixed != 1 => {
                    return Err(CoreError::Validation(format!(
                        "L parameter for {} must mix exactly one sublattice, found {mixed}",
                        param.phase
                    )));
                }
                _ => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phase::Sublattice;

    const CU_NI: &str = r#"
        [phases.LIQUID]
        sublattices = [{ stoichiometry = 1.0, species = ["CU", "NI"] }]

        [[parameters]]
        phase = "LIQUID"
        kind = "G"
        constituents = [["CU"]]
        value = [{ low = 298.15, high = 3200.0, a = 5194.3, b = 120.97, c = -24.11 }]

        [[parameters]]
        phase = "LIQUID"
        kind = "L"
        constituents = [["CU", "NI"]]
        order = 1
        value = [{ a = -4000.0 }]
    "#;

    #[test]
    fn test_load_toml_fills_phase_names() {
        let db = Database::from_toml_str(CU_NI).unwrap();
        assert_eq!(db.phase("LIQUID").unwrap().name, "LIQUID");
        assert_eq!(db.parameters.len(), 2);
        assert_eq!(db.parameters.of_kind("LIQUID", ParameterKind::L).count(), 1);
    }

    #[test]
    fn test_piecewise_value() {
        let db = Database::from_toml_str(CU_NI).unwrap();
        let g = &db.parameters.parameters[0].value;
        let t: f64 = 1000.0;
        let expected = 5194.3 + 120.97 * t - 24.11 * t * t.ln();
        assert!((g.value_at(t) - expected).abs() < 1e-9);
        assert_eq!(g.value_at(100.0), 0.0, "outside every range");
    }

    #[test]
    fn test_open_range_defaults() {
        let db = Database::from_toml_str(CU_NI).unwrap();
        let l = &db.parameters.parameters[1].value;
        assert_eq!(l.ranges[0].low, 0.0);
        assert!(l.ranges[0].high.is_infinite());
        assert_eq!(l.value_at(1500.0), -4000.0);
    }

    #[test]
    fn test_rejects_parameter_for_unknown_phase() {
        let db = Database::new()
            .with_phase(Phase::new("LIQUID").with_sublattice(Sublattice::new(1.0, ["CU"])))
            .with_parameter(Parameter::new(
                "FCC_A1",
                ParameterKind::G,
                vec![vec!["CU".into()]],
                0,
                PiecewiseFunction::constant(0.0),
            ));
        assert!(db.validate().is_err());
    }

    #[test]
    fn test_rejects_g_parameter_with_mixing() {
        let text = CU_NI.replace(r#"kind = "L""#, r#"kind = "G""#);
        let err = Database::from_toml_str(&text).unwrap_err();
        assert!(err.to_string().contains("one species per sublattice"), "got {err}");
    }

    #[test]
    fn test_rejects_species_not_on_sublattice() {
        let text = CU_NI.replace(r#"constituents = [["CU"]]"#, r#"constituents = [["FE"]]"#);
        assert!(Database::from_toml_str(&text).is_err());
    }

    #[test]
    fn test_bad_toml_is_parse_error() {
        let err = Database::from_toml_str("[phases.LIQUID").unwrap_err();
        assert!(matches!(err, CoreError::Parse(_)));
    }
}
