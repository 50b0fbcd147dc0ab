//! Condition set for one equilibrium calculation.
//!
//! The condition set is immutable for the duration of a run. It names the
//! elements under investigation, the activation status of each phase, and the
//! mass-balance targets (overall mole fractions) the equilibrium must meet.
//! Mass-balance targets iterate in species-name order; that order fixes the
//! order of the mass-balance constraint rows.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::phase::is_vacancy;

/// Standard pressure in Pa.
pub const STANDARD_PRESSURE: f64 = 101_325.0;

/// Activation status of a phase. Only [`PhaseStatus::Entered`] phases take part
/// in the minimization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseStatus {
    Entered,
    Suspended,
    Dormant,
    Fixed,
}

/// Temperature, pressure, composition and phase selection for a calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalConditions {
    /// Temperature in K
    pub temperature: f64,
    /// Pressure in Pa
    #[serde(default = "default_pressure")]
    pub pressure: f64,
    /// Species under investigation (vacancies included when they should be
    /// admissible site occupants)
    pub elements: Vec<String>,
    #[serde(default)]
    pub phases: BTreeMap<String, PhaseStatus>,
    /// Overall mole fraction targets, one mass-balance row each
    #[serde(default)]
    pub mole_fractions: BTreeMap<String, f64>,
}

fn default_pressure() -> f64 {
    STANDARD_PRESSURE
}

impl EvalConditions {
    pub fn new(temperature: f64) -> Self {
        Self {
            temperature,
            pressure: STANDARD_PRESSURE,
            elements: Vec::new(),
            phases: BTreeMap::new(),
            mole_fractions: BTreeMap::new(),
        }
    }

    pub fn with_pressure(mut self, pressure: f64) -> Self {
        self.pressure = pressure;
        self
    }

    pub fn with_element(mut self, element: impl Into<String>) -> Self {
        let element = element.into();
        if !self.elements.contains(&element) {
            self.elements.push(element);
        }
        self
    }

    pub fn with_phase(mut self, phase: impl Into<String>, status: PhaseStatus) -> Self {
        self.phases.insert(phase.into(), status);
        self
    }

    pub fn with_mole_fraction(mut self, species: impl Into<String>, target: f64) -> Self {
        self.mole_fractions.insert(species.into(), target);
        self
    }

    pub fn is_element(&self, species: &str) -> bool {
        self.elements.iter().any(|e| e == species)
    }

    pub fn is_entered(&self, phase: &str) -> bool {
        matches!(self.phases.get(phase), Some(PhaseStatus::Entered))
    }

    /// Entered phase names in name order.
    pub fn entered_phases(&self) -> impl Iterator<Item = &str> {
        self.phases
            .iter()
            .filter(|(_, status)| **status == PhaseStatus::Entered)
            .map(|(name, _)| name.as_str())
    }

    /// Number of mass-balance rows.
    pub fn constrained_species_count(&self) -> usize {
        self.mole_fractions.len()
    }

    /// Check the condition set for configuration errors.
    pub fn validate(&self) -> CoreResult<()> {
        if self.elements.is_empty() {
            return Err(CoreError::Validation("no elements specified".into()));
        }
        if self.entered_phases().next().is_none() {
            return Err(CoreError::Validation("no phases are entered".into()));
        }
        if !(self.temperature > 0.0) || !self.temperature.is_finite() {
            return Err(CoreError::Validation(format!(
                "temperature must be positive, got {}",
                self.temperature
            )));
        }
        let mut total = 0.0;
        for (species, target) in &self.mole_fractions {
            if is_vacancy(species) {
                return Err(CoreError::Validation(
                    "vacancies cannot carry a mole fraction condition".into(),
                ));
            }
            if !self.is_element(species) {
                return Err(CoreError::Validation(format!(
                    "mole fraction condition on {species}, which is not among the elements"
                )));
            }
            if !(*target > 0.0 && *target < 1.0) {
                return Err(CoreError::Validation(format!(
                    "X({species}) = {target} must lie strictly between 0 and 1"
                )));
            }
            total += target;
        }
        if total >= 1.0 {
            return Err(CoreError::Validation(format!(
                "mole fraction conditions sum to {total}, leaving nothing for the dependent species"
            )));
        }
        Ok(())
    }
}
