//! Run files: the condition set plus solver settings for one calculation.
//!
//! ```toml
//! backend = "lbfgs"
//!
//! [conditions]
//! temperature = 1400.0
//! elements = ["CU", "NI", "VA"]
//! phases = { LIQUID = "entered", FCC_A1 = "entered" }
//! mole_fractions = { NI = 0.3 }
//!
//! [solver]
//! max_iterations = 1000
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use gibbs_algo::SolverConfig;
use gibbs_core::EvalConditions;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunFile {
    pub conditions: EvalConditions,
    /// Preferred backend id; the command line takes precedence
    #[serde(default)]
    pub backend: Option<String>,
    #[serde(default)]
    pub solver: SolverConfig,
}

impl RunFile {
    /// Load a run file, JSON when the extension says so, TOML otherwise.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading run file {}", path.display()))?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let run: RunFile = if is_json {
            serde_json::from_str(&text)
                .with_context(|| format!("parsing JSON run file {}", path.display()))?
        } else {
            toml::from_str(&text)
                .with_context(|| format!("parsing TOML run file {}", path.display()))?
        };
        Ok(run)
    }

    /// Apply command-line overrides to the solver settings.
    pub fn solver_config(&self, max_iter: Option<usize>, tol: Option<f64>) -> SolverConfig {
        let mut config = self.solver.clone();
        if let Some(max_iter) = max_iter {
            config.max_iterations = max_iter;
        }
        if let Some(tol) = tol {
            config.tolerance = tol;
        }
        config
    }
}
