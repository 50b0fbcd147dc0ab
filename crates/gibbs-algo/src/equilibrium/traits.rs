//! Backend trait for solving a [`GibbsProblem`].

use serde::{Deserialize, Serialize};

use super::nlp::GibbsProblem;
use super::solution::GibbsSolution;
use crate::error::GibbsError;

/// Configuration passed to backend solvers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Maximum iterations
    pub max_iterations: usize,
    /// Convergence tolerance on constraint violation
    pub tolerance: f64,
    /// Solver output verbosity (IPOPT print level)
    pub print_level: i32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: 500,
            tolerance: 1e-8,
            print_level: 0,
        }
    }
}

/// Runs a solver over the callbacks of a [`GibbsProblem`].
pub trait NlpBackend: Send + Sync {
    /// Unique identifier (e.g., "lbfgs", "ipopt")
    fn id(&self) -> &str;

    /// Check if this backend is available at runtime
    fn is_available(&self) -> bool;

    /// Solve the problem; finalization runs whatever the termination status
    fn solve(
        &self,
        problem: &GibbsProblem,
        config: &SolverConfig,
    ) -> Result<GibbsSolution, GibbsError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_is_object_safe() {
        fn _accepts_backend(_b: &dyn NlpBackend) {}
        fn _assert_send<T: Send>() {}
        fn _assert_sync<T: Sync>() {}
        _assert_send::<Box<dyn NlpBackend>>();
        _assert_sync::<Box<dyn NlpBackend>>();
    }

    #[test]
    fn test_solver_config_defaults() {
        let config = SolverConfig::default();
        assert_eq!(config.max_iterations, 500);
        assert_eq!(config.tolerance, 1e-8);
        assert_eq!(config.print_level, 0);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: SolverConfig = serde_json::from_str(r#"{ "max_iterations": 50 }"#).unwrap();
        assert_eq!(config.max_iterations, 50);
        assert_eq!(config.tolerance, 1e-8);
    }
}
