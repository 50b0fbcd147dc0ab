//! Gibbs energy minimization as a nonlinear program.
//!
//! [`GibbsProblem`] owns everything a solver asks for: sizes, bounds, the
//! starting point, objective and constraint values, and the constraint
//! Jacobian in structure-then-values form. Backends drive those callbacks
//! and hand the final point back to [`GibbsProblem::finalize`].
//!
//! ```text
//! Database + EvalConditions
//!        │
//!        ▼
//!   VariableMap ──► ObjectiveAssembler ──► ConstraintCatalogue
//!        │                                          │
//!        └──────────────► GibbsProblem ◄────────────┘
//!                              │
//!                    NlpBackend::solve (lbfgs | ipopt)
//!                              │
//!                              ▼
//!                        GibbsSolution
//! ```

pub mod backends;
pub mod nlp;
pub mod solution;
pub mod traits;

pub use backends::{available_backends, select_backend, LbfgsBackend};
#[cfg(feature = "solver-ipopt")]
pub use backends::IpoptBackend;
pub use nlp::{GibbsProblem, NlpInfo};
pub use solution::{GibbsSolution, PhaseMap, PhaseResult, SolutionStatus};
pub use traits::{NlpBackend, SolverConfig};
