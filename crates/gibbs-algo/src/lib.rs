//! # gibbs-algo: Gibbs Energy Minimization as a Nonlinear Program
//!
//! This crate turns a thermodynamic database and a condition set into a
//! nonlinear program over phase fractions and sublattice site fractions, and
//! exposes the callbacks a generic NLP solver needs: sizes, bounds, a
//! starting point, objective and gradient, constraint residuals and the
//! sparse constraint Jacobian.
//!
//! ## Formulation
//!
//! ```text
//! minimize    Σ_p f_p · G_p(y_p, T)
//! subject to  Σ_p f_p = 1                           (phase balance, P > 1)
//!             Σ_i y_{p,s,i} = 1                     (site balance, ≥ 2 species)
//!             Σ_p f_p · x_k(p) = X_k                (mass balance per target)
//!             0 ≤ f, y ≤ 1
//! ```
//!
//! `G_p` is the sum of three [`EnergyModel`]s:
//!
//! | Model | Contribution |
//! |-------|--------------|
//! | [`PureCompoundModel`] | end-member reference energies |
//! | [`IdealMixingModel`] | configurational entropy |
//! | [`RedlichKisterModel`] | excess interaction energy |
//!
//! ## Backends
//!
//! - [`LbfgsBackend`]: pure Rust, augmented Lagrangian over argmin's L-BFGS
//! - `IpoptBackend`: interior point through the `ipopt` crate (feature
//!   `solver-ipopt`)
//!
//! ## Example
//!
//! ```ignore
//! use gibbs_algo::{select_backend, GibbsProblem, SolverConfig};
//! use gibbs_core::{Database, EvalConditions};
//!
//! let database = Database::from_path("cu-ni.toml")?;
//! let conditions: EvalConditions = toml::from_str(&std::fs::read_to_string("run.toml")?)?;
//!
//! let problem = GibbsProblem::new(&database, &conditions)?;
//! let solution = select_backend(Some("lbfgs"))?.solve(&problem, &SolverConfig::default())?;
//! for (name, phase) in &solution.phases {
//!     println!("{name}: {:.4}", phase.fraction);
//! }
//! ```

pub mod equilibrium;
pub mod error;
pub mod models;
pub mod mole_fraction;
pub mod test_utils;

pub use equilibrium::nlp::{
    describe_sparsity, eval_jacobian, fill_values, jacobian_nnz, jacobian_sparsity,
    jacobian_values, sparse_jacobian, ConstraintCatalogue, ConstraintKind, ConstraintRow,
    GibbsProblem, HierarchyCounts, IndexStyle, JacobianEntry, JacobianTerm, NlpInfo,
    ObjectiveAssembler, VariableMap,
};
pub use equilibrium::{
    available_backends, select_backend, GibbsSolution, LbfgsBackend, NlpBackend, PhaseMap,
    PhaseResult, SolutionStatus, SolverConfig,
};
#[cfg(feature = "solver-ipopt")]
pub use equilibrium::IpoptBackend;
pub use error::GibbsError;
pub use models::{
    EnergyModel, IdealMixingModel, PureCompoundModel, RedlichKisterModel, GAS_CONSTANT,
};
pub use mole_fraction::{mole_fraction, mole_fraction_derivative, Constitution, Occupancy};
