//! # gibbs-core: Thermodynamic Domain Model
//!
//! Data structures shared by the Gibbs energy minimizer:
//!
//! - [`Phase`] / [`Sublattice`] - the phase -> sublattice -> species hierarchy
//! - [`EvalConditions`] - temperature, pressure, elements, phase status and
//!   mass-balance targets for one calculation
//! - [`Database`] / [`ParameterSet`] - phases plus the temperature-dependent
//!   parameters the energy models read
//! - [`Expr`] - tagged-variant expression trees with [`evaluate`] and
//!   [`differentiate`]
//!
//! ## Quick Start
//!
//! ```rust
//! use gibbs_core::*;
//!
//! let db = Database::new().with_phase(
//!     Phase::new("LIQUID").with_sublattice(Sublattice::new(1.0, ["CU", "NI"])),
//! );
//! let conditions = EvalConditions::new(1400.0)
//!     .with_element("CU")
//!     .with_element("NI")
//!     .with_phase("LIQUID", PhaseStatus::Entered)
//!     .with_mole_fraction("NI", 0.4);
//!
//! assert!(db.validate().is_ok());
//! assert!(conditions.validate().is_ok());
//! ```
//!
//! ## Modules
//!
//! - [`phase`] - sublattice model and the vacancy convention
//! - [`conditions`] - condition set and its validation
//! - [`database`] - database and parameter loading (TOML / JSON)
//! - [`expr`] - expression AST, evaluation and forward-mode differentiation
//! - [`error`] - [`CoreError`] and [`ExprError`]

pub mod conditions;
pub mod database;
pub mod error;
pub mod expr;
pub mod phase;

pub use conditions::{EvalConditions, PhaseStatus, STANDARD_PRESSURE};
pub use database::{
    Database, Parameter, ParameterKind, ParameterSet, PiecewiseFunction, PowerTerm,
    TemperatureRange,
};
pub use error::{CoreError, CoreResult, ExprError};
pub use expr::{
    differentiate, evaluate, Expr, Function, PiecewiseBranch, StateVariable, Variable,
    VariableLookup,
};
pub use phase::{is_vacancy, Phase, Sublattice, VACANCY};
