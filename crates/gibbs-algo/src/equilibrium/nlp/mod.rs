//! NLP formulation of Gibbs energy minimization.
//!
//! - [`variable_map`] - phase and site fraction numbering
//! - [`objective`] - phase-fraction weighted master expression
//! - [`constraints`] - constraint rows, Jacobian entries and closed-form counts
//! - [`problem`] - [`GibbsProblem`], the solver callback surface
//! - [`jacobian`] - structure and value passes over the constraint Jacobian

pub mod constraints;
pub mod jacobian;
pub mod objective;
pub mod problem;
pub mod variable_map;

pub use constraints::{
    ConstraintCatalogue, ConstraintKind, ConstraintRow, HierarchyCounts, JacobianEntry,
    JacobianTerm,
};
pub use jacobian::{
    describe_sparsity, eval_jacobian, fill_values, jacobian_nnz, jacobian_sparsity,
    jacobian_values, sparse_jacobian,
};
pub use objective::ObjectiveAssembler;
pub use problem::{GibbsProblem, IndexStyle, NlpInfo};
pub use variable_map::{PhaseFractionEntry, SiteFractionSlot, SublatticeSlots, VariableMap};
