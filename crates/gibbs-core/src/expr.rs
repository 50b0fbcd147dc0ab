//! # Symbolic Energy Expressions
//!
//! Gibbs energy models are built as trees of [`Expr`] nodes and evaluated
//! against a flat variable vector supplied by the optimizer.
//!
//! ## Node kinds
//!
//! ```text
//! Const(c)            literal
//! Var(v)              phase fraction or site fraction, bound through an index table
//! State(T | P)        temperature / pressure from the condition set
//! Sum([a, b, ..])     a + b + ..
//! Product([a, ..])    a * b * ..
//! Pow(a, p)           a^p, real exponent
//! Func(ln | exp, a)   named function
//! Piecewise(T, ..)    value of the branch whose [low, high) range holds T, 0 elsewhere
//! ```
//!
//! ## Evaluation
//!
//! [`evaluate`] and [`differentiate`] are pure recursive functions over the
//! tree. Differentiation runs in forward mode: every node returns the pair
//! `(value, d value / d wrt)`, so one pass yields the partial derivative with
//! respect to one variable. The tree is never mutated.
//!
//! Variables are resolved through a [`VariableLookup`], normally the variable
//! map of the optimization problem, which turns a structural [`Variable`]
//! description into a position in the variable vector.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::conditions::EvalConditions;
use crate::error::ExprError;

// ============================================================================
// VARIABLES
// ============================================================================

/// Structural description of an optimization variable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Variable {
    /// Fraction of the system occupied by `phase`
    PhaseFraction { phase: String },
    /// Occupancy of `species` on sublattice `sublattice` of `phase`
    SiteFraction {
        phase: String,
        sublattice: usize,
        species: String,
    },
}

impl Variable {
    pub fn phase_fraction(phase: impl Into<String>) -> Self {
        Variable::PhaseFraction {
            phase: phase.into(),
        }
    }

    pub fn site_fraction(
        phase: impl Into<String>,
        sublattice: usize,
        species: impl Into<String>,
    ) -> Self {
        Variable::SiteFraction {
            phase: phase.into(),
            sublattice,
            species: species.into(),
        }
    }

    pub fn phase(&self) -> &str {
        match self {
            Variable::PhaseFraction { phase } | Variable::SiteFraction { phase, .. } => phase,
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variable::PhaseFraction { phase } => write!(f, "{phase}_FRAC"),
            Variable::SiteFraction {
                phase,
                sublattice,
                species,
            } => write!(f, "{phase}_{sublattice}_{species}"),
        }
    }
}

/// Resolves a [`Variable`] to its position in the variable vector.
pub trait VariableLookup {
    fn index_of(&self, variable: &Variable) -> Option<usize>;
}

impl VariableLookup for HashMap<Variable, usize> {
    fn index_of(&self, variable: &Variable) -> Option<usize> {
        self.get(variable).copied()
    }
}

impl VariableLookup for BTreeMap<Variable, usize> {
    fn index_of(&self, variable: &Variable) -> Option<usize> {
        self.get(variable).copied()
    }
}

// ============================================================================
// EXPRESSION TREE
// ============================================================================

/// State variables taken from the condition set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateVariable {
    Temperature,
    Pressure,
}

/// Named single-argument functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Function {
    Ln,
    Exp,
}

/// One branch of a piecewise expression, active for `low <= state < high`.
#[derive(Debug, Clone, PartialEq)]
pub struct PiecewiseBranch {
    pub low: f64,
    pub high: f64,
    pub expr: Expr,
}

/// Tagged-variant expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Const(f64),
    Var(Variable),
    State(StateVariable),
    Sum(Vec<Expr>),
    Product(Vec<Expr>),
    Pow(Box<Expr>, f64),
    Func(Function, Box<Expr>),
    Piecewise {
        var: StateVariable,
        branches: Vec<PiecewiseBranch>,
    },
}

impl Expr {
    pub fn constant(value: f64) -> Self {
        Expr::Const(value)
    }

    pub fn var(variable: Variable) -> Self {
        Expr::Var(variable)
    }

    pub fn temperature() -> Self {
        Expr::State(StateVariable::Temperature)
    }

    pub fn pressure() -> Self {
        Expr::State(StateVariable::Pressure)
    }

    pub fn sum(terms: Vec<Expr>) -> Self {
        Expr::Sum(terms)
    }

    pub fn product(factors: Vec<Expr>) -> Self {
        Expr::Product(factors)
    }

    pub fn pow(base: Expr, exponent: f64) -> Self {
        Expr::Pow(Box::new(base), exponent)
    }

    pub fn ln(arg: Expr) -> Self {
        Expr::Func(Function::Ln, Box::new(arg))
    }

    pub fn exp(arg: Expr) -> Self {
        Expr::Func(Function::Exp, Box::new(arg))
    }

    /// `a - b`
    pub fn difference(a: Expr, b: Expr) -> Self {
        Expr::Sum(vec![a, Expr::Product(vec![Expr::Const(-1.0), b])])
    }

    /// True for a literal zero.
    pub fn is_zero(&self) -> bool {
        matches!(self, Expr::Const(c) if *c == 0.0)
    }

    /// Visit every variable leaf.
    pub fn for_each_variable<'a>(&'a self, visit: &mut impl FnMut(&'a Variable)) {
        match self {
            Expr::Const(_) | Expr::State(_) => {}
            Expr::Var(v) => visit(v),
            Expr::Sum(items) | Expr::Product(items) => {
                for item in items {
                    item.for_each_variable(visit);
                }
            }
            Expr::Pow(base, _) => base.for_each_variable(visit),
            Expr::Func(_, arg) => arg.for_each_variable(visit),
            Expr::Piecewise { branches, .. } => {
                for branch in branches {
                    branch.expr.for_each_variable(visit);
                }
            }
        }
    }

    /// Number of nodes in the tree.
    pub fn node_count(&self) -> usize {
        1 + match self {
            Expr::Const(_) | Expr::Var(_) | Expr::State(_) => 0,
            Expr::Sum(items) | Expr::Product(items) => items.iter().map(Expr::node_count).sum(),
            Expr::Pow(base, _) => base.node_count(),
            Expr::Func(_, arg) => arg.node_count(),
            Expr::Piecewise { branches, .. } => branches.iter().map(|b| b.expr.node_count()).sum(),
        }
    }
}

impl fmt::Display for StateVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateVariable::Temperature => f.write_str("T"),
            StateVariable::Pressure => f.write_str("P"),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn list(f: &mut fmt::Formatter<'_>, op: &str, items: &[Expr]) -> fmt::Result {
            write!(f, "({op}")?;
            for item in items {
                write!(f, " {item}")?;
            }
            f.write_str(")")
        }

        match self {
            Expr::Const(c) => write!(f, "{c}"),
            Expr::Var(v) => write!(f, "{v}"),
            Expr::State(s) => write!(f, "{s}"),
            Expr::Sum(items) => list(f, "+", items),
            Expr::Product(items) => list(f, "*", items),
            Expr::Pow(base, p) => write!(f, "(pow {base} {p})"),
            Expr::Func(Function::Ln, arg) => write!(f, "(ln {arg})"),
            Expr::Func(Function::Exp, arg) => write!(f, "(exp {arg})"),
            Expr::Piecewise { var, branches } => {
                write!(f, "(piecewise {var}")?;
                for b in branches {
                    write!(f, " [{} {}) {}", b.low, b.high, b.expr)?;
                }
                f.write_str(")")
            }
        }
    }
}

// ============================================================================
// EVALUATION
// ============================================================================

struct Env<'a, L: ?Sized> {
    temperature: f64,
    pressure: f64,
    indices: &'a L,
    x: &'a [f64],
}

impl<L: VariableLookup + ?Sized> Env<'_, L> {
    fn lookup(&self, variable: &Variable) -> Result<f64, ExprError> {
        let index = self
            .indices
            .index_of(variable)
            .ok_or_else(|| ExprError::Unbound(variable.to_string()))?;
        self.x
            .get(index)
            .copied()
            .ok_or_else(|| ExprError::IndexOutOfRange {
                name: variable.to_string(),
                index,
                len: self.x.len(),
            })
    }

    fn state(&self, var: StateVariable) -> f64 {
        match var {
            StateVariable::Temperature => self.temperature,
            StateVariable::Pressure => self.pressure,
        }
    }

    /// Forward-mode pass: returns `(value, derivative)`.
    fn dual(&self, expr: &Expr, wrt: Option<&Variable>) -> Result<(f64, f64), ExprError> {
        match expr {
            Expr::Const(c) => Ok((*c, 0.0)),
            Expr::Var(v) => {
                let value = self.lookup(v)?;
                let seed = if wrt == Some(v) { 1.0 } else { 0.0 };
                Ok((value, seed))
            }
            Expr::State(s) => Ok((self.state(*s), 0.0)),
            Expr::Sum(items) => {
                let mut acc = (0.0, 0.0);
                for item in items {
                    let (v, d) = self.dual(item, wrt)?;
                    acc.0 += v;
                    acc.1 += d;
                }
                Ok(acc)
            }
            Expr::Product(items) => {
                let mut acc = (1.0, 0.0);
                for item in items {
                    let (v, d) = self.dual(item, wrt)?;
                    acc = (acc.0 * v, acc.1 * v + acc.0 * d);
                }
                Ok(acc)
            }
            Expr::Pow(base, p) => {
                let (b, db) = self.dual(base, wrt)?;
                let value = power(b, *p);
                let deriv = if db == 0.0 {
                    0.0
                } else {
                    p * power(b, p - 1.0) * db
                };
                Ok((value, deriv))
            }
            Expr::Func(Function::Ln, arg) => {
                let (a, da) = self.dual(arg, wrt)?;
                if a <= 0.0 {
                    return Err(ExprError::LogDomain(a));
                }
                Ok((a.ln(), da / a))
            }
            Expr::Func(Function::Exp, arg) => {
                let (a, da) = self.dual(arg, wrt)?;
                let e = a.exp();
                Ok((e, e * da))
            }
            Expr::Piecewise { var, branches } => {
                let t = self.state(*var);
                match branches.iter().find(|b| b.low <= t && t < b.high) {
                    Some(branch) => self.dual(&branch.expr, wrt),
                    None => Ok((0.0, 0.0)),
                }
            }
        }
    }
}

fn power(base: f64, exponent: f64) -> f64 {
    if exponent.fract() == 0.0 && exponent.abs() <= i32::MAX as f64 {
        base.powi(exponent as i32)
    } else {
        base.powf(exponent)
    }
}

fn env<'a, L: VariableLookup + ?Sized>(
    conditions: &EvalConditions,
    indices: &'a L,
    x: &'a [f64],
) -> Env<'a, L> {
    Env {
        temperature: conditions.temperature,
        pressure: conditions.pressure,
        indices,
        x,
    }
}

/// Evaluate `expr` at the variable vector `x`.
pub fn evaluate<L: VariableLookup + ?Sized>(
    expr: &Expr,
    conditions: &EvalConditions,
    indices: &L,
    x: &[f64],
) -> Result<f64, ExprError> {
    let (value, _) = env(conditions, indices, x).dual(expr, None)?;
    if !value.is_finite() {
        return Err(ExprError::NonFinite(truncated(expr)));
    }
    Ok(value)
}

/// Partial derivative of `expr` with respect to `wrt`, at the variable vector `x`.
pub fn differentiate<L: VariableLookup + ?Sized>(
    expr: &Expr,
    conditions: &EvalConditions,
    wrt: &Variable,
    indices: &L,
    x: &[f64],
) -> Result<f64, ExprError> {
    let (_, deriv) = env(conditions, indices, x).dual(expr, Some(wrt))?;
    if !deriv.is_finite() {
        return Err(ExprError::NonFinite(format!("d/d{wrt} {}", truncated(expr))));
    }
    Ok(deriv)
}

fn truncated(expr: &Expr) -> String {
    const LIMIT: usize = 120;
    let text = expr.to_string();
    match text.char_indices().nth(LIMIT) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text,
    }
}
