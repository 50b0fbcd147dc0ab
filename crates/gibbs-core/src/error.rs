//! Error types for the domain model and the expression engine
//!
//! [`CoreError`] covers everything that can go wrong while loading or validating
//! a thermodynamic database or a condition set. [`ExprError`] is raised by the
//! expression evaluator and differentiator when a tree cannot be evaluated at a
//! given variable vector.
//!
//! # Example
//!
//! ```ignore
//! use gibbs_core::{CoreResult, Database};
//!
//! fn load(path: &str) -> CoreResult<Database> {
//!     let db = Database::from_path(path)?;
//!     Ok(db)
//! }
//! ```

use thiserror::Error;

/// Errors raised while loading or validating domain data.
#[derive(Error, Debug)]
pub enum CoreError {
    /// I/O errors (file access)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parsing/deserialization errors
    #[error("Parse error: {0}")]
    Parse(String),

    /// Data validation errors
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Convenience type alias for Results using CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Parse(err.to_string())
    }
}

impl From<toml::de::Error> for CoreError {
    fn from(err: toml::de::Error) -> Self {
        CoreError::Parse(err.to_string())
    }
}

/// Errors raised while evaluating or differentiating an expression tree.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExprError {
    /// A variable leaf has no entry in the variable index table
    #[error("variable {0} is not bound to an index")]
    Unbound(String),

    /// A variable leaf maps to an index beyond the variable vector
    #[error("variable {name} maps to index {index} but only {len} values were supplied")]
    IndexOutOfRange {
        name: String,
        index: usize,
        len: usize,
    },

    /// Logarithm of a non-positive argument
    #[error("ln({0}) is undefined")]
    LogDomain(f64),

    /// Evaluation produced NaN or an infinity
    #[error("non-finite result while evaluating {0}")]
    NonFinite(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::Validation("no elements".into());
        assert!(err.to_string().contains("Validation error"));
        assert!(err.to_string().contains("no elements"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: CoreError = io_err.into();
        assert!(matches!(err, CoreError::Io(_)));
    }

    #[test]
    fn test_json_error_is_parse_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: CoreError = json_err.into();
        assert!(matches!(err, CoreError::Parse(_)));
    }

    #[test]
    fn test_expr_error_names_variable() {
        let err = ExprError::IndexOutOfRange {
            name: "FCC_A1_0_CU".into(),
            index: 7,
            len: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("FCC_A1_0_CU"));
        assert!(msg.contains('7'));
    }
}
