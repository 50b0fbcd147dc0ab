use gibbs_core::{CoreError, ExprError};
use thiserror::Error;

/// Errors raised while building or solving a Gibbs energy minimization.
#[derive(Debug, Error)]
pub enum GibbsError {
    /// The condition set names no elements
    #[error("no elements specified in the condition set")]
    MissingElements,

    /// No phase in the condition set is both entered and present in the database
    #[error("no active phases: enter at least one phase present in the database")]
    NoActivePhases,

    /// Any other configuration problem in the condition set
    #[error("invalid conditions: {0}")]
    InvalidCondition(String),

    /// Database or condition loading/validation
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Expression evaluation failed at the current point
    #[error("expression evaluation failed: {0}")]
    Expression(#[from] ExprError),

    /// The backend failed to produce a point
    #[error("solver error: {0}")]
    Solver(String),

    /// The requested backend is not compiled in or not known
    #[error("solver backend not available: {0}")]
    NotAvailable(String),
}

impl GibbsError {
    /// Configuration errors are detected before any numeric work.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            GibbsError::MissingElements
                | GibbsError::NoActivePhases
                | GibbsError::InvalidCondition(_)
                | GibbsError::Core(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expr_error_converts() {
        let err: GibbsError = ExprError::LogDomain(0.0).into();
        assert!(matches!(err, GibbsError::Expression(_)));
        assert!(!err.is_configuration_error());
    }

    #[test]
    fn test_configuration_errors() {
        assert!(GibbsError::MissingElements.is_configuration_error());
        assert!(GibbsError::NoActivePhases.is_configuration_error());
        assert!(!GibbsError::Solver("diverged".into()).is_configuration_error());
    }
}
