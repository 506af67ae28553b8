//! Error types for the Appraise core library.
//!
//! These cover structural validation only: wrong shape, non-finite values,
//! out-of-domain parameters. Business-condition outcomes (IRR
//! non-convergence, negative contribution margin, payback never reached)
//! are regular result fields, not errors.

use thiserror::Error;

/// A specialized Result type for core validation.
pub type CoreResult<T> = Result<T, CoreError>;

/// Validation errors for the core domain types.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// The cash-flow series is structurally invalid.
    #[error("Invalid cash flows: {reason}")]
    InvalidCashFlows {
        /// Description of the structural problem.
        reason: String,
    },

    /// A numeric input was NaN or infinite.
    #[error("Non-finite input for '{name}': {value}")]
    NonFiniteInput {
        /// Name of the offending parameter.
        name: &'static str,
        /// The non-finite value.
        value: f64,
    },

    /// A parameter is outside its valid domain.
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter {
        /// Name of the offending parameter.
        name: &'static str,
        /// Why the value is invalid.
        reason: String,
    },
}

impl CoreError {
    /// Creates an invalid-cash-flows error.
    #[must_use]
    pub fn invalid_cash_flows(reason: impl Into<String>) -> Self {
        Self::InvalidCashFlows {
            reason: reason.into(),
        }
    }

    /// Creates an invalid-parameter error.
    #[must_use]
    pub fn invalid_parameter(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    /// Checks that `value` is finite, naming it in the error otherwise.
    pub fn ensure_finite(name: &'static str, value: f64) -> CoreResult<f64> {
        if value.is_finite() {
            Ok(value)
        } else {
            Err(Self::NonFiniteInput { name, value })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::invalid_cash_flows("series is empty");
        assert!(err.to_string().contains("series is empty"));
    }

    #[test]
    fn test_ensure_finite() {
        assert_eq!(CoreError::ensure_finite("rate", 0.1), Ok(0.1));
        assert!(CoreError::ensure_finite("rate", f64::NAN).is_err());
        assert!(CoreError::ensure_finite("rate", f64::INFINITY).is_err());
    }
}
