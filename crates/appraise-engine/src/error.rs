//! Engine error types.

use thiserror::Error;

use appraise_core::CoreError;

/// A specialized Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Engine error type.
///
/// Transport and infrastructure faults live here; business-condition
/// outcomes travel inside the calculation results themselves.
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    /// The worker could not be created.
    #[error("execution context unavailable: {0}")]
    ExecutionContextUnavailable(String),

    /// The worker reported a calculation failure.
    #[error("calculation failed: {0}")]
    CalculationFailed(String),

    /// No result arrived within the per-request timeout.
    #[error("calculation timed out after {timeout_ms} ms")]
    Timeout {
        /// The timeout that elapsed, in milliseconds.
        timeout_ms: u64,
    },

    /// The worker terminated while requests were outstanding.
    #[error("execution context crashed: {0}")]
    ExecutionContextCrashed(String),

    /// The engine is shutting down.
    #[error("engine is shutting down")]
    ShuttingDown,

    /// Input validation failed before dispatch.
    #[error("invalid input: {0}")]
    Validation(#[from] CoreError),

    /// Internal invariant violation.
    #[error("internal error: {0}")]
    Internal(String),
}

impl EngineError {
    /// True for the timeout outcome — callers render it distinctly from a
    /// calculation failure.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_display() {
        let err = EngineError::Timeout { timeout_ms: 30_000 };
        assert!(err.is_timeout());
        assert!(err.to_string().contains("30000 ms"));
    }

    #[test]
    fn test_validation_from_core() {
        let err: EngineError = CoreError::invalid_cash_flows("series is empty").into();
        assert!(err.to_string().contains("series is empty"));
    }
}
