//! Error types for the appraisal algorithms.

use thiserror::Error;

use appraise_core::CoreError;

/// A specialized Result type for appraisal calculations.
pub type AnalyticsResult<T> = Result<T, AnalyticsError>;

/// Errors raised by the pure calculation functions.
///
/// These cover structurally invalid input only. Out-of-domain business
/// conditions (non-convergence, negative margins, unrecovered investment)
/// are reported through result fields.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    /// Input validation failed.
    #[error(transparent)]
    Validation(#[from] CoreError),

    /// A calculation produced a non-finite intermediate value.
    #[error("Calculation overflow in {operation}")]
    Overflow {
        /// The operation that overflowed.
        operation: &'static str,
    },
}
