//! Internal rate of return.

use appraise_core::{CashFlowSeries, CoreError, IrrResult};
use appraise_math::solvers::{newton_with_fallback, SolverConfig};

use crate::error::AnalyticsResult;

/// Default starting guess for the rate search.
pub const IRR_DEFAULT_GUESS: f64 = 0.1;

/// Convergence tolerance on the NPV magnitude.
pub const IRR_TOLERANCE: f64 = 1e-6;

/// Iteration budget for the rate search.
pub const IRR_MAX_ITERATIONS: u32 = 50;

/// Rate range the fallback bracket search is confined to. Below -99.99% the
/// discount factors explode; above 1,000% no real project lives.
const RATE_BOUNDS: (f64, f64) = (-0.9999, 10.0);

/// Calculates the internal rate of return.
///
/// The series carries the initial outlay at index 0, conventionally
/// negative; the IRR is the rate at which
/// `sum(cash_flows[t] / (1 + rate)^t)` equals zero.
///
/// Non-convergence is a normal, reportable outcome: a series with no sign
/// change has no real root in a sane rate range, and an exhausted iteration
/// budget is reported the same way. Neither raises an error.
///
/// # Errors
///
/// Returns a validation error only for a non-finite or out-of-domain guess.
///
/// # Example
///
/// ```rust
/// use appraise_analytics::irr;
/// use appraise_core::CashFlowSeries;
///
/// let flows = CashFlowSeries::new(vec![-1000.0, 500.0, 500.0, 500.0]).unwrap();
/// let result = irr(&flows, None).unwrap();
/// assert!(result.is_valid);
/// assert!(result.irr.unwrap() > 0.0);
/// ```
pub fn irr(cash_flows: &CashFlowSeries, guess: Option<f64>) -> AnalyticsResult<IrrResult> {
    let guess = guess.unwrap_or(IRR_DEFAULT_GUESS);
    CoreError::ensure_finite("guess", guess)?;
    if guess <= -1.0 {
        return Err(CoreError::invalid_parameter("guess", "must be greater than -1").into());
    }

    if !has_sign_change(cash_flows.as_slice()) {
        return Ok(IrrResult::not_converged("IRR calculation did not converge"));
    }

    let flows = cash_flows.as_slice();
    let f = |r: f64| {
        flows
            .iter()
            .enumerate()
            .map(|(t, cf)| cf / (1.0 + r).powi(t as i32))
            .sum::<f64>()
    };
    let df = |r: f64| {
        flows
            .iter()
            .enumerate()
            .map(|(t, cf)| -(t as f64) * cf / (1.0 + r).powi(t as i32 + 1))
            .sum::<f64>()
    };

    let config = SolverConfig::new(IRR_TOLERANCE, IRR_MAX_ITERATIONS);
    match newton_with_fallback(f, df, guess, RATE_BOUNDS, &config) {
        Ok(solution) => Ok(IrrResult::converged(solution.root, solution.iterations)),
        Err(_) => Ok(IrrResult::not_converged("IRR calculation did not converge")),
    }
}

/// True when the series contains both a positive and a negative flow.
fn has_sign_change(flows: &[f64]) -> bool {
    let has_positive = flows.iter().any(|cf| *cf > 0.0);
    let has_negative = flows.iter().any(|cf| *cf < 0.0);
    has_positive && has_negative
}
