//! Payback period.

use appraise_core::{CashFlowSeries, CoreError, PaybackResult};

use crate::error::AnalyticsResult;

/// Calculates the payback period.
///
/// Accumulates the periodic flows until the running sum first reaches the
/// initial investment, then interpolates linearly within the crossing
/// period. Period numbering starts at 1, so a series whose cumulative sum
/// reaches the investment exactly at the second flow pays back at 2.0.
///
/// When the cumulative sum never reaches the investment the period is
/// `None` and `is_within_project_life` is false — a reportable outcome,
/// not an error. The full cumulative series is returned either way.
///
/// # Errors
///
/// Returns a validation error for a non-finite investment.
///
/// # Example
///
/// ```rust
/// use appraise_analytics::payback_period;
/// use appraise_core::CashFlowSeries;
///
/// let flows = CashFlowSeries::new(vec![200.0, 200.0, 200.0, 200.0]).unwrap();
/// let result = payback_period(&flows, 400.0).unwrap();
/// assert_eq!(result.payback_period, Some(2.0));
/// ```
pub fn payback_period(
    cash_flows: &CashFlowSeries,
    initial_investment: f64,
) -> AnalyticsResult<PaybackResult> {
    CoreError::ensure_finite("initial_investment", initial_investment)?;

    let mut cumulative = Vec::with_capacity(cash_flows.len());
    let mut running = 0.0;
    for cf in cash_flows.iter() {
        running += cf;
        cumulative.push(running);
    }

    let mut payback = None;
    for (index, &cum) in cumulative.iter().enumerate() {
        if cum >= initial_investment {
            let previous = if index == 0 { 0.0 } else { cumulative[index - 1] };
            let flow = cum - previous;
            // First crossing from below: the period's flow is positive. A
            // non-positive investment is recovered immediately.
            let fraction = if flow > 0.0 {
                ((initial_investment - previous) / flow).max(0.0)
            } else {
                0.0
            };
            payback = Some(index as f64 + fraction);
            break;
        }
    }

    Ok(PaybackResult {
        payback_period: payback,
        is_within_project_life: payback.is_some(),
        cumulative_cash_flows: cumulative,
    })
}
