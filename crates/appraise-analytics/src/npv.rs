//! Net present value.

use appraise_core::{CashFlowSeries, CoreError, NpvResult};

use crate::error::AnalyticsResult;

/// Calculates net present value.
///
/// `npv = -initial_investment + sum(cash_flows[t] / (1 + rate)^(t+1))` for
/// `t = 0..n-1`: the first periodic flow is one period away from the
/// valuation date, the initial outlay sits at the valuation date itself.
///
/// Also returns the per-period discounted present values and the
/// profitability index `(npv + investment) / investment`, omitted when the
/// investment is zero.
///
/// # Errors
///
/// Returns a validation error for a non-finite rate or investment, or a
/// discount rate at or below -1.
///
/// # Example
///
/// ```rust
/// use appraise_analytics::npv;
/// use appraise_core::CashFlowSeries;
///
/// let flows = CashFlowSeries::new(vec![100.0, 100.0, 100.0]).unwrap();
/// let result = npv(&flows, 0.10, 0.0).unwrap();
/// assert!((result.npv - 248.685199).abs() < 1e-6);
/// ```
pub fn npv(
    cash_flows: &CashFlowSeries,
    discount_rate: f64,
    initial_investment: f64,
) -> AnalyticsResult<NpvResult> {
    CoreError::ensure_finite("discount_rate", discount_rate)?;
    CoreError::ensure_finite("initial_investment", initial_investment)?;
    if discount_rate <= -1.0 {
        return Err(CoreError::invalid_parameter("discount_rate", "must be greater than -1").into());
    }

    let present_values: Vec<f64> = cash_flows
        .iter()
        .enumerate()
        .map(|(t, cf)| cf / (1.0 + discount_rate).powi(t as i32 + 1))
        .collect();

    let value = -initial_investment + present_values.iter().sum::<f64>();

    let profitability_index = if initial_investment != 0.0 {
        Some((value + initial_investment) / initial_investment)
    } else {
        None
    };

    Ok(NpvResult {
        npv: value,
        profitability_index,
        present_values,
    })
}
