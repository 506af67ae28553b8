//! Multi-period cash-flow projection.

use appraise_core::{ProjectionParams, ProjectionResult};

use crate::error::{AnalyticsError, AnalyticsResult};

/// Projects a geometric cash-flow series.
///
/// Grows `base_cash_flow` at `growth_rate` for `periods` periods:
/// `base * (1 + growth)^t` for `t = 1..=periods`. Each projected flow is
/// also discounted to present value at `discount_rate` (a zero rate leaves
/// the flows unchanged) and the present values are summed into `total_pv`.
///
/// When the discount rate exceeds the growth rate a growing-perpetuity
/// terminal value is appended: the period after the horizon capitalized at
/// `discount - growth`, discounted back to the valuation date. Otherwise
/// the perpetuity formula is undefined and the terminal value is `None`.
///
/// # Errors
///
/// Returns a validation error for non-finite inputs, zero periods, or a
/// discount rate at or below -1, and an overflow error when the projected
/// values leave the representable range.
///
/// # Example
///
/// ```rust
/// use appraise_analytics::project_cash_flows;
///
/// let result = project_cash_flows(1000.0, 0.05, 3, 0.0).unwrap();
/// assert_eq!(result.projected_cash_flows.len(), 3);
/// assert!((result.projected_cash_flows[0] - 1050.0).abs() < 1e-9);
/// ```
pub fn project_cash_flows(
    base_cash_flow: f64,
    growth_rate: f64,
    periods: u32,
    discount_rate: f64,
) -> AnalyticsResult<ProjectionResult> {
    let params = ProjectionParams {
        base_cash_flow,
        growth_rate,
        periods,
        discount_rate,
    };
    params.validate()?;

    let n = periods as usize;
    let mut projected_cash_flows = Vec::with_capacity(n);
    let mut present_values = Vec::with_capacity(n);
    let mut total_pv = 0.0;

    for t in 1..=periods {
        let flow = base_cash_flow * (1.0 + growth_rate).powi(t as i32);
        let pv = flow / (1.0 + discount_rate).powi(t as i32);
        if !flow.is_finite() || !pv.is_finite() {
            return Err(AnalyticsError::Overflow {
                operation: "cash-flow projection",
            });
        }
        projected_cash_flows.push(flow);
        present_values.push(pv);
        total_pv += pv;
    }

    let terminal_value = if discount_rate > growth_rate {
        let last = projected_cash_flows[n - 1];
        let perpetuity = last * (1.0 + growth_rate) / (discount_rate - growth_rate);
        Some(perpetuity / (1.0 + discount_rate).powi(periods as i32))
    } else {
        None
    };

    Ok(ProjectionResult {
        projected_cash_flows,
        present_values,
        total_pv,
        terminal_value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_growth_only() {
        let result = project_cash_flows(1000.0, 0.10, 3, 0.0).unwrap();

        assert_relative_eq!(result.projected_cash_flows[0], 1100.0, epsilon = 1e-9);
        assert_relative_eq!(result.projected_cash_flows[1], 1210.0, epsilon = 1e-9);
        assert_relative_eq!(result.projected_cash_flows[2], 1331.0, epsilon = 1e-9);
        // No discounting: present values equal the projections
        assert_eq!(result.present_values, result.projected_cash_flows);
        assert_relative_eq!(result.total_pv, 3641.0, epsilon = 1e-9);
        // Growth >= discount: no terminal value
        assert!(result.terminal_value.is_none());
    }

    #[test]
    fn test_discounted() {
        let result = project_cash_flows(1000.0, 0.0, 2, 0.10).unwrap();

        assert_relative_eq!(result.present_values[0], 1000.0 / 1.1, epsilon = 1e-9);
        assert_relative_eq!(result.present_values[1], 1000.0 / 1.21, epsilon = 1e-9);
        assert_relative_eq!(
            result.total_pv,
            1000.0 / 1.1 + 1000.0 / 1.21,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_terminal_value() {
        let result = project_cash_flows(1000.0, 0.02, 5, 0.08).unwrap();

        // CF_6 capitalized at (8% - 2%), discounted back 5 periods
        let last = 1000.0 * 1.02f64.powi(5);
        let expected = last * 1.02 / 0.06 / 1.08f64.powi(5);
        assert_relative_eq!(result.terminal_value.unwrap(), expected, epsilon = 1e-9);
    }

    #[test]
    fn test_no_terminal_value_when_growth_dominates() {
        let result = project_cash_flows(1000.0, 0.08, 5, 0.08).unwrap();
        assert!(result.terminal_value.is_none());

        let result = project_cash_flows(1000.0, 0.10, 5, 0.08).unwrap();
        assert!(result.terminal_value.is_none());
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(project_cash_flows(f64::NAN, 0.05, 3, 0.0).is_err());
        assert!(project_cash_flows(1000.0, 0.05, 0, 0.0).is_err());
        assert!(project_cash_flows(1000.0, 0.05, 3, -1.0).is_err());
    }

    #[test]
    fn test_overflow_rejected() {
        let result = project_cash_flows(1e300, 10.0, 500, 0.0);
        assert!(matches!(result, Err(AnalyticsError::Overflow { .. })));
    }
}
