//! Break-even point.

use appraise_core::{BreakEvenParams, BreakEvenResult};

use crate::error::AnalyticsResult;

/// Calculates the break-even point.
///
/// `contribution_margin = price_per_unit - variable_cost_per_unit`;
/// break-even units are `fixed_costs / contribution_margin` and break-even
/// revenue is units times price.
///
/// A non-positive contribution margin means every sale loses money:
/// the unit and revenue figures are `None` and `error` explains the
/// condition. This is a business outcome, not a fault.
///
/// # Errors
///
/// Returns a validation error for non-finite inputs.
///
/// # Example
///
/// ```rust
/// use appraise_analytics::break_even;
///
/// let result = break_even(500_000.0, 50.0, 100.0).unwrap();
/// assert_eq!(result.break_even_units, Some(10_000.0));
/// assert_eq!(result.break_even_revenue, Some(1_000_000.0));
/// ```
pub fn break_even(
    fixed_costs: f64,
    variable_cost_per_unit: f64,
    price_per_unit: f64,
) -> AnalyticsResult<BreakEvenResult> {
    let params = BreakEvenParams {
        fixed_costs,
        variable_cost_per_unit,
        price_per_unit,
    };
    params.validate()?;

    let contribution_margin = price_per_unit - variable_cost_per_unit;
    let contribution_margin_ratio = if price_per_unit != 0.0 {
        contribution_margin / price_per_unit
    } else {
        0.0
    };

    if contribution_margin <= 0.0 {
        return Ok(BreakEvenResult {
            break_even_units: None,
            break_even_revenue: None,
            contribution_margin,
            contribution_margin_ratio,
            error: Some(
                "Contribution margin is not positive; the price per unit must exceed the variable cost per unit"
                    .to_string(),
            ),
        });
    }

    let break_even_units = fixed_costs / contribution_margin;
    Ok(BreakEvenResult {
        break_even_units: Some(break_even_units),
        break_even_revenue: Some(break_even_units * price_per_unit),
        contribution_margin,
        contribution_margin_ratio,
        error: None,
    })
}
