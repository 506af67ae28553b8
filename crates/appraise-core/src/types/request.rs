//! Calculation request payloads and result records.
//!
//! Every calculation kind carries its own strongly-typed parameter record,
//! collected under the [`CalculationParameters`] sum type; results mirror
//! that shape under [`CalculationOutput`]. Heterogeneous batches stay fully
//! type-checkable.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, CoreResult};
use crate::types::CashFlowSeries;

// =============================================================================
// CALCULATION KIND
// =============================================================================

/// Enumerated tag identifying a calculation operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationKind {
    /// Net present value.
    Npv,
    /// Internal rate of return.
    Irr,
    /// Payback period.
    PaybackPeriod,
    /// Break-even point.
    BreakEven,
    /// Multi-period cash-flow projection.
    Projection,
}

impl fmt::Display for CalculationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CalculationKind::Npv => "npv",
            CalculationKind::Irr => "irr",
            CalculationKind::PaybackPeriod => "payback_period",
            CalculationKind::BreakEven => "break_even",
            CalculationKind::Projection => "projection",
        };
        write!(f, "{name}")
    }
}

// =============================================================================
// PARAMETER RECORDS
// =============================================================================

/// Inputs for a net-present-value calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NpvParams {
    /// Periodic cash flows, period 1 first (the initial outlay is separate).
    pub cash_flows: CashFlowSeries,
    /// Per-period discount rate (0.10 = 10%).
    pub discount_rate: f64,
    /// Initial investment at period 0, as a positive outlay.
    pub initial_investment: f64,
}

impl NpvParams {
    /// Validates the scalar inputs.
    pub fn validate(&self) -> CoreResult<()> {
        CoreError::ensure_finite("discount_rate", self.discount_rate)?;
        CoreError::ensure_finite("initial_investment", self.initial_investment)?;
        if self.discount_rate <= -1.0 {
            return Err(CoreError::invalid_parameter(
                "discount_rate",
                "must be greater than -1",
            ));
        }
        Ok(())
    }
}

/// Inputs for an internal-rate-of-return calculation.
///
/// The initial investment is folded into the series, conventionally as a
/// negative flow at period 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrrParams {
    /// Cash flows including the initial outlay at index 0.
    pub cash_flows: CashFlowSeries,
    /// Starting guess for the root search; defaults to 0.1 when absent.
    pub guess: Option<f64>,
}

impl IrrParams {
    /// Validates the scalar inputs.
    pub fn validate(&self) -> CoreResult<()> {
        if let Some(guess) = self.guess {
            CoreError::ensure_finite("guess", guess)?;
            if guess <= -1.0 {
                return Err(CoreError::invalid_parameter(
                    "guess",
                    "must be greater than -1",
                ));
            }
        }
        Ok(())
    }
}

/// Inputs for a payback-period calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaybackParams {
    /// Periodic cash inflows.
    pub cash_flows: CashFlowSeries,
    /// Initial investment to recover.
    pub initial_investment: f64,
}

impl PaybackParams {
    /// Validates the scalar inputs.
    pub fn validate(&self) -> CoreResult<()> {
        CoreError::ensure_finite("initial_investment", self.initial_investment)?;
        Ok(())
    }
}

/// Inputs for a break-even calculation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BreakEvenParams {
    /// Total fixed costs per period.
    pub fixed_costs: f64,
    /// Variable cost per unit sold.
    pub variable_cost_per_unit: f64,
    /// Sale price per unit.
    pub price_per_unit: f64,
}

impl BreakEvenParams {
    /// Validates the scalar inputs.
    pub fn validate(&self) -> CoreResult<()> {
        CoreError::ensure_finite("fixed_costs", self.fixed_costs)?;
        CoreError::ensure_finite("variable_cost_per_unit", self.variable_cost_per_unit)?;
        CoreError::ensure_finite("price_per_unit", self.price_per_unit)?;
        Ok(())
    }
}

/// Inputs for a geometric cash-flow projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectionParams {
    /// Cash flow at period 0, before growth is applied.
    pub base_cash_flow: f64,
    /// Per-period growth rate.
    pub growth_rate: f64,
    /// Number of periods to project (>= 1).
    pub periods: u32,
    /// Per-period discount rate; 0 disables discounting.
    pub discount_rate: f64,
}

impl ProjectionParams {
    /// Validates the scalar inputs.
    pub fn validate(&self) -> CoreResult<()> {
        CoreError::ensure_finite("base_cash_flow", self.base_cash_flow)?;
        CoreError::ensure_finite("growth_rate", self.growth_rate)?;
        CoreError::ensure_finite("discount_rate", self.discount_rate)?;
        if self.periods == 0 {
            return Err(CoreError::invalid_parameter(
                "periods",
                "must be at least 1",
            ));
        }
        if self.discount_rate <= -1.0 {
            return Err(CoreError::invalid_parameter(
                "discount_rate",
                "must be greater than -1",
            ));
        }
        Ok(())
    }
}

// =============================================================================
// PARAMETERS SUM TYPE
// =============================================================================

/// Kind-tagged calculation parameters, one variant per operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "parameters", rename_all = "snake_case")]
pub enum CalculationParameters {
    /// Net present value.
    Npv(NpvParams),
    /// Internal rate of return.
    Irr(IrrParams),
    /// Payback period.
    PaybackPeriod(PaybackParams),
    /// Break-even point.
    BreakEven(BreakEvenParams),
    /// Cash-flow projection.
    Projection(ProjectionParams),
}

impl CalculationParameters {
    /// Returns the operation tag.
    #[must_use]
    pub fn kind(&self) -> CalculationKind {
        match self {
            CalculationParameters::Npv(_) => CalculationKind::Npv,
            CalculationParameters::Irr(_) => CalculationKind::Irr,
            CalculationParameters::PaybackPeriod(_) => CalculationKind::PaybackPeriod,
            CalculationParameters::BreakEven(_) => CalculationKind::BreakEven,
            CalculationParameters::Projection(_) => CalculationKind::Projection,
        }
    }

    /// Validates the variant's scalar inputs.
    ///
    /// Cash-flow series are validated at construction and not re-checked.
    pub fn validate(&self) -> CoreResult<()> {
        match self {
            CalculationParameters::Npv(p) => p.validate(),
            CalculationParameters::Irr(p) => p.validate(),
            CalculationParameters::PaybackPeriod(p) => p.validate(),
            CalculationParameters::BreakEven(p) => p.validate(),
            CalculationParameters::Projection(p) => p.validate(),
        }
    }
}

// =============================================================================
// RESULT RECORDS
// =============================================================================

/// Net-present-value result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NpvResult {
    /// Net present value.
    pub npv: f64,
    /// `(npv + initial_investment) / initial_investment`; absent when the
    /// initial investment is zero.
    pub profitability_index: Option<f64>,
    /// Discounted present value of each periodic flow.
    pub present_values: Vec<f64>,
}

/// Internal-rate-of-return result.
///
/// Non-convergence is a reportable outcome, not a fault: `irr` is `None`,
/// `is_valid` is false and `error` explains why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrrResult {
    /// The converged rate, when found.
    pub irr: Option<f64>,
    /// Whether the search converged.
    pub is_valid: bool,
    /// Iterations used by the root-finder, when it converged.
    pub iterations: Option<u32>,
    /// Explanation when the search did not converge.
    pub error: Option<String>,
}

impl IrrResult {
    /// A converged result.
    #[must_use]
    pub fn converged(irr: f64, iterations: u32) -> Self {
        Self {
            irr: Some(irr),
            is_valid: true,
            iterations: Some(iterations),
            error: None,
        }
    }

    /// A non-converged result with an explanation.
    #[must_use]
    pub fn not_converged(error: impl Into<String>) -> Self {
        Self {
            irr: None,
            is_valid: false,
            iterations: None,
            error: Some(error.into()),
        }
    }
}

/// Payback-period result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaybackResult {
    /// Fractional period at which the cumulative inflows first cover the
    /// investment; `None` when never reached within the series.
    pub payback_period: Option<f64>,
    /// Whether the investment is recovered within the projected life.
    pub is_within_project_life: bool,
    /// Running cumulative sum of the cash flows.
    pub cumulative_cash_flows: Vec<f64>,
}

/// Break-even result.
///
/// A non-positive contribution margin is a business condition: the unit and
/// revenue figures are absent and `error` carries the explanation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakEvenResult {
    /// Units required to break even.
    pub break_even_units: Option<f64>,
    /// Revenue at the break-even point.
    pub break_even_revenue: Option<f64>,
    /// Price per unit minus variable cost per unit.
    pub contribution_margin: f64,
    /// Contribution margin as a fraction of price.
    pub contribution_margin_ratio: f64,
    /// Explanation when break-even is unreachable.
    pub error: Option<String>,
}

/// Cash-flow projection result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionResult {
    /// Projected flow per period, period 1 first.
    pub projected_cash_flows: Vec<f64>,
    /// Present value of each projected flow.
    pub present_values: Vec<f64>,
    /// Sum of the present values.
    pub total_pv: f64,
    /// Growing-perpetuity terminal value, present when the discount rate
    /// exceeds the growth rate.
    pub terminal_value: Option<f64>,
}

/// Kind-tagged calculation output, mirroring [`CalculationParameters`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "result", rename_all = "snake_case")]
pub enum CalculationOutput {
    /// Net present value.
    Npv(NpvResult),
    /// Internal rate of return.
    Irr(IrrResult),
    /// Payback period.
    PaybackPeriod(PaybackResult),
    /// Break-even point.
    BreakEven(BreakEvenResult),
    /// Cash-flow projection.
    Projection(ProjectionResult),
}

impl CalculationOutput {
    /// Returns the operation tag.
    #[must_use]
    pub fn kind(&self) -> CalculationKind {
        match self {
            CalculationOutput::Npv(_) => CalculationKind::Npv,
            CalculationOutput::Irr(_) => CalculationKind::Irr,
            CalculationOutput::PaybackPeriod(_) => CalculationKind::PaybackPeriod,
            CalculationOutput::BreakEven(_) => CalculationKind::BreakEven,
            CalculationOutput::Projection(_) => CalculationKind::Projection,
        }
    }
}
