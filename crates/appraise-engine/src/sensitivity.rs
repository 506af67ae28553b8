//! Sensitivity analysis over NPV.
//!
//! A closed vocabulary of operations: pick one variable, shift it by a
//! series of relative steps, and price the whole grid as a batch. No
//! user-supplied code crosses the engine boundary.

use serde::{Deserialize, Serialize};

use appraise_core::{CalculationOutput, CalculationParameters, NpvParams, SimulationVariable};

use crate::batch::batch_calculate;
use crate::dispatch::Dispatcher;
use crate::montecarlo::overlay;

/// NPV at one relative step of the varied input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityPoint {
    /// The relative step applied, e.g. -0.1 for a 10% reduction.
    pub step: f64,
    /// Whether the shifted case priced successfully.
    pub success: bool,
    /// NPV of the shifted case, when successful.
    pub npv: Option<f64>,
    /// The failure description otherwise.
    pub error: Option<String>,
}

/// Prices the base case under relative shifts of one variable.
///
/// Each step multiplies the variable's base value by `1 + step` (for
/// [`SimulationVariable::CashFlowScale`] the base value is 1). Output order
/// matches the step order; a step that shifts the variable out of domain
/// fails alone.
pub async fn sensitivity_analysis(
    dispatcher: &Dispatcher,
    base_case: &NpvParams,
    variable: SimulationVariable,
    steps: &[f64],
) -> Vec<SensitivityPoint> {
    let requests: Vec<CalculationParameters> = steps
        .iter()
        .map(|step| {
            let mut shifted = base_case.clone();
            let value = match variable {
                SimulationVariable::DiscountRate => base_case.discount_rate * (1.0 + step),
                SimulationVariable::InitialInvestment => {
                    base_case.initial_investment * (1.0 + step)
                }
                SimulationVariable::CashFlowScale => 1.0 + step,
            };
            overlay(&mut shifted, variable, value);
            CalculationParameters::Npv(shifted)
        })
        .collect();

    let items = batch_calculate(dispatcher, requests).await;

    steps
        .iter()
        .zip(items)
        .map(|(step, item)| match item.result {
            Some(CalculationOutput::Npv(result)) if item.success => SensitivityPoint {
                step: *step,
                success: true,
                npv: Some(result.npv),
                error: None,
            },
            _ => SensitivityPoint {
                step: *step,
                success: false,
                npv: None,
                error: item.error,
            },
        })
        .collect()
}
