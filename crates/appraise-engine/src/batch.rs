//! Batch and scenario orchestration.
//!
//! A batch is a join over N independent dispatches: every element resolves
//! on its own, the output preserves input order, and one element's failure
//! never fails the whole.

use std::collections::BTreeMap;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::debug;

use appraise_core::{CalculationKind, CalculationOutput, CalculationParameters, NpvParams, NpvResult};

use crate::dispatch::Dispatcher;

/// Named NPV inputs for a scenario comparison. Each entry is evaluated
/// independently; iteration order never affects correctness.
pub type ScenarioSet = BTreeMap<String, NpvParams>;

/// Outcome of one batch element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchItem {
    /// The operation tag of the originating request.
    pub kind: CalculationKind,
    /// Whether the element produced a result.
    pub success: bool,
    /// The result, when successful.
    pub result: Option<CalculationOutput>,
    /// The failure description otherwise.
    pub error: Option<String>,
}

impl BatchItem {
    fn success(kind: CalculationKind, output: CalculationOutput) -> Self {
        Self {
            kind,
            success: true,
            result: Some(output),
            error: None,
        }
    }

    fn failure(kind: CalculationKind, error: impl Into<String>) -> Self {
        Self {
            kind,
            success: false,
            result: None,
            error: Some(error.into()),
        }
    }
}

/// Outcome of one named scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    /// Whether the scenario priced successfully.
    pub success: bool,
    /// The NPV result, when successful.
    pub result: Option<NpvResult>,
    /// The failure description otherwise.
    pub error: Option<String>,
}

/// Issues all requests concurrently and collects per-element outcomes in
/// input order.
pub async fn batch_calculate(
    dispatcher: &Dispatcher,
    requests: Vec<CalculationParameters>,
) -> Vec<BatchItem> {
    debug!(count = requests.len(), "dispatching batch");

    let sends = requests.into_iter().map(|params| {
        let kind = params.kind();
        async move {
            match dispatcher.send(params, None).await {
                Ok(output) => BatchItem::success(kind, output),
                Err(error) => BatchItem::failure(kind, error.to_string()),
            }
        }
    });

    join_all(sends).await
}

/// Prices every scenario's NPV through one batch and reassociates the
/// outcomes with their scenario names.
pub async fn scenario_npv(
    dispatcher: &Dispatcher,
    scenarios: ScenarioSet,
) -> BTreeMap<String, ScenarioOutcome> {
    let (names, requests): (Vec<String>, Vec<CalculationParameters>) = scenarios
        .into_iter()
        .map(|(name, params)| (name, CalculationParameters::Npv(params)))
        .unzip();

    let items = batch_calculate(dispatcher, requests).await;

    names
        .into_iter()
        .zip(items)
        .map(|(name, item)| {
            let outcome = match item.result {
                Some(CalculationOutput::Npv(result)) if item.success => ScenarioOutcome {
                    success: true,
                    result: Some(result),
                    error: None,
                },
                _ => ScenarioOutcome {
                    success: false,
                    result: None,
                    error: item
                        .error
                        .or_else(|| Some("unexpected calculation output".to_string())),
                },
            };
            (name, outcome)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use appraise_core::{BreakEvenParams, CashFlowSeries, IrrParams, PaybackParams};

    fn flows(values: &[f64]) -> CashFlowSeries {
        CashFlowSeries::from_slice(values).unwrap()
    }

    fn npv_params(rate: f64) -> NpvParams {
        NpvParams {
            cash_flows: flows(&[100.0, 100.0, 100.0]),
            discount_rate: rate,
            initial_investment: 200.0,
        }
    }

    #[tokio::test]
    async fn test_batch_preserves_order_and_length() {
        let dispatcher = Dispatcher::new(Duration::from_secs(5));

        let requests = vec![
            CalculationParameters::Npv(npv_params(0.1)),
            CalculationParameters::Irr(IrrParams {
                cash_flows: flows(&[-1000.0, 600.0, 600.0]),
                guess: None,
            }),
            CalculationParameters::BreakEven(BreakEvenParams {
                fixed_costs: 500_000.0,
                variable_cost_per_unit: 50.0,
                price_per_unit: 100.0,
            }),
            CalculationParameters::PaybackPeriod(PaybackParams {
                cash_flows: flows(&[200.0, 200.0, 200.0, 200.0]),
                initial_investment: 400.0,
            }),
        ];

        let items = batch_calculate(&dispatcher, requests).await;

        assert_eq!(items.len(), 4);
        assert_eq!(items[0].kind, CalculationKind::Npv);
        assert_eq!(items[1].kind, CalculationKind::Irr);
        assert_eq!(items[2].kind, CalculationKind::BreakEven);
        assert_eq!(items[3].kind, CalculationKind::PaybackPeriod);
        assert!(items.iter().all(|i| i.success));

        dispatcher.shutdown().await;
    }

    #[tokio::test]
    async fn test_batch_partial_failure() {
        let dispatcher = Dispatcher::new(Duration::from_secs(5));

        let requests = vec![
            CalculationParameters::Npv(npv_params(0.1)),
            // Invalid rate fails this element only
            CalculationParameters::Npv(npv_params(-3.0)),
            CalculationParameters::Npv(npv_params(0.2)),
        ];

        let items = batch_calculate(&dispatcher, requests).await;

        assert_eq!(items.len(), 3);
        assert!(items[0].success);
        assert!(!items[1].success);
        assert!(items[1].error.is_some());
        assert!(items[2].success);

        dispatcher.shutdown().await;
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let dispatcher = Dispatcher::new(Duration::from_secs(5));
        let items = batch_calculate(&dispatcher, vec![]).await;
        assert!(items.is_empty());
        dispatcher.shutdown().await;
    }

    #[tokio::test]
    async fn test_scenario_npv_reassociates_names() {
        let dispatcher = Dispatcher::new(Duration::from_secs(5));

        let mut scenarios = ScenarioSet::new();
        scenarios.insert("optimistic".to_string(), npv_params(0.05));
        scenarios.insert("base".to_string(), npv_params(0.10));
        scenarios.insert("pessimistic".to_string(), npv_params(0.20));

        let outcomes = scenario_npv(&dispatcher, scenarios).await;

        assert_eq!(outcomes.len(), 3);
        for name in ["optimistic", "base", "pessimistic"] {
            assert!(outcomes[name].success, "scenario {name} failed");
        }
        // A lower discount rate values the same flows higher
        let optimistic = outcomes["optimistic"].result.as_ref().unwrap().npv;
        let pessimistic = outcomes["pessimistic"].result.as_ref().unwrap().npv;
        assert!(optimistic > pessimistic);

        dispatcher.shutdown().await;
    }
}
