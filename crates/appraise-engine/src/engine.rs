//! High-level engine facade.
//!
//! [`AppraisalEngine`] is the composition-root-owned entry point: explicit
//! construction, explicit lifecycle, and one method per exposed metric. It
//! validates inputs before dispatch, consults the result cache for
//! single-metric calls, and delegates orchestration to the batch, scenario,
//! Monte Carlo and sensitivity modules.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use appraise_core::{
    BreakEvenParams, BreakEvenResult, CalculationOutput, CalculationParameters, CashFlowSeries,
    IrrParams, IrrResult, NpvParams, NpvResult, PaybackParams, PaybackResult, ProjectionParams,
    ProjectionResult, SimulationParameters, SimulationResult, SimulationVariable,
};

use crate::batch::{self, BatchItem, ScenarioOutcome, ScenarioSet};
use crate::cache::{CacheStats, CalculationCache};
use crate::config::EngineConfig;
use crate::dispatch::Dispatcher;
use crate::error::{EngineError, EngineResult};
use crate::montecarlo;
use crate::sensitivity::{self, SensitivityPoint};

/// Observability snapshot of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineStatus {
    /// Whether the execution context is currently alive.
    pub is_initialized: bool,
    /// Calculations awaiting a result right now.
    pub pending_calculations: usize,
    /// Calculations dispatched over the engine's lifetime.
    pub total_calculations: u64,
    /// Calculations that resolved successfully.
    pub completed: u64,
    /// Calculations that resolved with a failure.
    pub failed: u64,
    /// Calculations whose timeout elapsed first.
    pub timed_out: u64,
    /// Result cache counters.
    pub cache: CacheStats,
}

/// The asynchronous investment-appraisal engine.
///
/// # Example
///
/// ```rust,ignore
/// use appraise_engine::{AppraisalEngine, EngineConfig};
///
/// let engine = AppraisalEngine::new(EngineConfig::default());
/// let result = engine.calculate_npv(vec![100.0, 100.0, 100.0], 0.10, 200.0).await?;
/// println!("NPV: {}", result.npv);
/// engine.shutdown().await;
/// ```
pub struct AppraisalEngine {
    config: EngineConfig,
    dispatcher: Dispatcher,
    cache: CalculationCache,
}

impl AppraisalEngine {
    /// Creates an engine; the execution context starts lazily on first use.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        let dispatcher = Dispatcher::new(config.default_timeout);
        let cache = CalculationCache::new(config.cache_ttl);
        Self {
            config,
            dispatcher,
            cache,
        }
    }

    /// Creates an engine with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(EngineConfig::default())
    }

    /// Returns the engine configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Starts the execution context eagerly.
    ///
    /// Optional: any calculation starts it on demand.
    pub async fn start(&self) -> EngineResult<()> {
        self.dispatcher.start().await
    }

    // =========================================================================
    // SINGLE-METRIC CALCULATIONS
    // =========================================================================

    /// Calculates net present value.
    pub async fn calculate_npv(
        &self,
        cash_flows: Vec<f64>,
        discount_rate: f64,
        initial_investment: f64,
    ) -> EngineResult<NpvResult> {
        let params = CalculationParameters::Npv(NpvParams {
            cash_flows: CashFlowSeries::new(cash_flows)?,
            discount_rate,
            initial_investment,
        });
        match self.dispatch_cached(params).await? {
            CalculationOutput::Npv(result) => Ok(result),
            other => Err(unexpected_output(other)),
        }
    }

    /// Calculates the internal rate of return.
    ///
    /// The series carries the initial outlay at index 0, conventionally
    /// negative. Non-convergence is reported inside the result.
    pub async fn calculate_irr(
        &self,
        cash_flows: Vec<f64>,
        guess: Option<f64>,
    ) -> EngineResult<IrrResult> {
        let params = CalculationParameters::Irr(IrrParams {
            cash_flows: CashFlowSeries::new(cash_flows)?,
            guess,
        });
        match self.dispatch_cached(params).await? {
            CalculationOutput::Irr(result) => Ok(result),
            other => Err(unexpected_output(other)),
        }
    }

    /// Calculates the payback period.
    pub async fn calculate_payback_period(
        &self,
        cash_flows: Vec<f64>,
        initial_investment: f64,
    ) -> EngineResult<PaybackResult> {
        let params = CalculationParameters::PaybackPeriod(PaybackParams {
            cash_flows: CashFlowSeries::new(cash_flows)?,
            initial_investment,
        });
        match self.dispatch_cached(params).await? {
            CalculationOutput::PaybackPeriod(result) => Ok(result),
            other => Err(unexpected_output(other)),
        }
    }

    /// Calculates the break-even point.
    pub async fn calculate_break_even(
        &self,
        fixed_costs: f64,
        variable_cost_per_unit: f64,
        price_per_unit: f64,
    ) -> EngineResult<BreakEvenResult> {
        let params = CalculationParameters::BreakEven(BreakEvenParams {
            fixed_costs,
            variable_cost_per_unit,
            price_per_unit,
        });
        match self.dispatch_cached(params).await? {
            CalculationOutput::BreakEven(result) => Ok(result),
            other => Err(unexpected_output(other)),
        }
    }

    /// Projects a geometric cash-flow series.
    pub async fn project_cash_flows(
        &self,
        base_cash_flow: f64,
        growth_rate: f64,
        periods: u32,
        discount_rate: f64,
    ) -> EngineResult<ProjectionResult> {
        let params = CalculationParameters::Projection(ProjectionParams {
            base_cash_flow,
            growth_rate,
            periods,
            discount_rate,
        });
        match self.dispatch_cached(params).await? {
            CalculationOutput::Projection(result) => Ok(result),
            other => Err(unexpected_output(other)),
        }
    }

    // =========================================================================
    // ORCHESTRATION
    // =========================================================================

    /// Issues a heterogeneous batch; output order equals input order and
    /// each element carries its own outcome.
    pub async fn batch_calculate(&self, requests: Vec<CalculationParameters>) -> Vec<BatchItem> {
        batch::batch_calculate(&self.dispatcher, requests).await
    }

    /// Prices every named scenario's NPV independently.
    pub async fn calculate_scenario_npv(
        &self,
        scenarios: ScenarioSet,
    ) -> BTreeMap<String, ScenarioOutcome> {
        batch::scenario_npv(&self.dispatcher, scenarios).await
    }

    /// Runs a Monte Carlo simulation over NPV.
    pub async fn monte_carlo_simulation(
        &self,
        parameters: SimulationParameters,
    ) -> EngineResult<SimulationResult> {
        montecarlo::monte_carlo_simulation(&self.dispatcher, parameters).await
    }

    /// Prices the base case under relative shifts of one variable.
    pub async fn sensitivity_analysis(
        &self,
        base_case: &NpvParams,
        variable: SimulationVariable,
        steps: &[f64],
    ) -> Vec<SensitivityPoint> {
        sensitivity::sensitivity_analysis(&self.dispatcher, base_case, variable, steps).await
    }

    // =========================================================================
    // LIFECYCLE & OBSERVABILITY
    // =========================================================================

    /// Returns the observability snapshot. Never use it for control flow.
    #[must_use]
    pub fn status(&self) -> EngineStatus {
        let dispatch = self.dispatcher.status();
        EngineStatus {
            is_initialized: dispatch.started,
            pending_calculations: dispatch.pending_count,
            total_calculations: dispatch.total_requests,
            completed: dispatch.completed,
            failed: dispatch.failed,
            timed_out: dispatch.timed_out,
            cache: self.cache.stats(),
        }
    }

    /// Idempotent teardown: stops the execution context, rejects anything
    /// outstanding and clears the result cache. A later calculation starts
    /// a fresh context.
    pub async fn shutdown(&self) {
        info!("engine shutdown requested");
        self.dispatcher.shutdown().await;
        self.cache.clear();
    }

    async fn dispatch_cached(
        &self,
        params: CalculationParameters,
    ) -> EngineResult<CalculationOutput> {
        params.validate()?;

        if self.config.cache_enabled {
            if let Some(output) = self.cache.get(&params) {
                return Ok(output);
            }
            let output = self.dispatcher.send(params.clone(), None).await?;
            self.cache.insert(&params, output.clone());
            Ok(output)
        } else {
            self.dispatcher.send(params, None).await
        }
    }
}

fn unexpected_output(output: CalculationOutput) -> EngineError {
    EngineError::Internal(format!(
        "worker answered with a {} payload for a different request kind",
        output.kind()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_validation_happens_before_dispatch() {
        let engine = AppraisalEngine::new(EngineConfig::minimal());

        let error = engine
            .calculate_npv(vec![], 0.1, 100.0)
            .await
            .unwrap_err();
        assert!(matches!(error, EngineError::Validation(_)));

        // Nothing was dispatched and the context never started
        let status = engine.status();
        assert!(!status.is_initialized);
        assert_eq!(status.total_calculations, 0);
    }

    #[tokio::test]
    async fn test_cache_serves_repeat_calls() {
        let mut config = EngineConfig::minimal();
        config.cache_enabled = true;
        let engine = AppraisalEngine::new(config);

        let first = engine
            .calculate_break_even(500_000.0, 50.0, 100.0)
            .await
            .unwrap();
        let second = engine
            .calculate_break_even(500_000.0, 50.0, 100.0)
            .await
            .unwrap();

        assert_eq!(first, second);
        let status = engine.status();
        assert_eq!(status.total_calculations, 1);
        assert_eq!(status.cache.hits, 1);

        engine.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_clears_cache() {
        let mut config = EngineConfig::minimal();
        config.cache_enabled = true;
        let engine = AppraisalEngine::new(config);

        engine
            .calculate_break_even(500_000.0, 50.0, 100.0)
            .await
            .unwrap();
        assert_eq!(engine.status().cache.entries, 1);

        engine.shutdown().await;
        assert_eq!(engine.status().cache.entries, 0);
    }
}
