//! Monte Carlo simulation over NPV.
//!
//! Each iteration samples every configured variable from its distribution,
//! overlays the draw onto a copy of the base case and prices it through the
//! batch orchestrator. Failed draws are discarded from the reduction but
//! reported through the success count.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

use appraise_core::{
    CalculationOutput, CalculationParameters, ConfidenceInterval, Distribution, NpvParams,
    Percentiles, SimulationParameters, SimulationResult, SimulationVariable,
};
use appraise_math::stats;

use crate::batch::batch_calculate;
use crate::dispatch::Dispatcher;
use crate::error::EngineResult;

/// Runs one Monte Carlo simulation.
///
/// # Errors
///
/// Returns a validation error for malformed parameters. A run where every
/// draw fails is not an error: the result carries a zero success count and
/// no statistics.
pub async fn monte_carlo_simulation(
    dispatcher: &Dispatcher,
    params: SimulationParameters,
) -> EngineResult<SimulationResult> {
    params.validate()?;

    let mut rng = match params.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    debug!(
        iterations = params.iterations,
        variables = params.variables.len(),
        "starting simulation"
    );

    let mut requests = Vec::with_capacity(params.iterations);
    for _ in 0..params.iterations {
        let mut draw = params.base_case.clone();
        for (variable, dist) in &params.variables {
            overlay(&mut draw, *variable, sample(dist, &mut rng));
        }
        requests.push(CalculationParameters::Npv(draw));
    }

    let items = batch_calculate(dispatcher, requests).await;

    let mut npvs: Vec<f64> = items
        .into_iter()
        .filter_map(|item| match item.result {
            Some(CalculationOutput::Npv(result)) if item.success => Some(result.npv),
            _ => None,
        })
        .collect();

    let successful = npvs.len();
    if successful == 0 {
        warn!("no simulation draw priced successfully");
        return Ok(SimulationResult::empty(params.iterations));
    }
    if successful < params.iterations {
        debug!(
            failed = params.iterations - successful,
            "discarded failed draws"
        );
    }

    npvs = stats::sorted(&npvs);
    Ok(reduce(&npvs, params.iterations, params.confidence_level))
}

/// Applies one sampled value onto the draw's parameters.
pub(crate) fn overlay(draw: &mut NpvParams, variable: SimulationVariable, value: f64) {
    match variable {
        SimulationVariable::DiscountRate => draw.discount_rate = value,
        SimulationVariable::InitialInvestment => draw.initial_investment = value,
        SimulationVariable::CashFlowScale => {
            // A draw that scales the flows out of range fails downstream
            // validation and is discarded like any failed draw
            if let Ok(scaled) = draw.cash_flows.scaled(value) {
                draw.cash_flows = scaled;
            }
        }
    }
}

/// Samples one value from a distribution.
///
/// Uniform draws are `min + U(0,1) * (max - min)`. Normal draws use the
/// Box-Muller transform with the distribution's bound-implied moments, so
/// ~99.7% of them land inside `[min, max]`.
fn sample(dist: &Distribution, rng: &mut StdRng) -> f64 {
    match *dist {
        Distribution::Uniform { min, max } => min + rng.gen::<f64>() * (max - min),
        Distribution::Normal { .. } => {
            let u1: f64 = 1.0 - rng.gen::<f64>(); // (0, 1], keeps ln finite
            let u2: f64 = rng.gen();
            let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
            dist.mean() + dist.std_dev() * z
        }
    }
}

/// Reduces the sorted NPV sample into descriptive statistics.
fn reduce(sorted_npvs: &[f64], iterations: usize, confidence_level: f64) -> SimulationResult {
    let n = sorted_npvs.len();
    let alpha = (1.0 - confidence_level) / 2.0;

    let percentiles = Percentiles {
        p5: stats::percentile_sorted(sorted_npvs, 0.05).unwrap_or_default(),
        p25: stats::percentile_sorted(sorted_npvs, 0.25).unwrap_or_default(),
        p75: stats::percentile_sorted(sorted_npvs, 0.75).unwrap_or_default(),
        p95: stats::percentile_sorted(sorted_npvs, 0.95).unwrap_or_default(),
    };
    let confidence_interval = ConfidenceInterval {
        level: confidence_level,
        lower: stats::percentile_sorted(sorted_npvs, alpha).unwrap_or_default(),
        upper: stats::percentile_sorted(sorted_npvs, 1.0 - alpha).unwrap_or_default(),
    };
    let positive = sorted_npvs.iter().filter(|v| **v > 0.0).count();

    SimulationResult {
        iterations,
        successful_iterations: n,
        mean: stats::mean(sorted_npvs),
        median: stats::median_sorted(sorted_npvs),
        std_dev: stats::population_std_dev(sorted_npvs),
        minimum: sorted_npvs.first().copied(),
        maximum: sorted_npvs.last().copied(),
        confidence_interval: Some(confidence_interval),
        percentiles: Some(percentiles),
        probability_of_success: Some(positive as f64 / n as f64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::time::Duration;

    use appraise_core::CashFlowSeries;

    fn base_case() -> NpvParams {
        NpvParams {
            cash_flows: CashFlowSeries::new(vec![500.0, 500.0, 500.0, 500.0]).unwrap(),
            discount_rate: 0.10,
            initial_investment: 1000.0,
        }
    }

    fn simulation(iterations: usize, seed: u64) -> SimulationParameters {
        let mut variables = BTreeMap::new();
        variables.insert(
            SimulationVariable::DiscountRate,
            Distribution::Uniform {
                min: 0.05,
                max: 0.15,
            },
        );
        variables.insert(
            SimulationVariable::CashFlowScale,
            Distribution::Normal { min: 0.8, max: 1.2 },
        );
        SimulationParameters {
            base_case: base_case(),
            variables,
            iterations,
            confidence_level: 0.95,
            seed: Some(seed),
        }
    }

    #[test]
    fn test_uniform_sample_within_bounds() {
        let dist = Distribution::Uniform { min: 2.0, max: 5.0 };
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let v = sample(&dist, &mut rng);
            assert!((2.0..=5.0).contains(&v));
        }
    }

    #[test]
    fn test_normal_sample_moments() {
        let dist = Distribution::Normal { min: 0.0, max: 6.0 };
        let mut rng = StdRng::seed_from_u64(11);
        let draws: Vec<f64> = (0..20_000).map(|_| sample(&dist, &mut rng)).collect();

        let mean = stats::mean(&draws).unwrap();
        let std_dev = stats::population_std_dev(&draws).unwrap();
        assert!((mean - 3.0).abs() < 0.05);
        assert!((std_dev - 1.0).abs() < 0.05);
    }

    #[test]
    fn test_overlay_variables() {
        let mut draw = base_case();
        overlay(&mut draw, SimulationVariable::DiscountRate, 0.2);
        overlay(&mut draw, SimulationVariable::InitialInvestment, 500.0);
        overlay(&mut draw, SimulationVariable::CashFlowScale, 2.0);

        assert_eq!(draw.discount_rate, 0.2);
        assert_eq!(draw.initial_investment, 500.0);
        assert_eq!(draw.cash_flows.get(0), Some(1000.0));
    }

    #[test]
    fn test_reduce_orders_percentiles() {
        let sorted: Vec<f64> = (1..=100).map(f64::from).collect();
        let result = reduce(&sorted, 100, 0.9);

        let p = result.percentiles.unwrap();
        let median = result.median.unwrap();
        assert!(p.p5 <= p.p25 && p.p25 <= median && median <= p.p75 && p.p75 <= p.p95);

        let ci = result.confidence_interval.unwrap();
        assert!(ci.lower <= ci.upper);
        assert!((ci.level - 0.9).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_simulation_end_to_end() {
        let dispatcher = Dispatcher::new(Duration::from_secs(10));

        let result = monte_carlo_simulation(&dispatcher, simulation(200, 42))
            .await
            .unwrap();

        assert_eq!(result.iterations, 200);
        assert!(result.successful_iterations <= 200);
        assert!(result.successful_iterations > 0);
        assert!(result.minimum.unwrap() <= result.median.unwrap());
        assert!(result.median.unwrap() <= result.maximum.unwrap());
        assert!(result.std_dev.unwrap() >= 0.0);
        let prob = result.probability_of_success.unwrap();
        assert!((0.0..=1.0).contains(&prob));

        dispatcher.shutdown().await;
    }

    #[tokio::test]
    async fn test_simulation_is_reproducible_with_seed() {
        let dispatcher = Dispatcher::new(Duration::from_secs(10));

        let first = monte_carlo_simulation(&dispatcher, simulation(100, 9))
            .await
            .unwrap();
        let second = monte_carlo_simulation(&dispatcher, simulation(100, 9))
            .await
            .unwrap();

        assert_eq!(first, second);

        dispatcher.shutdown().await;
    }

    #[tokio::test]
    async fn test_simulation_rejects_bad_confidence() {
        let dispatcher = Dispatcher::new(Duration::from_secs(5));
        let mut params = simulation(10, 1);
        params.confidence_level = 1.5;

        assert!(monte_carlo_simulation(&dispatcher, params).await.is_err());
        dispatcher.shutdown().await;
    }

    #[tokio::test]
    async fn test_all_draws_failing_yields_empty_result() {
        let dispatcher = Dispatcher::new(Duration::from_secs(5));

        // Every draw lands on an out-of-domain discount rate
        let mut variables = BTreeMap::new();
        variables.insert(
            SimulationVariable::DiscountRate,
            Distribution::Uniform {
                min: -5.0,
                max: -4.0,
            },
        );
        let params = SimulationParameters {
            base_case: base_case(),
            variables,
            iterations: 25,
            confidence_level: 0.95,
            seed: Some(3),
        };

        let result = monte_carlo_simulation(&dispatcher, params).await.unwrap();
        assert_eq!(result.iterations, 25);
        assert_eq!(result.successful_iterations, 0);
        assert!(result.mean.is_none());
        assert!(result.percentiles.is_none());

        dispatcher.shutdown().await;
    }
}
