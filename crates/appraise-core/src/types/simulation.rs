//! Monte Carlo simulation parameter and result types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{CoreError, CoreResult};
use crate::types::NpvParams;

// =============================================================================
// DISTRIBUTIONS
// =============================================================================

/// A bounded sampling distribution for one simulation variable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Distribution {
    /// Uniform over `[min, max]`.
    Uniform {
        /// Lower bound.
        min: f64,
        /// Upper bound.
        max: f64,
    },
    /// Normal parameterized by its bounds: mean `(min+max)/2`, standard
    /// deviation `(max-min)/6`, so ~99.7% of draws fall inside `[min, max]`.
    Normal {
        /// Lower bound.
        min: f64,
        /// Upper bound.
        max: f64,
    },
}

impl Distribution {
    /// Validates the bounds.
    pub fn validate(&self) -> CoreResult<()> {
        let (min, max) = self.bounds();
        CoreError::ensure_finite("min", min)?;
        CoreError::ensure_finite("max", max)?;
        if min > max {
            return Err(CoreError::invalid_parameter(
                "bounds",
                format!("min {min} exceeds max {max}"),
            ));
        }
        Ok(())
    }

    /// Returns `(min, max)`.
    #[must_use]
    pub fn bounds(&self) -> (f64, f64) {
        match *self {
            Distribution::Uniform { min, max } | Distribution::Normal { min, max } => (min, max),
        }
    }

    /// Mean implied by the bounds.
    #[must_use]
    pub fn mean(&self) -> f64 {
        let (min, max) = self.bounds();
        (min + max) / 2.0
    }

    /// Standard deviation implied by the bounds.
    #[must_use]
    pub fn std_dev(&self) -> f64 {
        let (min, max) = self.bounds();
        (max - min) / 6.0
    }
}

// =============================================================================
// SIMULATION VARIABLES
// =============================================================================

/// The closed vocabulary of NPV inputs a simulation may randomize.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SimulationVariable {
    /// Overrides the discount rate.
    DiscountRate,
    /// Overrides the initial investment.
    InitialInvestment,
    /// Multiplies every periodic cash flow.
    CashFlowScale,
}

impl fmt::Display for SimulationVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SimulationVariable::DiscountRate => "discount_rate",
            SimulationVariable::InitialInvestment => "initial_investment",
            SimulationVariable::CashFlowScale => "cash_flow_scale",
        };
        write!(f, "{name}")
    }
}

// =============================================================================
// SIMULATION PARAMETERS
// =============================================================================

/// Configuration for one Monte Carlo run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationParameters {
    /// NPV inputs the draws are overlaid onto.
    pub base_case: NpvParams,
    /// Variables to randomize, each with its distribution.
    pub variables: BTreeMap<SimulationVariable, Distribution>,
    /// Number of draws to price.
    pub iterations: usize,
    /// Two-sided confidence level in (0, 1), e.g. 0.95.
    pub confidence_level: f64,
    /// RNG seed for reproducible runs; entropy-seeded when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl SimulationParameters {
    /// Validates the whole configuration.
    pub fn validate(&self) -> CoreResult<()> {
        self.base_case.validate()?;
        if self.iterations == 0 {
            return Err(CoreError::invalid_parameter(
                "iterations",
                "must be at least 1",
            ));
        }
        CoreError::ensure_finite("confidence_level", self.confidence_level)?;
        if self.confidence_level <= 0.0 || self.confidence_level >= 1.0 {
            return Err(CoreError::invalid_parameter(
                "confidence_level",
                "must be strictly between 0 and 1",
            ));
        }
        for dist in self.variables.values() {
            dist.validate()?;
        }
        Ok(())
    }
}

// =============================================================================
// SIMULATION RESULT
// =============================================================================

/// Percentile-bounded range of simulated outcomes at a stated probability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    /// The confidence level, e.g. 0.95.
    pub level: f64,
    /// Lower bound.
    pub lower: f64,
    /// Upper bound.
    pub upper: f64,
}

/// Fixed percentile snapshot of the simulated value set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Percentiles {
    /// 5th percentile.
    pub p5: f64,
    /// 25th percentile.
    pub p25: f64,
    /// 75th percentile.
    pub p75: f64,
    /// 95th percentile.
    pub p95: f64,
}

/// Descriptive statistics over the successful simulation draws.
///
/// Derived, read-only, recomputed fresh per run. When no draw succeeded
/// every statistic is `None` and `successful_iterations` is zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Draws requested.
    pub iterations: usize,
    /// Draws that priced successfully.
    pub successful_iterations: usize,
    /// Arithmetic mean of the successful NPVs.
    pub mean: Option<f64>,
    /// Median of the successful NPVs.
    pub median: Option<f64>,
    /// Population standard deviation.
    pub std_dev: Option<f64>,
    /// Smallest NPV observed.
    pub minimum: Option<f64>,
    /// Largest NPV observed.
    pub maximum: Option<f64>,
    /// Two-sided confidence interval at the requested level.
    pub confidence_interval: Option<ConfidenceInterval>,
    /// Fixed percentiles of the NPV distribution.
    pub percentiles: Option<Percentiles>,
    /// Fraction of successful draws with NPV > 0.
    pub probability_of_success: Option<f64>,
}

impl SimulationResult {
    /// The degenerate result for a run where no draw succeeded.
    #[must_use]
    pub fn empty(iterations: usize) -> Self {
        Self {
            iterations,
            successful_iterations: 0,
            mean: None,
            median: None,
            std_dev: None,
            minimum: None,
            maximum: None,
            confidence_interval: None,
            percentiles: None,
            probability_of_success: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CashFlowSeries;
    use approx::assert_relative_eq;

    fn base_case() -> NpvParams {
        NpvParams {
            cash_flows: CashFlowSeries::new(vec![100.0, 100.0, 100.0]).unwrap(),
            discount_rate: 0.1,
            initial_investment: 200.0,
        }
    }

    #[test]
    fn test_distribution_moments() {
        let dist = Distribution::Normal {
            min: 0.05,
            max: 0.17,
        };
        assert_relative_eq!(dist.mean(), 0.11, epsilon = 1e-12);
        assert_relative_eq!(dist.std_dev(), 0.02, epsilon = 1e-12);
    }

    #[test]
    fn test_distribution_bounds_validation() {
        let dist = Distribution::Uniform { min: 2.0, max: 1.0 };
        assert!(dist.validate().is_err());
        assert!(Distribution::Uniform {
            min: f64::NAN,
            max: 1.0
        }
        .validate()
        .is_err());
    }

    #[test]
    fn test_simulation_parameters_validation() {
        let mut params = SimulationParameters {
            base_case: base_case(),
            variables: BTreeMap::new(),
            iterations: 100,
            confidence_level: 0.95,
            seed: None,
        };
        assert!(params.validate().is_ok());

        params.iterations = 0;
        assert!(params.validate().is_err());

        params.iterations = 100;
        params.confidence_level = 1.0;
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_empty_result() {
        let result = SimulationResult::empty(50);
        assert_eq!(result.iterations, 50);
        assert_eq!(result.successful_iterations, 0);
        assert!(result.mean.is_none());
        assert!(result.confidence_interval.is_none());
    }
}
