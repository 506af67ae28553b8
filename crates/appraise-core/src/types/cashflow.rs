//! Validated cash-flow series.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, CoreResult};

/// An ordered sequence of signed periodic cash flows.
///
/// Index 0 is the earliest period. Construction enforces the two structural
/// invariants: the series is non-empty, and every value is finite (no
/// NaN/Infinity). Code holding a `CashFlowSeries` never re-validates.
///
/// # Example
///
/// ```rust
/// use appraise_core::CashFlowSeries;
///
/// let flows = CashFlowSeries::new(vec![-1000.0, 500.0, 600.0]).unwrap();
/// assert_eq!(flows.len(), 3);
/// assert_eq!(flows.total(), 100.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct CashFlowSeries {
    values: Vec<f64>,
}

impl CashFlowSeries {
    /// Creates a validated series from raw values.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidCashFlows`] when the series is empty or
    /// contains a non-finite value.
    pub fn new(values: Vec<f64>) -> CoreResult<Self> {
        if values.is_empty() {
            return Err(CoreError::invalid_cash_flows("series is empty"));
        }
        if let Some((index, value)) = values
            .iter()
            .enumerate()
            .find(|(_, v)| !v.is_finite())
        {
            return Err(CoreError::invalid_cash_flows(format!(
                "non-finite value {value} at period {index}"
            )));
        }
        Ok(Self { values })
    }

    /// Creates a validated series from a slice.
    pub fn from_slice(values: &[f64]) -> CoreResult<Self> {
        Self::new(values.to_vec())
    }

    /// Returns the number of periods.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false — an empty series cannot be constructed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the flows as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Returns an iterator over the flows.
    pub fn iter(&self) -> impl Iterator<Item = &f64> {
        self.values.iter()
    }

    /// Returns the undiscounted sum of all flows.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }

    /// Returns the flow at `period`, if present.
    #[must_use]
    pub fn get(&self, period: usize) -> Option<f64> {
        self.values.get(period).copied()
    }

    /// Returns a new series with every flow multiplied by `factor`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidCashFlows`] when the scaled values are no
    /// longer finite (overflowing factor).
    pub fn scaled(&self, factor: f64) -> CoreResult<Self> {
        Self::new(self.values.iter().map(|v| v * factor).collect())
    }
}

impl TryFrom<Vec<f64>> for CashFlowSeries {
    type Error = CoreError;

    fn try_from(values: Vec<f64>) -> CoreResult<Self> {
        Self::new(values)
    }
}

impl From<CashFlowSeries> for Vec<f64> {
    fn from(series: CashFlowSeries) -> Self {
        series.values
    }
}

impl fmt::Display for CashFlowSeries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} periods, total {}", self.values.len(), self.total())
    }
}
