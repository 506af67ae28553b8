//! The request/result envelope between the dispatcher and the worker.
//!
//! Requests travel one way (dispatcher to worker), results travel the other
//! way, always keyed by an opaque correlation id. Completion order is not
//! submission order; the id is the only routing key.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use appraise_core::{CalculationOutput, CalculationParameters};

/// Opaque token pairing an asynchronous request with its eventual result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CorrelationId(Uuid);

impl CorrelationId {
    /// Allocates a fresh id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A calculation request, immutable once sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationRequest {
    /// Correlation id assigned by the dispatcher immediately before
    /// transmission.
    pub id: CorrelationId,
    /// Kind-tagged parameters.
    pub params: CalculationParameters,
}

/// A calculation result, produced exactly once per request by the worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    /// Correlation id of the originating request.
    pub id: CorrelationId,
    /// Success payload or failure description.
    pub outcome: Result<CalculationOutput, String>,
}

/// Messages accepted by the worker.
#[derive(Debug)]
pub(crate) enum WorkerMessage {
    /// Perform a calculation and reply with its result.
    Calculate(CalculationRequest),
    /// Clean up and acknowledge before exiting.
    Shutdown,
}

/// Messages emitted by the worker.
#[derive(Debug)]
pub(crate) enum WorkerReply {
    /// A finished calculation.
    Result(CalculationResult),
    /// Cleanup acknowledgment: the worker is about to exit.
    ShutdownAck,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correlation_ids_are_unique() {
        let a = CorrelationId::new();
        let b = CorrelationId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_request_serializes_with_id() {
        use appraise_core::{BreakEvenParams, CalculationParameters};

        let request = CalculationRequest {
            id: CorrelationId::new(),
            params: CalculationParameters::BreakEven(BreakEvenParams {
                fixed_costs: 1000.0,
                variable_cost_per_unit: 5.0,
                price_per_unit: 10.0,
            }),
        };

        let json = serde_json::to_string(&request).unwrap();
        let back: CalculationRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, request);
    }
}
