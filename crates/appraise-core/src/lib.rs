//! # Appraise Core
//!
//! Core types and error taxonomy for the Appraise investment appraisal
//! library.
//!
//! This crate provides the foundational building blocks used throughout
//! Appraise:
//!
//! - **Cash flows**: the validated [`CashFlowSeries`] type — finite length,
//!   finite values, index 0 is the earliest period
//! - **Calculation payloads**: the [`CalculationParameters`] /
//!   [`CalculationOutput`] sum types, one variant per metric
//! - **Simulation types**: distributions, simulation parameters and the
//!   derived [`SimulationResult`] value object
//!
//! ## Design Philosophy
//!
//! - **Validate at the boundary**: a `CashFlowSeries` that exists is finite
//!   and non-empty; downstream code never re-checks
//! - **Tagged unions over duck typing**: every calculation kind carries its
//!   own strongly-typed parameter record
//! - **Value objects**: results carry no backward reference to the request
//!   that produced them
//!
//! ## Example
//!
//! ```rust
//! use appraise_core::prelude::*;
//!
//! let flows = CashFlowSeries::new(vec![-1000.0, 400.0, 400.0, 400.0]).unwrap();
//! assert_eq!(flows.len(), 4);
//! assert!(CashFlowSeries::new(vec![]).is_err());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod types;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{CoreError, CoreResult};
    pub use crate::types::{
        BreakEvenParams, BreakEvenResult, CalculationKind, CalculationOutput,
        CalculationParameters, CashFlowSeries, ConfidenceInterval, Distribution, IrrParams,
        IrrResult, NpvParams, NpvResult, PaybackParams, PaybackResult, Percentiles,
        ProjectionParams, ProjectionResult, SimulationParameters, SimulationResult,
        SimulationVariable,
    };
}

pub use error::{CoreError, CoreResult};
pub use types::{
    BreakEvenParams, BreakEvenResult, CalculationKind, CalculationOutput, CalculationParameters,
    CashFlowSeries, ConfidenceInterval, Distribution, IrrParams, IrrResult, NpvParams, NpvResult,
    PaybackParams, PaybackResult, Percentiles, ProjectionParams, ProjectionResult,
    SimulationParameters, SimulationResult, SimulationVariable,
};
