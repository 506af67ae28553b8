//! Domain types for investment appraisal.

mod cashflow;
mod request;
mod simulation;

pub use cashflow::CashFlowSeries;
pub use request::{
    BreakEvenParams, BreakEvenResult, CalculationKind, CalculationOutput, CalculationParameters,
    IrrParams, IrrResult, NpvParams, NpvResult, PaybackParams, PaybackResult, ProjectionParams,
    ProjectionResult,
};
pub use simulation::{
    ConfidenceInterval, Distribution, Percentiles, SimulationParameters, SimulationResult,
    SimulationVariable,
};
