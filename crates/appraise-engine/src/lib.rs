//! # Appraise Engine
//!
//! The asynchronous calculation engine for Appraise.
//!
//! This crate provides:
//!
//! - [`Dispatcher`]: message-correlated dispatch with per-request timeouts
//!   and crash recovery
//! - An isolated worker thread hosting the numeric algorithms — requests
//!   in, results out, no shared memory
//! - [`batch_calculate`] / [`scenario_npv`]: concurrent orchestration with
//!   partial-failure semantics
//! - [`monte_carlo_simulation`]: randomized NPV pricing with a
//!   descriptive-statistics reduction
//! - [`AppraisalEngine`]: the composition-root-owned facade with explicit
//!   lifecycle
//!
//! ## Architecture
//!
//! ```text
//! Caller ──┬─> AppraisalEngine ─> Dispatcher ── request channel ──> Worker
//!          │                          │                               │
//!          │                     pending table <── reply channel ── results
//!          │                     (by correlation id)
//!          └─> batch / scenario / simulation ─> N concurrent dispatches
//! ```
//!
//! Results are routed purely by correlation id; completion order never
//! matters. A request that times out is unregistered on the spot, so its
//! late result is discarded without effect.
//!
//! ## Usage
//!
//! ```ignore
//! let engine = AppraisalEngine::new(EngineConfig::default());
//!
//! let npv = engine.calculate_npv(vec![100.0, 100.0, 100.0], 0.10, 200.0).await?;
//! let status = engine.status();
//!
//! engine.shutdown().await;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod batch;
pub mod cache;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod montecarlo;
pub mod protocol;
pub mod sensitivity;

mod worker;

// Re-exports
pub use batch::{batch_calculate, scenario_npv, BatchItem, ScenarioOutcome, ScenarioSet};
pub use cache::{CacheStats, CalculationCache};
pub use config::EngineConfig;
pub use dispatch::{DispatchStatus, Dispatcher};
pub use engine::{AppraisalEngine, EngineStatus};
pub use error::{EngineError, EngineResult};
pub use montecarlo::monte_carlo_simulation;
pub use protocol::{CalculationRequest, CalculationResult, CorrelationId};
pub use sensitivity::{sensitivity_analysis, SensitivityPoint};
