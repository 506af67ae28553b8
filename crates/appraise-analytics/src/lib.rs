//! # Appraise Analytics
//!
//! The pure numeric algorithm library for investment appraisal:
//!
//! - [`npv`]: net present value with profitability index and per-period
//!   present values
//! - [`irr`]: internal rate of return via Newton-Raphson with bisection
//!   fallback
//! - [`payback_period`]: fractional payback period by linear interpolation
//! - [`break_even`]: break-even units and revenue from contribution margin
//! - [`project_cash_flows`]: geometric growth projection with optional
//!   discounting and terminal value
//!
//! Every function is pure and deterministic, rejects non-finite input with
//! a typed validation error, and reports out-of-domain business conditions
//! (non-convergence, negative margins, unrecovered investment) through
//! result fields rather than errors.
//!
//! ## Example
//!
//! ```rust
//! use appraise_analytics::npv;
//! use appraise_core::CashFlowSeries;
//!
//! let flows = CashFlowSeries::new(vec![100.0, 100.0, 100.0]).unwrap();
//! let result = npv(&flows, 0.10, 200.0).unwrap();
//! assert!(result.npv > 0.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod breakeven;
pub mod error;
pub mod irr;
pub mod npv;
pub mod payback;
pub mod projection;

pub use breakeven::break_even;
pub use error::{AnalyticsError, AnalyticsResult};
pub use irr::{irr, IRR_DEFAULT_GUESS, IRR_MAX_ITERATIONS, IRR_TOLERANCE};
pub use npv::npv;
pub use payback::payback_period;
pub use projection::project_cash_flows;
