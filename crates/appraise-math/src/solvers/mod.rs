//! Root-finding algorithms.
//!
//! Three solvers are provided:
//!
//! - [`newton_raphson`]: fast quadratic convergence when the derivative is
//!   available and well behaved
//! - [`bisection`]: slow but guaranteed once a sign change is bracketed
//! - [`newton_with_fallback`]: Newton first, bisection as the safety net —
//!   the solver the IRR search runs on
//!
//! A rate search over a discounted-cash-flow polynomial is the typical
//! client: Newton converges in a handful of iterations from any sensible
//! guess, and the bracketed fallback covers the pathological series where
//! the derivative flattens out.

mod bisection;
mod hybrid;
mod newton;

pub use bisection::bisection;
pub use hybrid::newton_with_fallback;
pub use newton::newton_raphson;

use crate::error::MathResult;

/// Default tolerance on the residual magnitude.
pub const DEFAULT_TOLERANCE: f64 = 1e-9;

/// Default maximum number of iterations.
pub const DEFAULT_MAX_ITERATIONS: u32 = 100;

/// Configuration for root-finding algorithms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverConfig {
    /// Tolerance for convergence, applied to the residual magnitude.
    pub tolerance: f64,
    /// Maximum number of iterations.
    pub max_iterations: u32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl SolverConfig {
    /// Creates a new solver configuration.
    #[must_use]
    pub fn new(tolerance: f64, max_iterations: u32) -> Self {
        Self {
            tolerance,
            max_iterations,
        }
    }
}

/// Result of a root-finding iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverResult {
    /// The root found.
    pub root: f64,
    /// Number of iterations used.
    pub iterations: u32,
    /// Final residual (function value at the root).
    pub residual: f64,
}

/// Attempts to bracket a sign change around `center` by expanding outward.
///
/// The search is clamped to `(lo_limit, hi_limit)`; returns `None` when no
/// sign change is found inside the limits.
pub(crate) fn find_bracket<F>(
    f: &F,
    center: f64,
    lo_limit: f64,
    hi_limit: f64,
) -> Option<(f64, f64)>
where
    F: Fn(f64) -> f64,
{
    let f_center = f(center);
    let mut delta = 0.1;

    for _ in 0..60 {
        let left = (center - delta).max(lo_limit);
        let right = (center + delta).min(hi_limit);

        if f(left) * f_center < 0.0 {
            return Some((left, center));
        }
        if f(right) * f_center < 0.0 {
            return Some((center, right));
        }
        if f(left) * f(right) < 0.0 {
            return Some((left, right));
        }

        if left <= lo_limit && right >= hi_limit {
            break;
        }
        delta *= 2.0;
    }

    None
}

/// Convenience wrapper returning just the root.
pub fn find_root<F, DF>(
    f: F,
    df: DF,
    initial_guess: f64,
    config: &SolverConfig,
) -> MathResult<f64>
where
    F: Fn(f64) -> f64,
    DF: Fn(f64) -> f64,
{
    newton_raphson(f, df, initial_guess, config).map(|r| r.root)
}
