//! Hybrid root-finding: Newton-Raphson with bisection fallback.

use crate::error::{MathError, MathResult};
use crate::solvers::{bisection, find_bracket, newton_raphson, SolverConfig, SolverResult};

/// Newton-Raphson with bisection fallback.
///
/// Runs Newton first; when it diverges, hits a flat derivative, or exhausts
/// its budget, a sign change is bracketed inside `bounds` and bisection
/// finishes the job. Fails only when no sign change exists within the
/// bounds — for a discounted-cash-flow residual that means the function has
/// no root in the sane rate range.
///
/// # Arguments
///
/// * `f` - The function for which to find a root
/// * `df` - The derivative of the function
/// * `initial_guess` - Starting point for the Newton iteration
/// * `bounds` - Interval the fallback bracket search is confined to
/// * `config` - Solver configuration
pub fn newton_with_fallback<F, DF>(
    f: F,
    df: DF,
    initial_guess: f64,
    bounds: (f64, f64),
    config: &SolverConfig,
) -> MathResult<SolverResult>
where
    F: Fn(f64) -> f64,
    DF: Fn(f64) -> f64,
{
    let (lo, hi) = bounds;

    match newton_raphson(&f, &df, initial_guess, config) {
        // A Newton root outside the bounds is a numerical artifact, fall back
        Ok(result) if result.root >= lo && result.root <= hi => Ok(result),
        _ => {
            let center = initial_guess.clamp(lo, hi);
            match find_bracket(&f, center, lo, hi) {
                Some((a, b)) => bisection(&f, a, b, config),
                None => {
                    if f(lo) * f(hi) < 0.0 {
                        bisection(&f, lo, hi, config)
                    } else {
                        Err(MathError::InvalidBracket {
                            a: lo,
                            b: hi,
                            fa: f(lo),
                            fb: f(hi),
                        })
                    }
                }
            }
        }
    }
}
