//! Descriptive statistics over simulated value sets.
//!
//! All functions take their sample by slice and return `None` for empty
//! input rather than a NaN. Percentile and median extraction expect the
//! slice to be sorted ascending; [`sorted`] produces one.

/// Returns a copy of `values` sorted ascending.
///
/// Non-finite values never reach this module (inputs are validated at the
/// domain boundary), so total ordering via `partial_cmp` is safe.
#[must_use]
pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();
    out.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    out
}

/// Arithmetic mean.
#[must_use]
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation (divisor `n`, not `n - 1`).
#[must_use]
pub fn population_std_dev(values: &[f64]) -> Option<f64> {
    let mu = mean(values)?;
    let variance = values.iter().map(|v| (v - mu).powi(2)).sum::<f64>() / values.len() as f64;
    Some(variance.sqrt())
}

/// Median of a sorted sample: the middle element, or the average of the two
/// middle elements for even counts.
#[must_use]
pub fn median_sorted(sorted_values: &[f64]) -> Option<f64> {
    let n = sorted_values.len();
    if n == 0 {
        return None;
    }
    if n % 2 == 1 {
        Some(sorted_values[n / 2])
    } else {
        Some((sorted_values[n / 2 - 1] + sorted_values[n / 2]) / 2.0)
    }
}

/// Index-based percentile of a sorted sample: element at
/// `floor(fraction * n)`, clamped to the last element.
#[must_use]
pub fn percentile_sorted(sorted_values: &[f64], fraction: f64) -> Option<f64> {
    let n = sorted_values.len();
    if n == 0 {
        return None;
    }
    let index = ((fraction * n as f64).floor() as usize).min(n - 1);
    Some(sorted_values[index])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mean_and_std_dev() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_relative_eq!(mean(&values).unwrap(), 5.0, epsilon = 1e-12);
        // Classic textbook sample: population std dev is exactly 2
        assert_relative_eq!(population_std_dev(&values).unwrap(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_empty_sample() {
        assert!(mean(&[]).is_none());
        assert!(population_std_dev(&[]).is_none());
        assert!(median_sorted(&[]).is_none());
        assert!(percentile_sorted(&[], 0.5).is_none());
    }

    #[test]
    fn test_median_odd_and_even() {
        assert_relative_eq!(
            median_sorted(&[1.0, 2.0, 3.0]).unwrap(),
            2.0,
            epsilon = 1e-12
        );
        assert_relative_eq!(
            median_sorted(&[1.0, 2.0, 3.0, 4.0]).unwrap(),
            2.5,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_percentile_floor_index() {
        let values: Vec<f64> = (1..=10).map(f64::from).collect();
        // floor(0.05 * 10) = 0 -> first element
        assert_relative_eq!(percentile_sorted(&values, 0.05).unwrap(), 1.0);
        // floor(0.25 * 10) = 2 -> third element
        assert_relative_eq!(percentile_sorted(&values, 0.25).unwrap(), 3.0);
        // floor(0.95 * 10) = 9 -> last element
        assert_relative_eq!(percentile_sorted(&values, 0.95).unwrap(), 10.0);
        // fraction 1.0 clamps to the last element
        assert_relative_eq!(percentile_sorted(&values, 1.0).unwrap(), 10.0);
    }

    #[test]
    fn test_percentiles_are_ordered() {
        let values = sorted(&[9.0, 1.0, 5.0, 3.0, 7.0, 2.0, 8.0, 4.0, 6.0, 10.0]);
        let p5 = percentile_sorted(&values, 0.05).unwrap();
        let p25 = percentile_sorted(&values, 0.25).unwrap();
        let p75 = percentile_sorted(&values, 0.75).unwrap();
        let p95 = percentile_sorted(&values, 0.95).unwrap();
        let med = median_sorted(&values).unwrap();

        assert!(p5 <= p25 && p25 <= med && med <= p75 && p75 <= p95);
    }
}
