//! Empirical quantiles of bootstrap distributions.

/// Quantile of pre-sorted data using the R-7 definition (linear interpolation).
///
/// # Panics
///
/// Panics if `sorted` is empty or if `p` is outside [0, 1].
pub fn quantile_sorted(sorted: &[f64], p: f64) -> f64 {
    assert!(!sorted.is_empty(), "Cannot compute quantile of empty slice");
    assert!(
        (0.0..=1.0).contains(&p),
        "Quantile probability must be in [0, 1]"
    );

    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }

    let h = (n - 1) as f64 * p;
    let lo = h.floor() as usize;
    if lo >= n - 1 {
        return sorted[n - 1];
    }

    let frac = h - lo as f64;
    sorted[lo] + frac * (sorted[lo + 1] - sorted[lo])
}

/// Equal-tailed percentile interval at significance level `alpha`.
///
/// Sorts `values` in place and returns the (α/2, 1 − α/2) quantiles.
///
/// # Panics
///
/// Panics if `values` is empty.
pub fn percentile_interval(values: &mut [f64], alpha: f64) -> (f64, f64) {
    values.sort_unstable_by(|a, b| a.total_cmp(b));
    let lo = quantile_sorted(values, alpha / 2.0);
    let hi = quantile_sorted(values, 1.0 - alpha / 2.0);
    (lo, hi)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantile_matches_linear_interpolation() {
        let data = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(quantile_sorted(&data, 0.0), 1.0);
        assert_eq!(quantile_sorted(&data, 0.5), 3.0);
        assert_eq!(quantile_sorted(&data, 1.0), 5.0);
        assert!((quantile_sorted(&data, 0.1) - 1.4).abs() < 1e-12);
    }

    #[test]
    fn test_single_value() {
        assert_eq!(quantile_sorted(&[0.7], 0.025), 0.7);
    }

    #[test]
    fn test_percentile_interval() {
        let mut values: Vec<f64> = (0..=100).rev().map(|x| x as f64).collect();
        let (lo, hi) = percentile_interval(&mut values, 0.05);
        assert!((lo - 2.5).abs() < 1e-12);
        assert!((hi - 97.5).abs() < 1e-12);
    }

    #[test]
    #[should_panic(expected = "empty")]
    fn test_empty_panics() {
        quantile_sorted(&[], 0.5);
    }
}
