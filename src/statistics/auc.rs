//! Area under the ROC curve with bootstrap confidence intervals.
//!
//! The point estimate is the Mann–Whitney U statistic normalized by N0·N1:
//! the probability that a signal-present sample scores higher than a
//! signal-absent one, with ties counting one half. Confidence bounds come from
//! a case bootstrap over the (value, label) pairs.

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::result::AucEstimate;
use crate::types::{binarize, Label};

use super::bootstrap::{bootstrap_replicates, bounded_iterations};
use super::quantile::percentile_interval;

/// Rank-based AUC of scored pairs, reordering `pairs` as a side effect.
///
/// Returns `None` when either class is missing.
pub(crate) fn auc_of_pairs(pairs: &mut [(f64, bool)]) -> Option<f64> {
    pairs.sort_unstable_by(|a, b| a.0.total_cmp(&b.0));

    let n_present = pairs.iter().filter(|p| p.1).count();
    let n_absent = pairs.len() - n_present;
    if n_present == 0 || n_absent == 0 {
        return None;
    }

    // Sum of mid-ranks (1-based) of the present class
    let mut rank_sum = 0.0;
    let mut start = 0;
    while start < pairs.len() {
        let mut end = start + 1;
        while end < pairs.len() && pairs[end].0 == pairs[start].0 {
            end += 1;
        }
        let mid_rank = (start + 1 + end) as f64 / 2.0;
        let present_in_group = pairs[start..end].iter().filter(|p| p.1).count();
        rank_sum += mid_rank * present_in_group as f64;
        start = end;
    }

    let n1 = n_present as f64;
    let n0 = n_absent as f64;
    let u = rank_sum - n1 * (n1 + 1.0) / 2.0;
    Some((u / (n0 * n1)).clamp(0.0, 1.0))
}

/// AUC of the subset of observations selected by `indices`.
pub(crate) fn auc_at(values: &[f64], present: &[bool], indices: &[usize]) -> Option<f64> {
    let mut pairs: Vec<(f64, bool)> = indices.iter().map(|&i| (values[i], present[i])).collect();
    auc_of_pairs(&mut pairs)
}

/// Validate a (decision value, label) set and coerce labels to presence flags.
pub(crate) fn prepare<L: Label>(values: &[f64], labels: &[L]) -> Result<Vec<bool>> {
    if values.len() != labels.len() {
        return Err(Error::dimension("label count", values.len(), labels.len()));
    }
    if values.is_empty() {
        return Err(Error::DegenerateInput("no decision values supplied"));
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(Error::NonFinite("decision values"));
    }
    Ok(binarize(labels))
}

fn auc_checked(values: &[f64], present: &[bool]) -> Result<f64> {
    let mut pairs: Vec<(f64, bool)> = values.iter().copied().zip(present.iter().copied()).collect();
    auc_of_pairs(&mut pairs).ok_or(Error::DegenerateInput(
        "labels contain a single class; AUC is undefined",
    ))
}

/// Point estimate of the AUC.
///
/// # Errors
///
/// - [`Error::DimensionMismatch`] if `values` and `labels` differ in length
/// - [`Error::DegenerateInput`] if the input is empty or single-class
/// - [`Error::NonFinite`] if any decision value is NaN or infinite
pub fn auc<L: Label>(values: &[f64], labels: &[L]) -> Result<f64> {
    let present = prepare(values, labels)?;
    auc_checked(values, &present)
}

/// Estimate the AUC with a bootstrap confidence interval.
///
/// Draws `n_bootstrap` resamples of the full (value, label) set with
/// replacement at the original size, recomputes the AUC on each, and reports
/// the (α/2, 1 − α/2) percentiles of the resample AUCs. Resamples that happen
/// to contain a single class are skipped. The interval is widened if needed
/// so that it always contains the point estimate; if no resample survives (or
/// `n_bootstrap` is zero) it collapses to `(auc, auc)`. `n_bootstrap` is
/// capped at [`MAX_BOOTSTRAP_ITERATIONS`](crate::MAX_BOOTSTRAP_ITERATIONS).
///
/// The same `seed` always yields the same interval for the same inputs,
/// with or without the `parallel` feature.
///
/// # Errors
///
/// As [`auc`], plus [`Error::InvalidParameter`] if `alpha` is not in (0, 1).
pub fn estimate_auc<L: Label>(
    values: &[f64],
    labels: &[L],
    n_bootstrap: usize,
    seed: u64,
    alpha: f64,
) -> Result<AucEstimate> {
    if !(alpha > 0.0 && alpha < 1.0) {
        return Err(Error::InvalidParameter(format!(
            "alpha must be in (0, 1), got {}",
            alpha
        )));
    }

    let present = prepare(values, labels)?;
    let point = auc_checked(values, &present)?;

    let iterations = bounded_iterations(n_bootstrap);

    let mut resampled = bootstrap_replicates(values.len(), iterations, seed, |indices| {
        auc_at(values, &present, indices)
    });
    let n_valid = resampled.len();

    let ci = if resampled.is_empty() {
        if iterations > 0 {
            warn!(
                n_bootstrap = iterations,
                "every bootstrap resample was single-class; confidence interval is degenerate"
            );
        }
        (point, point)
    } else {
        let (lo, hi) = percentile_interval(&mut resampled, alpha);
        (lo.min(point), hi.max(point))
    };

    debug!(
        auc = point,
        lo = ci.0,
        hi = ci.1,
        n_valid,
        n_bootstrap = iterations,
        "estimated AUC"
    );

    Ok(AucEstimate {
        auc: point,
        ci,
        n_bootstrap: iterations,
        n_valid,
        alpha,
        seed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_perfect_ordering() {
        let labels = [0, 1, 0, 1];
        let values = [0.1, 0.9, 0.4, 0.8];
        assert_eq!(auc(&values, &labels).unwrap(), 1.0);
    }

    #[test]
    fn test_reversed_ordering() {
        let labels = [1, 0, 1, 0];
        let values = [0.1, 0.9, 0.4, 0.8];
        assert_eq!(auc(&values, &labels).unwrap(), 0.0);
    }

    #[test]
    fn test_all_tied() {
        let labels = [0, 1, 0, 1, 1];
        let values = [3.0; 5];
        assert_eq!(auc(&values, &labels).unwrap(), 0.5);
    }

    #[test]
    fn test_matches_pairwise_definition() {
        let values = [0.3, 0.7, 0.7, 0.1, 0.5, 0.9, 0.2, 0.5];
        let labels = [false, true, false, false, true, true, true, false];

        let mut wins = 0.0;
        let mut pairs = 0.0;
        for (i, &vi) in values.iter().enumerate() {
            for (j, &vj) in values.iter().enumerate() {
                if labels[i] && !labels[j] {
                    pairs += 1.0;
                    if vi > vj {
                        wins += 1.0;
                    } else if vi == vj {
                        wins += 0.5;
                    }
                }
            }
        }

        let expected = wins / pairs;
        assert!((auc(&values, &labels).unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_signed_labels() {
        let labels = [-1, 1, -1, 1];
        let values = [0.1, 0.9, 0.4, 0.8];
        assert_eq!(auc(&values, &labels).unwrap(), 1.0);
    }

    #[test]
    fn test_single_class_is_error() {
        let err = estimate_auc(&[0.1, 0.2, 0.3], &[1, 1, 1], 100, 0, 0.05).unwrap_err();
        assert!(matches!(err, Error::DegenerateInput(_)));
    }

    #[test]
    fn test_length_mismatch() {
        let err = auc(&[0.1, 0.2, 0.3], &[0, 1]).unwrap_err();
        assert_eq!(err, Error::dimension("label count", 3, 2));
    }

    #[test]
    fn test_non_finite_rejected() {
        let err = auc(&[0.1, f64::NAN], &[0, 1]).unwrap_err();
        assert!(matches!(err, Error::NonFinite(_)));
    }

    #[test]
    fn test_invalid_alpha() {
        let err = estimate_auc(&[0.1, 0.2], &[0, 1], 10, 0, 1.5).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)));
    }

    #[test]
    fn test_zero_bootstrap_collapses_interval() {
        let est = estimate_auc(&[0.1, 0.6, 0.4, 0.3], &[0, 1, 1, 0], 0, 3, 0.05).unwrap();
        assert_eq!(est.ci, (est.auc, est.auc));
        assert_eq!(est.n_valid, 0);
    }

    #[test]
    fn test_ci_brackets_estimate() {
        let values: Vec<f64> = (0..40).map(|i| ((i * 37) % 23) as f64).collect();
        let labels: Vec<u8> = (0..40).map(|i| (i % 2) as u8).collect();
        let est = estimate_auc(&values, &labels, 500, 11, 0.05).unwrap();
        assert!(est.n_valid > 0);
        assert!(est.ci.0 <= est.auc && est.auc <= est.ci.1);
        assert!(est.ci.0 >= 0.0 && est.ci.1 <= 1.0);
    }

    #[test]
    fn test_reports_clamped_resample_count() {
        let est = estimate_auc(
            &[0.2, 0.8],
            &[0, 1],
            crate::MAX_BOOTSTRAP_ITERATIONS + 1,
            5,
            0.05,
        )
        .unwrap();
        assert_eq!(est.n_bootstrap, crate::MAX_BOOTSTRAP_ITERATIONS);
        assert!(est.n_valid <= est.n_bootstrap);
    }

    #[test]
    fn test_two_samples_mostly_degenerate() {
        // With one sample per class, half of all resamples are single-class.
        let est = estimate_auc(&[0.2, 0.8], &[0, 1], 400, 5, 0.05).unwrap();
        assert!(est.n_valid < 400);
        assert!(est.n_valid > 0);
        assert!(est.ci.0 <= est.auc && est.auc <= est.ci.1);
    }
}
