//! One-tailed paired comparison of two reconstruction conditions.
//!
//! Tests H1: AUC_B > AUC_A in one of two ways:
//!
//! - **Trials**: one AUC per realization and condition. A paired t-test over
//!   the per-trial differences, or a normal approximation with a nominal
//!   standard error when there are too few trials for the t distribution.
//! - **Scored**: decision values and labels for the same cases under both
//!   conditions. A matched bootstrap resamples the cases once per replicate
//!   and applies the same draw to both conditions.

use statrs::distribution::{ContinuousCDF, Normal, StudentsT};
use tracing::{debug, warn};

use crate::config::PairedConfig;
use crate::error::{Error, Result};
use crate::result::{PairedComparison, TestMethod};
use crate::statistics::{auc_at, bootstrap_replicates, bounded_iterations, prepare};
use crate::types::Label;

/// Observations for one condition of a paired comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PairedSamples<'a> {
    /// One AUC point estimate per trial/realization, in matching order.
    Trials(&'a [f64]),
    /// Decision values and presence labels for matched cases.
    ///
    /// Other label encodings can be converted with
    /// [`binarize`](crate::binarize), or passed directly to [`compare_scored`].
    Scored {
        /// Decision values.
        values: &'a [f64],
        /// `true` for signal-present cases.
        labels: &'a [bool],
    },
}

/// Compare condition B against condition A.
///
/// Both sides must be the same kind of [`PairedSamples`].
///
/// # Errors
///
/// [`Error::InvalidParameter`] when trial and scored inputs are mixed or the
/// configuration is invalid, plus the errors of [`compare_trials`] and
/// [`compare_scored`].
pub fn compare_paired(
    a: &PairedSamples<'_>,
    b: &PairedSamples<'_>,
    config: &PairedConfig,
) -> Result<PairedComparison> {
    match (a, b) {
        (PairedSamples::Trials(a), PairedSamples::Trials(b)) => compare_trials(a, b, config),
        (
            PairedSamples::Scored {
                values: values_a,
                labels: labels_a,
            },
            PairedSamples::Scored {
                values: values_b,
                labels: labels_b,
            },
        ) => compare_scored(values_a, *labels_a, values_b, *labels_b, config),
        _ => Err(Error::InvalidParameter(
            "cannot compare trial AUCs against scored samples".into(),
        )),
    }
}

/// Paired test over per-trial AUCs.
///
/// `delta_auc` is the mean of b_i − a_i. With at least
/// `config.small_sample_threshold` pairs a paired t-test with n − 1 degrees of
/// freedom is used. When all differences are identical the t statistic is
/// undefined and the p-value is decided by the sign of the delta (0.5 for no
/// difference). With fewer pairs the delta is referred to a normal
/// distribution with standard error `config.nominal_se`.
///
/// # Errors
///
/// - [`Error::DimensionMismatch`] if `a` and `b` differ in length
/// - [`Error::DegenerateInput`] if there are no trials
/// - [`Error::NonFinite`] if any AUC is NaN or infinite
pub fn compare_trials(a: &[f64], b: &[f64], config: &PairedConfig) -> Result<PairedComparison> {
    validate_config(config)?;
    if a.len() != b.len() {
        return Err(Error::dimension("paired trials", a.len(), b.len()));
    }
    if a.is_empty() {
        return Err(Error::DegenerateInput("no paired trials"));
    }
    if a.iter().chain(b).any(|v| !v.is_finite()) {
        return Err(Error::NonFinite("trial AUCs"));
    }

    let n = a.len();
    let diffs: Vec<f64> = a.iter().zip(b).map(|(x, y)| y - x).collect();
    let delta = mean(&diffs);
    let auc_a = mean(a);
    let auc_b = mean(b);

    let (p_one, statistic, method) = if n < config.small_sample_threshold {
        warn!(
            n_pairs = n,
            threshold = config.small_sample_threshold,
            nominal_se = config.nominal_se,
            "too few paired trials for a t-test; using normal approximation"
        );
        let z = delta / config.nominal_se;
        (upper_tail_normal(z)?, Some(z), TestMethod::NormalApprox)
    } else {
        let sd = sample_std(&diffs, delta);
        if sd == 0.0 {
            let p = if delta > 0.0 {
                0.0
            } else if delta < 0.0 {
                1.0
            } else {
                0.5
            };
            (p, None, TestMethod::PairedT)
        } else {
            let t = delta / (sd / (n as f64).sqrt());
            let dist = StudentsT::new(0.0, 1.0, (n - 1) as f64)
                .map_err(|e| Error::InvalidParameter(e.to_string()))?;
            (dist.sf(t), Some(t), TestMethod::PairedT)
        }
    };

    let p_value = tail(p_one, config.one_tailed);
    debug!(n_pairs = n, delta, p_value, ?method, "compared paired trials");

    Ok(PairedComparison {
        auc_a,
        auc_b,
        delta_auc: delta,
        p_value,
        statistic,
        method,
        n_pairs: n,
        n_valid: None,
        one_tailed: config.one_tailed,
    })
}

/// Matched bootstrap comparison of two scored conditions.
///
/// Case i of condition A and case i of condition B must be the same object
/// (e.g. the same phantom reconstructed two ways). Each replicate resamples
/// case indices once and recomputes ΔAUC* = AUC_B* − AUC_A* on the shared
/// draw; replicates that are single-class in either condition are excluded
/// before the test. The one-tailed p-value is the share of replicates with
/// ΔAUC* < 0, counting ties at zero as one half. If no replicate survives the
/// normal approximation with `config.nominal_se` is used instead.
///
/// # Errors
///
/// - [`Error::DimensionMismatch`] if the conditions have different case
///   counts or a condition's values and labels differ in length
/// - [`Error::DegenerateInput`] if either full label set is single-class
/// - [`Error::NonFinite`] if any decision value is NaN or infinite
///
/// Labels may use any [`Label`] encoding, as for
/// [`estimate_auc`](crate::estimate_auc).
pub fn compare_scored<L: Label>(
    values_a: &[f64],
    labels_a: &[L],
    values_b: &[f64],
    labels_b: &[L],
    config: &PairedConfig,
) -> Result<PairedComparison> {
    validate_config(config)?;
    let present_a = prepare(values_a, labels_a)?;
    let present_b = prepare(values_b, labels_b)?;
    if values_a.len() != values_b.len() {
        return Err(Error::dimension("matched cases", values_a.len(), values_b.len()));
    }

    let n = values_a.len();
    let all: Vec<usize> = (0..n).collect();
    let degenerate = Error::DegenerateInput("labels contain a single class; AUC is undefined");
    let auc_a = auc_at(values_a, &present_a, &all).ok_or_else(|| degenerate.clone())?;
    let auc_b = auc_at(values_b, &present_b, &all).ok_or(degenerate)?;
    let delta = auc_b - auc_a;

    let iterations = bounded_iterations(config.n_bootstrap);
    let deltas = bootstrap_replicates(n, iterations, config.seed, |indices| {
        let a = auc_at(values_a, &present_a, indices)?;
        let b = auc_at(values_b, &present_b, indices)?;
        Some(b - a)
    });
    let n_valid = deltas.len();

    let (p_one, statistic, method) = if deltas.is_empty() {
        warn!(
            n_bootstrap = iterations,
            nominal_se = config.nominal_se,
            "no usable matched resamples; using normal approximation"
        );
        let z = delta / config.nominal_se;
        (upper_tail_normal(z)?, Some(z), TestMethod::NormalApprox)
    } else {
        let below = deltas.iter().filter(|&&d| d < 0.0).count() as f64;
        let ties = deltas.iter().filter(|&&d| d == 0.0).count() as f64;
        (
            (below + 0.5 * ties) / n_valid as f64,
            None,
            TestMethod::MatchedBootstrap,
        )
    };

    let p_value = tail(p_one, config.one_tailed);
    debug!(n_cases = n, n_valid, delta, p_value, "compared matched conditions");

    Ok(PairedComparison {
        auc_a,
        auc_b,
        delta_auc: delta,
        p_value,
        statistic,
        method,
        n_pairs: n,
        n_valid: Some(n_valid),
        one_tailed: config.one_tailed,
    })
}

fn validate_config(config: &PairedConfig) -> Result<()> {
    if !(config.nominal_se.is_finite() && config.nominal_se > 0.0) {
        return Err(Error::InvalidParameter(format!(
            "nominal standard error must be positive, got {}",
            config.nominal_se
        )));
    }
    Ok(())
}

/// P(Z ≥ z) for a standard normal Z.
fn upper_tail_normal(z: f64) -> Result<f64> {
    let normal = Normal::new(0.0, 1.0).map_err(|e| Error::InvalidParameter(e.to_string()))?;
    Ok(normal.sf(z))
}

/// Convert a one-tailed p-value to the requested sidedness.
fn tail(p_one: f64, one_tailed: bool) -> f64 {
    if one_tailed {
        p_one
    } else {
        (2.0 * p_one.min(1.0 - p_one)).min(1.0)
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn sample_std(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    (ss / (values.len() - 1) as f64).sqrt()
}
