//! Bias of one condition's AUCs relative to a reference condition.

use crate::error::{Error, Result};
use crate::result::BiasSummary;

/// Summarize AUC_B − AUC_A over repeated paired estimates.
///
/// Reports the mean and population standard deviation of the differences and
/// the mean difference as a percentage of the mean reference AUC.
///
/// # Errors
///
/// - [`Error::DimensionMismatch`] if `auc_a` and `auc_b` differ in length
/// - [`Error::DegenerateInput`] if there are no estimates or mean(AUC_A) is zero
/// - [`Error::NonFinite`] if any AUC is NaN or infinite
pub fn bias_assessment(auc_a: &[f64], auc_b: &[f64]) -> Result<BiasSummary> {
    if auc_a.len() != auc_b.len() {
        return Err(Error::dimension("paired AUC estimates", auc_a.len(), auc_b.len()));
    }
    if auc_a.is_empty() {
        return Err(Error::DegenerateInput("no AUC estimates"));
    }
    if auc_a.iter().chain(auc_b).any(|v| !v.is_finite()) {
        return Err(Error::NonFinite("AUC estimates"));
    }

    let n = auc_a.len() as f64;
    let reference = auc_a.iter().sum::<f64>() / n;
    if reference == 0.0 {
        return Err(Error::DegenerateInput("reference AUCs average to zero"));
    }

    let mean = auc_a.iter().zip(auc_b).map(|(a, b)| b - a).sum::<f64>() / n;
    let variance = auc_a
        .iter()
        .zip(auc_b)
        .map(|(a, b)| (b - a - mean).powi(2))
        .sum::<f64>()
        / n;

    Ok(BiasSummary {
        mean,
        std: variance.sqrt(),
        percent: 100.0 * mean / reference,
        n: auc_a.len(),
    })
}
