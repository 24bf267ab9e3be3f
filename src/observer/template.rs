//! Hotelling template fitting and scoring in channel space.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::types::{ChannelMatrix, Vector};

use super::{center_columns, column_means, ensure_finite};

/// A fitted linear discriminant in channel space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    /// Template w = Σ_reg⁻¹ (μ1 − μ0).
    pub weights: DVector<f64>,

    /// Mean channel response of the signal-absent class (μ0).
    pub mean_absent: DVector<f64>,

    /// Mean channel response of the signal-present class (μ1).
    pub mean_present: DVector<f64>,

    /// Regularized pooled covariance Σ + λI that was solved against.
    pub covariance: DMatrix<f64>,

    /// Tikhonov regularization λ.
    pub regularization: f64,

    /// True when the solve fell back to the eigen pseudo-inverse.
    pub pseudo_inverse: bool,
}

impl Template {
    /// Number of channels k.
    pub fn channels(&self) -> usize {
        self.weights.len()
    }

    /// Decision values for N×k channel responses.
    pub fn score(&self, z: &ChannelMatrix) -> Result<Vector> {
        score(z, &self.weights)
    }

    /// Squared Hotelling detectability (Δμ)ᵀ w of the training data.
    pub fn detectability_squared(&self) -> f64 {
        (&self.mean_present - &self.mean_absent).dot(&self.weights)
    }
}

/// Decision values z · w for each row of `z`.
///
/// # Errors
///
/// [`Error::DimensionMismatch`] if `z` has a different channel count than `w`.
pub fn score(z: &ChannelMatrix, w: &Vector) -> Result<Vector> {
    if z.ncols() != w.len() {
        return Err(Error::dimension("channel count", w.len(), z.ncols()));
    }
    Ok(z * w)
}

/// Fit a Hotelling template from signal-absent (`z0`) and signal-present
/// (`z1`) channel responses.
///
/// The within-class scatters S_i = Xcᵢᵀ Xcᵢ / max(1, Nᵢ − 1) are averaged with
/// equal weight (not by sample size), symmetrized, and regularized as
/// Σ + λI. The template solves (Σ + λI) w = μ1 − μ0 by Cholesky. With λ = 0,
/// or whenever the Cholesky factorization fails, the system is solved with
/// the eigen pseudo-inverse instead, so a singular covariance never aborts
/// the fit.
///
/// # Errors
///
/// - [`Error::DimensionMismatch`] if the classes have different channel counts
/// - [`Error::DegenerateInput`] if either class is empty or there are no channels
/// - [`Error::InvalidParameter`] if `reg` is negative or not finite
/// - [`Error::NonFinite`] if a channel response is NaN or infinite
pub fn fit_template(z0: &ChannelMatrix, z1: &ChannelMatrix, reg: f64) -> Result<Template> {
    if !(reg.is_finite() && reg >= 0.0) {
        return Err(Error::InvalidParameter(format!(
            "regularization must be finite and non-negative, got {}",
            reg
        )));
    }
    if z0.ncols() != z1.ncols() {
        return Err(Error::dimension("channel count", z0.ncols(), z1.ncols()));
    }
    if z0.nrows() == 0 {
        return Err(Error::DegenerateInput("signal-absent class has no samples"));
    }
    if z1.nrows() == 0 {
        return Err(Error::DegenerateInput("signal-present class has no samples"));
    }
    let k = z0.ncols();
    if k == 0 {
        return Err(Error::DegenerateInput("no channels"));
    }
    ensure_finite(z0, "signal-absent channel responses")?;
    ensure_finite(z1, "signal-present channel responses")?;

    let mean_absent = column_means(z0);
    let mean_present = column_means(z1);
    let delta = &mean_present - &mean_absent;

    let pooled = (scatter(z0, &mean_absent) + scatter(z1, &mean_present)) * 0.5;
    let symmetric = (&pooled + pooled.transpose()) * 0.5;
    let covariance = symmetric + DMatrix::identity(k, k) * reg;

    let cholesky_solution = if reg > 0.0 {
        covariance
            .clone()
            .cholesky()
            .map(|chol| chol.solve(&delta))
            .filter(|w| w.iter().all(|v| v.is_finite()))
    } else {
        None
    };

    let (weights, pseudo_inverse) = match cholesky_solution {
        Some(w) => (w, false),
        None => (pseudo_inverse_symmetric(&covariance) * &delta, true),
    };

    debug!(
        channels = k,
        n_absent = z0.nrows(),
        n_present = z1.nrows(),
        reg,
        pseudo_inverse,
        "fitted Hotelling template"
    );

    Ok(Template {
        weights,
        mean_absent,
        mean_present,
        covariance,
        regularization: reg,
        pseudo_inverse,
    })
}

/// Within-class scatter normalized by max(1, N − 1).
fn scatter(z: &ChannelMatrix, mean: &DVector<f64>) -> DMatrix<f64> {
    let centered = center_columns(z, mean.as_slice());
    let dof = z.nrows().saturating_sub(1).max(1) as f64;
    centered.transpose() * &centered / dof
}

/// Moore–Penrose pseudo-inverse of a symmetric matrix.
///
/// Eigenvalues within `max(k · ε, 1e-12) · max|λ|` of zero are treated as zero.
fn pseudo_inverse_symmetric(matrix: &DMatrix<f64>) -> DMatrix<f64> {
    let eigen = matrix.clone().symmetric_eigen();
    let largest = eigen.eigenvalues.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
    let tolerance = largest * (matrix.nrows() as f64 * f64::EPSILON).max(1e-12);

    let mut scaled = eigen.eigenvectors.clone();
    for (mut column, &lambda) in scaled.column_iter_mut().zip(eigen.eigenvalues.iter()) {
        let inverse = if lambda.abs() > tolerance { 1.0 / lambda } else { 0.0 };
        column *= inverse;
    }
    scaled * eigen.eigenvectors.transpose()
}
