//! Channelized Hotelling observer.
//!
//! The observer is assembled from three pure stages:
//!
//! 1. **Channels** ([`channels`]): PCA basis learned from a pool of patches
//! 2. **Template** ([`template`]): Hotelling template from pooled, regularized covariance
//! 3. **Scoring**: projection of channel responses onto the template
//!
//! [`ChannelizedObserver`] ties the stages together for raw patches.

mod channels;
mod template;

pub use channels::{learn_channels, ChannelBasis};
pub use template::{fit_template, score, Template};

use nalgebra::{DMatrix, DVector};

use crate::error::{Error, Result};
use crate::types::{PatchMatrix, Vector};

/// A fitted channelized Hotelling observer.
///
/// Borrows its channel basis so that both conditions of a study can share one
/// basis without copying it.
#[derive(Debug, Clone)]
pub struct ChannelizedObserver<'a> {
    basis: &'a ChannelBasis,
    template: Template,
}

impl<'a> ChannelizedObserver<'a> {
    /// Fit an observer on raw signal-absent and signal-present patches.
    ///
    /// Both patch sets are projected through `basis` and the template is fitted
    /// in channel space with Tikhonov regularization `reg`.
    ///
    /// # Errors
    ///
    /// [`Error::DimensionMismatch`] if a patch set's length differs from the
    /// basis, plus everything [`fit_template`] reports.
    pub fn fit(
        absent: &PatchMatrix,
        present: &PatchMatrix,
        basis: &'a ChannelBasis,
        reg: f64,
    ) -> Result<Self> {
        let z0 = basis.project(absent)?;
        let z1 = basis.project(present)?;
        let template = fit_template(&z0, &z1, reg)?;
        Ok(Self { basis, template })
    }

    /// Fit an observer and score its own training patches.
    ///
    /// Returns the observer with the signal-absent and signal-present decision
    /// values, in that order.
    pub fn fit_and_score(
        absent: &PatchMatrix,
        present: &PatchMatrix,
        basis: &'a ChannelBasis,
        reg: f64,
    ) -> Result<(Self, Vector, Vector)> {
        let z0 = basis.project(absent)?;
        let z1 = basis.project(present)?;
        let template = fit_template(&z0, &z1, reg)?;
        let dv0 = template.score(&z0)?;
        let dv1 = template.score(&z1)?;
        Ok((Self { basis, template }, dv0, dv1))
    }

    /// The channel basis the observer projects through.
    pub fn basis(&self) -> &'a ChannelBasis {
        self.basis
    }

    /// The fitted template.
    pub fn template(&self) -> &Template {
        &self.template
    }

    /// Decision values for raw N×q patches.
    pub fn decision_values(&self, patches: &PatchMatrix) -> Result<Vector> {
        let z = self.basis.project(patches)?;
        self.template.score(&z)
    }
}

/// Per-column mean of a sample matrix.
pub(crate) fn column_means(samples: &DMatrix<f64>) -> DVector<f64> {
    DVector::from_iterator(
        samples.ncols(),
        samples.column_iter().map(|column| column.mean()),
    )
}

/// Copy of `samples` with `means[j]` subtracted from column j.
pub(crate) fn center_columns(samples: &DMatrix<f64>, means: &[f64]) -> DMatrix<f64> {
    let mut centered = samples.clone();
    for (mut column, mean) in centered.column_iter_mut().zip(means) {
        column.add_scalar_mut(-mean);
    }
    centered
}

pub(crate) fn ensure_finite(samples: &DMatrix<f64>, what: &'static str) -> Result<()> {
    if samples.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(Error::NonFinite(what))
    }
}
