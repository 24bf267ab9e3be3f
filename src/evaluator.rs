//! Main `Evaluator` entry point and builder.

use nalgebra::DMatrix;
use tracing::debug;

use crate::analysis::{bias_assessment, compare_scored, compare_trials};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::observer::{learn_channels, ChannelBasis, ChannelizedObserver};
use crate::result::{ConditionSummary, EvaluationReport, Metadata};
use crate::statistics::{auc, estimate_auc};
use crate::types::{PatchMatrix, Vector};

/// Signal-absent and signal-present patches of one reconstruction condition.
///
/// Rows are vectorized patches. For matched comparisons both conditions must
/// list the same cases in the same order.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionData {
    /// Display name, e.g. "FBP".
    pub name: String,
    /// N0×q signal-absent patches.
    pub absent: PatchMatrix,
    /// N1×q signal-present patches.
    pub present: PatchMatrix,
}

impl ConditionData {
    /// Bundle a condition's patches under a name.
    pub fn new(name: impl Into<String>, absent: PatchMatrix, present: PatchMatrix) -> Self {
        Self {
            name: name.into(),
            absent,
            present,
        }
    }

    /// Patch length q.
    pub fn pixels(&self) -> usize {
        self.absent.ncols()
    }

    fn validate(&self) -> Result<()> {
        if self.absent.ncols() != self.present.ncols() {
            return Err(Error::dimension(
                "patch length",
                self.absent.ncols(),
                self.present.ncols(),
            ));
        }
        if self.absent.nrows() == 0 || self.present.nrows() == 0 {
            return Err(Error::DegenerateInput("condition is missing a class"));
        }
        Ok(())
    }
}

/// Runs the full observer pipeline for two conditions.
///
/// # Example
///
/// ```ignore
/// use observer_eval::{ConditionData, Evaluator};
///
/// let fbp = ConditionData::new("FBP", fbp_absent, fbp_present);
/// let mar = ConditionData::new("MAR", mar_absent, mar_present);
///
/// let report = Evaluator::new()
///     .channels(10)
///     .regularization(1e-3)
///     .seed(7)
///     .evaluate(&fbp, &mar)?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    config: Config,
}

impl Evaluator {
    /// Create with default configuration.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Create with fast configuration for exploratory runs.
    ///
    /// Settings:
    /// - 200 AUC bootstrap resamples (vs 2,000 default)
    /// - 200 matched comparison resamples (vs 2,000 default)
    pub fn quick() -> Self {
        let mut config = Config {
            n_bootstrap: 200,
            ..Config::default()
        };
        config.paired.n_bootstrap = 200;
        Self { config }
    }

    /// Create from an existing configuration.
    pub fn with_config(config: Config) -> Self {
        Self { config }
    }

    /// Learn `k` PCA channels instead of using one channel per pixel.
    pub fn channels(mut self, k: usize) -> Self {
        self.config.channels = Some(k);
        self
    }

    /// Use the identity basis (one channel per pixel).
    pub fn pixel_channels(mut self) -> Self {
        self.config.channels = None;
        self
    }

    /// Whiten learned channels by their singular values.
    pub fn whiten(mut self, whiten: bool) -> Self {
        self.config.channel_options.whiten = whiten;
        self
    }

    /// Re-orthonormalize learned channels after whitening.
    pub fn reorthonormalize(mut self, reorthonormalize: bool) -> Self {
        self.config.channel_options.reorthonormalize = reorthonormalize;
        self
    }

    /// Learn channels from a seeded subset of at most `n` patches.
    pub fn max_pool(mut self, n: usize) -> Self {
        self.config.channel_options.max_pool = Some(n);
        self
    }

    /// Set the Tikhonov regularization λ.
    pub fn regularization(mut self, reg: f64) -> Self {
        self.config.regularization = reg;
        self
    }

    /// Set bootstrap resamples for the AUC confidence intervals.
    pub fn bootstrap_iterations(mut self, n: usize) -> Self {
        self.config.n_bootstrap = n;
        self
    }

    /// Set the confidence interval significance level.
    pub fn alpha(mut self, alpha: f64) -> Self {
        self.config.alpha = alpha;
        self
    }

    /// Set the seed for channel subsampling and every bootstrap.
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self.config.paired.seed = seed;
        self
    }

    /// Report a one-tailed (B > A) or two-tailed p-value.
    pub fn one_tailed(mut self, one_tailed: bool) -> Self {
        self.config.paired.one_tailed = one_tailed;
        self
    }

    /// Set the trial count below which the normal approximation is used.
    pub fn small_sample_threshold(mut self, n: usize) -> Self {
        self.config.paired.small_sample_threshold = n;
        self
    }

    /// Set the standard error assumed by the normal approximation.
    pub fn nominal_se(mut self, se: f64) -> Self {
        self.config.paired.nominal_se = se;
        self
    }

    /// Set matched resamples for the scored comparison.
    pub fn paired_bootstrap_iterations(mut self, n: usize) -> Self {
        self.config.paired.n_bootstrap = n;
        self
    }

    /// Get the current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Evaluate two conditions scored on the same cases.
    ///
    /// A channel basis is learned once from the patches of both conditions.
    /// Each condition gets its own template, its decision values feed a
    /// bootstrap AUC, and the conditions are compared with a matched
    /// bootstrap over the shared cases.
    ///
    /// # Errors
    ///
    /// [`Error::DimensionMismatch`] if the conditions differ in patch length
    /// or case counts, plus anything the pipeline stages report.
    pub fn evaluate(&self, a: &ConditionData, b: &ConditionData) -> Result<EvaluationReport> {
        a.validate()?;
        b.validate()?;
        if a.absent.nrows() != b.absent.nrows() {
            return Err(Error::dimension(
                "matched signal-absent cases",
                a.absent.nrows(),
                b.absent.nrows(),
            ));
        }
        if a.present.nrows() != b.present.nrows() {
            return Err(Error::dimension(
                "matched signal-present cases",
                a.present.nrows(),
                b.present.nrows(),
            ));
        }

        let basis = self.learn_basis(&[a, b])?;
        let (values_a, labels) = self.decision_values(a, &basis)?;
        let (values_b, _) = self.decision_values(b, &basis)?;

        let condition_a = self.summarize(a, &values_a, &labels, Vec::new())?;
        let condition_b = self.summarize(b, &values_b, &labels, Vec::new())?;
        let comparison = compare_scored(
            values_a.as_slice(),
            &labels,
            values_b.as_slice(),
            &labels,
            &self.config.paired,
        )?;

        debug!(
            a = %a.name,
            b = %b.name,
            delta = comparison.delta_auc,
            p = comparison.p_value,
            "evaluated conditions"
        );

        Ok(EvaluationReport {
            condition_a,
            condition_b,
            comparison,
            bias: None,
            metadata: self.metadata(&basis, 1),
        })
    }

    /// Evaluate two conditions over repeated trials (noise realizations).
    ///
    /// Every trial gets its own template and AUC; the per-trial AUCs are
    /// compared with a paired t-test (or the small-sample normal
    /// approximation) and summarized as bias of B relative to A. The
    /// condition-level AUC and interval come from one template fitted on all
    /// of a condition's trials pooled together.
    ///
    /// # Errors
    ///
    /// [`Error::DimensionMismatch`] if the conditions have different trial
    /// counts or patch lengths, [`Error::DegenerateInput`] if there are no
    /// trials, plus anything the pipeline stages report.
    pub fn evaluate_trials(
        &self,
        a: &[ConditionData],
        b: &[ConditionData],
    ) -> Result<EvaluationReport> {
        if a.len() != b.len() {
            return Err(Error::dimension("trial count", a.len(), b.len()));
        }
        let (first_a, first_b) = match (a.first(), b.first()) {
            (Some(first_a), Some(first_b)) => (first_a, first_b),
            _ => return Err(Error::DegenerateInput("no trials supplied")),
        };
        for trial in a.iter().chain(b) {
            trial.validate()?;
        }

        let all: Vec<&ConditionData> = a.iter().chain(b).collect();
        let basis = self.learn_basis(&all)?;

        let trial_aucs_a = self.trial_aucs(a, &basis)?;
        let trial_aucs_b = self.trial_aucs(b, &basis)?;

        let pooled_a = pool_trials(&first_a.name, a)?;
        let pooled_b = pool_trials(&first_b.name, b)?;
        let (values_a, labels_a) = self.decision_values(&pooled_a, &basis)?;
        let (values_b, labels_b) = self.decision_values(&pooled_b, &basis)?;

        let comparison = compare_trials(&trial_aucs_a, &trial_aucs_b, &self.config.paired)?;
        let bias = bias_assessment(&trial_aucs_a, &trial_aucs_b)?;

        debug!(
            trials = a.len(),
            delta = comparison.delta_auc,
            bias_percent = bias.percent,
            "evaluated repeated trials"
        );

        Ok(EvaluationReport {
            condition_a: self.summarize(&pooled_a, &values_a, &labels_a, trial_aucs_a)?,
            condition_b: self.summarize(&pooled_b, &values_b, &labels_b, trial_aucs_b)?,
            comparison,
            bias: Some(bias),
            metadata: self.metadata(&basis, a.len()),
        })
    }

    /// Learn the shared channel basis from every patch of `conditions`.
    fn learn_basis(&self, conditions: &[&ConditionData]) -> Result<ChannelBasis> {
        let pixels = conditions.first().map_or(0, |c| c.pixels());
        for condition in conditions {
            if condition.pixels() != pixels {
                return Err(Error::dimension("patch length", pixels, condition.pixels()));
            }
        }

        match self.config.channels {
            None => Ok(ChannelBasis::identity(pixels)),
            Some(k) => {
                let parts: Vec<&PatchMatrix> = conditions
                    .iter()
                    .flat_map(|c| [&c.absent, &c.present])
                    .collect();
                let pool = stack_rows(&parts, pixels);
                learn_channels(&pool, k, self.config.channel_options, self.config.seed)
            }
        }
    }

    /// Decision values of all cases (absent first) with their presence flags.
    fn decision_values(
        &self,
        condition: &ConditionData,
        basis: &ChannelBasis,
    ) -> Result<(Vector, Vec<bool>)> {
        let (_, dv0, dv1) = ChannelizedObserver::fit_and_score(
            &condition.absent,
            &condition.present,
            basis,
            self.config.regularization,
        )?;
        let values = Vector::from_iterator(
            dv0.len() + dv1.len(),
            dv0.iter().chain(dv1.iter()).copied(),
        );
        let labels = std::iter::repeat(false)
            .take(dv0.len())
            .chain(std::iter::repeat(true).take(dv1.len()))
            .collect();
        Ok((values, labels))
    }

    fn trial_aucs(&self, trials: &[ConditionData], basis: &ChannelBasis) -> Result<Vec<f64>> {
        trials
            .iter()
            .map(|trial| {
                let (values, labels) = self.decision_values(trial, basis)?;
                auc(values.as_slice(), &labels)
            })
            .collect()
    }

    fn summarize(
        &self,
        condition: &ConditionData,
        values: &Vector,
        labels: &[bool],
        trial_aucs: Vec<f64>,
    ) -> Result<ConditionSummary> {
        let estimate = estimate_auc(
            values.as_slice(),
            labels,
            self.config.n_bootstrap,
            self.config.seed,
            self.config.alpha,
        )?;
        Ok(ConditionSummary {
            name: condition.name.clone(),
            auc: estimate,
            n_absent: condition.absent.nrows(),
            n_present: condition.present.nrows(),
            trial_aucs,
        })
    }

    fn metadata(&self, basis: &ChannelBasis, n_trials: usize) -> Metadata {
        Metadata {
            pixels: basis.pixels(),
            channels: basis.channels(),
            whitened: basis.is_whitened(),
            regularization: self.config.regularization,
            seed: self.config.seed,
            n_trials,
        }
    }
}

/// Concatenate all trials of one condition into a single case set.
fn pool_trials(name: &str, trials: &[ConditionData]) -> Result<ConditionData> {
    let pixels = trials.first().map_or(0, |t| t.pixels());
    if let Some(trial) = trials.iter().find(|t| t.pixels() != pixels) {
        return Err(Error::dimension("patch length", pixels, trial.pixels()));
    }
    let absent: Vec<&PatchMatrix> = trials.iter().map(|t| &t.absent).collect();
    let present: Vec<&PatchMatrix> = trials.iter().map(|t| &t.present).collect();
    Ok(ConditionData::new(
        name,
        stack_rows(&absent, pixels),
        stack_rows(&present, pixels),
    ))
}

/// Vertically stack matrices that all have `pixels` columns.
fn stack_rows(parts: &[&PatchMatrix], pixels: usize) -> PatchMatrix {
    let total = parts.iter().map(|m| m.nrows()).sum();
    let mut stacked = DMatrix::zeros(total, pixels);
    let mut offset = 0;
    for part in parts {
        stacked.rows_mut(offset, part.nrows()).copy_from(*part);
        offset += part.nrows();
    }
    stacked
}
