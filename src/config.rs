//! Configuration for observer evaluation.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_ALPHA, DEFAULT_BOOTSTRAP_ITERATIONS, DEFAULT_REGULARIZATION, DEFAULT_SEED,
    NOMINAL_DELTA_SE, SMALL_SAMPLE_THRESHOLD,
};

/// Configuration options for [`Evaluator`](crate::Evaluator).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Number of PCA channels to learn (default: None).
    ///
    /// `None` uses the identity basis, i.e. one channel per pixel.
    pub channels: Option<usize>,

    /// How channels are learned when `channels` is set.
    pub channel_options: ChannelOptions,

    /// Tikhonov regularization added to the pooled covariance (default: 1e-3).
    pub regularization: f64,

    /// Bootstrap resamples for AUC confidence intervals (default: 2,000).
    pub n_bootstrap: usize,

    /// Significance level of the AUC confidence interval (default: 0.05).
    pub alpha: f64,

    /// Seed for channel subsampling and AUC resampling (default: 42).
    pub seed: u64,

    /// Settings for the paired comparison between conditions.
    pub paired: PairedConfig,
}

/// Options for PCA channel learning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChannelOptions {
    /// Divide each channel by its singular value (default: false).
    pub whiten: bool,

    /// Re-orthonormalize the channels after whitening (default: false).
    ///
    /// QR restores unit norms, so together with `whiten` this cancels the
    /// whitening and the basis is reported as not whitened.
    pub reorthonormalize: bool,

    /// Learn from a seeded random subset of at most this many patches.
    pub max_pool: Option<usize>,
}

/// Settings for [`compare_paired`](crate::analysis::compare_paired).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairedConfig {
    /// Test H1: B > A (default: true). When false a two-tailed p-value is reported.
    pub one_tailed: bool,

    /// Fewer paired trials than this use the normal approximation (default: 5).
    pub small_sample_threshold: usize,

    /// Standard error assumed by the normal approximation (default: 0.05).
    ///
    /// This is a placeholder heuristic rather than a validated estimate; tune
    /// it for the study at hand.
    pub nominal_se: f64,

    /// Matched resamples when comparing scored samples (default: 2,000).
    pub n_bootstrap: usize,

    /// Seed for matched resampling (default: 42).
    pub seed: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            channels: None,
            channel_options: ChannelOptions::default(),
            regularization: DEFAULT_REGULARIZATION,
            n_bootstrap: DEFAULT_BOOTSTRAP_ITERATIONS,
            alpha: DEFAULT_ALPHA,
            seed: DEFAULT_SEED,
            paired: PairedConfig::default(),
        }
    }
}

impl Default for PairedConfig {
    fn default() -> Self {
        Self {
            one_tailed: true,
            small_sample_threshold: SMALL_SAMPLE_THRESHOLD,
            nominal_se: NOMINAL_DELTA_SE,
            n_bootstrap: DEFAULT_BOOTSTRAP_ITERATIONS,
            seed: DEFAULT_SEED,
        }
    }
}
