//! Numerical constants shared across the observer pipeline.

/// Floor added to singular values before whitening a channel.
pub const WHITEN_FLOOR: f64 = 1e-8;

/// Default Tikhonov regularization for the pooled covariance.
pub const DEFAULT_REGULARIZATION: f64 = 1e-3;

/// Default number of bootstrap resamples.
pub const DEFAULT_BOOTSTRAP_ITERATIONS: usize = 2_000;

/// Default significance level for confidence intervals.
pub const DEFAULT_ALPHA: f64 = 0.05;

/// Default resampling seed.
pub const DEFAULT_SEED: u64 = 42;

/// Upper bound on bootstrap resamples for any single estimate.
pub const MAX_BOOTSTRAP_ITERATIONS: usize = 1_000_000;

/// Below this many paired trials the t-test is replaced by a normal approximation.
pub const SMALL_SAMPLE_THRESHOLD: usize = 5;

/// Nominal standard error of ΔAUC for the small-sample normal approximation.
///
/// Placeholder heuristic, not a validated quantity.
pub const NOMINAL_DELTA_SE: f64 = 0.05;
