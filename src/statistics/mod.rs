//! Statistical methods for observer evaluation.
//!
//! This module provides the resampling and ROC infrastructure:
//! - Rank-based AUC (Mann–Whitney) with bootstrap confidence intervals
//! - Counter-seeded case bootstrap that is reproducible under parallelism
//! - Empirical quantiles of bootstrap distributions

mod auc;
mod bootstrap;
mod quantile;

pub use auc::{auc, estimate_auc};
pub use bootstrap::{
    bootstrap_replicates, bounded_iterations, counter_rng_seed, replicate_rng,
    resample_indices_into,
};
pub use quantile::{percentile_interval, quantile_sorted};

pub(crate) use auc::{auc_at, prepare};
