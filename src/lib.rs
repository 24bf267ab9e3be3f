//! # observer-eval
//!
//! Task-based image quality evaluation with a channelized Hotelling observer.
//!
//! This crate scores labeled image patches from two reconstruction conditions
//! (e.g. FBP and MAR) with a linear observer and reports:
//! - AUC per condition with a seeded bootstrap confidence interval
//! - ΔAUC between the conditions with a one-tailed paired p-value
//! - Bias of one condition relative to the other over repeated trials
//!
//! ## Pipeline
//!
//! ```text
//! patches ─► learn_channels ─► fit_template ─► score ─► estimate_auc ─► compare_paired
//! ```
//!
//! Every stage is a pure function and every random draw is seeded, so the
//! same inputs always give the same report, with or without the `parallel`
//! feature.
//!
//! ## Quick Start
//!
//! ```ignore
//! use observer_eval::{ConditionData, Evaluator};
//!
//! let fbp = ConditionData::new("FBP", fbp_absent, fbp_present);
//! let mar = ConditionData::new("MAR", mar_absent, mar_present);
//!
//! let report = Evaluator::new().channels(10).evaluate(&fbp, &mar)?;
//! println!("{}", observer_eval::output::format_report(&report));
//! ```
//!
//! The stages can also be used on their own:
//!
//! ```ignore
//! use observer_eval::{estimate_auc, fit_template, learn_channels, ChannelOptions};
//!
//! let basis = learn_channels(&pool, 4, ChannelOptions::default(), 42)?;
//! let template = fit_template(&basis.project(&absent)?, &basis.project(&present)?, 1e-3)?;
//! let estimate = estimate_auc(values.as_slice(), &labels, 2000, 42, 0.05)?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
mod config;
mod constants;
mod error;
mod evaluator;
mod result;
#[cfg(feature = "parallel")]
mod thread_pool;
mod types;

// Functional modules
pub mod analysis;
pub mod observer;
pub mod output;
pub mod statistics;
pub mod study;

// Re-exports for public API
pub use analysis::{bias_assessment, compare_paired, PairedSamples};
pub use config::{ChannelOptions, Config, PairedConfig};
pub use constants::{
    DEFAULT_ALPHA, DEFAULT_BOOTSTRAP_ITERATIONS, DEFAULT_REGULARIZATION, DEFAULT_SEED,
    MAX_BOOTSTRAP_ITERATIONS, NOMINAL_DELTA_SE, SMALL_SAMPLE_THRESHOLD, WHITEN_FLOOR,
};
pub use error::{Error, Result};
pub use evaluator::{ConditionData, Evaluator};
pub use observer::{
    fit_template, learn_channels, score, ChannelBasis, ChannelizedObserver, Template,
};
pub use result::{
    AucEstimate, BiasSummary, ConditionSummary, EvaluationReport, Metadata, PairedComparison,
    TestMethod,
};
pub use statistics::{auc, estimate_auc};
pub use types::{binarize, patches_from_rows, ChannelMatrix, Class, Label, PatchMatrix, Vector};

/// Evaluate two matched conditions with default configuration.
///
/// Shorthand for `Evaluator::new().evaluate(a, b)`: identity channels,
/// λ = 1e-3, 2,000 bootstrap resamples and seed 42.
pub fn evaluate(a: &ConditionData, b: &ConditionData) -> Result<EvaluationReport> {
    Evaluator::new().evaluate(a, b)
}
