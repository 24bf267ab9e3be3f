//! Comparison of two reconstruction conditions.
//!
//! 1. **Paired test** ([`paired`]): one-tailed test of AUC_B > AUC_A, over
//!    per-trial AUCs or by matched bootstrap over scored cases
//! 2. **Bias** ([`bias`]): mean, spread and relative size of AUC_B − AUC_A

mod bias;
mod paired;

pub use bias::bias_assessment;
pub use paired::{compare_paired, compare_scored, compare_trials, PairedSamples};
