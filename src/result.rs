//! Result types produced by the observer pipeline.

use serde::{Deserialize, Serialize};

/// AUC point estimate with its bootstrap confidence interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AucEstimate {
    /// Area under the ROC curve (0.0 to 1.0).
    pub auc: f64,

    /// Percentile bootstrap interval (lo, hi); always contains `auc`.
    pub ci: (f64, f64),

    /// Number of bootstrap resamples drawn (the request, capped at
    /// [`MAX_BOOTSTRAP_ITERATIONS`](crate::MAX_BOOTSTRAP_ITERATIONS)).
    pub n_bootstrap: usize,

    /// Resamples that contained both classes and entered the interval.
    pub n_valid: usize,

    /// Significance level of the interval.
    pub alpha: f64,

    /// Seed used for resampling.
    pub seed: u64,
}

impl AucEstimate {
    /// Width of the confidence interval.
    pub fn ci_width(&self) -> f64 {
        self.ci.1 - self.ci.0
    }
}

/// How the significance of a paired comparison was established.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TestMethod {
    /// Paired t-test over per-trial AUCs.
    PairedT,
    /// Normal approximation with a nominal standard error (too few pairs).
    NormalApprox,
    /// Matched bootstrap of ΔAUC over the same resampled cases.
    MatchedBootstrap,
}

/// Outcome of comparing condition B against condition A.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairedComparison {
    /// AUC of condition A (mean over trials for trial input).
    pub auc_a: f64,

    /// AUC of condition B (mean over trials for trial input).
    pub auc_b: f64,

    /// AUC_B − AUC_A (mean paired difference for trial input).
    pub delta_auc: f64,

    /// Probability of a delta at least this large under no improvement.
    ///
    /// Two-tailed when `one_tailed` is false.
    pub p_value: f64,

    /// Test statistic (t or z) when the method has one.
    pub statistic: Option<f64>,

    /// Method that produced `p_value`.
    pub method: TestMethod,

    /// Number of paired trials, or matched cases for scored input.
    pub n_pairs: usize,

    /// Surviving matched resamples (matched bootstrap only).
    pub n_valid: Option<usize>,

    /// Whether `p_value` tests the directional hypothesis B > A.
    pub one_tailed: bool,
}

impl PairedComparison {
    /// Whether B is significantly better than A at level `alpha`.
    pub fn is_significant(&self, alpha: f64) -> bool {
        self.p_value < alpha && self.delta_auc > 0.0
    }
}

/// Bias of condition B relative to condition A over repeated AUC estimates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiasSummary {
    /// Mean of AUC_B − AUC_A.
    pub mean: f64,

    /// Population standard deviation of AUC_B − AUC_A.
    pub std: f64,

    /// 100 · mean / mean(AUC_A).
    pub percent: f64,

    /// Number of paired estimates.
    pub n: usize,
}

/// Per-condition part of an evaluation report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionSummary {
    /// Condition label (e.g. reconstruction name).
    pub name: String,

    /// AUC of all decision values of this condition.
    pub auc: AucEstimate,

    /// Signal-absent samples scored.
    pub n_absent: usize,

    /// Signal-present samples scored.
    pub n_present: usize,

    /// Per-trial AUC point estimates (empty for single-set evaluation).
    pub trial_aucs: Vec<f64>,
}

/// Settings the report was produced with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Patch length q.
    pub pixels: usize,

    /// Channels k actually used.
    pub channels: usize,

    /// Whether the channels were whitened.
    pub whitened: bool,

    /// Tikhonov regularization.
    pub regularization: f64,

    /// Seed used for resampling.
    pub seed: u64,

    /// Number of paired trials (1 for single-set evaluation).
    pub n_trials: usize,
}

/// Complete result of evaluating condition B against condition A.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// Reference condition (e.g. FBP).
    pub condition_a: ConditionSummary,

    /// Candidate condition (e.g. MAR).
    pub condition_b: ConditionSummary,

    /// Significance of the improvement of B over A.
    pub comparison: PairedComparison,

    /// Bias summary (trial evaluation only).
    pub bias: Option<BiasSummary>,

    /// Settings used.
    pub metadata: Metadata,
}
