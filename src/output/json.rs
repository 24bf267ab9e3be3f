//! JSON serialization for evaluation reports.

use crate::result::EvaluationReport;

/// Serialize an EvaluationReport to a compact JSON string.
///
/// # Errors
///
/// Returns an error if serialization fails (should not happen for EvaluationReport).
pub fn to_json(report: &EvaluationReport) -> Result<String, serde_json::Error> {
    serde_json::to_string(report)
}

/// Serialize an EvaluationReport to a pretty-printed JSON string.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_json_pretty(report: &EvaluationReport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::result::{
        AucEstimate, BiasSummary, ConditionSummary, Metadata, PairedComparison, TestMethod,
    };

    pub(crate) fn make_report(p_value: f64, bias: Option<BiasSummary>) -> EvaluationReport {
        let estimate = |auc: f64| AucEstimate {
            auc,
            ci: (auc - 0.05, auc + 0.04),
            n_bootstrap: 2000,
            n_valid: 2000,
            alpha: 0.05,
            seed: 42,
        };
        EvaluationReport {
            condition_a: ConditionSummary {
                name: "FBP".to_string(),
                auc: estimate(0.75),
                n_absent: 100,
                n_present: 100,
                trial_aucs: vec![0.74, 0.76],
            },
            condition_b: ConditionSummary {
                name: "MAR".to_string(),
                auc: estimate(0.82),
                n_absent: 100,
                n_present: 100,
                trial_aucs: vec![0.81, 0.83],
            },
            comparison: PairedComparison {
                auc_a: 0.75,
                auc_b: 0.82,
                delta_auc: 0.07,
                p_value,
                statistic: Some(7.0),
                method: TestMethod::PairedT,
                n_pairs: 2,
                n_valid: None,
                one_tailed: true,
            },
            bias,
            metadata: Metadata {
                pixels: 81,
                channels: 4,
                whitened: false,
                regularization: 1e-3,
                seed: 42,
                n_trials: 2,
            },
        }
    }

    #[test]
    fn test_to_json() {
        let report = make_report(0.01, None);
        let json = to_json(&report).unwrap();
        assert!(json.contains("\"name\":\"FBP\""));
        assert!(json.contains("\"method\":\"PairedT\""));
        assert!(json.contains("\"bias\":null"));
    }

    #[test]
    fn test_to_json_pretty() {
        let report = make_report(0.01, None);
        let json = to_json_pretty(&report).unwrap();
        assert!(json.contains('\n')); // Pretty print has newlines
        assert!(json.contains("delta_auc"));
    }

    #[test]
    fn test_json_round_trip() {
        let report = make_report(
            0.2,
            Some(BiasSummary {
                mean: 0.07,
                std: 0.0,
                percent: 9.333,
                n: 2,
            }),
        );
        let json = to_json(&report).unwrap();
        let back: EvaluationReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.condition_b.name, "MAR");
        assert_eq!(back.comparison.method, TestMethod::PairedT);
        assert_eq!(back.metadata.channels, 4);
        assert!((back.comparison.delta_auc - 0.07).abs() < 1e-12);
        assert_eq!(back.bias.map(|b| b.n), Some(2));
    }
}
