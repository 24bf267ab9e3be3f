//! Terminal output formatting with colors and box drawing.

use colored::Colorize;

use crate::result::{AucEstimate, ConditionSummary, EvaluationReport, TestMethod};

/// Significance level used to colour the comparison verdict.
const VERDICT_ALPHA: f64 = 0.05;

/// Format an EvaluationReport for human-readable terminal output.
pub fn format_report(report: &EvaluationReport) -> String {
    let mut output = String::new();
    let sep = "\u{2500}".repeat(62);

    output.push_str("observer-eval\n");
    output.push_str(&sep);
    output.push('\n');
    output.push('\n');

    let meta = &report.metadata;
    output.push_str(&format!(
        "  Channels: {} of {} pixels{}\n",
        meta.channels,
        meta.pixels,
        if meta.whitened { " (whitened)" } else { "" }
    ));
    output.push_str(&format!("  Regularization: {:e}\n", meta.regularization));
    if meta.n_trials > 1 {
        output.push_str(&format!("  Trials: {}\n", meta.n_trials));
    }
    output.push('\n');

    output.push_str(&format_condition(&report.condition_a));
    output.push_str(&format_condition(&report.condition_b));
    output.push('\n');

    let cmp = &report.comparison;
    let verdict = format!(
        "{} vs {}: \u{0394}AUC = {:+.3}",
        report.condition_b.name, report.condition_a.name, cmp.delta_auc
    );
    if cmp.is_significant(VERDICT_ALPHA) {
        output.push_str(&format!("  {}\n\n", format!("\u{2713} {}", verdict).green().bold()));
    } else {
        output.push_str(&format!("  {}\n\n", format!("\u{2022} {}", verdict).yellow().bold()));
    }

    output.push_str(&format!(
        "    p-value: {:.4} ({}, {})\n",
        cmp.p_value,
        if cmp.one_tailed { "one-tailed" } else { "two-tailed" },
        format_method(cmp.method)
    ));
    if let Some(n_valid) = cmp.n_valid {
        output.push_str(&format!("    Usable resamples: {}\n", n_valid));
    }

    if let Some(ref bias) = report.bias {
        output.push_str(&format!(
            "    Bias: {:+.4} \u{00B1} {:.4} ({:+.1}%)\n",
            bias.mean, bias.std, bias.percent
        ));
    }

    output.push('\n');
    output.push_str(&sep);
    output.push('\n');

    if cmp.method == TestMethod::NormalApprox {
        output.push_str(&format!(
            "{}\n",
            "Note: Too few pairs for a t-test; p-value uses a nominal standard error.".dimmed()
        ));
    }

    output
}

fn format_condition(condition: &ConditionSummary) -> String {
    format!(
        "  {:<12} AUC {} ({} absent, {} present)\n",
        condition.name,
        format_auc(&condition.auc),
        condition.n_absent,
        condition.n_present
    )
}

fn format_auc(estimate: &AucEstimate) -> String {
    let level = (1.0 - estimate.alpha) * 100.0;
    format!(
        "{:.3} [{:.0}% CI: {:.3}\u{2013}{:.3}]",
        estimate.auc, level, estimate.ci.0, estimate.ci.1
    )
}

/// Format TestMethod for display.
fn format_method(method: TestMethod) -> &'static str {
    match method {
        TestMethod::PairedT => "paired t-test",
        TestMethod::NormalApprox => "normal approximation",
        TestMethod::MatchedBootstrap => "matched bootstrap",
    }
}
