//! Analysis report: every analysis over one run, a plain-text summary and
//! the CI verdict.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use scalebench_core::config::ScalebenchConfig;

use crate::classifier::{ComplexityClassification, ComplexityClassifier};
use crate::comparator::{
    BaselineComparison, FindingKind, PerformanceThreshold, RegressionComparator, RegressionFinding, ThresholdReport,
};
use crate::result_set::ResultSet;
use crate::stability::{PointStability, StabilityDetector};

const RULE: &str = "╠══════════════════════════════════════════════════════════════╣\n";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub classifications: Vec<ComplexityClassification>,
    pub stability: Vec<PointStability>,
    pub thresholds: ThresholdReport,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline: Option<BaselineComparison>,
    /// Fraction of faulty samples per operation.
    pub failure_rates: BTreeMap<String, f64>,
    /// The baseline was captured on a different OS, arch or build profile.
    pub environment_mismatch: bool,
}

impl AnalysisReport {
    /// Run every analysis over `current`.
    pub fn build(
        current: &ResultSet,
        thresholds: &[PerformanceThreshold],
        baseline: Option<&ResultSet>,
        config: &ScalebenchConfig,
    ) -> Self {
        let stability = StabilityDetector::from_config(&config.analysis);
        let classifier = ComplexityClassifier::from_config(&config.analysis);
        let comparator = RegressionComparator::new(stability);

        let mut baseline_comparison =
            baseline.map(|b| comparator.compare_with_config(b, current, &config.regression));
        if !config.regression.effective_report_improvements() {
            if let Some(comparison) = baseline_comparison.as_mut() {
                comparison.findings.retain(RegressionFinding::is_slowdown);
            }
        }

        let environment_mismatch = match (baseline.and_then(|b| b.environment.as_ref()), current.environment.as_ref()) {
            (Some(base), Some(cur)) => !base.comparable_with(cur),
            _ => false,
        };
        if environment_mismatch {
            tracing::warn!("baseline was captured in a different environment");
        }

        Self {
            classifications: classifier.classify_all(current),
            stability: stability.assess(current),
            thresholds: comparator.check_thresholds(current, thresholds),
            baseline: baseline_comparison,
            failure_rates: current
                .operations()
                .map(|op| (op.to_string(), current.failure_rate(op)))
                .collect(),
            environment_mismatch,
        }
    }

    /// Threshold findings followed by baseline findings.
    pub fn findings(&self) -> impl Iterator<Item = &RegressionFinding> {
        self.thresholds
            .findings
            .iter()
            .chain(self.baseline.iter().flat_map(|b| b.findings.iter()))
    }

    pub fn slowdowns(&self) -> impl Iterator<Item = &RegressionFinding> {
        self.findings().filter(|f| f.kind == FindingKind::Slowdown)
    }

    pub fn has_blocking_regressions(&self) -> bool {
        self.slowdowns().next().is_some()
    }

    /// Process exit code for CI: 1 when any finding is a slowdown.
    pub fn exit_code(&self) -> i32 {
        i32::from(self.has_blocking_regressions())
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Human-readable summary.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        out.push_str("╔══════════════════════════════════════════════════════════════╗\n");
        out.push_str("║  SCALEBENCH REPORT\n");
        out.push_str(RULE);
        out.push_str(&format!(
            "║  {:24} {:>18} {:>8} {:>8}\n",
            "OPERATION", "COMPLEXITY", "FIT", "FAULTS"
        ));
        for c in &self.classifications {
            let mut flags = String::new();
            if c.is_low_confidence() {
                flags.push_str(" low-confidence");
            }
            if c.is_unstable() {
                flags.push_str(" unstable");
            }
            let faults = self.failure_rates.get(&c.operation).copied().unwrap_or_default();
            out.push_str(&format!(
                "║  {:24} {:>18} {:>8.2} {:>7.1}%{}\n",
                c.operation,
                c.class.as_str(),
                c.fit_quality,
                faults * 100.0,
                flags
            ));
        }

        let unstable: Vec<&PointStability> = self.stability.iter().filter(|s| s.unstable).collect();
        if !unstable.is_empty() {
            out.push_str(RULE);
            out.push_str(&format!("║  UNSTABLE POINTS ({})\n", unstable.len()));
            for s in unstable {
                out.push_str(&format!("║    {} @ {}: cv={:.3}\n", s.operation, s.point, s.cv));
            }
        }

        let findings: Vec<&RegressionFinding> = self.findings().collect();
        out.push_str(RULE);
        if findings.is_empty() {
            out.push_str("║  No regressions detected\n");
        } else {
            out.push_str(&format!("║  FINDINGS ({})\n", findings.len()));
            for f in findings {
                out.push_str(&format!("║    {}\n", f));
            }
        }

        if !self.thresholds.not_measured.is_empty() {
            out.push_str(&format!(
                "║  Thresholds without valid samples: {}\n",
                self.thresholds.not_measured.join(", ")
            ));
        }
        if let Some(b) = &self.baseline {
            if !b.not_re_measured.is_empty() {
                out.push_str(&format!("║  Not re-measured: {}\n", b.not_re_measured.join(", ")));
            }
            if !b.new_operations.is_empty() {
                out.push_str(&format!("║  New operations: {}\n", b.new_operations.join(", ")));
            }
            for u in &b.unmatched {
                out.push_str(&format!("║  Unmatched: {} @ {} ({})\n", u.operation, u.point, u.reason.as_str()));
            }
        }
        if self.environment_mismatch {
            out.push_str("║  WARNING: baseline environment differs from this run\n");
        }

        out.push_str(RULE);
        out.push_str(&format!(
            "║  Verdict: {}\n",
            if self.has_blocking_regressions() { "FAIL" } else { "PASS" }
        ));
        out.push_str("╚══════════════════════════════════════════════════════════════╝\n");
        out
    }
}
