//! Regression comparison against declared thresholds or a stored baseline.
//!
//! Both modes are pure functions of their inputs. A finding is produced only
//! when a comparison exceeds its tolerance; coverage gaps are reported next
//! to the findings (not-re-measured operations, unmatched points) and never
//! as silent absences.

use std::fmt;
use std::time::Duration;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use scalebench_core::config::RegressionConfig;
use scalebench_core::types::DimensionPoint;

use crate::result_set::ResultSet;
use crate::sample::MeasurementSample;
use crate::stability::StabilityDetector;

/// The per-iteration figure a finding is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    NsPerIter,
    AllocsPerIter,
}

impl Metric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NsPerIter => "ns/iter",
            Self::AllocsPerIter => "allocs/iter",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    /// Current is worse than the reference.
    Slowdown,
    /// Current is better than the reference by more than the tolerance.
    Improvement,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionFinding {
    pub operation: String,
    pub metric: Metric,
    /// Where the difference was observed.
    pub point: DimensionPoint,
    /// Baseline mean, or the declared maximum in threshold mode.
    pub baseline_value: f64,
    pub current_value: f64,
    pub pct_diff: f64,
    pub exceeded_tolerance: bool,
    pub kind: FindingKind,
    /// Either side of the comparison was measured at an unstable point.
    pub unstable: bool,
}

impl RegressionFinding {
    pub fn is_slowdown(&self) -> bool {
        self.kind == FindingKind::Slowdown
    }
}

impl fmt::Display for RegressionFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            FindingKind::Slowdown => "SLOWDOWN",
            FindingKind::Improvement => "improvement",
        };
        write!(
            f,
            "{} {} @ {}: {:.2} -> {:.2} {} ({:+.1}%)",
            kind,
            self.operation,
            self.point,
            self.baseline_value,
            self.current_value,
            self.metric.as_str(),
            self.pct_diff
        )?;
        if self.unstable {
            f.write_str(" [unstable]")?;
        }
        Ok(())
    }
}

/// Declared performance budget for one operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceThreshold {
    pub operation: String,
    pub max_time_per_iter: Option<Duration>,
    /// Exact bound; never scaled by the tolerance.
    pub max_allocs_per_iter: Option<u64>,
    /// Headroom on the time bound, in percent.
    pub tolerance_pct: f64,
}

impl PerformanceThreshold {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            max_time_per_iter: None,
            max_allocs_per_iter: None,
            tolerance_pct: 0.0,
        }
    }

    pub fn with_max_time(mut self, max: Duration) -> Self {
        self.max_time_per_iter = Some(max);
        self
    }

    pub fn with_max_allocs(mut self, max: u64) -> Self {
        self.max_allocs_per_iter = Some(max);
        self
    }

    pub fn with_tolerance_pct(mut self, tolerance_pct: f64) -> Self {
        self.tolerance_pct = tolerance_pct;
        self
    }
}

/// Result of threshold mode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThresholdReport {
    pub findings: Vec<RegressionFinding>,
    /// Operations with a threshold but no valid samples.
    pub not_measured: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmatchedReason {
    MissingInBaseline,
    MissingInCurrent,
    NoValidBaselineSamples,
    NoValidCurrentSamples,
    /// Every sample on both sides was faulty.
    NoValidSamples,
}

impl UnmatchedReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingInBaseline => "missing in baseline",
            Self::MissingInCurrent => "missing in current",
            Self::NoValidBaselineSamples => "no valid baseline samples",
            Self::NoValidCurrentSamples => "no valid current samples",
            Self::NoValidSamples => "no valid samples on either side",
        }
    }
}

/// A dimension point that could not be compared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnmatchedPoint {
    pub operation: String,
    pub point: DimensionPoint,
    pub reason: UnmatchedReason,
}

/// Result of baseline mode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BaselineComparison {
    pub findings: Vec<RegressionFinding>,
    pub unmatched: Vec<UnmatchedPoint>,
    /// Operations in the baseline that the current run did not measure.
    pub not_re_measured: Vec<String>,
    /// Operations measured now that the baseline does not have.
    pub new_operations: Vec<String>,
    pub tolerance_pct: f64,
}

/// Percent difference of `current` relative to `base`.
fn pct_diff(base: f64, current: f64) -> f64 {
    if base == 0.0 {
        if current == 0.0 {
            0.0
        } else {
            f64::INFINITY.copysign(current)
        }
    } else {
        (current - base) / base * 100.0
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RegressionComparator {
    stability: StabilityDetector,
}

impl RegressionComparator {
    pub fn new(stability: StabilityDetector) -> Self {
        Self { stability }
    }

    /// Check the worst valid sample of each thresholded operation against
    /// its declared budget.
    pub fn check_thresholds(&self, current: &ResultSet, thresholds: &[PerformanceThreshold]) -> ThresholdReport {
        let mut report = ThresholdReport::default();

        for threshold in thresholds {
            let op = threshold.operation.as_str();
            let valid: Vec<&MeasurementSample> = current.valid_samples(op).collect();
            if valid.is_empty() {
                report.not_measured.push(op.to_string());
                continue;
            }

            if let Some(max) = threshold.max_time_per_iter {
                let worst = worst_by(&valid, |s| s.ns_per_iter);
                let max_ns = max.as_nanos() as f64;
                let limit = max_ns * (1.0 + threshold.tolerance_pct / 100.0);
                if worst.ns_per_iter > limit {
                    report.findings.push(self.threshold_finding(
                        current,
                        worst,
                        Metric::NsPerIter,
                        max_ns,
                        worst.ns_per_iter,
                    ));
                }
            }

            if let Some(max) = threshold.max_allocs_per_iter {
                let worst = worst_by(&valid, |s| s.allocs_per_iter);
                let max = max as f64;
                if worst.allocs_per_iter > max {
                    report.findings.push(self.threshold_finding(
                        current,
                        worst,
                        Metric::AllocsPerIter,
                        max,
                        worst.allocs_per_iter,
                    ));
                }
            }
        }

        for finding in &report.findings {
            tracing::info!(
                operation = %finding.operation,
                point = %finding.point,
                pct_diff = finding.pct_diff,
                metric = finding.metric.as_str(),
                "threshold exceeded"
            );
        }
        report
    }

    fn threshold_finding(
        &self,
        current: &ResultSet,
        worst: &MeasurementSample,
        metric: Metric,
        limit: f64,
        observed: f64,
    ) -> RegressionFinding {
        let times = current.valid_times_at(&worst.operation, &worst.point);
        RegressionFinding {
            operation: worst.operation.clone(),
            metric,
            point: worst.point.clone(),
            baseline_value: limit,
            current_value: observed,
            pct_diff: pct_diff(limit, observed),
            exceeded_tolerance: true,
            kind: FindingKind::Slowdown,
            unstable: self.stability.is_unstable(&times),
        }
    }

    /// Match `current` against `baseline` point by point.
    pub fn compare(&self, baseline: &ResultSet, current: &ResultSet, tolerance_pct: f64) -> BaselineComparison {
        let mut out = BaselineComparison {
            tolerance_pct,
            ..BaselineComparison::default()
        };

        for op in baseline.operations() {
            if !current.contains(op) {
                out.not_re_measured.push(op.to_string());
            }
        }
        for op in current.operations() {
            if !baseline.contains(op) {
                out.new_operations.push(op.to_string());
                continue;
            }
            self.compare_operation(op, baseline, current, tolerance_pct, &mut out);
        }

        tracing::info!(
            findings = out.findings.len(),
            unmatched = out.unmatched.len(),
            not_re_measured = out.not_re_measured.len(),
            "baseline comparison finished"
        );
        out
    }

    pub fn compare_with_config(
        &self,
        baseline: &ResultSet,
        current: &ResultSet,
        config: &RegressionConfig,
    ) -> BaselineComparison {
        self.compare(baseline, current, config.effective_tolerance_pct())
    }

    fn compare_operation(
        &self,
        op: &str,
        baseline: &ResultSet,
        current: &ResultSet,
        tolerance_pct: f64,
        out: &mut BaselineComparison,
    ) {
        let base_times = times_by_point(baseline.samples(op));
        let cur_times = times_by_point(current.samples(op));

        for point in current.points(op) {
            let Some(cur) = cur_times.get(&point) else {
                continue;
            };
            let Some(base) = base_times.get(&point) else {
                out.unmatched.push(UnmatchedPoint {
                    operation: op.to_string(),
                    point,
                    reason: UnmatchedReason::MissingInBaseline,
                });
                continue;
            };

            let reason = match (base.is_empty(), cur.is_empty()) {
                (true, true) => Some(UnmatchedReason::NoValidSamples),
                (true, false) => Some(UnmatchedReason::NoValidBaselineSamples),
                (false, true) => Some(UnmatchedReason::NoValidCurrentSamples),
                (false, false) => None,
            };
            if let Some(reason) = reason {
                out.unmatched.push(UnmatchedPoint {
                    operation: op.to_string(),
                    point,
                    reason,
                });
                continue;
            }

            let base_mean = base.as_slice().mean();
            let cur_mean = cur.as_slice().mean();
            let diff = pct_diff(base_mean, cur_mean);
            if diff.abs() > tolerance_pct {
                let unstable = self.stability.is_unstable(base) || self.stability.is_unstable(cur);
                out.findings.push(RegressionFinding {
                    operation: op.to_string(),
                    metric: Metric::NsPerIter,
                    point,
                    baseline_value: base_mean,
                    current_value: cur_mean,
                    pct_diff: diff,
                    exceeded_tolerance: true,
                    kind: if diff > 0.0 {
                        FindingKind::Slowdown
                    } else {
                        FindingKind::Improvement
                    },
                    unstable,
                });
            }
        }

        for point in baseline.points(op) {
            if !cur_times.contains_key(&point) {
                out.unmatched.push(UnmatchedPoint {
                    operation: op.to_string(),
                    point,
                    reason: UnmatchedReason::MissingInCurrent,
                });
            }
        }
    }
}

/// Valid per-iteration times keyed by point. Points whose samples are all
/// faulty map to an empty list.
fn times_by_point(samples: &[MeasurementSample]) -> FxHashMap<DimensionPoint, Vec<f64>> {
    let mut map: FxHashMap<DimensionPoint, Vec<f64>> = FxHashMap::default();
    for s in samples {
        let times = map.entry(s.point.clone()).or_default();
        if s.is_valid() {
            times.push(s.ns_per_iter);
        }
    }
    map
}

/// First sample with the largest `key`.
fn worst_by<'a>(samples: &[&'a MeasurementSample], key: impl Fn(&MeasurementSample) -> f64) -> &'a MeasurementSample {
    let mut worst = samples[0];
    for &s in &samples[1..] {
        if key(s) > key(worst) {
            worst = s;
        }
    }
    worst
}
