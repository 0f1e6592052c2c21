//! Measurement stability: coefficient of variation per (operation, point).

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use scalebench_core::config::AnalysisConfig;
use scalebench_core::types::DimensionPoint;

use crate::result_set::ResultSet;

/// Sample standard deviation divided by the mean.
///
/// `None` for fewer than two values or a non-positive mean.
pub fn coefficient_of_variation(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let mean = values.mean();
    if !(mean.is_finite() && mean > 0.0) {
        return None;
    }
    let cv = values.std_dev() / mean;
    cv.is_finite().then_some(cv)
}

/// Stability verdict for one (operation, point).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointStability {
    pub operation: String,
    pub point: DimensionPoint,
    pub samples: usize,
    pub mean_ns: f64,
    pub cv: f64,
    pub unstable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StabilityDetector {
    threshold: f64,
}

impl Default for StabilityDetector {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}

impl StabilityDetector {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(config.effective_stability_cv_threshold())
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Whether `times` vary by more than the threshold. Too few values to
    /// assess counts as stable.
    pub fn is_unstable(&self, times: &[f64]) -> bool {
        coefficient_of_variation(times).is_some_and(|cv| cv > self.threshold)
    }

    pub fn assess_point(&self, results: &ResultSet, operation: &str, point: &DimensionPoint) -> Option<PointStability> {
        let times = results.valid_times_at(operation, point);
        let cv = coefficient_of_variation(&times)?;
        Some(PointStability {
            operation: operation.to_string(),
            point: point.clone(),
            samples: times.len(),
            mean_ns: times.as_slice().mean(),
            cv,
            unstable: cv > self.threshold,
        })
    }

    /// Assess every point of every operation, in operation then sweep order.
    pub fn assess(&self, results: &ResultSet) -> Vec<PointStability> {
        let mut out = Vec::new();
        for operation in results.operations() {
            for point in results.points(operation) {
                if let Some(stability) = self.assess_point(results, operation, &point) {
                    if stability.unstable {
                        tracing::warn!(
                            operation = %operation,
                            point = %point,
                            cv = stability.cv,
                            "unstable measurement point"
                        );
                    }
                    out.push(stability);
                }
            }
        }
        out
    }

    /// Points of `operation` classed as unstable.
    pub fn unstable_points(&self, results: &ResultSet, operation: &str) -> Vec<DimensionPoint> {
        results
            .points(operation)
            .into_iter()
            .filter(|p| self.is_unstable(&results.valid_times_at(operation, p)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cv_of_spread_values() {
        let cv = coefficient_of_variation(&[50.0, 100.0, 150.0]).unwrap();
        assert!((cv - 0.5).abs() < 1e-9);
        assert!(StabilityDetector::default().is_unstable(&[50.0, 100.0, 150.0]));
    }

    #[test]
    fn cv_of_tight_values() {
        let cv = coefficient_of_variation(&[95.0, 100.0, 105.0]).unwrap();
        assert!((cv - 0.05).abs() < 1e-9);
        assert!(!StabilityDetector::default().is_unstable(&[95.0, 100.0, 105.0]));
    }

    #[test]
    fn single_value_is_not_assessed() {
        assert_eq!(coefficient_of_variation(&[42.0]), None);
        assert!(!StabilityDetector::default().is_unstable(&[42.0]));
    }

    #[test]
    fn identical_values_have_zero_cv() {
        assert_eq!(coefficient_of_variation(&[7.0, 7.0, 7.0]), Some(0.0));
    }
}
