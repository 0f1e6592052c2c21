//! Empirical complexity classification.
//!
//! Sizes `s` and mean times `t` are walked pairwise. For each step the
//! size ratio `g = s[i+1]/s[i]` and time ratio `q = t[i+1]/t[i]` give the
//! raw step ratio `r = q/g` and the local growth exponent
//! `e = 1 + ln(r)/ln(g)`: 0 for constant work, 1 for linear, 2 for
//! quadratic. Each step is labelled by banding `e`; the operation's label
//! is the most frequent step label, ties going to the costlier class.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use scalebench_core::config::{AnalysisConfig, ExponentBands};
use scalebench_core::types::DimensionPoint;

use crate::result_set::ResultSet;
use crate::stability::StabilityDetector;

/// Minimum number of distinct sizes needed for a classification.
pub const MIN_DISTINCT_SIZES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplexityClass {
    Constant,
    Logarithmic,
    Linear,
    Linearithmic,
    Quadratic,
    /// Grows faster than quadratic.
    Worse,
    /// Fewer than three distinct valid sizes.
    InsufficientData,
    /// The inputs could not be classified at all.
    Indeterminate,
}

impl ComplexityClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Constant => "constant",
            Self::Logarithmic => "logarithmic",
            Self::Linear => "linear",
            Self::Linearithmic => "linearithmic",
            Self::Quadratic => "quadratic",
            Self::Worse => "worse",
            Self::InsufficientData => "insufficient_data",
            Self::Indeterminate => "indeterminate",
        }
    }

    /// Cost order of the growth classes; `None` for the non-classes.
    pub fn rank(&self) -> Option<u8> {
        match self {
            Self::Constant => Some(0),
            Self::Logarithmic => Some(1),
            Self::Linear => Some(2),
            Self::Linearithmic => Some(3),
            Self::Quadratic => Some(4),
            Self::Worse => Some(5),
            Self::InsufficientData | Self::Indeterminate => None,
        }
    }

    /// Label for one step's growth exponent.
    pub fn from_exponent(exponent: f64, bands: &ExponentBands) -> Self {
        if exponent < bands.constant {
            Self::Constant
        } else if exponent < bands.logarithmic {
            Self::Logarithmic
        } else if exponent < bands.linear {
            Self::Linear
        } else if exponent < bands.linearithmic {
            Self::Linearithmic
        } else if exponent < bands.quadratic {
            Self::Quadratic
        } else {
            Self::Worse
        }
    }
}

impl fmt::Display for ComplexityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplexityClassification {
    pub operation: String,
    pub class: ComplexityClass,
    /// Fraction of steps agreeing with `class`, in [0, 1].
    pub fit_quality: f64,
    pub low_confidence: bool,
    /// Raw step ratios `(t[i+1]/t[i]) / (s[i+1]/s[i])`.
    pub ratios: Vec<f64>,
    pub exponents: Vec<f64>,
    pub step_classes: Vec<ComplexityClass>,
    /// Sizes and mean times the classification was built from.
    pub sizes: Vec<u64>,
    pub mean_times: Vec<f64>,
    /// Points feeding this classification whose measurements were unstable.
    pub unstable_points: Vec<DimensionPoint>,
}

impl ComplexityClassification {
    fn degenerate(operation: &str, class: ComplexityClass) -> Self {
        Self {
            operation: operation.to_string(),
            class,
            fit_quality: 0.0,
            low_confidence: true,
            ratios: Vec::new(),
            exponents: Vec::new(),
            step_classes: Vec::new(),
            sizes: Vec::new(),
            mean_times: Vec::new(),
            unstable_points: Vec::new(),
        }
    }

    pub fn is_low_confidence(&self) -> bool {
        self.low_confidence
    }

    pub fn is_unstable(&self) -> bool {
        !self.unstable_points.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ComplexityClassifier {
    bands: ExponentBands,
    min_fit_quality: f64,
    stability: StabilityDetector,
}

impl Default for ComplexityClassifier {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}

impl ComplexityClassifier {
    pub fn new(bands: ExponentBands, min_fit_quality: f64, stability: StabilityDetector) -> Self {
        Self {
            bands,
            min_fit_quality,
            stability,
        }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(
            config.effective_bands(),
            config.effective_min_fit_quality(),
            StabilityDetector::from_config(config),
        )
    }

    /// Classify `(size, time)` pairs given in sweep order.
    ///
    /// Equal sizes are merged by averaging their times. Zero sizes,
    /// decreasing sizes and non-positive or non-finite times yield
    /// `Indeterminate`.
    pub fn classify_points(&self, operation: &str, points: &[(u64, f64)]) -> ComplexityClassification {
        let indeterminate = || ComplexityClassification::degenerate(operation, ComplexityClass::Indeterminate);

        let mut merged: Vec<(u64, Vec<f64>)> = Vec::new();
        for &(size, time) in points {
            if size == 0 || !(time.is_finite() && time > 0.0) {
                return indeterminate();
            }
            match merged.last_mut() {
                Some((last, times)) if *last == size => {
                    times.push(time);
                    continue;
                }
                Some((last, _)) if *last > size => return indeterminate(),
                _ => {}
            }
            merged.push((size, vec![time]));
        }

        if merged.len() < MIN_DISTINCT_SIZES {
            return ComplexityClassification::degenerate(operation, ComplexityClass::InsufficientData);
        }

        let sizes: Vec<u64> = merged.iter().map(|(s, _)| *s).collect();
        let mean_times: Vec<f64> = merged.iter().map(|(_, t)| t.as_slice().mean()).collect();

        let mut ratios = Vec::with_capacity(sizes.len() - 1);
        let mut exponents = Vec::with_capacity(sizes.len() - 1);
        let mut step_classes = Vec::with_capacity(sizes.len() - 1);
        for i in 0..sizes.len() - 1 {
            let growth = sizes[i + 1] as f64 / sizes[i] as f64;
            let ratio = (mean_times[i + 1] / mean_times[i]) / growth;
            if !(ratio.is_finite() && ratio > 0.0) {
                return indeterminate();
            }
            let exponent = 1.0 + ratio.ln() / growth.ln();
            ratios.push(ratio);
            exponents.push(exponent);
            step_classes.push(ComplexityClass::from_exponent(exponent, &self.bands));
        }

        let (class, agreeing) = plurality(&step_classes);
        let fit_quality = agreeing as f64 / step_classes.len() as f64;

        ComplexityClassification {
            operation: operation.to_string(),
            class,
            fit_quality,
            low_confidence: fit_quality < self.min_fit_quality,
            ratios,
            exponents,
            step_classes,
            sizes,
            mean_times,
            unstable_points: Vec::new(),
        }
    }

    /// Classify one operation from its valid samples.
    ///
    /// Only samples sharing the non-size context of the first valid sample
    /// are used, so concurrency sweeps do not leak into the size series.
    pub fn classify(&self, results: &ResultSet, operation: &str) -> ComplexityClassification {
        let mut valid = results
            .valid_samples(operation)
            .filter(|s| s.point.input_size().is_some())
            .peekable();
        let Some(context) = valid.peek().map(|s| s.point.without_input_size()) else {
            return ComplexityClassification::degenerate(operation, ComplexityClass::InsufficientData);
        };

        let mut by_size: BTreeMap<u64, (DimensionPoint, Vec<f64>)> = BTreeMap::new();
        for s in valid.filter(|s| s.point.without_input_size() == context) {
            if let Some(size) = s.point.input_size() {
                by_size
                    .entry(size)
                    .or_insert_with(|| (s.point.clone(), Vec::new()))
                    .1
                    .push(s.ns_per_iter);
            }
        }

        let series: Vec<(u64, f64)> = by_size
            .iter()
            .map(|(size, (_, times))| (*size, times.as_slice().mean()))
            .collect();
        let mut classification = self.classify_points(operation, &series);
        classification.unstable_points = by_size
            .into_values()
            .filter(|(_, times)| self.stability.is_unstable(times))
            .map(|(point, _)| point)
            .collect();

        tracing::debug!(
            operation = %operation,
            label = classification.class.as_str(),
            fit_quality = classification.fit_quality,
            unstable = classification.is_unstable(),
            "classified operation"
        );
        classification
    }

    pub fn classify_all(&self, results: &ResultSet) -> Vec<ComplexityClassification> {
        results.operations().map(|op| self.classify(results, op)).collect()
    }
}

/// Most frequent class and its count; ties go to the higher-cost class.
fn plurality(classes: &[ComplexityClass]) -> (ComplexityClass, usize) {
    let mut counts: Vec<(ComplexityClass, usize)> = Vec::new();
    for &class in classes {
        match counts.iter_mut().find(|(c, _)| *c == class) {
            Some((_, n)) => *n += 1,
            None => counts.push((class, 1)),
        }
    }
    counts
        .into_iter()
        .max_by_key(|(class, n)| (*n, class.rank()))
        .unwrap_or((ComplexityClass::Indeterminate, 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(sizes: &[u64], times: &[f64]) -> Vec<(u64, f64)> {
        sizes.iter().copied().zip(times.iter().copied()).collect()
    }

    #[test]
    fn exponent_bands() {
        let bands = ExponentBands::default();
        assert_eq!(ComplexityClass::from_exponent(-0.5, &bands), ComplexityClass::Constant);
        assert_eq!(ComplexityClass::from_exponent(0.3, &bands), ComplexityClass::Logarithmic);
        assert_eq!(ComplexityClass::from_exponent(1.0, &bands), ComplexityClass::Linear);
        assert_eq!(ComplexityClass::from_exponent(1.3, &bands), ComplexityClass::Linearithmic);
        assert_eq!(ComplexityClass::from_exponent(2.0, &bands), ComplexityClass::Quadratic);
        assert_eq!(ComplexityClass::from_exponent(3.0, &bands), ComplexityClass::Worse);
    }

    #[test]
    fn tie_breaks_toward_worse_class() {
        let (class, n) = plurality(&[ComplexityClass::Linear, ComplexityClass::Quadratic]);
        assert_eq!(class, ComplexityClass::Quadratic);
        assert_eq!(n, 1);

        let (class, n) = plurality(&[
            ComplexityClass::Linear,
            ComplexityClass::Quadratic,
            ComplexityClass::Linear,
        ]);
        assert_eq!(class, ComplexityClass::Linear);
        assert_eq!(n, 2);
    }

    #[test]
    fn equal_sizes_are_merged() {
        let c = ComplexityClassifier::default().classify_points(
            "op",
            &series(&[10, 10, 100, 1000], &[1.0, 3.0, 20.0, 200.0]),
        );
        assert_eq!(c.sizes, vec![10, 100, 1000]);
        assert_eq!(c.class, ComplexityClass::Linear);
    }

    #[test]
    fn two_sizes_are_insufficient() {
        let c = ComplexityClassifier::default().classify_points("op", &series(&[10, 100], &[1.0, 10.0]));
        assert_eq!(c.class, ComplexityClass::InsufficientData);
        assert_eq!(c.fit_quality, 0.0);
        assert!(c.is_low_confidence());
    }

    #[test]
    fn degenerate_inputs_are_indeterminate() {
        let classifier = ComplexityClassifier::default();
        let zero = classifier.classify_points("op", &series(&[0, 10, 100], &[1.0, 1.0, 1.0]));
        assert_eq!(zero.class, ComplexityClass::Indeterminate);

        let decreasing = classifier.classify_points("op", &series(&[100, 10, 1], &[1.0, 1.0, 1.0]));
        assert_eq!(decreasing.class, ComplexityClass::Indeterminate);

        let bad_time = classifier.classify_points("op", &series(&[1, 10, 100], &[1.0, f64::NAN, 1.0]));
        assert_eq!(bad_time.class, ComplexityClass::Indeterminate);
        assert_eq!(bad_time.fit_quality, 0.0);
    }

    #[test]
    fn mixed_steps_are_low_confidence() {
        // constant, linear, quadratic: every class gets one vote
        let c = ComplexityClassifier::default().classify_points(
            "op",
            &series(&[10, 100, 1000, 10000], &[1.0, 1.0, 10.0, 1000.0]),
        );
        assert_eq!(c.class, ComplexityClass::Quadratic);
        assert!((c.fit_quality - 1.0 / 3.0).abs() < 1e-12);
        assert!(c.is_low_confidence());
    }
}
