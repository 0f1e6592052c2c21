//! Analysis configuration.

use serde::{Deserialize, Serialize};

/// Upper bounds on the local growth exponent for each complexity class.
///
/// A step whose exponent is below `constant` is constant, below
/// `logarithmic` is logarithmic, and so on; anything at or above
/// `quadratic` is classed as worse than quadratic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExponentBands {
    pub constant: f64,
    pub logarithmic: f64,
    pub linear: f64,
    pub linearithmic: f64,
    pub quadratic: f64,
}

impl Default for ExponentBands {
    fn default() -> Self {
        Self {
            constant: 0.1,
            logarithmic: 0.8,
            linear: 1.1,
            linearithmic: 1.6,
            quadratic: 2.5,
        }
    }
}

impl ExponentBands {
    /// Whether the bounds are finite and strictly increasing.
    pub fn is_ordered(&self) -> bool {
        let b = [
            self.constant,
            self.logarithmic,
            self.linear,
            self.linearithmic,
            self.quadratic,
        ];
        b.iter().all(|v| v.is_finite()) && b.windows(2).all(|w| w[0] < w[1])
    }
}

/// Configuration for the classifier and stability detector.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Coefficient of variation above which a point is unstable. Default: 0.25.
    pub stability_cv_threshold: Option<f64>,
    /// Fit quality below which a classification is low confidence. Default: 0.60.
    pub min_fit_quality: Option<f64>,
    /// Exponent bands for step labelling.
    pub bands: Option<ExponentBands>,
}

impl AnalysisConfig {
    pub fn effective_stability_cv_threshold(&self) -> f64 {
        self.stability_cv_threshold.unwrap_or(0.25)
    }

    pub fn effective_min_fit_quality(&self) -> f64 {
        self.min_fit_quality.unwrap_or(0.60)
    }

    pub fn effective_bands(&self) -> ExponentBands {
        self.bands.unwrap_or_default()
    }
}
