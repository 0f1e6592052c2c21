//! Regression comparison configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RegressionConfig {
    /// Global tolerance for baseline comparisons, in percent. Default: 10.0.
    pub tolerance_pct: Option<f64>,
    /// Keep improvement findings in reports. Default: true.
    pub report_improvements: Option<bool>,
}

impl RegressionConfig {
    pub fn effective_tolerance_pct(&self) -> f64 {
        self.tolerance_pct.unwrap_or(10.0)
    }

    pub fn effective_report_improvements(&self) -> bool {
        self.report_improvements.unwrap_or(true)
    }
}
