//! Top-level scalebench configuration with layered resolution.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{AnalysisConfig, RegressionConfig, SweepConfig};
use crate::errors::ConfigError;

/// Project config file name, looked up in the project root.
pub const PROJECT_CONFIG_FILE: &str = "scalebench.toml";

/// Top-level configuration aggregating all sections.
///
/// Resolution order (highest priority first):
/// 1. CLI flags (applied via `apply_cli_overrides`)
/// 2. Environment variables (`SCALEBENCH_*`)
/// 3. Project config (`scalebench.toml` in project root)
/// 4. User config (`~/.scalebench/config.toml`)
/// 5. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ScalebenchConfig {
    pub sweep: SweepConfig,
    pub analysis: AnalysisConfig,
    pub regression: RegressionConfig,
}

/// CLI override arguments that can be applied to a config.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub repetitions: Option<u32>,
    pub iterations: Option<u64>,
    pub deadline_ms: Option<u64>,
    pub tolerance_pct: Option<f64>,
}

impl ScalebenchConfig {
    /// Load configuration from every layer and validate the result.
    pub fn load(root: &Path, cli_overrides: Option<&CliOverrides>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(user_config_path) = Self::user_config_path() {
            if user_config_path.exists() {
                if let Err(e) = Self::merge_toml_file(&mut config, &user_config_path) {
                    match e {
                        ConfigError::ParseError { .. } => return Err(e),
                        // An unreadable user config is not fatal; fall through to defaults.
                        other => tracing::warn!(error = %other, "ignoring user config"),
                    }
                }
            }
        }

        let project_config_path = root.join(PROJECT_CONFIG_FILE);
        if project_config_path.exists() {
            Self::merge_toml_file(&mut config, &project_config_path)?;
        }

        Self::apply_env_overrides(&mut config);

        if let Some(cli) = cli_overrides {
            Self::apply_cli_overrides(&mut config, cli);
        }

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML string (for testing).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    /// Validate the configuration values.
    pub fn validate(config: &ScalebenchConfig) -> Result<(), ConfigError> {
        if config.sweep.repetitions == Some(0) {
            return Err(invalid("sweep.repetitions", "must be at least 1"));
        }
        if config.sweep.iterations == Some(0) {
            return Err(invalid("sweep.iterations", "must be at least 1"));
        }
        if config.sweep.per_call_timeout_ms == Some(0) {
            return Err(invalid("sweep.per_call_timeout_ms", "must be greater than 0"));
        }
        if let Some(cv) = config.analysis.stability_cv_threshold {
            if !cv.is_finite() || cv <= 0.0 {
                return Err(invalid(
                    "analysis.stability_cv_threshold",
                    "must be a positive number",
                ));
            }
        }
        if let Some(q) = config.analysis.min_fit_quality {
            if !(0.0..=1.0).contains(&q) {
                return Err(invalid(
                    "analysis.min_fit_quality",
                    "must be between 0.0 and 1.0",
                ));
            }
        }
        if let Some(bands) = config.analysis.bands {
            if !bands.is_ordered() {
                return Err(invalid(
                    "analysis.bands",
                    "bounds must be finite and strictly increasing",
                ));
            }
        }
        if let Some(tol) = config.regression.tolerance_pct {
            if !tol.is_finite() || tol < 0.0 {
                return Err(invalid(
                    "regression.tolerance_pct",
                    "must be a non-negative number",
                ));
            }
        }
        Ok(())
    }

    fn user_config_path() -> Option<PathBuf> {
        home_dir().map(|h| h.join(".scalebench").join("config.toml"))
    }

    /// Merge a TOML file into the existing config.
    /// Unknown keys are ignored.
    fn merge_toml_file(config: &mut ScalebenchConfig, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        let file_config: ScalebenchConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Self::merge(config, &file_config);
        Ok(())
    }

    /// Merge `other` into `base`; only `Some` values in `other` win.
    fn merge(base: &mut ScalebenchConfig, other: &ScalebenchConfig) {
        let s = &other.sweep;
        base.sweep.repetitions = s.repetitions.or(base.sweep.repetitions);
        base.sweep.iterations = s.iterations.or(base.sweep.iterations);
        base.sweep.warmup_passes = s.warmup_passes.or(base.sweep.warmup_passes);
        base.sweep.per_call_timeout_ms = s.per_call_timeout_ms.or(base.sweep.per_call_timeout_ms);
        base.sweep.deadline_ms = s.deadline_ms.or(base.sweep.deadline_ms);
        base.sweep.max_invocations = s.max_invocations.or(base.sweep.max_invocations);
        base.sweep.mode = s.mode.or(base.sweep.mode);

        let a = &other.analysis;
        base.analysis.stability_cv_threshold =
            a.stability_cv_threshold.or(base.analysis.stability_cv_threshold);
        base.analysis.min_fit_quality = a.min_fit_quality.or(base.analysis.min_fit_quality);
        base.analysis.bands = a.bands.or(base.analysis.bands);

        let r = &other.regression;
        base.regression.tolerance_pct = r.tolerance_pct.or(base.regression.tolerance_pct);
        base.regression.report_improvements =
            r.report_improvements.or(base.regression.report_improvements);
    }

    /// Apply environment variable overrides.
    /// Pattern: `SCALEBENCH_SWEEP_REPETITIONS`, `SCALEBENCH_REGRESSION_TOLERANCE_PCT`, etc.
    /// Values that fail to parse are ignored.
    fn apply_env_overrides(config: &mut ScalebenchConfig) {
        if let Some(v) = env_parse::<u32>("SCALEBENCH_SWEEP_REPETITIONS") {
            config.sweep.repetitions = Some(v);
        }
        if let Some(v) = env_parse::<u64>("SCALEBENCH_SWEEP_ITERATIONS") {
            config.sweep.iterations = Some(v);
        }
        if let Some(v) = env_parse::<u64>("SCALEBENCH_SWEEP_PER_CALL_TIMEOUT_MS") {
            config.sweep.per_call_timeout_ms = Some(v);
        }
        if let Some(v) = env_parse::<u64>("SCALEBENCH_SWEEP_DEADLINE_MS") {
            config.sweep.deadline_ms = Some(v);
        }
        if let Some(v) = env_parse::<u64>("SCALEBENCH_SWEEP_MAX_INVOCATIONS") {
            config.sweep.max_invocations = Some(v);
        }
        if let Some(v) = env_parse::<f64>("SCALEBENCH_ANALYSIS_STABILITY_CV") {
            config.analysis.stability_cv_threshold = Some(v);
        }
        if let Some(v) = env_parse::<f64>("SCALEBENCH_REGRESSION_TOLERANCE_PCT") {
            config.regression.tolerance_pct = Some(v);
        }
    }

    fn apply_cli_overrides(config: &mut ScalebenchConfig, cli: &CliOverrides) {
        if let Some(v) = cli.repetitions {
            config.sweep.repetitions = Some(v);
        }
        if let Some(v) = cli.iterations {
            config.sweep.iterations = Some(v);
        }
        if let Some(v) = cli.deadline_ms {
            config.sweep.deadline_ms = Some(v);
        }
        if let Some(v) = cli.tolerance_pct {
            config.regression.tolerance_pct = Some(v);
        }
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }
}

fn invalid(field: &str, message: &str) -> ConfigError {
    ConfigError::ValidationFailed {
        field: field.to_string(),
        message: message.to_string(),
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok()?.parse().ok()
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}
