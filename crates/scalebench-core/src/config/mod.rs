//! Configuration system for scalebench.
//! TOML-based, layered resolution: CLI > env > project > user > defaults.

pub mod analysis_config;
pub mod regression_config;
pub mod scalebench_config;
pub mod sweep_config;

pub use analysis_config::{AnalysisConfig, ExponentBands};
pub use regression_config::RegressionConfig;
pub use scalebench_config::{CliOverrides, ScalebenchConfig};
pub use sweep_config::{SweepConfig, SweepMode};
