//! Sweep execution configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How the orchestrator combines several dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SweepMode {
    /// Each dimension is swept alone while the others stay at their base value.
    #[default]
    Independent,
    /// Every combination of dimension values is visited.
    Cartesian,
}

/// Configuration for the scaling orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SweepConfig {
    /// Measured passes per dimension point. Default: 5.
    pub repetitions: Option<u32>,
    /// Iteration budget per pass. Default: 100.
    pub iterations: Option<u64>,
    /// Discarded passes run before measuring each point. Default: 1.
    pub warmup_passes: Option<u32>,
    /// Per-call cutoff in milliseconds. Unset means no cutoff.
    pub per_call_timeout_ms: Option<u64>,
    /// Wall-clock budget for the whole sweep in milliseconds.
    pub deadline_ms: Option<u64>,
    /// Cap on total invocations across the sweep.
    pub max_invocations: Option<u64>,
    /// Dimension combination strategy. Default: independent.
    pub mode: Option<SweepMode>,
}

impl SweepConfig {
    pub fn effective_repetitions(&self) -> u32 {
        self.repetitions.unwrap_or(5)
    }

    pub fn effective_iterations(&self) -> u64 {
        self.iterations.unwrap_or(100)
    }

    pub fn effective_warmup_passes(&self) -> u32 {
        self.warmup_passes.unwrap_or(1)
    }

    pub fn effective_mode(&self) -> SweepMode {
        self.mode.unwrap_or_default()
    }

    pub fn per_call_timeout(&self) -> Option<Duration> {
        self.per_call_timeout_ms.map(Duration::from_millis)
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_ms.map(Duration::from_millis)
    }
}
