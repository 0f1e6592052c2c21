//! Result sets: operation name → samples in sweep order, plus JSON
//! persistence for baselines.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use scalebench_core::errors::PersistenceError;
use scalebench_core::types::DimensionPoint;

use crate::sample::MeasurementSample;

/// Host context captured when a sweep starts, so a baseline taken on a
/// different machine or profile can be spotted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentInfo {
    pub os: String,
    pub arch: String,
    pub cpu_count: usize,
    pub profile: String,
    /// Seconds since the Unix epoch.
    pub captured_at: u64,
}

impl EnvironmentInfo {
    pub fn capture() -> Self {
        Self {
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            cpu_count: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            profile: if cfg!(debug_assertions) { "debug" } else { "release" }.to_string(),
            captured_at: std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or_default(),
        }
    }

    /// Whether two environments are comparable (same OS, arch and profile).
    pub fn comparable_with(&self, other: &EnvironmentInfo) -> bool {
        self.os == other.os && self.arch == other.arch && self.profile == other.profile
    }
}

/// Every sample of one suite run.
///
/// Append-only: samples are pushed in the order they were measured and
/// never edited afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<EnvironmentInfo>,
    operations: BTreeMap<String, Vec<MeasurementSample>>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_environment(mut self, environment: EnvironmentInfo) -> Self {
        self.environment = Some(environment);
        self
    }

    /// Build a result set from samples already in sweep order.
    pub fn from_samples(samples: impl IntoIterator<Item = MeasurementSample>) -> Self {
        let mut set = Self::new();
        for sample in samples {
            set.push(sample);
        }
        set
    }

    pub fn push(&mut self, sample: MeasurementSample) {
        self.operations
            .entry(sample.operation.clone())
            .or_default()
            .push(sample);
    }

    pub fn operations(&self) -> impl Iterator<Item = &str> {
        self.operations.keys().map(String::as_str)
    }

    pub fn contains(&self, operation: &str) -> bool {
        self.operations.contains_key(operation)
    }

    pub fn samples(&self, operation: &str) -> &[MeasurementSample] {
        self.operations.get(operation).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn valid_samples<'a>(&'a self, operation: &str) -> impl Iterator<Item = &'a MeasurementSample> + 'a {
        self.samples(operation).iter().filter(|s| s.is_valid())
    }

    /// Distinct points of `operation` in first-seen order.
    pub fn points(&self, operation: &str) -> Vec<DimensionPoint> {
        let mut points: Vec<DimensionPoint> = Vec::new();
        for sample in self.samples(operation) {
            if !points.contains(&sample.point) {
                points.push(sample.point.clone());
            }
        }
        points
    }

    /// Per-iteration times of the valid samples at `point`.
    pub fn valid_times_at(&self, operation: &str, point: &DimensionPoint) -> Vec<f64> {
        self.valid_samples(operation)
            .filter(|s| &s.point == point)
            .map(|s| s.ns_per_iter)
            .collect()
    }

    /// Fraction of faulty samples for `operation`; 0.0 when unmeasured.
    pub fn failure_rate(&self, operation: &str) -> f64 {
        let samples = self.samples(operation);
        if samples.is_empty() {
            return 0.0;
        }
        let faulty = samples.iter().filter(|s| !s.is_valid()).count();
        faulty as f64 / samples.len() as f64
    }

    pub fn sample_count(&self) -> usize {
        self.operations.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.sample_count() == 0
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn write_to_file(&self, path: &Path) -> Result<(), PersistenceError> {
        let json = self.to_json().map_err(|e| PersistenceError::Format {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        std::fs::write(path, json).map_err(|source| PersistenceError::Io {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn load_from_file(path: &Path) -> Result<Self, PersistenceError> {
        let content = std::fs::read_to_string(path).map_err(|source| PersistenceError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|e| PersistenceError::Format {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }
}
