//! Measurement samples and in-band measurement faults.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use scalebench_core::types::DimensionPoint;

use crate::adapter::Measurement;
use crate::operation::Expectation;

/// Why a sample is excluded from timing statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleFault {
    /// Elapsed time per iteration was zero or not finite.
    NonPositiveTime,
    /// No iteration completed.
    ZeroIterations,
    /// The adapter reported a negative allocation count.
    NegativeAllocations,
    /// A call did not return within the per-call cutoff.
    TimedOut,
    /// An "expect success" case returned an error.
    UnexpectedError(String),
    /// An "expect error" case succeeded.
    UnexpectedSuccess,
    /// The execution unit panicked.
    Panicked(String),
    /// An execution unit thread could not be started.
    SpawnFailed(String),
}

impl SampleFault {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NonPositiveTime => "non_positive_time",
            Self::ZeroIterations => "zero_iterations",
            Self::NegativeAllocations => "negative_allocations",
            Self::TimedOut => "timed_out",
            Self::UnexpectedError(_) => "unexpected_error",
            Self::UnexpectedSuccess => "unexpected_success",
            Self::Panicked(_) => "panicked",
            Self::SpawnFailed(_) => "spawn_failed",
        }
    }
}

impl fmt::Display for SampleFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedError(msg) | Self::Panicked(msg) | Self::SpawnFailed(msg) => {
                write!(f, "{}: {}", self.as_str(), msg)
            }
            _ => f.write_str(self.as_str()),
        }
    }
}

/// One observation of an operation at one dimension point.
///
/// Per-iteration figures are totals divided by `iterations`. A sample with
/// a `fault` is kept for the failure rate but never enters timing math.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementSample {
    pub operation: String,
    pub point: DimensionPoint,
    /// Measured pass index at this point, starting at 0.
    pub pass: u32,
    pub iterations: u64,
    pub ns_per_iter: f64,
    pub allocs_per_iter: f64,
    pub bytes_per_iter: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fault: Option<SampleFault>,
}

impl MeasurementSample {
    /// Build a sample from an adapter report, tagging any fault.
    pub fn from_measurement(
        operation: &str,
        point: &DimensionPoint,
        pass: u32,
        iterations: u64,
        measurement: &Measurement,
        expectation: Expectation,
    ) -> Self {
        let divisor = iterations.max(1) as f64;
        let ns_per_iter = measurement.elapsed.as_nanos() as f64 / divisor;

        let fault = if iterations == 0 {
            Some(SampleFault::ZeroIterations)
        } else if !expectation.is_met_by(&measurement.outcome) {
            Some(match &measurement.outcome {
                Err(e) => SampleFault::UnexpectedError(e.message.clone()),
                Ok(()) => SampleFault::UnexpectedSuccess,
            })
        } else if !(ns_per_iter.is_finite() && ns_per_iter > 0.0) {
            Some(SampleFault::NonPositiveTime)
        } else if measurement.allocations < 0 || measurement.bytes_allocated < 0 {
            Some(SampleFault::NegativeAllocations)
        } else {
            None
        };

        Self {
            operation: operation.to_string(),
            point: point.clone(),
            pass,
            iterations,
            ns_per_iter,
            allocs_per_iter: measurement.allocations as f64 / divisor,
            bytes_per_iter: measurement.bytes_allocated as f64 / divisor,
            fault,
        }
    }

    /// A sample that produced no usable measurement.
    pub fn faulted(operation: &str, point: &DimensionPoint, pass: u32, iterations: u64, fault: SampleFault) -> Self {
        Self {
            operation: operation.to_string(),
            point: point.clone(),
            pass,
            iterations,
            ns_per_iter: 0.0,
            allocs_per_iter: 0.0,
            bytes_per_iter: 0.0,
            fault: Some(fault),
        }
    }

    /// A sample for a call that hit the cutoff; its time is the cutoff.
    pub fn timed_out(operation: &str, point: &DimensionPoint, pass: u32, iterations: u64, cutoff: Duration) -> Self {
        Self {
            ns_per_iter: cutoff.as_nanos() as f64,
            ..Self::faulted(operation, point, pass, iterations, SampleFault::TimedOut)
        }
    }

    /// Error-free with positive, finite timing.
    pub fn is_valid(&self) -> bool {
        self.fault.is_none() && self.iterations >= 1 && self.ns_per_iter.is_finite() && self.ns_per_iter > 0.0
    }
}
