//! # scalebench
//!
//! Scaling and regression analysis for micro-benchmarks.
//!
//! - **Orchestrator**: runs operations across input-size and concurrency
//!   sweeps, collecting timing and allocation samples
//! - **Classifier**: fits per-size mean times to a complexity class
//! - **Comparator**: flags regressions against thresholds or a baseline
//! - **Stability**: marks noisy measurement points
//!
//! A typical run builds a [`SweepSpec`], validates it into a [`SweepPlan`],
//! runs it with an [`Orchestrator`] and hands the resulting [`ResultSet`] to
//! [`AnalysisReport::build`].

pub mod adapter;
pub mod alloc;
pub mod classifier;
pub mod comparator;
pub mod generator;
pub mod operation;
pub mod orchestrator;
pub mod plan;
pub mod report;
pub mod result_set;
pub mod sample;
pub mod stability;

pub use adapter::{Measurement, TimingAdapter, WallClockAdapter};
pub use classifier::{ComplexityClass, ComplexityClassification, ComplexityClassifier};
pub use comparator::{
    BaselineComparison, FindingKind, Metric, PerformanceThreshold, RegressionComparator, RegressionFinding,
    ThresholdReport, UnmatchedPoint, UnmatchedReason,
};
pub use generator::{DataGenerator, GeneratedShape, SeededGenerator};
pub use operation::{Expectation, Operation, OperationError, SizeBinding};
pub use orchestrator::{Orchestrator, StopReason, SweepOutcome};
pub use plan::{SweepPlan, SweepSpec};
pub use report::AnalysisReport;
pub use result_set::{EnvironmentInfo, ResultSet};
pub use sample::{MeasurementSample, SampleFault};
pub use stability::{coefficient_of_variation, PointStability, StabilityDetector};
