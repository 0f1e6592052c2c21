//! Sweep plans: the eagerly validated description of what to measure.
//!
//! A [`SweepSpec`] is assembled by the caller and turned into an immutable
//! [`SweepPlan`] by [`SweepSpec::validate`]. Every configuration fault is
//! reported there, before any measurement starts.

use std::sync::Arc;

use rustc_hash::FxHashSet;

use scalebench_core::config::{SweepConfig, SweepMode};
use scalebench_core::errors::ConfigError;
use scalebench_core::types::{DimensionKind, DimensionPoint, ScalingDimension};

use crate::comparator::PerformanceThreshold;
use crate::operation::{Operation, SizeBinding};

/// Unvalidated sweep description.
#[derive(Debug, Clone, Default)]
pub struct SweepSpec {
    pub operations: Vec<Operation>,
    pub dimensions: Vec<ScalingDimension>,
    pub thresholds: Vec<PerformanceThreshold>,
    pub settings: SweepConfig,
}

impl SweepSpec {
    pub fn new(settings: SweepConfig) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn operation(mut self, operation: Operation) -> Self {
        self.operations.push(operation);
        self
    }

    pub fn dimension(mut self, dimension: ScalingDimension) -> Self {
        self.dimensions.push(dimension);
        self
    }

    pub fn threshold(mut self, threshold: PerformanceThreshold) -> Self {
        self.thresholds.push(threshold);
        self
    }

    /// Check every invariant and freeze the sweep description into a plan.
    pub fn validate(self) -> Result<SweepPlan, ConfigError> {
        validate_settings(&self.settings)?;

        if self.operations.is_empty() {
            return Err(ConfigError::ValidationFailed {
                field: "operations".to_string(),
                message: "at least one operation is required".to_string(),
            });
        }

        let mut names = FxHashSet::default();
        for op in &self.operations {
            if !names.insert(op.name()) {
                return Err(ConfigError::DuplicateOperation {
                    name: op.name().to_string(),
                });
            }
            if let SizeBinding::Argument(position) = op.size_binding() {
                if position >= op.args().len() {
                    return Err(ConfigError::ArgumentPosition {
                        operation: op.name().to_string(),
                        position,
                        len: op.args().len(),
                    });
                }
            }
        }

        validate_dimensions(&self.dimensions)?;

        let mut with_threshold = FxHashSet::default();
        for t in &self.thresholds {
            if !names.contains(t.operation.as_str()) {
                return Err(ConfigError::UnknownOperation {
                    name: t.operation.clone(),
                });
            }
            if !with_threshold.insert(t.operation.as_str()) {
                return Err(ConfigError::DuplicateThreshold {
                    name: t.operation.clone(),
                });
            }
            if !(t.tolerance_pct.is_finite() && t.tolerance_pct >= 0.0) {
                return Err(ConfigError::ValidationFailed {
                    field: format!("threshold.{}.tolerance_pct", t.operation),
                    message: format!("must be a non-negative number, got {}", t.tolerance_pct),
                });
            }
            if t.max_time_per_iter.is_some_and(|d| d.is_zero()) {
                return Err(ConfigError::ValidationFailed {
                    field: format!("threshold.{}.max_time_per_iter", t.operation),
                    message: "must be greater than zero".to_string(),
                });
            }
        }

        let points = enumerate_points(&self.dimensions, self.settings.effective_mode());
        Ok(SweepPlan {
            operations: self.operations.into_iter().map(Arc::new).collect(),
            dimensions: self.dimensions,
            thresholds: self.thresholds,
            settings: self.settings,
            points,
        })
    }
}

fn validate_settings(settings: &SweepConfig) -> Result<(), ConfigError> {
    if settings.effective_repetitions() == 0 {
        return Err(ConfigError::ValidationFailed {
            field: "sweep.repetitions".to_string(),
            message: "must be at least 1".to_string(),
        });
    }
    if settings.effective_iterations() == 0 {
        return Err(ConfigError::ValidationFailed {
            field: "sweep.iterations".to_string(),
            message: "must be at least 1".to_string(),
        });
    }
    if settings.per_call_timeout_ms == Some(0) {
        return Err(ConfigError::ValidationFailed {
            field: "sweep.per_call_timeout_ms".to_string(),
            message: "must be greater than zero".to_string(),
        });
    }
    Ok(())
}

fn validate_dimensions(dimensions: &[ScalingDimension]) -> Result<(), ConfigError> {
    let mut seen = FxHashSet::default();
    for dim in dimensions {
        if !seen.insert(dim.kind) {
            return Err(ConfigError::DuplicateDimension { kind: dim.kind });
        }
        if dim.values.is_empty() {
            return Err(ConfigError::EmptyDimension { kind: dim.kind });
        }
        match dim.kind {
            DimensionKind::InputSize => {
                if let Some((previous, next)) = dim.first_decrease() {
                    return Err(ConfigError::NonMonotonicSizes { previous, next });
                }
            }
            DimensionKind::Concurrency => {
                if dim.values.contains(&0) {
                    return Err(ConfigError::ZeroConcurrency);
                }
            }
        }
    }
    Ok(())
}

/// Points in visiting order. Dimensions are walked in declaration order and
/// values in declaration order; no dimensions yields one empty point.
fn enumerate_points(dimensions: &[ScalingDimension], mode: SweepMode) -> Vec<DimensionPoint> {
    match mode {
        SweepMode::Independent => {
            let base = dimensions.iter().fold(DimensionPoint::new(), |p, d| {
                p.with(d.kind, d.base_value().unwrap_or_default())
            });
            let mut points = vec![base.clone()];
            for dim in dimensions {
                for &value in &dim.values {
                    let point = base.clone().with(dim.kind, value);
                    if !points.contains(&point) {
                        points.push(point);
                    }
                }
            }
            points
        }
        SweepMode::Cartesian => {
            let mut points = vec![DimensionPoint::new()];
            for dim in dimensions {
                points = points
                    .iter()
                    .flat_map(|p| dim.values.iter().map(move |&v| p.clone().with(dim.kind, v)))
                    .collect();
            }
            points
        }
    }
}

/// A validated, immutable sweep plan.
#[derive(Debug, Clone)]
pub struct SweepPlan {
    operations: Vec<Arc<Operation>>,
    dimensions: Vec<ScalingDimension>,
    thresholds: Vec<PerformanceThreshold>,
    settings: SweepConfig,
    points: Vec<DimensionPoint>,
}

impl SweepPlan {
    pub fn operations(&self) -> &[Arc<Operation>] {
        &self.operations
    }

    pub fn dimensions(&self) -> &[ScalingDimension] {
        &self.dimensions
    }

    pub fn thresholds(&self) -> &[PerformanceThreshold] {
        &self.thresholds
    }

    pub fn settings(&self) -> &SweepConfig {
        &self.settings
    }

    /// Dimension points in the order every operation visits them.
    pub fn points(&self) -> &[DimensionPoint] {
        &self.points
    }

    pub fn has_dimension(&self, kind: DimensionKind) -> bool {
        self.dimensions.iter().any(|d| d.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use scalebench_core::types::ArgValue;

    use super::*;
    use crate::operation::OperationError;

    fn noop(_: &[ArgValue]) -> Result<(), OperationError> {
        Ok(())
    }

    fn spec() -> SweepSpec {
        SweepSpec::new(SweepConfig::default()).operation(Operation::new("a", noop))
    }

    #[test]
    fn no_dimensions_gives_single_empty_point() {
        let plan = spec().validate().unwrap();
        assert_eq!(plan.points(), &[DimensionPoint::new()]);
    }

    #[test]
    fn independent_mode_holds_other_axes_at_base() {
        let plan = spec()
            .dimension(ScalingDimension::input_size(vec![10, 100]))
            .dimension(ScalingDimension::concurrency(vec![1, 4]))
            .validate()
            .unwrap();
        let rendered: Vec<String> = plan.points().iter().map(|p| p.to_string()).collect();
        assert_eq!(
            rendered,
            vec![
                "InputSize=10,Concurrency=1",
                "InputSize=100,Concurrency=1",
                "InputSize=10,Concurrency=4",
            ]
        );
    }

    #[test]
    fn cartesian_mode_visits_every_combination() {
        let settings = SweepConfig {
            mode: Some(SweepMode::Cartesian),
            ..SweepConfig::default()
        };
        let plan = SweepSpec::new(settings)
            .operation(Operation::new("a", noop))
            .dimension(ScalingDimension::input_size(vec![10, 100]))
            .dimension(ScalingDimension::concurrency(vec![1, 2, 4]))
            .validate()
            .unwrap();
        assert_eq!(plan.points().len(), 6);
        assert_eq!(plan.points()[0].to_string(), "InputSize=10,Concurrency=1");
        assert_eq!(plan.points()[1].to_string(), "InputSize=10,Concurrency=2");
        assert_eq!(plan.points()[3].to_string(), "InputSize=100,Concurrency=1");
    }

    #[test]
    fn duplicate_operation_is_rejected() {
        let err = spec().operation(Operation::new("a", noop)).validate().unwrap_err();
        assert_eq!(err, ConfigError::DuplicateOperation { name: "a".into() });
    }

    #[test]
    fn decreasing_sizes_are_rejected() {
        let err = spec()
            .dimension(ScalingDimension::input_size(vec![10, 100, 50]))
            .validate()
            .unwrap_err();
        assert_eq!(err, ConfigError::NonMonotonicSizes { previous: 100, next: 50 });
    }

    #[test]
    fn repeated_sizes_are_allowed() {
        assert!(spec()
            .dimension(ScalingDimension::input_size(vec![10, 10, 20]))
            .validate()
            .is_ok());
    }

    #[test]
    fn dimension_faults() {
        let err = spec()
            .dimension(ScalingDimension::concurrency(vec![0, 2]))
            .validate()
            .unwrap_err();
        assert_eq!(err, ConfigError::ZeroConcurrency);

        let err = spec()
            .dimension(ScalingDimension::concurrency(Vec::<u64>::new()))
            .validate()
            .unwrap_err();
        assert_eq!(err, ConfigError::EmptyDimension { kind: DimensionKind::Concurrency });

        let err = spec()
            .dimension(ScalingDimension::input_size(vec![1]))
            .dimension(ScalingDimension::input_size(vec![2]))
            .validate()
            .unwrap_err();
        assert_eq!(err, ConfigError::DuplicateDimension { kind: DimensionKind::InputSize });
    }

    #[test]
    fn threshold_faults() {
        let err = spec()
            .threshold(PerformanceThreshold::new("missing"))
            .validate()
            .unwrap_err();
        assert_eq!(err, ConfigError::UnknownOperation { name: "missing".into() });

        let err = spec()
            .threshold(PerformanceThreshold::new("a"))
            .threshold(PerformanceThreshold::new("a"))
            .validate()
            .unwrap_err();
        assert_eq!(err, ConfigError::DuplicateThreshold { name: "a".into() });

        let err = spec()
            .threshold(PerformanceThreshold::new("a").with_tolerance_pct(-1.0))
            .validate()
            .unwrap_err();
        assert!(matches!(err, ConfigError::ValidationFailed { .. }));

        let err = spec()
            .threshold(PerformanceThreshold::new("a").with_max_time(Duration::ZERO))
            .validate()
            .unwrap_err();
        assert!(matches!(err, ConfigError::ValidationFailed { .. }));
    }

    #[test]
    fn argument_position_must_exist() {
        let err = SweepSpec::default()
            .operation(Operation::new("p", noop).with_args(vec![ArgValue::UInt(0)]).bind_size_at(2))
            .validate()
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::ArgumentPosition {
                operation: "p".into(),
                position: 2,
                len: 1
            }
        );
    }

    #[test]
    fn zero_repetitions_are_rejected() {
        let settings = SweepConfig {
            repetitions: Some(0),
            ..SweepConfig::default()
        };
        let err = SweepSpec::new(settings)
            .operation(Operation::new("a", noop))
            .validate()
            .unwrap_err();
        assert!(matches!(err, ConfigError::ValidationFailed { ref field, .. } if field == "sweep.repetitions"));
    }

    #[test]
    fn empty_operation_list_is_rejected() {
        assert!(SweepSpec::default().validate().is_err());
    }
}
