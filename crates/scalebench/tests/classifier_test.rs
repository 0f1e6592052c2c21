//! Tests for the complexity classifier.

use proptest::prelude::*;

use scalebench::{ComplexityClass, ComplexityClassifier, MeasurementSample, ResultSet, SampleFault};
use scalebench_core::config::{AnalysisConfig, ExponentBands};
use scalebench_core::types::{DimensionKind, DimensionPoint};

const SIZES: [u64; 4] = [10, 100, 1000, 10_000];

fn sample(op: &str, point: DimensionPoint, pass: u32, ns: f64) -> MeasurementSample {
    MeasurementSample {
        operation: op.to_string(),
        point,
        pass,
        iterations: 10,
        ns_per_iter: ns,
        allocs_per_iter: 0.0,
        bytes_per_iter: 0.0,
        fault: None,
    }
}

fn sized(size: u64) -> DimensionPoint {
    DimensionPoint::new().with(DimensionKind::InputSize, size)
}

fn series(times: &[f64]) -> Vec<(u64, f64)> {
    SIZES.iter().copied().zip(times.iter().copied()).collect()
}

#[test]
fn linear_growth() {
    let c = ComplexityClassifier::default().classify_points("scan", &series(&[1.0, 10.0, 100.0, 1000.0]));
    assert_eq!(c.class, ComplexityClass::Linear);
    assert_eq!(c.fit_quality, 1.0);
    assert!(!c.is_low_confidence());
    assert!(c.ratios.iter().all(|r| (r - 1.0).abs() < 1e-9));
}

#[test]
fn constant_growth() {
    let c = ComplexityClassifier::default().classify_points("lookup", &series(&[1.0, 1.0, 1.0, 1.0]));
    assert_eq!(c.class, ComplexityClass::Constant);
    assert_eq!(c.fit_quality, 1.0);
}

#[test]
fn quadratic_growth() {
    let c = ComplexityClassifier::default().classify_points("pairs", &series(&[1.0, 100.0, 10_000.0, 1_000_000.0]));
    assert_eq!(c.class, ComplexityClass::Quadratic);
    assert_eq!(c.fit_quality, 1.0);
}

#[test]
fn logarithmic_and_linearithmic_growth() {
    let log: Vec<f64> = SIZES.iter().map(|&s| (s as f64).ln()).collect();
    let c = ComplexityClassifier::default().classify_points("search", &series(&log));
    assert_eq!(c.class, ComplexityClass::Logarithmic);

    let nlogn: Vec<f64> = SIZES.iter().map(|&s| s as f64 * (s as f64).ln()).collect();
    let c = ComplexityClassifier::default().classify_points("sort", &series(&nlogn));
    assert_eq!(c.class, ComplexityClass::Linearithmic);
}

#[test]
fn cubic_growth_is_worse() {
    let c = ComplexityClassifier::default().classify_points("triples", &series(&[1.0, 1e3, 1e6, 1e9]));
    assert_eq!(c.class, ComplexityClass::Worse);
}

#[test]
fn configured_bands_move_boundaries() {
    let config = AnalysisConfig {
        bands: Some(ExponentBands {
            linear: 1.5,
            ..ExponentBands::default()
        }),
        ..AnalysisConfig::default()
    };
    // Exponent ~1.3 is linearithmic by default but linear with the wider band.
    let times: Vec<f64> = SIZES.iter().map(|&s| (s as f64).powf(1.3)).collect();
    let default = ComplexityClassifier::default().classify_points("op", &series(&times));
    let widened = ComplexityClassifier::from_config(&config).classify_points("op", &series(&times));
    assert_eq!(default.class, ComplexityClass::Linearithmic);
    assert_eq!(widened.class, ComplexityClass::Linear);
}

#[test]
fn classify_uses_valid_samples_at_base_context() {
    let mut results = ResultSet::new();
    for (i, &size) in SIZES.iter().enumerate() {
        let base = sized(size).with(DimensionKind::Concurrency, 1);
        results.push(sample("scan", base.clone(), 0, size as f64));
        results.push(sample("scan", base.clone(), 1, size as f64));
        // Faulty samples never enter the means.
        results.push(MeasurementSample {
            fault: Some(SampleFault::TimedOut),
            ..sample("scan", base, 2, 1e12)
        });
        // Other concurrency levels are a different series.
        if i == 0 {
            results.push(sample("scan", sized(size).with(DimensionKind::Concurrency, 8), 0, 1e9));
        }
    }

    let c = ComplexityClassifier::default().classify(&results, "scan");
    assert_eq!(c.class, ComplexityClass::Linear);
    assert_eq!(c.fit_quality, 1.0);
    assert!(c.unstable_points.is_empty());
}

#[test]
fn unstable_points_are_listed() {
    let mut results = ResultSet::new();
    for &size in &SIZES {
        let base = size as f64;
        let spread = if size == 100 { [0.5, 1.0, 1.5] } else { [1.0, 1.0, 1.0] };
        for (pass, factor) in spread.iter().enumerate() {
            results.push(sample("noisy", sized(size), pass as u32, base * factor));
        }
    }
    let c = ComplexityClassifier::default().classify(&results, "noisy");
    assert_eq!(c.unstable_points, vec![sized(100)]);
    assert!(c.is_unstable());
}

#[test]
fn unmeasured_or_unsized_operations_are_insufficient() {
    let classifier = ComplexityClassifier::default();
    let empty = ResultSet::new();
    assert_eq!(classifier.classify(&empty, "missing").class, ComplexityClass::InsufficientData);

    let r#unsized = ResultSet::from_samples([
        sample("flat", DimensionPoint::new(), 0, 5.0),
        sample("flat", DimensionPoint::new(), 1, 6.0),
    ]);
    assert_eq!(classifier.classify(&r#unsized, "flat").class, ComplexityClass::InsufficientData);
}

/// Strictly increasing sizes with at least a doubling between steps.
fn growing_sizes() -> impl Strategy<Value = Vec<u64>> {
    (1u64..100, prop::collection::vec(2u64..10, 2..7)).prop_map(|(start, factors)| {
        let mut sizes = vec![start];
        for f in factors {
            let next = sizes[sizes.len() - 1] * f;
            sizes.push(next);
        }
        sizes
    })
}

proptest! {
    #[test]
    fn proportional_times_are_linear(sizes in growing_sizes(), scale in 0.5f64..50.0) {
        let points: Vec<(u64, f64)> = sizes.iter().map(|&s| (s, s as f64 * scale)).collect();
        let c = ComplexityClassifier::default().classify_points("op", &points);
        prop_assert_eq!(c.class, ComplexityClass::Linear);
        prop_assert_eq!(c.fit_quality, 1.0);
    }

    #[test]
    fn squared_times_are_quadratic(sizes in growing_sizes()) {
        let points: Vec<(u64, f64)> = sizes.iter().map(|&s| (s, (s as f64).powi(2))).collect();
        let c = ComplexityClassifier::default().classify_points("op", &points);
        prop_assert_eq!(c.class, ComplexityClass::Quadratic);
        prop_assert_eq!(c.fit_quality, 1.0);
    }

    #[test]
    fn flat_times_are_constant(sizes in growing_sizes(), t in 1.0f64..1000.0) {
        let points: Vec<(u64, f64)> = sizes.iter().map(|&s| (s, t)).collect();
        let c = ComplexityClassifier::default().classify_points("op", &points);
        prop_assert_eq!(c.class, ComplexityClass::Constant);
    }

    #[test]
    fn quality_is_a_fraction(times in prop::collection::vec(0.1f64..1e6, 3..8)) {
        let points: Vec<(u64, f64)> = times.iter().enumerate().map(|(i, &t)| (10u64.pow(i as u32 + 1), t)).collect();
        let c = ComplexityClassifier::default().classify_points("op", &points);
        prop_assert!((0.0..=1.0).contains(&c.fit_quality));
        prop_assert_eq!(c.step_classes.len(), points.len() - 1);
    }
}
