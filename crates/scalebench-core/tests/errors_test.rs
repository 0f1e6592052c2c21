//! Tests for the scalebench error types.

use scalebench_core::errors::error_code;
use scalebench_core::errors::*;
use scalebench_core::types::DimensionKind;

#[test]
fn every_error_has_a_code() {
    let config = ConfigError::ZeroConcurrency;
    assert!(!config.error_code().is_empty());

    let sweep = SweepError::from(ConfigError::MissingGenerator {
        operation: "hash".into(),
    });
    assert!(!sweep.error_code().is_empty());

    let persistence = PersistenceError::Format {
        path: "baseline.json".into(),
        message: "eof".into(),
    };
    assert!(!persistence.error_code().is_empty());
}

#[test]
fn config_faults_map_to_specific_codes() {
    assert_eq!(
        ConfigError::DuplicateThreshold { name: "sort".into() }.error_code(),
        error_code::DUPLICATE_THRESHOLD
    );
    assert_eq!(
        ConfigError::UnknownOperation { name: "sort".into() }.error_code(),
        error_code::UNKNOWN_OPERATION
    );
    assert_eq!(
        ConfigError::NonMonotonicSizes { previous: 10, next: 5 }.error_code(),
        error_code::INVALID_DIMENSION
    );
    assert_eq!(
        ConfigError::EmptyDimension { kind: DimensionKind::Concurrency }.error_code(),
        error_code::INVALID_DIMENSION
    );
}

#[test]
fn sweep_error_forwards_config_code() {
    let err: SweepError = ConfigError::DuplicateOperation { name: "hash".into() }.into();
    assert_eq!(err.error_code(), error_code::DUPLICATE_OPERATION);
    assert!(err.coded_string().starts_with("[DUPLICATE_OPERATION]"));
}

#[test]
fn messages_name_the_offending_value() {
    let err = ConfigError::NonMonotonicSizes { previous: 100, next: 10 };
    let msg = err.to_string();
    assert!(msg.contains("100") && msg.contains("10"));

    let err = ConfigError::ArgumentPosition {
        operation: "parse".into(),
        position: 3,
        len: 1,
    };
    assert!(err.to_string().contains("parse"));
}
