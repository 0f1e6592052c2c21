//! Allocation figures with the counting allocator installed process-wide.

use std::sync::Arc;

use scalebench::alloc::CountingAllocator;
use scalebench::{Operation, Orchestrator, PerformanceThreshold, RegressionComparator, SweepSpec, WallClockAdapter};
use scalebench_core::config::SweepConfig;
use scalebench_core::traits::CancellationToken;
use scalebench_core::types::ScalingDimension;

#[global_allocator]
static ALLOC: CountingAllocator = CountingAllocator;

fn one_allocation_per_call() -> Operation {
    Operation::new("boxed", |_| {
        std::hint::black_box(Box::new(7u64));
        Ok(())
    })
}

#[test]
fn concurrent_units_do_not_count_each_other() {
    let settings = SweepConfig {
        repetitions: Some(3),
        iterations: Some(400),
        warmup_passes: Some(0),
        ..SweepConfig::default()
    };
    let plan = SweepSpec::new(settings)
        .operation(one_allocation_per_call())
        .dimension(ScalingDimension::concurrency(vec![1, 4]))
        .validate()
        .unwrap();
    let outcome = Orchestrator::new(plan, Arc::new(WallClockAdapter))
        .run(&CancellationToken::new())
        .unwrap();

    let samples = outcome.result_set.samples("boxed");
    assert_eq!(samples.len(), 6);
    for s in samples {
        assert!(s.is_valid(), "{:?}", s.fault);
        assert_eq!(s.allocs_per_iter, 1.0, "at {}", s.point);
        assert_eq!(s.bytes_per_iter, 8.0, "at {}", s.point);
    }

    let threshold = PerformanceThreshold::new("boxed")
        .with_max_time(std::time::Duration::from_secs(1))
        .with_max_allocs(1);
    let report = RegressionComparator::default().check_thresholds(&outcome.result_set, &[threshold]);
    assert!(report.findings.is_empty(), "{:?}", report.findings);
}
