//! Scaling orchestrator: drives every operation across every dimension
//! point of a [`SweepPlan`] and collects the samples into a [`ResultSet`].
//!
//! Points are visited operation by operation, in plan order. At each point
//! the orchestrator runs the configured warm-up passes (discarded) and then
//! the measured passes. A pass at concurrency N starts N execution units
//! that draw iterations from one shared budget until it is exhausted.
//!
//! Faults during measurement never abort the sweep; they are recorded on
//! the affected sample. Deadline, invocation cap and cancellation are
//! checked before every pass.

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, RecvTimeoutError, Sender};
use serde::{Deserialize, Serialize};

use scalebench_core::errors::{ConfigError, SweepError};
use scalebench_core::traits::Cancellable;
use scalebench_core::types::{ArgValue, DimensionKind, DimensionPoint};

use crate::adapter::{Measurement, TimingAdapter};
use crate::generator::DataGenerator;
use crate::operation::{Operation, SizeBinding};
use crate::plan::SweepPlan;
use crate::result_set::{EnvironmentInfo, ResultSet};
use crate::sample::{MeasurementSample, SampleFault};

/// Why a sweep ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    Completed,
    Cancelled,
    DeadlineExceeded,
    InvocationCapReached,
}

impl StopReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::DeadlineExceeded => "deadline_exceeded",
            Self::InvocationCapReached => "invocation_cap_reached",
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a sweep produced.
#[derive(Debug, Clone)]
pub struct SweepOutcome {
    pub result_set: ResultSet,
    pub stop_reason: StopReason,
    /// Operation invocations across all passes, warm-up included.
    pub invocations: u64,
    /// (operation, point) pairs whose passes all ran.
    pub points_visited: usize,
    pub elapsed: Duration,
}

impl SweepOutcome {
    pub fn is_complete(&self) -> bool {
        self.stop_reason == StopReason::Completed
    }
}

/// What one pass at one point produced.
enum PassResult {
    Measured { iterations: u64, measurement: Measurement },
    TimedOut { iterations: u64, cutoff: Duration },
    Failed { iterations: u64, fault: SampleFault },
}

impl PassResult {
    fn iterations(&self) -> u64 {
        match self {
            Self::Measured { iterations, .. } | Self::TimedOut { iterations, .. } | Self::Failed { iterations, .. } => {
                *iterations
            }
        }
    }

    fn into_sample(self, operation: &Operation, point: &DimensionPoint, pass: u32) -> MeasurementSample {
        match self {
            Self::Measured { iterations, measurement } => MeasurementSample::from_measurement(
                operation.name(),
                point,
                pass,
                iterations,
                &measurement,
                operation.expectation(),
            ),
            Self::TimedOut { iterations, cutoff } => {
                MeasurementSample::timed_out(operation.name(), point, pass, iterations, cutoff)
            }
            Self::Failed { iterations, fault } => {
                MeasurementSample::faulted(operation.name(), point, pass, iterations, fault)
            }
        }
    }
}

/// Message from an execution unit to the coordinating thread.
enum UnitEvent {
    Call {
        unit: usize,
        iterations: u64,
        measurement: Measurement,
    },
    Panicked {
        unit: usize,
        message: String,
    },
}

/// Running totals the stop checks read.
struct SweepProgress {
    started: Instant,
    invocations: u64,
}

pub struct Orchestrator {
    plan: SweepPlan,
    adapter: Arc<dyn TimingAdapter>,
    generator: Option<Arc<dyn DataGenerator>>,
}

impl Orchestrator {
    pub fn new(plan: SweepPlan, adapter: Arc<dyn TimingAdapter>) -> Self {
        Self {
            plan,
            adapter,
            generator: None,
        }
    }

    pub fn with_generator(mut self, generator: Arc<dyn DataGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn plan(&self) -> &SweepPlan {
        &self.plan
    }

    /// Operations with generated arguments need a generator once the plan
    /// sweeps input sizes.
    fn check_generator(&self) -> Result<(), ConfigError> {
        if self.generator.is_some() || !self.plan.has_dimension(DimensionKind::InputSize) {
            return Ok(());
        }
        match self
            .plan
            .operations()
            .iter()
            .find(|op| op.size_binding() == SizeBinding::Generated)
        {
            Some(op) => Err(ConfigError::MissingGenerator {
                operation: op.name().to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Run the whole sweep. Only setup faults are returned as errors.
    pub fn run(&self, cancel: &dyn Cancellable) -> Result<SweepOutcome, SweepError> {
        self.check_generator()?;

        let settings = self.plan.settings();
        let repetitions = settings.effective_repetitions();
        let warmup_passes = settings.effective_warmup_passes();
        let iterations = settings.effective_iterations();

        tracing::info!(
            operations = self.plan.operations().len(),
            points = self.plan.points().len(),
            repetitions,
            iterations,
            mode = ?settings.effective_mode(),
            "sweep started"
        );

        let mut progress = SweepProgress {
            started: Instant::now(),
            invocations: 0,
        };
        let mut results = ResultSet::new().with_environment(EnvironmentInfo::capture());
        let mut points_visited = 0;
        let mut stop_reason = StopReason::Completed;

        'sweep: for operation in self.plan.operations() {
            for point in self.plan.points() {
                let args = Arc::new(operation.args_for_size(point.input_size(), self.generator.as_deref()));
                tracing::debug!(operation = %operation.name(), point = %point, "measuring point");

                for _ in 0..warmup_passes {
                    if let Some(reason) = self.stop_condition(cancel, &progress, iterations) {
                        stop_reason = reason;
                        break 'sweep;
                    }
                    let _ = self.run_pass(operation, &args, point, &mut progress);
                }

                for pass in 0..repetitions {
                    if let Some(reason) = self.stop_condition(cancel, &progress, iterations) {
                        stop_reason = reason;
                        break 'sweep;
                    }
                    let sample = self
                        .run_pass(operation, &args, point, &mut progress)
                        .into_sample(operation, point, pass);
                    if let Some(fault) = &sample.fault {
                        tracing::warn!(
                            operation = %operation.name(),
                            point = %point,
                            pass,
                            fault = %fault,
                            "faulty sample"
                        );
                    }
                    results.push(sample);
                }
                points_visited += 1;
            }
        }

        let elapsed = progress.started.elapsed();
        tracing::info!(
            stop_reason = stop_reason.as_str(),
            invocations = progress.invocations,
            points_visited,
            samples = results.sample_count(),
            elapsed_ms = elapsed.as_millis() as u64,
            "sweep finished"
        );

        Ok(SweepOutcome {
            result_set: results,
            stop_reason,
            invocations: progress.invocations,
            points_visited,
            elapsed,
        })
    }

    /// Checked before every pass. A pass only starts when its whole
    /// iteration budget fits under the invocation cap.
    fn stop_condition(&self, cancel: &dyn Cancellable, progress: &SweepProgress, budget: u64) -> Option<StopReason> {
        let settings = self.plan.settings();
        if cancel.is_cancelled() {
            return Some(StopReason::Cancelled);
        }
        if settings
            .deadline()
            .is_some_and(|deadline| progress.started.elapsed() >= deadline)
        {
            return Some(StopReason::DeadlineExceeded);
        }
        if settings
            .max_invocations
            .is_some_and(|cap| progress.invocations.saturating_add(budget) > cap)
        {
            return Some(StopReason::InvocationCapReached);
        }
        None
    }

    fn run_pass(
        &self,
        operation: &Arc<Operation>,
        args: &Arc<Vec<ArgValue>>,
        point: &DimensionPoint,
        progress: &mut SweepProgress,
    ) -> PassResult {
        let budget = self.plan.settings().effective_iterations();
        let units = point.concurrency();
        let timeout = self.plan.settings().per_call_timeout();

        let result = if units == 1 && timeout.is_none() {
            self.run_inline(operation, args, budget)
        } else {
            self.run_units(operation, args, budget, units, timeout)
        };

        progress.invocations += result.iterations();
        result
    }

    /// Single unit without a cutoff: the whole budget in one adapter call
    /// on the calling thread.
    fn run_inline(&self, operation: &Operation, args: &[ArgValue], budget: u64) -> PassResult {
        match catch_unwind(AssertUnwindSafe(|| self.adapter.measure(operation, args, budget))) {
            Ok(measurement) => PassResult::Measured {
                iterations: budget,
                measurement,
            },
            Err(payload) => PassResult::Failed {
                iterations: 0,
                fault: SampleFault::Panicked(panic_message(payload.as_ref())),
            },
        }
    }

    fn run_units(
        &self,
        operation: &Arc<Operation>,
        args: &Arc<Vec<ArgValue>>,
        budget: u64,
        units: u64,
        timeout: Option<Duration>,
    ) -> PassResult {
        let remaining = Arc::new(AtomicU64::new(budget));
        let abort = Arc::new(AtomicBool::new(false));
        let (tx, rx) = unbounded::<UnitEvent>();

        let mut handles = Vec::with_capacity(units as usize);
        for unit in 0..units as usize {
            let ctx = UnitContext {
                unit,
                operation: Arc::clone(operation),
                args: Arc::clone(args),
                adapter: Arc::clone(&self.adapter),
                remaining: Arc::clone(&remaining),
                abort: Arc::clone(&abort),
                tx: tx.clone(),
            };
            let spawned = std::thread::Builder::new()
                .name(format!("scalebench-unit-{unit}"))
                .spawn(move || ctx.run());
            match spawned {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    abort.store(true, Ordering::Release);
                    drop(tx);
                    // Drain what already-started units report before giving up.
                    let drained: u64 = rx
                        .iter()
                        .map(|event| match event {
                            UnitEvent::Call { iterations, .. } => iterations,
                            UnitEvent::Panicked { .. } => 0,
                        })
                        .sum();
                    return PassResult::Failed {
                        iterations: drained,
                        fault: SampleFault::SpawnFailed(e.to_string()),
                    };
                }
            }
        }
        drop(tx);

        let mut unit_elapsed = vec![Duration::ZERO; units as usize];
        let mut completed: u64 = 0;
        let mut allocations: i64 = 0;
        let mut bytes_allocated: i64 = 0;
        let mut mismatch = None;
        let mut last_outcome = Ok(());
        let expectation = operation.expectation();

        loop {
            let event = match timeout {
                Some(cutoff) => match rx.recv_timeout(cutoff) {
                    Ok(event) => event,
                    Err(RecvTimeoutError::Disconnected) => break,
                    Err(RecvTimeoutError::Timeout) => {
                        // Hung units are abandoned; they exit on their own
                        // once the call returns and they see the abort flag.
                        abort.store(true, Ordering::Release);
                        drop(handles);
                        return PassResult::TimedOut {
                            iterations: completed + 1,
                            cutoff,
                        };
                    }
                },
                None => match rx.recv() {
                    Ok(event) => event,
                    Err(_) => break,
                },
            };

            match event {
                UnitEvent::Call {
                    unit,
                    iterations,
                    measurement,
                } => {
                    unit_elapsed[unit] += measurement.elapsed;
                    completed += iterations;
                    allocations = allocations.saturating_add(measurement.allocations);
                    bytes_allocated = bytes_allocated.saturating_add(measurement.bytes_allocated);
                    if mismatch.is_none() && !expectation.is_met_by(&measurement.outcome) {
                        mismatch = Some(measurement.outcome.clone());
                    }
                    last_outcome = measurement.outcome;
                }
                UnitEvent::Panicked { unit, message } => {
                    abort.store(true, Ordering::Release);
                    drop(handles);
                    return PassResult::Failed {
                        iterations: completed,
                        fault: SampleFault::Panicked(format!("unit {unit}: {message}")),
                    };
                }
            }
        }

        for handle in handles {
            let _ = handle.join();
        }

        let elapsed = unit_elapsed.into_iter().max().unwrap_or_default();
        PassResult::Measured {
            iterations: completed,
            measurement: Measurement {
                elapsed,
                allocations,
                bytes_allocated,
                outcome: mismatch.unwrap_or(last_outcome),
            },
        }
    }
}

/// State moved into one execution unit thread. Units claim one iteration
/// per adapter call so every call is waited on against the per-call cutoff.
struct UnitContext {
    unit: usize,
    operation: Arc<Operation>,
    args: Arc<Vec<ArgValue>>,
    adapter: Arc<dyn TimingAdapter>,
    remaining: Arc<AtomicU64>,
    abort: Arc<AtomicBool>,
    tx: Sender<UnitEvent>,
}

impl UnitContext {
    fn run(self) {
        let expectation = self.operation.expectation();
        while !self.abort.load(Ordering::Acquire) {
            let iterations = claim(&self.remaining, 1);
            if iterations == 0 {
                break;
            }
            let measured = catch_unwind(AssertUnwindSafe(|| {
                self.adapter.measure(&self.operation, &self.args, iterations)
            }));
            match measured {
                Ok(measurement) => {
                    let stop = !expectation.is_met_by(&measurement.outcome);
                    let sent = self.tx.send(UnitEvent::Call {
                        unit: self.unit,
                        iterations,
                        measurement,
                    });
                    if stop || sent.is_err() {
                        self.abort.store(true, Ordering::Release);
                        break;
                    }
                }
                Err(payload) => {
                    self.abort.store(true, Ordering::Release);
                    let _ = self.tx.send(UnitEvent::Panicked {
                        unit: self.unit,
                        message: panic_message(payload.as_ref()),
                    });
                    break;
                }
            }
        }
    }
}

/// Take up to `max` iterations from the shared budget. Returns 0 once the
/// budget is exhausted; the budget never goes below zero.
fn claim(remaining: &AtomicU64, max: u64) -> u64 {
    remaining
        .fetch_update(Ordering::AcqRel, Ordering::Acquire, |left| {
            (left > 0).then(|| left - left.min(max))
        })
        .map(|previous| previous.min(max))
        .unwrap_or(0)
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
