//! Run Orchestrator
//!
//! Composes the clock, invocation primitive, calibration search, idle
//! baseline and convergence rules into the two execution strategies:
//!
//! - **Throughput**: calibrate an invocation count so loop overhead is
//!   negligible and batch duration lands in the configured window, take an
//!   idle baseline, then run warmup and target phases with the baseline
//!   subtracted from every batch.
//! - **SingleRun**: one invocation per batch, fixed iteration counts, no
//!   idle subtraction, for work whose cost must be observed directly.
//!
//! The engine is single-threaded and synchronous; a batch always runs to
//! its full invocation count, and the only early exits sit between batches.

use std::any::Any;

use crate::clock::{Clock, MonotonicClock, pin_to_cpu};
use crate::config::{EngineTuning, TaskConfiguration};
use crate::convergence::StopRule;
use crate::measurement::Measurement;
use crate::mode::{IterationMode, RunState};
use crate::settle::{HeapSettle, NoopSettle};
use crate::sink::{ConsoleSink, ProgressSink};

/// Contract violations that fail fast before any batch is timed.
#[derive(Debug, Clone, thiserror::Error)]
pub enum EngineError {
    /// A batch was requested with zero invocations.
    #[error("invocation count must be at least 1")]
    ZeroInvocationCount,
    /// A run was requested with zero operations per invoke.
    #[error("operations per invoke must be at least 1")]
    ZeroOperationsPerInvoke,
}

/// Per-phase measurement sequences of a completed run.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RunReport {
    /// Payload invocations per timed batch.
    pub invocation_count: u64,
    /// Idle baseline subtracted from each warmup/target batch.
    pub idle_ticks: i64,
    /// Warmup-phase measurements, in execution order.
    pub warmup: Vec<Measurement>,
    /// Target-phase measurements, in execution order.
    pub target: Vec<Measurement>,
}

/// Terminal outcome of a throughput run.
///
/// Unmeasurable is a normal outcome, not an error: the payload's
/// per-operation signal sits below the noise floor and no measurement
/// sequence could honestly be produced.
#[derive(Debug, Clone, serde::Serialize)]
pub enum RunOutcome {
    /// Calibration succeeded and both phases completed.
    Measured(RunReport),
    /// Calibration determined the payload cannot be measured.
    Unmeasurable,
}

impl RunOutcome {
    /// Whether the run aborted as unmeasurable.
    pub fn is_unmeasurable(&self) -> bool {
        matches!(self, RunOutcome::Unmeasurable)
    }

    /// The report, if the run produced one.
    pub fn report(&self) -> Option<&RunReport> {
        match self {
            RunOutcome::Measured(report) => Some(report),
            RunOutcome::Unmeasurable => None,
        }
    }
}

/// Where calibration landed.
enum Calibration {
    Count(u64),
    Unmeasurable,
}

/// Retains the last value a payload produced.
///
/// Writing every result here (through `black_box`) is what stops the
/// optimizer from proving the timed calls unused and eliding them.
#[derive(Default)]
struct ValueSink {
    last: Option<Box<dyn Any>>,
}

impl ValueSink {
    fn store<T: 'static>(&mut self, value: T) {
        self.last = Some(Box::new(value));
    }

    fn take<T: 'static>(&mut self) -> Option<T> {
        self.last
            .take()
            .and_then(|boxed| boxed.downcast::<T>().ok())
            .map(|boxed| *boxed)
    }
}

/// The benchmark execution engine.
pub struct Engine<C: Clock> {
    clock: C,
    config: TaskConfiguration,
    tuning: EngineTuning,
    state: RunState,
    sink: Box<dyn ProgressSink>,
    settle: Box<dyn HeapSettle>,
    value_sink: ValueSink,
}

impl Engine<MonotonicClock> {
    /// Engine over the wall clock, with default tuning and a stdout sink.
    pub fn new(config: TaskConfiguration) -> Self {
        Self::with_clock(MonotonicClock::new(), config)
    }
}

impl<C: Clock> Engine<C> {
    /// Engine over an explicit clock.
    pub fn with_clock(clock: C, config: TaskConfiguration) -> Self {
        Self {
            clock,
            config,
            tuning: EngineTuning::default(),
            state: RunState::new(),
            sink: Box::new(ConsoleSink),
            settle: Box::new(NoopSettle),
            value_sink: ValueSink::default(),
        }
    }

    /// Replace the calibration tuning constants.
    pub fn with_tuning(mut self, tuning: EngineTuning) -> Self {
        self.tuning = tuning;
        self
    }

    /// Replace the progress sink.
    pub fn with_sink(mut self, sink: impl ProgressSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    /// Replace the post-batch heap-settle hook.
    pub fn with_settle(mut self, settle: impl HeapSettle + 'static) -> Self {
        self.settle = Box::new(settle);
        self
    }

    /// Read access to the run-scoped mode/iteration context.
    pub fn state(&self) -> &RunState {
        &self.state
    }

    /// Take the last value a payload produced, if it was of type `T`.
    pub fn last_value<T: 'static>(&mut self) -> Option<T> {
        self.value_sink.take()
    }

    /// Throughput strategy: calibrate, baseline, warm up, measure.
    pub fn throughput<T, U>(
        &mut self,
        operations_per_invoke: u64,
        mut setup: impl FnMut(),
        mut target: impl FnMut(&RunState) -> T,
        mut idle: impl FnMut(&RunState) -> U,
    ) -> Result<RunOutcome, EngineError>
    where
        T: 'static,
        U: 'static,
    {
        if operations_per_invoke == 0 {
            return Err(EngineError::ZeroOperationsPerInvoke);
        }
        self.pin_if_configured();

        // Prime fixture state and code paths once, untimed.
        self.state.enter(IterationMode::PreWarmup, 0);
        setup();
        let _ = std::hint::black_box(target(&self.state));
        let _ = std::hint::black_box(idle(&self.state));

        let invocation_count = match self.calibrate(
            operations_per_invoke,
            &mut setup,
            &mut target,
            &mut idle,
        )? {
            Calibration::Count(count) => count,
            Calibration::Unmeasurable => {
                self.sink.line("!! Unmeasurable !!");
                tracing::warn!("per-operation signal is below the measurable floor, aborting run");
                return Ok(RunOutcome::Unmeasurable);
            }
        };
        self.sink.line(&format!("// IterationCount = {invocation_count}"));
        tracing::info!(invocation_count, "calibration accepted");

        let idle_batches = self.tuning.idle_batch_count as i32;
        self.run_phase(
            IterationMode::WarmupIdle,
            idle_batches,
            operations_per_invoke,
            &mut setup,
            &mut idle,
            invocation_count,
            0,
        )?;
        let target_idle = self.run_phase(
            IterationMode::TargetIdle,
            idle_batches,
            operations_per_invoke,
            &mut setup,
            &mut idle,
            invocation_count,
            0,
        )?;
        let idle_ticks = if target_idle.is_empty() {
            0
        } else {
            target_idle.iter().map(|m| m.ticks()).sum::<i64>() / target_idle.len() as i64
        };
        tracing::debug!(idle_ticks, "idle baseline established");

        let warmup = self.run_phase(
            IterationMode::Warmup,
            self.config.warmup_iteration_count,
            operations_per_invoke,
            &mut setup,
            &mut target,
            invocation_count,
            idle_ticks,
        )?;
        let target = self.run_phase(
            IterationMode::Target,
            self.config.target_iteration_count,
            operations_per_invoke,
            &mut setup,
            &mut target,
            invocation_count,
            idle_ticks,
        )?;

        Ok(RunOutcome::Measured(RunReport {
            invocation_count,
            idle_ticks,
            warmup,
            target,
        }))
    }

    /// SingleRun strategy: one invocation per batch, no calibration.
    pub fn single_run<T: 'static>(
        &mut self,
        operations_per_invoke: u64,
        mut setup: impl FnMut(),
        mut target: impl FnMut(&RunState) -> T,
    ) -> Result<RunReport, EngineError> {
        if operations_per_invoke == 0 {
            return Err(EngineError::ZeroOperationsPerInvoke);
        }
        self.pin_if_configured();

        let warmup_count = self.config.warmup_iteration_count.max(0);
        let target_count = self.config.target_iteration_count.max(1);

        let warmup = self.run_phase(
            IterationMode::Warmup,
            warmup_count,
            operations_per_invoke,
            &mut setup,
            &mut target,
            1,
            0,
        )?;
        let target = self.run_phase(
            IterationMode::Target,
            target_count,
            operations_per_invoke,
            &mut setup,
            &mut target,
            1,
            0,
        )?;

        Ok(RunReport {
            invocation_count: 1,
            idle_ticks: 0,
            warmup,
            target,
        })
    }

    /// Grow the invocation count until a target batch is long enough to
    /// dominate loop overhead, or until the payload proves unmeasurable.
    fn calibrate<T, U>(
        &mut self,
        operations_per_invoke: u64,
        setup: &mut impl FnMut(),
        target: &mut impl FnMut(&RunState) -> T,
        idle: &mut impl FnMut(&RunState) -> U,
    ) -> Result<Calibration, EngineError>
    where
        T: 'static,
        U: 'static,
    {
        let mut invocation_count = self.tuning.initial_invocation_count.max(1);
        let mut round = 0u64;
        loop {
            self.state.enter(IterationMode::PreWarmup, round);
            round += 1;

            let pre_idle = self.invoke_batch(
                "// Pre-Warmup (Idle)",
                setup,
                idle,
                invocation_count,
                operations_per_invoke,
                0,
            )?;
            let pre_target = self.invoke_batch(
                "// Pre-Warmup (Target)",
                setup,
                target,
                invocation_count,
                operations_per_invoke,
                0,
            )?;
            tracing::debug!(
                invocation_count,
                target_ms = pre_target.milliseconds(),
                idle_ms = pre_idle.milliseconds(),
                "calibration round"
            );

            let target_ms = pre_target.milliseconds();
            if target_ms > self.tuning.min_batch_ms {
                if pre_idle.milliseconds() < 0.01 * target_ms {
                    return Ok(Calibration::Count(invocation_count));
                }
                if pre_idle.milliseconds() < 0.10 * target_ms {
                    return Ok(Calibration::Count(invocation_count));
                }
                let net_ns_per_invoke = (pre_target.nanoseconds() - pre_idle.nanoseconds())
                    / invocation_count as f64;
                if net_ns_per_invoke < self.tuning.unmeasurable_ns_per_op {
                    return Ok(Calibration::Unmeasurable);
                }
                if target_ms > self.tuning.max_batch_ms {
                    if pre_idle.milliseconds() > 0.10 * target_ms {
                        return Ok(Calibration::Unmeasurable);
                    }
                    return Ok(Calibration::Count(invocation_count));
                }
            }

            // Monotone growth guarantees the duration window is eventually
            // crossed; termination then happens at one of the checks above.
            invocation_count = if target_ms < 1.0 {
                invocation_count.saturating_mul(self.tuning.min_batch_ms as u64)
            } else if target_ms < self.tuning.min_batch_ms {
                invocation_count.saturating_mul((self.tuning.min_batch_ms / target_ms).ceil() as u64)
            } else {
                invocation_count.saturating_mul(2)
            };
        }
    }

    /// Run one phase until its stopping rule is satisfied.
    fn run_phase<T: 'static>(
        &mut self,
        mode: IterationMode,
        configured_count: i32,
        operations_per_invoke: u64,
        setup: &mut impl FnMut(),
        payload: &mut impl FnMut(&RunState) -> T,
        invocation_count: u64,
        idle_ticks: i64,
    ) -> Result<Vec<Measurement>, EngineError> {
        let rule = StopRule::for_phase(mode, configured_count);
        // Only final Target lines go out unprefixed
        let prefix = if mode == IterationMode::Target { "" } else { "// " };

        let mut measurements = Vec::new();
        let mut iteration = 0u64;
        while !rule.is_enough(iteration, &measurements) {
            self.state.enter(mode, iteration);
            let label = format!("{prefix}{} {}", mode.label(), iteration + 1);
            let measurement = self.invoke_batch(
                &label,
                setup,
                payload,
                invocation_count,
                operations_per_invoke,
                idle_ticks,
            )?;
            measurements.push(measurement);
            iteration += 1;
        }
        Ok(measurements)
    }

    /// The invocation primitive: time `invocation_count` back-to-back calls.
    fn invoke_batch<T: 'static>(
        &mut self,
        label: &str,
        setup: &mut impl FnMut(),
        payload: &mut impl FnMut(&RunState) -> T,
        invocation_count: u64,
        operations_per_invoke: u64,
        idle_ticks: i64,
    ) -> Result<Measurement, EngineError> {
        if invocation_count == 0 {
            return Err(EngineError::ZeroInvocationCount);
        }
        if operations_per_invoke == 0 {
            return Err(EngineError::ZeroOperationsPerInvoke);
        }
        let operation_count = invocation_count.saturating_mul(operations_per_invoke);

        setup();

        let state = &self.state;
        let started = self.clock.ticks();
        let mut holder = std::hint::black_box(payload(state));
        for _ in 1..invocation_count {
            holder = std::hint::black_box(payload(state));
        }
        let elapsed = self.clock.ticks().saturating_sub(started);

        // The last produced value escapes into a field that outlives the
        // batch, so the calls above stay observable.
        self.value_sink.store(holder);

        let measurement = Measurement::new(
            operation_count,
            elapsed as i64 - idle_ticks,
            self.clock.frequency(),
        );
        self.sink.line(&format!("{label}: {measurement}"));
        self.settle.settle();
        Ok(measurement)
    }

    fn pin_if_configured(&self) {
        if let Some(cpu) = self.tuning.pin_cpu {
            if let Err(err) = pin_to_cpu(cpu) {
                tracing::warn!(cpu, %err, "failed to pin run to core");
            }
        }
    }
}
