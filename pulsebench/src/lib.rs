#![warn(missing_docs)]
//! # Pulsebench
//!
//! Benchmark execution engine: give it a unit of work and it decides how
//! many times to invoke it, separates loop overhead from payload time, and
//! stops iterating once the measurements have statistically converged.
//!
//! - **Calibration**: grows the per-batch invocation count until loop
//!   overhead is negligible and batch duration lands in a sane window;
//!   payloads indistinguishable from the noise floor abort as unmeasurable.
//! - **Idle baseline**: dedicated idle phases measure fixed per-call
//!   overhead, which is subtracted from every target measurement.
//! - **Convergence**: warmup runs until the timing trend flattens, target
//!   runs until the newest sample no longer shifts the distribution.
//! - **Run state**: measured code can read its own phase and iteration
//!   through the `RunState` handed to every payload call.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pulsebench::{Engine, TaskConfiguration};
//!
//! let mut engine = Engine::new(TaskConfiguration::default());
//! let outcome = engine
//!     .throughput(1, || {}, |_state| fibonacci(20), |_state| {})
//!     .unwrap();
//! if let Some(report) = outcome.report() {
//!     for m in &report.target {
//!         println!("{m}");
//!     }
//! }
//! # fn fibonacci(n: u64) -> u64 { n }
//! ```

// Re-export the engine surface
pub use pulsebench_core::{
    Clock, ConsoleSink, Engine, EngineError, EngineTuning, HeapSettle, IterationMode, ManualClock,
    ManualClockHandle, MemorySink, Measurement, MonotonicClock, NANOS_PER_SEC, NoopSettle,
    ProgressSink, RunOutcome, RunReport, RunState, StopRule, TaskConfiguration, pin_to_cpu,
};

// Re-export stats
pub use pulsebench_stats::{StatSummary, are_similar};
