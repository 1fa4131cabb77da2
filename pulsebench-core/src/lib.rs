#![warn(missing_docs)]
//! Pulsebench Core - Benchmark Execution Engine
//!
//! This crate provides the measurement engine for benchmark runs:
//! - `Engine` orchestrating the Throughput and SingleRun strategies
//! - Calibration search for an adequate per-batch invocation count
//! - Idle-baseline subtraction separating loop overhead from payload time
//! - Convergence-driven stopping rules for warmup and target phases
//! - `RunState` so measured code can observe its own phase and iteration

mod clock;
mod config;
mod convergence;
mod engine;
mod measurement;
mod mode;
mod settle;
mod sink;

pub use clock::{Clock, ManualClock, ManualClockHandle, MonotonicClock, NANOS_PER_SEC, pin_to_cpu};
pub use config::{EngineTuning, TaskConfiguration};
pub use convergence::{MIN_TARGET_MEASUREMENTS, MIN_WARMUP_MEASUREMENTS, StopRule};
pub use engine::{Engine, EngineError, RunOutcome, RunReport};
pub use measurement::Measurement;
pub use mode::{IterationMode, RunState};
pub use settle::{HeapSettle, NoopSettle};
pub use sink::{ConsoleSink, MemorySink, ProgressSink};
