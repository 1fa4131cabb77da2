//! Measurement
//!
//! One timed batch reduced to an immutable record. Raw ticks are clamped to
//! a minimum of 1 at construction so every derived rate is well defined;
//! the derived fields are pure functions of the two stored inputs and the
//! clock frequency.

use serde::Serialize;

/// Result of one timed batch of payload invocations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Measurement {
    operation_count: u64,
    ticks: i64,
    nanoseconds: f64,
    milliseconds: f64,
    seconds: f64,
    nanoseconds_per_operation: f64,
    operations_per_second: f64,
}

impl Measurement {
    /// Build a measurement from raw elapsed ticks.
    ///
    /// `ticks` may be negative (idle subtraction can overshoot on a noisy
    /// batch); it is clamped to 1. `frequency` is the clock's ticks per
    /// second. `operation_count` must be at least 1; the engine validates
    /// this before any batch runs.
    pub fn new(operation_count: u64, ticks: i64, frequency: u64) -> Self {
        debug_assert!(operation_count >= 1);
        debug_assert!(frequency >= 1);

        let ticks = ticks.max(1);
        let nanoseconds = (ticks as f64 / frequency as f64) * 1e9;
        let milliseconds = nanoseconds / 1e6;
        let seconds = nanoseconds / 1e9;
        let nanoseconds_per_operation = nanoseconds / operation_count as f64;
        let operations_per_second = operation_count as f64 / seconds;

        Self {
            operation_count,
            ticks,
            nanoseconds,
            milliseconds,
            seconds,
            nanoseconds_per_operation,
            operations_per_second,
        }
    }

    /// Logical operations represented by the batch.
    pub fn operation_count(&self) -> u64 {
        self.operation_count
    }

    /// Elapsed clock ticks, clamped to a minimum of 1.
    pub fn ticks(&self) -> i64 {
        self.ticks
    }

    /// Elapsed nanoseconds.
    pub fn nanoseconds(&self) -> f64 {
        self.nanoseconds
    }

    /// Elapsed milliseconds.
    pub fn milliseconds(&self) -> f64 {
        self.milliseconds
    }

    /// Elapsed seconds.
    pub fn seconds(&self) -> f64 {
        self.seconds
    }

    /// Nanoseconds per logical operation.
    pub fn nanoseconds_per_operation(&self) -> f64 {
        self.nanoseconds_per_operation
    }

    /// Logical operations per second.
    pub fn operations_per_second(&self) -> f64 {
        self.operations_per_second
    }
}

impl std::fmt::Display for Measurement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:.4} ns/op, {} op, {:.1} ms, {:.1} ns, {} ticks, {:.1} op/s",
            self.nanoseconds_per_operation,
            self.operation_count,
            self.milliseconds,
            self.nanoseconds,
            self.ticks,
            self.operations_per_second,
        )
    }
}
