//! Engine Configuration
//!
//! `TaskConfiguration` is the contract with the collaborator that plans the
//! run: a negative iteration count means "stop on convergence instead of a
//! fixed count". `EngineTuning` collects the empirical constants of the
//! calibration search; they are deliberately configuration, not hard-coded
//! assumptions.

use serde::{Deserialize, Serialize};

/// Per-task iteration counts, consumed read-only by the engine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TaskConfiguration {
    /// Warmup batches to run; negative means convergence-driven.
    #[serde(default = "default_iteration_count")]
    pub warmup_iteration_count: i32,
    /// Target batches to run; negative means convergence-driven.
    #[serde(default = "default_iteration_count")]
    pub target_iteration_count: i32,
}

impl Default for TaskConfiguration {
    fn default() -> Self {
        Self {
            warmup_iteration_count: default_iteration_count(),
            target_iteration_count: default_iteration_count(),
        }
    }
}

impl TaskConfiguration {
    /// Fixed iteration counts for both phases.
    pub fn fixed(warmup: i32, target: i32) -> Self {
        Self {
            warmup_iteration_count: warmup,
            target_iteration_count: target,
        }
    }
}

fn default_iteration_count() -> i32 {
    -1
}

/// Empirical tuning constants of the calibration search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineTuning {
    /// Invocation count the calibration search starts from.
    #[serde(default = "default_initial_invocation_count")]
    pub initial_invocation_count: u64,
    /// Lower batch-duration threshold in milliseconds; calibration keeps
    /// growing the invocation count until a target batch exceeds it.
    #[serde(default = "default_min_batch_ms")]
    pub min_batch_ms: f64,
    /// Upper batch-duration threshold in milliseconds; batches longer than
    /// this are accepted (or declared unmeasurable when idle-dominated).
    #[serde(default = "default_max_batch_ms")]
    pub max_batch_ms: f64,
    /// Per-operation signal floor in nanoseconds. Payloads whose net cost
    /// falls below it are indistinguishable from loop overhead.
    #[serde(default = "default_unmeasurable_ns_per_op")]
    pub unmeasurable_ns_per_op: f64,
    /// Idle batches per idle phase (WarmupIdle and TargetIdle).
    #[serde(default = "default_idle_batch_count")]
    pub idle_batch_count: u64,
    /// Pin the run to this core before measuring.
    #[serde(default)]
    pub pin_cpu: Option<usize>,
}

impl Default for EngineTuning {
    fn default() -> Self {
        Self {
            initial_invocation_count: default_initial_invocation_count(),
            min_batch_ms: default_min_batch_ms(),
            max_batch_ms: default_max_batch_ms(),
            unmeasurable_ns_per_op: default_unmeasurable_ns_per_op(),
            idle_batch_count: default_idle_batch_count(),
            pin_cpu: None,
        }
    }
}

fn default_initial_invocation_count() -> u64 {
    4
}
fn default_min_batch_ms() -> f64 {
    1000.0
}
fn default_max_batch_ms() -> f64 {
    10000.0
}
fn default_unmeasurable_ns_per_op() -> f64 {
    0.5
}
fn default_idle_batch_count() -> u64 {
    3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_convergence_driven() {
        let config = TaskConfiguration::default();
        assert!(config.warmup_iteration_count < 0);
        assert!(config.target_iteration_count < 0);
    }

    #[test]
    fn test_tuning_defaults() {
        let tuning = EngineTuning::default();
        assert_eq!(tuning.initial_invocation_count, 4);
        assert!((tuning.min_batch_ms - 1000.0).abs() < f64::EPSILON);
        assert!((tuning.max_batch_ms - 10000.0).abs() < f64::EPSILON);
        assert!((tuning.unmeasurable_ns_per_op - 0.5).abs() < f64::EPSILON);
        assert_eq!(tuning.idle_batch_count, 3);
        assert!(tuning.pin_cpu.is_none());
    }
}
