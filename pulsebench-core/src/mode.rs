//! Iteration Modes and Run State
//!
//! A run moves strictly forward through PreWarmup → WarmupIdle → TargetIdle
//! → Warmup → Target. The orchestrator publishes the current mode and
//! iteration index to a run-scoped `RunState` immediately before each batch
//! so the payload can branch on its own phase without extra parameters.

use std::cell::Cell;

/// Phase of the benchmark run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum IterationMode {
    /// Calibration rounds searching for an adequate invocation count.
    PreWarmup,
    /// Idle batches run before the idle baseline is taken (discarded).
    WarmupIdle,
    /// Idle batches averaged into the idle-tick baseline.
    TargetIdle,
    /// Payload batches warming caches and code paths (not reported as final).
    Warmup,
    /// Payload batches that form the reported measurement sequence.
    Target,
}

impl IterationMode {
    /// Whether this mode belongs to the warmup side of the run.
    pub fn is_warmup(self) -> bool {
        matches!(
            self,
            IterationMode::PreWarmup | IterationMode::WarmupIdle | IterationMode::Warmup
        )
    }

    /// Whether this mode belongs to the target side of the run.
    pub fn is_target(self) -> bool {
        matches!(self, IterationMode::TargetIdle | IterationMode::Target)
    }

    /// Human-readable phase label used in progress lines.
    pub fn label(self) -> &'static str {
        match self {
            IterationMode::PreWarmup => "Pre-Warmup",
            IterationMode::WarmupIdle => "Warmup (Idle)",
            IterationMode::TargetIdle => "Target (Idle)",
            IterationMode::Warmup => "Warmup",
            IterationMode::Target => "Target",
        }
    }
}

impl std::fmt::Display for IterationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Run-scoped mode/iteration context visible to the measured code.
///
/// Single writer (the orchestrator, strictly between batches), any number
/// of readers (the payload). The engine is single-threaded, so `Cell` gives
/// the payload a consistent snapshot for the whole batch.
#[derive(Debug)]
pub struct RunState {
    mode: Cell<IterationMode>,
    iteration: Cell<u64>,
}

impl RunState {
    pub(crate) fn new() -> Self {
        Self {
            mode: Cell::new(IterationMode::PreWarmup),
            iteration: Cell::new(0),
        }
    }

    /// Mode of the batch currently executing.
    pub fn mode(&self) -> IterationMode {
        self.mode.get()
    }

    /// Iteration index within the current phase (0-based, resets per phase).
    pub fn iteration(&self) -> u64 {
        self.iteration.get()
    }

    pub(crate) fn enter(&self, mode: IterationMode, iteration: u64) {
        self.mode.set(mode);
        self.iteration.set(iteration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warmup_modes() {
        assert!(IterationMode::PreWarmup.is_warmup());
        assert!(IterationMode::WarmupIdle.is_warmup());
        assert!(IterationMode::Warmup.is_warmup());
        assert!(!IterationMode::TargetIdle.is_warmup());
        assert!(!IterationMode::Target.is_warmup());
    }

    #[test]
    fn test_target_modes() {
        assert!(IterationMode::TargetIdle.is_target());
        assert!(IterationMode::Target.is_target());
        assert!(!IterationMode::PreWarmup.is_target());
        assert!(!IterationMode::WarmupIdle.is_target());
        assert!(!IterationMode::Warmup.is_target());
    }

    #[test]
    fn test_labels() {
        assert_eq!(IterationMode::PreWarmup.label(), "Pre-Warmup");
        assert_eq!(IterationMode::Target.to_string(), "Target");
    }

    #[test]
    fn test_run_state_snapshot() {
        let state = RunState::new();
        assert_eq!(state.mode(), IterationMode::PreWarmup);
        assert_eq!(state.iteration(), 0);

        state.enter(IterationMode::Warmup, 3);
        assert_eq!(state.mode(), IterationMode::Warmup);
        assert_eq!(state.iteration(), 3);
    }
}
