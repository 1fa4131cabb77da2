//! Convergence Detection
//!
//! Decides when a phase has run enough batches. A non-negative configured
//! count always wins; a negative count switches to the phase's statistical
//! rule: warmup stops once the timing trend stops improving, target stops
//! once the latest sample no longer shifts the distribution.

use crate::measurement::Measurement;
use crate::mode::IterationMode;
use pulsebench_stats::{StatSummary, are_similar};

/// Minimum measurements before the warmup trend rule may fire.
pub const MIN_WARMUP_MEASUREMENTS: usize = 3;

/// Minimum measurements before the target distribution rule may fire.
pub const MIN_TARGET_MEASUREMENTS: usize = 5;

/// Stopping rule for one phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopRule {
    /// Run exactly this many batches.
    FixedCount(u64),
    /// Stop once the latest batch is no faster than the one before it.
    WarmupTrend,
    /// Stop once the sample distribution is stable under the newest sample.
    TargetDistribution,
}

impl StopRule {
    /// Rule for a phase given its configured count (negative means auto).
    pub fn for_phase(mode: IterationMode, configured_count: i32) -> Self {
        if configured_count >= 0 {
            StopRule::FixedCount(configured_count as u64)
        } else if mode.is_warmup() {
            StopRule::WarmupTrend
        } else {
            StopRule::TargetDistribution
        }
    }

    /// Whether the phase may stop before running batch `iteration`.
    pub fn is_enough(&self, iteration: u64, measurements: &[Measurement]) -> bool {
        match self {
            StopRule::FixedCount(count) => iteration >= *count,
            StopRule::WarmupTrend => {
                measurements.len() >= MIN_WARMUP_MEASUREMENTS
                    && measurements[measurements.len() - 1].ticks()
                        >= measurements[measurements.len() - 2].ticks()
            }
            StopRule::TargetDistribution => {
                if measurements.len() < MIN_TARGET_MEASUREMENTS {
                    return false;
                }
                let full = StatSummary::new(
                    measurements.iter().map(|m| m.nanoseconds_per_operation()),
                );
                let without_last = StatSummary::new(
                    measurements[..measurements.len() - 1]
                        .iter()
                        .map(|m| m.nanoseconds_per_operation()),
                );
                are_similar(&full, &without_last)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::NANOS_PER_SEC;

    fn measurement(ticks: i64) -> Measurement {
        Measurement::new(100, ticks, NANOS_PER_SEC)
    }

    #[test]
    fn test_fixed_count_rule() {
        let rule = StopRule::for_phase(IterationMode::Target, 3);
        assert_eq!(rule, StopRule::FixedCount(3));

        let measurements = vec![measurement(100); 3];
        assert!(!rule.is_enough(2, &measurements));
        assert!(rule.is_enough(3, &measurements));
    }

    #[test]
    fn test_fixed_count_zero_runs_nothing() {
        let rule = StopRule::FixedCount(0);
        assert!(rule.is_enough(0, &[]));
    }

    #[test]
    fn test_negative_count_selects_phase_rule() {
        assert_eq!(
            StopRule::for_phase(IterationMode::Warmup, -1),
            StopRule::WarmupTrend
        );
        assert_eq!(
            StopRule::for_phase(IterationMode::PreWarmup, -1),
            StopRule::WarmupTrend
        );
        assert_eq!(
            StopRule::for_phase(IterationMode::Target, -1),
            StopRule::TargetDistribution
        );
        assert_eq!(
            StopRule::for_phase(IterationMode::TargetIdle, -1),
            StopRule::TargetDistribution
        );
    }

    #[test]
    fn test_warmup_trend_needs_three_measurements() {
        let rule = StopRule::WarmupTrend;
        // Flat trend, but too few samples
        assert!(!rule.is_enough(1, &[measurement(100)]));
        assert!(!rule.is_enough(2, &[measurement(100), measurement(100)]));
    }

    #[test]
    fn test_warmup_trend_stops_when_not_improving() {
        let rule = StopRule::WarmupTrend;

        // Still improving: last < penultimate
        let improving = vec![measurement(300), measurement(200), measurement(100)];
        assert!(!rule.is_enough(3, &improving));

        // Flattened: last == penultimate
        let flat = vec![measurement(300), measurement(100), measurement(100)];
        assert!(rule.is_enough(3, &flat));

        // Reversed: last > penultimate
        let reversed = vec![measurement(300), measurement(100), measurement(150)];
        assert!(rule.is_enough(3, &reversed));
    }

    #[test]
    fn test_target_distribution_needs_five_measurements() {
        let rule = StopRule::TargetDistribution;
        let constant = vec![measurement(1000); 4];
        assert!(!rule.is_enough(4, &constant));
    }

    #[test]
    fn test_target_distribution_converges_on_constant_input() {
        // Zero-variance cost: similar the moment the minimum count is hit
        let rule = StopRule::TargetDistribution;
        let constant = vec![measurement(1000); 5];
        assert!(rule.is_enough(5, &constant));
    }

    #[test]
    fn test_target_distribution_rejects_fresh_shift() {
        let rule = StopRule::TargetDistribution;
        // Latest sample doubles the cost; distribution has not settled
        let shifted = vec![
            measurement(1000),
            measurement(1000),
            measurement(1000),
            measurement(1000),
            measurement(2000),
        ];
        assert!(!rule.is_enough(5, &shifted));
    }
}
