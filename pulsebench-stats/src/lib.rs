#![warn(missing_docs)]
//! Pulsebench Statistical Support
//!
//! Provides the small statistical surface the execution engine needs:
//! - `StatSummary`: mean / standard deviation / extremes of a sample sequence
//! - `are_similar`: a closeness predicate over two summaries, used as the
//!   stopping condition for convergence-driven measurement phases

mod summary;

pub use summary::{StatSummary, are_similar};

/// Relative mean delta below which two summaries are considered similar.
pub const MEAN_TOLERANCE: f64 = 0.02;

/// Relative standard-deviation delta below which two summaries are
/// considered similar.
pub const STD_DEV_TOLERANCE: f64 = 0.05;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert!((MEAN_TOLERANCE - 0.02).abs() < f64::EPSILON);
        assert!((STD_DEV_TOLERANCE - 0.05).abs() < f64::EPSILON);
    }
}
