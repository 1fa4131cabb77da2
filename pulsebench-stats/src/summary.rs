//! Summary Statistics
//!
//! Computes the per-phase summary the convergence detector compares:
//! mean and sample standard deviation (n-1 divisor), plus extremes.
//! Empty input yields a zeroed summary rather than an error.

use crate::{MEAN_TOLERANCE, STD_DEV_TOLERANCE};

/// Summary statistics over a sequence of samples
#[derive(Debug, Clone, PartialEq)]
pub struct StatSummary {
    /// Number of samples
    pub count: usize,
    /// Arithmetic mean
    pub mean: f64,
    /// Sample standard deviation (n-1 divisor)
    pub std_dev: f64,
    /// Smallest sample
    pub min: f64,
    /// Largest sample
    pub max: f64,
}

impl StatSummary {
    /// Compute a summary over the given samples.
    pub fn new(samples: impl IntoIterator<Item = f64>) -> Self {
        let samples: Vec<f64> = samples.into_iter().collect();
        if samples.is_empty() {
            return Self {
                count: 0,
                mean: 0.0,
                std_dev: 0.0,
                min: 0.0,
                max: 0.0,
            };
        }

        let count = samples.len();
        let mean = samples.iter().sum::<f64>() / count as f64;

        let std_dev = if count < 2 {
            0.0
        } else {
            let variance =
                samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
            variance.sqrt()
        };

        let min = samples
            .iter()
            .cloned()
            .min_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
            .unwrap_or(0.0);
        let max = samples
            .iter()
            .cloned()
            .max_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
            .unwrap_or(0.0);

        Self {
            count,
            mean,
            std_dev,
            min,
            max,
        }
    }

    /// Coefficient of variation (relative stddev, in percent)
    pub fn coefficient_of_variation(&self) -> f64 {
        if self.mean == 0.0 {
            0.0
        } else {
            (self.std_dev / self.mean) * 100.0
        }
    }
}

/// Decide whether two summaries describe the same distribution.
///
/// Used by the convergence detector: a phase has converged once the summary
/// with the latest sample included is similar to the summary without it.
/// Both the mean delta and the standard-deviation delta are compared against
/// the larger mean as scale, so the predicate is unit-free. Identical
/// summaries are always similar (in particular, zero-variance sequences).
pub fn are_similar(a: &StatSummary, b: &StatSummary) -> bool {
    let scale = a.mean.abs().max(b.mean.abs());
    if scale == 0.0 {
        // Both distributions are all-zero
        return true;
    }
    (a.mean - b.mean).abs() / scale < MEAN_TOLERANCE
        && (a.std_dev - b.std_dev).abs() / scale < STD_DEV_TOLERANCE
}
