//! Descriptive statistics over per-cell value sets
//!
//! Two ways to summarise the same multiset: [`VariableStats::from_values`]
//! works on a retained value list with the two-pass variance, and
//! [`RunningMoments`] keeps only one-pass moments. All standard deviations
//! are population (divide by N).

use serde::{Deserialize, Serialize};

/// Final per-variable statistics of one tile
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VariableStats {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub std: f64,
    pub count: usize,
}

impl VariableStats {
    /// Two-pass statistics of `values`, or `None` for an empty slice
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|&x| (x - mean).powi(2)).sum::<f64>() / n;
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Some(Self {
            mean,
            min,
            max,
            std: variance.sqrt(),
            count: values.len(),
        })
    }

    /// Whether two summaries agree to within `tolerance` on every float field
    #[must_use]
    pub fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
        self.count == other.count
            && (self.mean - other.mean).abs() <= tolerance
            && (self.min - other.min).abs() <= tolerance
            && (self.max - other.max).abs() <= tolerance
            && (self.std - other.std).abs() <= tolerance
    }
}

/// Running moments of a value stream
///
/// Two instances combine by field-wise addition (min/max by comparison),
/// which makes merging order independent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunningMoments {
    pub count: usize,
    pub sum: f64,
    pub sum_sq: f64,
    pub min: f64,
    pub max: f64,
}

impl Default for RunningMoments {
    fn default() -> Self {
        Self {
            count: 0,
            sum: 0.0,
            sum_sq: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }
}

impl RunningMoments {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        self.sum_sq += value * value;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    pub fn merge(&mut self, other: &Self) {
        self.count += other.count;
        self.sum += other.sum;
        self.sum_sq += other.sum_sq;
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    /// One-pass statistics, or `None` if nothing was pushed
    ///
    /// The variance is clamped at zero: `sumSq/n - mean²` can come out
    /// slightly negative through cancellation on near-constant data.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn summarize(&self) -> Option<VariableStats> {
        if self.count == 0 {
            return None;
        }

        let n = self.count as f64;
        let mean = self.sum / n;
        let variance = (self.sum_sq / n - mean * mean).max(0.0);

        Some(VariableStats {
            mean,
            min: self.min,
            max: self.max,
            std: variance.sqrt(),
            count: self.count,
        })
    }
}

impl FromIterator<f64> for RunningMoments {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut moments = Self::new();
        for value in iter {
            moments.push(value);
        }
        moments
    }
}
