//! Per-cell accumulation of raw samples
//!
//! A [`CellAccumulator`] is created the first time a valid sample lands in a
//! cell and is owned by the binning pass of a single source. After the merge
//! the same structure serves as the unified tile, with value buffers and
//! coordinate sums folded in from every source.

use crate::config::AccumulationMode;
use crate::statistics::{RunningMoments, VariableStats};
use std::collections::BTreeMap;

/// One non-missing value extracted from a source grid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub value: f64,
    pub lat: f64,
    pub lon: f64,
    /// Time index, set only when every time slice is binned
    pub time: Option<usize>,
}

/// Values collected for one variable in one cell
#[derive(Debug, Clone, PartialEq)]
pub enum ValueBuffer {
    /// Every value in insertion order
    Raw(Vec<f64>),
    /// Running moments only
    Moments(RunningMoments),
}

impl ValueBuffer {
    #[must_use]
    pub fn new(mode: AccumulationMode) -> Self {
        match mode {
            AccumulationMode::Raw => Self::Raw(Vec::new()),
            AccumulationMode::Streaming => Self::Moments(RunningMoments::new()),
        }
    }

    pub fn push(&mut self, value: f64) {
        match self {
            Self::Raw(values) => values.push(value),
            Self::Moments(moments) => moments.push(value),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Raw(values) => values.len(),
            Self::Moments(moments) => moments.count,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Retained raw values, if this buffer keeps them
    #[must_use]
    pub fn values(&self) -> Option<&[f64]> {
        match self {
            Self::Raw(values) => Some(values),
            Self::Moments(_) => None,
        }
    }

    /// Append `other` after the values already held
    ///
    /// Raw lists concatenate. If either side only has moments the result
    /// degrades to moments.
    pub fn absorb(&mut self, other: Self) {
        match (&mut *self, other) {
            (Self::Raw(values), Self::Raw(mut more)) => values.append(&mut more),
            (Self::Moments(moments), Self::Moments(more)) => moments.merge(&more),
            (Self::Moments(moments), Self::Raw(more)) => {
                for value in more {
                    moments.push(value);
                }
            }
            (Self::Raw(values), Self::Moments(more)) => {
                let mut moments: RunningMoments = values.iter().copied().collect();
                moments.merge(&more);
                *self = Self::Moments(moments);
            }
        }
    }

    #[must_use]
    pub fn summarize(&self) -> Option<VariableStats> {
        match self {
            Self::Raw(values) => VariableStats::from_values(values),
            Self::Moments(moments) => moments.summarize(),
        }
    }
}

/// Transient state of one cell
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellAccumulator {
    /// Number of coordinate contributions (grid points with a valid value)
    pub count: usize,
    pub lat_sum: f64,
    pub lon_sum: f64,
    /// Value buffers keyed by variable name
    pub values: BTreeMap<String, ValueBuffer>,
}

impl CellAccumulator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one value for `variable`, creating its buffer on first use
    pub fn record(&mut self, variable: &str, value: f64, mode: AccumulationMode) {
        match self.values.get_mut(variable) {
            Some(buffer) => buffer.push(value),
            None => {
                let mut buffer = ValueBuffer::new(mode);
                buffer.push(value);
                self.values.insert(variable.to_string(), buffer);
            }
        }
    }

    /// Count one grid point towards the centroid
    pub fn add_coordinate(&mut self, lat: f64, lon: f64) {
        self.count += 1;
        self.lat_sum += lat;
        self.lon_sum += lon;
    }

    /// Fold `other` into this accumulator; `other`'s values go after ours
    pub fn merge(&mut self, other: Self) {
        self.count += other.count;
        self.lat_sum += other.lat_sum;
        self.lon_sum += other.lon_sum;
        for (name, buffer) in other.values {
            match self.values.get_mut(&name) {
                Some(existing) => existing.absorb(buffer),
                None => {
                    self.values.insert(name, buffer);
                }
            }
        }
    }

    /// Number of values held for `variable`
    #[must_use]
    pub fn variable_count(&self, variable: &str) -> usize {
        self.values.get(variable).map_or(0, ValueBuffer::len)
    }

    /// Mean `(lat, lon)` of the coordinate contributions
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn centroid(&self) -> Option<(f64, f64)> {
        if self.count == 0 {
            return None;
        }
        let n = self.count as f64;
        Some((self.lat_sum / n, self.lon_sum / n))
    }
}
