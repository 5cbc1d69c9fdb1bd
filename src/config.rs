//! Binning configuration
//!
//! [`GridConfig`] is the only input the engine needs besides the raster data
//! itself. It is validated once, before any source is touched.

use crate::errors::{Result, TileGridError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tessellation shape of the output grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridVariant {
    /// Axis-aligned `size × size` degree squares
    Square,
    /// Pointy-top hexagons addressed by axial coordinates
    Hex,
}

impl GridVariant {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Square => "square",
            Self::Hex => "hex",
        }
    }
}

impl fmt::Display for GridVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GridVariant {
    type Err = TileGridError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "square" => Ok(Self::Square),
            "hex" | "hexagon" | "hexagonal" => Ok(Self::Hex),
            _ => Err(TileGridError::UnknownVariant {
                value: s.to_string(),
            }),
        }
    }
}

/// How a time axis (axis 0 of a rank-3 variable) is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeAggregation {
    /// Keep only the slice at time index 0
    First,
    /// Per-point mean over time, ignoring missing values
    Mean,
    /// Bin every time slice, tagging samples with their time index
    All,
}

impl TimeAggregation {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::First => "first",
            Self::Mean => "mean",
            Self::All => "all",
        }
    }
}

impl fmt::Display for TimeAggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeAggregation {
    type Err = TileGridError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first" => Ok(Self::First),
            "mean" => Ok(Self::Mean),
            "all" => Ok(Self::All),
            _ => Err(TileGridError::UnknownTimeAggregation {
                value: s.to_string(),
            }),
        }
    }
}

/// How per-cell values are retained until the statistics pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccumulationMode {
    /// Keep every raw value (exact two-pass statistics)
    #[default]
    Raw,
    /// Keep running count/sum/sum-of-squares/min/max only
    Streaming,
}

/// Configuration for one binning invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    /// Cell edge length in degrees
    pub cell_size: f64,
    pub variant: GridVariant,
    /// Variables to bin; `None` selects every variable of rank >= 2
    pub variables: Option<Vec<String>>,
    pub time_aggregation: TimeAggregation,
    #[serde(default)]
    pub accumulation: AccumulationMode,
}

impl GridConfig {
    /// Create a configuration with default policies (`first`, raw accumulation,
    /// all variables)
    #[must_use]
    pub fn new(cell_size: f64, variant: GridVariant) -> Self {
        Self {
            cell_size,
            variant,
            variables: None,
            time_aggregation: TimeAggregation::First,
            accumulation: AccumulationMode::Raw,
        }
    }

    /// Restrict binning to the named variables. An empty list means "all".
    #[must_use]
    pub fn with_variables<I, S>(mut self, variables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = variables
            .into_iter()
            .map(Into::into)
            .filter(|name: &String| !name.trim().is_empty())
            .collect();
        self.variables = if names.is_empty() { None } else { Some(names) };
        self
    }

    #[must_use]
    pub const fn with_time_aggregation(mut self, policy: TimeAggregation) -> Self {
        self.time_aggregation = policy;
        self
    }

    #[must_use]
    pub const fn with_accumulation(mut self, mode: AccumulationMode) -> Self {
        self.accumulation = mode;
        self
    }

    /// The requested variable list, if any non-empty one was supplied
    #[must_use]
    pub fn requested_variables(&self) -> Option<&[String]> {
        match &self.variables {
            Some(names) if !names.is_empty() => Some(names.as_slice()),
            _ => None,
        }
    }

    /// Reject configurations that would produce degenerate cells
    ///
    /// # Errors
    ///
    /// Returns [`TileGridError::InvalidCellSize`] when the cell size is not a
    /// finite, strictly positive number.
    pub fn validate(&self) -> Result<()> {
        if !self.cell_size.is_finite() || self.cell_size <= 0.0 {
            return Err(TileGridError::InvalidCellSize {
                size: self.cell_size,
            });
        }
        Ok(())
    }
}
