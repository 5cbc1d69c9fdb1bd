//! Centralized error handling for tilegrid
//!
//! Errors fall into three groups: configuration errors that abort an
//! invocation before any binning starts, per-source errors that only skip
//! the offending source in a batch, and boundary errors raised by the
//! NetCDF adapter and the JSON writer.

use std::fmt;

/// Main error type for tilegrid operations
#[derive(Debug)]
pub enum TileGridError {
    /// Cell size was zero, negative or not finite
    InvalidCellSize { size: f64 },

    /// Unrecognised tessellation variant name
    UnknownVariant { value: String },

    /// Unrecognised time aggregation policy name
    UnknownTimeAggregation { value: String },

    /// No latitude/longitude axis could be resolved for a source
    CoordinatesNotFound {
        source: String,
        available: Vec<String>,
    },

    /// A variable's trailing axes do not match the coordinate axes
    ShapeMismatch {
        variable: String,
        expected: (usize, usize),
        found: Vec<usize>,
    },

    /// A variable was requested whose rank is neither 2 nor 3
    UnsupportedRank { variable: String, rank: usize },

    /// Every source in a batch failed
    NoSourcesProcessed { attempted: usize },

    /// A `"a,b"` cell identifier could not be parsed
    InvalidCellId { value: String },

    /// NetCDF file operation errors
    NetCDFError(netcdf::Error),

    /// I/O operation errors
    IoError(std::io::Error),

    /// Array shape or dimension error
    ArrayError(ndarray::ShapeError),

    /// JSON (de)serialization errors
    JsonError(serde_json::Error),

    /// Thread pool configuration error
    ThreadPoolError(String),

    /// Generic error for everything else
    Generic(String),
}

impl TileGridError {
    /// Whether this error belongs to the configuration group, which aborts
    /// the whole invocation instead of skipping one source.
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidCellSize { .. }
                | Self::UnknownVariant { .. }
                | Self::UnknownTimeAggregation { .. }
        )
    }
}

impl fmt::Display for TileGridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TileGridError::InvalidCellSize { size } => {
                write!(f, "Invalid cell size {}: must be a finite value > 0", size)
            }
            TileGridError::UnknownVariant { value } => {
                write!(f, "Unknown grid type '{}': expected 'hex' or 'square'", value)
            }
            TileGridError::UnknownTimeAggregation { value } => write!(
                f,
                "Unknown time aggregation '{}': expected 'first', 'mean' or 'all'",
                value
            ),
            TileGridError::CoordinatesNotFound { source, available } => write!(
                f,
                "Coordinates not found in '{}'. Available: [{}]",
                source,
                available.join(", ")
            ),
            TileGridError::ShapeMismatch {
                variable,
                expected,
                found,
            } => write!(
                f,
                "Variable '{}' has shape {:?}, expected trailing axes ({}, {})",
                variable, found, expected.0, expected.1
            ),
            TileGridError::UnsupportedRank { variable, rank } => write!(
                f,
                "Variable '{}' has {} dimensions, only 2 or 3 are supported",
                variable, rank
            ),
            TileGridError::NoSourcesProcessed { attempted } => write!(
                f,
                "No source could be processed successfully ({} attempted)",
                attempted
            ),
            TileGridError::InvalidCellId { value } => {
                write!(f, "Invalid cell identifier '{}': expected '<int>,<int>'", value)
            }
            TileGridError::NetCDFError(e) => write!(f, "NetCDF error: {}", e),
            TileGridError::IoError(e) => write!(f, "I/O error: {}", e),
            TileGridError::ArrayError(e) => write!(f, "Array error: {}", e),
            TileGridError::JsonError(e) => write!(f, "JSON error: {}", e),
            TileGridError::ThreadPoolError(msg) => write!(f, "Thread pool error: {}", msg),
            TileGridError::Generic(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for TileGridError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TileGridError::NetCDFError(e) => Some(e),
            TileGridError::IoError(e) => Some(e),
            TileGridError::ArrayError(e) => Some(e),
            TileGridError::JsonError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<netcdf::Error> for TileGridError {
    fn from(error: netcdf::Error) -> Self {
        TileGridError::NetCDFError(error)
    }
}

impl From<std::io::Error> for TileGridError {
    fn from(error: std::io::Error) -> Self {
        TileGridError::IoError(error)
    }
}

impl From<ndarray::ShapeError> for TileGridError {
    fn from(error: ndarray::ShapeError) -> Self {
        TileGridError::ArrayError(error)
    }
}

impl From<serde_json::Error> for TileGridError {
    fn from(error: serde_json::Error) -> Self {
        TileGridError::JsonError(error)
    }
}

impl From<String> for TileGridError {
    fn from(error: String) -> Self {
        TileGridError::Generic(error)
    }
}

impl From<&str> for TileGridError {
    fn from(error: &str) -> Self {
        TileGridError::Generic(error.to_string())
    }
}

/// Result type alias for tilegrid operations
pub type Result<T> = std::result::Result<T, TileGridError>;
