//! Serializable tile grid
//!
//! The JSON layout is
//! `{ "metadata": {...}, "tiles": { "<a>,<b>": { "count", "lat", "lon", "<var>": {...} } } }`
//! with tiles in ascending cell order.

use crate::config::{GridVariant, TimeAggregation};
use crate::errors::Result;
use crate::mapping::CellId;
use crate::statistics::VariableStats;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Final statistics of one cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    /// Coordinate contributions across all sources
    pub count: usize,
    /// Centroid latitude
    pub lat: f64,
    /// Centroid longitude
    pub lon: f64,
    #[serde(flatten)]
    pub variables: BTreeMap<String, VariableStats>,
}

impl Tile {
    #[must_use]
    pub fn variable(&self, name: &str) -> Option<&VariableStats> {
        self.variables.get(name)
    }
}

/// Description of how a grid was produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridMetadata {
    pub tile_count: usize,
    pub cell_size: f64,
    pub grid_type: GridVariant,
    pub time_aggregation: TimeAggregation,
    pub variables: Vec<String>,
    pub source_files: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<String>,
}

/// Output of a binning run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileGrid {
    pub metadata: GridMetadata,
    pub tiles: BTreeMap<CellId, Tile>,
}

impl TileGrid {
    #[must_use]
    pub fn tile(&self, cell: CellId) -> Option<&Tile> {
        self.tiles.get(&cell)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }

    /// # Errors
    ///
    /// Returns an error if the document is not a valid tile grid.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Write the grid as JSON, replacing any existing file
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn write_json(&self, path: &Path, pretty: bool) -> Result<()> {
        let json = self.to_json(pretty)?;
        fs::write(path, json)?;
        tracing::info!(path = %path.display(), tiles = self.tiles.len(), "wrote tile grid");
        Ok(())
    }
}
