//! tilegrid: re-tessellating gridded rasters onto hexagonal or square tiles
//!
//! tilegrid takes regular latitude/longitude rasters (optionally with a time
//! axis), assigns every non-missing sample to the hexagon or square that
//! contains its coordinate, and reports per-cell statistics (mean, min, max,
//! population std, count) for each variable. The result is a compact
//! [`TileGrid`] that serializes to JSON for map rendering or world
//! generation.
//!
//! ## Pipeline
//!
//! 1. [`mapping`]: point → [`CellId`] for square and hex tessellations
//! 2. [`time_reduce`]: collapse or expand a time axis (`first`, `mean`, `all`)
//! 3. [`binning`]: walk one source and fill per-cell accumulators
//! 4. [`merge`]: fold the accumulators of many sources into one grid
//! 5. [`statistics`]: reduce merged cells to final tiles
//!
//! [`pipeline`] strings these together for a batch of sources, skipping
//! sources that fail. [`netcdf_io`] and [`metadata`] adapt NetCDF files to
//! the plain-array [`RasterSource`] the engine consumes.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use tilegrid::prelude::*;
//! use std::path::Path;
//!
//! let config = GridConfig::new(0.5, GridVariant::Hex)
//!     .with_time_aggregation(TimeAggregation::Mean);
//! let sources = tilegrid::netcdf_io::load_sources(&["era5_2023.nc", "era5_2024.nc"]);
//! let grid = tilegrid::pipeline::process_sources(&config, sources).unwrap();
//! grid.write_json(Path::new("map.json"), true).unwrap();
//! ```

pub mod accumulator;
pub mod binning;
pub mod config;
pub mod errors;
pub mod mapping;
pub mod merge;
pub mod metadata;
pub mod netcdf_io;
pub mod output;
pub mod parallel;
pub mod pipeline;
pub mod source;
pub mod statistics;
pub mod time_reduce;

pub use accumulator::{CellAccumulator, Sample, ValueBuffer};
pub use binning::{bin_source, extract_samples, SourceBins};
pub use config::{AccumulationMode, GridConfig, GridVariant, TimeAggregation};
pub use errors::{Result, TileGridError};
pub use mapping::{map, CellId, CellMapper};
pub use merge::{merge_sources, UnifiedGrid, UnifiedTile};
pub use output::{GridMetadata, Tile, TileGrid};
pub use pipeline::{
    process_rasters, process_sources, process_sources_chunked, process_sources_parallel, PendingSource,
};
pub use source::{RasterSource, SourceVariable};
pub use statistics::{reduce_grid, reduce_tile, RunningMoments, VariableStats};
pub use time_reduce::{reduce_time, TimeSlice};

pub mod prelude {
    //! Commonly used imports for convenience
    pub use crate::config::{AccumulationMode, GridConfig, GridVariant, TimeAggregation};
    pub use crate::errors::{Result, TileGridError};
    pub use crate::mapping::{CellId, CellMapper};
    pub use crate::output::{Tile, TileGrid};
    pub use crate::parallel::ParallelConfig;
    pub use crate::pipeline::PendingSource;
    pub use crate::source::RasterSource;
    pub use crate::statistics::VariableStats;
}
