//! End-to-end batch processing
//!
//! validate config → bin each source → merge → reduce → attach metadata.
//! A source that fails to load or bin is logged and skipped; the batch only
//! fails when no source succeeds. Configuration errors abort before any
//! source is looked at.

use crate::binning::{bin_source_with, SourceBins};
use crate::config::GridConfig;
use crate::errors::{Result, TileGridError};
use crate::mapping::CellMapper;
use crate::merge::UnifiedGrid;
use crate::output::{GridMetadata, TileGrid};
use crate::source::RasterSource;
use crate::statistics::reduce_grid;
use rayon::prelude::*;

/// A source as handed over by a loader: either read successfully or not
#[derive(Debug)]
pub struct PendingSource {
    pub name: String,
    pub loaded: Result<RasterSource>,
}

impl PendingSource {
    #[must_use]
    pub fn failed(name: impl Into<String>, error: TileGridError) -> Self {
        Self {
            name: name.into(),
            loaded: Err(error),
        }
    }
}

impl From<RasterSource> for PendingSource {
    fn from(source: RasterSource) -> Self {
        Self {
            name: source.name.clone(),
            loaded: Ok(source),
        }
    }
}

/// Bin one pending source, turning every failure into a logged skip
fn bin_pending(pending: &PendingSource, config: &GridConfig, mapper: &CellMapper) -> Option<SourceBins> {
    let outcome = pending
        .loaded
        .as_ref()
        .map_err(ToString::to_string)
        .and_then(|source| bin_source_with(source, config, mapper).map_err(|e| e.to_string()));

    match outcome {
        Ok(bins) if bins.variables.is_empty() => {
            tracing::warn!(source = %pending.name, "no requested variable found, skipping source");
            None
        }
        Ok(bins) => Some(bins),
        Err(message) => {
            tracing::warn!(source = %pending.name, error = %message, "skipping source");
            None
        }
    }
}

fn finish(config: &GridConfig, source_files: Vec<String>, grid: &UnifiedGrid) -> TileGrid {
    let tiles = reduce_grid(grid);
    tracing::info!(
        sources = grid.sources().len(),
        tiles = tiles.len(),
        "tile grid complete"
    );

    TileGrid {
        metadata: GridMetadata {
            tile_count: tiles.len(),
            cell_size: config.cell_size,
            grid_type: config.variant,
            time_aggregation: config.time_aggregation,
            variables: grid.variables(),
            source_files,
            history: None,
        },
        tiles,
    }
}

/// Process sources one after another
///
/// # Errors
///
/// Returns a configuration error before touching any source, or
/// [`TileGridError::NoSourcesProcessed`] if every source was skipped.
pub fn process_sources<I>(config: &GridConfig, sources: I) -> Result<TileGrid>
where
    I: IntoIterator<Item = PendingSource>,
{
    config.validate()?;
    let mapper = CellMapper::new(config.cell_size, config.variant)?;

    let mut grid = UnifiedGrid::new();
    let mut source_files = Vec::new();
    for pending in sources {
        if let Some(bins) = bin_pending(&pending, config, &mapper) {
            grid.fold(bins);
        }
        source_files.push(pending.name);
    }

    if grid.sources().is_empty() {
        return Err(TileGridError::NoSourcesProcessed {
            attempted: source_files.len(),
        });
    }

    Ok(finish(config, source_files, &grid))
}

/// Process sources on the rayon pool, one chunk of pool-size sources at a
/// time
///
/// # Errors
///
/// Same as [`process_sources`].
pub fn process_sources_parallel<I>(config: &GridConfig, sources: I) -> Result<TileGrid>
where
    I: IntoIterator<Item = PendingSource>,
{
    process_sources_chunked(config, sources, rayon::current_num_threads())
}

/// Process sources in chunks of `chunk_size`, binning each chunk in parallel
///
/// Sources are pulled from the iterator one chunk at a time, so at most
/// `chunk_size` loaded rasters are alive at once. Each task bins its own
/// source; the results are folded in source order by a single owner, so the
/// output equals that of [`process_sources`].
///
/// # Errors
///
/// Same as [`process_sources`].
pub fn process_sources_chunked<I>(
    config: &GridConfig,
    sources: I,
    chunk_size: usize,
) -> Result<TileGrid>
where
    I: IntoIterator<Item = PendingSource>,
{
    config.validate()?;
    let mapper = CellMapper::new(config.cell_size, config.variant)?;
    let chunk_size = chunk_size.max(1);

    tracing::info!(
        chunk_size,
        threads = rayon::current_num_threads(),
        "binning sources in parallel"
    );

    let mut sources = sources.into_iter();
    let mut grid = UnifiedGrid::new();
    let mut source_files = Vec::new();
    loop {
        let chunk: Vec<PendingSource> = sources.by_ref().take(chunk_size).collect();
        if chunk.is_empty() {
            break;
        }

        let binned: Vec<Option<SourceBins>> = chunk
            .par_iter()
            .map(|pending| bin_pending(pending, config, &mapper))
            .collect();
        for bins in binned.into_iter().flatten() {
            grid.fold(bins);
        }
        source_files.extend(chunk.into_iter().map(|p| p.name));
    }

    if grid.sources().is_empty() {
        return Err(TileGridError::NoSourcesProcessed {
            attempted: source_files.len(),
        });
    }

    Ok(finish(config, source_files, &grid))
}

/// Process in-memory sources that are already loaded
///
/// # Errors
///
/// Same as [`process_sources`].
pub fn process_rasters<I>(config: &GridConfig, sources: I) -> Result<TileGrid>
where
    I: IntoIterator<Item = RasterSource>,
{
    process_sources(config, sources.into_iter().map(PendingSource::from))
}
