//! Single-source binning
//!
//! Walks every selected variable of one [`RasterSource`], turns each
//! non-missing grid position into a [`Sample`], and routes it to the
//! [`CellAccumulator`] of the cell containing its coordinate. The result is
//! owned by the caller and shares no state with other sources, so sources
//! can be binned on separate threads.

use crate::accumulator::{CellAccumulator, Sample};
use crate::config::GridConfig;
use crate::errors::{Result, TileGridError};
use crate::mapping::{CellId, CellMapper};
use crate::source::{CoordinateAxes, RasterSource};
use crate::time_reduce::{reduce_time, TimeSlice};
use ndarray::Array2;
use std::collections::HashMap;

/// Cell accumulators produced by binning one source
#[derive(Debug, Clone, Default)]
pub struct SourceBins {
    /// Name of the source these bins came from
    pub source: String,
    /// Variables that were binned, in selection order
    pub variables: Vec<String>,
    pub cells: HashMap<CellId, CellAccumulator>,
}

impl SourceBins {
    #[must_use]
    pub fn cell(&self, id: CellId) -> Option<&CellAccumulator> {
        self.cells.get(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Visit every valid value of `slice` with its grid position
///
/// NaN and infinities are both missing: an infinite sample has no finite
/// mean or spread and could not be written to the JSON output.
fn for_each_valid<F>(axes: &CoordinateAxes<'_>, slice: &TimeSlice<'_>, mut visit: F)
where
    F: FnMut(usize, usize, Sample),
{
    for ((i, j), &value) in slice.data.indexed_iter() {
        if !value.is_finite() {
            continue;
        }
        visit(
            i,
            j,
            Sample {
                value,
                lat: axes.lats[i],
                lon: axes.lons[j],
                time: slice.time,
            },
        );
    }
}

/// All samples of the given slices, in traversal order
#[must_use]
pub fn extract_samples(axes: &CoordinateAxes<'_>, slices: &[TimeSlice<'_>]) -> Vec<Sample> {
    let mut samples = Vec::new();
    for slice in slices {
        for_each_valid(axes, slice, |_, _, sample| samples.push(sample));
    }
    samples
}

/// Bin one source according to `config`
///
/// # Errors
///
/// Fails on an invalid configuration, when no latitude/longitude axis can
/// be resolved, or when a variable is not aligned with those axes.
pub fn bin_source(source: &RasterSource, config: &GridConfig) -> Result<SourceBins> {
    config.validate()?;
    let mapper = CellMapper::new(config.cell_size, config.variant)?;
    bin_source_with(source, config, &mapper)
}

/// Bin one source with an already validated mapper
pub(crate) fn bin_source_with(
    source: &RasterSource,
    config: &GridConfig,
    mapper: &CellMapper,
) -> Result<SourceBins> {
    let axes = source.resolve_coordinates()?;
    let (rows, cols) = axes.grid_shape();
    tracing::info!(
        source = %source.name,
        lat = axes.lat_name,
        lon = axes.lon_name,
        rows,
        cols,
        "binning source"
    );

    // Cell of every grid point; points with non-finite coordinates get none.
    let cells = Array2::from_shape_fn((rows, cols), |(i, j)| {
        let (lat, lon) = (axes.lats[i], axes.lons[j]);
        (lat.is_finite() && lon.is_finite()).then(|| mapper.locate(lat, lon))
    });
    let mut covered = Array2::from_elem((rows, cols), false);

    let mut bins = SourceBins {
        source: source.name.clone(),
        ..SourceBins::default()
    };

    for var in source.select_variables(config.requested_variables()) {
        let slices = match reduce_time(&var.name, &var.data, config.time_aggregation) {
            Ok(slices) => slices,
            Err(TileGridError::UnsupportedRank { variable, rank }) => {
                tracing::warn!(
                    source = %source.name,
                    variable = %variable,
                    rank,
                    "skipping variable with unsupported rank"
                );
                continue;
            }
            Err(e) => return Err(e),
        };

        if let Some(slice) = slices.iter().find(|s| s.data.dim() != (rows, cols)) {
            return Err(TileGridError::ShapeMismatch {
                variable: var.name.clone(),
                expected: (rows, cols),
                found: slice.data.shape().to_vec(),
            });
        }

        let mut sampled = 0_usize;
        for slice in &slices {
            for_each_valid(&axes, slice, |i, j, sample| {
                if let Some(cell) = cells[[i, j]] {
                    bins.cells
                        .entry(cell)
                        .or_default()
                        .record(&var.name, sample.value, config.accumulation);
                    covered[[i, j]] = true;
                    sampled += 1;
                }
            });
        }

        tracing::debug!(
            source = %source.name,
            variable = %var.name,
            slices = slices.len(),
            samples = sampled,
            "binned variable"
        );
        bins.variables.push(var.name.clone());
    }

    for ((i, j), &hit) in covered.indexed_iter() {
        if !hit {
            continue;
        }
        if let Some(cell) = cells[[i, j]] {
            if let Some(acc) = bins.cells.get_mut(&cell) {
                acc.add_coordinate(axes.lats[i], axes.lons[j]);
            }
        }
    }

    tracing::info!(
        source = %source.name,
        variables = bins.variables.len(),
        cells = bins.cells.len(),
        "source binned"
    );

    Ok(bins)
}
