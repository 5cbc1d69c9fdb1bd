//! Cross-source merging
//!
//! Folds the [`SourceBins`] of many sources into one [`UnifiedGrid`]. Value
//! lists are concatenated in source order and coordinate sums are added, so
//! the final statistics do not depend on how sources were partitioned or
//! ordered.

use crate::accumulator::CellAccumulator;
use crate::binning::SourceBins;
use crate::mapping::CellId;
use std::collections::{BTreeSet, HashMap};

/// A merged cell before statistics are computed
pub type UnifiedTile = CellAccumulator;

/// Every cell touched by any folded source
#[derive(Debug, Clone, Default)]
pub struct UnifiedGrid {
    tiles: HashMap<CellId, UnifiedTile>,
    variables: BTreeSet<String>,
    sources: Vec<String>,
}

impl UnifiedGrid {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one source's bins in after everything folded so far
    pub fn fold(&mut self, bins: SourceBins) {
        tracing::debug!(source = %bins.source, cells = bins.cells.len(), "merging source");
        self.variables.extend(bins.variables);
        self.sources.push(bins.source);
        for (cell, acc) in bins.cells {
            match self.tiles.get_mut(&cell) {
                Some(tile) => tile.merge(acc),
                None => {
                    self.tiles.insert(cell, acc);
                }
            }
        }
    }

    /// Append another unified grid after this one
    pub fn combine(&mut self, other: Self) {
        self.variables.extend(other.variables);
        self.sources.extend(other.sources);
        for (cell, tile) in other.tiles {
            match self.tiles.get_mut(&cell) {
                Some(existing) => existing.merge(tile),
                None => {
                    self.tiles.insert(cell, tile);
                }
            }
        }
    }

    #[must_use]
    pub fn tile(&self, cell: CellId) -> Option<&UnifiedTile> {
        self.tiles.get(&cell)
    }

    pub fn tiles(&self) -> impl Iterator<Item = (&CellId, &UnifiedTile)> {
        self.tiles.iter()
    }

    /// Union of the variables binned by the folded sources, sorted
    #[must_use]
    pub fn variables(&self) -> Vec<String> {
        self.variables.iter().cloned().collect()
    }

    /// Names of the folded sources in fold order
    #[must_use]
    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

/// Merge per-source bins in iteration order
#[must_use]
pub fn merge_sources<I>(sources: I) -> UnifiedGrid
where
    I: IntoIterator<Item = SourceBins>,
{
    let mut grid = UnifiedGrid::new();
    for bins in sources {
        grid.fold(bins);
    }
    grid
}
