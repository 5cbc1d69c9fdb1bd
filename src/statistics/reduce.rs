//! Reduction of unified tiles to final tile statistics

use crate::mapping::CellId;
use crate::merge::{UnifiedGrid, UnifiedTile};
use crate::output::Tile;
use std::collections::BTreeMap;

/// Final statistics of one unified tile, or `None` when it holds no samples
///
/// The centroid divides by the coordinate count; each variable reports its
/// own value count. Variables with no values are left out.
#[must_use]
pub fn reduce_tile(tile: &UnifiedTile) -> Option<Tile> {
    let (lat, lon) = tile.centroid()?;

    let variables: BTreeMap<_, _> = tile
        .values
        .iter()
        .filter_map(|(name, buffer)| buffer.summarize().map(|stats| (name.clone(), stats)))
        .collect();

    Some(Tile {
        count: tile.count,
        lat,
        lon,
        variables,
    })
}

/// Final tiles of a unified grid in cell order, empty cells dropped
#[must_use]
pub fn reduce_grid(grid: &UnifiedGrid) -> BTreeMap<CellId, Tile> {
    let tiles: BTreeMap<CellId, Tile> = grid
        .tiles()
        .filter_map(|(cell, tile)| reduce_tile(tile).map(|t| (*cell, t)))
        .collect();

    let dropped = grid.len() - tiles.len();
    if dropped > 0 {
        tracing::debug!(dropped, "dropped cells without samples");
    }
    tiles
}
