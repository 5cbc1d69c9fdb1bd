//! Coordinate-to-cell mapping for square and hexagonal tessellations
//!
//! Both mappings are pure functions of `(lat, lon, size)`. Square cells use
//! floor semantics, so a point on a boundary belongs to the cell whose
//! lower-left corner sits on that boundary. Hex cells are addressed with
//! axial coordinates `(q, r)` obtained by cube rounding of the fractional
//! axial position.

use crate::config::GridVariant;
use crate::errors::{Result, TileGridError};
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// √3 rounded to the nearest `f64`, bit-identical to `3f64.sqrt()`
pub const SQRT_3: f64 = 1.732_050_807_568_877_2;

/// Identifier of one tessellation cell
///
/// `(x, y)` grid indices for square cells, `(q, r)` axial coordinates for
/// hexagons. Ordering is lexicographic on the two components, which is also
/// the order tiles are written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId(pub i64, pub i64);

impl CellId {
    #[must_use]
    pub const fn new(a: i64, b: i64) -> Self {
        Self(a, b)
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.0, self.1)
    }
}

impl FromStr for CellId {
    type Err = TileGridError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || TileGridError::InvalidCellId {
            value: s.to_string(),
        };
        let (a, b) = s.split_once(',').ok_or_else(invalid)?;
        let a = a.trim().parse::<i64>().map_err(|_| invalid())?;
        let b = b.trim().parse::<i64>().map_err(|_| invalid())?;
        Ok(Self(a, b))
    }
}

impl Serialize for CellId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CellId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct CellIdVisitor;

        impl<'de> Visitor<'de> for CellIdVisitor {
            type Value = CellId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a cell identifier of the form \"<int>,<int>\"")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<CellId, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_str(CellIdVisitor)
    }
}

/// Map a point to its cell, validating the cell size first
///
/// # Errors
///
/// Returns [`TileGridError::InvalidCellSize`] for a non-positive or
/// non-finite `size`.
pub fn map(lat: f64, lon: f64, size: f64, variant: GridVariant) -> Result<CellId> {
    Ok(CellMapper::new(size, variant)?.locate(lat, lon))
}

/// Square cell containing `(lat, lon)`; `size` must already be validated.
#[must_use]
pub fn square_cell(lat: f64, lon: f64, size: f64) -> CellId {
    let x = (lon / size).floor();
    let y = (lat / size).floor();
    #[allow(clippy::cast_possible_truncation)]
    CellId(x as i64, y as i64)
}

/// Fractional axial coordinates `(q, r)` of a point for hexagons of `size`
#[must_use]
pub fn fractional_axial(lat: f64, lon: f64, size: f64) -> (f64, f64) {
    let q = (lon * SQRT_3 / 3.0 - lat / 3.0) / size;
    let r = (2.0 * lat / 3.0) / size;
    (q, r)
}

/// Round a fractional axial position to the nearest hexagon
///
/// All three cube coordinates are rounded (half to even), then the one with
/// the largest rounding error is recomputed from the other two so that
/// `q + r + s == 0` holds exactly.
#[must_use]
pub fn hex_round(q: f64, r: f64) -> CellId {
    let s = -q - r;
    let mut rq = q.round_ties_even();
    let mut rr = r.round_ties_even();
    let rs = s.round_ties_even();

    let q_diff = (rq - q).abs();
    let r_diff = (rr - r).abs();
    let s_diff = (rs - s).abs();

    if q_diff > r_diff && q_diff > s_diff {
        rq = -rr - rs;
    } else if r_diff > s_diff {
        rr = -rq - rs;
    }

    #[allow(clippy::cast_possible_truncation)]
    CellId(rq as i64, rr as i64)
}

/// Hexagon containing `(lat, lon)`; `size` must already be validated.
#[must_use]
pub fn hex_cell(lat: f64, lon: f64, size: f64) -> CellId {
    let (q, r) = fractional_axial(lat, lon, size);
    hex_round(q, r)
}

/// A validated `(size, variant)` pair that maps points to cells
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellMapper {
    size: f64,
    variant: GridVariant,
}

impl CellMapper {
    /// # Errors
    ///
    /// Returns [`TileGridError::InvalidCellSize`] for a non-positive or
    /// non-finite `size`.
    pub fn new(size: f64, variant: GridVariant) -> Result<Self> {
        if !size.is_finite() || size <= 0.0 {
            return Err(TileGridError::InvalidCellSize { size });
        }
        Ok(Self { size, variant })
    }

    #[must_use]
    pub const fn size(&self) -> f64 {
        self.size
    }

    #[must_use]
    pub const fn variant(&self) -> GridVariant {
        self.variant
    }

    #[must_use]
    pub fn locate(&self, lat: f64, lon: f64) -> CellId {
        match self.variant {
            GridVariant::Square => square_cell(lat, lon, self.size),
            GridVariant::Hex => hex_cell(lat, lon, self.size),
        }
    }

    /// Geometric centre of a cell as `(lat, lon)`
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn center(&self, cell: CellId) -> (f64, f64) {
        let CellId(a, b) = cell;
        match self.variant {
            GridVariant::Square => ((b as f64 + 0.5) * self.size, (a as f64 + 0.5) * self.size),
            GridVariant::Hex => {
                let lat = b as f64 * self.size * 1.5;
                let lon = (a as f64 * self.size + lat / 3.0) * SQRT_3;
                (lat, lon)
            }
        }
    }
}
