//! Plain-data raster sources
//!
//! A [`RasterSource`] is what the binning engine consumes: named
//! one-dimensional coordinate axes plus named N-dimensional variables, with
//! NaN as the only missing-value marker. Reading a file into this shape is
//! the job of an adapter such as [`crate::netcdf_io`].

use crate::errors::{Result, TileGridError};
use ndarray::ArrayD;

/// Latitude axis names, in priority order
pub const LAT_NAMES: [&str; 3] = ["lat", "latitude", "y"];

/// Longitude axis names, in priority order
pub const LON_NAMES: [&str; 3] = ["lon", "longitude", "x"];

/// One named variable of a source
#[derive(Debug, Clone, PartialEq)]
pub struct SourceVariable {
    pub name: String,
    pub data: ArrayD<f64>,
}

impl SourceVariable {
    #[must_use]
    pub fn ndim(&self) -> usize {
        self.data.ndim()
    }
}

/// One gridded source with its coordinate axes and variables
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RasterSource {
    /// Display name, usually the file name
    pub name: String,
    coordinates: Vec<(String, Vec<f64>)>,
    variables: Vec<SourceVariable>,
}

/// Resolved latitude/longitude axes of a source
#[derive(Debug, Clone, Copy)]
pub struct CoordinateAxes<'a> {
    pub lat_name: &'a str,
    pub lon_name: &'a str,
    pub lats: &'a [f64],
    pub lons: &'a [f64],
}

impl CoordinateAxes<'_> {
    /// Expected `(rows, cols)` of every 2-D slice
    #[must_use]
    pub fn grid_shape(&self) -> (usize, usize) {
        (self.lats.len(), self.lons.len())
    }
}

impl RasterSource {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Add or replace a one-dimensional coordinate axis
    #[must_use]
    pub fn with_coordinate(mut self, name: impl Into<String>, values: Vec<f64>) -> Self {
        self.insert_coordinate(name, values);
        self
    }

    /// Add or replace a variable
    #[must_use]
    pub fn with_variable(mut self, name: impl Into<String>, data: ArrayD<f64>) -> Self {
        self.insert_variable(name, data);
        self
    }

    pub fn insert_coordinate(&mut self, name: impl Into<String>, values: Vec<f64>) {
        let name = name.into();
        match self.coordinates.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = values,
            None => self.coordinates.push((name, values)),
        }
    }

    pub fn insert_variable(&mut self, name: impl Into<String>, data: ArrayD<f64>) {
        let name = name.into();
        match self.variables.iter_mut().find(|v| v.name == name) {
            Some(var) => var.data = data,
            None => self.variables.push(SourceVariable { name, data }),
        }
    }

    #[must_use]
    pub fn coordinate(&self, name: &str) -> Option<&[f64]> {
        self.coordinates
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, values)| values.as_slice())
    }

    #[must_use]
    pub fn coordinate_names(&self) -> Vec<String> {
        self.coordinates.iter().map(|(n, _)| n.clone()).collect()
    }

    #[must_use]
    pub fn variable(&self, name: &str) -> Option<&SourceVariable> {
        self.variables.iter().find(|v| v.name == name)
    }

    /// Variables in insertion order
    pub fn variables(&self) -> impl Iterator<Item = &SourceVariable> {
        self.variables.iter()
    }

    /// Find the latitude and longitude axes, first matching name wins
    ///
    /// # Errors
    ///
    /// Returns [`TileGridError::CoordinatesNotFound`] if either axis has no
    /// recognised name.
    pub fn resolve_coordinates(&self) -> Result<CoordinateAxes<'_>> {
        let find = |candidates: &[&'static str]| {
            candidates
                .iter()
                .find_map(|&name| self.coordinate(name).map(|values| (name, values)))
        };

        match (find(&LAT_NAMES), find(&LON_NAMES)) {
            (Some((lat_name, lats)), Some((lon_name, lons))) => Ok(CoordinateAxes {
                lat_name,
                lon_name,
                lats,
                lons,
            }),
            _ => Err(TileGridError::CoordinatesNotFound {
                source: self.name.clone(),
                available: self.coordinate_names(),
            }),
        }
    }

    /// Variables to bin for a request
    ///
    /// With no request, every variable of rank >= 2 is selected. With a
    /// request, names absent from this source are dropped silently.
    #[must_use]
    pub fn select_variables(&self, requested: Option<&[String]>) -> Vec<&SourceVariable> {
        match requested {
            Some(names) => {
                let mut selected: Vec<&SourceVariable> = Vec::with_capacity(names.len());
                for var in names.iter().filter_map(|n| self.variable(n)) {
                    if !selected.iter().any(|s| s.name == var.name) {
                        selected.push(var);
                    }
                }
                selected
            }
            None => self.variables.iter().filter(|v| v.ndim() >= 2).collect(),
        }
    }
}
