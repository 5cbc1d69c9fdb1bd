//! NetCDF input adapter
//!
//! Reads a NetCDF file into a [`RasterSource`]: one-dimensional coordinate
//! variables become coordinate axes, everything else becomes a variable.
//! Values equal to `_FillValue` or `missing_value` are turned into NaN and
//! `scale_factor` / `add_offset` are applied, so the engine only ever sees
//! NaN as the missing marker.

use crate::errors::Result;
use crate::pipeline::PendingSource;
use crate::source::RasterSource;
use ndarray::{ArrayD, IxDyn};
use netcdf::{AttributeValue, File, Variable};
use std::path::{Path, PathBuf};

/// Numeric value of a scalar attribute, if it has one
pub(crate) fn attribute_f64(var: &Variable, name: &str) -> Option<f64> {
    match var.attribute(name)?.value().ok()? {
        AttributeValue::Double(v) => Some(v),
        AttributeValue::Float(v) => Some(f64::from(v)),
        AttributeValue::Int(v) => Some(f64::from(v)),
        AttributeValue::Short(v) => Some(f64::from(v)),
        AttributeValue::Schar(v) => Some(f64::from(v)),
        AttributeValue::Uchar(v) => Some(f64::from(v)),
        AttributeValue::Ushort(v) => Some(f64::from(v)),
        AttributeValue::Uint(v) => Some(f64::from(v)),
        #[allow(clippy::cast_precision_loss)]
        AttributeValue::Longlong(v) => Some(v as f64),
        #[allow(clippy::cast_precision_loss)]
        AttributeValue::Ulonglong(v) => Some(v as f64),
        AttributeValue::Doubles(vs) => vs.first().copied(),
        AttributeValue::Floats(vs) => vs.first().map(|&v| f64::from(v)),
        _ => None,
    }
}

/// Missing-value masking and linear unpacking for one variable
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ValueDecoding {
    pub fill_value: Option<f64>,
    pub missing_value: Option<f64>,
    pub scale_factor: Option<f64>,
    pub add_offset: Option<f64>,
}

impl ValueDecoding {
    #[must_use]
    pub fn from_variable(var: &Variable) -> Self {
        Self {
            fill_value: attribute_f64(var, "_FillValue"),
            missing_value: attribute_f64(var, "missing_value"),
            scale_factor: attribute_f64(var, "scale_factor"),
            add_offset: attribute_f64(var, "add_offset"),
        }
    }

    /// Decode raw stored values in place
    pub fn apply(&self, values: &mut [f64]) {
        let scale = self.scale_factor.unwrap_or(1.0);
        let offset = self.add_offset.unwrap_or(0.0);
        for v in values.iter_mut() {
            if Some(*v) == self.fill_value || Some(*v) == self.missing_value {
                *v = f64::NAN;
            } else {
                *v = *v * scale + offset;
            }
        }
    }
}

/// Whether `var` is a coordinate variable (1-D, named after its dimension)
pub(crate) fn is_coordinate_variable(var: &Variable) -> bool {
    let dims = var.dimensions();
    dims.len() == 1 && dims[0].name() == var.name()
}

/// Base name of a path, falling back to the full display form
#[must_use]
pub fn source_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .map_or_else(|| path.display().to_string(), ToString::to_string)
}

/// Convert an open NetCDF file into a raster source
///
/// Variables that cannot be read as numbers are skipped with a warning.
///
/// # Errors
///
/// Returns an error if a numeric variable's values do not fit its shape.
pub fn raster_from_file(file: &File, name: &str) -> Result<RasterSource> {
    let mut source = RasterSource::new(name);

    for var in file.variables() {
        let var_name = var.name();
        let shape: Vec<usize> = var.dimensions().iter().map(netcdf::Dimension::len).collect();

        let mut values = match var.get_values::<f64, _>(..) {
            Ok(values) => values,
            Err(e) => {
                tracing::warn!(source = name, variable = %var_name, error = %e, "skipping unreadable variable");
                continue;
            }
        };
        ValueDecoding::from_variable(&var).apply(&mut values);

        if is_coordinate_variable(&var) {
            source.insert_coordinate(var_name, values);
        } else {
            let data = ArrayD::from_shape_vec(IxDyn(&shape), values)?;
            tracing::debug!(source = name, variable = %var_name, shape = ?shape, "loaded variable");
            source.insert_variable(var_name, data);
        }
    }

    Ok(source)
}

/// Read a NetCDF file into a raster source
///
/// # Errors
///
/// Returns an error if the file cannot be opened or decoded.
pub fn read_raster_source(path: &Path) -> Result<RasterSource> {
    let name = source_name(path);
    tracing::info!(path = %path.display(), "reading NetCDF source");
    let file = netcdf::open(path)?;
    raster_from_file(&file, &name)
}

/// Read each path on demand, keeping failures as skipped entries for the
/// pipeline
///
/// Nothing is opened until the iterator is advanced, so a sequential batch
/// only ever holds one raster in memory.
pub fn load_sources<P: AsRef<Path>>(paths: &[P]) -> impl Iterator<Item = PendingSource> + '_ {
    paths.iter().map(|path| {
        let path = path.as_ref();
        PendingSource {
            name: source_name(path),
            loaded: read_raster_source(path),
        }
    })
}

/// Expand one input argument into source paths
///
/// An argument containing a comma is a list of paths. Anything else is a
/// glob pattern; a pattern that matches nothing (or is not a valid pattern)
/// is kept as a literal path so the read failure gets reported.
#[must_use]
pub fn expand_input(arg: &str) -> Vec<PathBuf> {
    if arg.contains(',') {
        return arg
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .collect();
    }

    let arg = arg.trim();
    if arg.is_empty() {
        return Vec::new();
    }

    let mut matches: Vec<PathBuf> = match glob::glob(arg) {
        Ok(paths) => paths.filter_map(std::result::Result::ok).collect(),
        Err(e) => {
            tracing::debug!(pattern = arg, error = %e, "not a glob pattern");
            Vec::new()
        }
    };
    if matches.is_empty() {
        return vec![PathBuf::from(arg)];
    }
    matches.sort();
    tracing::debug!(pattern = arg, files = matches.len(), "expanded input pattern");
    matches
}
