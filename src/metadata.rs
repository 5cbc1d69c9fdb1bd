//! NetCDF source inspection
//!
//! Summarises a file's dimensions, coordinate axes, variables and global
//! attributes, so a user can pick variables and check that a latitude and
//! longitude axis will be found before binning.

use crate::errors::Result;
use crate::netcdf_io::{is_coordinate_variable, source_name};
use crate::source::{LAT_NAMES, LON_NAMES};
use netcdf::{AttributeValue, File};
use serde::Serialize;
use serde_json::{json, Value as JsonValue};
use std::collections::BTreeMap;
use std::path::Path;

/// Structured description of one source file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceInfo {
    pub name: String,
    pub dimensions: BTreeMap<String, usize>,
    pub coordinates: Vec<String>,
    pub variables: Vec<String>,
    pub attributes: BTreeMap<String, JsonValue>,
}

impl SourceInfo {
    /// Latitude and longitude axis names that binning would pick
    #[must_use]
    pub fn resolved_axes(&self) -> (Option<&str>, Option<&str>) {
        let pick = |candidates: &[&'static str]| {
            candidates
                .iter()
                .copied()
                .find(|name| self.coordinates.iter().any(|c| c == name))
        };
        (pick(&LAT_NAMES), pick(&LON_NAMES))
    }

    /// Print the description in a readable layout
    pub fn print(&self) {
        println!("\n===== {} =====", self.name);

        println!("\n Dimensions");
        if self.dimensions.is_empty() {
            println!("   (No dimensions found)");
        }
        for (name, len) in &self.dimensions {
            println!("    {} = {}", name, len);
        }

        println!("\n Coordinates: [{}]", self.coordinates.join(", "));
        match self.resolved_axes() {
            (Some(lat), Some(lon)) => println!("   ✅ lat/lon axes: {}, {}", lat, lon),
            _ => println!("   ⚠ No recognised lat/lon axes"),
        }

        println!("\n Variables: [{}]", self.variables.join(", "));

        if !self.attributes.is_empty() {
            println!("\n Global Attributes");
            for (name, value) in &self.attributes {
                println!("   • {}: {}", name, value);
            }
        }
    }
}

/// Convert a NetCDF attribute value to JSON
#[must_use]
pub fn attribute_to_json(value: AttributeValue) -> JsonValue {
    match value {
        AttributeValue::Str(s) => json!(s),
        AttributeValue::Strs(ss) => json!(ss),
        AttributeValue::Double(d) => json!(d),
        AttributeValue::Doubles(ds) => json!(ds),
        AttributeValue::Float(f) => json!(f),
        AttributeValue::Floats(fs) => json!(fs),
        AttributeValue::Int(i) => json!(i),
        AttributeValue::Ints(is) => json!(is),
        AttributeValue::Short(s) => json!(s),
        AttributeValue::Shorts(ss) => json!(ss),
        AttributeValue::Uchar(u) => json!(u),
        AttributeValue::Uchars(us) => json!(us),
        AttributeValue::Longlong(l) => json!(l),
        AttributeValue::Longlongs(ls) => json!(ls),
        other => json!(format!("{:?}", other)),
    }
}

/// Describe an open NetCDF file
///
/// # Errors
///
/// Returns an error if a global attribute cannot be read.
pub fn describe_file(file: &File, name: &str) -> Result<SourceInfo> {
    let dimensions = file
        .dimensions()
        .map(|d| (d.name(), d.len()))
        .collect();

    let mut coordinates = Vec::new();
    let mut variables = Vec::new();
    for var in file.variables() {
        if is_coordinate_variable(&var) {
            coordinates.push(var.name());
        } else {
            variables.push(var.name());
        }
    }

    let mut attributes = BTreeMap::new();
    for attr in file.attributes() {
        attributes.insert(attr.name().to_string(), attribute_to_json(attr.value()?));
    }

    Ok(SourceInfo {
        name: name.to_string(),
        dimensions,
        coordinates,
        variables,
        attributes,
    })
}

/// Open and describe a NetCDF file
///
/// # Errors
///
/// Returns an error if the file cannot be opened or inspected.
pub fn describe_source(path: &Path) -> Result<SourceInfo> {
    let file = netcdf::open(path)?;
    describe_file(&file, &source_name(path))
}
