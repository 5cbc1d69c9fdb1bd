use ndarray::{Array1, Array2, Array3};
use netcdf::create;
use std::path::{Path, PathBuf};
use tempfile::tempdir;
use tilegrid::{
    errors::Result,
    metadata::describe_source,
    netcdf_io::{expand_input, load_sources, read_raster_source, source_name},
    pipeline::{process_sources, process_sources_parallel},
    CellId, GridConfig, GridVariant, TimeAggregation,
};

/// Two time steps over a 2 × 3 lat/lon grid with a packed, partly masked
/// temperature field and an unpacked humidity field.
fn write_sample_file(path: &Path, lat0: f32) -> Result<()> {
    let mut file = create(path)?;
    file.add_attribute("title", "tilegrid test data")?;

    file.add_dimension("time", 2)?;
    file.add_dimension("latitude", 2)?;
    file.add_dimension("longitude", 3)?;

    {
        let mut var = file.add_variable::<f64>("time", &["time"])?;
        var.put(Array1::from(vec![0.0, 1.0]).view(), ..)?;
    }
    {
        let mut var = file.add_variable::<f32>("latitude", &["latitude"])?;
        var.put(Array1::from(vec![lat0, lat0 + 0.5]).view(), ..)?;
    }
    {
        let mut var = file.add_variable::<f32>("longitude", &["longitude"])?;
        var.put(Array1::from(vec![0.25_f32, 0.75, 1.25]).view(), ..)?;
    }
    {
        // stored = (value - 100) / 0.5, fill marks the last column at t=0
        let stored = Array3::from_shape_vec(
            (2, 2, 3),
            vec![
                2.0_f32, 4.0, -999.0, //
                6.0, 8.0, -999.0, //
                10.0, 12.0, 14.0, //
                16.0, 18.0, 20.0,
            ],
        )?;
        let mut var = file.add_variable::<f32>("t2m", &["time", "latitude", "longitude"])?;
        var.put_attribute("_FillValue", -999.0_f32)?;
        var.put_attribute("scale_factor", 0.5_f32)?;
        var.put_attribute("add_offset", 100.0_f32)?;
        var.put(stored.view(), ..)?;
    }
    {
        let humidity = Array2::from_shape_vec((2, 3), vec![0.5_f64, 0.6, 0.7, 0.8, 1e20, 0.9])?;
        let mut var = file.add_variable::<f64>("rh", &["latitude", "longitude"])?;
        var.put_attribute("missing_value", 1e20_f64)?;
        var.put(humidity.view(), ..)?;
    }
    Ok(())
}

#[test]
fn test_read_raster_source_decodes_values() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("sample.nc");
    write_sample_file(&path, 0.25)?;

    let source = read_raster_source(&path)?;
    assert_eq!(source.name, "sample.nc");

    let mut coords = source.coordinate_names();
    coords.sort();
    assert_eq!(coords, vec!["latitude", "longitude", "time"]);
    assert_eq!(source.coordinate("latitude"), Some(&[0.25, 0.75][..]));

    let t2m = source.variable("t2m").expect("t2m loaded");
    assert_eq!(t2m.data.shape(), &[2, 2, 3]);
    assert_eq!(t2m.data[[0, 0, 0]], 101.0);
    assert_eq!(t2m.data[[1, 1, 2]], 110.0);
    assert!(t2m.data[[0, 0, 2]].is_nan());
    assert!(t2m.data[[0, 1, 2]].is_nan());

    let rh = source.variable("rh").expect("rh loaded");
    assert!(rh.data[[1, 1]].is_nan());
    assert!((rh.data[[0, 1]] - 0.6).abs() < 1e-12);
    Ok(())
}

#[test]
fn test_describe_source() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("describe.nc");
    write_sample_file(&path, 10.0)?;

    let info = describe_source(&path)?;
    assert_eq!(info.name, "describe.nc");
    assert_eq!(info.dimensions.get("longitude"), Some(&3));
    assert_eq!(info.dimensions.get("time"), Some(&2));
    assert!(info.variables.contains(&"t2m".to_string()));
    assert!(info.variables.contains(&"rh".to_string()));
    assert!(!info.variables.contains(&"latitude".to_string()));
    assert_eq!(info.resolved_axes(), (Some("latitude"), Some("longitude")));
    assert_eq!(info.attributes["title"], "tilegrid test data");
    Ok(())
}

#[test]
fn test_missing_file_is_reported() {
    assert!(read_raster_source(Path::new("/nonexistent/nothing.nc")).is_err());
    assert!(describe_source(Path::new("/nonexistent/nothing.nc")).is_err());
    assert_eq!(source_name(Path::new("/data/run/a.nc")), "a.nc");
}

#[test]
fn test_pipeline_on_files() -> Result<()> {
    let dir = tempdir()?;
    let first = dir.path().join("first.nc");
    let second = dir.path().join("second.nc");
    write_sample_file(&first, 0.25)?;
    write_sample_file(&second, 0.35)?;
    let missing = dir.path().join("missing.nc");

    let paths = vec![first, missing, second];
    let config = GridConfig::new(1.0, GridVariant::Square)
        .with_variables(["t2m"])
        .with_time_aggregation(TimeAggregation::Mean);

    let grid = process_sources(&config, load_sources(&paths))?;
    assert_eq!(
        grid.metadata.source_files,
        vec!["first.nc", "missing.nc", "second.nc"]
    );
    assert_eq!(grid.metadata.variables, vec!["t2m"]);

    // Per-point means of decoded t2m: [103, 104, 107], [105.5, 106.5, 110]
    // (the masked t=0 entries fall back to the t=1 value).
    let origin = grid.tile(CellId(0, 0)).expect("origin cell");
    let stats = origin.variable("t2m").expect("t2m stats");
    assert_eq!(stats.count, 8);
    assert_eq!(origin.count, 8);
    assert!((stats.mean - 104.75).abs() < 1e-9);

    let east = grid.tile(CellId(1, 0)).expect("east cell");
    assert_eq!(east.variable("t2m").map(|s| s.count), Some(4));
    assert_eq!(east.variable("t2m").map(|s| s.max), Some(110.0));

    let parallel = process_sources_parallel(&config, load_sources(&paths))?;
    assert_eq!(parallel.metadata, grid.metadata);
    assert_eq!(parallel.tiles.len(), grid.tiles.len());
    Ok(())
}

#[test]
fn test_hex_pipeline_on_file() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("hex.nc");
    write_sample_file(&path, -0.25)?;

    let config = GridConfig::new(0.5, GridVariant::Hex).with_time_aggregation(TimeAggregation::All);
    let grid = process_sources(&config, load_sources(&[&path]))?;

    assert_eq!(grid.metadata.grid_type, GridVariant::Hex);
    assert_eq!(grid.metadata.variables, vec!["rh", "t2m"]);
    let t2m_total: usize = grid
        .tiles
        .values()
        .filter_map(|t| t.variable("t2m"))
        .map(|s| s.count)
        .sum();
    // 12 stored entries minus 2 fill values
    assert_eq!(t2m_total, 10);
    let rh_total: usize = grid
        .tiles
        .values()
        .filter_map(|t| t.variable("rh"))
        .map(|s| s.count)
        .sum();
    assert_eq!(rh_total, 5);
    let points: usize = grid.tiles.values().map(|t| t.count).sum();
    assert_eq!(points, 6);
    Ok(())
}

#[test]
fn test_load_sources_reads_on_demand() -> Result<()> {
    let dir = tempdir()?;
    let first = dir.path().join("early.nc");
    let second = dir.path().join("late.nc");
    write_sample_file(&first, 0.25)?;

    let paths = vec![first, second.clone()];
    let mut sources = load_sources(&paths);
    let early = sources.next().expect("first source");
    assert!(early.loaded.is_ok());

    // The second file only exists once the first has been consumed.
    write_sample_file(&second, 0.25)?;
    let late = sources.next().expect("second source");
    assert_eq!(late.name, "late.nc");
    assert!(late.loaded.is_ok());
    assert!(sources.next().is_none());
    Ok(())
}

#[test]
fn test_expand_input_patterns() -> Result<()> {
    let dir = tempdir()?;
    let b = dir.path().join("b.nc");
    let a = dir.path().join("a.nc");
    write_sample_file(&b, 0.25)?;
    write_sample_file(&a, 0.35)?;
    std::fs::write(dir.path().join("notes.txt"), "not a raster")?;

    let pattern = dir.path().join("*.nc");
    let pattern = pattern.to_str().expect("utf-8 temp path");
    assert_eq!(expand_input(pattern), vec![a, b]);

    let unmatched = dir.path().join("*.grib");
    let unmatched = unmatched.to_str().expect("utf-8 temp path");
    assert_eq!(expand_input(unmatched), vec![PathBuf::from(unmatched)]);

    assert_eq!(
        expand_input("x.nc, y.nc,,"),
        vec![PathBuf::from("x.nc"), PathBuf::from("y.nc")]
    );
    assert!(expand_input("  ").is_empty());

    let config = GridConfig::new(1.0, GridVariant::Square);
    let grid = process_sources(&config, load_sources(&expand_input(pattern)))?;
    assert_eq!(grid.metadata.source_files, vec!["a.nc", "b.nc"]);
    Ok(())
}
