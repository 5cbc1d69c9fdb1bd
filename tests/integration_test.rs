use ndarray::{arr2, arr3, ArrayD};
use serde_json::Value;
use tilegrid::{
    errors::{Result, TileGridError},
    pipeline::{
        process_rasters, process_sources, process_sources_chunked, process_sources_parallel,
        PendingSource,
    },
    CellId, GridConfig, GridVariant, RasterSource, TileGrid, TimeAggregation,
};

fn sample_source(name: &str, lat0: f64, values: [[f64; 3]; 2]) -> RasterSource {
    RasterSource::new(name)
        .with_coordinate("latitude", vec![lat0, lat0 + 0.5])
        .with_coordinate("longitude", vec![0.2, 0.7, 1.2])
        .with_variable("t2m", arr2(&values).into_dyn())
}

fn sources() -> Vec<RasterSource> {
    vec![
        sample_source("a.nc", 0.1, [[1.0, 2.0, 3.0], [4.0, f64::NAN, 6.0]]),
        sample_source("b.nc", 0.3, [[10.0, f64::NAN, 30.0], [40.0, 50.0, 60.0]]),
        sample_source("c.nc", 1.1, [[f64::NAN; 3], [f64::NAN, 7.5, f64::NAN]]),
    ]
}

fn assert_same_statistics(left: &TileGrid, right: &TileGrid) {
    assert_eq!(left.tiles.len(), right.tiles.len());
    for (cell, tile) in &left.tiles {
        let other = right.tile(*cell).expect("cell present in both grids");
        assert_eq!(tile.count, other.count, "count of {cell}");
        assert!((tile.lat - other.lat).abs() < 1e-12);
        assert!((tile.lon - other.lon).abs() < 1e-12);
        assert_eq!(tile.variables.len(), other.variables.len());
        for (name, stats) in &tile.variables {
            assert!(stats.approx_eq(&other.variables[name], 1e-12), "{name} in {cell}");
        }
    }
}

#[test]
fn test_pipeline_square_grid() -> Result<()> {
    let config = GridConfig::new(1.0, GridVariant::Square);
    let grid = process_rasters(&config, sources())?;

    assert_eq!(grid.metadata.tile_count, grid.tiles.len());
    assert_eq!(grid.metadata.source_files, vec!["a.nc", "b.nc", "c.nc"]);
    assert_eq!(grid.metadata.variables, vec!["t2m"]);
    assert_eq!(grid.metadata.grid_type, GridVariant::Square);

    // a.nc and b.nc points with lon < 1.0 and lat < 1.0 all land in (0, 0).
    let origin = grid.tile(CellId(0, 0)).expect("origin cell");
    let t2m = origin.variable("t2m").expect("t2m");
    // a: 1, 2, 4 (5th is NaN); b: 10, 40, 50
    assert_eq!(t2m.count, 6);
    assert_eq!(t2m.min, 1.0);
    assert_eq!(t2m.max, 50.0);
    assert!((t2m.mean - 107.0 / 6.0).abs() < 1e-12);
    assert_eq!(origin.count, 6);

    // c.nc contributes a single value at (lat 1.6, lon 0.7).
    let upper = grid.tile(CellId(0, 1)).expect("upper cell");
    assert_eq!(upper.variable("t2m").map(|s| s.count), Some(1));
    assert_eq!(upper.variable("t2m").map(|s| s.std), Some(0.0));
    assert!(grid.tile(CellId(1, 1)).is_none());
    Ok(())
}

#[test]
fn test_merge_order_does_not_change_statistics() -> Result<()> {
    let config = GridConfig::new(0.5, GridVariant::Hex);
    let forward = process_rasters(&config, sources())?;
    let mut reversed_sources = sources();
    reversed_sources.reverse();
    let reversed = process_rasters(&config, reversed_sources)?;
    assert_same_statistics(&forward, &reversed);
    Ok(())
}

#[test]
fn test_parallel_matches_sequential() -> Result<()> {
    let config = GridConfig::new(0.4, GridVariant::Hex).with_time_aggregation(TimeAggregation::All);
    let sequential = process_sources(&config, sources().into_iter().map(PendingSource::from))?;
    let parallel =
        process_sources_parallel(&config, sources().into_iter().map(PendingSource::from).collect::<Vec<_>>())?;
    assert_same_statistics(&sequential, &parallel);
    assert_eq!(sequential.metadata, parallel.metadata);
    Ok(())
}

#[test]
fn test_failed_sources_are_skipped() -> Result<()> {
    let config = GridConfig::new(1.0, GridVariant::Square);
    let no_axes = RasterSource::new("rotated.nc")
        .with_coordinate("rlat", vec![0.0])
        .with_coordinate("rlon", vec![0.0])
        .with_variable("t2m", arr2(&[[1.0]]).into_dyn());

    let pending = vec![
        PendingSource::failed("broken.nc", TileGridError::Generic("truncated file".into())),
        PendingSource::from(no_axes),
        PendingSource::from(sample_source("a.nc", 0.1, [[1.0; 3], [1.0; 3]])),
    ];
    let grid = process_sources(&config, pending)?;
    assert_eq!(
        grid.metadata.source_files,
        vec!["broken.nc", "rotated.nc", "a.nc"]
    );
    assert!(!grid.tiles.is_empty());
    Ok(())
}

#[test]
fn test_batch_fails_when_every_source_fails() {
    let config = GridConfig::new(1.0, GridVariant::Square).with_variables(["sst"]);
    let pending = vec![
        PendingSource::failed("broken.nc", TileGridError::Generic("bad header".into())),
        PendingSource::from(sample_source("a.nc", 0.1, [[1.0; 3], [1.0; 3]])),
    ];
    match process_sources(&config, pending) {
        Err(TileGridError::NoSourcesProcessed { attempted }) => assert_eq!(attempted, 2),
        other => panic!("Expected NoSourcesProcessed, got {other:?}"),
    }
}

#[test]
fn test_config_errors_abort_before_sources() {
    let config = GridConfig::new(0.0, GridVariant::Hex);
    let pending = vec![PendingSource::failed(
        "broken.nc",
        TileGridError::Generic("never looked at".into()),
    )];
    assert!(matches!(
        process_sources(&config, pending),
        Err(TileGridError::InvalidCellSize { .. })
    ));
    assert!(matches!(
        process_sources_parallel(&config, Vec::new()),
        Err(TileGridError::InvalidCellSize { .. })
    ));
}

#[test]
fn test_time_policies_end_to_end() -> Result<()> {
    // One grid point, two time steps: [1, 3]; a second point: [NaN, 5].
    let data: ArrayD<f64> = arr3(&[[[1.0, f64::NAN]], [[3.0, 5.0]]]).into_dyn();
    let source = RasterSource::new("series.nc")
        .with_coordinate("lat", vec![0.5])
        .with_coordinate("lon", vec![0.5, 0.6])
        .with_coordinate("time", vec![0.0, 1.0])
        .with_variable("precip", data);

    let run = |policy| {
        let config = GridConfig::new(1.0, GridVariant::Square).with_time_aggregation(policy);
        process_rasters(&config, [source.clone()])
    };

    let first = run(TimeAggregation::First)?;
    let stats = first.tile(CellId(0, 0)).and_then(|t| t.variable("precip")).copied();
    assert_eq!(stats.map(|s| (s.count, s.mean)), Some((1, 1.0)));
    assert_eq!(first.tile(CellId(0, 0)).map(|t| t.count), Some(1));

    let mean = run(TimeAggregation::Mean)?;
    let stats = mean.tile(CellId(0, 0)).and_then(|t| t.variable("precip")).copied();
    assert_eq!(stats.map(|s| (s.count, s.mean)), Some((2, 3.5)));

    let all = run(TimeAggregation::All)?;
    let stats = all.tile(CellId(0, 0)).and_then(|t| t.variable("precip")).copied();
    assert_eq!(stats.map(|s| (s.count, s.mean)), Some((3, 3.0)));
    assert_eq!(all.metadata.time_aggregation, TimeAggregation::All);
    Ok(())
}

#[test]
fn test_json_layout() -> Result<()> {
    let config = GridConfig::new(1.0, GridVariant::Square);
    let grid = process_rasters(&config, sources())?;
    let json: Value = serde_json::from_str(&grid.to_json(false)?)?;

    let metadata = &json["metadata"];
    assert_eq!(metadata["grid_type"], "square");
    assert_eq!(metadata["time_aggregation"], "first");
    assert_eq!(metadata["cell_size"], 1.0);
    assert_eq!(metadata["tile_count"], grid.tiles.len());
    assert!(metadata.get("history").is_none());

    let origin = &json["tiles"]["0,0"];
    assert_eq!(origin["count"], 6);
    for key in ["mean", "min", "max", "std", "count"] {
        assert!(origin["t2m"].get(key).is_some(), "missing {key}");
    }

    let reloaded = TileGrid::from_json(&grid.to_json(true)?)?;
    assert_eq!(reloaded.metadata, grid.metadata);
    assert_same_statistics(&reloaded, &grid);
    Ok(())
}

#[test]
fn test_write_json_to_disk() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("map.json");
    let mut grid = process_rasters(&GridConfig::new(2.0, GridVariant::Hex), sources())?;
    grid.metadata.history = Some("test run".to_string());
    grid.write_json(&path, true)?;

    let loaded = TileGrid::from_json(&std::fs::read_to_string(&path)?)?;
    assert_eq!(loaded.metadata.history.as_deref(), Some("test run"));
    assert_eq!(loaded.tiles.len(), grid.tiles.len());
    Ok(())
}

#[test]
fn test_chunked_matches_sequential() -> Result<()> {
    let config = GridConfig::new(0.5, GridVariant::Square);
    let sequential = process_rasters(&config, sources())?;
    for chunk_size in [0, 1, 2, 5] {
        let chunked = process_sources_chunked(
            &config,
            sources().into_iter().map(PendingSource::from),
            chunk_size,
        )?;
        assert_eq!(chunked.metadata, sequential.metadata, "chunk size {chunk_size}");
        assert_same_statistics(&sequential, &chunked);
    }
    Ok(())
}

#[test]
fn test_infinite_values_are_missing() -> Result<()> {
    let source = RasterSource::new("inf.nc")
        .with_coordinate("lat", vec![0.5, 0.6])
        .with_coordinate("lon", vec![0.5])
        .with_variable("t2m", arr2(&[[f64::INFINITY], [2.0]]).into_dyn())
        .with_variable("flux", arr2(&[[f64::NEG_INFINITY], [f64::NAN]]).into_dyn());
    let grid = process_rasters(&GridConfig::new(1.0, GridVariant::Square), [source])?;

    let tile = grid.tile(CellId(0, 0)).expect("cell with a finite value");
    assert_eq!(tile.count, 1);
    assert!((tile.lat - 0.6).abs() < 1e-12);
    let t2m = tile.variable("t2m").expect("t2m");
    assert_eq!((t2m.count, t2m.mean, t2m.std), (1, 2.0, 0.0));
    assert!(tile.variable("flux").is_none());

    let reloaded = TileGrid::from_json(&grid.to_json(false)?)?;
    assert_eq!(reloaded, grid);
    Ok(())
}
