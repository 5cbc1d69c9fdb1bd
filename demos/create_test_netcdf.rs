//! Creates a sample NetCDF file for trying out tilegrid.
//!
//! The file holds a 12-step monthly time axis over a small lat/lon grid with
//! two variables, one of them masked over a "sea" region via `_FillValue`.
//!
//! ```text
//! cargo run --example create_test_netcdf
//! cargo run -- test_data.nc -o map.json --cell-size 5 --time-agg mean --pretty
//! ```

use ndarray::{Array1, Array3};
use netcdf::create;
use std::path::Path;

const FILL: f32 = -9999.0;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let output_path = Path::new("test_data.nc");

    println!("🔨 Creating test NetCDF file: {}", output_path.display());

    if output_path.exists() {
        std::fs::remove_file(output_path)?
    }

    let mut file = create(output_path)?;

    file.add_attribute("title", "tilegrid sample climate data")?;
    file.add_attribute("institution", "tilegrid demos")?;

    let (nt, nlat, nlon) = (12_usize, 19_usize, 36_usize);
    file.add_dimension("time", nt)?;
    file.add_dimension("lat", nlat)?;
    file.add_dimension("lon", nlon)?;

    {
        let mut time_var = file.add_variable::<f64>("time", &["time"])?;
        time_var.put_attribute("units", "days since 2023-01-01")?;
        let time_data = Array1::from_iter((0..nt).map(|i| i as f64 * 30.0));
        time_var.put(time_data.view(), ..)?;
    }

    let lats: Vec<f32> = (0..nlat).map(|i| -45.0 + i as f32 * 5.0).collect();
    let lons: Vec<f32> = (0..nlon).map(|j| -90.0 + j as f32 * 5.0).collect();

    {
        let mut lat_var = file.add_variable::<f32>("lat", &["lat"])?;
        lat_var.put_attribute("units", "degrees_north")?;
        lat_var.put(Array1::from(lats.clone()).view(), ..)?;
    }

    {
        let mut lon_var = file.add_variable::<f32>("lon", &["lon"])?;
        lon_var.put_attribute("units", "degrees_east")?;
        lon_var.put(Array1::from(lons.clone()).view(), ..)?;
    }

    {
        // Temperature falls off with latitude and follows a seasonal cycle.
        let temperature = Array3::from_shape_fn((nt, nlat, nlon), |(t, i, _)| {
            let season = (t as f32 / nt as f32 * std::f32::consts::TAU).sin();
            28.0 - lats[i].abs() * 0.6 + season * 8.0 * lats[i].signum()
        });
        let mut var = file.add_variable::<f32>("temperature", &["time", "lat", "lon"])?;
        var.put_attribute("units", "degC")?;
        var.put_attribute("long_name", "Near-surface air temperature")?;
        var.put(temperature.view(), ..)?;
    }

    {
        // Soil moisture is undefined west of -40° (fill value).
        let soil = Array3::from_shape_fn((nt, nlat, nlon), |(t, i, j)| {
            if lons[j] < -40.0 {
                FILL
            } else {
                0.25 + 0.01 * (t as f32) + 0.002 * lats[i]
            }
        });
        let mut var = file.add_variable::<f32>("soil_moisture", &["time", "lat", "lon"])?;
        var.put_attribute("_FillValue", FILL)?;
        var.put_attribute("units", "m3 m-3")?;
        var.put(soil.view(), ..)?;
    }

    println!("✅ Wrote {} × {} × {} grid with variables temperature, soil_moisture", nt, nlat, nlon);

    Ok(())
}
