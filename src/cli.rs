//! Defines command-line interface options using `clap` for the tilegrid binary.

use clap::Parser;
use std::path::PathBuf;
use tilegrid::netcdf_io::expand_input;
use tilegrid::{GridVariant, TimeAggregation};

/// Bin NetCDF rasters onto a hexagonal or square tile grid
#[derive(Parser, Debug)]
#[command(
    name = "tilegrid",
    version,
    about = "Re-tessellates gridded NetCDF data onto hex or square tiles with per-cell statistics"
)]
pub struct Args {
    /// Input NetCDF files; each argument may be a glob pattern or a
    /// comma-separated list
    #[arg(required = true, num_args = 1..)]
    pub inputs: Vec<String>,

    /// Output JSON file. If not set, the grid is printed to stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Cell size in degrees
    #[arg(short = 's', long, default_value_t = 1.0)]
    pub cell_size: f64,

    /// Tessellation: hex or square
    #[arg(short, long, default_value = "hex", value_parser = parse_variant)]
    pub grid: GridVariant,

    /// Variables to extract, comma-separated (default: every gridded variable)
    #[arg(long, value_delimiter = ',')]
    pub variables: Vec<String>,

    /// Time aggregation for 3-D variables: first, mean or all
    #[arg(long = "time-agg", default_value = "first", value_parser = parse_time_aggregation)]
    pub time_agg: TimeAggregation,

    /// Keep running moments instead of raw value lists
    #[arg(long, default_value_t = false)]
    pub streaming: bool,

    /// Bin sources in parallel
    #[arg(long, default_value_t = false)]
    pub parallel: bool,

    /// Number of threads to use for parallel processing. Defaults to number of CPU cores.
    #[arg(short = 't', long)]
    pub threads: Option<usize>,

    /// Pretty-print the JSON output
    #[arg(long, default_value_t = false)]
    pub pretty: bool,

    /// Describe the input files instead of binning them
    #[arg(long, default_value_t = false)]
    pub info: bool,

    /// Enable verbose output.
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl Args {
    /// Input paths with glob patterns and comma-separated lists expanded
    pub fn input_paths(&self) -> Vec<PathBuf> {
        self.inputs.iter().flat_map(|arg| expand_input(arg)).collect()
    }
}

fn parse_variant(s: &str) -> Result<GridVariant, String> {
    s.parse().map_err(|e: tilegrid::TileGridError| e.to_string())
}

fn parse_time_aggregation(s: &str) -> Result<TimeAggregation, String> {
    s.parse().map_err(|e: tilegrid::TileGridError| e.to_string())
}
