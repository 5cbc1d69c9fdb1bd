//! Entry point for the tilegrid binary.
//! Parses arguments, loads NetCDF sources and writes the binned tile grid.

use chrono::Utc;
use clap::Parser;
use tilegrid::metadata::describe_source;
use tilegrid::netcdf_io::load_sources;
use tilegrid::parallel::{get_parallel_info, ParallelConfig};
use tilegrid::pipeline::{process_sources, process_sources_parallel};
use tilegrid::{AccumulationMode, GridConfig};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod cli;

use cli::Args;

fn init_tracing(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_tracing(args.verbose)?;

    let paths = args.input_paths();

    if args.info {
        for path in &paths {
            match describe_source(path) {
                Ok(info) => info.print(),
                Err(e) => eprintln!("⚠ {}: {}", path.display(), e),
            }
        }
        return Ok(());
    }

    eprintln!(
        r#"
----------------------------------------------------------------------
        tilegrid: NetCDF rasters → {} tiles ({}° cells, time: {})
----------------------------------------------------------------------"#,
        args.grid, args.cell_size, args.time_agg
    );

    let accumulation = if args.streaming {
        AccumulationMode::Streaming
    } else {
        AccumulationMode::Raw
    };
    let config = GridConfig::new(args.cell_size, args.grid)
        .with_variables(args.variables.iter().cloned())
        .with_time_aggregation(args.time_agg)
        .with_accumulation(accumulation);
    config.validate()?;

    args.threads
        .map_or_else(ParallelConfig::default, ParallelConfig::with_threads)
        .setup_global_pool()?;
    if args.verbose {
        get_parallel_info().print_info();
    }

    eprintln!("\n📁 Files: {}", paths.len());
    for path in &paths {
        eprintln!("   • {}", path.display());
    }

    let sources = load_sources(&paths);
    let mut grid = if args.parallel || args.threads.is_some() {
        process_sources_parallel(&config, sources)?
    } else {
        process_sources(&config, sources)?
    };
    grid.metadata.history = Some(format!(
        "Created by tilegrid {} on {}",
        env!("CARGO_PKG_VERSION"),
        Utc::now().to_rfc3339()
    ));

    match &args.output {
        Some(path) => {
            grid.write_json(path, args.pretty)?;
            let size_mb = std::fs::metadata(path)?.len() as f64 / 1024.0 / 1024.0;
            eprintln!("\n✅ Saved {} tiles to {}", grid.metadata.tile_count, path.display());
            eprintln!("📦 File size: {:.2} MB", size_mb);
            eprintln!("📊 Variables: {}", grid.metadata.variables.join(", "));
        }
        None => println!("{}", grid.to_json(args.pretty)?),
    }

    Ok(())
}
