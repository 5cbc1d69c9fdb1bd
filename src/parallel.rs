//! Parallel processing configuration
//!
//! Sizes Rayon's global thread pool, which is used for parallel per-source
//! binning and for the time-mean reduction.

use crate::errors::{Result, TileGridError};
use rayon::ThreadPoolBuilder;

/// Configuration for parallel processing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParallelConfig {
    pub num_threads: Option<usize>,
}

impl ParallelConfig {
    /// Create a new parallel configuration
    #[must_use]
    pub const fn new(num_threads: Option<usize>) -> Self {
        Self { num_threads }
    }

    /// Create a configuration that uses a specific number of threads
    #[must_use]
    pub const fn with_threads(num_threads: usize) -> Self {
        Self {
            num_threads: Some(num_threads),
        }
    }

    /// Set up the global Rayon thread pool with the specified configuration
    ///
    /// # Errors
    ///
    /// Returns [`TileGridError::ThreadPoolError`] if the pool was already
    /// initialised or cannot be built.
    pub fn setup_global_pool(&self) -> Result<()> {
        if let Some(num_threads) = self.num_threads {
            ThreadPoolBuilder::new()
                .num_threads(num_threads)
                .build_global()
                .map_err(|e| {
                    TileGridError::ThreadPoolError(format!(
                        "Failed to initialize thread pool with {} threads: {}",
                        num_threads, e
                    ))
                })?;

            tracing::info!(threads = num_threads, "configured thread pool");
        } else {
            tracing::info!(
                threads = rayon::current_num_threads(),
                "using default thread pool"
            );
        }

        Ok(())
    }

    /// Get the current number of threads being used
    #[must_use]
    pub fn current_threads(&self) -> usize {
        rayon::current_num_threads()
    }
}

/// Get information about the current parallel configuration
#[must_use]
pub fn get_parallel_info() -> ParallelInfo {
    ParallelInfo {
        current_threads: rayon::current_num_threads(),
        available_cores: num_cpus::get(),
        available_parallelism: std::thread::available_parallelism()
            .map(|p| p.get())
            .unwrap_or(1),
    }
}

/// Information about the parallel processing environment
#[derive(Debug, Clone)]
pub struct ParallelInfo {
    pub current_threads: usize,
    pub available_cores: usize,
    pub available_parallelism: usize,
}

impl ParallelInfo {
    /// Print parallel processing information to stderr
    pub fn print_info(&self) {
        eprintln!("📊 Parallel Processing Information:");
        eprintln!("   Current threads: {}", self.current_threads);
        eprintln!("   Available CPU cores: {}", self.available_cores);
        eprintln!("   Available parallelism: {}", self.available_parallelism);
    }
}
