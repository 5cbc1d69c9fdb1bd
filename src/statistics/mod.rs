//! Statistical computations
//!
//! # Organization
//!
//! This module is organized into submodules:
//! - [`operations`]: Descriptive statistics and running moments
//! - [`parallel`]: Parallel axis reductions
//! - [`reduce`]: Reduction of merged cells to final tiles

pub mod operations;
pub mod parallel;
pub mod reduce;

pub use operations::{RunningMoments, VariableStats};
pub use parallel::parallel_nanmean_axis;
pub use reduce::{reduce_grid, reduce_tile};
