//! Parallel axis reductions used by the time reducer

use crate::errors::{Result, TileGridError};
use ndarray::{ArrayD, Axis, Zip};

/// Computes the mean along an axis, skipping NaN independently per lane
///
/// Each output element is the mean of the non-NaN values of its lane; a lane
/// with no valid values yields NaN, so the point stays missing downstream.
/// Lanes are reduced on the rayon pool.
///
/// # Errors
///
/// Returns an error if the axis is out of bounds.
#[allow(clippy::cast_precision_loss)]
pub fn parallel_nanmean_axis(data: &ArrayD<f64>, axis: usize) -> Result<ArrayD<f64>> {
    if axis >= data.ndim() {
        return Err(TileGridError::Generic(format!(
            "Axis {axis} is out of bounds for array with {} dimensions",
            data.ndim()
        )));
    }

    tracing::debug!(
        axis,
        lanes = data.len() / data.len_of(Axis(axis)).max(1),
        threads = rayon::current_num_threads(),
        "computing NaN-aware mean"
    );

    let result = Zip::from(data.lanes(Axis(axis))).par_map_collect(|lane| {
        let (sum, count) = lane
            .iter()
            .filter(|v| !v.is_nan())
            .fold((0.0_f64, 0_usize), |(sum, count), &v| (sum + v, count + 1));

        if count > 0 {
            sum / count as f64
        } else {
            f64::NAN
        }
    });

    Ok(result)
}
