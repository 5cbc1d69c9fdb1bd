//! Collapsing or expanding a variable's time axis
//!
//! Rank-2 arrays have no time axis and pass through. For rank-3 arrays axis 0
//! is time and the [`TimeAggregation`] policy decides what reaches the
//! binner: one slice (`first`), the per-point NaN-aware mean (`mean`), or
//! every slice tagged with its index (`all`).

use crate::config::TimeAggregation;
use crate::errors::{Result, TileGridError};
use crate::statistics::parallel_nanmean_axis;
use ndarray::{ArrayD, Axis, CowArray, Ix2};

/// One 2-D slice handed to the binner
#[derive(Debug, Clone)]
pub struct TimeSlice<'a> {
    /// Time index when the slice is one of several kept slices
    pub time: Option<usize>,
    pub data: CowArray<'a, f64, Ix2>,
}

/// Reduce `data` to the 2-D slices the binner should walk
///
/// # Errors
///
/// Returns [`TileGridError::UnsupportedRank`] for arrays that are neither
/// 2-D nor 3-D.
pub fn reduce_time<'a>(
    variable: &str,
    data: &'a ArrayD<f64>,
    policy: TimeAggregation,
) -> Result<Vec<TimeSlice<'a>>> {
    match data.ndim() {
        2 => {
            let view = data.view().into_dimensionality::<Ix2>()?;
            Ok(vec![TimeSlice {
                time: None,
                data: CowArray::from(view),
            }])
        }
        3 => {
            let steps = data.len_of(Axis(0));
            match policy {
                TimeAggregation::First => {
                    tracing::debug!(variable, steps, "using first time step");
                    if steps == 0 {
                        return Ok(Vec::new());
                    }
                    let slice = data.index_axis(Axis(0), 0).into_dimensionality::<Ix2>()?;
                    Ok(vec![TimeSlice {
                        time: None,
                        data: CowArray::from(slice),
                    }])
                }
                TimeAggregation::Mean => {
                    tracing::debug!(variable, steps, "averaging over time");
                    let mean = parallel_nanmean_axis(data, 0)?.into_dimensionality::<Ix2>()?;
                    Ok(vec![TimeSlice {
                        time: None,
                        data: CowArray::from(mean),
                    }])
                }
                TimeAggregation::All => {
                    tracing::debug!(variable, steps, "keeping all time steps");
                    data.axis_iter(Axis(0))
                        .enumerate()
                        .map(|(t, slice)| -> Result<TimeSlice<'a>> {
                            Ok(TimeSlice {
                                time: Some(t),
                                data: CowArray::from(slice.into_dimensionality::<Ix2>()?),
                            })
                        })
                        .collect()
                }
            }
        }
        rank => Err(TileGridError::UnsupportedRank {
            variable: variable.to_string(),
            rank,
        }),
    }
}
