//! Per-cell computation kernels for grouped reductions
//!
//! Every kernel walks the `(lat, lon)` cells of the output with an ndarray
//! `Zip`. With `parallel` set, the cells are spread over rayon's current
//! pool through `par_for_each`; each cell is still written by one closure
//! call, so both paths produce identical arrays.

use crate::dataset::YearGroups;
use crate::errors::{ClimexError, Result};
use ndarray::{s, Array3, ArrayView1, ArrayView2, ArrayView3, Axis, Zip};

/// Reduce every `(year, cell)` lane of `data` with `reducer`.
///
/// The output is shaped `(groups.len(), lat, lon)`, years ascending.
pub fn reduce_groups<F>(
    data: ArrayView3<'_, f64>,
    groups: &YearGroups,
    parallel: bool,
    reducer: F,
) -> Array3<f64>
where
    F: Fn(ArrayView1<'_, f64>) -> f64 + Send + Sync,
{
    let (_, n_lat, n_lon) = data.dim();
    let mut out = Array3::from_elem((groups.len(), n_lat, n_lon), f64::NAN);

    for (slot, (year, indices)) in out.outer_iter_mut().zip(groups.iter()) {
        tracing::trace!(year, days = indices.len(), "reducing year");
        let subset = data.select(Axis(0), indices);
        let zip = Zip::from(slot).and(subset.lanes(Axis(0)));
        if parallel {
            zip.par_for_each(|cell, lane| *cell = reducer(lane));
        } else {
            zip.for_each(|cell, lane| *cell = reducer(lane));
        }
    }

    out
}

/// Combine every time step of `data` with the per-cell `threshold`.
///
/// The threshold is broadcast along the time axis, so `combine(value,
/// threshold)` sees the cell's own threshold at every step.
///
/// # Errors
///
/// Returns [`ClimexError::ShapeMismatch`] if the threshold is not shaped like
/// the `(lat, lon)` part of `data`.
pub fn combine_with_threshold<F>(
    data: ArrayView3<'_, f64>,
    threshold: ArrayView2<'_, f64>,
    combine: F,
) -> Result<Array3<f64>>
where
    F: Fn(f64, f64) -> f64,
{
    let broadcast = threshold.broadcast(data.raw_dim()).ok_or_else(|| {
        ClimexError::shape_mismatch("threshold broadcast", &data.shape()[1..], threshold.shape())
    })?;
    Ok(Zip::from(&data)
        .and(&broadcast)
        .map_collect(|&value, &limit| combine(value, limit)))
}

/// Trailing rolling sum along the time axis.
///
/// Step `t` holds the sum of steps `t + 1 - window ..= t`. The first
/// `window - 1` steps, and any window containing a `NaN`, are `NaN`. The window runs across year boundaries.
///
/// # Errors
///
/// Returns [`ClimexError::InvalidWindow`] if `window` is zero.
pub fn rolling_sum(data: ArrayView3<'_, f64>, window: usize, parallel: bool) -> Result<Array3<f64>> {
    if window == 0 {
        return Err(ClimexError::InvalidWindow { window });
    }

    let mut out = Array3::from_elem(data.raw_dim(), f64::NAN);
    let sum_lane = |mut target: ndarray::ArrayViewMut1<'_, f64>, series: ArrayView1<'_, f64>| {
        for end in (window - 1)..series.len() {
            let values = series.slice(s![end + 1 - window..=end]);
            if !values.iter().any(|v| v.is_nan()) {
                target[end] = values.sum();
            }
        }
    };

    let zip = Zip::from(out.lanes_mut(Axis(0))).and(data.lanes(Axis(0)));
    if parallel {
        zip.par_for_each(sum_lane);
    } else {
        zip.for_each(sum_lane);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statistics::operations::StatOperation;
    use chrono::NaiveDate;
    use ndarray::{arr2, Array3};

    fn two_year_groups() -> YearGroups {
        let dates: Vec<NaiveDate> = [(1999, 12, 30), (1999, 12, 31), (2000, 1, 1), (2000, 1, 2)]
            .iter()
            .map(|&(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
            .collect();
        YearGroups::from_dates(&dates)
    }

    #[test]
    fn test_reduce_groups_shape_and_values() {
        // time x lat x lon = 4 x 1 x 2
        let data = Array3::from_shape_vec(
            (4, 1, 2),
            vec![
                1.0, 10.0, // 1999-12-30
                2.0, 20.0, // 1999-12-31
                3.0, 30.0, // 2000-01-01
                4.0, 40.0, // 2000-01-02
            ],
        )
        .unwrap();
        let groups = two_year_groups();
        let out = reduce_groups(data.view(), &groups, false, |lane| {
            StatOperation::Sum.apply(lane)
        });
        assert_eq!(out.shape(), &[2, 1, 2]);
        assert_eq!(out[[0, 0, 0]], 3.0);
        assert_eq!(out[[0, 0, 1]], 30.0);
        assert_eq!(out[[1, 0, 0]], 7.0);
        assert_eq!(out[[1, 0, 1]], 70.0);
    }

    #[test]
    fn test_reduce_groups_parallel_matches_sequential() {
        let data = Array3::from_shape_fn((4, 3, 5), |(t, i, j)| (t * 15 + i * 5 + j) as f64 * 0.1);
        let groups = two_year_groups();
        let seq = reduce_groups(data.view(), &groups, false, |lane| StatOperation::Mean.apply(lane));
        let par = reduce_groups(data.view(), &groups, true, |lane| StatOperation::Mean.apply(lane));
        assert_eq!(seq, par);
    }

    #[test]
    fn test_combine_with_threshold_broadcasts() {
        let data = Array3::from_shape_vec((2, 1, 2), vec![1.0, 5.0, 3.0, 2.0]).unwrap();
        let threshold = arr2(&[[2.0, 4.0]]);
        let out = combine_with_threshold(data.view(), threshold.view(), |x, t| {
            if x > t {
                1.0
            } else {
                0.0
            }
        })
        .unwrap();
        assert_eq!(out.as_slice().unwrap(), &[0.0, 1.0, 1.0, 0.0]);
    }

    #[test]
    fn test_combine_with_threshold_shape_mismatch() {
        let data = Array3::<f64>::zeros((2, 2, 2));
        let threshold = arr2(&[[1.0, 2.0, 3.0]]);
        let result = combine_with_threshold(data.view(), threshold.view(), |x, _| x);
        assert!(matches!(result, Err(ClimexError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_rolling_sum() {
        let data =
            Array3::from_shape_vec((6, 1, 1), vec![1.0, 2.0, 3.0, f64::NAN, 5.0, 6.0]).unwrap();
        let out = rolling_sum(data.view(), 2, false).unwrap();
        let lane: Vec<f64> = out.iter().copied().collect();
        assert!(lane[0].is_nan());
        assert_eq!(lane[1], 3.0);
        assert_eq!(lane[2], 5.0);
        assert!(lane[3].is_nan());
        assert!(lane[4].is_nan());
        assert_eq!(lane[5], 11.0);
    }

    #[test]
    fn test_rolling_sum_keeps_infinity() {
        let data = Array3::from_shape_vec((3, 1, 1), vec![1.0, f64::INFINITY, 2.0]).unwrap();
        let out = rolling_sum(data.view(), 2, false).unwrap();
        assert_eq!(out[[1, 0, 0]], f64::INFINITY);
        assert_eq!(out[[2, 0, 0]], f64::INFINITY);
    }

    #[test]
    fn test_rolling_sum_short_series_and_zero_window() {
        let data = Array3::from_elem((3, 1, 1), 1.0);
        let out = rolling_sum(data.view(), 5, false).unwrap();
        assert!(out.iter().all(|v| v.is_nan()));
        assert!(matches!(
            rolling_sum(data.view(), 0, false),
            Err(ClimexError::InvalidWindow { window: 0 })
        ));
    }
}
