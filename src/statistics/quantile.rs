//! Quantiles collapsed over the time axis

use ndarray::{Array2, ArrayView3, Zip};

/// R's default quantile algorithm (type=7), linear interpolation between
/// order statistics.
///
/// **Expects pre-sorted input** (caller's responsibility). Empty input gives
/// `NaN`.
pub fn quantile_type7(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let n = sorted.len();
    let h = (n - 1) as f64 * q;
    let lo = h.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    let frac = h - h.floor();
    // Equal neighbours (including two infinities) need no interpolation
    if frac == 0.0 || sorted[lo] == sorted[hi] {
        return sorted[lo];
    }
    sorted[lo] + frac * (sorted[hi] - sorted[lo])
}

/// Per-cell `q`-th quantile over the time axis of one or more
/// `(time, lat, lon)` members.
///
/// The time steps of all members are pooled, keeping only non-`NaN` values
/// that satisfy `keep`. Cells with nothing left are `NaN`. All members must share
/// the `(lat, lon)` shape of the first one; callers check this.
pub fn quantile_over_time<P>(
    members: &[ArrayView3<'_, f64>],
    q: f64,
    keep: P,
    parallel: bool,
) -> Array2<f64>
where
    P: Fn(f64) -> bool + Send + Sync,
{
    let (n_lat, n_lon) = members
        .first()
        .map(|m| (m.dim().1, m.dim().2))
        .unwrap_or((0, 0));
    let mut out = Array2::from_elem((n_lat, n_lon), f64::NAN);

    let cell_quantile = |(i, j): (usize, usize), cell: &mut f64| {
        let mut values: Vec<f64> = members
            .iter()
            .flat_map(|m| m.slice(ndarray::s![.., i, j]).to_vec())
            .filter(|v| !v.is_nan() && keep(*v))
            .collect();
        values.sort_by(f64::total_cmp);
        *cell = quantile_type7(&values, q);
    };

    let zip = Zip::indexed(&mut out);
    if parallel {
        zip.par_for_each(cell_quantile);
    } else {
        zip.for_each(cell_quantile);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::Array3;

    #[test]
    fn test_quantile_type7() {
        let sorted = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(quantile_type7(&sorted, 0.0), 1.0);
        assert_eq!(quantile_type7(&sorted, 0.5), 3.0);
        assert_eq!(quantile_type7(&sorted, 1.0), 5.0);
        assert_relative_eq!(quantile_type7(&sorted, 0.9), 4.6, epsilon = 1e-12);
        assert_eq!(quantile_type7(&[7.0], 0.3), 7.0);
        assert!(quantile_type7(&[], 0.5).is_nan());

        let tail = [1.0, f64::INFINITY, f64::INFINITY];
        assert_eq!(quantile_type7(&tail, 0.75), f64::INFINITY);
        assert_eq!(quantile_type7(&tail, 0.0), 1.0);
    }

    #[test]
    fn test_quantile_over_time_filters_and_pools() {
        // cell (0,0): 0, 2, 4, NaN ; cell (0,1): all below filter
        let a = Array3::from_shape_vec((4, 1, 2), vec![0.0, 0.0, 2.0, 0.5, 4.0, 0.2, f64::NAN, 0.1])
            .unwrap();
        let b = Array3::from_shape_vec((1, 1, 2), vec![6.0, 0.0]).unwrap();

        let single = quantile_over_time(&[a.view()], 0.5, |v| v > 1.0, false);
        assert_eq!(single[[0, 0]], 3.0);
        assert!(single[[0, 1]].is_nan());

        let pooled = quantile_over_time(&[a.view(), b.view()], 0.5, |v| v > 1.0, true);
        assert_eq!(pooled[[0, 0]], 4.0);
        assert!(pooled[[0, 1]].is_nan());
    }
}
