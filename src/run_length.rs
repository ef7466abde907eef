//! Longest run of consecutive `true` values
//!
//! Used by the consecutive dry/wet day indices. The caller has already
//! narrowed the sequence to one year of one grid cell.

use ndarray::ArrayView1;

/// Length of the longest contiguous run of `true` values. Empty input gives 0.
pub fn max_consecutive<I>(flags: I) -> usize
where
    I: IntoIterator<Item = bool>,
{
    let mut current = 0;
    let mut best = 0;
    for flag in flags {
        if flag {
            current += 1;
            best = best.max(current);
        } else {
            current = 0;
        }
    }
    best
}

/// Longest run of values in `lane` satisfying `predicate`, as `f64` so it can
/// be used as a lane reducer. `NaN` fails every comparison and breaks a run.
pub fn max_consecutive_where<P>(lane: ArrayView1<'_, f64>, predicate: P) -> f64
where
    P: Fn(f64) -> bool,
{
    max_consecutive(lane.iter().map(|&x| predicate(x))) as f64
}
