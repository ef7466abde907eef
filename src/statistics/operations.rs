//! Core statistical operations and traits
//!
//! This module defines the NaN-skipping reductions applied to one
//! `(year, cell)` lane and the [`AnnualReduction`] trait that drives them over
//! calendar-year groups.

use crate::dataset::YearGroups;
use ndarray::{Array3, ArrayView1, ArrayView3};

/// Supported statistical operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatOperation {
    /// Arithmetic mean
    Mean,
    /// Sum of values
    Sum,
    /// Minimum value
    Min,
    /// Maximum value
    Max,
}

impl StatOperation {
    /// Get the string representation of the operation
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::Sum => "sum",
            Self::Min => "minimum",
            Self::Max => "maximum",
        }
    }

    /// Reduce one lane, skipping `NaN`. Infinite values take part.
    ///
    /// A lane without non-`NaN` values gives `NaN` for mean, min and max and
    /// `0.0` for sum.
    pub fn apply(self, lane: ArrayView1<'_, f64>) -> f64 {
        match self {
            Self::Mean => lane_mean(lane),
            Self::Sum => lane_sum(lane),
            Self::Min => lane_min(lane),
            Self::Max => lane_max(lane),
        }
    }
}

pub fn lane_sum(lane: ArrayView1<'_, f64>) -> f64 {
    lane.fold(0.0_f64, |acc, &x| {
        if x.is_nan() {
            acc // Skip missing values
        } else {
            acc + x
        }
    })
}

pub fn lane_mean(lane: ArrayView1<'_, f64>) -> f64 {
    let (sum, count) = lane.fold((0.0_f64, 0_usize), |(sum, count), &x| {
        if x.is_nan() {
            (sum, count)
        } else {
            (sum + x, count + 1)
        }
    });

    if count > 0 {
        sum / count as f64
    } else {
        f64::NAN // Return NaN if all values were missing
    }
}

pub fn lane_min(lane: ArrayView1<'_, f64>) -> f64 {
    lane_extreme(lane, f64::min)
}

pub fn lane_max(lane: ArrayView1<'_, f64>) -> f64 {
    lane_extreme(lane, f64::max)
}

// `None` until a non-NaN value is seen, so an infinite value is a valid result
fn lane_extreme(lane: ArrayView1<'_, f64>, pick: fn(f64, f64) -> f64) -> f64 {
    lane.iter()
        .filter(|x| !x.is_nan())
        .fold(None, |acc: Option<f64>, &x| Some(acc.map_or(x, |best| pick(best, x))))
        .unwrap_or(f64::NAN)
}

/// Number of values in the lane satisfying `predicate`.
pub fn lane_count<P>(lane: ArrayView1<'_, f64>, predicate: P) -> f64
where
    P: Fn(f64) -> bool,
{
    lane.iter().filter(|&&x| predicate(x)).count() as f64
}

/// Trait for `(time, lat, lon)` arrays that can be reduced per calendar year
pub trait AnnualReduction {
    /// Apply `operation` to every `(year, cell)` lane.
    fn reduce_by_year(
        &self,
        groups: &YearGroups,
        operation: StatOperation,
        parallel: bool,
    ) -> Array3<f64>;

    /// Apply an arbitrary lane reducer to every `(year, cell)` lane.
    fn reduce_by_year_with<F>(&self, groups: &YearGroups, parallel: bool, reducer: F) -> Array3<f64>
    where
        F: Fn(ArrayView1<'_, f64>) -> f64 + Send + Sync;
}

impl AnnualReduction for ArrayView3<'_, f64> {
    fn reduce_by_year(
        &self,
        groups: &YearGroups,
        operation: StatOperation,
        parallel: bool,
    ) -> Array3<f64> {
        super::parallel::reduce_groups(self.view(), groups, parallel, |lane| operation.apply(lane))
    }

    fn reduce_by_year_with<F>(&self, groups: &YearGroups, parallel: bool, reducer: F) -> Array3<f64>
    where
        F: Fn(ArrayView1<'_, f64>) -> f64 + Send + Sync,
    {
        super::parallel::reduce_groups(self.view(), groups, parallel, reducer)
    }
}
