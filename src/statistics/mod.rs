//! Statistical computations grouped by calendar year
//!
//! This module provides the NaN-skipping reductions (mean, sum, min, max,
//! counts) that every index is built from, together with rolling sums and
//! quantiles collapsed over time.
//!
//! # Organization
//!
//! - [`operations`]: Core statistical operations and the [`AnnualReduction`] trait
//! - [`parallel`]: Per-cell kernels, sequential or on the rayon pool
//! - [`quantile`]: Type-7 quantiles over pooled time lanes

pub mod operations;
pub mod parallel;
pub mod quantile;

// Re-export the main types and functions for convenience
pub use operations::{lane_count, AnnualReduction, StatOperation};
pub use parallel::{combine_with_threshold, reduce_groups, rolling_sum};
pub use quantile::{quantile_over_time, quantile_type7};
