//! climex: ETCCDI climate extreme indices over daily gridded data
//!
//! climex reduces daily gridded climate-model output (precipitation, daily
//! minimum and maximum temperature) to annual extreme indices as defined by
//! the Expert Team on Climate Change Detection and Indices: annual maxima,
//! threshold-exceedance counts, longest dry and wet spells, and
//! percentile-based thresholds computed over a reference period.
//!
//! ## Key Features
//!
//! - **Index Catalog**: RX1D, RX5D, R10mm, R20mm, NWD, PTOT, SDII, CDD, CWD,
//!   TNX, TNN, TXX, TXN, FD, ID, TR, SU, DTRX, DTRN, DTRM
//! - **Percentile Indices**: Q/PR/N/P..tot for precipitation and role-based
//!   counts above or below temperature percentiles, optionally pooled over
//!   ensemble members
//! - **NaN Aware**: Reductions skip missing values
//! - **Parallel Processing**: Opt-in per-cell reductions on the rayon pool,
//!   bit-identical to the sequential path
//!
//! ## Module Organization
//!
//! - [`dataset`]: Labeled inputs and outputs (dataset, annual index, threshold, mask)
//! - [`indices`]: The index functions
//! - [`statistics`]: Year-grouped reductions, rolling sums and quantiles
//! - [`run_length`]: Longest run of consecutive days
//! - [`config`]: Variable names, reference period and execution settings
//! - [`parallel`]: Parallel processing configuration
//! - [`errors`]: Centralized error handling
//!
//! ## Usage Example
//!
//! ```rust
//! use climex::prelude::*;
//! use chrono::{Duration, NaiveDate};
//! use ndarray::Array3;
//!
//! let start = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
//! let time: Vec<NaiveDate> = (0..4).map(|d| start + Duration::days(d)).collect();
//! let precip = Array3::from_shape_vec((4, 1, 1), vec![0.0, 3.0, 5.0, 0.0]).unwrap();
//! let ds = Dataset::new(time, SpatialGrid::new(vec![0.0], vec![0.0]))
//!     .with_variable("PRECT", precip)
//!     .unwrap();
//!
//! let cfg = IndexConfig::default();
//! let ptot = climex::indices::precipitation::total_precip(&ds, &cfg).unwrap();
//! assert_eq!(ptot.get(2000, 0, 0), Some(8.0));
//! ```

pub mod config;
pub mod dataset;
pub mod errors;
pub mod indices;
pub mod parallel;
pub mod run_length;
pub mod statistics;

// Direct re-exports for the public API
pub use config::{IndexConfig, ReferencePeriod, TemperatureRole, VariableNames};
pub use dataset::{AnnualIndex, Dataset, IndexMetadata, Mask, SpatialGrid, Threshold, YearGroups};
pub use errors::{ClimexError, Result};
pub use indices::catalog::IndexKind;
pub use indices::diurnal::{Coverage, DtrStatistic};
pub use parallel::ParallelConfig;
pub use run_length::max_consecutive;

// High-level convenience API
pub mod prelude {
    //! Commonly used imports for convenience
    pub use crate::config::{IndexConfig, ReferencePeriod, TemperatureRole, VariableNames};
    pub use crate::dataset::{AnnualIndex, Dataset, IndexMetadata, Mask, SpatialGrid, Threshold};
    pub use crate::errors::{ClimexError, Result};
    pub use crate::indices::catalog::{compute_all, compute_available, IndexKind};
    pub use crate::indices::diurnal::{Coverage, DtrStatistic};
    pub use crate::parallel::ParallelConfig;
    pub use crate::statistics::{AnnualReduction, StatOperation};
}
