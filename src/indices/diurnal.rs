//! Diurnal temperature range indices (DTRX, DTRN, DTRM)
//!
//! The input is a precomputed daily DTR field under `cfg.variables.dtr`;
//! [`derive_diurnal_range`] builds one from tmax and tmin when a dataset
//! lacks it. Both coverage variants return `(year, lat, lon)` arrays.

use super::reduce_series;
use crate::config::IndexConfig;
use crate::dataset::{AnnualIndex, Dataset, IndexMetadata, Mask};
use crate::errors::Result;
use crate::statistics::StatOperation;
use ndarray::Zip;

/// Annual statistic taken over the daily range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DtrStatistic {
    /// Largest range in the year (DTRX)
    Max,
    /// Smallest range in the year (DTRN)
    Min,
    /// Mean range over the year (DTRM)
    Mean,
}

impl DtrStatistic {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Max => "DTRX",
            Self::Min => "DTRN",
            Self::Mean => "DTRM",
        }
    }

    pub const fn operation(self) -> StatOperation {
        match self {
            Self::Max => StatOperation::Max,
            Self::Min => StatOperation::Min,
            Self::Mean => StatOperation::Mean,
        }
    }

    const fn description(self) -> &'static str {
        match self {
            Self::Max => "Maximum Annual Diurnal Temperature Range",
            Self::Min => "Minimum Annual Diurnal Temperature Range",
            Self::Mean => "Annual Mean Diurnal Temperature Range",
        }
    }
}

/// Which grid cells keep a value.
#[derive(Debug, Clone, Copy)]
pub enum Coverage<'a> {
    /// Every cell
    Full,
    /// Only cells active in the mask; the rest are `NaN`
    Masked(&'a Mask),
}

/// Annual `statistic` of the diurnal temperature range under `coverage`.
///
/// # Errors
///
/// [`crate::ClimexError::MissingVariable`] if the DTR variable is absent,
/// [`crate::ClimexError::ShapeMismatch`] if a mask does not match the grid.
pub fn diurnal_range(
    ds: &Dataset,
    statistic: DtrStatistic,
    coverage: Coverage<'_>,
    cfg: &IndexConfig,
) -> Result<AnnualIndex> {
    let var = &cfg.variables.dtr;
    let series = ds.variable(var)?;
    if let Coverage::Masked(mask) = coverage {
        ds.grid().ensure_same("mask grid", mask.grid())?;
    }
    tracing::debug!(
        index = statistic.name(),
        variable = %var,
        masked = matches!(coverage, Coverage::Masked(_)),
        "computing annual index"
    );

    let operation = statistic.operation();
    let (years, mut data) = reduce_series(ds, series, cfg, |lane| operation.apply(lane));

    if let Coverage::Masked(mask) = coverage {
        for year in data.outer_iter_mut() {
            Zip::from(year).and(mask.data()).for_each(|value, &active| {
                if !active {
                    *value = f64::NAN;
                }
            });
        }
    }

    Ok(AnnualIndex::new(
        statistic.name(),
        years,
        ds.grid().clone(),
        data,
        IndexMetadata::new("deg C", statistic.description()),
    ))
}

/// Largest diurnal range of each year (DTRX).
pub fn dtr_max(ds: &Dataset, coverage: Coverage<'_>, cfg: &IndexConfig) -> Result<AnnualIndex> {
    diurnal_range(ds, DtrStatistic::Max, coverage, cfg)
}

/// Smallest diurnal range of each year (DTRN).
pub fn dtr_min(ds: &Dataset, coverage: Coverage<'_>, cfg: &IndexConfig) -> Result<AnnualIndex> {
    diurnal_range(ds, DtrStatistic::Min, coverage, cfg)
}

/// Mean diurnal range of each year (DTRM).
pub fn dtr_mean(ds: &Dataset, coverage: Coverage<'_>, cfg: &IndexConfig) -> Result<AnnualIndex> {
    diurnal_range(ds, DtrStatistic::Mean, coverage, cfg)
}

/// Copy of `ds` with the DTR variable set to tmax − tmin.
///
/// # Errors
///
/// [`crate::ClimexError::MissingVariable`] if tmax or tmin is absent.
pub fn derive_diurnal_range(ds: &Dataset, cfg: &IndexConfig) -> Result<Dataset> {
    let tmax = ds.variable(&cfg.variables.tmax)?;
    let tmin = ds.variable(&cfg.variables.tmin)?;
    let range = &tmax - &tmin;
    ds.clone().with_variable(cfg.variables.dtr.clone(), range)
}
