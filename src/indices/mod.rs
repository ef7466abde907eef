//! ETCCDI climate extreme indices
//!
//! Each index function reads variables from a [`Dataset`] by the names in
//! [`IndexConfig::variables`], groups the time axis by calendar year and
//! returns a freshly allocated [`AnnualIndex`]. Inputs are never modified.
//!
//! - [`precipitation`]: RX1D, RX5D, quantile thresholds, PR/N/P exceedance
//!   indices, NWD, R{n}mm, PTOT, SDII, CDD, CWD
//! - [`temperature`]: TNX, TNN, TXX, TXN, FD, ID, TR, SU and percentile counts
//! - [`diurnal`]: DTRX, DTRN, DTRM over the full grid or under a mask
//! - [`catalog`]: [`IndexKind`](catalog::IndexKind) for batch computation

pub mod catalog;
pub mod diurnal;
pub mod precipitation;
pub mod temperature;

use crate::config::IndexConfig;
use crate::dataset::{AnnualIndex, Dataset, IndexMetadata, Threshold};
use crate::errors::{ClimexError, Result};
use crate::statistics::{quantile_over_time, reduce_groups};
use ndarray::{Array3, ArrayView1, ArrayView3, Axis};

/// Reduce `series` (shaped like the dataset's variables) per calendar year.
pub(crate) fn reduce_series<F>(
    ds: &Dataset,
    series: ArrayView3<'_, f64>,
    cfg: &IndexConfig,
    reducer: F,
) -> (Vec<i32>, Array3<f64>)
where
    F: Fn(ArrayView1<'_, f64>) -> f64 + Send + Sync,
{
    let groups = ds.year_groups();
    let data = reduce_groups(series, &groups, cfg.parallel.enabled, reducer);
    (groups.years(), data)
}

/// Look up `var`, reduce it per year and wrap the result as `name`.
pub(crate) fn annual_index<F>(
    ds: &Dataset,
    var: &str,
    name: &str,
    metadata: IndexMetadata,
    cfg: &IndexConfig,
    reducer: F,
) -> Result<AnnualIndex>
where
    F: Fn(ArrayView1<'_, f64>) -> f64 + Send + Sync,
{
    let series = ds.variable(var)?;
    tracing::debug!(
        index = name,
        variable = var,
        cells = ds.grid().len(),
        steps = ds.time().len(),
        "computing annual index"
    );
    let (years, data) = reduce_series(ds, series, cfg, reducer);
    Ok(AnnualIndex::new(name, years, ds.grid().clone(), data, metadata))
}

/// Per-cell quantile of `var` over the reference period, pooling the
/// reference-period days of every member.
pub(crate) fn quantile_threshold<P>(
    members: &[&Dataset],
    var: &str,
    q: f64,
    keep: P,
    name: String,
    metadata: IndexMetadata,
    cfg: &IndexConfig,
) -> Result<Threshold>
where
    P: Fn(f64) -> bool + Send + Sync,
{
    if !(0.0..=1.0).contains(&q) {
        return Err(ClimexError::InvalidQuantile { q });
    }
    let Some(first) = members.first() else {
        return Err(ClimexError::EmptyReferencePeriod {
            start: cfg.reference.start,
            end: cfg.reference.end,
        });
    };

    let mut selected = Vec::with_capacity(members.len());
    for member in members {
        first.grid().ensure_same("ensemble member grid", member.grid())?;
        let indices = member.period_indices(&cfg.reference);
        selected.push(member.variable(var)?.select(Axis(0), &indices));
    }

    let steps: usize = selected.iter().map(|a| a.len_of(Axis(0))).sum();
    if steps == 0 {
        return Err(ClimexError::EmptyReferencePeriod {
            start: cfg.reference.start,
            end: cfg.reference.end,
        });
    }
    tracing::debug!(
        threshold = %name,
        variable = var,
        quantile = q,
        members = members.len(),
        steps,
        "computing quantile threshold"
    );

    let views: Vec<ArrayView3<'_, f64>> = selected.iter().map(|a| a.view()).collect();
    let data = quantile_over_time(&views, q, keep, cfg.parallel.enabled);
    Ok(Threshold::from_array(name, q, first.grid().clone(), data)?.with_metadata(metadata))
}

/// 1.0 where `condition` holds, else 0.0.
pub(crate) fn indicator(condition: bool) -> f64 {
    if condition {
        1.0
    } else {
        0.0
    }
}
