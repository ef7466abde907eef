//! Temperature extreme indices
//!
//! Daily minimum and maximum temperature in deg C, read from
//! `cfg.variables.tmin` and `cfg.variables.tmax`. Percentile-based indices
//! take a [`TemperatureRole`] instead of deriving the variable from its name,
//! and leave naming of their outputs to the caller.

use super::{annual_index, indicator, quantile_threshold, reduce_series};
use crate::config::{IndexConfig, TemperatureRole};
use crate::dataset::{percent_label, AnnualIndex, Dataset, IndexMetadata, Threshold};
use crate::errors::Result;
use crate::statistics::{combine_with_threshold, lane_count, StatOperation};

/// Default quantile for warm-tail temperature thresholds.
pub const DEFAULT_TEMPERATURE_QUANTILE: f64 = 0.9;

/// Frost (Tn) and ice (Tx) days: below this, deg C.
pub const FREEZING_C: f64 = 0.0;

/// Tropical nights: Tn above this, deg C.
pub const TROPICAL_NIGHT_C: f64 = 20.0;

/// Summer days: Tx above this, deg C.
pub const SUMMER_DAY_C: f64 = 25.0;

/// Warmest night, annual maximum of daily minimum temperature (TNX).
pub fn warmest_night(ds: &Dataset, cfg: &IndexConfig) -> Result<AnnualIndex> {
    annual_index(
        ds,
        &cfg.variables.tmin,
        "TNX",
        IndexMetadata::new("deg C", "Maximum Annual Daily Minimum Temperature"),
        cfg,
        |lane| StatOperation::Max.apply(lane),
    )
}

/// Coolest night, annual minimum of daily minimum temperature (TNN).
pub fn coolest_night(ds: &Dataset, cfg: &IndexConfig) -> Result<AnnualIndex> {
    annual_index(
        ds,
        &cfg.variables.tmin,
        "TNN",
        IndexMetadata::new("deg C", "Minimum Annual Daily Minimum Temperature"),
        cfg,
        |lane| StatOperation::Min.apply(lane),
    )
}

/// Warmest day, annual maximum of daily maximum temperature (TXX).
pub fn warmest_day(ds: &Dataset, cfg: &IndexConfig) -> Result<AnnualIndex> {
    annual_index(
        ds,
        &cfg.variables.tmax,
        "TXX",
        IndexMetadata::new("deg C", "Maximum Annual Daily Maximum Temperature"),
        cfg,
        |lane| StatOperation::Max.apply(lane),
    )
}

/// Coolest day, annual minimum of daily maximum temperature (TXN).
pub fn coolest_day(ds: &Dataset, cfg: &IndexConfig) -> Result<AnnualIndex> {
    annual_index(
        ds,
        &cfg.variables.tmax,
        "TXN",
        IndexMetadata::new("deg C", "Minimum Annual Daily Maximum Temperature"),
        cfg,
        |lane| StatOperation::Min.apply(lane),
    )
}

/// Frost days, Tn < 0 C (FD).
pub fn frost_days(ds: &Dataset, cfg: &IndexConfig) -> Result<AnnualIndex> {
    annual_index(
        ds,
        &cfg.variables.tmin,
        "FD",
        IndexMetadata::new("days", "Frost Days; Tn less than 0C"),
        cfg,
        |lane| lane_count(lane, |t| t < FREEZING_C),
    )
}

/// Ice days, Tx < 0 C (ID).
pub fn ice_days(ds: &Dataset, cfg: &IndexConfig) -> Result<AnnualIndex> {
    annual_index(
        ds,
        &cfg.variables.tmax,
        "ID",
        IndexMetadata::new("days", "Ice Days; Tx less than 0C"),
        cfg,
        |lane| lane_count(lane, |t| t < FREEZING_C),
    )
}

/// Tropical nights, Tn > 20 C (TR).
pub fn tropical_nights(ds: &Dataset, cfg: &IndexConfig) -> Result<AnnualIndex> {
    annual_index(
        ds,
        &cfg.variables.tmin,
        "TR",
        IndexMetadata::new("days", "Tropical Nights; Tn greater than 20C"),
        cfg,
        |lane| lane_count(lane, |t| t > TROPICAL_NIGHT_C),
    )
}

/// Summer days, Tx > 25 C (SU).
pub fn summer_days(ds: &Dataset, cfg: &IndexConfig) -> Result<AnnualIndex> {
    annual_index(
        ds,
        &cfg.variables.tmax,
        "SU",
        IndexMetadata::new("days", "Summer Days; Tx greater than 25C"),
        cfg,
        |lane| lane_count(lane, |t| t > SUMMER_DAY_C),
    )
}

/// `q`-th quantile of the role's temperature over the reference period.
///
/// The output is named `name`; [`TemperatureRole::code`] is available for
/// callers that build ETCCDI-style names such as `QX90`.
///
/// # Errors
///
/// [`crate::ClimexError::InvalidQuantile`] for `q` outside `[0, 1]`,
/// [`crate::ClimexError::EmptyReferencePeriod`] when no day falls inside
/// the reference period.
pub fn temperature_quantile_threshold(
    ds: &Dataset,
    role: TemperatureRole,
    q: f64,
    name: impl Into<String>,
    cfg: &IndexConfig,
) -> Result<Threshold> {
    temperature_quantile_threshold_pooled(&[ds], role, q, name, cfg)
}

/// Like [`temperature_quantile_threshold`], pooling the reference-period
/// days of several ensemble members.
pub fn temperature_quantile_threshold_pooled(
    members: &[&Dataset],
    role: TemperatureRole,
    q: f64,
    name: impl Into<String>,
    cfg: &IndexConfig,
) -> Result<Threshold> {
    let var = cfg.variables.temperature(role);
    let pct = percent_label(q);
    quantile_threshold(
        members,
        var,
        q,
        |_| true,
        name.into(),
        IndexMetadata::new(
            "deg C",
            format!("{pct}th percentile of {var} over the reference period"),
        ),
        cfg,
    )
}

/// Annual count of days where the role's temperature exceeds the threshold.
pub fn count_above_threshold(
    ds: &Dataset,
    role: TemperatureRole,
    threshold: &Threshold,
    name: impl Into<String>,
    cfg: &IndexConfig,
) -> Result<AnnualIndex> {
    let description = format!("Annual count of days above {}", threshold.name());
    threshold_count(
        ds,
        role,
        threshold,
        name.into(),
        description,
        cfg,
        |value, limit| indicator(value > limit),
    )
}

/// Annual count of days where the role's temperature is below the threshold.
pub fn count_below_threshold(
    ds: &Dataset,
    role: TemperatureRole,
    threshold: &Threshold,
    name: impl Into<String>,
    cfg: &IndexConfig,
) -> Result<AnnualIndex> {
    let description = format!("Annual count of days below {}", threshold.name());
    threshold_count(
        ds,
        role,
        threshold,
        name.into(),
        description,
        cfg,
        |value, limit| indicator(value < limit),
    )
}

fn threshold_count<F>(
    ds: &Dataset,
    role: TemperatureRole,
    threshold: &Threshold,
    name: String,
    description: String,
    cfg: &IndexConfig,
    compare: F,
) -> Result<AnnualIndex>
where
    F: Fn(f64, f64) -> f64,
{
    let var = cfg.variables.temperature(role);
    let series = ds.variable(var)?;
    ds.grid().ensure_same("threshold grid", threshold.grid())?;
    tracing::debug!(
        index = %name,
        variable = var,
        threshold = threshold.name(),
        "computing annual index"
    );

    let hits = combine_with_threshold(series, threshold.data(), compare)?;
    let (years, data) = reduce_series(ds, hits.view(), cfg, |lane| {
        StatOperation::Sum.apply(lane)
    });
    Ok(AnnualIndex::new(
        name,
        years,
        ds.grid().clone(),
        data,
        IndexMetadata::new("days", description),
    ))
}
