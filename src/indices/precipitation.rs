//! Precipitation extreme indices
//!
//! Adapted from the climdex / xclim definitions of the ETCCDI precipitation
//! indices. Input is daily precipitation in mm/day under
//! `cfg.variables.precip`.

use super::{annual_index, indicator, quantile_threshold, reduce_series};
use crate::config::IndexConfig;
use crate::dataset::{percent_label, AnnualIndex, Dataset, IndexMetadata, Threshold};
use crate::errors::Result;
use crate::run_length::max_consecutive_where;
use crate::statistics::{combine_with_threshold, lane_count, rolling_sum, StatOperation};

/// Default quantile for the wet-day precipitation threshold.
pub const DEFAULT_PRECIP_QUANTILE: f64 = 0.95;

/// Window of the RX5D rolling total, in days.
pub const RX5DAY_WINDOW: usize = 5;

/// Heavy precipitation day, mm.
pub const HEAVY_RAIN_MM: f64 = 10.0;

/// Very heavy precipitation day, mm.
pub const VERY_HEAVY_RAIN_MM: f64 = 20.0;

/// Annual maximum 1-day precipitation (RX1D).
pub fn rx1day(ds: &Dataset, cfg: &IndexConfig) -> Result<AnnualIndex> {
    annual_index(
        ds,
        &cfg.variables.precip,
        "RX1D",
        IndexMetadata::new("mm", "Annual maximum 1-day precipitation"),
        cfg,
        |lane| StatOperation::Max.apply(lane),
    )
}

/// Annual maximum 5-day precipitation total (RX5D).
///
/// The trailing 5-day sum is taken over the whole series before grouping, so
/// a window ending on 3 January includes the last days of the previous year.
/// The first four steps of the series have no complete window.
pub fn rx5day(ds: &Dataset, cfg: &IndexConfig) -> Result<AnnualIndex> {
    let var = &cfg.variables.precip;
    let series = ds.variable(var)?;
    tracing::debug!(index = "RX5D", variable = %var, window = RX5DAY_WINDOW, "computing annual index");

    let totals = rolling_sum(series, RX5DAY_WINDOW, cfg.parallel.enabled)?;
    let (years, data) = reduce_series(ds, totals.view(), cfg, |lane| {
        StatOperation::Max.apply(lane)
    });
    Ok(AnnualIndex::new(
        "RX5D",
        years,
        ds.grid().clone(),
        data,
        IndexMetadata::new("mm", "Annual maximum consecutive 5-day precipitation"),
    ))
}

/// `q`-th quantile of wet-day precipitation over the reference period
/// (`Q{pp}`, e.g. `Q95`).
///
/// Only days with precipitation strictly above `cfg.wet_day_mm` enter the
/// quantile. Cells without such days are `NaN`.
///
/// # Errors
///
/// [`crate::ClimexError::InvalidQuantile`] for `q` outside `[0, 1]`,
/// [`crate::ClimexError::EmptyReferencePeriod`] when no day falls inside
/// the reference period.
pub fn precip_quantile_threshold(ds: &Dataset, q: f64, cfg: &IndexConfig) -> Result<Threshold> {
    precip_quantile_threshold_pooled(&[ds], q, cfg)
}

/// Like [`precip_quantile_threshold`], pooling the reference-period days of
/// several ensemble members into one threshold per cell.
pub fn precip_quantile_threshold_pooled(
    members: &[&Dataset],
    q: f64,
    cfg: &IndexConfig,
) -> Result<Threshold> {
    let wet = cfg.wet_day_mm;
    let pct = percent_label(q);
    quantile_threshold(
        members,
        &cfg.variables.precip,
        q,
        move |v| v > wet,
        format!("Q{pct}"),
        IndexMetadata::new(
            "mm/day",
            format!("{pct}th percentile of wet-day precipitation over the reference period"),
        ),
        cfg,
    )
}

/// Annual precipitation from days above the per-cell threshold (`PR{pp}`).
pub fn annual_total_above(
    ds: &Dataset,
    threshold: &Threshold,
    cfg: &IndexConfig,
) -> Result<AnnualIndex> {
    let pct = threshold.percent();
    let name = format!("PR{pct}");
    exceedance_index(
        ds,
        threshold,
        &name,
        IndexMetadata::new(
            "mm",
            format!("Annual total precipitation from days above the {pct}th percentile"),
        ),
        cfg,
        |value, limit| if value > limit { value } else { 0.0 },
    )
}

/// Annual count of days above the per-cell threshold (`N{pp}`).
pub fn annual_count_above(
    ds: &Dataset,
    threshold: &Threshold,
    cfg: &IndexConfig,
) -> Result<AnnualIndex> {
    let pct = threshold.percent();
    let name = format!("N{pct}");
    exceedance_index(
        ds,
        threshold,
        &name,
        IndexMetadata::new(
            "days",
            format!("Annual count of days above the {pct}th percentile"),
        ),
        cfg,
        |value, limit| indicator(value > limit),
    )
}

/// Share of annual precipitation falling on days above the threshold
/// (`P{pp}tot` = `PR{pp}` / `PTOT`).
///
/// A year without precipitation gives `0 / 0 = NaN`.
pub fn proportion_above(
    ds: &Dataset,
    threshold: &Threshold,
    cfg: &IndexConfig,
) -> Result<AnnualIndex> {
    let above = annual_total_above(ds, threshold, cfg)?;
    let total = total_precip(ds, cfg)?;
    let pct = threshold.percent();
    above.ratio(
        &total,
        format!("P{pct}tot"),
        IndexMetadata::new(
            "1",
            format!("Fraction of annual precipitation from days above the {pct}th percentile"),
        ),
    )
}

/// Annual count of wet days, precipitation ≥ `cfg.wet_day_mm` (NWD).
pub fn wet_days(ds: &Dataset, cfg: &IndexConfig) -> Result<AnnualIndex> {
    let wet = cfg.wet_day_mm;
    annual_index(
        ds,
        &cfg.variables.precip,
        "NWD",
        IndexMetadata::new("days", format!("Number of wet days, precipitation >= {wet} mm")),
        cfg,
        move |lane| lane_count(lane, |x| x >= wet),
    )
}

/// Annual count of days with precipitation ≥ `mm` (`R{mm}mm`).
///
/// With `mm` equal to the wet-day threshold this is [`wet_days`] under
/// another name.
pub fn days_at_least(ds: &Dataset, mm: f64, cfg: &IndexConfig) -> Result<AnnualIndex> {
    let name = format!("R{mm}mm");
    annual_index(
        ds,
        &cfg.variables.precip,
        &name,
        IndexMetadata::new("days", format!("Annual count of days with precipitation >= {mm} mm")),
        cfg,
        move |lane| lane_count(lane, |x| x >= mm),
    )
}

/// Heavy precipitation days, ≥ 10 mm (R10mm).
pub fn heavy_rain_days(ds: &Dataset, cfg: &IndexConfig) -> Result<AnnualIndex> {
    days_at_least(ds, HEAVY_RAIN_MM, cfg)
}

/// Very heavy precipitation days, ≥ 20 mm (R20mm).
pub fn very_heavy_rain_days(ds: &Dataset, cfg: &IndexConfig) -> Result<AnnualIndex> {
    days_at_least(ds, VERY_HEAVY_RAIN_MM, cfg)
}

/// Annual total precipitation (PTOT).
pub fn total_precip(ds: &Dataset, cfg: &IndexConfig) -> Result<AnnualIndex> {
    annual_index(
        ds,
        &cfg.variables.precip,
        "PTOT",
        IndexMetadata::new("mm", "Annual total precipitation"),
        cfg,
        |lane| StatOperation::Sum.apply(lane),
    )
}

/// Simple daily intensity index, PTOT / NWD (SDII).
///
/// Years without wet days divide by zero: `NaN` when the year is dry,
/// infinite when all its precipitation fell on sub-threshold days.
pub fn sdii(ds: &Dataset, cfg: &IndexConfig) -> Result<AnnualIndex> {
    let total = total_precip(ds, cfg)?;
    let wet = wet_days(ds, cfg)?;
    total.ratio(
        &wet,
        "SDII",
        IndexMetadata::new("mm/day", "Simple daily intensity index"),
    )
}

/// Maximum number of consecutive dry days, precipitation ≤ `cfg.wet_day_mm` (CDD).
pub fn consecutive_dry_days(ds: &Dataset, cfg: &IndexConfig) -> Result<AnnualIndex> {
    let wet = cfg.wet_day_mm;
    annual_index(
        ds,
        &cfg.variables.precip,
        "CDD",
        IndexMetadata::new("days", "Maximum number of consecutive dry days"),
        cfg,
        move |lane| max_consecutive_where(lane, |x| x <= wet),
    )
}

/// Maximum number of consecutive wet days, precipitation ≥ `cfg.wet_day_mm` (CWD).
pub fn consecutive_wet_days(ds: &Dataset, cfg: &IndexConfig) -> Result<AnnualIndex> {
    let wet = cfg.wet_day_mm;
    annual_index(
        ds,
        &cfg.variables.precip,
        "CWD",
        IndexMetadata::new("days", "Maximum number of consecutive wet days"),
        cfg,
        move |lane| max_consecutive_where(lane, |x| x >= wet),
    )
}

/// Combine precipitation with a threshold day by day, then sum per year.
fn exceedance_index<F>(
    ds: &Dataset,
    threshold: &Threshold,
    name: &str,
    metadata: IndexMetadata,
    cfg: &IndexConfig,
    combine: F,
) -> Result<AnnualIndex>
where
    F: Fn(f64, f64) -> f64,
{
    let var = &cfg.variables.precip;
    let series = ds.variable(var)?;
    ds.grid().ensure_same("threshold grid", threshold.grid())?;
    tracing::debug!(
        index = name,
        variable = %var,
        threshold = threshold.name(),
        "computing annual index"
    );

    let combined = combine_with_threshold(series, threshold.data(), combine)?;
    let (years, data) = reduce_series(ds, combined.view(), cfg, |lane| {
        StatOperation::Sum.apply(lane)
    });
    Ok(AnnualIndex::new(name, years, ds.grid().clone(), data, metadata))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::SpatialGrid;
    use approx::assert_relative_eq;
    use chrono::{Duration, NaiveDate};
    use ndarray::Array3;

    fn one_cell(start: NaiveDate, values: &[f64]) -> Dataset {
        let time = (0..values.len())
            .map(|i| start + Duration::days(i as i64))
            .collect();
        let data = Array3::from_shape_vec((values.len(), 1, 1), values.to_vec()).unwrap();
        Dataset::new(time, SpatialGrid::new(vec![0.0], vec![0.0]))
            .with_variable("PRECT", data)
            .unwrap()
    }

    fn jan1(year: i32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, 1, 1).unwrap()
    }

    #[test]
    fn test_rx5day_crosses_year_boundary() {
        // 2000-12-29 .. 2001-01-04
        let start = NaiveDate::from_ymd_opt(2000, 12, 29).unwrap();
        let ds = one_cell(start, &[1.0, 1.0, 10.0, 10.0, 10.0, 0.0, 0.0]);
        let cfg = IndexConfig::default();
        let rx5 = rx5day(&ds, &cfg).unwrap();
        assert_eq!(rx5.years(), &[2000, 2001]);
        // No complete window ends in 2000
        assert!(rx5.get(2000, 0, 0).unwrap().is_nan());
        // Window ending 2001-01-02 spans 2000-12-29..: 1 + 1 + 10 + 10 + 10
        assert_eq!(rx5.get(2001, 0, 0), Some(32.0));
    }

    #[test]
    fn test_days_at_least_naming() {
        let ds = one_cell(jan1(2000), &[0.0, 10.0, 25.0, 9.9]);
        let cfg = IndexConfig::default();
        let r10 = heavy_rain_days(&ds, &cfg).unwrap();
        assert_eq!(r10.name(), "R10mm");
        assert_eq!(r10.get(2000, 0, 0), Some(2.0));
        let r20 = very_heavy_rain_days(&ds, &cfg).unwrap();
        assert_eq!(r20.name(), "R20mm");
        assert_eq!(r20.get(2000, 0, 0), Some(1.0));
        assert_eq!(days_at_least(&ds, 2.5, &cfg).unwrap().name(), "R2.5mm");
    }

    #[test]
    fn test_sdii_division_by_zero() {
        let mut values = vec![0.0; 366];
        values.extend([0.5, 0.5, 0.0]);
        // 2000 is all dry, 2001 has only sub-threshold drizzle
        let ds = one_cell(jan1(2000), &values);
        let cfg = IndexConfig::default();
        let index = sdii(&ds, &cfg).unwrap();
        assert!(index.get(2000, 0, 0).unwrap().is_nan());
        assert!(index.get(2001, 0, 0).unwrap().is_infinite());
    }

    #[test]
    fn test_sdii_value() {
        let ds = one_cell(jan1(2000), &[4.0, 0.0, 2.0, 0.5]);
        let cfg = IndexConfig::default();
        let index = sdii(&ds, &cfg).unwrap();
        assert_relative_eq!(index.get(2000, 0, 0).unwrap(), 6.5 / 2.0);
    }

    #[test]
    fn test_precip_quantile_is_strictly_above_wet_day() {
        let time_start = NaiveDate::from_ymd_opt(1990, 1, 1).unwrap();
        let ds = one_cell(time_start, &[1.0, 1.0, 1.0, 2.0, 4.0]);
        let cfg = IndexConfig::default();
        let q = precip_quantile_threshold(&ds, 0.5, &cfg).unwrap();
        assert_eq!(q.name(), "Q50");
        assert_eq!(q.data()[[0, 0]], 3.0);
        assert_eq!(q.metadata().unit, "mm/day");
    }

    #[test]
    fn test_precip_quantile_outside_reference() {
        let ds = one_cell(jan1(2050), &[5.0, 6.0]);
        let cfg = IndexConfig::default();
        assert!(matches!(
            precip_quantile_threshold(&ds, 0.95, &cfg),
            Err(crate::ClimexError::EmptyReferencePeriod { .. })
        ));
        assert!(matches!(
            precip_quantile_threshold(&ds, 95.0, &cfg),
            Err(crate::ClimexError::InvalidQuantile { .. })
        ));
    }

    #[test]
    fn test_missing_precip_variable() {
        let ds = Dataset::new(vec![jan1(2000)], SpatialGrid::new(vec![0.0], vec![0.0]));
        let cfg = IndexConfig::default();
        match rx1day(&ds, &cfg) {
            Err(crate::ClimexError::MissingVariable { var }) => assert_eq!(var, "PRECT"),
            other => panic!("Expected MissingVariable, got {other:?}"),
        }
    }
}
