use std::collections::BTreeMap;

use chrono::NaiveDate;

use common::TradeRecord;

/// Upper bound on points used for the return estimate.
pub const MAX_SERIES_POINTS: usize = 90;
/// Below this many priced rows the VWAP series is used instead.
pub const MIN_PRICE_POINTS: usize = 10;
/// Below this many points the average return is taken as zero.
pub const MIN_SERIES_POINTS: usize = 5;
/// Single-day returns are clamped to this magnitude.
pub const RETURN_CLAMP: f64 = 0.20;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

/// Rows with a price, in record order.
pub fn price_points(records: &[TradeRecord]) -> Vec<PricePoint> {
    records
        .iter()
        .filter_map(|r| {
            r.price.map(|price| PricePoint {
                date: r.trade_date,
                price,
            })
        })
        .collect()
}

/// One `sum(value) / sum(volume)` point per date, ascending by date. Each
/// column is summed over the rows where it is present; dates with no value
/// or no positive volume yield no point.
pub fn vwap_points(records: &[TradeRecord]) -> Vec<PricePoint> {
    let mut by_date: BTreeMap<NaiveDate, (Option<f64>, i64)> = BTreeMap::new();
    for r in records {
        let entry = by_date.entry(r.trade_date).or_default();
        if let Some(value) = r.value {
            entry.0 = Some(entry.0.unwrap_or(0.0) + value);
        }
        entry.1 = entry.1.saturating_add(r.volume.unwrap_or(0));
    }
    by_date
        .into_iter()
        .filter_map(|(date, (value, volume))| {
            let value = value?;
            (volume > 0).then(|| PricePoint {
                date,
                price: value / volume as f64,
            })
        })
        .collect()
}

/// Latest usable price: the last priced row, else the latest VWAP point.
pub fn latest_price(records: &[TradeRecord]) -> Option<PricePoint> {
    price_points(records)
        .last()
        .copied()
        .filter(|p| p.price > 0.0)
        .or_else(|| vwap_points(records).last().copied().filter(|p| p.price > 0.0))
}

/// Chronological series for the return estimate, capped to the most recent
/// [`MAX_SERIES_POINTS`].
pub fn return_series(records: &[TradeRecord]) -> Vec<f64> {
    let mut points = price_points(records);
    if points.len() < MIN_PRICE_POINTS {
        points = vwap_points(records);
    }
    let skip = points.len().saturating_sub(MAX_SERIES_POINTS);
    points.into_iter().skip(skip).map(|p| p.price).collect()
}

/// Mean of clamped day-over-day returns. Zero for short series or when no
/// consecutive pair has two positive prices.
pub fn avg_daily_return(series: &[f64]) -> f64 {
    if series.len() < MIN_SERIES_POINTS {
        return 0.0;
    }
    let returns: Vec<f64> = series
        .windows(2)
        .filter(|w| w[0] > 0.0 && w[1] > 0.0)
        .map(|w| (w[1] / w[0] - 1.0).clamp(-RETURN_CLAMP, RETURN_CLAMP))
        .collect();
    if returns.is_empty() {
        return 0.0;
    }
    returns.iter().sum::<f64>() / returns.len() as f64
}
