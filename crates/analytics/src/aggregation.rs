use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::NaiveDate;

use common::{
    DailyAggregate, Kpis, SectorAggregate, SymbolAggregate, SymbolValue, SymbolVolume, TradeRecord,
    UNKNOWN_SECTOR,
};

/// Size of the volume and value rankings.
pub const TOP_N: usize = 10;

/// Headline totals. Volume sums here and below saturate at `i64::MAX`.
pub fn kpis(records: &[TradeRecord]) -> Kpis {
    let mut dates = BTreeSet::new();
    let mut symbols = BTreeSet::new();
    let mut kpis = Kpis::default();

    for r in records {
        kpis.total_volume = kpis.total_volume.saturating_add(r.volume.unwrap_or(0));
        kpis.total_value += r.value.unwrap_or(0.0);
        dates.insert(r.trade_date);
        symbols.insert(r.symbol.as_str());
    }
    kpis.trading_days = dates.len() as i64;
    kpis.distinct_symbols = symbols.len() as i64;
    kpis
}

/// One row per distinct date, ascending.
pub fn daily(records: &[TradeRecord]) -> Vec<DailyAggregate> {
    let mut by_date: BTreeMap<NaiveDate, (i64, f64)> = BTreeMap::new();
    for r in records {
        let entry = by_date.entry(r.trade_date).or_default();
        entry.0 = entry.0.saturating_add(r.volume.unwrap_or(0));
        entry.1 += r.value.unwrap_or(0.0);
    }
    by_date
        .into_iter()
        .map(|(trade_date, (volume, value))| DailyAggregate {
            trade_date,
            volume,
            value,
        })
        .collect()
}

pub fn top_by_volume(records: &[TradeRecord], n: usize) -> Vec<SymbolVolume> {
    let mut totals: HashMap<&str, i64> = HashMap::new();
    for r in records {
        let total = totals.entry(r.symbol.as_str()).or_default();
        *total = total.saturating_add(r.volume.unwrap_or(0));
    }
    let mut ranked: Vec<SymbolVolume> = totals
        .into_iter()
        .map(|(symbol, volume)| SymbolVolume {
            symbol: symbol.to_string(),
            volume,
        })
        .collect();
    ranked.sort_by(|a, b| b.volume.cmp(&a.volume).then_with(|| a.symbol.cmp(&b.symbol)));
    ranked.truncate(n);
    ranked
}

pub fn top_by_value(records: &[TradeRecord], n: usize) -> Vec<SymbolValue> {
    let mut totals: HashMap<&str, f64> = HashMap::new();
    for r in records {
        *totals.entry(r.symbol.as_str()).or_default() += r.value.unwrap_or(0.0);
    }
    let mut ranked: Vec<SymbolValue> = totals
        .into_iter()
        .map(|(symbol, value)| SymbolValue {
            symbol: symbol.to_string(),
            value,
        })
        .collect();
    ranked.sort_by(|a, b| b.value.total_cmp(&a.value).then_with(|| a.symbol.cmp(&b.symbol)));
    ranked.truncate(n);
    ranked
}

/// Sector breakdown, descending by value. Records without a sector are
/// grouped under [`UNKNOWN_SECTOR`].
pub fn sectors(records: &[TradeRecord]) -> Vec<SectorAggregate> {
    let mut totals: HashMap<&str, (i64, f64)> = HashMap::new();
    for r in records {
        let label = r.sector.as_deref().unwrap_or(UNKNOWN_SECTOR);
        let entry = totals.entry(label).or_default();
        entry.0 = entry.0.saturating_add(r.volume.unwrap_or(0));
        entry.1 += r.value.unwrap_or(0.0);
    }
    let mut out: Vec<SectorAggregate> = totals
        .into_iter()
        .map(|(sector, (volume, value))| SectorAggregate {
            sector: sector.to_string(),
            volume,
            value,
        })
        .collect();
    out.sort_by(|a, b| b.value.total_cmp(&a.value).then_with(|| a.sector.cmp(&b.sector)));
    out
}

/// Distinct symbols, ascending.
pub fn distinct_symbols(records: &[TradeRecord]) -> Vec<String> {
    records
        .iter()
        .map(|r| r.symbol.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

#[derive(Default)]
struct SymbolAccumulator {
    daily_value: BTreeMap<NaiveDate, f64>,
    total_volume: i64,
    price_sum: f64,
    priced_rows: usize,
}

/// Per-symbol totals, sorted by symbol.
pub fn symbol_aggregates(records: &[TradeRecord]) -> Vec<SymbolAggregate> {
    let mut by_symbol: BTreeMap<&str, SymbolAccumulator> = BTreeMap::new();
    for r in records {
        let acc = by_symbol.entry(r.symbol.as_str()).or_default();
        *acc.daily_value.entry(r.trade_date).or_default() += r.value.unwrap_or(0.0);
        acc.total_volume = acc.total_volume.saturating_add(r.volume.unwrap_or(0));
        if let Some(price) = r.price {
            acc.price_sum += price;
            acc.priced_rows += 1;
        }
    }

    by_symbol
        .into_iter()
        .map(|(symbol, acc)| SymbolAggregate {
            symbol: symbol.to_string(),
            traded_days: acc.daily_value.len() as i64,
            total_value: acc.daily_value.values().sum(),
            total_volume: acc.total_volume,
            avg_price: (acc.priced_rows > 0).then(|| acc.price_sum / acc.priced_rows as f64),
            max_day_value: acc.daily_value.values().copied().fold(0.0, f64::max),
        })
        .collect()
}
