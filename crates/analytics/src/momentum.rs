use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use common::{TradeRecord, TradingWindow};

pub const SHORT_WINDOW_DAYS: usize = 5;
pub const LONG_WINDOW_DAYS: usize = 30;

/// Bounds of the `k` most recent distinct trading dates. `None` when the
/// record set has no dates or `k` is zero.
pub fn trading_window(records: &[TradeRecord], k: usize) -> Option<TradingWindow> {
    let dates: BTreeSet<NaiveDate> = records.iter().map(|r| r.trade_date).collect();
    let mut recent = dates.into_iter().rev().take(k);
    let end_date = recent.next()?;
    let start_date = recent.last().unwrap_or(end_date);
    Some(TradingWindow {
        start_date,
        end_date,
    })
}

/// Daily value and price trail of one symbol, built from records ordered by
/// `(trade_date, source_row)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymbolHistory {
    daily_value: BTreeMap<NaiveDate, f64>,
    first_price: Option<f64>,
    last_price: Option<f64>,
    priced: usize,
}

impl SymbolHistory {
    pub fn push(&mut self, record: &TradeRecord) {
        *self.daily_value.entry(record.trade_date).or_default() += record.value.unwrap_or(0.0);
        if let Some(price) = record.price {
            if self.first_price.is_none() {
                self.first_price = Some(price);
            }
            self.last_price = Some(price);
            self.priced += 1;
        }
    }

    /// Mean of the summed daily value over the dates inside `window` on which
    /// the symbol traded. Zero when there are none.
    pub fn windowed_avg_value(&self, window: Option<&TradingWindow>) -> f64 {
        let Some(w) = window else {
            return 0.0;
        };
        let in_window: Vec<f64> = self
            .daily_value
            .range(w.start_date..=w.end_date)
            .map(|(_, v)| *v)
            .collect();
        if in_window.is_empty() {
            return 0.0;
        }
        in_window.iter().sum::<f64>() / in_window.len() as f64
    }

    /// Percent change from the earliest to the latest priced observation.
    pub fn price_change_pct(&self) -> Option<f64> {
        if self.priced < 2 {
            return None;
        }
        let (first, last) = (self.first_price?, self.last_price?);
        if first == 0.0 {
            return None;
        }
        Some((last - first) / first * 100.0)
    }
}

/// Group records by symbol. Input order is preserved within each symbol.
pub fn histories(records: &[TradeRecord]) -> BTreeMap<String, SymbolHistory> {
    let mut out: BTreeMap<String, SymbolHistory> = BTreeMap::new();
    for r in records {
        match out.get_mut(&r.symbol) {
            Some(h) => h.push(r),
            None => {
                let mut h = SymbolHistory::default();
                h.push(r);
                out.insert(r.symbol.clone(), h);
            }
        }
    }
    out
}

fn history_of(records: &[TradeRecord], symbol: &str) -> SymbolHistory {
    let mut h = SymbolHistory::default();
    records.iter().filter(|r| r.symbol == symbol).for_each(|r| h.push(r));
    h
}

pub fn windowed_avg_value(records: &[TradeRecord], symbol: &str, window: Option<&TradingWindow>) -> f64 {
    history_of(records, symbol).windowed_avg_value(window)
}

pub fn price_change_pct(records: &[TradeRecord], symbol: &str) -> Option<f64> {
    history_of(records, symbol).price_change_pct()
}
