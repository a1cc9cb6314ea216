use serde::{Serialize, Serializer};
use tracing::{debug, info};

use common::{
    DailyAggregate, Filter, Kpis, Result, SectorAggregate, Signal, SignalBook, SymbolValue,
    SymbolVolume, TradeRecord, TradeStore, TradingWindow,
};
use signals::{shortlist, SignalClassifier, SignalThresholds, SymbolInputs};

use crate::aggregation::{self, TOP_N};
use crate::momentum::{self, LONG_WINDOW_DAYS, SHORT_WINDOW_DAYS};

/// Number of signals of each side carried into the forecast.
pub const FORECAST_SIZE: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Windows {
    #[serde(serialize_with = "window_or_blank")]
    pub d5: Option<TradingWindow>,
    #[serde(serialize_with = "window_or_blank")]
    pub d30: Option<TradingWindow>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Forecast {
    pub predicted_buys: Vec<Signal>,
    pub predicted_sells: Vec<Signal>,
}

/// Everything the dashboard shows for one filter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsReport {
    pub kpis: Kpis,
    pub daily: Vec<DailyAggregate>,
    pub top_volume: Vec<SymbolVolume>,
    pub top_value: Vec<SymbolValue>,
    pub sectors: Vec<SectorAggregate>,
    /// Every symbol under the filter with its symbol dimension removed.
    pub symbols: Vec<String>,
    pub windows: Windows,
    pub signals: SignalBook,
    pub forecast: Forecast,
}

fn window_or_blank<S: Serializer>(window: &Option<TradingWindow>, s: S) -> std::result::Result<S::Ok, S::Error> {
    #[derive(Serialize)]
    struct Blank {
        start_date: &'static str,
        end_date: &'static str,
    }
    match window {
        Some(w) => w.serialize(s),
        None => Blank {
            start_date: "",
            end_date: "",
        }
        .serialize(s),
    }
}

/// Run the full analytics pass for `filter` against `store`.
pub async fn run_query(
    store: &dyn TradeStore,
    filter: &Filter,
    thresholds: &SignalThresholds,
) -> Result<AnalyticsReport> {
    let records = store.query_filtered(filter).await?;

    let symbols = if filter.symbol.is_some() {
        let unscoped = store.query_filtered(&filter.without_symbol()).await?;
        aggregation::distinct_symbols(&unscoped)
    } else {
        aggregation::distinct_symbols(&records)
    };

    let report = build_report(&records, symbols, thresholds);
    info!(
        records = records.len(),
        trading_days = report.kpis.trading_days,
        buys = report.signals.buy.len(),
        sells = report.signals.sell.len(),
        "Analytics query complete"
    );
    Ok(report)
}

/// Assemble a report from an already filtered, ordered record set.
pub fn build_report(records: &[TradeRecord], symbols: Vec<String>, thresholds: &SignalThresholds) -> AnalyticsReport {
    let kpis = aggregation::kpis(records);

    let windows = Windows {
        d5: momentum::trading_window(records, SHORT_WINDOW_DAYS),
        d30: momentum::trading_window(records, LONG_WINDOW_DAYS),
    };
    debug!(d5 = ?windows.d5, d30 = ?windows.d30, "Trading windows resolved");

    let histories = momentum::histories(records);
    let inputs: Vec<SymbolInputs> = aggregation::symbol_aggregates(records)
        .into_iter()
        .map(|aggregate| {
            let history = histories.get(&aggregate.symbol).cloned().unwrap_or_default();
            SymbolInputs {
                avg_value_5d: history.windowed_avg_value(windows.d5.as_ref()),
                avg_value_30d: history.windowed_avg_value(windows.d30.as_ref()),
                price_change_pct: history.price_change_pct(),
                aggregate,
            }
        })
        .collect();

    let signals = SignalClassifier::new(thresholds.clone()).classify(&inputs, kpis.trading_days);
    let top = shortlist(&signals, FORECAST_SIZE);

    AnalyticsReport {
        daily: aggregation::daily(records),
        top_volume: aggregation::top_by_volume(records, TOP_N),
        top_value: aggregation::top_by_value(records, TOP_N),
        sectors: aggregation::sectors(records),
        symbols,
        windows,
        forecast: Forecast {
            predicted_buys: top.buy,
            predicted_sells: top.sell,
        },
        signals,
        kpis,
    }
}
