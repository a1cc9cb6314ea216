use std::cmp::Ordering;

use tracing::debug;

use common::{round_dp, Signal, SignalBook, SignalMetrics, SymbolAggregate};

use crate::config::SignalThresholds;

const BUY_REASON: &str = "Liquid + positive momentum + consistent trading";

/// Everything the classifier needs to know about one symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolInputs {
    pub aggregate: SymbolAggregate,
    /// Windowed average daily value over the 5 most recent trading dates.
    pub avg_value_5d: f64,
    /// Windowed average daily value over the 30 most recent trading dates.
    pub avg_value_30d: f64,
    /// Percent change from the earliest to the latest price, if known.
    pub price_change_pct: Option<f64>,
}

/// Derived per-symbol figures, unrounded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SymbolMetrics {
    pub avg_daily_value: f64,
    pub consistency: f64,
    pub momentum_ratio: f64,
    pub price_change_pct: Option<f64>,
    pub pump_share: f64,
}

impl SymbolMetrics {
    /// Derive metrics for a symbol over a period of `period_days` trading
    /// dates. Returns `None` when the period is empty.
    pub fn derive(input: &SymbolInputs, period_days: i64) -> Option<Self> {
        if period_days <= 0 {
            return None;
        }
        let agg = &input.aggregate;
        let period = period_days as f64;

        let avg_daily_value = agg.total_value / period;
        let consistency = agg.traded_days as f64 / period;

        // no usable long-window base: fall back to the period average, floored at 1
        let base = if input.avg_value_30d > 0.0 {
            input.avg_value_30d
        } else {
            avg_daily_value.max(1.0)
        };
        let momentum_ratio = input.avg_value_5d / base;

        let pump_share = if agg.total_value > 0.0 {
            agg.max_day_value / agg.total_value
        } else {
            0.0
        };

        Some(Self {
            avg_daily_value,
            consistency,
            momentum_ratio,
            price_change_pct: input.price_change_pct,
            pump_share,
        })
    }
}

/// Outcome of each buy criterion. A buy needs all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuyChecks {
    pub liquidity: bool,
    pub momentum: bool,
    pub consistency: bool,
    /// True for a missing price trend: no trend does not veto a buy.
    pub price_up: bool,
}

impl BuyChecks {
    pub fn all(&self) -> bool {
        self.liquidity && self.momentum && self.consistency && self.price_up
    }
}

/// Outcome of each sell criterion. Any one of them is enough.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SellChecks {
    pub illiquid: bool,
    pub negative_momentum: bool,
    /// Never true for a missing price trend.
    pub price_down: bool,
    pub pump_risk: bool,
}

impl SellChecks {
    pub fn any(&self) -> bool {
        self.illiquid || self.negative_momentum || self.price_down || self.pump_risk
    }

    pub fn labels(&self) -> Vec<&'static str> {
        [
            (self.illiquid, "Illiquid"),
            (self.negative_momentum, "Negative momentum"),
            (self.price_down, "Price down"),
            (self.pump_risk, "Pump-like concentration"),
        ]
        .into_iter()
        .filter_map(|(hit, label)| hit.then_some(label))
        .collect()
    }
}

/// Stateless buy/sell classifier over per-symbol aggregates.
#[derive(Debug, Clone, Default)]
pub struct SignalClassifier {
    thresholds: SignalThresholds,
}

impl SignalClassifier {
    pub fn new(thresholds: SignalThresholds) -> Self {
        Self { thresholds }
    }

    pub fn buy_checks(&self, m: &SymbolMetrics) -> BuyChecks {
        let t = &self.thresholds;
        BuyChecks {
            liquidity: m.avg_daily_value >= t.liquidity_floor,
            momentum: m.momentum_ratio >= t.momentum_up_ratio,
            consistency: m.consistency >= t.min_consistency,
            price_up: m.price_change_pct.map_or(true, |p| p >= t.price_up_pct),
        }
    }

    pub fn sell_checks(&self, m: &SymbolMetrics) -> SellChecks {
        let t = &self.thresholds;
        SellChecks {
            illiquid: m.avg_daily_value < t.illiquidity_ceiling,
            negative_momentum: m.momentum_ratio <= t.momentum_down_ratio,
            price_down: m.price_change_pct.is_some_and(|p| p <= t.price_down_pct),
            pump_risk: m.pump_share >= t.pump_share,
        }
    }

    /// Classify one symbol. A symbol may produce both a buy and a sell.
    pub fn evaluate(&self, input: &SymbolInputs, period_days: i64) -> (Option<Signal>, Option<Signal>) {
        let Some(m) = SymbolMetrics::derive(input, period_days) else {
            return (None, None);
        };

        let metrics = SignalMetrics {
            symbol: input.aggregate.symbol.clone(),
            avg_daily_value: round_dp(m.avg_daily_value, 2),
            momentum_ratio: round_dp(m.momentum_ratio, 2),
            traded_days: input.aggregate.traded_days,
            period_days,
            price_change_pct: m.price_change_pct.map(|p| round_dp(p, 2)),
        };

        let buy = self.buy_checks(&m).all().then(|| {
            let mut reason = BUY_REASON.to_string();
            if m.price_change_pct.is_some() {
                reason.push_str(" + price up");
            }
            Signal::Buy {
                metrics: metrics.clone(),
                reason,
            }
        });

        let sell_checks = self.sell_checks(&m);
        let sell = sell_checks.any().then(|| Signal::Sell {
            metrics,
            pump_share: round_dp(m.pump_share, 2),
            reason: sell_checks.labels().join(" + "),
        });

        (buy, sell)
    }

    /// Classify every symbol and return both lists in ranking order.
    pub fn classify(&self, inputs: &[SymbolInputs], period_days: i64) -> SignalBook {
        let mut book = SignalBook::default();
        if period_days <= 0 {
            return book;
        }

        for input in inputs {
            let (buy, sell) = self.evaluate(input, period_days);
            book.buy.extend(buy);
            book.sell.extend(sell);
        }

        book.buy.sort_by(buy_order);
        book.sell.sort_by(sell_order);
        debug!(buy = book.buy.len(), sell = book.sell.len(), "Signals classified");
        book
    }
}

/// Momentum descending, then average daily value descending.
fn buy_order(a: &Signal, b: &Signal) -> Ordering {
    let (ma, mb) = (a.metrics(), b.metrics());
    mb.momentum_ratio
        .total_cmp(&ma.momentum_ratio)
        .then_with(|| mb.avg_daily_value.total_cmp(&ma.avg_daily_value))
        .then_with(|| ma.symbol.cmp(&mb.symbol))
}

/// Pump share descending, then average daily value ascending (most illiquid first).
fn sell_order(a: &Signal, b: &Signal) -> Ordering {
    let (pa, pb) = (a.pump_share().unwrap_or(0.0), b.pump_share().unwrap_or(0.0));
    let (ma, mb) = (a.metrics(), b.metrics());
    pb.total_cmp(&pa)
        .then_with(|| ma.avg_daily_value.total_cmp(&mb.avg_daily_value))
        .then_with(|| ma.symbol.cmp(&mb.symbol))
}

/// The first `n` signals of each list, as a forward-looking shortlist.
pub fn shortlist(book: &SignalBook, n: usize) -> SignalBook {
    SignalBook {
        buy: book.buy.iter().take(n).cloned().collect(),
        sell: book.sell.iter().take(n).cloned().collect(),
    }
}
