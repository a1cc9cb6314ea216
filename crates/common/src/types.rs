use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Sector label used for records that carry no sector.
pub const UNKNOWN_SECTOR: &str = "(UNKNOWN)";

/// One canonical daily trade row, as persisted in the trade store.
///
/// Records are created in bulk by ingestion and never updated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub trade_date: NaiveDate,
    /// Upper-cased ticker symbol.
    pub symbol: String,
    /// Upper-cased sector, `None` when neither the file nor the upload supplied one.
    pub sector: Option<String>,
    pub volume: Option<i64>,
    /// Traded turnover for the row.
    pub value: Option<f64>,
    /// Closing / reference price.
    pub price: Option<f64>,
    pub vwap: Option<f64>,
    /// 1-based position of the data row in the originating file.
    pub source_row: i64,
    /// Original row fields as a JSON array of strings.
    pub raw_json: String,
}

impl TradeRecord {
    /// Minimal record for a symbol on a date, all optional fields empty.
    pub fn new(trade_date: NaiveDate, symbol: impl Into<String>) -> Self {
        Self {
            trade_date,
            symbol: symbol.into(),
            sector: None,
            volume: None,
            value: None,
            price: None,
            vwap: None,
            source_row: 0,
            raw_json: "[]".to_string(),
        }
    }
}

/// Query-scoped narrowing applied uniformly to every read.
/// `None` on a field means no constraint on that dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub symbol: Option<String>,
    pub sector: Option<String>,
}

impl Filter {
    /// Build a filter from user input. Symbol and sector are trimmed and
    /// upper-cased; blank strings count as absent.
    pub fn new(
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        symbol: Option<&str>,
        sector: Option<&str>,
    ) -> Self {
        Self {
            start_date,
            end_date,
            symbol: symbol.and_then(normalize_label),
            sector: sector.and_then(normalize_label),
        }
    }

    /// Filter matching every row of one symbol.
    pub fn for_symbol(symbol: &str) -> Self {
        Self {
            symbol: normalize_label(symbol),
            ..Self::default()
        }
    }

    /// Same filter with the symbol dimension dropped.
    pub fn without_symbol(&self) -> Self {
        Self {
            symbol: None,
            ..self.clone()
        }
    }

    pub fn matches(&self, record: &TradeRecord) -> bool {
        if self.start_date.is_some_and(|d| record.trade_date < d) {
            return false;
        }
        if self.end_date.is_some_and(|d| record.trade_date > d) {
            return false;
        }
        if let Some(symbol) = &self.symbol {
            if &record.symbol != symbol {
                return false;
            }
        }
        if let Some(sector) = &self.sector {
            if record.sector.as_ref() != Some(sector) {
                return false;
            }
        }
        true
    }
}

/// Trim and upper-case a symbol or sector label. Returns `None` for blanks.
pub fn normalize_label(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_uppercase())
    }
}

/// Headline figures for a filtered record set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Kpis {
    pub total_volume: i64,
    pub total_value: f64,
    pub trading_days: i64,
    pub distinct_symbols: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyAggregate {
    pub trade_date: NaiveDate,
    pub volume: i64,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolVolume {
    pub symbol: String,
    pub volume: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolValue {
    pub symbol: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorAggregate {
    pub sector: String,
    pub volume: i64,
    pub value: f64,
}

/// Per-symbol totals over the filtered record set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolAggregate {
    pub symbol: String,
    /// Distinct dates on which the symbol has at least one row.
    pub traded_days: i64,
    pub total_value: f64,
    pub total_volume: i64,
    /// Mean of the non-null prices, `None` when the symbol has no priced row.
    pub avg_price: Option<f64>,
    /// Largest single-day summed value.
    pub max_day_value: f64,
}

/// Date bounds spanned by the K most recent distinct trading dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradingWindow {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl TradingWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }
}

/// Side requested in a calculator call. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeType {
    #[default]
    Buy,
    Sell,
}

impl TradeType {
    /// Anything other than "sell" (case-insensitive) is a buy.
    pub fn parse_lenient(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("sell") {
            TradeType::Sell
        } else {
            TradeType::Buy
        }
    }
}

impl std::fmt::Display for TradeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradeType::Buy => write!(f, "buy"),
            TradeType::Sell => write!(f, "sell"),
        }
    }
}

/// Figures shared by both signal sides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalMetrics {
    pub symbol: String,
    pub avg_daily_value: f64,
    pub momentum_ratio: f64,
    pub traded_days: i64,
    pub period_days: i64,
    pub price_change_pct: Option<f64>,
}

/// Heuristic classification emitted for a symbol. Recomputed on every query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "side", rename_all = "lowercase")]
pub enum Signal {
    Buy {
        #[serde(flatten)]
        metrics: SignalMetrics,
        reason: String,
    },
    Sell {
        #[serde(flatten)]
        metrics: SignalMetrics,
        pump_share: f64,
        reason: String,
    },
}

impl Signal {
    pub fn metrics(&self) -> &SignalMetrics {
        match self {
            Signal::Buy { metrics, .. } | Signal::Sell { metrics, .. } => metrics,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.metrics().symbol
    }

    pub fn reason(&self) -> &str {
        match self {
            Signal::Buy { reason, .. } | Signal::Sell { reason, .. } => reason,
        }
    }

    /// Pump share of a sell signal; buys carry none.
    pub fn pump_share(&self) -> Option<f64> {
        match self {
            Signal::Buy { .. } => None,
            Signal::Sell { pump_share, .. } => Some(*pump_share),
        }
    }
}

/// Buy and sell lists produced by one classification pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalBook {
    pub buy: Vec<Signal>,
    pub sell: Vec<Signal>,
}

/// Round half away from zero to `decimals` places.
pub fn round_dp(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn filter_normalizes_labels() {
        let f = Filter::new(None, None, Some("  abc "), Some(""));
        assert_eq!(f.symbol.as_deref(), Some("ABC"));
        assert!(f.sector.is_none());
    }

    #[test]
    fn filter_bounds_are_inclusive() {
        let f = Filter::new(Some(date("2024-01-02")), Some(date("2024-01-03")), None, None);
        assert!(!f.matches(&TradeRecord::new(date("2024-01-01"), "A")));
        assert!(f.matches(&TradeRecord::new(date("2024-01-02"), "A")));
        assert!(f.matches(&TradeRecord::new(date("2024-01-03"), "A")));
        assert!(!f.matches(&TradeRecord::new(date("2024-01-04"), "A")));
    }

    #[test]
    fn sector_filter_excludes_unknown_sector() {
        let f = Filter::new(None, None, None, Some("banks"));
        let mut rec = TradeRecord::new(date("2024-01-01"), "A");
        assert!(!f.matches(&rec));
        rec.sector = Some("BANKS".into());
        assert!(f.matches(&rec));
    }

    #[test]
    fn without_symbol_keeps_other_dimensions() {
        let f = Filter::new(Some(date("2024-01-01")), None, Some("xyz"), Some("tech"));
        let g = f.without_symbol();
        assert!(g.symbol.is_none());
        assert_eq!(g.sector.as_deref(), Some("TECH"));
        assert_eq!(g.start_date, f.start_date);
    }

    #[test]
    fn trade_type_defaults_to_buy() {
        assert_eq!(TradeType::parse_lenient("SELL"), TradeType::Sell);
        assert_eq!(TradeType::parse_lenient("hold"), TradeType::Buy);
    }

    #[test]
    fn signal_serializes_with_side_tag() {
        let sig = Signal::Sell {
            metrics: SignalMetrics {
                symbol: "ABC".into(),
                avg_daily_value: 10.0,
                momentum_ratio: 0.5,
                traded_days: 1,
                period_days: 2,
                price_change_pct: None,
            },
            pump_share: 0.9,
            reason: "Illiquid".into(),
        };
        let json = serde_json::to_value(&sig).unwrap();
        assert_eq!(json["side"], "sell");
        assert_eq!(json["symbol"], "ABC");
        assert_eq!(json["pump_share"], 0.9);
        assert!(json["price_change_pct"].is_null());
    }

    #[test]
    fn round_dp_rounds_half_away_from_zero() {
        assert_eq!(round_dp(2.5, 0), 3.0);
        assert_eq!(round_dp(-2.5, 0), -3.0);
        assert_eq!(round_dp(83.333_333, 2), 83.33);
    }
}
