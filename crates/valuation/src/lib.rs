pub mod series;

pub use series::{avg_daily_return, latest_price, return_series, PricePoint};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use common::{normalize_label, round_dp, Error, Filter, Result, TradeRecord, TradeStore, TradeType};

/// Trading days projected when the caller gives no duration.
pub const DEFAULT_DURATION: u32 = 30;
/// Longest accepted projection horizon, in trading days.
pub const MAX_DURATION: u32 = 3_650;

/// Calculator input.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProjectionRequest {
    pub symbol: String,
    pub amount: f64,
    pub duration: u32,
    pub trade_type: TradeType,
}

impl ProjectionRequest {
    /// Check the request and return the normalized symbol.
    fn validate(&self) -> Result<String> {
        let symbol = normalize_label(&self.symbol);
        let symbol = match symbol {
            Some(s) if self.amount.is_finite() && self.amount > 0.0 => s,
            _ => return Err(Error::Validation("Provide a valid symbol and positive amount.".into())),
        };
        if !(1..=MAX_DURATION).contains(&self.duration) {
            return Err(Error::Validation(format!(
                "Duration must be between 1 and {MAX_DURATION} trading days."
            )));
        }
        Ok(symbol)
    }
}

/// Projected value of a position held for `duration` trading days.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Projection {
    pub symbol: String,
    pub trade_type: TradeType,
    pub amount: f64,
    pub price_date: NaiveDate,
    pub price: f64,
    pub shares: f64,
    pub duration: u32,
    pub avg_daily_return: f64,
    pub projected_price: f64,
    pub projected_value: f64,
}

/// Project a position in `req.symbol` using its stored price history.
pub async fn project(store: &dyn TradeStore, req: &ProjectionRequest) -> Result<Projection> {
    let symbol = req.validate()?;
    let records = store.query_filtered(&Filter::for_symbol(&symbol)).await?;
    let projection = project_records(&symbol, &records, req)?;
    info!(
        symbol = %projection.symbol,
        trade_type = %projection.trade_type,
        price = projection.price,
        shares = projection.shares,
        avg_daily_return = projection.avg_daily_return,
        duration = projection.duration,
        "Projection computed"
    );
    Ok(projection)
}

/// `records` are the symbol's rows ordered by `(trade_date, source_row)`;
/// `req` has already been validated.
fn project_records(symbol: &str, records: &[TradeRecord], req: &ProjectionRequest) -> Result<Projection> {
    let current = latest_price(records)
        .ok_or_else(|| Error::DataUnavailable(format!("No usable price found for {symbol}")))?;

    let shares = (req.amount / current.price * 100.0).floor() / 100.0;
    if shares <= 0.0 {
        return Err(Error::Validation(
            "Amount too small relative to price. Increase amount.".into(),
        ));
    }

    let series = return_series(records);
    let r = avg_daily_return(&series);
    debug!(symbol, points = series.len(), avg_daily_return = r, "Return series resolved");

    let projected_price = if r == 0.0 {
        current.price
    } else {
        current.price * (1.0 + r).powi(req.duration as i32)
    };

    Ok(Projection {
        symbol: symbol.to_string(),
        trade_type: req.trade_type,
        amount: round_dp(req.amount, 2),
        price_date: current.date,
        price: round_dp(current.price, 4),
        shares,
        duration: req.duration,
        avg_daily_return: round_dp(r, 6),
        projected_price: round_dp(projected_price, 4),
        projected_value: round_dp(shares * projected_price, 2),
    })
}
