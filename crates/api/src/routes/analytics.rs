use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;

use analytics::AnalyticsReport;
use common::{Error, Filter, TradeType};
use valuation::{Projection, ProjectionRequest, DEFAULT_DURATION};

use crate::{ApiError, AppState};

pub fn analytics_router() -> Router<AppState> {
    Router::new()
        .route("/api/analytics", get(get_analytics))
        .route("/api/calc", get(get_calc))
}

// ─── Analytics ────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
struct AnalyticsQuery {
    start: Option<String>,
    end: Option<String>,
    symbol: Option<String>,
    sector: Option<String>,
}

fn parse_bound(name: &str, raw: Option<&str>) -> Result<Option<NaiveDate>, Error> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => ingest::parse_date(s)
            .map(Some)
            .ok_or_else(|| Error::Validation(format!("Invalid {name} date: {s}"))),
    }
}

async fn get_analytics(
    State(state): State<AppState>,
    Query(q): Query<AnalyticsQuery>,
) -> Result<Json<AnalyticsReport>, ApiError> {
    let filter = Filter::new(
        parse_bound("start", q.start.as_deref())?,
        parse_bound("end", q.end.as_deref())?,
        q.symbol.as_deref(),
        q.sector.as_deref(),
    );
    let report = analytics::run_query(state.store.as_ref(), &filter, &state.thresholds).await?;
    Ok(Json(report))
}

// ─── Calculator ───────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
struct CalcQuery {
    symbol: Option<String>,
    amt: Option<String>,
    duration: Option<String>,
    #[serde(rename = "type")]
    trade_type: Option<String>,
}

impl CalcQuery {
    fn into_request(self) -> Result<ProjectionRequest, Error> {
        // unparseable amounts fall through to the positive-amount check
        let amount = self
            .amt
            .as_deref()
            .and_then(|a| a.trim().parse::<f64>().ok())
            .unwrap_or(0.0);

        let duration = match self.duration.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            None => DEFAULT_DURATION,
            Some(d) => d
                .parse::<u32>()
                .map_err(|_| Error::Validation(format!("Invalid duration: {d}")))?,
        };

        Ok(ProjectionRequest {
            symbol: self.symbol.unwrap_or_default(),
            amount,
            duration,
            trade_type: self
                .trade_type
                .as_deref()
                .map(TradeType::parse_lenient)
                .unwrap_or_default(),
        })
    }
}

async fn get_calc(
    State(state): State<AppState>,
    Query(q): Query<CalcQuery>,
) -> Result<Json<Projection>, ApiError> {
    let request = q.into_request()?;
    let projection = valuation::project(state.store.as_ref(), &request).await?;
    Ok(Json(projection))
}
