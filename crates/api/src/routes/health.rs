use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};

use crate::{ApiError, AppState};

pub fn health_router() -> Router<AppState> {
    Router::new().route("/healthz", get(healthz))
}

/// Health check endpoint, no auth required.
async fn healthz(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let records = state.store.record_count().await?;
    Ok(Json(json!({
        "status": "ok",
        "records": records,
    })))
}
