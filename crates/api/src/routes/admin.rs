use axum::{extract::State, middleware, routing::post, Json, Router};
use serde_json::{json, Value};
use tracing::warn;

use crate::{auth::require_auth, ApiError, AppState};

pub fn admin_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/rebuild", post(rebuild))
        .route_layer(middleware::from_fn_with_state(state, require_auth))
}

/// Drop and recreate the trade store. Every stored record is lost.
async fn rebuild(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    warn!("Trade store rebuild requested");
    state.store.rebuild().await?;
    Ok(Json(json!({"status": "rebuilt"})))
}
