mod auth;
mod error;
pub mod routes;

pub use error::ApiError;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use common::TradeStore;
use ingest::Ingestor;
use signals::SignalThresholds;

/// Shared application state injected into every route handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TradeStore>,
    pub thresholds: Arc<SignalThresholds>,
    pub ingestor: Ingestor,
    /// Where raw uploads are archived. Archiving is skipped when unset.
    pub upload_dir: Option<PathBuf>,
    /// Bearer token required by destructive admin routes.
    pub admin_token: String,
}

/// Assemble every route with its layers.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods(Any);

    Router::new()
        .merge(routes::analytics_router())
        .merge(routes::upload_router())
        .merge(routes::admin_router(state.clone()))
        .merge(routes::health_router())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Build and run the Axum API server.
pub async fn serve(state: AppState, port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = router(state);

    info!(%addr, "Tradescope API listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}
