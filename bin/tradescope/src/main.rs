use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use api::AppState;
use common::Config;
use ingest::Ingestor;
use signals::SignalThresholds;
use store::SqliteTradeStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── Logging ──────────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    // ── Config ────────────────────────────────────────────────────────────────
    let cfg = Config::from_env();
    info!(port = cfg.api_port, batch_size = cfg.ingest_batch_size, "Tradescope starting");

    // ── Database ──────────────────────────────────────────────────────────────
    let store = SqliteTradeStore::connect(&cfg.database_url)
        .await
        .context("failed to open trade store")?;
    info!("Database ready");

    // ── Signal thresholds ─────────────────────────────────────────────────────
    let thresholds = match &cfg.signal_config_path {
        Some(path) => SignalThresholds::load(path).context("failed to load signal thresholds")?,
        None => {
            info!("No SIGNAL_CONFIG_PATH set, using default signal thresholds");
            SignalThresholds::default()
        }
    };

    // ── API server ────────────────────────────────────────────────────────────
    let state = AppState {
        store: Arc::new(store),
        thresholds: Arc::new(thresholds),
        ingestor: Ingestor::new(cfg.ingest_batch_size),
        upload_dir: cfg.upload_dir.clone(),
        admin_token: cfg.admin_token.clone(),
    };

    api::serve(state, cfg.api_port)
        .await
        .context("API server terminated")?;
    Ok(())
}
