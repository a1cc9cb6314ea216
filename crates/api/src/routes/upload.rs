use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde::Deserialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use common::Error;

use crate::AppState;

/// Largest accepted CSV body.
const MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

pub fn upload_router() -> Router<AppState> {
    Router::new()
        .route("/api/upload", post(upload_csv))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}

#[derive(Debug, Deserialize)]
struct UploadQuery {
    default_sector: Option<String>,
    filename: Option<String>,
}

/// Ingest the request body as a CSV file. Responds in plain text.
async fn upload_csv(
    State(state): State<AppState>,
    Query(q): Query<UploadQuery>,
    body: Bytes,
) -> Response {
    let upload_id = Uuid::new_v4();
    let filename = q
        .filename
        .as_deref()
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .unwrap_or("upload.csv")
        .to_string();
    info!(%upload_id, %filename, bytes = body.len(), "Upload received");

    if let Some(dir) = &state.upload_dir {
        // archiving is best effort; ingestion still runs on failure
        if let Err(e) = ingest::archive_upload(dir, &filename, &body) {
            warn!(%upload_id, error = %e, "Failed to archive upload");
        }
    }

    let result = state
        .ingestor
        .ingest(state.store.as_ref(), body.as_ref(), q.default_sector.as_deref())
        .await;

    match result {
        Ok(report) => {
            info!(
                %upload_id,
                inserted = report.inserted,
                skipped = report.skipped.len(),
                "Upload ingested"
            );
            (
                StatusCode::OK,
                format!("Uploaded: {filename}\nInserted rows: {}", report.inserted),
            )
                .into_response()
        }
        Err(e @ (Error::EmptyInput | Error::Unreadable(_))) => {
            warn!(%upload_id, error = %e, "Upload rejected");
            (StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
        Err(e) => {
            error!(%upload_id, error = %e, "Upload failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Internal server error: {e}"),
            )
                .into_response()
        }
    }
}
