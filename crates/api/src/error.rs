use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use common::Error;

/// JSON error response for the query endpoints.
///
/// Client errors carry their message as `{"error": msg}`; anything else is
/// logged and reported as a generic 500 with a diagnostic message.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::DataUnavailable(_) => StatusCode::NOT_FOUND,
            e if e.is_client_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %self.0, "Request failed");
            return (
                status,
                Json(json!({"error": "Internal server error", "message": self.0.to_string()})),
            )
                .into_response();
        }
        (status, Json(json!({"error": self.0.to_string()}))).into_response()
    }
}
