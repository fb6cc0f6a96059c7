use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Errors the HTTP surface can produce outside the WebSocket stream, where
/// a typed `ScanEvent::Error` doesn't apply.
pub enum ApiError {
    NotFound,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound => (StatusCode::NOT_FOUND, "unknown cache_id").into_response(),
        }
    }
}
