use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;

use crate::error::ApiError;
use crate::state::AppState;

/// `GET /screenshot/{cache_id}`: serves a previously cached screenshot's raw
/// bytes with its stored MIME type and a one-hour client cache lifetime.
/// 404s on an id the cache never saw.
pub async fn get_screenshot(
    State(state): State<AppState>,
    Path(cache_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let cached = state.screenshots.get(&cache_id).ok_or(ApiError::NotFound)?;
    let headers = [(header::CONTENT_TYPE, cached.mime.content_type()), (header::CACHE_CONTROL, "public, max-age=3600")];
    Ok((headers, cached.bytes))
}
