pub mod auth;
pub mod lessons;
pub mod proxy;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::Value;

use services::api::{UpstreamRequest, UpstreamResponse};

use crate::AppState;
use crate::error::BffError;

/// Send `request` upstream. 2xx answers are passed through with their status,
/// anything else becomes the error envelope.
pub(crate) async fn forward(
    state: &AppState,
    request: &UpstreamRequest<'_>,
) -> Result<UpstreamResponse, BffError> {
    let response = state.upstream.send(request).await?;
    if !response.is_success() {
        return Err(response.into_error().into());
    }
    Ok(response)
}

pub(crate) fn reply(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

pub async fn not_found() -> BffError {
    BffError::NotFound
}
