use axum::body::Bytes;
use axum::extract::{Path, RawQuery, State};
use axum::http::Method;
use axum::response::Response;
use axum::routing::any;
use axum::Router;
use serde_json::Value;

use services::ApiError;
use services::api::UpstreamRequest;

use super::reply;
use crate::AppState;
use crate::error::BffError;
use crate::extractors::MaybeAuth;

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/proxy/{*path}", any(forward_any))
}

fn carries_body(method: &Method) -> bool {
    matches!(*method, Method::POST | Method::PUT | Method::PATCH)
}

/// Generic pass-through: same method, path and query string, the session
/// token if any, and a JSON body for POST/PUT/PATCH. The upstream status and
/// body are returned as-is; a non-JSON upstream body becomes `{}`.
async fn forward_any(
    State(state): State<AppState>,
    MaybeAuth(session): MaybeAuth,
    method: Method,
    Path(path): Path<String>,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> Result<Response, BffError> {
    let payload: Option<Value> = if carries_body(&method) {
        serde_json::from_slice(&body).ok()
    } else {
        None
    };

    let mut request = UpstreamRequest::new(method.clone(), &path)
        .bearer(session.as_ref().map(|s| s.token.as_str()))
        .query(query.as_deref())
        .lenient_body();
    if let Some(payload) = payload.as_ref() {
        request = request.json(payload);
    }

    match state.upstream.send(&request).await {
        Ok(response) => {
            let body = if response.body.is_null() {
                Value::Object(serde_json::Map::new())
            } else {
                response.body
            };
            Ok(reply(response.status, body))
        }
        Err(ApiError::InvalidPath(path)) => Err(BffError::BadRequest(format!(
            "Invalid proxy path: {path}"
        ))),
        Err(err) => {
            tracing::warn!(%method, %path, error = %err, "proxy request failed");
            Err(BffError::Internal("Proxy request failed"))
        }
    }
}
