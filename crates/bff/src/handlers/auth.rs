use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_extra::extract::{CookieJar, WithRejection};
use serde::Deserialize;
use serde_json::{Value, json};

use services::api::{UpstreamRequest, paths};

use crate::AppState;
use crate::cookies;
use crate::error::BffError;
use crate::extractors::MaybeAuth;
use crate::names;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(names::LOGIN_URL, post(login))
        .route(names::LOGOUT_URL, post(logout))
        .route(names::ME_URL, get(me))
}

#[derive(Debug, Deserialize)]
struct LoginCredentials {
    #[serde(default)]
    email_phone: String,
    #[serde(default)]
    password: String,
}

/// Successful upstream login content.
#[derive(Debug, Deserialize)]
struct LoginContent {
    access_token: String,
    user: Value,
}

fn login_failed(message: String) -> BffError {
    BffError::Upstream {
        status: StatusCode::UNAUTHORIZED,
        message,
        error_code: None,
    }
}

/// Exchange credentials for a token and store the session in cookies.
async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Json(credentials), _): WithRejection<Json<LoginCredentials>, BffError>,
) -> Result<Response, BffError> {
    if credentials.email_phone.trim().is_empty() || credentials.password.is_empty() {
        return Err(BffError::BadRequest("Missing credentials".to_string()));
    }

    let body = json!({
        "email_phone": credentials.email_phone,
        "password": credentials.password,
    });
    let response = state
        .upstream
        .send(&UpstreamRequest::post(paths::LOGIN).json(&body))
        .await?;

    let success = response.is_success()
        && response
            .body
            .get("success")
            .and_then(Value::as_bool)
            .unwrap_or(false);
    let content = response
        .body
        .get("content")
        .cloned()
        .and_then(|content| serde_json::from_value::<LoginContent>(content).ok());
    let Some(content) = content.filter(|_| success) else {
        let message = response
            .body
            .get("message")
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .unwrap_or("Login failed")
            .to_string();
        tracing::info!(status = %response.status, "login rejected upstream");
        return Err(login_failed(message));
    };

    let ttl_ms = i64::try_from(names::SESSION_TTL.as_millis()).unwrap_or(i64::MAX);
    let expires_at = state.clock.now_millis().saturating_add(ttl_ms);
    let jar = cookies::set_session(
        jar,
        &content.access_token,
        &content.user,
        expires_at,
        state.secure_cookies,
    )
    .map_err(|err| {
        tracing::error!(error = %err, "could not encode auth_user cookie");
        BffError::Internal("Unexpected error during login")
    })?;

    tracing::info!(user_id = ?content.user.get("id"), "user logged in");
    Ok((jar, Json(json!({ "success": true, "user": content.user }))).into_response())
}

async fn logout(jar: CookieJar) -> impl IntoResponse {
    (
        cookies::clear_session(jar),
        Json(json!({ "success": true, "message": "Logged out" })),
    )
}

/// The current user's profile, looked up upstream with the cookie token.
async fn me(State(state): State<AppState>, MaybeAuth(session): MaybeAuth) -> Response {
    let Some(session) = session else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "success": false, "user": null })),
        )
            .into_response();
    };

    let request = UpstreamRequest::get(paths::PROFILE).bearer(Some(session.token.as_str()));
    match state.upstream.send(&request).await {
        Ok(response) if response.is_success() => {
            let user = response
                .body
                .pointer("/content/user")
                .cloned()
                .unwrap_or(Value::Null);
            Json(json!({ "success": true, "user": user })).into_response()
        }
        Ok(response) => {
            let message = response
                .body
                .get("message")
                .and_then(Value::as_str)
                .filter(|m| !m.is_empty())
                .unwrap_or("Unauthorized")
                .to_string();
            (
                response.status,
                Json(json!({ "success": false, "user": null, "message": message })),
            )
                .into_response()
        }
        Err(err) => {
            tracing::error!(error = %err, "session lookup failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "user": null, "message": "Session fetch failed" })),
            )
                .into_response()
        }
    }
}
