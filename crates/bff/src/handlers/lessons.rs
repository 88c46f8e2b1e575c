use axum::extract::{Path, RawQuery, State};
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use serde_json::{Value, json};

use lesson_core::model::LessonId;
use services::api::{UpstreamRequest, normalize_lesson_content, paths};

use super::{forward, reply};
use crate::AppState;
use crate::error::BffError;
use crate::extractors::RequireAuth;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/lessons/{subject_slug}/{topic_slug}/content",
            get(content_by_slug),
        )
        .route("/api/lessons/by-id/{id}/content", get(content_by_id))
        .route("/api/lessons/by-id/{id}/complete", post(complete))
        .route(
            "/api/lessons/check-exercise-answer",
            post(check_exercise_answer),
        )
        .route(
            "/api/lessons/check-general-exercise-answer",
            post(check_general_exercise_answer),
        )
        .route("/api/lessons/scores/lessons/{lesson_id}", get(score))
        .route("/api/lessons/list", post(list))
        .route("/api/lessons/meta", get(meta))
}

type JsonBody<T> = WithRejection<Json<T>, BffError>;
type LessonPath = WithRejection<Path<LessonId>, BffError>;

/// Slug lookups answer `{content: {lesson: {...}}}`; callers get `{content: {...}}`.
async fn content_by_slug(
    RequireAuth(session): RequireAuth,
    State(state): State<AppState>,
    WithRejection(Path((subject, topic)), _): WithRejection<Path<(String, String)>, BffError>,
) -> Result<Response, BffError> {
    let path = paths::lesson_by_slug(&subject, &topic);
    let request = UpstreamRequest::get(&path).bearer(Some(session.token.as_str()));
    let mut response = forward(&state, &request).await?;
    if let Some(body) = response.body.as_object_mut() {
        let content = body.remove("content").unwrap_or(Value::Null);
        body.insert("content".to_string(), normalize_lesson_content(content));
    }
    Ok(reply(response.status, response.body))
}

async fn content_by_id(
    RequireAuth(session): RequireAuth,
    State(state): State<AppState>,
    WithRejection(Path(id), _): LessonPath,
) -> Result<Response, BffError> {
    let path = paths::lesson_by_id(id);
    let request = UpstreamRequest::get(&path).bearer(Some(session.token.as_str()));
    let response = forward(&state, &request).await?;
    Ok(reply(response.status, response.body))
}

async fn complete(
    RequireAuth(session): RequireAuth,
    State(state): State<AppState>,
    WithRejection(Path(id), _): LessonPath,
) -> Result<Response, BffError> {
    let path = paths::complete_lesson(id);
    let request = UpstreamRequest::post(&path).bearer(Some(session.token.as_str()));
    let response = forward(&state, &request).await?;
    tracing::info!(lesson_id = %id, user_id = %session.user.id, "lesson completed");
    Ok(reply(response.status, response.body))
}

async fn check_exercise_answer(
    RequireAuth(session): RequireAuth,
    State(state): State<AppState>,
    WithRejection(Json(body), _): JsonBody<Value>,
) -> Result<Response, BffError> {
    let request = UpstreamRequest::post(paths::CHECK_EXERCISE_ANSWER)
        .bearer(Some(session.token.as_str()))
        .json(&body);
    let response = forward(&state, &request).await?;
    Ok(reply(response.status, response.body))
}

async fn check_general_exercise_answer(
    RequireAuth(session): RequireAuth,
    State(state): State<AppState>,
    WithRejection(Json(body), _): JsonBody<Value>,
) -> Result<Response, BffError> {
    let request = UpstreamRequest::post(paths::CHECK_GENERAL_EXERCISE_ANSWER)
        .bearer(Some(session.token.as_str()))
        .json(&body);
    let response = forward(&state, &request).await?;
    Ok(reply(response.status, response.body))
}

async fn score(
    RequireAuth(session): RequireAuth,
    State(state): State<AppState>,
    WithRejection(Path(lesson_id), _): LessonPath,
) -> Result<Response, BffError> {
    let path = paths::lesson_score(lesson_id);
    let request = UpstreamRequest::get(&path).bearer(Some(session.token.as_str()));
    let response = forward(&state, &request).await?;
    Ok(reply(response.status, response.body))
}

/// Only the four filter fields are sent upstream.
#[derive(Debug, Default, Deserialize)]
struct ListBody {
    #[serde(default)]
    class: Value,
    #[serde(default)]
    subject: Value,
    #[serde(default)]
    term: Value,
    #[serde(default)]
    week: Value,
}

async fn list(
    RequireAuth(session): RequireAuth,
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
    WithRejection(Json(filters), _): JsonBody<ListBody>,
) -> Result<Response, BffError> {
    let body = json!({
        "class": filters.class,
        "subject": filters.subject,
        "term": filters.term,
        "week": filters.week,
    });
    let request = UpstreamRequest::post(paths::LESSONS_LIST)
        .bearer(Some(session.token.as_str()))
        .query(query.as_deref())
        .json(&body);
    let response = forward(&state, &request).await?;
    Ok(reply(response.status, response.body))
}

async fn meta(
    RequireAuth(session): RequireAuth,
    State(state): State<AppState>,
) -> Result<Response, BffError> {
    let request = UpstreamRequest::get(paths::LESSONS_METADATA).bearer(Some(session.token.as_str()));
    let response = forward(&state, &request).await?;
    Ok(reply(response.status, response.body))
}
