use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use lesson_core::model::{
    ExerciseId, LessonContent, LessonFilters, LessonId, LessonMetadata, LessonScore, LessonsPage,
};

use super::upstream::{UpstreamClient, UpstreamRequest, UpstreamResponse};
use super::{AnswerCheck, LessonApi, normalize_lesson_content, paths};
use crate::config::ApiConfig;
use crate::error::ApiError;

/// `LessonApi` over HTTP, authenticated with a bearer token.
#[derive(Clone, Debug)]
pub struct HttpLessonApi {
    client: UpstreamClient,
    token: Option<String>,
}

impl HttpLessonApi {
    #[must_use]
    pub fn new(config: ApiConfig, token: Option<String>) -> Self {
        Self {
            client: UpstreamClient::new(config),
            token: token.filter(|t| !t.trim().is_empty()),
        }
    }

    fn bearer(&self) -> Option<&str> {
        self.token.as_deref()
    }

    async fn get_content<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let request = UpstreamRequest::get(path).bearer(self.bearer());
        decode(self.client.send_content(&request).await?)
    }

    async fn check_answer(&self, path: &str, body: &Value) -> Result<AnswerCheck, ApiError> {
        let request = UpstreamRequest::post(path).bearer(self.bearer()).json(body);
        answer_from_response(self.client.send(&request).await?)
    }
}

fn decode<T: DeserializeOwned>(content: Value) -> Result<T, ApiError> {
    serde_json::from_value(content).map_err(|err| ApiError::Decode(err.to_string()))
}

/// A 2xx carries `is_correct` (or `correct`) in its content, falling back to
/// the envelope's `success`. A 400/422 is a wrong answer, not a failure.
fn answer_from_response(response: UpstreamResponse) -> Result<AnswerCheck, ApiError> {
    let message = response
        .body
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    if response.is_success() {
        let content = response.body.get("content");
        let is_correct = ["is_correct", "correct"]
            .iter()
            .find_map(|key| content.and_then(|c| c.get(key)).and_then(Value::as_bool))
            .or_else(|| response.body.get("success").and_then(Value::as_bool))
            .unwrap_or(false);
        return Ok(AnswerCheck {
            is_correct,
            message,
        });
    }
    if matches!(
        response.status,
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY
    ) {
        return Ok(AnswerCheck {
            is_correct: false,
            message: response.error_message(),
        });
    }
    Err(response.into_error())
}

#[async_trait]
impl LessonApi for HttpLessonApi {
    async fn lesson_by_slug(&self, subject: &str, topic: &str) -> Result<LessonContent, ApiError> {
        let path = paths::lesson_by_slug(subject, topic);
        let request = UpstreamRequest::get(&path).bearer(self.bearer());
        let content = self.client.send_content(&request).await?;
        decode(normalize_lesson_content(content))
    }

    async fn lesson_by_id(&self, id: LessonId) -> Result<LessonContent, ApiError> {
        self.get_content(&paths::lesson_by_id(id)).await
    }

    async fn complete_lesson(&self, id: LessonId) -> Result<Value, ApiError> {
        let path = paths::complete_lesson(id);
        let request = UpstreamRequest::post(&path).bearer(self.bearer());
        self.client.send_content(&request).await
    }

    async fn check_exercise_answer(
        &self,
        exercise: ExerciseId,
        answer: &str,
    ) -> Result<AnswerCheck, ApiError> {
        let body = json!({ "exercise_id": exercise, "answer": answer });
        self.check_answer(paths::CHECK_EXERCISE_ANSWER, &body).await
    }

    async fn check_general_exercise_answer(
        &self,
        exercise: ExerciseId,
        answer: &str,
    ) -> Result<AnswerCheck, ApiError> {
        let body = json!({ "general_exercise_id": exercise, "answer": answer });
        self.check_answer(paths::CHECK_GENERAL_EXERCISE_ANSWER, &body).await
    }

    async fn lesson_score(&self, id: LessonId) -> Result<LessonScore, ApiError> {
        self.get_content(&paths::lesson_score(id)).await
    }

    async fn lessons(&self, filters: &LessonFilters, page: u32) -> Result<LessonsPage, ApiError> {
        let body = serde_json::to_value(filters).map_err(|err| ApiError::Decode(err.to_string()))?;
        let query = format!("page={}", page.max(1));
        let request = UpstreamRequest::post(paths::LESSONS_LIST)
            .bearer(self.bearer())
            .query(Some(&query))
            .json(&body);
        decode(self.client.send_content(&request).await?)
    }

    async fn metadata(&self) -> Result<LessonMetadata, ApiError> {
        self.get_content(paths::LESSONS_METADATA).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answer_from_content_flag_or_envelope() {
        let ok = UpstreamResponse {
            status: StatusCode::OK,
            body: json!({"success": true, "message": "Correct!", "content": {"is_correct": true}}),
        };
        assert_eq!(
            answer_from_response(ok).unwrap(),
            AnswerCheck { is_correct: true, message: "Correct!".into() }
        );

        let envelope_only = UpstreamResponse {
            status: StatusCode::OK,
            body: json!({"success": false, "message": "Try again", "content": null}),
        };
        assert!(!answer_from_response(envelope_only).unwrap().is_correct);

        let wrong = UpstreamResponse {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            body: json!({"success": false, "message": "Wrong answer"}),
        };
        let wrong = answer_from_response(wrong).unwrap();
        assert!(!wrong.is_correct);
        assert_eq!(wrong.message, "Wrong answer");

        let server = UpstreamResponse {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: Value::Null,
        };
        assert!(matches!(
            answer_from_response(server),
            Err(ApiError::Upstream { status: StatusCode::INTERNAL_SERVER_ERROR, .. })
        ));
    }
}
