//! Access to the upstream lessons API.

mod http;
mod memory;
mod upstream;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use lesson_core::model::{
    ExerciseId, LessonContent, LessonFilters, LessonId, LessonMetadata, LessonScore, LessonsPage,
};

use crate::error::ApiError;

pub use http::HttpLessonApi;
pub use memory::InMemoryLessonApi;
pub use upstream::{UpstreamClient, UpstreamRequest, UpstreamResponse};

/// Upstream paths, relative to the API base URL.
pub mod paths {
    use lesson_core::model::LessonId;

    pub const LOGIN: &str = "login";
    pub const USER: &str = "user";
    pub const PROFILE: &str = "profile";
    pub const CHECK_EXERCISE_ANSWER: &str = "lessons/check-exercise-answer";
    pub const CHECK_GENERAL_EXERCISE_ANSWER: &str = "lessons/check-general-exercise-answer";
    pub const LESSONS_LIST: &str = "superadmin/lessons/lessons";
    pub const LESSONS_METADATA: &str = "superadmin/lessons/get-classes-subjects-terms-weeks";

    #[must_use]
    pub fn lesson_by_slug(subject: &str, topic: &str) -> String {
        format!("lessons/{subject}/{topic}/content")
    }

    #[must_use]
    pub fn lesson_by_id(id: LessonId) -> String {
        format!("superadmin/lessons/lesson/{id}/content")
    }

    #[must_use]
    pub fn complete_lesson(id: LessonId) -> String {
        format!("lessons/{id}/complete")
    }

    #[must_use]
    pub fn lesson_score(id: LessonId) -> String {
        format!("lessons/scores/lessons/{id}")
    }
}

/// Result of submitting one exercise answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerCheck {
    pub is_correct: bool,
    #[serde(default)]
    pub message: String,
}

#[async_trait]
pub trait LessonApi: Send + Sync {
    async fn lesson_by_slug(&self, subject: &str, topic: &str) -> Result<LessonContent, ApiError>;
    async fn lesson_by_id(&self, id: LessonId) -> Result<LessonContent, ApiError>;
    /// Returns the upstream completion payload untouched.
    async fn complete_lesson(&self, id: LessonId) -> Result<Value, ApiError>;
    async fn check_exercise_answer(
        &self,
        exercise: ExerciseId,
        answer: &str,
    ) -> Result<AnswerCheck, ApiError>;
    async fn check_general_exercise_answer(
        &self,
        exercise: ExerciseId,
        answer: &str,
    ) -> Result<AnswerCheck, ApiError>;
    async fn lesson_score(&self, id: LessonId) -> Result<LessonScore, ApiError>;
    async fn lessons(&self, filters: &LessonFilters, page: u32) -> Result<LessonsPage, ApiError>;
    async fn metadata(&self) -> Result<LessonMetadata, ApiError>;
}

/// Slug lookups wrap the lesson as `{"lesson": {...}}`; unwrap it so both
/// lookups share one shape.
#[must_use]
pub fn normalize_lesson_content(content: Value) -> Value {
    match content {
        Value::Object(mut map) if map.get("lesson").is_some_and(|l| !l.is_null()) => {
            map.remove("lesson").unwrap_or(Value::Null)
        }
        other => other,
    }
}
