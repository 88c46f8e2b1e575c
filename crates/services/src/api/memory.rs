use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{Value, json};

use lesson_core::model::{
    ExerciseId, LessonContent, LessonFilters, LessonId, LessonMetadata, LessonScore, LessonsPage,
    PaginationMeta,
};

use super::{AnswerCheck, LessonApi};
use crate::error::ApiError;

#[derive(Debug, Clone)]
enum Failure {
    Timeout,
    Status(StatusCode, String),
}

#[derive(Debug, Default)]
struct Inner {
    lessons: HashMap<LessonId, LessonContent>,
    slugs: HashMap<(String, String), LessonId>,
    correct_answers: HashMap<ExerciseId, String>,
    scores: HashMap<LessonId, String>,
    pages: Vec<LessonsPage>,
    metadata: LessonMetadata,
    completed: Vec<LessonId>,
    failures: VecDeque<Failure>,
    calls: usize,
}

/// In-memory `LessonApi` for tests and offline runs.
#[derive(Clone, Default)]
pub struct InMemoryLessonApi {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryLessonApi {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, ApiError> {
        self.inner
            .lock()
            .map_err(|e| ApiError::Rejected(e.to_string()))
    }

    /// Register a lesson, reachable by id and by `subject/topic` slug.
    ///
    /// Exercise answers are taken from each exercise's `correct_answer`.
    pub fn insert_lesson(&self, subject: &str, topic: &str, lesson: LessonContent) {
        if let Ok(mut inner) = self.lock() {
            for concept in &lesson.concepts {
                for exercise in &concept.exercises {
                    inner
                        .correct_answers
                        .insert(exercise.id, exercise.correct_answer.clone());
                }
            }
            for exercise in &lesson.general_exercises {
                inner
                    .correct_answers
                    .insert(exercise.id, exercise.correct_answer.clone());
            }
            inner
                .slugs
                .insert((subject.to_string(), topic.to_string()), lesson.id);
            inner.lessons.insert(lesson.id, lesson);
        }
    }

    pub fn set_score(&self, id: LessonId, score: impl Into<String>) {
        if let Ok(mut inner) = self.lock() {
            inner.scores.insert(id, score.into());
        }
    }

    pub fn set_metadata(&self, metadata: LessonMetadata) {
        if let Ok(mut inner) = self.lock() {
            inner.metadata = metadata;
        }
    }

    /// Pages served by `lessons`, indexed from page 1.
    pub fn set_pages(&self, pages: Vec<LessonsPage>) {
        if let Ok(mut inner) = self.lock() {
            inner.pages = pages;
        }
    }

    /// The next call fails with a timeout.
    pub fn fail_next_with_timeout(&self) {
        if let Ok(mut inner) = self.lock() {
            inner.failures.push_back(Failure::Timeout);
        }
    }

    /// The next call fails with an upstream status.
    pub fn fail_next_with_status(&self, status: StatusCode, message: impl Into<String>) {
        if let Ok(mut inner) = self.lock() {
            inner.failures.push_back(Failure::Status(status, message.into()));
        }
    }

    #[must_use]
    pub fn calls(&self) -> usize {
        self.lock().map(|inner| inner.calls).unwrap_or_default()
    }

    #[must_use]
    pub fn completed_lessons(&self) -> Vec<LessonId> {
        self.lock()
            .map(|inner| inner.completed.clone())
            .unwrap_or_default()
    }

    /// Counts the call and pops an injected failure, if any.
    fn begin(&self) -> Result<MutexGuard<'_, Inner>, ApiError> {
        let mut inner = self.lock()?;
        inner.calls += 1;
        match inner.failures.pop_front() {
            None => Ok(inner),
            Some(Failure::Timeout) => Err(ApiError::Timeout),
            Some(Failure::Status(status, message)) => Err(ApiError::Upstream {
                status,
                message,
                error_code: None,
            }),
        }
    }

    fn check(&self, exercise: ExerciseId, answer: &str) -> Result<AnswerCheck, ApiError> {
        let inner = self.begin()?;
        let is_correct = inner
            .correct_answers
            .get(&exercise)
            .is_some_and(|correct| correct.trim().eq_ignore_ascii_case(answer.trim()));
        Ok(AnswerCheck {
            is_correct,
            message: if is_correct { "Correct!" } else { "Incorrect answer" }.to_string(),
        })
    }
}

fn not_found(what: &str) -> ApiError {
    ApiError::Upstream {
        status: StatusCode::NOT_FOUND,
        message: format!("{what} not found"),
        error_code: None,
    }
}

#[async_trait]
impl LessonApi for InMemoryLessonApi {
    async fn lesson_by_slug(&self, subject: &str, topic: &str) -> Result<LessonContent, ApiError> {
        let inner = self.begin()?;
        inner
            .slugs
            .get(&(subject.to_string(), topic.to_string()))
            .and_then(|id| inner.lessons.get(id))
            .cloned()
            .ok_or_else(|| not_found("Lesson"))
    }

    async fn lesson_by_id(&self, id: LessonId) -> Result<LessonContent, ApiError> {
        let inner = self.begin()?;
        inner
            .lessons
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found("Lesson"))
    }

    async fn complete_lesson(&self, id: LessonId) -> Result<Value, ApiError> {
        let mut inner = self.begin()?;
        if !inner.lessons.contains_key(&id) {
            return Err(not_found("Lesson"));
        }
        inner.completed.push(id);
        Ok(json!({ "lesson_id": id, "completed": true }))
    }

    async fn check_exercise_answer(
        &self,
        exercise: ExerciseId,
        answer: &str,
    ) -> Result<AnswerCheck, ApiError> {
        self.check(exercise, answer)
    }

    async fn check_general_exercise_answer(
        &self,
        exercise: ExerciseId,
        answer: &str,
    ) -> Result<AnswerCheck, ApiError> {
        self.check(exercise, answer)
    }

    async fn lesson_score(&self, id: LessonId) -> Result<LessonScore, ApiError> {
        let inner = self.begin()?;
        inner
            .scores
            .get(&id)
            .map(|score| LessonScore {
                lesson_total_score: score.clone(),
            })
            .ok_or_else(|| not_found("Score"))
    }

    async fn lessons(&self, _filters: &LessonFilters, page: u32) -> Result<LessonsPage, ApiError> {
        let inner = self.begin()?;
        let index = usize::try_from(page.max(1) - 1).unwrap_or(usize::MAX);
        Ok(inner.pages.get(index).cloned().unwrap_or(LessonsPage {
            lessons: Vec::new(),
            meta: PaginationMeta::default(),
        }))
    }

    async fn metadata(&self) -> Result<LessonMetadata, ApiError> {
        let inner = self.begin()?;
        Ok(inner.metadata.clone())
    }
}
