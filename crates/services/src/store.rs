//! Session state for the lesson catalog and the lesson being studied.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};

use lesson_core::Clock;
use lesson_core::auto_advance::AutoAdvanceInput;
use lesson_core::model::{
    ExerciseId, LessonContent, LessonFilters, LessonFiltersPatch, LessonId, LessonMetadata,
    LessonSummary, PaginationMeta,
};
use lesson_core::navigation::{NavigationControls, StepCursor};
use lesson_core::progress::{
    ProgressMap, SectionId, SectionKind, estimated_minutes_remaining, percent_complete,
};
use lesson_core::sequencer::{LessonOutline, Section};

use crate::api::{AnswerCheck, LessonApi};
use crate::error::{ErrorKind, StoreError, UserFacingError};
use crate::notice::Notice;

/// How the current lesson was requested; replayed by `retry`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LessonSource {
    Slug { subject: String, topic: String },
    Id(LessonId),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadingFlags {
    pub lesson: bool,
    pub lessons: bool,
    pub metadata: bool,
    pub score: bool,
}

impl LoadingFlags {
    #[must_use]
    pub fn any(&self) -> bool {
        self.lesson || self.lessons || self.metadata || self.score
    }
}

/// Everything the views read. Obtained through `LessonStore::snapshot`.
#[derive(Debug, Clone, Default)]
pub struct LessonState {
    pub metadata: LessonMetadata,
    pub lessons: Vec<LessonSummary>,
    pub pagination: PaginationMeta,
    pub filters: LessonFilters,
    pub lesson: Option<Arc<LessonContent>>,
    pub source: Option<LessonSource>,
    pub outline: LessonOutline,
    pub current_step: usize,
    pub progress: ProgressMap,
    pub lesson_score: Option<String>,
    pub loading: LoadingFlags,
    pub error: Option<UserFacingError>,
    pub is_redirecting: bool,
    pub celebration_shown: bool,
    generation: u64,
}

impl LessonState {
    #[must_use]
    pub fn lesson_id(&self) -> Option<LessonId> {
        self.lesson.as_ref().map(|l| l.id)
    }

    #[must_use]
    pub fn current_section(&self) -> Option<&Section> {
        self.outline.section_at(self.current_step)
    }

    /// Percentage of this lesson's sections that are completed.
    #[must_use]
    pub fn percent_complete(&self) -> u8 {
        percent_complete(
            self.outline.completed_count(&self.progress),
            self.outline.total_steps(),
        )
    }

    #[must_use]
    pub fn estimated_minutes_remaining(&self) -> Option<u32> {
        self.lesson.as_ref()?;
        estimated_minutes_remaining(self.percent_complete(), self.outline.total_steps())
    }

    #[must_use]
    pub fn controls(&self) -> NavigationControls {
        NavigationControls::new(
            self.current_step,
            self.outline.total_steps(),
            self.is_redirecting,
        )
    }

    #[must_use]
    pub fn can_fetch_lessons(&self) -> bool {
        self.filters.is_complete()
    }

    #[must_use]
    pub fn auto_advance_input(&self) -> AutoAdvanceInput<'_> {
        AutoAdvanceInput {
            lesson_id: self.lesson_id(),
            is_loading: self.loading.lesson,
            current_step: self.current_step,
            outline: &self.outline,
            progress: &self.progress,
        }
    }

    fn cursor(&self) -> Result<StepCursor, StoreError> {
        if self.lesson.is_none() {
            return Err(StoreError::NoLesson);
        }
        let mut cursor = StepCursor::new(self.outline.total_steps())?;
        cursor.jump(self.current_step)?;
        Ok(cursor)
    }

    fn reset_lesson(&mut self) {
        self.lesson = None;
        self.source = None;
        self.outline = LessonOutline::default();
        self.current_step = 0;
        self.progress.clear();
        self.lesson_score = None;
        self.is_redirecting = false;
        self.celebration_shown = false;
    }

    fn install(&mut self, content: LessonContent, source: LessonSource, now: DateTime<Utc>) {
        let content = content.normalized();
        let outline = LessonOutline::from_concepts(&content.concepts);
        let mut progress = ProgressMap::for_lesson(&content.concepts, content.general_exercises.len());
        let seeded = progress.seed_from_markers(&content.check_markers, &content.concepts, now);
        tracing::debug!(
            lesson_id = %content.id,
            sections = outline.total_steps(),
            seeded,
            "lesson loaded"
        );
        self.reset_lesson();
        self.outline = outline;
        self.progress = progress;
        self.lesson = Some(Arc::new(content));
        self.source = Some(source);
    }

    fn is_cached(&self, source: &LessonSource) -> bool {
        if self.error.is_some() {
            return false;
        }
        match (source, &self.lesson) {
            (_, None) => false,
            (LessonSource::Id(id), Some(lesson)) => lesson.id == *id,
            (slug, Some(_)) => self.source.as_ref() == Some(slug),
        }
    }
}

/// Injectable, cheaply cloneable container for lesson state.
///
/// Locks are held only for short synchronous sections, never across an `.await`.
#[derive(Clone)]
pub struct LessonStore {
    api: Arc<dyn LessonApi>,
    clock: Clock,
    state: Arc<Mutex<LessonState>>,
    notices: Arc<Mutex<VecDeque<Notice>>>,
}

impl LessonStore {
    #[must_use]
    pub fn new(api: Arc<dyn LessonApi>, clock: Clock) -> Self {
        Self {
            api,
            clock,
            state: Arc::new(Mutex::new(LessonState::default())),
            notices: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    #[must_use]
    pub fn api(&self) -> Arc<dyn LessonApi> {
        Arc::clone(&self.api)
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    fn state(&self) -> MutexGuard<'_, LessonState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` against the current state.
    pub fn read<R>(&self, f: impl FnOnce(&LessonState) -> R) -> R {
        f(&self.state())
    }

    fn update<R>(&self, f: impl FnOnce(&mut LessonState) -> R) -> R {
        f(&mut self.state())
    }

    #[must_use]
    pub fn snapshot(&self) -> LessonState {
        self.state().clone()
    }

    //
    // ─── NOTICES ───────────────────────────────────────────────────────────────
    //

    pub fn push_notice(&self, notice: Notice) {
        tracing::debug!(level = ?notice.level, title = %notice.title, "notice queued");
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(notice);
    }

    /// Take every queued notice, oldest first.
    #[must_use]
    pub fn drain_notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect()
    }

    //
    // ─── LESSON CONTENT ────────────────────────────────────────────────────────
    //

    /// # Errors
    ///
    /// Returns `StoreError::Api` when the lesson cannot be fetched; the
    /// learner-facing error is also kept in the state.
    pub async fn fetch_lesson_by_slug(&self, subject: &str, topic: &str) -> Result<(), StoreError> {
        self.load(LessonSource::Slug {
            subject: subject.to_string(),
            topic: topic.to_string(),
        })
        .await
    }

    /// Skips the request when the same lesson is already loaded.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Api` when the lesson cannot be fetched.
    pub async fn fetch_lesson_by_id(&self, id: LessonId) -> Result<(), StoreError> {
        self.load(LessonSource::Id(id)).await
    }

    /// Replay the last lesson request.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Api` when the lesson still cannot be fetched.
    pub async fn retry(&self) -> Result<(), StoreError> {
        let source = self.update(|s| {
            s.error = None;
            s.source.clone()
        });
        match source {
            Some(source) => self.load(source).await,
            None => Ok(()),
        }
    }

    async fn load(&self, source: LessonSource) -> Result<(), StoreError> {
        let generation = {
            let mut state = self.state();
            if state.is_cached(&source) {
                tracing::debug!(?source, "lesson already loaded");
                // Reaching the lesson again means any finish redirect has landed.
                state.is_redirecting = false;
                return Ok(());
            }
            if state.source.as_ref() != Some(&source) {
                state.reset_lesson();
            }
            state.generation += 1;
            state.loading.lesson = true;
            state.error = None;
            state.source = Some(source.clone());
            state.generation
        };

        let result = match &source {
            LessonSource::Slug { subject, topic } => self.api.lesson_by_slug(subject, topic).await,
            LessonSource::Id(id) => self.api.lesson_by_id(*id).await,
        };

        let mut state = self.state();
        if state.generation != generation {
            tracing::debug!(?source, "discarding stale lesson response");
            return Ok(());
        }
        state.loading.lesson = false;
        match result {
            Ok(content) => {
                state.install(content, source, self.clock.now());
                Ok(())
            }
            Err(err) => {
                tracing::warn!(?source, error = %err, "failed to load lesson");
                state.error = Some(UserFacingError::from(&err));
                Err(err.into())
            }
        }
    }

    pub fn clear_selected_lesson(&self) {
        self.update(|s| {
            s.generation += 1;
            s.loading.lesson = false;
            s.reset_lesson();
        });
    }

    pub fn clear_error(&self) {
        self.update(|s| s.error = None);
    }

    //
    // ─── STEPS ─────────────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn current_step(&self) -> usize {
        self.read(|s| s.current_step)
    }

    /// # Errors
    ///
    /// Returns `StoreError::NoLesson` without a lesson and
    /// `StoreError::Core` when `step` is out of range.
    pub fn set_step(&self, step: usize) -> Result<(), StoreError> {
        self.update(|s| {
            let mut cursor = s.cursor()?;
            cursor.jump(step)?;
            s.current_step = cursor.index();
            tracing::debug!(step, "step changed");
            Ok(())
        })
    }

    /// Returns true if the step moved.
    pub fn next_step(&self) -> bool {
        self.update(|s| {
            let Ok(mut cursor) = s.cursor() else {
                return false;
            };
            let moved = cursor.next();
            s.current_step = cursor.index();
            moved
        })
    }

    /// Returns true if the step moved.
    pub fn prev_step(&self) -> bool {
        self.update(|s| {
            let Ok(mut cursor) = s.cursor() else {
                return false;
            };
            let moved = cursor.prev();
            s.current_step = cursor.index();
            moved
        })
    }

    /// Jump to `step` if that section is accessible; otherwise queue an error notice.
    pub fn navigate_to_section(&self, step: usize) -> bool {
        let moved = self.update(|s| {
            if s.lesson.is_none() || !s.outline.is_accessible(step, s.current_step, &s.progress) {
                return false;
            }
            s.current_step = step;
            true
        });
        if !moved {
            self.push_notice(
                Notice::warning("Section not accessible")
                    .with_description("Complete previous sections first."),
            );
        }
        moved
    }

    //
    // ─── PROGRESS ──────────────────────────────────────────────────────────────
    //

    /// Returns false when the section is not part of the loaded lesson.
    pub fn mark_section_completed(&self, section: SectionId, score: Option<u8>) -> bool {
        let now = self.clock.now();
        self.update(|s| {
            let marked = s.progress.mark_completed(section, now, score);
            if marked {
                tracing::debug!(%section, ?score, "section completed");
            }
            marked
        })
    }

    /// Returns true when this answer completed the section.
    pub fn record_exercise_result(&self, section: SectionId, exercise: ExerciseId, correct: bool) -> bool {
        let now = self.clock.now();
        self.update(|s| {
            s.progress
                .get_mut(section)
                .is_some_and(|p| p.record_attempt(exercise, correct, now))
        })
    }

    /// Check an answer upstream and record the result against `section`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Api` if the check fails.
    pub async fn submit_answer(
        &self,
        section: SectionId,
        exercise: ExerciseId,
        answer: &str,
    ) -> Result<AnswerCheck, StoreError> {
        let check = match section.kind() {
            SectionKind::GeneralExercises => {
                self.api.check_general_exercise_answer(exercise, answer).await?
            }
            _ => self.api.check_exercise_answer(exercise, answer).await?,
        };
        if self.record_exercise_result(section, exercise, check.is_correct) {
            self.push_notice(Notice::success("Section completed"));
        }
        Ok(check)
    }

    /// Whether the learner may leave the current step. Sections without
    /// exercises are completed on leave; sections with exercises must already
    /// be completed.
    pub fn check_current_step_completion(&self) -> bool {
        let now = self.clock.now();
        self.update(|s| {
            let Some(id) = s.current_section().map(|section| section.id) else {
                return false;
            };
            match s.progress.get(id) {
                None => false,
                Some(p) if p.is_completed => true,
                Some(p) if p.has_exercises() => false,
                Some(_) => s.progress.mark_completed(id, now, None),
            }
        })
    }

    #[must_use]
    pub fn next_incomplete_section(&self) -> Option<Section> {
        self.read(|s| s.outline.first_incomplete(&s.progress).cloned())
    }

    /// Jump straight to the first incomplete section. Returns the new step.
    pub fn auto_advance_to_next_section(&self) -> Option<usize> {
        self.update(|s| {
            let step = s.outline.first_incomplete(&s.progress)?.step_index;
            s.current_step = step;
            Some(step)
        })
    }

    #[must_use]
    pub fn progress(&self) -> u8 {
        self.read(LessonState::percent_complete)
    }

    #[must_use]
    pub fn estimated_minutes_remaining(&self) -> Option<u32> {
        self.read(LessonState::estimated_minutes_remaining)
    }

    pub fn set_redirecting(&self, redirecting: bool) {
        self.update(|s| s.is_redirecting = redirecting);
    }

    pub fn set_celebration_shown(&self, shown: bool) {
        self.update(|s| s.celebration_shown = shown);
    }

    //
    // ─── CATALOG ───────────────────────────────────────────────────────────────
    //

    /// Merge `patch` into the filters and go back to the first page.
    pub fn set_filters(&self, patch: LessonFiltersPatch) {
        self.update(|s| {
            s.filters.merge(patch);
            s.pagination.current_page = 1;
        });
    }

    pub fn clear_filters(&self) {
        self.update(|s| {
            s.filters = LessonFilters::default();
            s.pagination.current_page = 1;
        });
    }

    #[must_use]
    pub fn can_fetch_lessons(&self) -> bool {
        self.read(LessonState::can_fetch_lessons)
    }

    /// # Errors
    ///
    /// Returns `StoreError::Api` if the selectors cannot be fetched.
    pub async fn fetch_metadata(&self) -> Result<(), StoreError> {
        self.update(|s| {
            s.loading.metadata = true;
            s.error = None;
        });
        let result = self.api.metadata().await;
        self.update(|s| {
            s.loading.metadata = false;
            match result {
                Ok(metadata) => {
                    s.metadata = metadata;
                    Ok(())
                }
                Err(err) => {
                    tracing::warn!(error = %err, "failed to fetch lesson metadata");
                    s.error = Some(UserFacingError::from(&err));
                    Err(err.into())
                }
            }
        })
    }

    /// # Errors
    ///
    /// Returns `StoreError::MissingFilters` unless all four filters are set,
    /// or `StoreError::Api` if the list cannot be fetched.
    pub async fn fetch_lessons(&self, page: u32) -> Result<(), StoreError> {
        let filters = self.update(|s| {
            if !s.filters.is_complete() {
                s.lessons.clear();
                s.error = Some(UserFacingError::new(
                    ErrorKind::Unknown,
                    StoreError::MissingFilters.to_string(),
                ));
                return None;
            }
            s.loading.lessons = true;
            s.error = None;
            Some(s.filters.clone())
        });
        let Some(filters) = filters else {
            return Err(StoreError::MissingFilters);
        };

        let result = self.api.lessons(&filters, page).await;
        self.update(|s| {
            s.loading.lessons = false;
            match result {
                Ok(list) => {
                    tracing::debug!(count = list.lessons.len(), page = list.meta.current_page, "lessons fetched");
                    s.lessons = list.lessons;
                    s.pagination = list.meta;
                    Ok(())
                }
                Err(err) => {
                    tracing::warn!(error = %err, "failed to fetch lessons");
                    s.lessons.clear();
                    s.error = Some(UserFacingError::from(&err));
                    Err(err.into())
                }
            }
        })
    }

    /// Fetch the aggregate score of the loaded lesson. Failures leave the
    /// score empty without touching the lesson error.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Api` if the score cannot be fetched.
    pub async fn fetch_lesson_score(&self) -> Result<Option<String>, StoreError> {
        let Some(id) = self.read(LessonState::lesson_id) else {
            return Ok(None);
        };
        self.update(|s| s.loading.score = true);
        let result = self.api.lesson_score(id).await;
        self.update(|s| {
            s.loading.score = false;
            let still_current = s.lesson_id() == Some(id);
            match result {
                Ok(score) if still_current => {
                    s.lesson_score = Some(score.lesson_total_score.clone());
                    Ok(Some(score.lesson_total_score))
                }
                Ok(_) => Ok(None),
                Err(err) => {
                    tracing::debug!(lesson_id = %id, error = %err, "lesson score unavailable");
                    Err(err.into())
                }
            }
        })
    }

    #[must_use]
    pub fn is_any_loading(&self) -> bool {
        self.read(|s| s.loading.any())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::InMemoryLessonApi;
    use lesson_core::model::ConceptId;
    use lesson_core::time::fixed_clock;
    use serde_json::json;

    fn lesson() -> LessonContent {
        serde_json::from_value(json!({
            "id": 5,
            "topic": "Fractions",
            "class": "JSS1",
            "subject": "Maths",
            "term": "First",
            "week": 3,
            "overview": "Parts of a whole",
            "concepts": [
                {"id": 11, "order_index": 2, "title": "Adding", "exercises": [
                    {"id": 101, "order_index": 1, "problem": "1/2 + 1/2", "correct_answer": "1"}
                ]},
                {"id": 10, "order_index": 1, "title": "Naming"}
            ],
            "general_exercises": [],
            "check_markers": []
        }))
        .unwrap()
    }

    fn store() -> (LessonStore, InMemoryLessonApi) {
        let api = InMemoryLessonApi::new();
        api.insert_lesson("maths", "fractions", lesson());
        (LessonStore::new(Arc::new(api.clone()), fixed_clock()), api)
    }

    #[tokio::test]
    async fn loads_and_caches_by_id() {
        let (store, api) = store();
        store.fetch_lesson_by_id(LessonId::new(5)).await.unwrap();
        store.fetch_lesson_by_id(LessonId::new(5)).await.unwrap();
        assert_eq!(api.calls(), 1);

        let state = store.snapshot();
        assert_eq!(state.outline.total_steps(), 5);
        // concepts are sorted by order_index
        assert_eq!(
            state.outline.section_at(1).map(|s| s.id),
            Some(SectionId::Concept(ConceptId::new(10)))
        );
        assert_eq!(state.percent_complete(), 0);
        assert_eq!(state.estimated_minutes_remaining(), Some(25));
    }

    #[tokio::test]
    async fn failed_load_keeps_user_facing_error_and_retry_recovers() {
        let (store, api) = store();
        api.fail_next_with_timeout();
        assert!(store.fetch_lesson_by_slug("maths", "fractions").await.is_err());
        let error = store.snapshot().error.unwrap();
        assert_eq!(error.kind, ErrorKind::Network);
        assert!(error.can_retry);
        assert!(!store.is_any_loading());

        store.retry().await.unwrap();
        let state = store.snapshot();
        assert!(state.error.is_none());
        assert_eq!(state.lesson_id(), Some(LessonId::new(5)));
    }

    #[tokio::test]
    async fn unknown_lesson_is_not_retryable() {
        let (store, _api) = store();
        assert!(store.fetch_lesson_by_id(LessonId::new(99)).await.is_err());
        let error = store.snapshot().error.unwrap();
        assert_eq!(error.title, "Lesson Not Found");
        assert!(!error.can_retry);
    }

    #[tokio::test]
    async fn step_bounds_and_section_access() {
        let (store, _api) = store();
        assert!(!store.next_step());
        store.fetch_lesson_by_id(LessonId::new(5)).await.unwrap();

        assert!(!store.prev_step());
        assert_eq!(store.current_step(), 0);
        assert!(store.set_step(5).is_err());
        store.set_step(4).unwrap();
        assert!(!store.next_step());
        assert_eq!(store.current_step(), 4);

        store.set_step(0).unwrap();
        assert!(!store.navigate_to_section(3));
        assert_eq!(store.current_step(), 0);
        let notices = store.drain_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].title, "Section not accessible");
        assert!(store.drain_notices().is_empty());

        store.mark_section_completed(SectionId::SummaryApplication, None);
        assert!(store.navigate_to_section(3));
        assert_eq!(store.current_step(), 3);
    }

    #[tokio::test]
    async fn leaving_a_section_requires_its_exercises() {
        let (store, _api) = store();
        store.fetch_lesson_by_id(LessonId::new(5)).await.unwrap();

        // overview has no exercises: leaving completes it
        assert!(store.check_current_step_completion());
        assert!(store.read(|s| s.progress.is_completed(SectionId::Overview)));

        store.set_step(2).unwrap();
        assert!(!store.check_current_step_completion());

        let section = SectionId::Concept(ConceptId::new(11));
        let check = store
            .submit_answer(section, ExerciseId::new(101), " 1 ")
            .await
            .unwrap();
        assert!(check.is_correct);
        assert!(store.check_current_step_completion());
        assert_eq!(store.read(|s| s.progress.get(section).and_then(|p| p.score)), Some(100));
        assert_eq!(store.progress(), 40);
    }

    #[tokio::test]
    async fn lessons_need_all_filters_and_reset_page() {
        let (store, _api) = store();
        store.set_filters(LessonFiltersPatch {
            class: Some("JSS1".into()),
            subject: Some("Maths".into()),
            ..LessonFiltersPatch::default()
        });
        assert!(!store.can_fetch_lessons());
        assert!(matches!(
            store.fetch_lessons(1).await,
            Err(StoreError::MissingFilters)
        ));
        assert_eq!(
            store.snapshot().error.map(|e| e.details),
            Some("Please select class, subject, term, and week to view lessons".to_string())
        );

        store.set_filters(LessonFiltersPatch {
            term: Some("First".into()),
            week: Some("3".into()),
            ..LessonFiltersPatch::default()
        });
        assert!(store.can_fetch_lessons());
        store.fetch_lessons(1).await.unwrap();
        assert_eq!(store.snapshot().pagination.current_page, 1);

        store.clear_filters();
        assert!(!store.can_fetch_lessons());
    }

    #[tokio::test]
    async fn clearing_drops_lesson_state() {
        let (store, api) = store();
        api.set_score(LessonId::new(5), "80");
        store.fetch_lesson_by_id(LessonId::new(5)).await.unwrap();
        assert_eq!(store.fetch_lesson_score().await.unwrap().as_deref(), Some("80"));

        store.clear_selected_lesson();
        let state = store.snapshot();
        assert!(state.lesson.is_none());
        assert!(state.lesson_score.is_none());
        assert_eq!(state.outline.total_steps(), 0);
        assert_eq!(state.estimated_minutes_remaining(), None);
    }
}
