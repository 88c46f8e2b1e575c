use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use serde_json::{Value, json};

use lesson_core::auto_advance::AutoAdvanceDecision;
use lesson_core::model::{ConceptId, ExerciseId, LessonContent, LessonId};
use lesson_core::progress::SectionId;
use lesson_core::time::fixed_clock;
use services::{
    AutoAdvanceScheduler, InMemoryLessonApi, LessonNavigator, LessonStore, NextOutcome,
    NoticeLevel,
};

const LESSON: u64 = 5;

fn lesson(markers: Value) -> LessonContent {
    serde_json::from_value(json!({
        "id": LESSON,
        "topic": "Fractions",
        "subject": "Maths",
        "overview": "Parts of a whole",
        "concepts": [
            {"id": 10, "order_index": 1, "title": "Naming"},
            {"id": 11, "order_index": 2, "title": "Adding", "exercises": [
                {"id": 101, "order_index": 1, "problem": "1/2 + 1/2", "correct_answer": "1"}
            ]}
        ],
        "check_markers": markers
    }))
    .expect("lesson fixture")
}

async fn loaded(markers: Value) -> (LessonStore, InMemoryLessonApi) {
    let api = InMemoryLessonApi::new();
    api.insert_lesson("maths", "fractions", lesson(markers));
    let store = LessonStore::new(Arc::new(api.clone()), fixed_clock());
    store
        .fetch_lesson_by_slug("maths", "fractions")
        .await
        .expect("lesson loads");
    (store, api)
}

fn completed(section: &str) -> Value {
    json!({"section": section, "weight": 10, "completed": true})
}

#[tokio::test(start_paused = true)]
async fn resumes_at_first_incomplete_section_after_delay() {
    let (store, _api) = loaded(json!([completed("overview")])).await;
    let scheduler = AutoAdvanceScheduler::new(store.clone());

    let decision = scheduler.sync();
    assert_eq!(
        decision,
        AutoAdvanceDecision::Schedule {
            target_step: 1,
            section: SectionId::Concept(ConceptId::new(10)),
        }
    );
    let notices = store.drain_notices();
    assert_eq!(notices[0].title, "Resuming where you left off...");

    tokio::time::sleep(Duration::from_millis(999)).await;
    assert_eq!(store.current_step(), 0);

    tokio::time::sleep(Duration::from_millis(2)).await;
    assert_eq!(store.current_step(), 1);
    assert!(scheduler.has_advanced());

    // once advanced, returning to the overview does not trigger again
    store.set_step(0).expect("step 0");
    assert_eq!(scheduler.sync(), AutoAdvanceDecision::Wait);
}

#[tokio::test(start_paused = true)]
async fn manual_navigation_cancels_pending_jump() {
    let (store, _api) = loaded(json!([completed("overview")])).await;
    let scheduler = AutoAdvanceScheduler::new(store.clone());
    assert!(matches!(
        scheduler.sync(),
        AutoAdvanceDecision::Schedule { .. }
    ));

    store.set_step(3).expect("step 3");
    assert_eq!(scheduler.sync(), AutoAdvanceDecision::Cancel);

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(store.current_step(), 3);
    assert!(!scheduler.has_advanced());
}

#[tokio::test(start_paused = true)]
async fn fully_completed_lesson_celebrates_instead_of_jumping() {
    let markers = json!([
        completed("overview"),
        completed("concept_one"),
        completed("concept_two"),
        completed("summary_application"),
        completed("general_exercises"),
    ]);
    let (store, _api) = loaded(markers).await;
    let scheduler = AutoAdvanceScheduler::new(store.clone());

    assert_eq!(scheduler.sync(), AutoAdvanceDecision::CompleteLesson);
    assert!(store.read(|s| s.celebration_shown));
    assert_eq!(store.progress(), 100);

    let notices = store.drain_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Success);
    assert_eq!(notices[0].title, "Lesson completed!");

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(store.current_step(), 0);
}

#[tokio::test]
async fn next_walks_the_lesson_and_completes_it() {
    let (store, api) = loaded(json!([])).await;
    let navigator = LessonNavigator::new(store.clone());

    assert!(!navigator.handle_prev());
    assert_eq!(navigator.handle_next().await, NextOutcome::Moved { step: 1 });
    assert_eq!(navigator.handle_next().await, NextOutcome::Moved { step: 2 });

    // concept 11 has an exercise that has not been answered
    assert_eq!(navigator.handle_next().await, NextOutcome::Blocked);
    let notices = store.drain_notices();
    assert_eq!(notices[0].title, "Cannot proceed");
    assert_eq!(
        notices[0].description.as_deref(),
        Some("Please complete the current section first.")
    );

    let check = store
        .submit_answer(
            SectionId::Concept(ConceptId::new(11)),
            ExerciseId::new(101),
            "1",
        )
        .await
        .expect("answer checked");
    assert!(check.is_correct);

    assert_eq!(navigator.handle_next().await, NextOutcome::Moved { step: 3 });
    assert_eq!(navigator.handle_next().await, NextOutcome::Moved { step: 4 });
    assert!(navigator.controls().is_last_step());

    assert_eq!(
        navigator.handle_next().await,
        NextOutcome::Completed {
            redirect: "/dashboard/lessons/completed/5".to_string()
        }
    );
    assert_eq!(api.completed_lessons(), vec![LessonId::new(LESSON)]);
    assert!(store.read(|s| s.is_redirecting && s.celebration_shown));

    // while the redirect is in flight the controls stay locked
    assert_eq!(navigator.handle_next().await, NextOutcome::Ignored);
    assert!(!navigator.handle_prev());
    assert_eq!(api.completed_lessons().len(), 1);
}

#[tokio::test]
async fn revisiting_a_finished_lesson_unlocks_navigation() {
    let markers = json!([
        completed("overview"),
        completed("concept_one"),
        completed("concept_two"),
        completed("summary_application"),
    ]);
    let (store, api) = loaded(markers).await;
    let navigator = LessonNavigator::new(store.clone());
    store.set_step(4).expect("last step");
    assert!(matches!(
        navigator.handle_next().await,
        NextOutcome::Completed { .. }
    ));

    // the completion page, then "Review lesson", both load the cached lesson
    store
        .fetch_lesson_by_id(LessonId::new(LESSON))
        .await
        .expect("completion page");
    store
        .fetch_lesson_by_id(LessonId::new(LESSON))
        .await
        .expect("review lesson");

    let controls = navigator.controls();
    assert!(!store.read(|s| s.is_redirecting));
    assert!(!controls.previous_disabled());
    assert!(!controls.next_disabled());
    assert!(navigator.handle_prev());
    assert_eq!(store.current_step(), 3);
    assert!(navigator.navigate_to_section(0));

    // the celebration already happened, so finishing again does not re-post
    store.set_step(4).expect("last step");
    assert_eq!(navigator.handle_next().await, NextOutcome::Stayed);
    assert_eq!(api.completed_lessons().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn cancel_after_advancing_does_not_rearm_the_lesson() {
    let (store, _api) = loaded(json!([completed("overview")])).await;
    let scheduler = AutoAdvanceScheduler::new(store.clone());
    assert!(matches!(
        scheduler.sync(),
        AutoAdvanceDecision::Schedule { .. }
    ));
    tokio::time::sleep(Duration::from_millis(1001)).await;
    assert_eq!(store.current_step(), 1);

    // the viewer unmounts, then the learner reopens the lesson on the overview
    scheduler.cancel();
    store.set_step(0).expect("step 0");
    assert_eq!(scheduler.sync(), AutoAdvanceDecision::Wait);

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(store.current_step(), 0);
}

#[tokio::test(start_paused = true)]
async fn jump_lands_on_the_section_incomplete_when_it_fires() {
    let (store, _api) = loaded(json!([completed("overview")])).await;
    let scheduler = AutoAdvanceScheduler::new(store.clone());
    assert!(matches!(
        scheduler.sync(),
        AutoAdvanceDecision::Schedule { target_step: 1, .. }
    ));

    assert!(store.mark_section_completed(SectionId::Concept(ConceptId::new(10)), None));
    tokio::time::sleep(Duration::from_millis(1001)).await;
    assert_eq!(store.current_step(), 2);
}

#[tokio::test]
async fn failed_completion_can_be_retried() {
    let markers = json!([
        completed("overview"),
        completed("concept_one"),
        completed("concept_two"),
        completed("summary_application"),
    ]);
    let (store, api) = loaded(markers).await;
    let navigator = LessonNavigator::new(store.clone());
    store.set_step(4).expect("last step");

    api.fail_next_with_status(StatusCode::INTERNAL_SERVER_ERROR, "boom");
    assert_eq!(navigator.handle_next().await, NextOutcome::CompletionFailed);
    assert!(store.read(|s| !s.is_redirecting && !s.celebration_shown));
    let notices = store.drain_notices();
    assert_eq!(notices[0].title, "Failed to load completion summary");
    assert!(api.completed_lessons().is_empty());

    assert!(matches!(
        navigator.handle_next().await,
        NextOutcome::Completed { .. }
    ));
    assert_eq!(api.completed_lessons(), vec![LessonId::new(LESSON)]);
}

#[tokio::test]
async fn section_jumps_respect_progress() {
    let (store, _api) = loaded(json!([completed("overview")])).await;
    let navigator = LessonNavigator::new(store.clone());
    store.set_step(2).expect("step 2");

    assert!(navigator.navigate_to_section(0));
    assert!(!navigator.navigate_to_section(3));
    assert_eq!(store.current_step(), 0);
    let notices = store.drain_notices();
    assert_eq!(notices[0].level, NoticeLevel::Warning);
    assert_eq!(notices[0].title, "Section not accessible");
}
