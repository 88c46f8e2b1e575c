use lesson_core::model::LessonId;
use lesson_core::rbac::UserRole;
use serde_json::json;

use super::test_harness::{ViewKind, fractions_lesson, setup_view_harness, user_with_role};

fn slug_view() -> ViewKind {
    ViewKind::LessonBySlug("maths".to_string(), "fractions".to_string())
}

#[tokio::test(flavor = "current_thread")]
async fn lesson_viewer_renders_overview_and_outline() {
    let mut harness = setup_view_harness(slug_view(), Some(user_with_role(UserRole::Student)));
    harness
        .api
        .insert_lesson("maths", "fractions", fractions_lesson(json!([])));

    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Fractions"), "missing topic in {html}");
    assert!(html.contains("<strong>whole</strong>"), "missing overview in {html}");
    assert!(html.contains("Naming"), "missing concept crumb in {html}");
    assert!(html.contains("Practice"), "missing practice crumb in {html}");
    assert!(html.contains("1 / 5"), "missing position in {html}");
    assert!(html.contains("Next"), "missing next button in {html}");
    assert!(html.contains("1-9 keys"), "missing keyboard hint in {html}");
    assert!(html.contains("tabindex=\"0\""), "lesson page not focusable in {html}");
    assert_eq!(harness.store.current_step(), 0);
}

#[tokio::test(flavor = "current_thread")]
async fn returning_learner_sees_resume_notice() {
    let mut harness = setup_view_harness(slug_view(), Some(user_with_role(UserRole::Student)));
    harness.api.insert_lesson(
        "maths",
        "fractions",
        fractions_lesson(json!([{"section": "overview", "weight": 10, "completed": true}])),
    );

    harness.settle().await;
    let html = harness.render();
    assert!(
        html.contains("Resuming where you left off..."),
        "missing resume notice in {html}"
    );
    assert!(html.contains("✓"), "missing completed badge in {html}");
    assert!(html.contains("20% complete"), "missing progress in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn missing_lesson_renders_not_found_without_retry() {
    let mut harness = setup_view_harness(slug_view(), Some(user_with_role(UserRole::Student)));

    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Lesson Not Found"), "missing title in {html}");
    assert!(!html.contains("Try again"), "unexpected retry in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn network_failure_offers_retry() {
    let mut harness = setup_view_harness(ViewKind::LessonById(5), None);
    harness
        .api
        .insert_lesson("maths", "fractions", fractions_lesson(json!([])));
    harness.api.fail_next_with_timeout();

    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Connection Error"), "missing title in {html}");
    assert!(html.contains("Try again"), "missing retry in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn dashboard_follows_role() {
    let mut student = setup_view_harness(
        ViewKind::Dashboard,
        Some(user_with_role(UserRole::Student)),
    );
    student.settle().await;
    let html = student.render();
    assert!(html.contains("My Lessons"), "missing title in {html}");
    assert!(
        html.contains("Select class, subject, term and week"),
        "missing filter hint in {html}"
    );

    let mut guardian = setup_view_harness(
        ViewKind::Dashboard,
        Some(user_with_role(UserRole::Guardian)),
    );
    guardian.settle().await;
    let html = guardian.render();
    assert!(html.contains("Follow your children"), "missing guardian copy in {html}");
    assert!(!html.contains("catalog-filters"), "guardian sees catalog in {html}");

    let mut guest = setup_view_harness(ViewKind::Dashboard, None);
    guest.settle().await;
    let html = guest.render();
    assert!(html.contains("Welcome to Fast Learners"), "missing onboarding in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn completion_page_shows_score() {
    let mut harness = setup_view_harness(
        ViewKind::Completed(5),
        Some(user_with_role(UserRole::Student)),
    );
    harness
        .api
        .insert_lesson("maths", "fractions", fractions_lesson(json!([])));
    harness.api.set_score(LessonId::new(5), "85");

    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Lesson complete!"), "missing heading in {html}");
    assert!(html.contains("Fractions"), "missing topic in {html}");
    assert!(html.contains("Score: 85%"), "missing score in {html}");
    assert!(html.contains("Review lesson"), "missing review link in {html}");
}
