use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use dioxus::prelude::*;
use dioxus_router::use_navigator;

use lesson_core::model::{ExerciseId, LessonId};
use services::{
    AutoAdvanceScheduler, LessonSource, LessonState, LessonStore, NextOutcome, Notice,
};

use super::breadcrumb::LessonBreadcrumb;
use super::controls::{LessonProgress, NavigationControls};
use super::section::SectionContent;
use crate::context::AppContext;
use crate::routes::Route;
use crate::views::notices::{NoticeList, push_notices};
use crate::views::{ErrorPanel, ViewError};
use crate::vm::{FeedbackVm, NavKey, map_breadcrumb, map_nav, map_section};

/// How often the viewer looks for changes made outside an event handler,
/// such as the delayed auto-advance jump.
const STORE_POLL: Duration = Duration::from_millis(250);

#[component]
pub fn LessonBySlugView(subject: String, topic: String) -> Element {
    let key = format!("{subject}/{topic}");
    rsx! {
        LessonViewer { key: "{key}", source: LessonSource::Slug { subject, topic } }
    }
}

#[component]
pub fn LessonByIdView(id: u64) -> Element {
    rsx! {
        LessonViewer { key: "{id}", source: LessonSource::Id(LessonId::new(id)) }
    }
}

/// Copy the store into the view signals and pick up queued notices.
fn refresh(store: &LessonStore, mut snapshot: Signal<LessonState>, notices: Signal<Vec<Notice>>) {
    snapshot.set(store.snapshot());
    push_notices(notices, store.drain_notices());
}

/// Let the auto-advance controller see the new state, then redraw.
fn settle(
    store: &LessonStore,
    scheduler: &AutoAdvanceScheduler,
    snapshot: Signal<LessonState>,
    notices: Signal<Vec<Notice>>,
) {
    scheduler.sync();
    refresh(store, snapshot, notices);
}

#[component]
fn LessonViewer(source: LessonSource) -> Element {
    let ctx = use_context::<AppContext>();
    let router = use_navigator();
    let store = ctx.lesson_store();
    let scheduler = ctx.auto_advance();

    let snapshot = use_signal(|| store.snapshot());
    let notices = use_signal(Vec::<Notice>::new);
    let mut feedback = use_signal(BTreeMap::<ExerciseId, FeedbackVm>::new);

    {
        let store = store.clone();
        let scheduler = Arc::clone(&scheduler);
        use_resource(move || {
            let store = store.clone();
            let scheduler = Arc::clone(&scheduler);
            let source = source.clone();
            async move {
                let result = match &source {
                    LessonSource::Slug { subject, topic } => {
                        store.fetch_lesson_by_slug(subject, topic).await
                    }
                    LessonSource::Id(id) => store.fetch_lesson_by_id(*id).await,
                };
                settle(&store, &scheduler, snapshot, notices);
                result.map_err(ViewError::from)
            }
        });
    }

    {
        let store = store.clone();
        use_future(move || {
            let store = store.clone();
            async move {
                loop {
                    tokio::time::sleep(STORE_POLL).await;
                    let (step, celebrated) = store.read(|s| (s.current_step, s.celebration_shown));
                    let stale = {
                        let current = snapshot.peek();
                        current.current_step != step || current.celebration_shown != celebrated
                    };
                    if stale {
                        refresh(&store, snapshot, notices);
                    } else {
                        push_notices(notices, store.drain_notices());
                    }
                }
            }
        });
    }

    {
        let scheduler = Arc::clone(&scheduler);
        use_drop(move || scheduler.cancel());
    }

    let on_previous = {
        let navigator = ctx.navigator();
        let store = store.clone();
        let scheduler = Arc::clone(&scheduler);
        use_callback(move |()| {
            if navigator.handle_prev() {
                settle(&store, &scheduler, snapshot, notices);
            }
        })
    };

    let on_next = {
        let navigator = ctx.navigator();
        let store = store.clone();
        let scheduler = Arc::clone(&scheduler);
        use_callback(move |()| {
            let navigator = navigator.clone();
            let store = store.clone();
            let scheduler = Arc::clone(&scheduler);
            spawn(async move {
                let outcome = navigator.handle_next().await;
                settle(&store, &scheduler, snapshot, notices);
                if let NextOutcome::Completed { .. } = outcome {
                    if let Some(id) = snapshot.peek().lesson_id() {
                        router.push(Route::LessonCompleted { id: id.value() });
                    }
                }
            });
        })
    };

    let on_select = {
        let navigator = ctx.navigator();
        let store = store.clone();
        let scheduler = Arc::clone(&scheduler);
        use_callback(move |step: usize| {
            navigator.navigate_to_section(step);
            settle(&store, &scheduler, snapshot, notices);
        })
    };

    let on_answer = {
        let store = store.clone();
        use_callback(move |(exercise, answer): (ExerciseId, String)| {
            let Some(section) = snapshot.peek().current_section().map(|s| s.id) else {
                return;
            };
            let store = store.clone();
            spawn(async move {
                match store.submit_answer(section, exercise, &answer).await {
                    Ok(check) => {
                        feedback.write().insert(exercise, FeedbackVm::from_check(&check));
                    }
                    Err(err) => {
                        tracing::warn!(%exercise, error = %err, "answer check failed");
                        store.push_notice(Notice::error("Failed to check answer"));
                    }
                }
                refresh(&store, snapshot, notices);
            });
        })
    };

    let on_retry = {
        let store = store.clone();
        let scheduler = Arc::clone(&scheduler);
        use_callback(move |()| {
            let store = store.clone();
            let scheduler = Arc::clone(&scheduler);
            spawn(async move {
                if let Err(err) = store.retry().await {
                    tracing::debug!(error = %err, "retry failed");
                }
                settle(&store, &scheduler, snapshot, notices);
            });
        })
    };

    let state = snapshot.read();
    let notice_list = notices.read().clone();

    if let Some(error) = state.error.clone() {
        return rsx! {
            div { class: "page lesson",
                NoticeList { notices: notice_list }
                ErrorPanel { error: ViewError::from(error), on_retry }
            }
        };
    }

    let Some(lesson) = state.lesson.clone() else {
        return rsx! {
            div { class: "page lesson",
                p { "Loading lesson..." }
            }
        };
    };

    let crumbs = map_breadcrumb(&state);
    let nav = map_nav(&state);
    let section = map_section(&state);
    let feedback_map = feedback.read().clone();

    let on_key = {
        let nav = nav.clone();
        move |evt: KeyboardEvent| {
            let Some(action) = nav.key_action(&evt.data.key()) else {
                return;
            };
            evt.prevent_default();
            match action {
                NavKey::Previous => on_previous.call(()),
                NavKey::Next => on_next.call(()),
                NavKey::Section(step) => on_select.call(step),
            }
        }
    };

    rsx! {
        div { class: "page lesson", tabindex: "0", onkeydown: on_key,
            h2 { "{lesson.topic}" }
            LessonProgress {
                percent: nav.percent_complete,
                time_remaining: nav.time_remaining.clone(),
            }
            NoticeList { notices: notice_list }
            LessonBreadcrumb { items: crumbs, on_select }
            if let Some(section) = section {
                SectionContent { vm: section, feedback: feedback_map, on_answer }
            }
            NavigationControls { vm: nav, on_previous, on_next }
        }
    }
}
