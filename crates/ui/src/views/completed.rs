use dioxus::prelude::*;
use dioxus_router::Link;

use lesson_core::model::LessonId;

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ErrorPanel, ViewError, ViewState, view_state_from_resource};

#[derive(Clone, Debug, PartialEq, Eq)]
struct CompletionData {
    topic: String,
    score: Option<String>,
}

#[component]
pub fn LessonCompletedView(id: u64) -> Element {
    let ctx = use_context::<AppContext>();
    let store = ctx.lesson_store();

    let mut resource = use_resource(move || {
        let store = store.clone();
        async move {
            store.fetch_lesson_by_id(LessonId::new(id)).await?;
            // The score is a bonus; the page still renders without it.
            let score = store.fetch_lesson_score().await.ok().flatten();
            let topic = store
                .read(|s| s.lesson.as_ref().map(|lesson| lesson.topic.clone()))
                .unwrap_or_default();
            Ok::<_, ViewError>(CompletionData { topic, score })
        }
    });

    let on_retry = use_callback(move |()| resource.restart());
    let state = view_state_from_resource(resource);

    rsx! {
        div { class: "page lesson-completed",
            h2 { "Lesson complete!" }

            match state {
                ViewState::Idle | ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Ready(data) => rsx! {
                    p { class: "completed-topic", "{data.topic}" }
                    if let Some(score) = data.score {
                        p { class: "completed-score", "Score: {score}%" }
                    }
                    ul { class: "completed-actions",
                        li { Link { to: Route::LessonById { id }, "Review lesson" } }
                        li { Link { to: Route::Dashboard {}, "Back to dashboard" } }
                    }
                },
                ViewState::Error(err) => rsx! {
                    ErrorPanel { error: err, on_retry }
                },
            }
        }
    }
}
