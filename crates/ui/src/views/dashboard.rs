use dioxus::prelude::*;
use dioxus_router::Link;

use services::{LessonState, LessonStore};

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ErrorPanel, ViewError, ViewState, view_state_from_resource};
use crate::vm::{
    DashboardKind, FilterField, FilterOptionVm, LessonRowVm, map_filter_options, map_lesson_rows,
};

#[component]
pub fn DashboardView() -> Element {
    let ctx = use_context::<AppContext>();
    let kind = DashboardKind::for_role(ctx.role());

    rsx! {
        div { class: "page dashboard",
            h2 { "{kind.title()}" }

            match kind {
                DashboardKind::Onboarding => rsx! {
                    p { "Choose how you will use Fast Learners to get started." }
                },
                DashboardKind::Lessons => rsx! {
                    p { "Pick your class, subject, term and week to find today's lessons." }
                    LessonCatalog {}
                },
                DashboardKind::ChildrenProgress => rsx! {
                    p { "Follow your children's lessons and scores." }
                },
                DashboardKind::LessonManagement => rsx! {
                    p { "Browse the lessons you teach." }
                    LessonCatalog {}
                },
                DashboardKind::AdminOverview => rsx! {
                    p { "Lessons across every class." }
                    LessonCatalog {}
                },
                DashboardKind::SuperadminConsole => rsx! {
                    p { "Platform-wide lesson catalog." }
                    LessonCatalog {}
                },
            }
        }
    }
}

fn load_page(store: LessonStore, mut snapshot: Signal<LessonState>, page: u32) {
    spawn(async move {
        if let Err(err) = store.fetch_lessons(page).await {
            tracing::debug!(page, error = %err, "lesson list unavailable");
        }
        snapshot.set(store.snapshot());
    });
}

#[component]
fn LessonCatalog() -> Element {
    let ctx = use_context::<AppContext>();
    let store = ctx.lesson_store();
    let mut snapshot = use_signal(|| store.snapshot());

    let mut metadata = {
        let store = store.clone();
        use_resource(move || {
            let store = store.clone();
            async move {
                let result = store.fetch_metadata().await;
                snapshot.set(store.snapshot());
                result.map_err(ViewError::from)
            }
        })
    };

    let on_filter = {
        let store = store.clone();
        use_callback(move |(field, value): (FilterField, String)| {
            store.set_filters(field.patch(value));
            snapshot.set(store.snapshot());
            if store.can_fetch_lessons() {
                load_page(store.clone(), snapshot, 1);
            }
        })
    };

    let on_page = {
        let store = store.clone();
        use_callback(move |page: u32| load_page(store.clone(), snapshot, page))
    };

    let on_retry = use_callback(move |()| metadata.restart());

    if let ViewState::Error(err) = view_state_from_resource(metadata) {
        return rsx! {
            ErrorPanel { error: err, on_retry }
        };
    }

    let (selects, rows, filters_ready, loading, page, last_page) = {
        let state = snapshot.read();
        let selects: Vec<(FilterField, Vec<FilterOptionVm>, String)> = FilterField::ALL
            .into_iter()
            .map(|field| {
                (
                    field,
                    map_filter_options(field.items(&state.metadata)),
                    field.value(&state.filters).to_string(),
                )
            })
            .collect();
        (
            selects,
            map_lesson_rows(&state.lessons),
            state.can_fetch_lessons(),
            state.loading.lessons,
            state.pagination.current_page,
            state.pagination.last_page,
        )
    };

    rsx! {
        div { class: "lesson-catalog",
            div { class: "catalog-filters",
                for (field, options, value) in selects {
                    FilterSelect { key: "{field.label()}", field, options, value, on_change: on_filter }
                }
            }
            if !filters_ready {
                p { class: "catalog-hint", "Select class, subject, term and week to see lessons." }
            } else if loading {
                p { "Loading lessons..." }
            } else if rows.is_empty() {
                p { "No lessons found." }
            } else {
                ul { class: "catalog-lessons",
                    for row in rows {
                        LessonRow { key: "{row.id}", row }
                    }
                }
                if last_page > 1 {
                    div { class: "catalog-pages",
                        button {
                            disabled: page <= 1,
                            onclick: move |_| on_page.call(page.saturating_sub(1)),
                            "Previous"
                        }
                        span { "Page {page} of {last_page}" }
                        button {
                            disabled: page >= last_page,
                            onclick: move |_| on_page.call(page + 1),
                            "Next"
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn FilterSelect(
    field: FilterField,
    options: Vec<FilterOptionVm>,
    value: String,
    on_change: Callback<(FilterField, String)>,
) -> Element {
    rsx! {
        label { class: "catalog-filter",
            "{field.label()}"
            select {
                value: "{value}",
                onchange: move |evt| on_change.call((field, evt.value())),
                option { value: "", "Select {field.label()}" }
                for item in options {
                    option { value: "{item.value}", selected: item.value == value, "{item.label}" }
                }
            }
        }
    }
}

#[component]
fn LessonRow(row: LessonRowVm) -> Element {
    rsx! {
        li { class: if row.is_active { "lesson-row" } else { "lesson-row inactive" },
            Link { to: Route::LessonById { id: row.id }, "{row.topic}" }
            if !row.details.is_empty() {
                span { class: "lesson-details", " {row.details}" }
            }
        }
    }
}
