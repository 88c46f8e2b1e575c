use std::sync::Arc;

use dioxus::core::NoOpMutations;
use dioxus::prelude::*;
use dioxus_router::{Routable, Router};
use lesson_core::model::{LessonContent, UserId};
use lesson_core::rbac::{AuthUser, UserRole};
use lesson_core::time::fixed_clock;
use serde_json::{Value, json};
use services::{InMemoryLessonApi, LessonStore};

use crate::context::{UiApp, build_app_context};
use crate::views::{DashboardView, LessonByIdView, LessonBySlugView, LessonCompletedView};

struct TestApp {
    store: LessonStore,
    user: Option<AuthUser>,
}

impl UiApp for TestApp {
    fn lesson_store(&self) -> LessonStore {
        self.store.clone()
    }

    fn current_user(&self) -> Option<AuthUser> {
        self.user.clone()
    }
}

#[derive(Clone, PartialEq, Eq)]
pub enum ViewKind {
    Dashboard,
    LessonBySlug(String, String),
    LessonById(u64),
    Completed(u64),
}

#[derive(Props, Clone)]
struct ViewHarnessProps {
    app: Arc<TestApp>,
    view: ViewKind,
}

impl PartialEq for ViewHarnessProps {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

#[component]
fn ViewRouterHarness(props: ViewHarnessProps) -> Element {
    let app: Arc<dyn UiApp> = props.app.clone();
    use_context_provider(|| build_app_context(&app));
    use_context_provider(|| props.view.clone());
    rsx! { Router::<TestRoute> {} }
}

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum TestRoute {
    #[route("/")]
    Root {},
}

#[component]
fn Root() -> Element {
    let view = use_context::<ViewKind>();
    match view {
        ViewKind::Dashboard => rsx! { DashboardView {} },
        ViewKind::LessonBySlug(subject, topic) => rsx! { LessonBySlugView { subject, topic } },
        ViewKind::LessonById(id) => rsx! { LessonByIdView { id } },
        ViewKind::Completed(id) => rsx! { LessonCompletedView { id } },
    }
}

pub struct ViewHarness {
    pub dom: VirtualDom,
    pub api: InMemoryLessonApi,
    pub store: LessonStore,
}

impl ViewHarness {
    pub fn rebuild(&mut self) {
        self.dom.rebuild_in_place();
        drive_dom(&mut self.dom);
    }

    pub async fn drive_async(&mut self) {
        let _ = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            self.dom.wait_for_work(),
        )
        .await;
        self.dom.render_immediate(&mut NoOpMutations);
        self.dom.process_events();
    }

    /// Rebuild, then give pending resources a few turns to settle.
    pub async fn settle(&mut self) {
        self.rebuild();
        for _ in 0..3 {
            self.drive_async().await;
        }
    }

    pub fn render(&self) -> String {
        dioxus_ssr::render(&self.dom)
    }
}

pub fn drive_dom(dom: &mut VirtualDom) {
    dom.process_events();
    dom.render_immediate(&mut NoOpMutations);
    dom.process_events();
}

pub fn user_with_role(role: UserRole) -> AuthUser {
    AuthUser {
        id: UserId::new(7),
        email: "ada@example.com".to_string(),
        name: Some("Ada".to_string()),
        role: vec![role],
    }
}

/// Two concepts: "Naming" without exercises and "Adding" with one.
pub fn fractions_lesson(markers: Value) -> LessonContent {
    serde_json::from_value(json!({
        "id": 5,
        "topic": "Fractions",
        "subject": "Maths",
        "overview": "Parts of a **whole**",
        "summary": "Fractions name parts of a whole.",
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

pub fn setup_view_harness(view: ViewKind, user: Option<AuthUser>) -> ViewHarness {
    let api = InMemoryLessonApi::new();
    let store = LessonStore::new(Arc::new(api.clone()), fixed_clock());
    let app = Arc::new(TestApp {
        store: store.clone(),
        user,
    });

    let dom = VirtualDom::new_with_props(ViewRouterHarness, ViewHarnessProps { app, view });

    ViewHarness { dom, api, store }
}
