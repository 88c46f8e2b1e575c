use dioxus::prelude::*;
use dioxus_router::{Link, Outlet, Routable};

use crate::context::AppContext;
use crate::views::{DashboardView, LessonByIdView, LessonBySlugView, LessonCompletedView};

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    #[layout(Layout)]
        #[route("/", DashboardView)] Dashboard {},
        #[route("/lessons/:subject/:topic", LessonBySlugView)] LessonBySlug { subject: String, topic: String },
        #[route("/lessons/id/:id", LessonByIdView)] LessonById { id: u64 },
        #[route("/dashboard/lessons/completed/:id", LessonCompletedView)] LessonCompleted { id: u64 },
}

#[component]
fn Layout() -> Element {
    rsx! {
        div { class: "app",
            Sidebar {}
            main { class: "content",
                Outlet::<Route> {}
            }
        }
    }
}

#[component]
fn Sidebar() -> Element {
    let ctx = use_context::<AppContext>();
    let signed_in = ctx
        .current_user()
        .map(|user| user.name.clone().unwrap_or_else(|| user.email.clone()));

    rsx! {
        nav { class: "sidebar",
            h1 { "Fast Learners" }
            ul {
                li { Link { to: Route::Dashboard {}, "Dashboard" } }
            }
            if let Some(name) = signed_in {
                p { class: "sidebar-user", "{name}" }
            }
        }
    }
}
