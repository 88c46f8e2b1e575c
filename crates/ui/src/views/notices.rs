use dioxus::prelude::*;
use services::{Notice, NoticeLevel};

/// How many notices stay on screen.
pub const MAX_VISIBLE_NOTICES: usize = 3;

fn level_class(level: NoticeLevel) -> &'static str {
    match level {
        NoticeLevel::Info => "notice info",
        NoticeLevel::Success => "notice success",
        NoticeLevel::Warning => "notice warning",
        NoticeLevel::Error => "notice error",
    }
}

/// Append freshly drained notices, keeping only the most recent few.
pub fn push_notices(mut notices: Signal<Vec<Notice>>, fresh: Vec<Notice>) {
    if fresh.is_empty() {
        return;
    }
    let mut list = notices.write();
    list.extend(fresh);
    let overflow = list.len().saturating_sub(MAX_VISIBLE_NOTICES);
    list.drain(..overflow);
}

#[component]
pub fn NoticeList(notices: Vec<Notice>) -> Element {
    if notices.is_empty() {
        return rsx! {};
    }
    rsx! {
        ul { class: "notices", "aria-live": "polite",
            for notice in notices {
                li { class: level_class(notice.level),
                    strong { "{notice.title}" }
                    if let Some(description) = notice.description {
                        span { " {description}" }
                    }
                }
            }
        }
    }
}
