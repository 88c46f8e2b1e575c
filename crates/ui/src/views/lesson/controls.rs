use dioxus::prelude::*;

use crate::vm::NavVm;

#[component]
pub fn NavigationControls(
    vm: NavVm,
    on_previous: EventHandler<()>,
    on_next: EventHandler<()>,
) -> Element {
    rsx! {
        div { class: "lesson-nav",
            button {
                class: "nav-previous",
                aria_label: "Go to previous section",
                disabled: vm.previous_disabled,
                onclick: move |_| on_previous.call(()),
                "Previous"
            }
            span { class: "nav-position", "{vm.position}" }
            span { class: "nav-hint", "Use ← → or 1-9 keys" }
            button {
                class: "nav-next",
                aria_label: vm.next_aria_label,
                disabled: vm.next_disabled,
                onclick: move |_| on_next.call(()),
                "{vm.next_label}"
            }
        }
    }
}

#[component]
pub fn LessonProgress(percent: u8, time_remaining: Option<String>) -> Element {
    rsx! {
        div { class: "lesson-progress",
            div { class: "progress-bar",
                div { style: "width: {percent}%" }
            }
            span { "{percent}% complete" }
            if let Some(remaining) = time_remaining {
                span { class: "time-remaining", " · {remaining}" }
            }
        }
    }
}
