use dioxus::prelude::*;

use crate::vm::BreadcrumbItemVm;

#[component]
pub fn LessonBreadcrumb(items: Vec<BreadcrumbItemVm>, on_select: EventHandler<usize>) -> Element {
    rsx! {
        nav { aria_label: "Lesson sections",
            ol { class: "breadcrumb",
                for item in items {
                    li { key: "{item.step}", class: item.state.class(),
                        button {
                            disabled: !item.clickable,
                            onclick: move |_| on_select.call(item.step),
                            "{item.title}"
                            if let Some(badge) = item.badge.clone() {
                                span { class: "crumb-badge", "{badge}" }
                            }
                        }
                    }
                }
            }
        }
    }
}
