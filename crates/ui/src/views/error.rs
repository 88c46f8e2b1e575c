use dioxus::prelude::*;

use super::ViewError;

/// Error card with an optional retry button. The button only shows for
/// retryable categories.
#[component]
pub fn ErrorPanel(error: ViewError, on_retry: Option<EventHandler<()>>) -> Element {
    let retry = on_retry.filter(|_| error.can_retry());
    rsx! {
        div { class: "error-panel", role: "alert",
            h2 { "{error.title()}" }
            p { "{error.message()}" }
            if let Some(handler) = retry {
                button { class: "retry", onclick: move |_| handler.call(()), "Try again" }
            }
        }
    }
}
