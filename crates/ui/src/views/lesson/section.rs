use std::collections::BTreeMap;

use dioxus::prelude::*;
use lesson_core::model::ExerciseId;

use crate::vm::{BlockVm, ExerciseVm, FeedbackVm, SectionVm};

#[component]
pub fn SectionContent(
    vm: SectionVm,
    feedback: BTreeMap<ExerciseId, FeedbackVm>,
    on_answer: EventHandler<(ExerciseId, String)>,
) -> Element {
    let SectionVm {
        heading,
        title,
        blocks,
        exercises,
        is_completed,
        ..
    } = vm;
    let show_title = title != heading;

    rsx! {
        article { class: "lesson-section",
            header {
                h3 { "{heading}" }
                if show_title {
                    h4 { "{title}" }
                }
                if is_completed {
                    span { class: "section-done", "Completed" }
                }
            }
            for (idx, block) in blocks.into_iter().enumerate() {
                ContentBlock { key: "{idx}", block }
            }
            if !exercises.is_empty() {
                div { class: "exercises",
                    for exercise in exercises {
                        ExerciseCard {
                            key: "{exercise.id}",
                            feedback: feedback.get(&exercise.id).cloned(),
                            exercise,
                            on_answer,
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn ContentBlock(block: BlockVm) -> Element {
    match block {
        BlockVm::Text { heading, html } => rsx! {
            div { class: "block-text",
                if let Some(heading) = heading {
                    h4 { "{heading}" }
                }
                div { dangerous_inner_html: "{html}" }
            }
        },
        BlockVm::Points(points) => rsx! {
            ul { class: "block-points",
                for point in points {
                    li { "{point}" }
                }
            }
        },
        BlockVm::Image { src } => rsx! {
            img { class: "block-image", src: "{src}", alt: "" }
        },
        BlockVm::Video { src } => rsx! {
            video { class: "block-video", src: "{src}", controls: true }
        },
        BlockVm::Example {
            title,
            problem_html,
            steps,
            answer,
        } => rsx! {
            div { class: "block-example",
                h5 { "{title}" }
                div { dangerous_inner_html: "{problem_html}" }
                if !steps.is_empty() {
                    ol {
                        for step in steps {
                            li { "{step}" }
                        }
                    }
                }
                if !answer.is_empty() {
                    p { class: "example-answer", "Answer: {answer}" }
                }
            }
        },
    }
}

#[component]
fn ExerciseCard(
    exercise: ExerciseVm,
    feedback: Option<FeedbackVm>,
    on_answer: EventHandler<(ExerciseId, String)>,
) -> Element {
    let mut answer = use_signal(String::new);
    let id = exercise.id;
    let solved = feedback.as_ref().is_some_and(|f| f.correct);
    let empty = answer.read().trim().is_empty();

    let submit = move |_| {
        let value = answer.read().trim().to_string();
        if !value.is_empty() {
            on_answer.call((id, value));
        }
    };
    let pick = use_callback(move |value: String| answer.set(value));

    rsx! {
        div { class: if solved { "exercise solved" } else { "exercise" },
            h5 { "{exercise.title}" }
            div { class: "exercise-problem", dangerous_inner_html: "{exercise.problem_html}" }
            if exercise.options.is_empty() {
                input {
                    r#type: "text",
                    placeholder: "Your answer",
                    value: "{answer}",
                    oninput: move |evt| answer.set(evt.value()),
                }
            } else {
                div { class: "exercise-options",
                    for option in exercise.options.clone() {
                        ChoiceOption {
                            key: "{option}",
                            group: format!("exercise-{id}"),
                            checked: *answer.read() == option,
                            value: option,
                            on_pick: pick,
                        }
                    }
                }
            }
            button {
                class: "exercise-submit",
                disabled: empty || solved,
                onclick: submit,
                "Check answer"
            }
            if let Some(feedback) = feedback {
                p { class: feedback.class(), "{feedback.message}" }
            }
        }
    }
}

#[component]
fn ChoiceOption(group: String, value: String, checked: bool, on_pick: Callback<String>) -> Element {
    let picked = value.clone();
    rsx! {
        label { class: "exercise-option",
            input {
                r#type: "radio",
                name: "{group}",
                value: "{value}",
                checked,
                onchange: move |_| on_pick.call(picked.clone()),
            }
            "{value}"
        }
    }
}
