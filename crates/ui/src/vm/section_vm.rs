use lesson_core::model::{Concept, ExerciseId, LessonContent};
use lesson_core::progress::{SectionId, SectionKind};
use services::{AnswerCheck, LessonState};

use super::markdown_vm::rich_text_html;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BlockVm {
    Text {
        heading: Option<String>,
        html: String,
    },
    Points(Vec<String>),
    Image {
        src: String,
    },
    Video {
        src: String,
    },
    Example {
        title: String,
        problem_html: String,
        steps: Vec<String>,
        answer: String,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExerciseVm {
    pub id: ExerciseId,
    pub title: String,
    pub problem_html: String,
    /// Multiple-choice options; empty means a free-text answer.
    pub options: Vec<String>,
}

/// Result line shown under an answered exercise.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeedbackVm {
    pub correct: bool,
    pub message: String,
}

impl FeedbackVm {
    #[must_use]
    pub fn from_check(check: &AnswerCheck) -> Self {
        let message = if !check.message.trim().is_empty() {
            check.message.clone()
        } else if check.is_correct {
            "Correct!".to_string()
        } else {
            "Not quite. Try again.".to_string()
        };
        Self {
            correct: check.is_correct,
            message,
        }
    }

    #[must_use]
    pub fn class(&self) -> &'static str {
        if self.correct {
            "exercise-feedback correct"
        } else {
            "exercise-feedback wrong"
        }
    }
}

/// The body of the section at the current step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SectionVm {
    pub id: SectionId,
    pub heading: String,
    pub title: String,
    pub blocks: Vec<BlockVm>,
    pub exercises: Vec<ExerciseVm>,
    pub is_completed: bool,
}

fn text(heading: Option<&str>, body: &str) -> Option<BlockVm> {
    if body.trim().is_empty() {
        return None;
    }
    Some(BlockVm::Text {
        heading: heading.map(str::to_string),
        html: rich_text_html(body),
    })
}

fn overview_blocks(lesson: &LessonContent) -> Vec<BlockVm> {
    let mut blocks: Vec<BlockVm> = text(None, &lesson.overview).into_iter().collect();
    if let Some(src) = lesson.video_path.as_ref().filter(|p| !p.is_empty()) {
        blocks.push(BlockVm::Video { src: src.clone() });
    }
    for objective in &lesson.objectives {
        blocks.extend(text(Some("Objectives"), &objective.description));
        if !objective.points.is_empty() {
            blocks.push(BlockVm::Points(objective.points.clone()));
        }
    }
    blocks
}

fn concept_blocks(concept: &Concept) -> (Vec<BlockVm>, Vec<ExerciseVm>) {
    let mut blocks = Vec::new();
    for description in &concept.description {
        blocks.extend(text(description.heading.as_deref(), &description.description));
        if !description.points.is_empty() {
            blocks.push(BlockVm::Points(description.points.clone()));
        }
        if let Some(src) = description.image_path.as_ref().filter(|p| !p.is_empty()) {
            blocks.push(BlockVm::Image { src: src.clone() });
        }
    }
    for (idx, example) in concept.examples.iter().enumerate() {
        let title = if example.title.trim().is_empty() {
            format!("Example {}", idx + 1)
        } else {
            example.title.clone()
        };
        blocks.push(BlockVm::Example {
            title,
            problem_html: rich_text_html(&example.problem),
            steps: example.solution_steps.clone(),
            answer: example.answer.clone(),
        });
    }
    let exercises = concept
        .exercises
        .iter()
        .enumerate()
        .map(|(idx, exercise)| ExerciseVm {
            id: exercise.id,
            title: if exercise.title.trim().is_empty() {
                format!("Exercise {}", idx + 1)
            } else {
                exercise.title.clone()
            },
            problem_html: rich_text_html(&exercise.problem),
            options: exercise.answers.clone(),
        })
        .collect();
    (blocks, exercises)
}

#[must_use]
pub fn map_section(state: &LessonState) -> Option<SectionVm> {
    let lesson = state.lesson.as_ref()?;
    let section = state.current_section()?;

    let (blocks, exercises) = match section.id {
        SectionId::Overview => (overview_blocks(lesson), Vec::new()),
        SectionId::Concept(id) => lesson
            .concept_by_id(id)
            .map(concept_blocks)
            .unwrap_or_default(),
        SectionId::SummaryApplication => (
            text(Some("Summary"), &lesson.summary)
                .into_iter()
                .chain(text(Some("Application"), &lesson.application))
                .collect(),
            Vec::new(),
        ),
        SectionId::GeneralExercises => (
            Vec::new(),
            lesson
                .general_exercises
                .iter()
                .enumerate()
                .map(|(idx, exercise)| ExerciseVm {
                    id: exercise.id,
                    title: format!("Exercise {}", idx + 1),
                    problem_html: rich_text_html(&exercise.problem),
                    options: exercise.answers.clone(),
                })
                .collect(),
        ),
    };

    let concept_index = matches!(section.kind, SectionKind::Concept)
        .then(|| section.step_index.saturating_sub(1));

    Some(SectionVm {
        id: section.id,
        heading: section.kind.heading(concept_index),
        title: section.title.clone(),
        blocks,
        exercises,
        is_completed: state.progress.is_completed(section.id),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use lesson_core::model::ConceptId;
    use lesson_core::progress::ProgressMap;
    use lesson_core::sequencer::LessonOutline;
    use serde_json::json;

    use super::*;

    fn state_at(step: usize) -> LessonState {
        let lesson: LessonContent = serde_json::from_value(json!({
            "id": 3,
            "topic": "Fractions",
            "overview": "A fraction is **part** of a whole.",
            "objectives": [{"description": "Name fractions", "points": ["halves", "quarters"]}],
            "summary": "We met fractions.",
            "application": "",
            "concepts": [{
                "id": 7,
                "title": "Halves",
                "description": [{"heading": "Idea", "description": "Split in two", "image_path": "/img/half.png"}],
                "examples": [{"id": 1, "problem": "Half of 4", "solution_steps": ["4 / 2"], "answer": "2"}],
                "exercises": [{"id": 70, "problem": "Half of 6", "answers": ["2", "3"], "correct_answer": "3"}]
            }],
            "general_exercises": [{"id": 90, "problem": "Half of 10", "correct_answer": "5"}]
        }))
        .unwrap();
        let mut state = LessonState::default();
        state.outline = LessonOutline::from_concepts(&lesson.concepts);
        state.progress = ProgressMap::for_lesson(&lesson.concepts, lesson.general_exercises.len());
        state.lesson = Some(Arc::new(lesson));
        state.current_step = step;
        state
    }

    #[test]
    fn overview_renders_markdown_and_objectives() {
        let vm = map_section(&state_at(0)).unwrap();
        assert_eq!(vm.heading, "Overview");
        assert!(vm.exercises.is_empty());
        let BlockVm::Text { html, .. } = &vm.blocks[0] else {
            panic!("expected text block, got {:?}", vm.blocks[0]);
        };
        assert!(html.contains("<strong>part</strong>"));
        assert_eq!(
            vm.blocks[2],
            BlockVm::Points(vec!["halves".to_string(), "quarters".to_string()])
        );
    }

    #[test]
    fn concept_carries_examples_and_exercises() {
        let vm = map_section(&state_at(1)).unwrap();
        assert_eq!(vm.id, SectionId::Concept(ConceptId::new(7)));
        assert_eq!(vm.heading, "Concept 1");
        assert_eq!(vm.title, "Halves");
        assert!(vm.blocks.contains(&BlockVm::Image {
            src: "/img/half.png".to_string()
        }));
        assert!(vm
            .blocks
            .iter()
            .any(|b| matches!(b, BlockVm::Example { title, answer, .. } if title == "Example 1" && answer == "2")));
        assert_eq!(vm.exercises.len(), 1);
        assert_eq!(vm.exercises[0].title, "Exercise 1");
        assert_eq!(vm.exercises[0].options, vec!["2", "3"]);
    }

    #[test]
    fn summary_skips_empty_application() {
        let vm = map_section(&state_at(2)).unwrap();
        assert_eq!(vm.heading, "Summary & Application");
        assert_eq!(vm.blocks.len(), 1);
    }

    #[test]
    fn practice_lists_general_exercises() {
        let vm = map_section(&state_at(3)).unwrap();
        assert_eq!(vm.heading, "General Exercises");
        assert_eq!(vm.exercises[0].id, ExerciseId::new(90));
        assert!(vm.exercises[0].options.is_empty());
    }

    #[test]
    fn feedback_prefers_upstream_message() {
        let wrong = FeedbackVm::from_check(&AnswerCheck {
            is_correct: false,
            message: String::new(),
        });
        assert_eq!(wrong.message, "Not quite. Try again.");
        assert_eq!(wrong.class(), "exercise-feedback wrong");

        let right = FeedbackVm::from_check(&AnswerCheck {
            is_correct: true,
            message: "Well done".to_string(),
        });
        assert_eq!(right.message, "Well done");
    }

    #[test]
    fn nothing_without_a_lesson() {
        assert_eq!(map_section(&LessonState::default()), None);
    }
}
