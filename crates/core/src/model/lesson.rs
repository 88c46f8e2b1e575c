use serde::{Deserialize, Serialize};

use super::de::{lenient_u32, nullable, string_or_number};
use super::ids::{ConceptId, ExerciseId, LessonId};

/// A learning objective and its bullet points.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LessonObjective {
    #[serde(default, deserialize_with = "nullable")]
    pub description: String,
    #[serde(default, deserialize_with = "nullable")]
    pub points: Vec<String>,
}

/// One block of a concept's explanation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConceptDescription {
    #[serde(default)]
    pub heading: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: String,
    #[serde(default)]
    pub image_path: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub points: Vec<String>,
}

/// A worked example attached to a concept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Example {
    pub id: u64,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub order_index: u32,
    #[serde(default, deserialize_with = "nullable")]
    pub title: String,
    #[serde(default, deserialize_with = "nullable")]
    pub problem: String,
    #[serde(default, deserialize_with = "nullable")]
    pub solution_steps: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub answer: String,
}

/// A graded exercise attached to a concept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: ExerciseId,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub order_index: u32,
    #[serde(default, deserialize_with = "nullable")]
    pub title: String,
    #[serde(default, deserialize_with = "nullable")]
    pub problem: String,
    #[serde(default, deserialize_with = "nullable")]
    pub solution_steps: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub answers: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub correct_answer: String,
}

/// An exercise covering the whole lesson, shown in the practice section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneralExercise {
    pub id: ExerciseId,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub order_index: u32,
    #[serde(default, deserialize_with = "nullable")]
    pub problem: String,
    #[serde(default, deserialize_with = "nullable")]
    pub solution_steps: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub answers: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub correct_answer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Concept {
    pub id: ConceptId,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub order_index: u32,
    #[serde(default, deserialize_with = "nullable")]
    pub title: String,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Vec<ConceptDescription>,
    #[serde(default, deserialize_with = "nullable")]
    pub examples: Vec<Example>,
    #[serde(default, deserialize_with = "nullable")]
    pub exercises: Vec<Exercise>,
}

/// Backend record describing the scoring weight of one section and, when the
/// learner has progress, whether that section was completed.
///
/// `section` uses the upstream keys: `overview`, `concept_one` .. `concept_seven`,
/// `summary_application`, `general_exercises` (or a `concept_{id}` section id).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckMarker {
    #[serde(default)]
    pub id: u64,
    pub section: String,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub weight: u32,
    #[serde(default)]
    pub completed: Option<bool>,
}

/// Full lesson payload: details plus concepts, general exercises and check markers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonContent {
    pub id: LessonId,
    #[serde(default, deserialize_with = "nullable")]
    pub topic: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub class: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub subject: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub term: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub week: String,
    #[serde(default, deserialize_with = "nullable")]
    pub overview: String,
    #[serde(default, deserialize_with = "nullable")]
    pub objectives: Vec<LessonObjective>,
    #[serde(default, deserialize_with = "nullable")]
    pub summary: String,
    #[serde(default, deserialize_with = "nullable")]
    pub application: String,
    #[serde(default)]
    pub video_path: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub concepts: Vec<Concept>,
    #[serde(default, deserialize_with = "nullable")]
    pub general_exercises: Vec<GeneralExercise>,
    #[serde(default, deserialize_with = "nullable")]
    pub check_markers: Vec<CheckMarker>,
}

impl LessonContent {
    /// Orders concepts, their examples/exercises and the general exercises by `order_index`.
    ///
    /// The sort is stable so equal indices keep their upstream order.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.concepts.sort_by_key(|c| c.order_index);
        for concept in &mut self.concepts {
            concept.examples.sort_by_key(|e| e.order_index);
            concept.exercises.sort_by_key(|e| e.order_index);
        }
        self.general_exercises.sort_by_key(|e| e.order_index);
        self
    }

    #[must_use]
    pub fn concept_count(&self) -> usize {
        self.concepts.len()
    }

    #[must_use]
    pub fn concept_by_id(&self, id: ConceptId) -> Option<&Concept> {
        self.concepts.iter().find(|c| c.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = r#"{
        "id": 12,
        "topic": "Fractions",
        "class": "JSS 1",
        "subject": "Mathematics",
        "term": "First",
        "week": 3,
        "overview": null,
        "objectives": [{"description": "Add fractions", "points": ["like denominators"]}],
        "summary": "Sum up",
        "application": "Baking",
        "video_path": null,
        "concepts": [
            {"id": 5, "order_index": "2", "title": "Subtraction", "description": [], "examples": [], "exercises": []},
            {"id": 4, "order_index": 1, "title": "Addition",
             "description": [{"heading": null, "description": "Add tops", "image_path": null, "points": null}],
             "examples": [{"id": 1, "order_index": 1, "title": "e", "problem": "1/2+1/2", "solution_steps": [], "answer": "1"}],
             "exercises": [
                {"id": 9, "order_index": 2, "title": "b", "problem": "p", "solution_steps": [], "answers": ["1"], "correct_answer": "1"},
                {"id": 8, "order_index": 1, "title": "a", "problem": "p", "solution_steps": [], "answers": ["1"], "correct_answer": "1"}
             ]}
        ],
        "general_exercises": [],
        "check_markers": [{"id": 1, "section": "overview", "weight": "10", "completed": true}]
    }"#;

    #[test]
    fn decodes_lenient_payload() {
        let lesson: LessonContent = serde_json::from_str(PAYLOAD).unwrap();
        assert_eq!(lesson.id, LessonId::new(12));
        assert_eq!(lesson.week, "3");
        assert!(lesson.overview.is_empty());
        assert_eq!(lesson.check_markers[0].weight, 10);
        assert_eq!(lesson.concepts[0].order_index, 2);
    }

    #[test]
    fn normalized_orders_by_order_index() {
        let lesson: LessonContent = serde_json::from_str::<LessonContent>(PAYLOAD)
            .unwrap()
            .normalized();
        let titles: Vec<_> = lesson.concepts.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, ["Addition", "Subtraction"]);
        let exercise_ids: Vec<_> = lesson.concepts[0]
            .exercises
            .iter()
            .map(|e| e.id.value())
            .collect();
        assert_eq!(exercise_ids, [8, 9]);
    }
}
