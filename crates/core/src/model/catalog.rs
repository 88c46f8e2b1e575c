use serde::{Deserialize, Serialize};

use super::de::{lenient_u32, nullable, string_or_number};
use super::ids::LessonId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LessonStatus {
    #[default]
    Active,
    Inactive,
}

/// Lesson row as returned by the list endpoint (no content).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonSummary {
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
    #[serde(default)]
    pub status: LessonStatus,
}

/// The four selectors required before the lesson list can be queried.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LessonFilters {
    #[serde(default)]
    pub class: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub term: String,
    #[serde(default)]
    pub week: String,
}

impl LessonFilters {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        [&self.class, &self.subject, &self.term, &self.week]
            .iter()
            .all(|v| !v.trim().is_empty())
    }

    /// Overwrite only the fields that are set in `patch`.
    pub fn merge(&mut self, patch: LessonFiltersPatch) {
        if let Some(class) = patch.class {
            self.class = class;
        }
        if let Some(subject) = patch.subject {
            self.subject = subject;
        }
        if let Some(term) = patch.term {
            self.term = term;
        }
        if let Some(week) = patch.week {
            self.week = week;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LessonFiltersPatch {
    pub class: Option<String>,
    pub subject: Option<String>,
    pub term: Option<String>,
    pub week: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedItem {
    pub id: u64,
    #[serde(deserialize_with = "string_or_number")]
    pub name: String,
}

/// Selector values for classes, subjects, terms and weeks.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LessonMetadata {
    #[serde(default, deserialize_with = "nullable")]
    pub classes: Vec<NamedItem>,
    #[serde(default, deserialize_with = "nullable")]
    pub subjects: Vec<NamedItem>,
    #[serde(default, deserialize_with = "nullable")]
    pub terms: Vec<NamedItem>,
    #[serde(default, deserialize_with = "nullable")]
    pub weeks: Vec<NamedItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMeta {
    #[serde(deserialize_with = "lenient_u32")]
    pub current_page: u32,
    #[serde(deserialize_with = "lenient_u32")]
    pub last_page: u32,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub per_page: u32,
    #[serde(deserialize_with = "lenient_u32")]
    pub total: u32,
}

impl Default for PaginationMeta {
    fn default() -> Self {
        Self {
            current_page: 1,
            last_page: 1,
            per_page: 0,
            total: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LessonsPage {
    #[serde(default, deserialize_with = "nullable")]
    pub lessons: Vec<LessonSummary>,
    #[serde(default)]
    pub meta: PaginationMeta,
}

/// Aggregate score for a lesson, as reported by the scores endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonScore {
    #[serde(deserialize_with = "string_or_number")]
    pub lesson_total_score: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_require_all_four_selectors() {
        let mut filters = LessonFilters::default();
        assert!(!filters.is_complete());
        filters.merge(LessonFiltersPatch {
            class: Some("JSS 1".into()),
            subject: Some("Maths".into()),
            term: Some("First".into()),
            week: None,
        });
        assert!(!filters.is_complete());
        filters.merge(LessonFiltersPatch {
            week: Some("2".into()),
            ..LessonFiltersPatch::default()
        });
        assert!(filters.is_complete());
        assert_eq!(filters.class, "JSS 1");
    }

    #[test]
    fn metadata_accepts_numeric_week_names() {
        let json = r#"{"classes":[{"id":1,"name":"JSS 1"}],"subjects":null,"terms":[],"weeks":[{"id":3,"name":3}]}"#;
        let meta: LessonMetadata = serde_json::from_str(json).unwrap();
        assert_eq!(meta.weeks[0].name, "3");
        assert!(meta.subjects.is_empty());
    }
}
