use lesson_core::model::{
    LessonFilters, LessonFiltersPatch, LessonMetadata, LessonStatus, LessonSummary, NamedItem,
};
use lesson_core::rbac::UserRole;

/// Which dashboard a role lands on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DashboardKind {
    Onboarding,
    Lessons,
    ChildrenProgress,
    LessonManagement,
    AdminOverview,
    SuperadminConsole,
}

impl DashboardKind {
    #[must_use]
    pub fn for_role(role: UserRole) -> Self {
        match role {
            UserRole::Guest => Self::Onboarding,
            UserRole::Student => Self::Lessons,
            UserRole::Guardian => Self::ChildrenProgress,
            UserRole::Teacher => Self::LessonManagement,
            UserRole::Admin => Self::AdminOverview,
            UserRole::Superadmin => Self::SuperadminConsole,
        }
    }

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Onboarding => "Welcome to Fast Learners",
            Self::Lessons => "My Lessons",
            Self::ChildrenProgress => "Children's Progress",
            Self::LessonManagement => "Lesson Management",
            Self::AdminOverview => "Admin Overview",
            Self::SuperadminConsole => "Superadmin Console",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LessonRowVm {
    pub id: u64,
    pub topic: String,
    pub details: String,
    pub is_active: bool,
}

#[must_use]
pub fn map_lesson_rows(lessons: &[LessonSummary]) -> Vec<LessonRowVm> {
    lessons
        .iter()
        .map(|lesson| {
            let details = [&lesson.class, &lesson.subject, &lesson.term, &lesson.week]
                .into_iter()
                .filter(|part| !part.is_empty())
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(" · ");
            LessonRowVm {
                id: lesson.id.value(),
                topic: if lesson.topic.is_empty() {
                    format!("Lesson {}", lesson.id)
                } else {
                    lesson.topic.clone()
                },
                details,
                is_active: lesson.status == LessonStatus::Active,
            }
        })
        .collect()
}

/// One of the four catalog selectors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterField {
    Class,
    Subject,
    Term,
    Week,
}

impl FilterField {
    pub const ALL: [Self; 4] = [Self::Class, Self::Subject, Self::Term, Self::Week];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Class => "Class",
            Self::Subject => "Subject",
            Self::Term => "Term",
            Self::Week => "Week",
        }
    }

    #[must_use]
    pub fn items(self, metadata: &LessonMetadata) -> &[NamedItem] {
        match self {
            Self::Class => &metadata.classes,
            Self::Subject => &metadata.subjects,
            Self::Term => &metadata.terms,
            Self::Week => &metadata.weeks,
        }
    }

    #[must_use]
    pub fn value(self, filters: &LessonFilters) -> &str {
        match self {
            Self::Class => &filters.class,
            Self::Subject => &filters.subject,
            Self::Term => &filters.term,
            Self::Week => &filters.week,
        }
    }

    #[must_use]
    pub fn patch(self, value: String) -> LessonFiltersPatch {
        let mut patch = LessonFiltersPatch::default();
        match self {
            Self::Class => patch.class = Some(value),
            Self::Subject => patch.subject = Some(value),
            Self::Term => patch.term = Some(value),
            Self::Week => patch.week = Some(value),
        }
        patch
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterOptionVm {
    pub value: String,
    pub label: String,
}

/// Select options for one filter; the value sent upstream is the item id.
#[must_use]
pub fn map_filter_options(items: &[NamedItem]) -> Vec<FilterOptionVm> {
    items
        .iter()
        .map(|item| FilterOptionVm {
            value: item.id.to_string(),
            label: item.name.clone(),
        })
        .collect()
}
