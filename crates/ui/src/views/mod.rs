mod completed;
mod dashboard;
mod error;
mod lesson;
mod notices;
mod state;

#[cfg(test)]
mod test_harness;
#[cfg(test)]
mod view_smoke;

pub use completed::LessonCompletedView;
pub use dashboard::DashboardView;
pub use error::ErrorPanel;
pub use lesson::{
    LessonBreadcrumb, LessonByIdView, LessonBySlugView, LessonProgress, NavigationControls,
    SectionContent,
};
pub use notices::NoticeList;
pub use state::{ViewError, ViewState, view_state_from_resource};
