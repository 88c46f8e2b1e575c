mod breadcrumb;
mod controls;
mod section;
mod viewer;

pub use breadcrumb::LessonBreadcrumb;
pub use controls::{LessonProgress, NavigationControls};
pub use section::SectionContent;
pub use viewer::{LessonByIdView, LessonBySlugView};
