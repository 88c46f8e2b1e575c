mod breadcrumb_vm;
mod dashboard_vm;
mod markdown_vm;
mod nav_vm;
mod section_vm;

pub use breadcrumb_vm::{BreadcrumbItemVm, CrumbState, map_breadcrumb};
pub use dashboard_vm::{
    DashboardKind, FilterField, FilterOptionVm, LessonRowVm, map_filter_options, map_lesson_rows,
};
pub use markdown_vm::{looks_like_html, markdown_to_html, rich_text_html, sanitize_html};
pub use nav_vm::{NavKey, NavVm, map_nav};
pub use section_vm::{BlockVm, ExerciseVm, FeedbackVm, SectionVm, map_section};
