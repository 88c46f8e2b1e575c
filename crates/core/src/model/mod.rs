mod catalog;
mod de;
mod envelope;
mod ids;
mod lesson;

pub use catalog::{
    LessonFilters, LessonFiltersPatch, LessonMetadata, LessonScore, LessonStatus, LessonSummary,
    LessonsPage, NamedItem, PaginationMeta,
};
pub use envelope::{ApiEnvelope, ErrorEnvelope};
pub use ids::{ConceptId, ExerciseId, LessonId, UserId};
pub use lesson::{
    CheckMarker, Concept, ConceptDescription, Example, Exercise, GeneralExercise, LessonContent,
    LessonObjective,
};
