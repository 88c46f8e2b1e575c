use thiserror::Error;

/// Errors produced by the lesson domain layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    #[error("step {step} is outside of 0..{total}")]
    StepOutOfRange { step: usize, total: usize },

    #[error("a lesson outline needs at least one step")]
    EmptyOutline,

    #[error("unknown section id: {0}")]
    InvalidSectionId(String),

    #[error("failed to parse {kind} from {raw:?}")]
    InvalidId { kind: &'static str, raw: String },

    #[error("unknown user role: {0}")]
    InvalidRole(String),
}
