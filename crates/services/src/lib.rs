#![forbid(unsafe_code)]

pub mod api;
pub mod auto_advance;
pub mod config;
pub mod error;
pub mod navigator;
pub mod notice;
pub mod store;

pub use lesson_core::Clock;

pub use api::{AnswerCheck, HttpLessonApi, InMemoryLessonApi, LessonApi, UpstreamClient};
pub use auto_advance::AutoAdvanceScheduler;
pub use config::ApiConfig;
pub use error::{ApiError, ConfigError, ErrorKind, StoreError, UserFacingError};
pub use navigator::{LessonNavigator, NextOutcome, completion_route};
pub use notice::{Notice, NoticeLevel};
pub use store::{LessonSource, LessonState, LessonStore, LoadingFlags};
