//! Shared error types for the services crate.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors raised while reading configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("invalid API url {raw:?}: {reason}")]
    InvalidUrl { raw: String, reason: String },
    #[error("unsupported url scheme {0:?}, expected http or https")]
    UnsupportedScheme(String),
    #[error("invalid timeout {0:?}, expected a positive number of seconds")]
    InvalidTimeout(String),
}

/// Errors emitted while talking to the upstream API.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    #[error("upstream request timed out")]
    Timeout,
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),
    #[error("{message}")]
    Upstream {
        status: StatusCode,
        message: String,
        error_code: Option<String>,
    },
    #[error("{0}")]
    Rejected(String),
    #[error("unexpected upstream payload: {0}")]
    Decode(String),
    #[error("invalid upstream path {0:?}")]
    InvalidPath(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Http(reqwest::Error),
}

impl ApiError {
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() || err.is_request() {
            Self::Network(err)
        } else {
            Self::Http(err)
        }
    }

    /// Failures worth one more attempt: timeouts and connection errors.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Timeout | Self::Network(_))
    }

    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Timeout | Self::Network(_) => ErrorKind::Network,
            Self::Http(err) if err.is_timeout() || err.is_connect() => ErrorKind::Network,
            Self::Upstream { status, .. } => ErrorKind::from_status(*status),
            _ => ErrorKind::Unknown,
        }
    }
}

/// Coarse categories shown to learners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Network,
    NotFound,
    Unauthorized,
    Server,
    Unknown,
}

impl ErrorKind {
    #[must_use]
    pub fn from_status(status: StatusCode) -> Self {
        match status {
            StatusCode::NOT_FOUND => Self::NotFound,
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Self::Unauthorized,
            s if s.is_server_error() => Self::Server,
            _ => Self::Unknown,
        }
    }

    #[must_use]
    pub fn can_retry(self) -> bool {
        !matches!(self, Self::NotFound | Self::Unauthorized)
    }
}

/// An error rendered for the learner: a short title, details and whether a
/// retry button makes sense.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserFacingError {
    pub kind: ErrorKind,
    pub title: String,
    pub details: String,
    pub can_retry: bool,
}

impl UserFacingError {
    /// `details` is only used for `ErrorKind::Unknown`; the other kinds carry fixed copy.
    #[must_use]
    pub fn new(kind: ErrorKind, details: impl Into<String>) -> Self {
        let (title, details) = match kind {
            ErrorKind::Network => (
                "Connection Error",
                "Unable to connect to the server. Please check your internet connection.".to_string(),
            ),
            ErrorKind::NotFound => (
                "Lesson Not Found",
                "The requested lesson could not be found. It may have been moved or deleted."
                    .to_string(),
            ),
            ErrorKind::Unauthorized => (
                "Access Denied",
                "You do not have permission to access this lesson.".to_string(),
            ),
            ErrorKind::Server => (
                "Server Error",
                "The server encountered an error. Please try again later.".to_string(),
            ),
            ErrorKind::Unknown => ("Unknown Error", details.into()),
        };
        Self {
            kind,
            title: title.to_string(),
            details,
            can_retry: kind.can_retry(),
        }
    }
}

impl From<&ApiError> for UserFacingError {
    fn from(err: &ApiError) -> Self {
        Self::new(err.kind(), err.to_string())
    }
}

/// Errors emitted by `LessonStore` and `LessonNavigator`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    #[error("Please select class, subject, term, and week to view lessons")]
    MissingFilters,
    #[error("no lesson is loaded")]
    NoLesson,
    #[error(transparent)]
    Core(#[from] lesson_core::Error),
    #[error(transparent)]
    Api(#[from] ApiError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_map_to_categories() {
        assert_eq!(ErrorKind::from_status(StatusCode::NOT_FOUND), ErrorKind::NotFound);
        assert_eq!(ErrorKind::from_status(StatusCode::UNAUTHORIZED), ErrorKind::Unauthorized);
        assert_eq!(ErrorKind::from_status(StatusCode::BAD_GATEWAY), ErrorKind::Server);
        assert_eq!(ErrorKind::from_status(StatusCode::UNPROCESSABLE_ENTITY), ErrorKind::Unknown);
    }

    #[test]
    fn user_facing_copy_and_retry() {
        let not_found = ApiError::Upstream {
            status: StatusCode::NOT_FOUND,
            message: "Lesson missing".into(),
            error_code: None,
        };
        let view = UserFacingError::from(&not_found);
        assert_eq!(view.title, "Lesson Not Found");
        assert!(!view.can_retry);

        let timeout = UserFacingError::from(&ApiError::Timeout);
        assert_eq!(timeout.kind, ErrorKind::Network);
        assert_eq!(timeout.title, "Connection Error");
        assert!(timeout.can_retry);

        let other = UserFacingError::from(&ApiError::Rejected("Quota exceeded".into()));
        assert_eq!(other.title, "Unknown Error");
        assert_eq!(other.details, "Quota exceeded");
        assert!(other.can_retry);
    }
}
