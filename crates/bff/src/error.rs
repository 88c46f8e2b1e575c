use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use lesson_core::model::ErrorEnvelope;
use services::ApiError;

/// Everything a route can fail with. Rendered as the JSON error envelope
/// `{success: false, message, content: null, code, requestId, errorCode?}`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BffError {
    #[error("Unauthorized")]
    Unauthorized,
    #[error("{0}")]
    BadRequest(String),
    #[error("Not found")]
    NotFound,
    #[error("{message}")]
    Upstream {
        status: StatusCode,
        message: String,
        error_code: Option<String>,
    },
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("{0}")]
    Internal(&'static str),
}

impl BffError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Upstream { status, .. } => *status,
            Self::Api(ApiError::Upstream { status, .. }) => *status,
            Self::Api(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to the caller. Transport and decode failures are
    /// replaced by a generic message.
    fn public_message(&self) -> String {
        match self {
            Self::Api(err @ ApiError::Upstream { .. }) => err.to_string(),
            Self::Api(err) if err.is_transport() => {
                "Network error: the lessons service is unreachable".to_string()
            }
            Self::Api(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }

    fn error_code(&self) -> Option<String> {
        match self {
            Self::Upstream { error_code, .. }
            | Self::Api(ApiError::Upstream { error_code, .. }) => error_code.clone(),
            _ => None,
        }
    }

    #[must_use]
    pub fn envelope(&self, request_id: impl Into<String>) -> ErrorEnvelope {
        ErrorEnvelope::new(self.public_message(), self.status().as_u16(), request_id)
            .with_error_code(self.error_code())
    }
}

impl From<JsonRejection> for BffError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for BffError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for BffError {
    fn into_response(self) -> Response {
        let request_id = uuid::Uuid::new_v4().to_string();
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(%request_id, error = %self, "request failed");
        } else {
            tracing::debug!(%request_id, %status, error = %self, "request rejected");
        }
        (status, Json(self.envelope(request_id))).into_response()
    }
}
