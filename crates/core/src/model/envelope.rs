use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::de::nullable;

/// The upstream JSON envelope: `{success, message, content, code, errors?}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub message: String,
    #[serde(default)]
    pub content: Option<T>,
    #[serde(default)]
    pub code: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, Vec<String>>>,
}

impl<T> ApiEnvelope<T> {
    /// Content of a successful envelope; `None` when `success` is false or content is absent.
    #[must_use]
    pub fn into_success(self) -> Option<T> {
        if self.success { self.content } else { None }
    }
}

/// Normalized error body returned by every BFF route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope {
    pub success: bool,
    pub message: String,
    pub content: Option<Value>,
    pub code: u16,
    pub request_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl ErrorEnvelope {
    #[must_use]
    pub fn new(message: impl Into<String>, code: u16, request_id: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            content: None,
            code,
            request_id: request_id.into(),
            error_code: None,
        }
    }

    #[must_use]
    pub fn with_error_code(mut self, error_code: Option<String>) -> Self {
        self.error_code = error_code;
        self
    }
}
