use reqwest::header::ACCEPT;
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use url::Url;

use crate::config::ApiConfig;
use crate::error::ApiError;

/// One call to the upstream API.
#[derive(Debug, Clone)]
pub struct UpstreamRequest<'a> {
    pub method: Method,
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub bearer: Option<&'a str>,
    pub body: Option<&'a Value>,
    /// Decode a non-JSON body as `{}` instead of failing.
    pub lenient_body: bool,
}

impl<'a> UpstreamRequest<'a> {
    #[must_use]
    pub fn new(method: Method, path: &'a str) -> Self {
        Self {
            method,
            path,
            query: None,
            bearer: None,
            body: None,
            lenient_body: false,
        }
    }

    #[must_use]
    pub fn get(path: &'a str) -> Self {
        Self::new(Method::GET, path)
    }

    #[must_use]
    pub fn post(path: &'a str) -> Self {
        Self::new(Method::POST, path)
    }

    #[must_use]
    pub fn bearer(mut self, token: Option<&'a str>) -> Self {
        self.bearer = token;
        self
    }

    #[must_use]
    pub fn json(mut self, body: &'a Value) -> Self {
        self.body = Some(body);
        self
    }

    #[must_use]
    pub fn lenient_body(mut self) -> Self {
        self.lenient_body = true;
        self
    }

    #[must_use]
    pub fn query(mut self, query: Option<&'a str>) -> Self {
        self.query = query.filter(|q| !q.is_empty());
        self
    }
}

/// Raw upstream answer: the status and the decoded JSON body (`Null` when empty).
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl UpstreamResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Upstream `message`, then `error`, then a message built from the status reason.
    #[must_use]
    pub fn error_message(&self) -> String {
        ["message", "error"]
            .iter()
            .filter_map(|key| self.body.get(key).and_then(Value::as_str))
            .find(|msg| !msg.is_empty())
            .map_or_else(
                || {
                    format!(
                        "Upstream API error: {}",
                        self.status.canonical_reason().unwrap_or("Unknown")
                    )
                },
                str::to_string,
            )
    }

    /// Upstream `code` or `error_code`, stringified.
    #[must_use]
    pub fn error_code(&self) -> Option<String> {
        ["code", "error_code"]
            .iter()
            .filter_map(|key| self.body.get(key))
            .find_map(|value| match value {
                Value::String(s) if !s.is_empty() => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
    }

    #[must_use]
    pub fn into_error(self) -> ApiError {
        ApiError::Upstream {
            message: self.error_message(),
            error_code: self.error_code(),
            status: self.status,
        }
    }
}

/// HTTP client for the upstream API with a per-attempt timeout and a single
/// retry on network failures. Non-2xx answers are returned, never retried.
#[derive(Clone, Debug)]
pub struct UpstreamClient {
    client: Client,
    config: ApiConfig,
}

impl UpstreamClient {
    #[must_use]
    pub fn new(config: ApiConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Resolve `path` beneath the base URL.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidPath` for empty or dot segments.
    pub fn endpoint(&self, path: &str, query: Option<&str>) -> Result<Url, ApiError> {
        let mut url = self.config.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| ApiError::InvalidPath(path.to_string()))?;
            segments.pop_if_empty();
            for segment in path.trim_matches('/').split('/') {
                if segment.is_empty() || segment == "." || segment == ".." {
                    return Err(ApiError::InvalidPath(path.to_string()));
                }
                segments.push(segment);
            }
        }
        url.set_query(query);
        Ok(url)
    }

    /// # Errors
    ///
    /// Returns `ApiError` when the request cannot be sent (after the retry) or
    /// the body is not JSON.
    pub async fn send(&self, request: &UpstreamRequest<'_>) -> Result<UpstreamResponse, ApiError> {
        let url = self.endpoint(request.path, request.query)?;
        match self.attempt(&url, request).await {
            Err(err) if err.is_transport() && self.config.retry_on_network_error => {
                tracing::warn!(method = %request.method, %url, error = %err, "upstream request failed, retrying once");
                self.attempt(&url, request).await
            }
            other => other,
        }
    }

    /// Send and decode the `content` of a successful envelope.
    ///
    /// # Errors
    ///
    /// Non-2xx answers become `ApiError::Upstream`; a 2xx with `success: false`
    /// becomes `ApiError::Rejected`.
    pub async fn send_content(&self, request: &UpstreamRequest<'_>) -> Result<Value, ApiError> {
        let response = self.send(request).await?;
        if !response.is_success() {
            return Err(response.into_error());
        }
        let success = response
            .body
            .get("success")
            .and_then(Value::as_bool)
            .unwrap_or(true);
        if !success {
            return Err(ApiError::Rejected(response.error_message()));
        }
        Ok(match response.body {
            Value::Object(mut map) => map.remove("content").unwrap_or(Value::Null),
            other => other,
        })
    }

    async fn attempt(&self, url: &Url, request: &UpstreamRequest<'_>) -> Result<UpstreamResponse, ApiError> {
        let mut builder = self
            .client
            .request(request.method.clone(), url.clone())
            .timeout(self.config.timeout)
            .header(ACCEPT, "application/json");
        if let Some(token) = request.bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(ApiError::from_transport)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(ApiError::from_transport)?;
        let body = if bytes.iter().all(u8::is_ascii_whitespace) {
            Value::Null
        } else {
            match serde_json::from_slice(&bytes) {
                Ok(body) => body,
                Err(_) if request.lenient_body => Value::Object(serde_json::Map::new()),
                Err(err) => return Err(ApiError::Decode(err.to_string())),
            }
        };
        tracing::debug!(method = %request.method, %url, %status, "upstream responded");
        Ok(UpstreamResponse { status, body })
    }
}
