use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde_json::Value;
use tracing::{debug, instrument};

use super::{ApiError, Method, Result, Transport};

const USER_AGENT: &str = concat!("ghx/", env!("CARGO_PKG_VERSION"));
const API_VERSION: &str = "2022-11-28";

/// Blocking HTTP transport for the GitHub REST API
///
/// Authenticates every request with a bearer token. Timeouts apply per
/// request; nothing is retried.
pub struct HttpTransport {
    client: Client,
    base_url: String,
    token: String,
}

impl HttpTransport {
    /// Build a transport rooted at `base_url` (e.g. `https://api.github.com`)
    ///
    /// # Errors
    /// Returns `ApiError::Network` if the underlying client cannot be built
    /// (for example when the TLS backend fails to initialise).
    pub fn new(base_url: &str, token: String, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert("X-GitHub-Api-Version", HeaderValue::from_static(API_VERSION));

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Network(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Transport for HttpTransport {
    #[instrument(skip(self, body))]
    fn request(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value> {
        let url = self.url(path);
        let mut request = self
            .client
            .request(to_reqwest(method), &url)
            .bearer_auth(&self.token);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().map_err(|e| ApiError::Network(e.to_string()))?;
        let status = response.status();
        let text = response
            .text()
            .map_err(|e| ApiError::Network(format!("Failed to read response body: {e}")))?;
        debug!(status = status.as_u16(), bytes = text.len(), "response received");

        if !status.is_success() {
            let message = error_message(&text)
                .or_else(|| status.canonical_reason().map(str::to_string))
                .unwrap_or_default();
            return Err(ApiError::from_status(status.as_u16(), message));
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }
}

fn to_reqwest(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

/// Pull the human-readable message out of an error body
///
/// GitHub answers with `{"message": "...", "errors": [...]}`; the first
/// detailed error is appended when present. Non-JSON bodies are returned
/// trimmed.
fn error_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return Some(body.to_string());
    };
    let message = value.get("message").and_then(Value::as_str)?;
    let detail = value
        .get("errors")
        .and_then(Value::as_array)
        .and_then(|errors| errors.first())
        .and_then(|e| e.get("message").or_else(|| e.get("code")))
        .and_then(Value::as_str);
    Some(match detail {
        Some(detail) => format!("{message} ({detail})"),
        None => message.to_string(),
    })
}
