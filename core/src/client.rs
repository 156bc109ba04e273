//! Stateless HTTP request builder and response parser for the Zendesk API.
//!
//! # Design
//! `ZendeskClient` holds only its configuration (API base URL, credential,
//! user agent) and carries no mutable state between calls. Each endpoint is
//! split into a `build_*` method that produces an `HttpRequest` and a
//! `parse_*` method that consumes an `HttpResponse`; the endpoint methods
//! live next to their resources in `crate::api`. The host executes the
//! actual HTTP round-trip, keeping the core deterministic and free of I/O.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::auth::Credential;
use crate::error::{ApiError, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

const DEFAULT_USER_AGENT: &str = concat!("zendesk-core/", env!("CARGO_PKG_VERSION"));

/// Synchronous, stateless client for the Zendesk Support API.
///
/// Builds `HttpRequest` values and parses `HttpResponse` values without
/// touching the network. The caller is responsible for executing the HTTP
/// round-trip between `build_*` and `parse_*`.
#[derive(Debug, Clone)]
pub struct ZendeskClient {
    base_url: String,
    credential: Option<Credential>,
    user_agent: String,
}

impl ZendeskClient {
    /// Client for an explicit API base, e.g. `https://acme.zendesk.com/api/v2`.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            credential: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    /// Client for `https://{subdomain}.zendesk.com/api/v2`.
    pub fn for_subdomain(subdomain: &str) -> Result<Self> {
        let valid = !subdomain.is_empty()
            && subdomain
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-');
        if !valid {
            return Err(ApiError::InvalidConfig(format!(
                "invalid subdomain: {subdomain:?}"
            )));
        }
        Ok(Self::new(&format!("https://{subdomain}.zendesk.com/api/v2")))
    }

    #[must_use]
    pub fn with_credential(mut self, credential: Credential) -> Self {
        self.credential = Some(credential);
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn get(&self, path: &str) -> HttpRequest {
        self.request(HttpMethod::Get, path, None)
    }

    pub(crate) fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<HttpRequest> {
        let body = serde_json::to_string(body).map_err(ApiError::Serialization)?;
        Ok(self.request(HttpMethod::Post, path, Some(body)))
    }

    pub(crate) fn put<T: Serialize>(&self, path: &str, body: &T) -> Result<HttpRequest> {
        let body = serde_json::to_string(body).map_err(ApiError::Serialization)?;
        Ok(self.request(HttpMethod::Put, path, Some(body)))
    }

    pub(crate) fn delete(&self, path: &str) -> HttpRequest {
        self.request(HttpMethod::Delete, path, None)
    }

    fn request(&self, method: HttpMethod, path: &str, body: Option<String>) -> HttpRequest {
        let mut headers = vec![
            ("accept".to_string(), "application/json".to_string()),
            ("user-agent".to_string(), self.user_agent.clone()),
        ];
        if let Some(credential) = &self.credential {
            headers.push(("authorization".to_string(), credential.header_value()));
        }
        if body.is_some() {
            headers.push(("content-type".to_string(), "application/json".to_string()));
        }
        let path = format!("{}{path}", self.base_url);
        debug!(%method, %path, "built request");
        HttpRequest {
            method,
            path,
            headers,
            body,
        }
    }
}

/// Check the status and deserialize the body as `T`.
pub(crate) fn decode<T: DeserializeOwned>(response: &HttpResponse, expected: u16) -> Result<T> {
    check_status(response, expected)?;
    serde_json::from_str(&response.body).map_err(ApiError::Deserialization)
}

/// Map non-success status codes to the appropriate `ApiError` variant.
///
/// Zendesk is not consistent about 200 vs 201 vs 204 across endpoints, so any
/// 2xx passes; `expected` only affects logging.
pub(crate) fn check_status(response: &HttpResponse, expected: u16) -> Result<()> {
    if response.is_success() {
        if response.status != expected {
            debug!(status = response.status, expected, "unexpected success status");
        }
        return Ok(());
    }
    warn!(status = response.status, "request failed");
    match response.status {
        404 => Err(ApiError::NotFound),
        429 => Err(ApiError::RateLimited {
            retry_after: response
                .header("retry-after")
                .and_then(|v| v.trim().parse().ok()),
        }),
        status => Err(ApiError::Http {
            status,
            body: error_text(&response.body),
        }),
    }
}

/// Zendesk error bodies come as `{"error": "...", "description": "..."}` or
/// `{"error": {"title": "...", "message": "..."}}`. Fall back to the raw body.
fn error_text(body: &str) -> String {
    let Ok(json) = serde_json::from_str::<serde_json::Value>(body) else {
        return body.to_string();
    };
    let error = &json["error"];
    let (head, detail) = match error {
        serde_json::Value::String(s) => (Some(s.as_str()), json["description"].as_str()),
        serde_json::Value::Object(_) => (error["title"].as_str(), error["message"].as_str()),
        _ => (None, None),
    };
    match (head, detail) {
        (Some(head), Some(detail)) => format!("{head}: {detail}"),
        (Some(head), None) => head.to_string(),
        (None, Some(detail)) => detail.to_string(),
        (None, None) => body.to_string(),
    }
}
