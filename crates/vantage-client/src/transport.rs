//! The transport seam
//!
//! [`Transport`] is the only surface the entity APIs talk through: it takes
//! a verb+path+JSON request and returns the raw envelope JSON. The HTTP
//! implementation lives here; the in-memory fake server is in
//! [`crate::memory`].

use crate::error::ClientError;
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::{debug, warn};

/// HTTP verb of an [`ApiRequest`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// Read
    Get,
    /// Create / act
    Post,
    /// Replace / patch
    Put,
    /// Remove
    Delete,
}

impl Method {
    /// Verb name as sent on the wire
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

/// One operation against the remote API
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// HTTP verb
    pub method: Method,
    /// Path relative to the base url, no leading slash required
    pub path: String,
    /// Query parameters (flat JSON object)
    pub query: Option<JsonValue>,
    /// JSON body
    pub body: Option<JsonValue>,
}

impl ApiRequest {
    /// A GET request
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self { method: Method::Get, path: path.into(), query: None, body: None }
    }

    /// A POST request with a JSON body
    #[must_use]
    pub fn post(path: impl Into<String>, body: JsonValue) -> Self {
        Self { method: Method::Post, path: path.into(), query: None, body: Some(body) }
    }

    /// A PUT request with a JSON body
    #[must_use]
    pub fn put(path: impl Into<String>, body: JsonValue) -> Self {
        Self { method: Method::Put, path: path.into(), query: None, body: Some(body) }
    }

    /// A DELETE request
    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self { method: Method::Delete, path: path.into(), query: None, body: None }
    }

    /// Attach query parameters
    #[must_use]
    pub fn with_query(mut self, query: JsonValue) -> Self {
        self.query = Some(query);
        self
    }
}

/// Executes [`ApiRequest`]s and returns raw envelope JSON
///
/// Implementations must not retry; the synchronization layer owns retry
/// policy. A non-2xx response that still carries a decodable envelope is a
/// *successful* execute — the envelope mapping decides what it means.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute one request
    ///
    /// # Errors
    /// [`ClientError::Transport`] for network failures and non-2xx
    /// responses without a structured error body.
    async fn execute(&self, request: ApiRequest) -> Result<JsonValue, ClientError>;
}

/// Read side of the auth collaborator: whatever issues tokens, the
/// data-access layer only needs to ask for the current one.
pub trait TokenProvider: Send + Sync {
    /// The current bearer token, if a session exists
    fn token(&self) -> Option<String>;
}

/// In-process token cell; the setter half the auth subsystem drives
#[derive(Debug, Default)]
pub struct AuthTokens {
    token: parking_lot::RwLock<Option<String>>,
}

impl AuthTokens {
    /// Empty cell (no session)
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a token
    pub fn set(&self, token: impl Into<String>) {
        *self.token.write() = Some(token.into());
    }

    /// Drop the token (sign-out)
    pub fn clear(&self) {
        *self.token.write() = None;
    }
}

impl TokenProvider for AuthTokens {
    fn token(&self) -> Option<String> {
        self.token.read().clone()
    }
}

/// [`Transport`] over HTTP+JSON via `reqwest`
pub struct HttpTransport {
    base_url: String,
    client: reqwest::Client,
    tokens: Arc<dyn TokenProvider>,
}

impl HttpTransport {
    /// Create a transport against `base_url`
    #[must_use]
    pub fn new(base_url: impl Into<String>, tokens: Arc<dyn TokenProvider>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
            tokens,
        }
    }

    /// Use a pre-configured `reqwest` client (timeouts, proxies)
    #[must_use]
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: ApiRequest) -> Result<JsonValue, ClientError> {
        let url = self.url_for(&request.path);
        debug!(method = request.method.as_str(), %url, "api request");

        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Put => self.client.put(&url),
            Method::Delete => self.client.delete(&url),
        };
        if let Some(token) = self.tokens.token() {
            builder = builder.bearer_auth(token);
        }
        if let Some(query) = &request.query {
            builder = builder.query(&query_pairs(query));
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            warn!(%url, error = %e, "transport failure");
            ClientError::transport(None, e.to_string())
        })?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ClientError::transport(Some(status.as_u16()), e.to_string()))?;

        match serde_json::from_str::<JsonValue>(&text) {
            Ok(value) if value.get("success").is_some() => Ok(value),
            _ if status.is_success() => {
                Err(ClientError::Unknown(format!("malformed envelope from {url}")))
            }
            _ => {
                warn!(%url, status = status.as_u16(), "non-2xx without envelope");
                Err(ClientError::transport(
                    Some(status.as_u16()),
                    format!("{} from {url}", status.as_u16()),
                ))
            }
        }
    }
}

/// Flatten a JSON object into query pairs; nested values are skipped
fn query_pairs(query: &JsonValue) -> Vec<(String, String)> {
    let Some(map) = query.as_object() else {
        return Vec::new();
    };
    map.iter()
        .filter_map(|(k, v)| {
            let rendered = match v {
                JsonValue::String(s) => Some(s.clone()),
                JsonValue::Number(n) => Some(n.to_string()),
                JsonValue::Bool(b) => Some(b.to_string()),
                _ => None,
            };
            rendered.map(|r| (k.clone(), r))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn query_pairs_keeps_scalars_only() {
        let pairs = query_pairs(&json!({"search": "rev", "page": 2, "deep": {"no": 1}}));
        assert!(pairs.contains(&("search".to_string(), "rev".to_string())));
        assert!(pairs.contains(&("page".to_string(), "2".to_string())));
        assert_eq!(pairs.len(), 2);
    }

    #[test]
    fn auth_tokens_round_trip() {
        let tokens = AuthTokens::new();
        assert!(tokens.token().is_none());
        tokens.set("t-1");
        assert_eq!(tokens.token().as_deref(), Some("t-1"));
        tokens.clear();
        assert!(tokens.token().is_none());
    }

    #[test]
    fn urls_join_without_double_slashes() {
        let transport =
            HttpTransport::new("https://api.example.com/", Arc::new(AuthTokens::new()));
        assert_eq!(transport.url_for("/dashboards"), "https://api.example.com/dashboards");
        assert_eq!(transport.url_for("dashboards"), "https://api.example.com/dashboards");
    }
}
