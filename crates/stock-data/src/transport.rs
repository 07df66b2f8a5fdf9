//! HTTP transport used by the provider clients

use async_trait::async_trait;
use reqwest::Client;
use std::fmt;
use std::time::Duration;

use crate::error::{Result, StockError};

/// GET request with query parameters
#[derive(Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub query: Vec<(String, String)>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            query: Vec::new(),
        }
    }

    /// Append a query parameter
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// First value of the named query parameter
    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

// Credentials travel as query parameters; keep them out of logs.
impl fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let query: Vec<(&str, &str)> = self
            .query
            .iter()
            .map(|(key, value)| {
                if key.to_ascii_lowercase().contains("key") {
                    (key.as_str(), "***")
                } else {
                    (key.as_str(), value.as_str())
                }
            })
            .collect();

        f.debug_struct("HttpRequest")
            .field("url", &self.url)
            .field("query", &query)
            .finish()
    }
}

/// Raw response: status code and body text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn ok_json(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }

    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Map the status to the error taxonomy, then parse the body as JSON
    ///
    /// 5xx is a retryable server error; 401/403 mean the credential was refused; 429 is
    /// a quota rejection; any other non-2xx status is a rejected request.
    pub fn into_json(self, provider: &str) -> Result<serde_json::Value> {
        if !self.is_success() {
            return Err(self.status_error(provider));
        }

        serde_json::from_str(&self.body).map_err(|e| {
            StockError::malformed(provider, format!("response body is not JSON: {e}"))
        })
    }

    fn status_error(&self, provider: &str) -> StockError {
        match self.status {
            500..=599 => StockError::UpstreamServer {
                provider: provider.to_string(),
                status: self.status,
            },
            401 | 403 => StockError::ConfigError(format!(
                "{provider} refused the API key (HTTP {})",
                self.status
            )),
            429 => StockError::RateLimitExceeded {
                provider: provider.to_string(),
            },
            status => StockError::RequestRejected {
                provider: provider.to_string(),
                status,
                message: snippet(&self.body),
            },
        }
    }
}

fn snippet(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}

/// Transport contract for provider clients
///
/// Implementations return `NetworkError` when no response arrived; any response,
/// whatever its status, is returned as `Ok`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// Production transport using reqwest
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a transport whose requests time out after `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("stock-data/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }

    /// Wrap an existing reqwest client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, request: HttpRequest) -> Result<HttpResponse> {
        let response = self
            .client
            .get(&request.url)
            .query(&request.query)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(HttpResponse { status, body })
    }
}
