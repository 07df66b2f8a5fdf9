//! Error types for stock data access

use thiserror::Error;

/// Stock data access errors
///
/// Every variant carries owned, cloneable data so that one failed upstream call can be
/// handed to all callers that joined it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StockError {
    /// Missing credential or invalid setting
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Unknown or syntactically invalid ticker
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    /// Required field absent or unparseable in a provider payload
    #[error("Malformed response from {provider}: {reason}")]
    MalformedResponse { provider: String, reason: String },

    /// No response received (connect failure, timeout, reset)
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Provider answered with a 5xx status
    #[error("{provider} server error (HTTP {status})")]
    UpstreamServer { provider: String, status: u16 },

    /// Provider rejected the request with a 4xx status
    #[error("{provider} rejected the request (HTTP {status}): {message}")]
    RequestRejected {
        provider: String,
        status: u16,
        message: String,
    },

    /// Provider reported that its quota is exhausted
    #[error("Rate limit exceeded for {provider}")]
    RateLimitExceeded { provider: String },

    /// Caller supplied arguments the operation cannot accept
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// No symbol in a comparison batch could be resolved
    #[error("No data could be fetched for any of: {}", symbols.join(", "))]
    AllSymbolsFailed { symbols: Vec<String> },

    /// A background fetch task ended without producing a result
    #[error("Internal error: {0}")]
    Internal(String),
}

impl StockError {
    /// Whether a fresh attempt at the same request could succeed
    ///
    /// Only transport failures and provider 5xx responses qualify.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StockError::NetworkError(_) | StockError::UpstreamServer { .. }
        )
    }

    pub(crate) fn malformed(provider: &str, reason: impl Into<String>) -> Self {
        StockError::MalformedResponse {
            provider: provider.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for stock operations
pub type Result<T> = std::result::Result<T, StockError>;

impl From<reqwest::Error> for StockError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            StockError::ConfigError(format!("Invalid HTTP client setup: {err}"))
        } else if err.is_decode() {
            StockError::malformed("http", err.to_string())
        } else {
            StockError::NetworkError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for StockError {
    fn from(err: serde_json::Error) -> Self {
        StockError::malformed("json", err.to_string())
    }
}
