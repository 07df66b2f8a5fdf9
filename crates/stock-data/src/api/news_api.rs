//! NewsAPI client for company news

use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use crate::error::{Result, StockError};
use crate::transport::{HttpRequest, HttpTransport};

pub const PROVIDER: &str = "NewsAPI";

/// NewsAPI `everything` endpoint client
#[derive(Clone)]
pub struct NewsApiClient {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    api_key: Option<String>,
    page_size: u32,
}

impl NewsApiClient {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        base_url: impl Into<String>,
        api_key: Option<String>,
        page_size: u32,
    ) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
            api_key,
            page_size,
        }
    }

    /// Fail with a configuration error when no API key is set
    pub fn ensure_configured(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            StockError::ConfigError("NewsAPI key not configured (set NEWS_API_KEY)".to_string())
        })
    }

    /// Most recent English articles about `symbol`
    pub async fn company_news(&self, symbol: &str) -> Result<Value> {
        let api_key = self.ensure_configured()?;

        let request = HttpRequest::get(&self.base_url)
            .param("q", format!("{symbol} stock"))
            .param("language", "en")
            .param("sortBy", "publishedAt")
            .param("pageSize", self.page_size.to_string())
            .param("apiKey", api_key);

        info!(provider = PROVIDER, symbol, "upstream request");
        let data = self.transport.get(request).await?.into_json(PROVIDER)?;

        // NewsAPI reports errors with a non-2xx status, so a 2xx error body is unexpected
        if data.get("status").and_then(Value::as_str) == Some("error") {
            let message = data
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error");
            return Err(StockError::malformed(
                PROVIDER,
                format!("error payload with success status: {message}"),
            ));
        }

        Ok(data)
    }
}
