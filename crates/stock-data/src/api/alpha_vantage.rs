//! Alpha Vantage API client

use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use crate::error::{Result, StockError};
use crate::models::IndicatorKind;
use crate::transport::{HttpRequest, HttpTransport};

pub const PROVIDER: &str = "Alpha Vantage";

/// Alpha Vantage API client
///
/// Issues one request per call and returns the checked JSON payload. Pacing and retry
/// are applied by the caller.
#[derive(Clone)]
pub struct AlphaVantageClient {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    api_key: Option<String>,
}

impl AlphaVantageClient {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        base_url: impl Into<String>,
        api_key: Option<String>,
    ) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
            api_key,
        }
    }

    /// Fail with a configuration error when no API key is set
    pub fn ensure_configured(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            StockError::ConfigError(
                "Alpha Vantage API key not configured (set ALPHA_VANTAGE_API_KEY)".to_string(),
            )
        })
    }

    /// Get global quote (current price data)
    pub async fn global_quote(&self, symbol: &str) -> Result<Value> {
        self.call("GLOBAL_QUOTE", symbol, &[]).await
    }

    /// Get company overview and fundamental data
    pub async fn company_overview(&self, symbol: &str) -> Result<Value> {
        self.call("OVERVIEW", symbol, &[]).await
    }

    /// Get the daily series of one technical indicator
    pub async fn technical_indicator(&self, symbol: &str, kind: IndicatorKind) -> Result<Value> {
        let mut params = vec![("interval", "daily".to_string()), ("series_type", "close".to_string())];
        if let Some(period) = kind.time_period() {
            params.push(("time_period", period.to_string()));
        }

        self.call(kind.function(), symbol, &params).await
    }

    async fn call(&self, function: &str, symbol: &str, extra: &[(&str, String)]) -> Result<Value> {
        let api_key = self.ensure_configured()?;

        let mut request = HttpRequest::get(&self.base_url)
            .param("function", function)
            .param("symbol", symbol);
        for (name, value) in extra {
            request = request.param(*name, value.clone());
        }
        let request = request.param("apikey", api_key);

        info!(provider = PROVIDER, function, symbol, "upstream request");
        let data = self.transport.get(request).await?.into_json(PROVIDER)?;

        check_payload(&data, symbol)?;
        Ok(data)
    }
}

/// Map in-body error notices to the error taxonomy
///
/// Alpha Vantage answers most failures with HTTP 200 and a message field instead of
/// the data.
fn check_payload(data: &Value, symbol: &str) -> Result<()> {
    if data.get("Error Message").is_some() {
        return Err(StockError::InvalidSymbol(symbol.to_string()));
    }

    let notice = data
        .get("Note")
        .or_else(|| data.get("Information"))
        .and_then(Value::as_str);

    if let Some(notice) = notice {
        let lowered = notice.to_ascii_lowercase();
        // quota notices also name the key, so only an "invalid" key notice is fatal
        if lowered.contains("invalid") && (lowered.contains("apikey") || lowered.contains("api key")) {
            return Err(StockError::ConfigError(format!(
                "Alpha Vantage rejected the API key: {notice}"
            )));
        }
        return Err(StockError::RateLimitExceeded {
            provider: PROVIDER.to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{HttpResponse, MockHttpTransport};
    use tokio_test::assert_ok;

    const BASE: &str = "https://av.example.test/query";

    fn client(transport: MockHttpTransport, key: Option<&str>) -> AlphaVantageClient {
        AlphaVantageClient::new(Arc::new(transport), BASE, key.map(str::to_string))
    }

    #[tokio::test]
    async fn test_missing_key_makes_no_request() {
        let mut transport = MockHttpTransport::new();
        transport.expect_get().times(0);

        let result = client(transport, None).global_quote("AAPL").await;
        assert!(matches!(result, Err(StockError::ConfigError(_))));
    }

    #[tokio::test]
    async fn test_quote_request_parameters() {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_get()
            .withf(|request| {
                request.url == BASE
                    && request.query_value("function") == Some("GLOBAL_QUOTE")
                    && request.query_value("symbol") == Some("AAPL")
                    && request.query_value("apikey") == Some("demo")
            })
            .times(1)
            .returning(|_| Ok(HttpResponse::ok_json(r#"{"Global Quote": {"01. symbol": "AAPL"}}"#)));

        let data = assert_ok!(client(transport, Some("demo")).global_quote("AAPL").await);
        assert_eq!(data["Global Quote"]["01. symbol"], "AAPL");
    }

    #[tokio::test]
    async fn test_indicator_request_parameters() {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_get()
            .withf(|request| {
                request.query_value("function") == Some("SMA")
                    && request.query_value("interval") == Some("daily")
                    && request.query_value("series_type") == Some("close")
                    && request.query_value("time_period") == Some("200")
            })
            .times(1)
            .returning(|_| Ok(HttpResponse::ok_json("{}")));

        let result = client(transport, Some("demo"))
            .technical_indicator("MSFT", IndicatorKind::Sma200)
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_macd_has_no_time_period() {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_get()
            .withf(|request| {
                request.query_value("function") == Some("MACD")
                    && request.query_value("time_period").is_none()
            })
            .times(1)
            .returning(|_| Ok(HttpResponse::ok_json("{}")));

        let result = client(transport, Some("demo"))
            .technical_indicator("MSFT", IndicatorKind::Macd)
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_error_message_is_invalid_symbol() {
        let mut transport = MockHttpTransport::new();
        transport.expect_get().times(1).returning(|_| {
            Ok(HttpResponse::ok_json(
                r#"{"Error Message": "Invalid API call. Please retry or visit the documentation."}"#,
            ))
        });

        let result = client(transport, Some("demo")).company_overview("NOTASYMBOL").await;
        assert_eq!(result, Err(StockError::InvalidSymbol("NOTASYMBOL".to_string())));
    }

    #[tokio::test]
    async fn test_quota_note_is_rate_limit() {
        let mut transport = MockHttpTransport::new();
        transport.expect_get().times(1).returning(|_| {
            Ok(HttpResponse::ok_json(
                r#"{"Note": "Thank you for using Alpha Vantage! Our standard API call frequency is 5 calls per minute."}"#,
            ))
        });

        let result = client(transport, Some("demo")).global_quote("AAPL").await;
        assert!(matches!(result, Err(StockError::RateLimitExceeded { .. })));
    }

    #[test]
    fn test_invalid_key_notice_is_config_error() {
        let data = serde_json::json!({
            "Information": "the parameter apikey is invalid or missing."
        });
        assert!(matches!(
            check_payload(&data, "AAPL"),
            Err(StockError::ConfigError(_))
        ));
    }

    #[tokio::test]
    async fn test_server_error_status() {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_get()
            .times(1)
            .returning(|_| Ok(HttpResponse::new(502, "bad gateway")));

        let result = client(transport, Some("demo")).global_quote("AAPL").await;
        assert!(matches!(
            result,
            Err(StockError::UpstreamServer { status: 502, .. })
        ));
    }
}
