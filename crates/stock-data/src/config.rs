//! Configuration for stock data access

use crate::error::{Result, StockError};
use crate::sentiment::SentimentConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default Alpha Vantage endpoint
pub const ALPHA_VANTAGE_BASE_URL: &str = "https://www.alphavantage.co/query";

/// Default NewsAPI endpoint
pub const NEWS_API_BASE_URL: &str = "https://newsapi.org/v2/everything";

/// Environment variable holding the Alpha Vantage key
pub const ALPHA_VANTAGE_KEY_ENV: &str = "ALPHA_VANTAGE_API_KEY";

/// Environment variable holding the NewsAPI key
pub const NEWS_API_KEY_ENV: &str = "NEWS_API_KEY";

/// Configuration for stock data access
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockConfig {
    /// Alpha Vantage API key (quotes, fundamentals, indicators)
    #[serde(skip_serializing)]
    pub alpha_vantage_api_key: Option<String>,

    /// NewsAPI key (news sentiment)
    #[serde(skip_serializing)]
    pub news_api_key: Option<String>,

    pub alpha_vantage_base_url: String,
    pub news_api_base_url: String,

    /// Cache TTL for quotes
    pub cache_ttl_quote: Duration,

    /// Cache TTL for company fundamentals
    pub cache_ttl_fundamental: Duration,

    /// Cache TTL for individual technical indicators
    pub cache_ttl_indicator: Duration,

    /// Cache TTL for news sentiment
    pub cache_ttl_news: Duration,

    /// Maximum entries kept per data kind before least-recently-used eviction
    pub cache_capacity: usize,

    /// Minimum spacing between two Alpha Vantage calls
    pub alpha_vantage_min_interval: Duration,

    /// Minimum spacing between two NewsAPI calls
    pub news_min_interval: Duration,

    /// Total attempts per upstream call, including the first
    pub max_attempts: u32,

    /// Fixed pause between attempts
    pub retry_backoff: Duration,

    /// Per-request timeout
    pub request_timeout: Duration,

    /// Articles requested per news query
    pub news_page_size: u32,

    /// Smallest symbol list accepted by comparisons
    pub compare_min_symbols: usize,

    /// Largest symbol list accepted by comparisons
    pub compare_max_symbols: usize,

    /// Fail a comparison instead of returning an empty result when no symbol resolves
    pub fail_on_empty_comparison: bool,

    /// Sentiment classifier constants
    pub sentiment: SentimentConfig,
}

impl Default for StockConfig {
    fn default() -> Self {
        Self {
            alpha_vantage_api_key: None,
            news_api_key: None,
            alpha_vantage_base_url: ALPHA_VANTAGE_BASE_URL.to_string(),
            news_api_base_url: NEWS_API_BASE_URL.to_string(),
            cache_ttl_quote: Duration::from_secs(300),       // 5 minutes
            cache_ttl_fundamental: Duration::from_secs(300), // 5 minutes
            cache_ttl_indicator: Duration::from_secs(300),   // 5 minutes
            cache_ttl_news: Duration::from_secs(900),        // 15 minutes
            cache_capacity: 256,
            alpha_vantage_min_interval: Duration::from_secs(12), // free tier: 5 calls/minute
            news_min_interval: Duration::from_secs(1),
            max_attempts: 3,
            retry_backoff: Duration::from_secs(1),
            request_timeout: Duration::from_secs(30),
            news_page_size: 10,
            compare_min_symbols: 2,
            compare_max_symbols: 5,
            fail_on_empty_comparison: false,
            sentiment: SentimentConfig::default(),
        }
    }
}

impl StockConfig {
    /// Create a new configuration builder
    pub fn builder() -> StockConfigBuilder {
        StockConfigBuilder::default()
    }

    /// Load API keys from `ALPHA_VANTAGE_API_KEY` and `NEWS_API_KEY`
    ///
    /// Keys already set are kept when the variable is absent.
    pub fn with_env_api_keys(mut self) -> Self {
        if let Some(key) = stock_utils::env_var(ALPHA_VANTAGE_KEY_ENV) {
            self.alpha_vantage_api_key = Some(key);
        }
        if let Some(key) = stock_utils::env_var(NEWS_API_KEY_ENV) {
            self.news_api_key = Some(key);
        }
        self
    }

    /// Validate the configuration
    ///
    /// Missing API keys are not an error here; they surface when the provider is used.
    pub fn validate(&self) -> Result<()> {
        if self.cache_capacity == 0 {
            return Err(StockError::ConfigError(
                "cache_capacity must be greater than 0".to_string(),
            ));
        }

        if self.max_attempts == 0 {
            return Err(StockError::ConfigError(
                "max_attempts must be greater than 0".to_string(),
            ));
        }

        if self.request_timeout.is_zero() {
            return Err(StockError::ConfigError(
                "request_timeout must be greater than 0".to_string(),
            ));
        }

        if !(1..=100).contains(&self.news_page_size) {
            return Err(StockError::ConfigError(
                "news_page_size must be between 1 and 100".to_string(),
            ));
        }

        if self.compare_min_symbols == 0 || self.compare_min_symbols > self.compare_max_symbols {
            return Err(StockError::ConfigError(format!(
                "invalid comparison bounds: {}..={}",
                self.compare_min_symbols, self.compare_max_symbols
            )));
        }

        for (name, value) in [
            ("alpha_vantage_base_url", &self.alpha_vantage_base_url),
            ("news_api_base_url", &self.news_api_base_url),
        ] {
            url::Url::parse(value)
                .map_err(|e| StockError::ConfigError(format!("{name} is not a valid URL: {e}")))?;
        }

        self.sentiment.validate()
    }
}

/// Builder for StockConfig
#[derive(Debug, Default)]
pub struct StockConfigBuilder {
    config: StockConfig,
}

impl StockConfigBuilder {
    /// Set the Alpha Vantage API key
    pub fn alpha_vantage_api_key(mut self, key: impl Into<String>) -> Self {
        self.config.alpha_vantage_api_key = Some(key.into());
        self
    }

    /// Set the NewsAPI key
    pub fn news_api_key(mut self, key: impl Into<String>) -> Self {
        self.config.news_api_key = Some(key.into());
        self
    }

    /// Load both API keys from the environment
    pub fn with_env_api_keys(mut self) -> Self {
        self.config = self.config.with_env_api_keys();
        self
    }

    /// Point Alpha Vantage requests at another endpoint
    pub fn alpha_vantage_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.alpha_vantage_base_url = url.into();
        self
    }

    /// Point NewsAPI requests at another endpoint
    pub fn news_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.news_api_base_url = url.into();
        self
    }

    /// Set the TTL shared by quotes, fundamentals and indicators
    pub fn cache_ttl_market(mut self, duration: Duration) -> Self {
        self.config.cache_ttl_quote = duration;
        self.config.cache_ttl_fundamental = duration;
        self.config.cache_ttl_indicator = duration;
        self
    }

    /// Set cache TTL for news sentiment
    pub fn cache_ttl_news(mut self, duration: Duration) -> Self {
        self.config.cache_ttl_news = duration;
        self
    }

    /// Set the per-kind cache capacity
    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.config.cache_capacity = capacity;
        self
    }

    /// Set the minimum spacing between Alpha Vantage calls
    pub fn alpha_vantage_min_interval(mut self, interval: Duration) -> Self {
        self.config.alpha_vantage_min_interval = interval;
        self
    }

    /// Derive the Alpha Vantage spacing from a calls-per-minute quota
    pub fn alpha_vantage_calls_per_minute(mut self, calls: u32) -> Self {
        self.config.alpha_vantage_min_interval = interval_for_quota(calls);
        self
    }

    /// Set the minimum spacing between NewsAPI calls
    pub fn news_min_interval(mut self, interval: Duration) -> Self {
        self.config.news_min_interval = interval;
        self
    }

    /// Set total attempts per upstream call
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.config.max_attempts = attempts;
        self
    }

    /// Set the pause between attempts
    pub fn retry_backoff(mut self, duration: Duration) -> Self {
        self.config.retry_backoff = duration;
        self
    }

    /// Set request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.config.request_timeout = duration;
        self
    }

    /// Set articles requested per news query
    pub fn news_page_size(mut self, size: u32) -> Self {
        self.config.news_page_size = size;
        self
    }

    /// Set the accepted comparison list size
    pub fn compare_symbol_bounds(mut self, min: usize, max: usize) -> Self {
        self.config.compare_min_symbols = min;
        self.config.compare_max_symbols = max;
        self
    }

    /// Fail comparisons in which no symbol resolves
    pub fn fail_on_empty_comparison(mut self, fail: bool) -> Self {
        self.config.fail_on_empty_comparison = fail;
        self
    }

    /// Replace the sentiment constants
    pub fn sentiment(mut self, sentiment: SentimentConfig) -> Self {
        self.config.sentiment = sentiment;
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<StockConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Spacing that keeps a caller within `calls` requests per minute
pub fn interval_for_quota(calls: u32) -> Duration {
    Duration::from_secs(60) / calls.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StockConfig::default();
        assert_eq!(config.cache_ttl_quote, Duration::from_secs(300));
        assert_eq!(config.cache_ttl_fundamental, Duration::from_secs(300));
        assert_eq!(config.cache_ttl_indicator, Duration::from_secs(300));
        assert_eq!(config.cache_ttl_news, Duration::from_secs(900));
        assert_eq!(config.alpha_vantage_min_interval, Duration::from_secs(12));
        assert_eq!(config.max_attempts, 3);
        assert!(config.alpha_vantage_api_key.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = StockConfig::builder()
            .alpha_vantage_api_key("av_key")
            .news_api_key("news_key")
            .max_attempts(5)
            .request_timeout(Duration::from_secs(60))
            .alpha_vantage_calls_per_minute(75)
            .build()
            .unwrap();

        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.request_timeout, Duration::from_secs(60));
        assert_eq!(config.alpha_vantage_min_interval, Duration::from_millis(800));
        assert_eq!(config.alpha_vantage_api_key.as_deref(), Some("av_key"));
        assert_eq!(config.news_api_key.as_deref(), Some("news_key"));
    }

    #[test]
    fn test_validation_rejects_zero_attempts() {
        let result = StockConfig::builder().max_attempts(0).build();
        assert!(matches!(result, Err(StockError::ConfigError(_))));
    }

    #[test]
    fn test_validation_rejects_zero_capacity() {
        let config = StockConfig {
            cache_capacity: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_bad_bounds_and_urls() {
        assert!(
            StockConfig::builder()
                .compare_symbol_bounds(4, 2)
                .build()
                .is_err()
        );
        assert!(
            StockConfig::builder()
                .news_api_base_url("not a url")
                .build()
                .is_err()
        );
        assert!(StockConfig::builder().news_page_size(0).build().is_err());
    }

    #[test]
    fn test_interval_for_quota() {
        assert_eq!(interval_for_quota(5), Duration::from_secs(12));
        assert_eq!(interval_for_quota(60), Duration::from_secs(1));
        // zero is treated as one call per minute
        assert_eq!(interval_for_quota(0), Duration::from_secs(60));
    }

    #[test]
    fn test_api_keys_not_serialized() {
        let config = StockConfig::builder()
            .alpha_vantage_api_key("secret")
            .build()
            .unwrap();
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("secret"));
    }
}
