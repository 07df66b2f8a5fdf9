//! External financial data access layer
//!
//! This crate fetches market data and company news from external providers and
//! hands back canonical, provider-agnostic types. It includes:
//!
//! - Quotes, company fundamentals and technical indicators from Alpha Vantage
//! - Company news from NewsAPI, scored with a keyword sentiment classifier
//! - Per-kind TTL caching with bounded, least-recently-used storage
//! - Deduplication of concurrent identical requests
//! - Per-provider request pacing and bounded retry of transient failures
//! - Multi-symbol comparison and indicator bundles with partial-success semantics
//!
//! # Architecture
//!
//! All state lives in a [`DataAccessContext`], built once and cloned freely. Every
//! fetch goes through the same pipeline:
//!
//! 1. symbol normalization and credential check
//! 2. cache lookup
//! 3. single-flight registration, so one upstream call serves all concurrent callers
//! 4. the provider's rate gate
//! 5. the HTTP call, retried on network errors and 5xx responses
//! 6. payload parsing and cache store
//!
//! # Example
//!
//! ```rust,no_run
//! use stock_data::{DataAccessContext, StockConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = StockConfig::builder().with_env_api_keys().build()?;
//!     let ctx = DataAccessContext::new(config)?;
//!
//!     let comparison = ctx.compare_stocks(&["AAPL", "MSFT"]).await?;
//!     for (symbol, entry) in &comparison.results {
//!         println!("{symbol}: {} (P/E {:?})", entry.price, entry.pe_ratio);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod aggregate;
pub mod api;
pub mod cache;
pub mod config;
pub mod context;
pub mod error;
pub mod models;
pub mod parser;
pub mod rate_limit;
pub mod retry;
pub mod sentiment;
pub mod single_flight;
pub mod symbol;
pub mod transport;

#[cfg(test)]
mod testing;

// Re-export main types for convenience
pub use cache::{CacheKey, CacheManager, DataKind, StockCache};
pub use config::{StockConfig, StockConfigBuilder};
pub use context::DataAccessContext;
pub use error::{Result, StockError};
pub use models::{
    ComparisonEntry, FinancialMetrics, IndicatorKind, IndicatorReading, IndicatorValue,
    MacdValue, NewsArticle, NewsSentimentReport, Quote, SentimentLabel, StockComparison,
    TechnicalIndicatorSet,
};
pub use rate_limit::RequestGate;
pub use retry::RetryPolicy;
pub use sentiment::{SentimentConfig, SentimentScore, SentimentScorer};
pub use single_flight::SingleFlight;
pub use symbol::normalize_symbol;
pub use transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
