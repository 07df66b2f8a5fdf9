//! Shared data access state and the single-item fetch operations

use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

use crate::api::{AlphaVantageClient, NewsApiClient, alpha_vantage, news_api};
use crate::cache::{CacheKey, CacheManager, DataKind, StockCache};
use crate::config::StockConfig;
use crate::error::{Result, StockError};
use crate::models::{
    FinancialMetrics, IndicatorKind, IndicatorReading, NewsSentimentReport, Quote,
};
use crate::parser::{
    parse_company_overview, parse_global_quote, parse_indicator, parse_news_articles,
};
use crate::rate_limit::RequestGate;
use crate::retry::RetryPolicy;
use crate::sentiment::SentimentScorer;
use crate::single_flight::SingleFlight;
use crate::symbol::normalize_symbol;
use crate::transport::{HttpTransport, ReqwestTransport};

pub(crate) struct ContextInner {
    pub(crate) config: StockConfig,
    caches: CacheManager,
    pub(crate) alpha_vantage: AlphaVantageClient,
    news: NewsApiClient,
    market_gate: RequestGate,
    news_gate: RequestGate,
    retry: RetryPolicy,
    scorer: SentimentScorer,
    quote_flights: SingleFlight<CacheKey, Quote>,
    fundamentals_flights: SingleFlight<CacheKey, FinancialMetrics>,
    indicator_flights: SingleFlight<CacheKey, IndicatorReading>,
    news_flights: SingleFlight<CacheKey, NewsSentimentReport>,
}

/// Entry point for all data access
///
/// Owns the caches, rate gates and in-flight registries. Build one per process and
/// clone it freely; clones share all state.
#[derive(Clone)]
pub struct DataAccessContext {
    pub(crate) inner: Arc<ContextInner>,
}

impl DataAccessContext {
    /// Create a context that talks to the providers over HTTP
    pub fn new(config: StockConfig) -> Result<Self> {
        config.validate()?;
        let transport = ReqwestTransport::new(config.request_timeout)?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Create a context from default settings and API keys in the environment
    pub fn from_env() -> Result<Self> {
        Self::new(StockConfig::default().with_env_api_keys())
    }

    /// Create a context over a custom transport
    pub fn with_transport(config: StockConfig, transport: Arc<dyn HttpTransport>) -> Result<Self> {
        config.validate()?;

        let alpha_vantage = AlphaVantageClient::new(
            Arc::clone(&transport),
            config.alpha_vantage_base_url.clone(),
            config.alpha_vantage_api_key.clone(),
        );
        let news = NewsApiClient::new(
            transport,
            config.news_api_base_url.clone(),
            config.news_api_key.clone(),
            config.news_page_size,
        );

        let inner = ContextInner {
            caches: CacheManager::from_config(&config),
            market_gate: RequestGate::new(alpha_vantage::PROVIDER, config.alpha_vantage_min_interval),
            news_gate: RequestGate::new(news_api::PROVIDER, config.news_min_interval),
            retry: RetryPolicy::from_config(&config),
            scorer: SentimentScorer::new(config.sentiment.clone()),
            alpha_vantage,
            news,
            quote_flights: SingleFlight::new(),
            fundamentals_flights: SingleFlight::new(),
            indicator_flights: SingleFlight::new(),
            news_flights: SingleFlight::new(),
            config,
        };

        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    pub fn config(&self) -> &StockConfig {
        &self.inner.config
    }

    pub fn caches(&self) -> &CacheManager {
        &self.inner.caches
    }

    /// Latest quote for `symbol`
    pub async fn fetch_quote(&self, symbol: &str) -> Result<Quote> {
        let symbol = normalize_symbol(symbol)?;
        self.inner.alpha_vantage.ensure_configured()?;

        let key = CacheKey::new(DataKind::Quote, &symbol);
        let inner = Arc::clone(&self.inner);
        let fetch = async move {
            inner.market_gate.acquire().await;
            let payload = inner
                .retry
                .execute("GLOBAL_QUOTE", || inner.alpha_vantage.global_quote(&symbol))
                .await?;
            parse_global_quote(&payload, &symbol)
        };

        resolve(&self.inner.caches.quotes, &self.inner.quote_flights, key, fetch).await
    }

    /// Company fundamentals for `symbol`
    pub async fn fetch_fundamentals(&self, symbol: &str) -> Result<FinancialMetrics> {
        let symbol = normalize_symbol(symbol)?;
        self.inner.alpha_vantage.ensure_configured()?;

        let key = CacheKey::new(DataKind::Fundamentals, &symbol);
        let inner = Arc::clone(&self.inner);
        let fetch = async move {
            inner.market_gate.acquire().await;
            let payload = inner
                .retry
                .execute("OVERVIEW", || inner.alpha_vantage.company_overview(&symbol))
                .await?;
            parse_company_overview(&payload, &symbol)
        };

        resolve(
            &self.inner.caches.fundamentals,
            &self.inner.fundamentals_flights,
            key,
            fetch,
        )
        .await
    }

    /// Most recent value of one technical indicator, cached per symbol and kind
    pub async fn fetch_indicator(&self, symbol: &str, kind: IndicatorKind) -> Result<IndicatorReading> {
        let symbol = normalize_symbol(symbol)?;
        self.inner.alpha_vantage.ensure_configured()?;

        let key = CacheKey::qualified(DataKind::Indicator, &symbol, kind.as_str());
        let inner = Arc::clone(&self.inner);
        let fetch = async move {
            inner.market_gate.acquire().await;
            let payload = inner
                .retry
                .execute(kind.function(), || {
                    inner.alpha_vantage.technical_indicator(&symbol, kind)
                })
                .await?;
            parse_indicator(&payload, &symbol, kind)
        };

        resolve(
            &self.inner.caches.indicators,
            &self.inner.indicator_flights,
            key,
            fetch,
        )
        .await
    }

    /// Recent news for `symbol` with per-article and overall sentiment
    pub async fn fetch_news_sentiment(&self, symbol: &str) -> Result<NewsSentimentReport> {
        let symbol = normalize_symbol(symbol)?;
        self.inner.news.ensure_configured()?;

        let key = CacheKey::new(DataKind::News, &symbol);
        let inner = Arc::clone(&self.inner);
        let fetch = async move {
            inner.news_gate.acquire().await;
            let payload = inner
                .retry
                .execute("NEWS_EVERYTHING", || inner.news.company_news(&symbol))
                .await?;
            let articles = parse_news_articles(&payload, &inner.scorer)?;

            let scores: Vec<f64> = articles.iter().map(|a| a.sentiment_score).collect();
            let (sentiment, sentiment_score) = inner.scorer.aggregate(&scores);

            Ok::<_, StockError>(NewsSentimentReport {
                symbol,
                article_count: articles.len(),
                articles,
                sentiment,
                sentiment_score,
                as_of: Utc::now(),
            })
        };

        resolve(&self.inner.caches.news, &self.inner.news_flights, key, fetch).await
    }

    /// Drop every cached value
    pub async fn clear_cache(&self) {
        self.inner.caches.clear_all().await;
    }
}

/// Serve `key` from `cache`, or run `fetch` once for all concurrent callers
///
/// `fetch` is only polled when this caller starts the flight. The flight checks the
/// cache again first, since a flight for the same key may have just filled it.
async fn resolve<V, F>(
    cache: &StockCache<V>,
    flights: &SingleFlight<CacheKey, V>,
    key: CacheKey,
    fetch: F,
) -> Result<V>
where
    V: Clone + Send + Sync + 'static,
    F: Future<Output = Result<V>> + Send + 'static,
{
    if let Some(value) = cache.get(&key).await {
        return Ok(value);
    }

    let cache = cache.clone();
    let task_key = key.clone();
    flights
        .run(key, async move {
            if let Some(value) = cache.get(&task_key).await {
                return Ok(value);
            }

            debug!(key = %task_key, "fetching from upstream");
            let value = fetch.await?;
            cache.insert(task_key, value.clone()).await;
            Ok(value)
        })
        .await
}
