//! Caching layer for stock data to reduce API calls

use cached::{Cached, SizedCache};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::config::StockConfig;
use crate::models::{FinancialMetrics, IndicatorReading, NewsSentimentReport, Quote};

/// Kind of cached data; each kind has its own store and TTL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataKind {
    Quote,
    Fundamentals,
    Indicator,
    News,
}

impl DataKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DataKind::Quote => "quote",
            DataKind::Fundamentals => "fundamentals",
            DataKind::Indicator => "indicator",
            DataKind::News => "news",
        }
    }
}

/// Cache key for stock data requests
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub kind: DataKind,
    /// Normalized stock symbol
    pub symbol: String,
    /// Sub-selection within the kind, e.g. the indicator
    pub qualifier: Option<String>,
}

impl CacheKey {
    /// Create a new cache key
    pub fn new(kind: DataKind, symbol: impl Into<String>) -> Self {
        Self {
            kind,
            symbol: symbol.into(),
            qualifier: None,
        }
    }

    /// Create a key narrowed by a qualifier
    pub fn qualified(kind: DataKind, symbol: impl Into<String>, qualifier: impl Into<String>) -> Self {
        Self {
            kind,
            symbol: symbol.into(),
            qualifier: Some(qualifier.into()),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.qualifier {
            Some(qualifier) => write!(f, "{}:{}:{}", self.kind.as_str(), self.symbol, qualifier),
            None => write!(f, "{}:{}", self.kind.as_str(), self.symbol),
        }
    }
}

/// Cached value with the moment it was captured
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub value: V,
    pub captured_at: Instant,
}

impl<V> CacheEntry<V> {
    pub fn new(value: V) -> Self {
        Self {
            value,
            captured_at: Instant::now(),
        }
    }

    /// Fresh while strictly younger than `ttl`
    pub fn is_fresh(&self, ttl: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.captured_at) < ttl
    }
}

/// Thread-safe, size-bounded cache for one kind of stock data
///
/// Staleness is checked on lookup; a stale entry reads as a miss and is dropped. The
/// least recently used entry is evicted once `capacity` is reached.
pub struct StockCache<V> {
    ttl: Duration,
    entries: Arc<RwLock<SizedCache<CacheKey, CacheEntry<V>>>>,
}

impl<V: Clone> StockCache<V> {
    /// Create a new cache with specified TTL and capacity
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            ttl,
            entries: Arc::new(RwLock::new(SizedCache::with_size(capacity.max(1)))),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Get a fresh value from the cache
    pub async fn get(&self, key: &CacheKey) -> Option<V> {
        let mut entries = self.entries.write().await;
        let fresh = entries
            .cache_get(key)
            .map(|entry| entry.is_fresh(self.ttl, Instant::now()));

        match fresh {
            Some(true) => {
                tracing::debug!(%key, "cache hit");
                entries.cache_get(key).map(|entry| entry.value.clone())
            }
            Some(false) => {
                tracing::debug!(%key, "cache entry stale");
                entries.cache_remove(key);
                None
            }
            None => {
                tracing::debug!(%key, "cache miss");
                None
            }
        }
    }

    /// Insert a value, replacing any previous entry for the key
    pub async fn insert(&self, key: CacheKey, value: V) {
        let mut entries = self.entries.write().await;
        let _ = entries.cache_set(key, CacheEntry::new(value));
    }

    /// Invalidate a specific cache entry
    pub async fn invalidate(&self, key: &CacheKey) {
        let mut entries = self.entries.write().await;
        let _ = entries.cache_remove(key);
    }

    /// Clear all cached entries
    pub async fn clear(&self) {
        let mut entries = self.entries.write().await;
        entries.cache_clear();
    }

    /// Get the number of stored entries, stale ones included
    pub async fn len(&self) -> usize {
        let entries = self.entries.read().await;
        entries.cache_size()
    }

    /// Check if the cache is empty
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl<V> Clone for StockCache<V> {
    fn clone(&self) -> Self {
        Self {
            ttl: self.ttl,
            entries: Arc::clone(&self.entries),
        }
    }
}

/// One cache per data kind
#[derive(Clone)]
pub struct CacheManager {
    pub quotes: StockCache<Quote>,
    pub fundamentals: StockCache<FinancialMetrics>,
    pub indicators: StockCache<IndicatorReading>,
    pub news: StockCache<NewsSentimentReport>,
}

impl CacheManager {
    /// Create caches with the TTLs and capacity from `config`
    pub fn from_config(config: &StockConfig) -> Self {
        let capacity = config.cache_capacity;
        Self {
            quotes: StockCache::new(config.cache_ttl_quote, capacity),
            fundamentals: StockCache::new(config.cache_ttl_fundamental, capacity),
            indicators: StockCache::new(config.cache_ttl_indicator, capacity),
            news: StockCache::new(config.cache_ttl_news, capacity),
        }
    }

    /// TTL applied to `kind`
    pub fn ttl(&self, kind: DataKind) -> Duration {
        match kind {
            DataKind::Quote => self.quotes.ttl(),
            DataKind::Fundamentals => self.fundamentals.ttl(),
            DataKind::Indicator => self.indicators.ttl(),
            DataKind::News => self.news.ttl(),
        }
    }

    /// Clear all caches
    pub async fn clear_all(&self) {
        self.quotes.clear().await;
        self.fundamentals.clear().await;
        self.indicators.clear().await;
        self.news.clear().await;
    }
}
