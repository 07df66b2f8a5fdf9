//! Canonical, provider-agnostic data types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::StockError;

/// Latest trading-day quote for a symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub price: f64,
    pub change: f64,
    /// Percent change, e.g. `1.25` for +1.25%
    pub change_percent: f64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub previous_close: f64,
    pub volume: u64,
    pub latest_trading_day: NaiveDate,
}

/// Company fundamentals
///
/// Optional ratios are `None` when the provider has no value; they are never defaulted
/// to zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialMetrics {
    pub symbol: String,
    pub name: String,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub market_cap: Option<f64>,
    pub pe_ratio: Option<f64>,
    pub peg_ratio: Option<f64>,
    pub book_value: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub eps: Option<f64>,
    pub profit_margin: Option<f64>,
    pub operating_margin: Option<f64>,
    pub return_on_assets: Option<f64>,
    pub return_on_equity: Option<f64>,
    pub beta: Option<f64>,
    pub week_52_high: Option<f64>,
    pub week_52_low: Option<f64>,
    pub analyst_target_price: Option<f64>,
}

/// Technical indicators that can be requested individually
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorKind {
    Sma50,
    Sma200,
    Rsi14,
    Macd,
}

impl IndicatorKind {
    pub const ALL: [IndicatorKind; 4] = [
        IndicatorKind::Sma50,
        IndicatorKind::Sma200,
        IndicatorKind::Rsi14,
        IndicatorKind::Macd,
    ];

    /// Upstream function name
    pub fn function(self) -> &'static str {
        match self {
            IndicatorKind::Sma50 | IndicatorKind::Sma200 => "SMA",
            IndicatorKind::Rsi14 => "RSI",
            IndicatorKind::Macd => "MACD",
        }
    }

    /// Look-back window, if the indicator takes one
    pub fn time_period(self) -> Option<u32> {
        match self {
            IndicatorKind::Sma50 => Some(50),
            IndicatorKind::Sma200 => Some(200),
            IndicatorKind::Rsi14 => Some(14),
            IndicatorKind::Macd => None,
        }
    }

    /// Stable identifier used in cache keys and logs
    pub fn as_str(self) -> &'static str {
        match self {
            IndicatorKind::Sma50 => "sma_50",
            IndicatorKind::Sma200 => "sma_200",
            IndicatorKind::Rsi14 => "rsi_14",
            IndicatorKind::Macd => "macd",
        }
    }
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IndicatorKind {
    type Err = StockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .collect::<String>()
            .to_ascii_uppercase();

        match normalized.as_str() {
            "SMA50" => Ok(IndicatorKind::Sma50),
            "SMA200" => Ok(IndicatorKind::Sma200),
            "RSI" | "RSI14" => Ok(IndicatorKind::Rsi14),
            "MACD" => Ok(IndicatorKind::Macd),
            _ => Err(StockError::InvalidRequest(format!(
                "Unsupported indicator: {s}. Supported: SMA50, SMA200, RSI, MACD"
            ))),
        }
    }
}

/// MACD line, signal line and histogram
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdValue {
    pub value: f64,
    pub signal: f64,
    pub histogram: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorValue {
    Single(f64),
    Macd(MacdValue),
}

/// Most recent data point of one indicator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorReading {
    pub symbol: String,
    pub kind: IndicatorKind,
    pub value: IndicatorValue,
    pub date: NaiveDate,
}

/// Bundle of the indicators that were requested and resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalIndicatorSet {
    pub symbol: String,
    pub sma_50: Option<f64>,
    pub sma_200: Option<f64>,
    pub rsi_14: Option<f64>,
    pub macd: Option<MacdValue>,
    pub as_of: DateTime<Utc>,
}

impl TechnicalIndicatorSet {
    pub fn empty(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            sma_50: None,
            sma_200: None,
            rsi_14: None,
            macd: None,
            as_of: Utc::now(),
        }
    }

    /// Store a reading in the field matching its kind
    ///
    /// A reading whose value shape does not fit its kind is ignored.
    pub fn apply(&mut self, reading: &IndicatorReading) {
        match (reading.kind, reading.value) {
            (IndicatorKind::Sma50, IndicatorValue::Single(v)) => self.sma_50 = Some(v),
            (IndicatorKind::Sma200, IndicatorValue::Single(v)) => self.sma_200 = Some(v),
            (IndicatorKind::Rsi14, IndicatorValue::Single(v)) => self.rsi_14 = Some(v),
            (IndicatorKind::Macd, IndicatorValue::Macd(m)) => self.macd = Some(m),
            _ => {}
        }
    }

    /// Kinds that carry a value
    pub fn populated(&self) -> Vec<IndicatorKind> {
        let mut kinds = Vec::new();
        if self.sma_50.is_some() {
            kinds.push(IndicatorKind::Sma50);
        }
        if self.sma_200.is_some() {
            kinds.push(IndicatorKind::Sma200);
        }
        if self.rsi_14.is_some() {
            kinds.push(IndicatorKind::Rsi14);
        }
        if self.macd.is_some() {
            kinds.push(IndicatorKind::Macd);
        }
        kinds
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Neutral => "neutral",
            SentimentLabel::Negative => "negative",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub title: String,
    pub description: Option<String>,
    pub source: String,
    pub url: String,
    pub published_at: DateTime<Utc>,
    pub sentiment: SentimentLabel,
    /// Normalized keyword score in [-1, 1]
    pub sentiment_score: f64,
}

/// Scored news for a symbol, articles kept in provider order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsSentimentReport {
    pub symbol: String,
    pub articles: Vec<NewsArticle>,
    pub sentiment: SentimentLabel,
    /// Mean of the article scores
    pub sentiment_score: f64,
    pub article_count: usize,
    pub as_of: DateTime<Utc>,
}

/// Reduced per-symbol record used in comparisons
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonEntry {
    pub price: f64,
    pub change_percent: f64,
    pub market_cap: Option<f64>,
    pub pe_ratio: Option<f64>,
    pub eps: Option<f64>,
    pub profit_margin: Option<f64>,
    pub beta: Option<f64>,
}

impl ComparisonEntry {
    pub fn new(quote: &Quote, metrics: &FinancialMetrics) -> Self {
        Self {
            price: quote.price,
            change_percent: quote.change_percent,
            market_cap: metrics.market_cap,
            pe_ratio: metrics.pe_ratio,
            eps: metrics.eps,
            profit_margin: metrics.profit_margin,
            beta: metrics.beta,
        }
    }
}

/// Multi-symbol comparison
///
/// `results` holds only the symbols that resolved; its keys are a subset of `symbols`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockComparison {
    pub symbols: Vec<String>,
    pub results: BTreeMap<String, ComparisonEntry>,
}

impl StockComparison {
    /// Requested symbols that were dropped from the results
    pub fn missing(&self) -> Vec<&str> {
        self.symbols
            .iter()
            .filter(|symbol| !self.results.contains_key(symbol.as_str()))
            .map(String::as_str)
            .collect()
    }
}
