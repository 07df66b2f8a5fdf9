//! NewsAPI payload parser

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::api::news_api::PROVIDER;
use crate::error::{Result, StockError};
use crate::models::NewsArticle;
use crate::sentiment::SentimentScorer;

#[derive(Debug, Deserialize)]
struct EverythingResponse {
    articles: Vec<RawArticle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArticle {
    #[serde(default)]
    source: Option<RawSource>,
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawSource {
    name: Option<String>,
}

/// Parse and score the articles of an `everything` response, in provider order
///
/// Articles without a title, URL or publication time are skipped, as are
/// placeholders for removed content.
pub fn parse_news_articles(payload: &Value, scorer: &SentimentScorer) -> Result<Vec<NewsArticle>> {
    let response = EverythingResponse::deserialize(payload)
        .map_err(|e| StockError::malformed(PROVIDER, format!("unexpected news payload: {e}")))?;

    let total = response.articles.len();
    let articles: Vec<NewsArticle> = response
        .articles
        .into_iter()
        .filter_map(|raw| into_article(raw, scorer))
        .collect();

    if articles.len() < total {
        debug!(
            skipped = total - articles.len(),
            kept = articles.len(),
            "skipped incomplete news articles"
        );
    }

    Ok(articles)
}

fn into_article(raw: RawArticle, scorer: &SentimentScorer) -> Option<NewsArticle> {
    let title = raw.title.filter(|t| !t.trim().is_empty() && t != "[Removed]")?;
    let url = raw.url.filter(|u| !u.trim().is_empty())?;
    let published_at = raw
        .published_at
        .and_then(|stamp| DateTime::parse_from_rfc3339(&stamp).ok())?
        .with_timezone(&Utc);

    let description = raw.description.filter(|d| !d.trim().is_empty());
    let source = raw
        .source
        .and_then(|s| s.name)
        .unwrap_or_else(|| "unknown".to_string());

    let text = match &description {
        Some(description) => format!("{title} {description}"),
        None => title.clone(),
    };
    let scored = scorer.score(&text);

    Some(NewsArticle {
        title,
        description,
        source,
        url,
        published_at,
        sentiment: scored.label,
        sentiment_score: scored.score,
    })
}
