//! Stock comparison example
//!
//! Fetches quotes, fundamentals, indicators and news sentiment through one shared
//! data access context.
//!
//! To run this example:
//! ```bash
//! export ALPHA_VANTAGE_API_KEY=your_key_here
//! export NEWS_API_KEY=your_key_here  # Optional, enables the news section
//!
//! cargo run --example compare_stocks AAPL MSFT GOOGL
//! ```

use stock_data::{DataAccessContext, IndicatorKind, StockConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    stock_utils::init_tracing();

    // symbols from the command line, else from STOCK_SYMBOLS
    let mut symbols: Vec<String> = std::env::args().skip(1).collect();
    if symbols.is_empty() {
        symbols = stock_utils::env_var_or("STOCK_SYMBOLS", "AAPL,MSFT")
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();
    }

    let config = StockConfig::builder().with_env_api_keys().build()?;
    let has_news_key = config.news_api_key.is_some();
    let ctx = DataAccessContext::new(config)?;

    println!("=== Comparison ===");
    let comparison = ctx.compare_stocks(&symbols).await?;
    println!("{}", serde_json::to_string_pretty(&comparison)?);
    for symbol in comparison.missing() {
        println!("  (no data for {symbol})");
    }

    let Some(first) = comparison.results.keys().next().cloned() else {
        return Ok(());
    };

    println!("\n=== Indicators for {first} ===");
    let indicators = ctx.fetch_indicator_set(&first, &IndicatorKind::ALL).await?;
    println!("{}", serde_json::to_string_pretty(&indicators)?);

    if has_news_key {
        println!("\n=== News sentiment for {first} ===");
        let report = ctx.fetch_news_sentiment(&first).await?;
        println!(
            "{} articles, overall {} ({:.2})",
            report.article_count, report.sentiment, report.sentiment_score
        );
        for article in &report.articles {
            println!("  [{}] {} ({})", article.sentiment, article.title, article.source);
        }
    }

    Ok(())
}
