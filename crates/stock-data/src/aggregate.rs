//! Multi-request operations with partial-success semantics

use futures::future::join_all;
use std::collections::BTreeMap;
use tracing::{info, warn};

use crate::context::DataAccessContext;
use crate::error::{Result, StockError};
use crate::models::{ComparisonEntry, IndicatorKind, StockComparison, TechnicalIndicatorSet};
use crate::symbol::normalize_symbol;

impl DataAccessContext {
    /// Fetch the requested indicators for `symbol` one after another
    ///
    /// Each indicator is cached and deduplicated on its own. An indicator that cannot be
    /// fetched is logged and left empty; the call itself fails only when `symbol` is not
    /// a valid ticker string or no Alpha Vantage key is configured.
    pub async fn fetch_indicator_set(
        &self,
        symbol: &str,
        requested: &[IndicatorKind],
    ) -> Result<TechnicalIndicatorSet> {
        let symbol = normalize_symbol(symbol)?;
        self.inner.alpha_vantage.ensure_configured()?;
        let mut set = TechnicalIndicatorSet::empty(&symbol);

        let mut kinds: Vec<IndicatorKind> = Vec::with_capacity(requested.len());
        for kind in requested {
            if !kinds.contains(kind) {
                kinds.push(*kind);
            }
        }

        for kind in kinds {
            match self.fetch_indicator(&symbol, kind).await {
                Ok(reading) => set.apply(&reading),
                Err(e) => warn!(%symbol, indicator = %kind, error = %e, "indicator unavailable"),
            }
        }

        Ok(set)
    }

    /// Compare quotes and fundamentals across symbols
    ///
    /// Symbols are fetched in parallel, each one's quote and fundamentals in parallel
    /// too. A symbol that fails is dropped from `results` and logged; the batch does
    /// not fail unless `fail_on_empty_comparison` is set and nothing resolved. The size
    /// bounds apply to the list after duplicates are collapsed.
    pub async fn compare_stocks<S: AsRef<str>>(&self, symbols: &[S]) -> Result<StockComparison> {
        let config = &self.inner.config;

        // `requested` keeps unusable tickers too, so they show up as missing
        let mut requested: Vec<String> = Vec::with_capacity(symbols.len());
        let mut valid: Vec<String> = Vec::with_capacity(symbols.len());
        for raw in symbols {
            match normalize_symbol(raw.as_ref()) {
                Ok(symbol) if requested.contains(&symbol) => {}
                Ok(symbol) => {
                    requested.push(symbol.clone());
                    valid.push(symbol);
                }
                Err(e) => {
                    let raw = raw.as_ref().trim().to_string();
                    if !requested.contains(&raw) {
                        warn!(symbol = %raw, error = %e, "dropping symbol from comparison");
                        requested.push(raw);
                    }
                }
            }
        }

        let (min, max) = (config.compare_min_symbols, config.compare_max_symbols);
        if requested.len() < min || requested.len() > max {
            return Err(StockError::InvalidRequest(format!(
                "compare_stocks takes {min} to {max} distinct symbols, got {}",
                requested.len()
            )));
        }

        self.inner.alpha_vantage.ensure_configured()?;

        let fetches = valid.iter().map(|symbol| async move {
            let outcome = tokio::try_join!(self.fetch_quote(symbol), self.fetch_fundamentals(symbol));
            (symbol, outcome)
        });

        let mut results = BTreeMap::new();
        for (symbol, outcome) in join_all(fetches).await {
            match outcome {
                Ok((quote, metrics)) => {
                    results.insert(symbol.clone(), ComparisonEntry::new(&quote, &metrics));
                }
                Err(e) => warn!(%symbol, error = %e, "dropping symbol from comparison"),
            }
        }

        info!(
            requested = requested.len(),
            resolved = results.len(),
            "comparison complete"
        );

        if results.is_empty() && config.fail_on_empty_comparison {
            return Err(StockError::AllSymbolsFailed { symbols: requested });
        }

        Ok(StockComparison {
            symbols: requested,
            results,
        })
    }
}
