//! Alpha Vantage payload parsers

use chrono::NaiveDate;
use serde_json::Value;

use super::{
    Object, optional_f64, optional_str, parse_date, required_f64, required_str, required_u64,
};
use crate::api::alpha_vantage::PROVIDER;
use crate::error::{Result, StockError};
use crate::models::{
    FinancialMetrics, IndicatorKind, IndicatorReading, IndicatorValue, MacdValue, Quote,
};

fn as_object<'a>(payload: &'a Value, what: &str) -> Result<&'a Object> {
    payload
        .as_object()
        .ok_or_else(|| StockError::malformed(PROVIDER, format!("{what} payload is not an object")))
}

/// Parse a `GLOBAL_QUOTE` response
///
/// Unknown symbols come back as `{"Global Quote": {}}`.
pub fn parse_global_quote(payload: &Value, symbol: &str) -> Result<Quote> {
    let root = as_object(payload, "quote")?;
    let quote = match root.get("Global Quote").and_then(Value::as_object) {
        Some(quote) if !quote.is_empty() => quote,
        _ if root.is_empty() || root.contains_key("Global Quote") => {
            return Err(StockError::InvalidSymbol(symbol.to_string()));
        }
        _ => return Err(StockError::malformed(PROVIDER, "missing `Global Quote`")),
    };

    Ok(Quote {
        symbol: required_str(quote, "01. symbol", PROVIDER)?.to_ascii_uppercase(),
        open: required_f64(quote, "02. open", PROVIDER)?,
        high: required_f64(quote, "03. high", PROVIDER)?,
        low: required_f64(quote, "04. low", PROVIDER)?,
        price: required_f64(quote, "05. price", PROVIDER)?,
        volume: required_u64(quote, "06. volume", PROVIDER)?,
        latest_trading_day: parse_date(
            required_str(quote, "07. latest trading day", PROVIDER)?,
            PROVIDER,
        )?,
        previous_close: required_f64(quote, "08. previous close", PROVIDER)?,
        change: required_f64(quote, "09. change", PROVIDER)?,
        change_percent: required_f64(quote, "10. change percent", PROVIDER)?,
    })
}

/// Parse an `OVERVIEW` response
///
/// Unknown symbols come back as `{}`.
pub fn parse_company_overview(payload: &Value, symbol: &str) -> Result<FinancialMetrics> {
    let overview = as_object(payload, "overview")?;
    if overview.is_empty() {
        return Err(StockError::InvalidSymbol(symbol.to_string()));
    }

    let reported = optional_str(overview, "Symbol")
        .map(|s| s.to_ascii_uppercase())
        .unwrap_or_else(|| symbol.to_string());

    Ok(FinancialMetrics {
        symbol: reported,
        name: required_str(overview, "Name", PROVIDER)?.to_string(),
        sector: optional_str(overview, "Sector"),
        industry: optional_str(overview, "Industry"),
        market_cap: optional_f64(overview, "MarketCapitalization"),
        pe_ratio: optional_f64(overview, "PERatio"),
        peg_ratio: optional_f64(overview, "PEGRatio"),
        book_value: optional_f64(overview, "BookValue"),
        dividend_yield: optional_f64(overview, "DividendYield"),
        eps: optional_f64(overview, "EPS"),
        profit_margin: optional_f64(overview, "ProfitMargin"),
        operating_margin: optional_f64(overview, "OperatingMarginTTM"),
        return_on_assets: optional_f64(overview, "ReturnOnAssetsTTM"),
        return_on_equity: optional_f64(overview, "ReturnOnEquityTTM"),
        beta: optional_f64(overview, "Beta"),
        week_52_high: optional_f64(overview, "52WeekHigh"),
        week_52_low: optional_f64(overview, "52WeekLow"),
        analyst_target_price: optional_f64(overview, "AnalystTargetPrice"),
    })
}

/// Parse the most recent point of a technical indicator series
pub fn parse_indicator(payload: &Value, symbol: &str, kind: IndicatorKind) -> Result<IndicatorReading> {
    let root = as_object(payload, "indicator")?;
    if root.is_empty() {
        return Err(StockError::InvalidSymbol(symbol.to_string()));
    }

    let series_key = format!("Technical Analysis: {}", kind.function());
    let series = root
        .get(&series_key)
        .and_then(Value::as_object)
        .ok_or_else(|| StockError::malformed(PROVIDER, format!("missing `{series_key}`")))?;

    let mut latest: Option<(NaiveDate, &Object)> = None;
    for (stamp, point) in series {
        let date = parse_date(stamp, PROVIDER)?;
        let Some(point) = point.as_object() else {
            continue;
        };
        if latest.is_none_or(|(best, _)| date > best) {
            latest = Some((date, point));
        }
    }

    let (date, point) = latest
        .ok_or_else(|| StockError::malformed(PROVIDER, format!("`{series_key}` has no data points")))?;

    let value = match kind {
        IndicatorKind::Sma50 | IndicatorKind::Sma200 => {
            IndicatorValue::Single(required_f64(point, "SMA", PROVIDER)?)
        }
        IndicatorKind::Rsi14 => IndicatorValue::Single(required_f64(point, "RSI", PROVIDER)?),
        IndicatorKind::Macd => IndicatorValue::Macd(MacdValue {
            value: required_f64(point, "MACD", PROVIDER)?,
            signal: required_f64(point, "MACD_Signal", PROVIDER)?,
            histogram: required_f64(point, "MACD_Hist", PROVIDER)?,
        }),
    };

    Ok(IndicatorReading {
        symbol: symbol.to_string(),
        kind,
        value,
        date,
    })
}
