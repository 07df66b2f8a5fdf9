//! Scripted transport and payload fixtures for tests

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::error::{Result, StockError};
use crate::transport::{HttpRequest, HttpResponse, HttpTransport};

/// Fake transport answering from per-route reply queues
///
/// Routes are `FUNCTION:SYMBOL` for Alpha Vantage (with `:PERIOD` appended for
/// indicators that take one) and `NEWS:<query>` for news. Replies are consumed in
/// order and the last one repeats. Unscripted routes answer 404.
#[derive(Default)]
pub struct ScriptedTransport {
    delay: Option<Duration>,
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    replies: HashMap<String, VecDeque<Result<HttpResponse>>>,
    calls: HashMap<String, usize>,
    call_times: Vec<Instant>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Suspend every call for `delay` before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn reply(&self, route: &str, body: String) {
        self.push(route, Ok(HttpResponse::ok_json(body)));
    }

    pub fn reply_status(&self, route: &str, status: u16) {
        self.push(route, Ok(HttpResponse::new(status, "{}")));
    }

    pub fn fail(&self, route: &str, error: StockError) {
        self.push(route, Err(error));
    }

    fn push(&self, route: &str, reply: Result<HttpResponse>) {
        let mut state = self.state.lock().unwrap();
        state
            .replies
            .entry(route.to_string())
            .or_default()
            .push_back(reply);
    }

    pub fn calls(&self, route: &str) -> usize {
        let state = self.state.lock().unwrap();
        state.calls.get(route).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.calls.values().sum()
    }

    /// Wall-clock moments at which calls arrived
    pub fn call_times(&self) -> Vec<Instant> {
        self.state.lock().unwrap().call_times.clone()
    }

    fn route(request: &HttpRequest) -> String {
        match request.query_value("function") {
            Some(function) => {
                let symbol = request.query_value("symbol").unwrap_or_default();
                match request.query_value("time_period") {
                    Some(period) => format!("{function}:{symbol}:{period}"),
                    None => format!("{function}:{symbol}"),
                }
            }
            None => format!("NEWS:{}", request.query_value("q").unwrap_or_default()),
        }
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn get(&self, request: HttpRequest) -> Result<HttpResponse> {
        let route = Self::route(&request);

        let reply = {
            let mut state = self.state.lock().unwrap();
            *state.calls.entry(route.clone()).or_default() += 1;
            state.call_times.push(Instant::now());

            match state.replies.get_mut(&route) {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            }
        };

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        reply.unwrap_or_else(|| Ok(HttpResponse::new(404, format!("no reply scripted for {route}"))))
    }
}

/// Provider payloads in the shape the real APIs return
pub mod fixtures {
    use serde_json::json;

    pub fn quote(symbol: &str, price: &str) -> String {
        json!({
            "Global Quote": {
                "01. symbol": symbol,
                "02. open": "100.0000",
                "03. high": "105.0000",
                "04. low": "99.0000",
                "05. price": price,
                "06. volume": "1000000",
                "07. latest trading day": "2024-05-03",
                "08. previous close": "100.0000",
                "09. change": "1.0000",
                "10. change percent": "1.0000%"
            }
        })
        .to_string()
    }

    pub fn empty_quote() -> String {
        json!({"Global Quote": {}}).to_string()
    }

    pub fn overview(symbol: &str, pe_ratio: &str) -> String {
        json!({
            "Symbol": symbol,
            "Name": format!("{symbol} Corp"),
            "Sector": "TECHNOLOGY",
            "MarketCapitalization": "1000000000",
            "PERatio": pe_ratio,
            "EPS": "5.10",
            "ProfitMargin": "0.25",
            "Beta": "1.2"
        })
        .to_string()
    }

    pub fn sma(value: &str) -> String {
        json!({
            "Technical Analysis: SMA": {
                "2024-05-03": {"SMA": value},
                "2024-05-02": {"SMA": "1.0"}
            }
        })
        .to_string()
    }

    pub fn rsi(value: &str) -> String {
        json!({
            "Technical Analysis: RSI": {
                "2024-05-03": {"RSI": value}
            }
        })
        .to_string()
    }

    pub fn macd(value: &str, signal: &str, histogram: &str) -> String {
        json!({
            "Technical Analysis: MACD": {
                "2024-05-03": {"MACD": value, "MACD_Signal": signal, "MACD_Hist": histogram}
            }
        })
        .to_string()
    }

    /// `everything` response with one article per title
    pub fn news(titles: &[&str]) -> String {
        let articles: Vec<_> = titles
            .iter()
            .enumerate()
            .map(|(i, title)| {
                json!({
                    "source": {"id": null, "name": "Newswire"},
                    "title": title,
                    "description": null,
                    "url": format!("https://news.example.test/{i}"),
                    "publishedAt": "2024-05-03T14:30:00Z"
                })
            })
            .collect();

        json!({"status": "ok", "totalResults": titles.len(), "articles": articles}).to_string()
    }
}
