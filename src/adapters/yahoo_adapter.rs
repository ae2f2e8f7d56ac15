//! Yahoo Finance market data adapter.
//!
//! Fetches intraday or daily bars from the v8 chart endpoint and flattens
//! the columnar `indicators.quote[0]` layout into one bar per timestamp.

use crate::domain::bar::{Bar, BarSeries};
use crate::domain::error::TrendwatchError;
use crate::domain::timeframe::Interval;
use crate::ports::data_port::MarketDataPort;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::time::Duration;

const CHART_URL: &str = "https://query2.finance.yahoo.com/v8/finance/chart";
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
}

pub struct YahooAdapter {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl YahooAdapter {
    pub fn new(timeout: Duration) -> Result<Self, TrendwatchError> {
        Self::with_base_url(CHART_URL, timeout)
    }

    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self, TrendwatchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn chart_url(&self, symbol: &str, interval: Interval, start: i64, end: i64) -> String {
        format!(
            "{}/{}?period1={}&period2={}&interval={}",
            self.base_url, symbol, start, end, interval
        )
    }
}

fn parse_chart(symbol: &str, resp: ChartResponse) -> Result<BarSeries, TrendwatchError> {
    let fetch_error = |reason: String| TrendwatchError::DataFetch {
        symbol: symbol.to_string(),
        reason,
    };

    let result = match (resp.chart.result, resp.chart.error) {
        (_, Some(err)) => return Err(fetch_error(format!("{}: {}", err.code, err.description))),
        (Some(result), None) => result,
        (None, None) => return Err(fetch_error("empty chart result".into())),
    };

    let data = result
        .into_iter()
        .next()
        .ok_or_else(|| fetch_error("chart result array is empty".into()))?;
    let timestamps = data.timestamp.unwrap_or_default();
    let quote = data
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| fetch_error("no quote data".into()))?;

    let mut rows = Vec::with_capacity(timestamps.len());
    for (i, &ts) in timestamps.iter().enumerate() {
        let Some(timestamp) = DateTime::<Utc>::from_timestamp(ts, 0) else {
            continue;
        };
        let column = |c: &[Option<f64>]| c.get(i).copied().flatten();
        // halted or illiquid slots come back as nulls; the in-progress bar carries values and is kept
        if let (Some(open), Some(high), Some(low), Some(close)) = (
            column(&quote.open),
            column(&quote.high),
            column(&quote.low),
            column(&quote.close),
        ) {
            rows.push(Bar {
                timestamp,
                open,
                high,
                low,
                close,
            });
        }
    }

    Ok(BarSeries::new(symbol, rows))
}

impl MarketDataPort for YahooAdapter {
    fn get_bars(
        &self,
        symbol: &str,
        interval: Interval,
        lookback: chrono::Duration,
    ) -> Result<BarSeries, TrendwatchError> {
        let end = Utc::now();
        let start = end - lookback;
        let url = self.chart_url(symbol, interval, start.timestamp(), end.timestamp());
        log::debug!("GET {}", url);

        let fetch_error = |reason: String| TrendwatchError::DataFetch {
            symbol: symbol.to_string(),
            reason,
        };

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| fetch_error(e.to_string()))?;
        let status = response.status();
        if !status.is_success() && status != reqwest::StatusCode::NOT_FOUND {
            return Err(fetch_error(format!("HTTP {}", status)));
        }

        // Yahoo reports unknown symbols as 404 with a chart.error body
        let body: ChartResponse = response
            .json()
            .map_err(|e| fetch_error(format!("unexpected response: {}", e)))?;
        parse_chart(symbol, body)
    }
}
