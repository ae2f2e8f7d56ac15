//! CSV file market data adapter.
//!
//! Reads `{symbol}_{interval}.csv` from a base directory with a
//! `timestamp,open,high,low,close` header; extra columns are ignored.

use crate::domain::bar::{Bar, BarSeries};
use crate::domain::error::TrendwatchError;
use crate::domain::timeframe::Interval;
use crate::ports::data_port::MarketDataPort;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    timestamp: String,
    open: Option<f64>,
    high: Option<f64>,
    low: Option<f64>,
    close: Option<f64>,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str, interval: Interval) -> PathBuf {
        self.base_path.join(format!("{}_{}.csv", symbol, interval))
    }
}

pub(crate) fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Some(ts.and_utc());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ts| ts.and_utc())
}

impl MarketDataPort for CsvAdapter {
    fn get_bars(
        &self,
        symbol: &str,
        interval: Interval,
        lookback: chrono::Duration,
    ) -> Result<BarSeries, TrendwatchError> {
        let path = self.csv_path(symbol, interval);
        let fetch_error = |reason: String| TrendwatchError::DataFetch {
            symbol: symbol.to_string(),
            reason,
        };

        let content = fs::read_to_string(&path)
            .map_err(|e| fetch_error(format!("failed to read {}: {}", path.display(), e)))?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut rows = Vec::new();

        for result in rdr.deserialize::<CsvRow>() {
            let row = result.map_err(|e| fetch_error(format!("CSV parse error: {}", e)))?;
            let timestamp = parse_timestamp(&row.timestamp)
                .ok_or_else(|| fetch_error(format!("invalid timestamp '{}'", row.timestamp)))?;

            // incomplete rows are dropped, not fatal
            if let (Some(open), Some(high), Some(low), Some(close)) =
                (row.open, row.high, row.low, row.close)
            {
                rows.push(Bar {
                    timestamp,
                    open,
                    high,
                    low,
                    close,
                });
            }
        }

        let series = BarSeries::new(symbol, rows);
        let Some(last) = series.last().map(|b| b.timestamp) else {
            return Ok(series);
        };
        let cutoff = last - lookback;
        let recent = series
            .bars()
            .iter()
            .filter(|b| b.timestamp >= cutoff)
            .cloned()
            .collect();
        Ok(BarSeries::new(symbol, recent))
    }
}
