#![allow(dead_code)]

use chrono::{Duration, TimeZone, Utc};
pub use trendwatch::domain::bar::{Bar, BarSeries};
use trendwatch::domain::error::TrendwatchError;
use trendwatch::domain::scan::ScanConfig;
use trendwatch::domain::signal::Side;
use trendwatch::domain::strategy::{Strategy, StrategyVariant};
use trendwatch::domain::timeframe::Interval;
use trendwatch::ports::data_port::MarketDataPort;
use trendwatch::ports::exchange_port::{ExchangePort, OrderReceipt};
use trendwatch::ports::notify_port::NotifyPort;
use std::cell::RefCell;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<Bar>>,
    pub errors: HashMap<String, String>,
    pub requests: RefCell<Vec<String>>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<Bar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl MarketDataPort for MockDataPort {
    fn get_bars(
        &self,
        symbol: &str,
        _interval: Interval,
        _lookback: Duration,
    ) -> Result<BarSeries, TrendwatchError> {
        self.requests.borrow_mut().push(symbol.to_string());
        if let Some(reason) = self.errors.get(symbol) {
            return Err(TrendwatchError::DataFetch {
                symbol: symbol.to_string(),
                reason: reason.clone(),
            });
        }
        Ok(BarSeries::new(
            symbol,
            self.data.get(symbol).cloned().unwrap_or_default(),
        ))
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: RefCell<Vec<String>>,
    pub fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            sent: RefCell::new(Vec::new()),
            fail: true,
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.sent.borrow().clone()
    }
}

impl NotifyPort for RecordingNotifier {
    fn notify(&self, text: &str) -> Result<(), TrendwatchError> {
        if self.fail {
            return Err(TrendwatchError::Notify {
                reason: "chat not found".into(),
            });
        }
        self.sent.borrow_mut().push(text.to_string());
        Ok(())
    }
}

/// In-memory exchange that fills market orders at a fixed price per pair and
/// moves balances accordingly.
pub struct ScriptedExchange {
    pub balances: RefCell<HashMap<String, f64>>,
    pub prices: HashMap<String, f64>,
    pub quote_asset: String,
    pub step: f64,
    pub failing_pairs: Vec<String>,
    pub reject_credentials: bool,
    pub balance_calls: RefCell<usize>,
    pub orders: RefCell<Vec<(String, Side, f64)>>,
}

impl ScriptedExchange {
    pub fn new(quote_asset: &str, balances: &[(&str, f64)]) -> Self {
        Self {
            balances: RefCell::new(balances.iter().map(|(k, v)| (k.to_string(), *v)).collect()),
            prices: HashMap::new(),
            quote_asset: quote_asset.to_string(),
            step: 0.001,
            failing_pairs: Vec::new(),
            reject_credentials: false,
            balance_calls: RefCell::new(0),
            orders: RefCell::new(Vec::new()),
        }
    }

    pub fn with_price(mut self, pair: &str, price: f64) -> Self {
        self.prices.insert(pair.to_string(), price);
        self
    }

    pub fn failing_on(mut self, pair: &str) -> Self {
        self.failing_pairs.push(pair.to_string());
        self
    }

    pub fn rejecting_credentials(mut self) -> Self {
        self.reject_credentials = true;
        self
    }

    pub fn balance(&self, asset: &str) -> f64 {
        self.balances.borrow().get(asset).copied().unwrap_or(0.0)
    }
}

impl ExchangePort for ScriptedExchange {
    fn get_balances(&self) -> Result<HashMap<String, f64>, TrendwatchError> {
        *self.balance_calls.borrow_mut() += 1;
        if self.reject_credentials {
            return Err(TrendwatchError::Exchange {
                reason: "Invalid API-key, IP, or permissions for action. (code -2015)".into(),
            });
        }
        Ok(self.balances.borrow().clone())
    }

    fn round_to_precision(&self, _pair: &str, quantity: f64) -> Result<f64, TrendwatchError> {
        Ok(trendwatch::domain::risk::floor_to_step(quantity, self.step))
    }

    fn submit_market_order(
        &self,
        pair: &str,
        side: Side,
        quantity: f64,
    ) -> Result<OrderReceipt, TrendwatchError> {
        self.orders.borrow_mut().push((pair.to_string(), side, quantity));
        if self.failing_pairs.iter().any(|p| p == pair) {
            return Err(TrendwatchError::Exchange {
                reason: "Account has insufficient balance for requested action. (code -2010)"
                    .into(),
            });
        }

        let price = self.prices.get(pair).copied().unwrap_or(1.0);
        let base = pair.trim_end_matches(self.quote_asset.as_str()).to_string();
        let quote_amount = quantity * price;
        let mut balances = self.balances.borrow_mut();
        let sign = match side {
            Side::Buy => 1.0,
            Side::Sell => -1.0,
        };
        *balances.entry(self.quote_asset.clone()).or_insert(0.0) -= sign * quote_amount;
        *balances.entry(base).or_insert(0.0) += sign * quantity;

        Ok(OrderReceipt {
            order_id: format!("{}", self.orders.borrow().len()),
            executed_quantity: quantity,
            quote_quantity: quote_amount,
        })
    }
}

/// Hourly bars from closes, with a fixed one-unit range around each close.
pub fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
    let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Bar {
            timestamp: start + Duration::hours(i as i64),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
        })
        .collect()
}

/// Fast SMA(2) crosses above slow SMA(4) on the final bar.
pub fn golden_cross_closes() -> Vec<f64> {
    vec![10.0, 10.0, 10.0, 10.0, 10.0, 10.0, 9.0, 9.0, 9.0, 12.0]
}

/// Fast SMA(2) crosses below slow SMA(4) on the final bar.
pub fn death_cross_closes() -> Vec<f64> {
    vec![10.0, 10.0, 10.0, 10.0, 10.0, 10.0, 11.0, 11.0, 11.0, 8.0]
}

pub fn flat_closes(n: usize) -> Vec<f64> {
    vec![10.0; n]
}

pub fn crossover_strategy() -> Strategy {
    Strategy {
        name: "SMA 2/4 crossover".into(),
        variant: StrategyVariant::DualMaCrossover { fast: 2, slow: 4 },
        atr_period: 3,
        stop_atr_mult: 2.0,
        target_atr_mult: Some(3.0),
        min_bars: 5,
    }
}

pub fn scan_config(symbols: &[&str]) -> ScanConfig {
    ScanConfig {
        watchlist: symbols.iter().map(|s| s.to_string()).collect(),
        interval: Interval::Hours(1),
        lookback: Duration::days(30),
    }
}
