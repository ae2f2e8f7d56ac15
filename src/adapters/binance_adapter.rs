//! Binance spot REST adapter.
//!
//! Signed endpoints carry `timestamp` and an HMAC-SHA256 `signature` of the
//! query string, keyed by the API secret and sent with the `X-MBX-APIKEY`
//! header.

use crate::domain::config::ExchangeSettings;
use crate::domain::error::TrendwatchError;
use crate::domain::risk::floor_to_step;
use crate::domain::signal::Side;
use crate::ports::exchange_port::{ExchangePort, OrderReceipt};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use std::collections::HashMap;
use std::time::Duration;

const RECV_WINDOW_MS: u64 = 5000;

#[derive(Debug, Deserialize)]
struct ApiError {
    code: i64,
    msg: String,
}

#[derive(Debug, Deserialize)]
struct Account {
    balances: Vec<AssetBalance>,
}

#[derive(Debug, Deserialize)]
struct AssetBalance {
    asset: String,
    free: String,
}

#[derive(Debug, Deserialize)]
struct ExchangeInfo {
    symbols: Vec<SymbolInfo>,
}

#[derive(Debug, Deserialize)]
struct SymbolInfo {
    symbol: String,
    filters: Vec<SymbolFilter>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SymbolFilter {
    filter_type: String,
    step_size: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderResponse {
    order_id: u64,
    executed_qty: String,
    cummulative_quote_qty: String,
}

pub struct BinanceSpot {
    client: reqwest::blocking::Client,
    settings: ExchangeSettings,
}

fn exchange_error(reason: impl Into<String>) -> TrendwatchError {
    TrendwatchError::Exchange {
        reason: reason.into(),
    }
}

fn parse_decimal(field: &str, value: &str) -> Result<f64, TrendwatchError> {
    value
        .parse::<f64>()
        .map_err(|_| exchange_error(format!("invalid {} '{}'", field, value)))
}

/// Renders a quantity without exponent or trailing zeros.
pub(crate) fn format_quantity(quantity: f64) -> String {
    let s = format!("{:.8}", quantity);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s.is_empty() { "0".to_string() } else { s.to_string() }
}

pub(crate) fn sign(secret: &str, payload: &str) -> Result<String, TrendwatchError> {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .map_err(|e| exchange_error(format!("invalid API secret: {}", e)))?;
    mac.update(payload.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

impl BinanceSpot {
    pub fn new(settings: ExchangeSettings, timeout: Duration) -> Result<Self, TrendwatchError> {
        let client = reqwest::blocking::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, settings })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.settings.base_url.trim_end_matches('/'), path)
    }

    fn signed_query(&self, params: &[(&str, String)]) -> Result<String, TrendwatchError> {
        let timestamp = chrono::Utc::now().timestamp_millis();
        let mut query: Vec<String> = params.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        query.push(format!("recvWindow={}", RECV_WINDOW_MS));
        query.push(format!("timestamp={}", timestamp));
        let query = query.join("&");
        let signature = sign(&self.settings.api_secret, &query)?;
        Ok(format!("{}&signature={}", query, signature))
    }

    fn read<T: serde::de::DeserializeOwned>(
        response: reqwest::blocking::Response,
    ) -> Result<T, TrendwatchError> {
        let status = response.status();
        let body = response
            .text()
            .map_err(|e| exchange_error(e.without_url().to_string()))?;
        if !status.is_success() {
            return Err(match serde_json::from_str::<ApiError>(&body) {
                Ok(err) => exchange_error(format!("{} (code {})", err.msg, err.code)),
                Err(_) => exchange_error(format!("HTTP {}", status)),
            });
        }
        serde_json::from_str(&body).map_err(|e| exchange_error(format!("unexpected response: {}", e)))
    }

    fn step_size(&self, pair: &str) -> Result<f64, TrendwatchError> {
        let response = self
            .client
            .get(self.url("/api/v3/exchangeInfo"))
            .query(&[("symbol", pair)])
            .send()
            .map_err(|e| exchange_error(e.without_url().to_string()))?;
        let info: ExchangeInfo = Self::read(response)?;

        let symbol = info
            .symbols
            .into_iter()
            .find(|s| s.symbol == pair)
            .ok_or_else(|| exchange_error(format!("unknown pair {}", pair)))?;
        let step = symbol
            .filters
            .into_iter()
            .find(|f| f.filter_type == "LOT_SIZE")
            .and_then(|f| f.step_size)
            .ok_or_else(|| exchange_error(format!("{} has no LOT_SIZE filter", pair)))?;
        parse_decimal("stepSize", &step)
    }
}

impl ExchangePort for BinanceSpot {
    fn get_balances(&self) -> Result<HashMap<String, f64>, TrendwatchError> {
        let query = self.signed_query(&[])?;
        let response = self
            .client
            .get(format!("{}?{}", self.url("/api/v3/account"), query))
            .header("X-MBX-APIKEY", &self.settings.api_key)
            .send()
            .map_err(|e| exchange_error(e.without_url().to_string()))?;
        let account: Account = Self::read(response)?;

        account
            .balances
            .into_iter()
            .map(|b| parse_decimal("free", &b.free).map(|free| (b.asset, free)))
            .collect()
    }

    fn round_to_precision(&self, pair: &str, quantity: f64) -> Result<f64, TrendwatchError> {
        let step = self.step_size(pair)?;
        Ok(floor_to_step(quantity, step))
    }

    fn submit_market_order(
        &self,
        pair: &str,
        side: Side,
        quantity: f64,
    ) -> Result<OrderReceipt, TrendwatchError> {
        let query = self.signed_query(&[
            ("symbol", pair.to_string()),
            ("side", side.to_string()),
            ("type", "MARKET".to_string()),
            ("quantity", format_quantity(quantity)),
        ])?;
        log::debug!("submitting {} {} {}", side, format_quantity(quantity), pair);

        let response = self
            .client
            .post(format!("{}?{}", self.url("/api/v3/order"), query))
            .header("X-MBX-APIKEY", &self.settings.api_key)
            .send()
            .map_err(|e| exchange_error(e.without_url().to_string()))?;
        let order: OrderResponse = Self::read(response)?;

        Ok(OrderReceipt {
            order_id: order.order_id.to_string(),
            executed_quantity: parse_decimal("executedQty", &order.executed_qty)?,
            quote_quantity: parse_decimal("cummulativeQuoteQty", &order.cummulative_quote_qty)?,
        })
    }
}
