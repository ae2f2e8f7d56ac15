//! Watchlist parsing and symbol-to-pair mapping.
//!
//! Watchlist entries are market-data symbols such as `BTC-USD`; the exchange
//! trades the base asset against a configured quote asset (`BTCUSDT`).

use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WatchlistError {
    #[error("empty token in watchlist")]
    EmptyToken,

    #[error("duplicate symbol: {0}")]
    DuplicateSymbol(String),

    #[error("watchlist is empty")]
    Empty,
}

pub fn parse_watchlist(input: &str) -> Result<Vec<String>, WatchlistError> {
    if input.trim().is_empty() {
        return Err(WatchlistError::Empty);
    }

    let mut symbols = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(WatchlistError::EmptyToken);
        }
        let symbol = trimmed.to_uppercase();
        if !seen.insert(symbol.clone()) {
            return Err(WatchlistError::DuplicateSymbol(symbol));
        }
        symbols.push(symbol);
    }

    Ok(symbols)
}

/// `BTC-USD` -> `BTC`, `ETH/USDT` -> `ETH`, `SOL` -> `SOL`.
pub fn base_asset(symbol: &str) -> &str {
    symbol
        .split(['-', '/'])
        .next()
        .unwrap_or(symbol)
}

/// Exchange pair for a watchlist symbol, e.g. `BTC-USD` + `USDT` -> `BTCUSDT`.
pub fn exchange_pair(symbol: &str, quote_asset: &str) -> String {
    format!("{}{}", base_asset(symbol), quote_asset)
}
