//! Configuration validation.
//!
//! Validates all config fields before a scan runs.

use crate::domain::config::build_strategy;
use crate::domain::error::TrendwatchError;
use crate::domain::timeframe::Interval;
use crate::domain::watchlist::parse_watchlist;
use crate::ports::config_port::ConfigPort;

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), TrendwatchError> {
    validate_scan(config)?;
    validate_strategy(config)?;
    validate_risk(config)?;
    validate_execution(config)?;
    validate_data(config)?;
    validate_network(config)?;
    validate_coverage(config)?;
    Ok(())
}

fn configured_interval(config: &dyn ConfigPort) -> Result<Interval, TrendwatchError> {
    match config.get_nonempty("scan", "interval") {
        Some(s) => s
            .parse::<Interval>()
            .map_err(|reason| TrendwatchError::invalid("scan", "interval", reason)),
        None => Ok(Interval::Hours(1)),
    }
}

fn validate_scan(config: &dyn ConfigPort) -> Result<(), TrendwatchError> {
    let watchlist = config
        .get_string("scan", "watchlist")
        .ok_or_else(|| TrendwatchError::missing("scan", "watchlist"))?;
    parse_watchlist(&watchlist)?;

    if let Some(interval) = config.get_string("scan", "interval") {
        interval
            .parse::<Interval>()
            .map_err(|reason| TrendwatchError::invalid("scan", "interval", reason))?;
    }

    if config.get_int("scan", "lookback_days", 30) <= 0 {
        return Err(TrendwatchError::invalid(
            "scan",
            "lookback_days",
            "lookback_days must be positive",
        ));
    }
    if config.get_int("scan", "min_bars", 100) < 0 {
        return Err(TrendwatchError::invalid(
            "scan",
            "min_bars",
            "min_bars must be non-negative",
        ));
    }
    Ok(())
}

fn validate_strategy(config: &dyn ConfigPort) -> Result<(), TrendwatchError> {
    let variant = config
        .get_nonempty("strategy", "variant")
        .unwrap_or_else(|| "crossover".to_string());

    match variant.as_str() {
        "crossover" => validate_crossover(config)?,
        "trend_rsi" => validate_trend_rsi(config)?,
        other => {
            return Err(TrendwatchError::invalid(
                "strategy",
                "variant",
                format!("unknown variant '{}', expected crossover or trend_rsi", other),
            ))
        }
    }

    positive_int(config, "strategy", "atr_period", 14)?;

    if config.get_double("strategy", "stop_atr_mult", 3.0) <= 0.0 {
        return Err(TrendwatchError::invalid(
            "strategy",
            "stop_atr_mult",
            "stop_atr_mult must be positive",
        ));
    }
    if config.get_double("strategy", "target_atr_mult", 0.0) < 0.0 {
        return Err(TrendwatchError::invalid(
            "strategy",
            "target_atr_mult",
            "target_atr_mult must be non-negative (0 disables the target)",
        ));
    }
    Ok(())
}

fn validate_crossover(config: &dyn ConfigPort) -> Result<(), TrendwatchError> {
    let fast = positive_int(config, "strategy", "fast_window", 40)?;
    let slow = positive_int(config, "strategy", "slow_window", 70)?;
    if fast >= slow {
        return Err(TrendwatchError::invalid(
            "strategy",
            "fast_window",
            "fast_window must be shorter than slow_window",
        ));
    }
    Ok(())
}

fn validate_trend_rsi(config: &dyn ConfigPort) -> Result<(), TrendwatchError> {
    let trend = positive_int(config, "strategy", "trend_window", 200)?;
    let filter = positive_int(config, "strategy", "filter_window", 50)?;
    positive_int(config, "strategy", "rsi_period", 14)?;
    if filter >= trend {
        return Err(TrendwatchError::invalid(
            "strategy",
            "filter_window",
            "filter_window must be shorter than trend_window",
        ));
    }

    let oversold = rsi_level(config, "oversold", 35.0)?;
    let pullback = rsi_level(config, "pullback", 45.0)?;
    rsi_level(config, "overbought", 65.0)?;
    if oversold > pullback {
        return Err(TrendwatchError::invalid(
            "strategy",
            "oversold",
            "oversold must not exceed pullback",
        ));
    }
    Ok(())
}

fn validate_risk(config: &dyn ConfigPort) -> Result<(), TrendwatchError> {
    let fraction = config.get_double("risk", "risk_fraction", 0.20);
    if fraction <= 0.0 || fraction > 1.0 {
        return Err(TrendwatchError::invalid(
            "risk",
            "risk_fraction",
            "risk_fraction must be in (0, 1]",
        ));
    }
    for (key, default) in [("min_buy_notional", 6.0), ("min_sell_notional", 5.5)] {
        if config.get_double("risk", key, default) < 0.0 {
            return Err(TrendwatchError::invalid(
                "risk",
                key,
                format!("{} must be non-negative", key),
            ));
        }
    }
    Ok(())
}

fn validate_execution(config: &dyn ConfigPort) -> Result<(), TrendwatchError> {
    match config.get_nonempty("execution", "mode").as_deref() {
        None | Some("notify") | Some("live") => {}
        Some(other) => {
            return Err(TrendwatchError::invalid(
                "execution",
                "mode",
                format!("unknown mode '{}', expected notify or live", other),
            ))
        }
    }
    if let Some(quote) = config.get_string("execution", "quote_asset") {
        if quote.trim().is_empty() {
            return Err(TrendwatchError::invalid(
                "execution",
                "quote_asset",
                "quote_asset must not be empty",
            ));
        }
    }
    Ok(())
}

fn validate_data(config: &dyn ConfigPort) -> Result<(), TrendwatchError> {
    match config.get_nonempty("data", "provider").as_deref() {
        None | Some("yahoo") => {
            let interval = configured_interval(config)?;
            if interval.is_yahoo_chart_interval() {
                Ok(())
            } else {
                Err(TrendwatchError::invalid(
                    "scan",
                    "interval",
                    format!(
                        "yahoo does not serve {} bars (use 1m, 2m, 5m, 15m, 30m, 60m, 90m, 1h, 1d or 5d)",
                        interval
                    ),
                ))
            }
        }
        Some("csv") => match config.get_nonempty("data", "csv_dir") {
            Some(_) => Ok(()),
            None => Err(TrendwatchError::missing("data", "csv_dir")),
        },
        Some(other) => Err(TrendwatchError::invalid(
            "data",
            "provider",
            format!("unknown provider '{}', expected yahoo or csv", other),
        )),
    }
}

/// The lookback window must be able to hold the history the strategy needs.
fn validate_coverage(config: &dyn ConfigPort) -> Result<(), TrendwatchError> {
    let interval = configured_interval(config)?;
    let lookback_days = config.get_int("scan", "lookback_days", 30);
    let available = interval.bars_in(chrono::Duration::days(lookback_days));
    let required = build_strategy(config).required_bars();
    if available < required as i64 {
        return Err(TrendwatchError::invalid(
            "scan",
            "lookback_days",
            format!(
                "{} days of {} bars hold at most {} bars, {} required",
                lookback_days, interval, available, required
            ),
        ));
    }
    Ok(())
}

fn validate_network(config: &dyn ConfigPort) -> Result<(), TrendwatchError> {
    positive_int(config, "network", "notify_timeout_secs", 10)?;
    positive_int(config, "network", "request_timeout_secs", 15)?;
    Ok(())
}

fn positive_int(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: i64,
) -> Result<i64, TrendwatchError> {
    let value = config.get_int(section, key, default);
    if value <= 0 {
        return Err(TrendwatchError::invalid(
            section,
            key,
            format!("{} must be positive", key),
        ));
    }
    Ok(value)
}

fn rsi_level(config: &dyn ConfigPort, key: &str, default: f64) -> Result<f64, TrendwatchError> {
    let value = config.get_double("strategy", key, default);
    if !(0.0..=100.0).contains(&value) {
        return Err(TrendwatchError::invalid(
            "strategy",
            key,
            format!("{} must be between 0 and 100", key),
        ));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    fn assert_invalid(content: &str, expected_key: &str) {
        match validate_config(&config(content)) {
            Err(TrendwatchError::ConfigInvalid { key, .. }) => assert_eq!(key, expected_key),
            other => panic!("expected invalid {}, got {:?}", expected_key, other),
        }
    }

    #[test]
    fn minimal_config_is_valid() {
        assert!(validate_config(&config("[scan]\nwatchlist = BTC-USD\n")).is_ok());
    }

    #[test]
    fn missing_watchlist() {
        match validate_config(&config("[scan]\ninterval = 1h\n")) {
            Err(TrendwatchError::ConfigMissing { section, key }) => {
                assert_eq!(section, "scan");
                assert_eq!(key, "watchlist");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn duplicate_watchlist_symbol() {
        let result = validate_config(&config("[scan]\nwatchlist = BTC-USD,btc-usd\n"));
        assert!(matches!(result, Err(TrendwatchError::Watchlist(_))));
    }

    #[test]
    fn bad_interval() {
        assert_invalid("[scan]\nwatchlist = A\ninterval = 1w\n", "interval");
    }

    #[test]
    fn fast_must_be_shorter_than_slow() {
        assert_invalid(
            "[scan]\nwatchlist = A\n[strategy]\nfast_window = 70\nslow_window = 40\n",
            "fast_window",
        );
    }

    #[test]
    fn unknown_variant() {
        assert_invalid("[scan]\nwatchlist = A\n[strategy]\nvariant = macd\n", "variant");
    }

    #[test]
    fn trend_rsi_thresholds_checked() {
        assert_invalid(
            "[scan]\nwatchlist = A\n[strategy]\nvariant = trend_rsi\noversold = 50\npullback = 45\n",
            "oversold",
        );
        assert_invalid(
            "[scan]\nwatchlist = A\n[strategy]\nvariant = trend_rsi\noverbought = 120\n",
            "overbought",
        );
    }

    #[test]
    fn risk_fraction_bounds() {
        assert_invalid("[scan]\nwatchlist = A\n[risk]\nrisk_fraction = 0\n", "risk_fraction");
        assert_invalid("[scan]\nwatchlist = A\n[risk]\nrisk_fraction = 1.5\n", "risk_fraction");
    }

    #[test]
    fn unknown_mode() {
        assert_invalid("[scan]\nwatchlist = A\n[execution]\nmode = paper\n", "mode");
    }

    #[test]
    fn csv_provider_needs_dir() {
        match validate_config(&config("[scan]\nwatchlist = A\n[data]\nprovider = csv\n")) {
            Err(TrendwatchError::ConfigMissing { key, .. }) => assert_eq!(key, "csv_dir"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn yahoo_rejects_unserved_interval() {
        assert_invalid("[scan]\nwatchlist = A\ninterval = 4h\n", "interval");
        assert!(validate_config(&config(
            "[scan]\nwatchlist = A\ninterval = 4h\n[data]\nprovider = csv\ncsv_dir = bars\n"
        ))
        .is_ok());
    }

    #[test]
    fn lookback_must_cover_required_bars() {
        assert_invalid("[scan]\nwatchlist = A\ninterval = 1d\n", "lookback_days");
        assert!(validate_config(&config(
            "[scan]\nwatchlist = A\ninterval = 1d\nlookback_days = 150\n"
        ))
        .is_ok());
        assert_invalid(
            "[scan]\nwatchlist = A\nlookback_days = 5\n[strategy]\nvariant = trend_rsi\n",
            "lookback_days",
        );
    }

    #[test]
    fn zero_timeout_rejected() {
        assert_invalid(
            "[scan]\nwatchlist = A\n[network]\nnotify_timeout_secs = 0\n",
            "notify_timeout_secs",
        );
    }
}
