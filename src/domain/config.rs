//! Application configuration, built once at start and passed by reference.

use crate::domain::config_validation::validate_config;
use crate::domain::error::TrendwatchError;
use crate::domain::execution::ExecutionMode;
use crate::domain::risk::RiskParams;
use crate::domain::scan::ScanConfig;
use crate::domain::strategy::{Strategy, StrategyVariant, TrendRsiParams};
use crate::domain::timeframe::Interval;
use crate::domain::watchlist::parse_watchlist;
use crate::ports::config_port::ConfigPort;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_EXCHANGE_URL: &str = "https://api.binance.com";

#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    Yahoo,
    Csv(PathBuf),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TelegramSettings {
    pub token: String,
    pub chat_id: String,
}

#[derive(Clone, PartialEq)]
pub struct ExchangeSettings {
    pub api_key: String,
    pub api_secret: String,
    pub base_url: String,
}

impl std::fmt::Debug for ExchangeSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExchangeSettings")
            .field("api_key", &"<redacted>")
            .field("api_secret", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NetworkSettings {
    pub notify_timeout: Duration,
    pub request_timeout: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub scan: ScanConfig,
    pub strategy: Strategy,
    pub risk: RiskParams,
    pub requested_mode: ExecutionMode,
    pub quote_asset: String,
    pub data_source: DataSource,
    pub telegram: Option<TelegramSettings>,
    pub exchange: Option<ExchangeSettings>,
    pub network: NetworkSettings,
}

impl AppConfig {
    /// Live trading needs both the request and credentials; anything else is notify-only.
    pub fn effective_mode(&self) -> ExecutionMode {
        match (self.requested_mode, &self.exchange) {
            (ExecutionMode::Live, Some(_)) => ExecutionMode::Live,
            _ => ExecutionMode::NotifyOnly,
        }
    }
}

/// Environment lookup used for credentials.
pub type EnvLookup<'a> = &'a dyn Fn(&str) -> Option<String>;

pub fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Validates and builds the config, resolving credential variables through `env`.
pub fn build_app_config(
    config: &dyn ConfigPort,
    env: EnvLookup<'_>,
) -> Result<AppConfig, TrendwatchError> {
    validate_config(config)?;

    let watchlist = parse_watchlist(&config.get_string("scan", "watchlist").unwrap_or_default())?;
    let interval = match config.get_nonempty("scan", "interval") {
        Some(s) => s
            .parse::<Interval>()
            .map_err(|reason| TrendwatchError::invalid("scan", "interval", reason))?,
        None => Interval::Hours(1),
    };
    let lookback = chrono::Duration::days(config.get_int("scan", "lookback_days", 30));

    let requested_mode = match config.get_nonempty("execution", "mode").as_deref() {
        Some("live") => ExecutionMode::Live,
        _ => ExecutionMode::NotifyOnly,
    };

    let data_source = match config.get_nonempty("data", "provider").as_deref() {
        Some("csv") => DataSource::Csv(PathBuf::from(
            config.get_nonempty("data", "csv_dir").unwrap_or_default(),
        )),
        _ => DataSource::Yahoo,
    };

    let telegram = match (
        config.get_secret("telegram", "token", "TELEGRAM_TOKEN", env),
        config.get_secret("telegram", "chat_id", "TELEGRAM_CHAT_ID", env),
    ) {
        (Some(token), Some(chat_id)) => Some(TelegramSettings { token, chat_id }),
        _ => None,
    };

    let exchange = match (
        config.get_secret("exchange", "api_key", "EXCHANGE_API_KEY", env),
        config.get_secret("exchange", "api_secret", "EXCHANGE_API_SECRET", env),
    ) {
        (Some(api_key), Some(api_secret)) => Some(ExchangeSettings {
            api_key,
            api_secret,
            base_url: config
                .get_nonempty("exchange", "base_url")
                .unwrap_or_else(|| DEFAULT_EXCHANGE_URL.to_string()),
        }),
        _ => None,
    };

    Ok(AppConfig {
        scan: ScanConfig {
            watchlist,
            interval,
            lookback,
        },
        strategy: build_strategy(config),
        risk: RiskParams {
            risk_fraction: config.get_double("risk", "risk_fraction", 0.20),
            min_buy_notional: config.get_double("risk", "min_buy_notional", 6.0),
            min_sell_notional: config.get_double("risk", "min_sell_notional", 5.5),
        },
        requested_mode,
        quote_asset: config
            .get_nonempty("execution", "quote_asset")
            .unwrap_or_else(|| "USDT".to_string())
            .to_uppercase(),
        data_source,
        telegram,
        exchange,
        network: NetworkSettings {
            notify_timeout: Duration::from_secs(config.get_int("network", "notify_timeout_secs", 10) as u64),
            request_timeout: Duration::from_secs(config.get_int("network", "request_timeout_secs", 15) as u64),
        },
    })
}

fn window(config: &dyn ConfigPort, key: &str, default: i64) -> usize {
    config.get_int("strategy", key, default) as usize
}

/// Builds the strategy section; assumes `validate_config` has passed.
pub fn build_strategy(config: &dyn ConfigPort) -> Strategy {
    let variant = match config.get_nonempty("strategy", "variant").as_deref() {
        Some("trend_rsi") => StrategyVariant::TrendRsi(TrendRsiParams {
            trend_window: window(config, "trend_window", 200),
            filter_window: window(config, "filter_window", 50),
            rsi_period: window(config, "rsi_period", 14),
            oversold: config.get_double("strategy", "oversold", 35.0),
            pullback: config.get_double("strategy", "pullback", 45.0),
            overbought: config.get_double("strategy", "overbought", 65.0),
            repeat_alerts: config.get_bool("strategy", "repeat_alerts", true),
        }),
        _ => StrategyVariant::DualMaCrossover {
            fast: window(config, "fast_window", 40),
            slow: window(config, "slow_window", 70),
        },
    };

    let default_name = match &variant {
        StrategyVariant::DualMaCrossover { fast, slow } => format!("SMA {}/{} crossover", fast, slow),
        StrategyVariant::TrendRsi(p) => format!("Trend SMA{} + RSI{}", p.trend_window, p.rsi_period),
    };

    let target = config.get_double("strategy", "target_atr_mult", 0.0);

    Strategy {
        name: config.get_nonempty("strategy", "name").unwrap_or(default_name),
        variant,
        atr_period: window(config, "atr_period", 14),
        stop_atr_mult: config.get_double("strategy", "stop_atr_mult", 3.0),
        target_atr_mult: (target > 0.0).then_some(target),
        min_bars: config.get_int("scan", "min_bars", 100) as usize,
    }
}
