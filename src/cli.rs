//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::log_notifier::LogNotifier;
use crate::adapters::telegram_adapter::TelegramNotifier;
use crate::adapters::yahoo_adapter::YahooAdapter;
use crate::domain::config::{build_app_config, process_env, AppConfig, DataSource, EnvLookup};
use crate::domain::detector::{detect, detect_history, DetectorOutcome};
use crate::domain::error::TrendwatchError;
use crate::domain::execution::{ExecutionGate, ExecutionMode};
use crate::domain::scan::{run_scan, ScanReport, SkipReason};
use crate::domain::signal::IndicatorSnapshot;
use crate::domain::watchlist::parse_watchlist;
use crate::ports::data_port::MarketDataPort;
use crate::ports::exchange_port::ExchangePort;
use crate::ports::notify_port::NotifyPort;

#[derive(Parser, Debug)]
#[command(name = "trendwatch", about = "Trend signal scanner with ATR-based risk management")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one pass over the watchlist
    Scan {
        #[arg(short, long)]
        config: PathBuf,
        /// Scan only this symbol instead of the configured watchlist
        #[arg(long)]
        symbol: Option<String>,
        /// Never place orders, even when live mode is configured
        #[arg(long)]
        notify_only: bool,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Print the latest indicator snapshot and past signal bars for a symbol
    Snapshot {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: String,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    run_with_env(cli, &process_env)
}

/// Dispatches `cli`, resolving credential variables through `env`.
pub fn run_with_env(cli: Cli, env: EnvLookup<'_>) -> ExitCode {
    let result = match cli.command {
        Command::Scan {
            config,
            symbol,
            notify_only,
        } => run_scan_command(&config, symbol.as_deref(), notify_only, env),
        Command::Validate { config } => run_validate(&config, env),
        Command::Snapshot { config, symbol } => run_snapshot(&config, &symbol, env),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &PathBuf, env: EnvLookup<'_>) -> Result<AppConfig, TrendwatchError> {
    eprintln!("Loading config from {}", path.display());
    let adapter = FileConfigAdapter::from_file(path)?;
    build_app_config(&adapter, env)
}

pub fn build_data_port(config: &AppConfig) -> Result<Box<dyn MarketDataPort>, TrendwatchError> {
    let port: Box<dyn MarketDataPort> = match &config.data_source {
        DataSource::Yahoo => Box::new(YahooAdapter::new(config.network.request_timeout)?),
        DataSource::Csv(dir) => Box::new(CsvAdapter::new(dir.clone())),
    };
    Ok(port)
}

pub fn build_notifier(config: &AppConfig) -> Result<Box<dyn NotifyPort>, TrendwatchError> {
    match &config.telegram {
        Some(tg) => Ok(Box::new(TelegramNotifier::new(
            &tg.token,
            &tg.chat_id,
            config.network.notify_timeout,
        )?)),
        None => {
            log::warn!("Telegram credentials not set, notifications go to the log");
            Ok(Box::new(LogNotifier))
        }
    }
}

#[cfg(feature = "binance")]
fn connect_exchange(config: &AppConfig) -> Option<Box<dyn ExchangePort>> {
    use crate::adapters::binance_adapter::BinanceSpot;

    let settings = config.exchange.clone()?;
    match BinanceSpot::new(settings, config.network.request_timeout) {
        Ok(spot) => {
            let exchange: Box<dyn ExchangePort> = Box::new(spot);
            Some(exchange)
        }
        Err(e) => {
            log::warn!("exchange client unavailable: {e}");
            None
        }
    }
}

#[cfg(not(feature = "binance"))]
fn connect_exchange(_config: &AppConfig) -> Option<Box<dyn ExchangePort>> {
    log::warn!("built without exchange support");
    None
}

/// Returns an exchange only if live trading is requested, allowed and the
/// credentials can read the account.
pub fn resolve_live_exchange(
    config: &AppConfig,
    notify_only: bool,
    connect: impl FnOnce(&AppConfig) -> Option<Box<dyn ExchangePort>>,
) -> Option<Box<dyn ExchangePort>> {
    if notify_only || config.requested_mode != ExecutionMode::Live {
        return None;
    }
    if config.effective_mode() != ExecutionMode::Live {
        log::warn!("live mode requested without exchange credentials, running notify-only");
        return None;
    }

    let exchange = connect(config)?;
    match exchange.get_balances() {
        Ok(balances) => {
            log::info!(
                "exchange credentials verified, free {}: {:.2}",
                config.quote_asset,
                balances.get(&config.quote_asset).copied().unwrap_or(0.0)
            );
            Some(exchange)
        }
        Err(e) => {
            log::warn!("exchange credential check failed ({e}), running notify-only");
            None
        }
    }
}

fn run_scan_command(
    config_path: &PathBuf,
    symbol: Option<&str>,
    notify_only: bool,
    env: EnvLookup<'_>,
) -> Result<(), TrendwatchError> {
    let mut config = load_config(config_path, env)?;
    if let Some(symbol) = symbol {
        config.scan.watchlist = parse_watchlist(symbol)?;
    }

    let data = build_data_port(&config)?;
    let notifier = build_notifier(&config)?;
    let exchange = resolve_live_exchange(&config, notify_only, connect_exchange);

    let gate = match exchange.as_deref() {
        Some(exchange) => {
            ExecutionGate::live(exchange, notifier.as_ref(), &config.risk, &config.quote_asset)
        }
        None => ExecutionGate::notify_only(notifier.as_ref(), &config.risk, &config.quote_asset),
    };

    eprintln!(
        "Scanning {} symbols on {} bars with {} ({})",
        config.scan.watchlist.len(),
        config.scan.interval,
        config.strategy.name,
        match gate.mode() {
            ExecutionMode::Live => "live",
            ExecutionMode::NotifyOnly => "notify-only",
        }
    );

    let report = run_scan(
        &config.scan,
        &config.strategy,
        data.as_ref(),
        &gate,
        notifier.as_ref(),
    );
    print_report(&report);
    Ok(())
}

fn print_report(report: &ScanReport) {
    eprintln!();
    eprintln!("=== Scan Summary ===");
    eprintln!("Scanned:          {}", report.scanned);
    eprintln!("Signals:          {}", report.signals.len());
    eprintln!("Recommendations:  {}", report.recommendations());
    eprintln!("Orders placed:    {}", report.orders_placed());
    eprintln!("Orders failed:    {}", report.orders_failed());
    eprintln!("Below minimum:    {}", report.sizing_rejections());
    for skipped in &report.skipped {
        match &skipped.reason {
            SkipReason::FetchFailed(reason) => {
                eprintln!("Skipped {}: {}", skipped.symbol, reason)
            }
            SkipReason::InsufficientData { bars, required } => eprintln!(
                "Skipped {}: {} bars, {} required",
                skipped.symbol, bars, required
            ),
        }
    }
}

fn run_validate(config_path: &PathBuf, env: EnvLookup<'_>) -> Result<(), TrendwatchError> {
    let adapter = FileConfigAdapter::from_file(config_path)?;
    let config = build_app_config(&adapter, env)?;

    println!("Config is valid.");
    println!("  Strategy:   {}", config.strategy.name);
    println!("  Watchlist:  {}", config.scan.watchlist.join(", "));
    println!("  Interval:   {}", config.scan.interval);
    println!("  Min bars:   {}", config.strategy.required_bars());
    println!(
        "  Mode:       {}",
        match config.effective_mode() {
            ExecutionMode::Live => "live",
            ExecutionMode::NotifyOnly => "notify-only",
        }
    );
    Ok(())
}

fn run_snapshot(
    config_path: &PathBuf,
    symbol: &str,
    env: EnvLookup<'_>,
) -> Result<(), TrendwatchError> {
    let config = load_config(config_path, env)?;
    let symbol = symbol.trim().to_uppercase();
    let data = build_data_port(&config)?;
    let series = data.get_bars(&symbol, config.scan.interval, config.scan.lookback)?;

    let snapshot = match detect(&series, &config.strategy) {
        DetectorOutcome::InsufficientData { bars, required } => {
            return Err(TrendwatchError::InsufficientData {
                symbol,
                bars,
                required,
            });
        }
        DetectorOutcome::NoSignal(snapshot) => {
            println!("{} {}: no signal on the latest bar", symbol, config.strategy.name);
            snapshot
        }
        DetectorOutcome::Signal(detection) => {
            println!(
                "{} {}: {} on the latest bar",
                symbol, config.strategy.name, detection.kind
            );
            detection.snapshot
        }
    };
    print_snapshot(&snapshot);

    let history = detect_history(&series, &config.strategy);
    println!();
    println!("Signal bars in range: {}", history.len());
    for (index, kind) in history {
        let bar = &series.bars()[index];
        println!(
            "  {}  {:<13} close {:.4}",
            bar.timestamp.format("%Y-%m-%d %H:%M"),
            kind.to_string(),
            bar.close
        );
    }
    Ok(())
}

fn print_snapshot(snapshot: &IndicatorSnapshot) {
    println!("  Bar:    {}", snapshot.timestamp.format("%Y-%m-%d %H:%M"));
    println!("  Close:  {:.4}", snapshot.close);
    for (indicator, value) in &snapshot.readings {
        println!("  {}: {:.4}", indicator, value);
    }
    println!("  ATR:    {:.4}", snapshot.atr);
}
