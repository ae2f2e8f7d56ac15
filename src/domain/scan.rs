//! One sequential pass over the watchlist.
//!
//! Assets are processed one at a time: an order placed for one asset changes
//! the balance the next asset is sized against. A failure on one asset is
//! logged and recorded, and the pass moves on.

use crate::domain::detector::{detect, DetectorOutcome};
use crate::domain::execution::{ExecutionGate, ExecutionOutcome};
use crate::domain::message::format_digest;
use crate::domain::risk::build_signal;
use crate::domain::signal::Signal;
use crate::domain::strategy::Strategy;
use crate::domain::timeframe::Interval;
use crate::ports::data_port::MarketDataPort;
use crate::ports::notify_port::{notify_best_effort, NotifyPort};

#[derive(Debug, Clone, PartialEq)]
pub struct ScanConfig {
    pub watchlist: Vec<String>,
    pub interval: Interval,
    pub lookback: chrono::Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    FetchFailed(String),
    InsufficientData { bars: usize, required: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedAsset {
    pub symbol: String,
    pub reason: SkipReason,
}

#[derive(Debug, Default)]
pub struct ScanReport {
    pub scanned: usize,
    pub skipped: Vec<SkippedAsset>,
    pub signals: Vec<Signal>,
    pub outcomes: Vec<ExecutionOutcome>,
    pub digest_sent: bool,
}

impl ScanReport {
    pub fn recommendations(&self) -> usize {
        self.count(|o| matches!(o, ExecutionOutcome::Recommended { .. }))
    }

    pub fn orders_placed(&self) -> usize {
        self.count(|o| matches!(o, ExecutionOutcome::Filled { .. }))
    }

    pub fn orders_failed(&self) -> usize {
        self.count(|o| matches!(o, ExecutionOutcome::Failed { .. }))
    }

    pub fn sizing_rejections(&self) -> usize {
        self.count(|o| matches!(o, ExecutionOutcome::SizingRejected { .. }))
    }

    fn count(&self, pred: impl Fn(&ExecutionOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(o)).count()
    }
}

pub fn run_scan(
    config: &ScanConfig,
    strategy: &Strategy,
    data: &dyn MarketDataPort,
    gate: &ExecutionGate<'_>,
    notifier: &dyn NotifyPort,
) -> ScanReport {
    let mut report = ScanReport::default();
    let mut recommendations: Vec<String> = Vec::new();

    for symbol in &config.watchlist {
        report.scanned += 1;

        let series = match data.get_bars(symbol, config.interval, config.lookback) {
            Ok(series) => series,
            Err(e) => {
                log::warn!("skipping {}: {}", symbol, e);
                report.skipped.push(SkippedAsset {
                    symbol: symbol.clone(),
                    reason: SkipReason::FetchFailed(e.to_string()),
                });
                continue;
            }
        };

        let detection = match detect(&series, strategy) {
            DetectorOutcome::InsufficientData { bars, required } => {
                log::info!(
                    "skipping {} (only {} bars, minimum {} required)",
                    symbol,
                    bars,
                    required
                );
                report.skipped.push(SkippedAsset {
                    symbol: symbol.clone(),
                    reason: SkipReason::InsufficientData { bars, required },
                });
                continue;
            }
            DetectorOutcome::NoSignal(snapshot) => {
                log::debug!("{}: no signal at close {:.4}", symbol, snapshot.close);
                continue;
            }
            DetectorOutcome::Signal(detection) => detection,
        };

        let signal = build_signal(detection, strategy);
        log::info!(
            "{}: {} ({}) at {:.4}, stop {:.4}",
            symbol,
            signal.direction,
            signal.kind,
            signal.entry_price,
            signal.stop_loss
        );

        let outcome = gate.execute(&signal);
        if let ExecutionOutcome::Recommended { message } = &outcome {
            recommendations.push(message.clone());
        }
        report.signals.push(signal);
        report.outcomes.push(outcome);
    }

    if let Some(digest) = format_digest(config.interval, &recommendations) {
        report.digest_sent = notify_best_effort(notifier, &digest);
    }

    log::info!(
        "scan complete: {} scanned, {} skipped, {} signals, {} orders placed, {} failed, {} rejected by sizing",
        report.scanned,
        report.skipped.len(),
        report.signals.len(),
        report.orders_placed(),
        report.orders_failed(),
        report.sizing_rejections()
    );

    report
}
