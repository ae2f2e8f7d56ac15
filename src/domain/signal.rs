//! Signal types shared by the detector, risk sizer and execution gate.

use crate::domain::indicator::IndicatorType;
use chrono::{DateTime, Utc};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    pub fn side(&self) -> Side {
        match self {
            Direction::Long => Side::Buy,
            Direction::Short => Side::Sell,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Long => write!(f, "LONG"),
            Direction::Short => write!(f, "SHORT"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Buy,
    Sell,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    GoldenCross,
    DeathCross,
    Oversold,
    Pullback,
    Overbought,
}

impl SignalKind {
    pub fn direction(&self) -> Direction {
        match self {
            SignalKind::GoldenCross | SignalKind::Oversold | SignalKind::Pullback => Direction::Long,
            SignalKind::DeathCross | SignalKind::Overbought => Direction::Short,
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SignalKind::GoldenCross => "golden cross",
            SignalKind::DeathCross => "death cross",
            SignalKind::Oversold => "oversold",
            SignalKind::Pullback => "pullback",
            SignalKind::Overbought => "overbought",
        };
        f.write_str(label)
    }
}

/// Indicator readings at the evaluated bar.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSnapshot {
    pub index: usize,
    pub timestamp: DateTime<Utc>,
    pub close: f64,
    pub atr: f64,
    pub readings: Vec<(IndicatorType, f64)>,
}

impl IndicatorSnapshot {
    pub fn get(&self, indicator_type: IndicatorType) -> Option<f64> {
        self.readings
            .iter()
            .find(|(t, _)| *t == indicator_type)
            .map(|(_, v)| *v)
    }
}

/// A detected event before any risk levels are attached.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub symbol: String,
    pub kind: SignalKind,
    pub snapshot: IndicatorSnapshot,
}

/// A detection with ATR-scaled stop and target levels.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub symbol: String,
    pub kind: SignalKind,
    pub direction: Direction,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub take_profit: Option<f64>,
    pub snapshot: IndicatorSnapshot,
}
