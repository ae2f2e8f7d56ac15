//! Technical indicator implementations.
//!
//! This module provides types for representing indicator values and series:
//! - `IndicatorPoint`: A single point in an indicator time series
//! - `IndicatorType`: Enum for indicator identity + parameters (serves as HashMap key)
//! - `IndicatorSeries`: A time series of indicator values aligned with the input bars
//!
//! Points inside an indicator's warm-up window carry no value and must not be read.

pub mod atr;
pub mod rsi;
pub mod sma;

use crate::domain::bar::Bar;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPoint {
    pub timestamp: DateTime<Utc>,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Rsi(usize),
    Atr(usize),
}

impl IndicatorType {
    /// Number of bars needed before the first defined value.
    pub fn warmup(&self) -> usize {
        match self {
            IndicatorType::Sma(period) | IndicatorType::Atr(period) => *period,
            IndicatorType::Rsi(period) => period + 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    pub(crate) fn from_values(
        indicator_type: IndicatorType,
        bars: &[Bar],
        values: Vec<Option<f64>>,
    ) -> Self {
        let values = bars
            .iter()
            .zip(values)
            .map(|(bar, value)| IndicatorPoint {
                timestamp: bar.timestamp,
                value,
            })
            .collect();
        Self {
            indicator_type,
            values,
        }
    }

    pub fn value_at(&self, index: usize) -> Option<f64> {
        self.values.get(index).and_then(|p| p.value)
    }

    pub fn latest(&self) -> Option<f64> {
        self.values.last().and_then(|p| p.value)
    }

    /// Index of the first defined value, if any.
    pub fn first_valid(&self) -> Option<usize> {
        self.values.iter().position(|p| p.value.is_some())
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Atr(period) => write!(f, "ATR({})", period),
        }
    }
}

pub fn calculate(bars: &[Bar], indicator_type: IndicatorType) -> IndicatorSeries {
    match indicator_type {
        IndicatorType::Sma(period) => sma::calculate_sma(bars, period),
        IndicatorType::Rsi(period) => rsi::calculate_rsi(bars, period),
        IndicatorType::Atr(period) => atr::calculate_atr(bars, period),
    }
}

/// Computes every requested indicator once, keyed by its type.
pub fn compute_indicators(
    bars: &[Bar],
    requested: &[IndicatorType],
) -> HashMap<IndicatorType, IndicatorSeries> {
    let mut out = HashMap::with_capacity(requested.len());
    for indicator_type in requested {
        out.entry(*indicator_type)
            .or_insert_with(|| calculate(bars, *indicator_type));
    }
    out
}
