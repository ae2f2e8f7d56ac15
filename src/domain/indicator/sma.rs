//! Simple Moving Average indicator.
//!
//! SMA(n)[i] = sum(C[i-n+1..=i]) / n
//! Warmup: first (n-1) bars are undefined.

use crate::domain::bar::Bar;
use crate::domain::indicator::{IndicatorSeries, IndicatorType};

pub fn calculate_sma(bars: &[Bar], period: usize) -> IndicatorSeries {
    let values = (0..bars.len())
        .map(|i| {
            if period == 0 || i + 1 < period {
                return None;
            }
            let window = &bars[i + 1 - period..=i];
            Some(window.iter().map(|b| b.close).sum::<f64>() / period as f64)
        })
        .collect();

    IndicatorSeries::from_values(IndicatorType::Sma(period), bars, values)
}
