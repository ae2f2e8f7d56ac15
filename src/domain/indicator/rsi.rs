//! RSI (Relative Strength Index) indicator implementation.
//!
//! Uses Wilder's smoothing as an exponentially weighted average with
//! alpha = 1/n, seeded by the first price change:
//! - avg = alpha * current + (1 - alpha) * prev_avg
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0: RSI = 100
//!
//! Warmup: first n bars are undefined (need n price changes).

use crate::domain::bar::Bar;
use crate::domain::indicator::{IndicatorSeries, IndicatorType};

pub fn calculate_rsi(bars: &[Bar], period: usize) -> IndicatorSeries {
    let mut values: Vec<Option<f64>> = vec![None; bars.len()];

    if period == 0 || bars.len() < 2 {
        return IndicatorSeries::from_values(IndicatorType::Rsi(period), bars, values);
    }

    let alpha = 1.0 / period as f64;
    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;

    for i in 1..bars.len() {
        let change = bars[i].close - bars[i - 1].close;
        let gain = change.max(0.0);
        let loss = (-change).max(0.0);

        if i == 1 {
            avg_gain = gain;
            avg_loss = loss;
        } else {
            avg_gain = alpha * gain + (1.0 - alpha) * avg_gain;
            avg_loss = alpha * loss + (1.0 - alpha) * avg_loss;
        }

        if i >= period {
            values[i] = Some(rsi_from_averages(avg_gain, avg_loss));
        }
    }

    IndicatorSeries::from_values(IndicatorType::Rsi(period), bars, values)
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
    }
}
