//! Average True Range as a plain rolling mean of true range.
//!
//! TR[0] = high - low, TR[i] = max(H-L, |H-C[i-1]|, |L-C[i-1]|).
//! ATR(n)[i] = mean(TR[i-n+1..=i]); first (n-1) bars are undefined.
//!
//! Not Wilder-smoothed.

use crate::domain::bar::Bar;
use crate::domain::indicator::{IndicatorSeries, IndicatorType};

pub fn true_ranges(bars: &[Bar]) -> Vec<f64> {
    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            if i == 0 {
                bar.high - bar.low
            } else {
                bar.true_range(bars[i - 1].close)
            }
        })
        .collect()
}

pub fn calculate_atr(bars: &[Bar], period: usize) -> IndicatorSeries {
    let tr = true_ranges(bars);
    let values = (0..bars.len())
        .map(|i| {
            if period == 0 || i + 1 < period {
                return None;
            }
            Some(tr[i + 1 - period..=i].iter().sum::<f64>() / period as f64)
        })
        .collect();

    IndicatorSeries::from_values(IndicatorType::Atr(period), bars, values)
}
