//! OHLC bar and per-asset bar series.

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Bar {
    /// max(high - low, |high - prev_close|, |low - prev_close|)
    pub fn true_range(&self, prev_close: f64) -> f64 {
        let hl = self.high - self.low;
        let hc = (self.high - prev_close).abs();
        let lc = (self.low - prev_close).abs();
        hl.max(hc).max(lc)
    }

    fn is_complete(&self) -> bool {
        self.open.is_finite() && self.high.is_finite() && self.low.is_finite() && self.close.is_finite()
    }
}

/// Ordered bars for one asset and timeframe.
///
/// Timestamps are strictly increasing. The series is built fresh for every
/// scan and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct BarSeries {
    symbol: String,
    bars: Vec<Bar>,
}

impl BarSeries {
    /// Builds a series from raw provider rows.
    ///
    /// Rows with a non-finite OHLC field are dropped, the remainder is sorted
    /// by timestamp and duplicate timestamps keep the last observation.
    pub fn new(symbol: impl Into<String>, rows: Vec<Bar>) -> Self {
        let mut bars: Vec<Bar> = rows.into_iter().filter(Bar::is_complete).collect();
        bars.sort_by_key(|b| b.timestamp);

        let mut deduped: Vec<Bar> = Vec::with_capacity(bars.len());
        for bar in bars {
            match deduped.last_mut() {
                Some(last) if last.timestamp == bar.timestamp => *last = bar,
                _ => deduped.push(bar),
            }
        }

        Self {
            symbol: symbol.into(),
            bars: deduped,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn bar_at(hour: u32, close: f64) -> Bar {
        Bar {
            timestamp: Utc.with_ymd_and_hms(2024, 1, 15, hour, 0, 0).unwrap(),
            open: close,
            high: close + 10.0,
            low: close - 10.0,
            close,
        }
    }

    #[test]
    fn true_range_hl_dominates() {
        let bar = Bar {
            high: 110.0,
            low: 90.0,
            ..bar_at(0, 105.0)
        };
        assert!((bar.true_range(100.0) - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn true_range_gap_up() {
        let bar = Bar {
            high: 110.0,
            low: 90.0,
            ..bar_at(0, 105.0)
        };
        // |110-70| = 40
        assert!((bar.true_range(70.0) - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn true_range_gap_down() {
        let bar = Bar {
            high: 110.0,
            low: 90.0,
            ..bar_at(0, 105.0)
        };
        // |90-130| = 40
        assert!((bar.true_range(130.0) - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn series_sorts_by_timestamp() {
        let series = BarSeries::new("BTC-USD", vec![bar_at(3, 3.0), bar_at(1, 1.0), bar_at(2, 2.0)]);
        let closes: Vec<f64> = series.bars().iter().map(|b| b.close).collect();
        assert_eq!(closes, vec![1.0, 2.0, 3.0]);
        assert_eq!(series.symbol(), "BTC-USD");
    }

    #[test]
    fn series_drops_incomplete_rows() {
        let mut broken = bar_at(2, 2.0);
        broken.close = f64::NAN;
        let series = BarSeries::new("ETH-USD", vec![bar_at(1, 1.0), broken, bar_at(3, 3.0)]);
        assert_eq!(series.len(), 2);
        assert!(series.bars().iter().all(|b| b.close.is_finite()));
    }

    #[test]
    fn series_keeps_last_duplicate() {
        let series = BarSeries::new("SOL-USD", vec![bar_at(1, 1.0), bar_at(1, 1.5), bar_at(2, 2.0)]);
        assert_eq!(series.len(), 2);
        assert_eq!(series.bars()[0].close, 1.5);
        assert_eq!(series.last().map(|b| b.close), Some(2.0));
    }

    #[test]
    fn empty_series() {
        let series = BarSeries::new("XRP-USD", vec![]);
        assert!(series.is_empty());
        assert!(series.last().is_none());
    }
}
