//! Market data port trait.

use crate::domain::bar::BarSeries;
use crate::domain::error::TrendwatchError;
use crate::domain::timeframe::Interval;

pub trait MarketDataPort {
    /// Fetches an ordered bar series covering roughly `lookback` up to now.
    ///
    /// Implementations flatten provider-specific layouts into one OHLC series
    /// and drop incomplete rows.
    fn get_bars(
        &self,
        symbol: &str,
        interval: Interval,
        lookback: chrono::Duration,
    ) -> Result<BarSeries, TrendwatchError>;
}
