//! Strategy configuration: which detector variant runs and how stops are placed.

use crate::domain::indicator::IndicatorType;

/// Thresholds for the trend-filtered RSI variant.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendRsiParams {
    pub trend_window: usize,
    pub filter_window: usize,
    pub rsi_period: usize,
    pub oversold: f64,
    pub pullback: f64,
    pub overbought: f64,
    /// When false, a signal only fires on the first bar of a run of identical signals.
    pub repeat_alerts: bool,
}

impl Default for TrendRsiParams {
    fn default() -> Self {
        TrendRsiParams {
            trend_window: 200,
            filter_window: 50,
            rsi_period: 14,
            oversold: 35.0,
            pullback: 45.0,
            overbought: 65.0,
            repeat_alerts: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StrategyVariant {
    DualMaCrossover { fast: usize, slow: usize },
    TrendRsi(TrendRsiParams),
}

impl StrategyVariant {
    pub fn indicators(&self) -> Vec<IndicatorType> {
        match self {
            StrategyVariant::DualMaCrossover { fast, slow } => {
                vec![IndicatorType::Sma(*fast), IndicatorType::Sma(*slow)]
            }
            StrategyVariant::TrendRsi(p) => vec![
                IndicatorType::Sma(p.trend_window),
                IndicatorType::Sma(p.filter_window),
                IndicatorType::Rsi(p.rsi_period),
            ],
        }
    }

    /// Bars the variant itself needs before it can be evaluated.
    pub fn warmup(&self) -> usize {
        match self {
            StrategyVariant::DualMaCrossover { fast, slow } => fast.max(slow) + 1,
            StrategyVariant::TrendRsi(p) => p
                .trend_window
                .max(p.filter_window)
                .max(IndicatorType::Rsi(p.rsi_period).warmup()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Strategy {
    pub name: String,
    pub variant: StrategyVariant,
    pub atr_period: usize,
    pub stop_atr_mult: f64,
    pub target_atr_mult: Option<f64>,
    pub min_bars: usize,
}

impl Strategy {
    /// Every indicator the detector and risk sizer read.
    pub fn indicators(&self) -> Vec<IndicatorType> {
        let mut indicators = self.variant.indicators();
        indicators.push(IndicatorType::Atr(self.atr_period));
        indicators
    }

    /// Minimum usable bar count before a signal may be evaluated.
    pub fn required_bars(&self) -> usize {
        self.variant
            .warmup()
            .max(self.atr_period)
            .max(self.min_bars)
    }
}
