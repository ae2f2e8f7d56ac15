//! Signal detection over a bar series.
//!
//! The crossover variant compares the latest two bars; the trend/RSI variant
//! is a level check on the latest bar. Neither keeps state between runs.

use crate::domain::bar::{Bar, BarSeries};
use crate::domain::indicator::{compute_indicators, IndicatorSeries, IndicatorType};
use crate::domain::signal::{Detection, IndicatorSnapshot, SignalKind};
use crate::domain::strategy::{Strategy, StrategyVariant, TrendRsiParams};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub enum DetectorOutcome {
    InsufficientData { bars: usize, required: usize },
    NoSignal(IndicatorSnapshot),
    Signal(Detection),
}

type IndicatorMap = HashMap<IndicatorType, IndicatorSeries>;

/// Evaluates the strategy on the latest bar of the series.
pub fn detect(series: &BarSeries, strategy: &Strategy) -> DetectorOutcome {
    let bars = series.bars();
    let required = strategy.required_bars();
    let insufficient = DetectorOutcome::InsufficientData {
        bars: bars.len(),
        required,
    };
    if bars.len() < required {
        return insufficient;
    }

    let indicators = compute_indicators(bars, &strategy.indicators());
    let index = bars.len() - 1;

    let Some(snapshot) = snapshot_at(bars, &indicators, strategy, index) else {
        return insufficient;
    };

    match classify_at(&strategy.variant, bars, &indicators, index) {
        Some(kind) => DetectorOutcome::Signal(Detection {
            symbol: series.symbol().to_string(),
            kind,
            snapshot,
        }),
        None => DetectorOutcome::NoSignal(snapshot),
    }
}

/// Every bar index at which the strategy would have fired.
pub fn detect_history(series: &BarSeries, strategy: &Strategy) -> Vec<(usize, SignalKind)> {
    let bars = series.bars();
    let indicators = compute_indicators(bars, &strategy.indicators());
    (0..bars.len())
        .filter_map(|i| classify_at(&strategy.variant, bars, &indicators, i).map(|k| (i, k)))
        .collect()
}

/// Crossover rule with the asymmetric tie-break: the previous bar may sit on
/// equality, the current bar must strictly break it.
pub fn classify_crossover(prev_fast: f64, prev_slow: f64, fast: f64, slow: f64) -> Option<SignalKind> {
    if prev_fast <= prev_slow && fast > slow {
        Some(SignalKind::GoldenCross)
    } else if prev_fast >= prev_slow && fast < slow {
        Some(SignalKind::DeathCross)
    } else {
        None
    }
}

pub fn classify_trend_rsi(
    close: f64,
    trend_ma: f64,
    filter_ma: f64,
    rsi: f64,
    params: &TrendRsiParams,
) -> Option<SignalKind> {
    let trend_up = close > trend_ma && filter_ma > trend_ma;
    let trend_down = close < trend_ma && filter_ma < trend_ma;

    if trend_up {
        if rsi <= params.oversold {
            Some(SignalKind::Oversold)
        } else if rsi <= params.pullback {
            Some(SignalKind::Pullback)
        } else {
            None
        }
    } else if trend_down && rsi >= params.overbought {
        Some(SignalKind::Overbought)
    } else {
        None
    }
}

fn value(indicators: &IndicatorMap, indicator_type: IndicatorType, index: usize) -> Option<f64> {
    indicators.get(&indicator_type)?.value_at(index)
}

fn classify_at(
    variant: &StrategyVariant,
    bars: &[Bar],
    indicators: &IndicatorMap,
    index: usize,
) -> Option<SignalKind> {
    match variant {
        StrategyVariant::DualMaCrossover { fast, slow } => {
            let prev = index.checked_sub(1)?;
            classify_crossover(
                value(indicators, IndicatorType::Sma(*fast), prev)?,
                value(indicators, IndicatorType::Sma(*slow), prev)?,
                value(indicators, IndicatorType::Sma(*fast), index)?,
                value(indicators, IndicatorType::Sma(*slow), index)?,
            )
        }
        StrategyVariant::TrendRsi(params) => {
            let kind = trend_rsi_at(params, bars, indicators, index)?;
            if !params.repeat_alerts {
                let repeated = index
                    .checked_sub(1)
                    .and_then(|prev| trend_rsi_at(params, bars, indicators, prev))
                    == Some(kind);
                if repeated {
                    return None;
                }
            }
            Some(kind)
        }
    }
}

fn trend_rsi_at(
    params: &TrendRsiParams,
    bars: &[Bar],
    indicators: &IndicatorMap,
    index: usize,
) -> Option<SignalKind> {
    classify_trend_rsi(
        bars.get(index)?.close,
        value(indicators, IndicatorType::Sma(params.trend_window), index)?,
        value(indicators, IndicatorType::Sma(params.filter_window), index)?,
        value(indicators, IndicatorType::Rsi(params.rsi_period), index)?,
        params,
    )
}

fn snapshot_at(
    bars: &[Bar],
    indicators: &IndicatorMap,
    strategy: &Strategy,
    index: usize,
) -> Option<IndicatorSnapshot> {
    let bar = bars.get(index)?;
    let readings = strategy
        .variant
        .indicators()
        .into_iter()
        .map(|t| value(indicators, t, index).map(|v| (t, v)))
        .collect::<Option<Vec<_>>>()?;

    Some(IndicatorSnapshot {
        index,
        timestamp: bar.timestamp,
        close: bar.close,
        atr: value(indicators, IndicatorType::Atr(strategy.atr_period), index)?,
        readings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_bars::from_closes;

    fn crossover(fast: usize, slow: usize) -> Strategy {
        Strategy {
            name: "test".into(),
            variant: StrategyVariant::DualMaCrossover { fast, slow },
            atr_period: 3,
            stop_atr_mult: 3.0,
            target_atr_mult: None,
            min_bars: 0,
        }
    }

    fn series(closes: &[f64]) -> BarSeries {
        BarSeries::new("TEST", from_closes(closes))
    }

    #[test]
    fn crossover_tie_break_rules() {
        assert_eq!(classify_crossover(1.0, 1.0, 2.0, 1.0), Some(SignalKind::GoldenCross));
        assert_eq!(classify_crossover(0.5, 1.0, 2.0, 1.0), Some(SignalKind::GoldenCross));
        assert_eq!(classify_crossover(1.0, 1.0, 0.5, 1.0), Some(SignalKind::DeathCross));
        assert_eq!(classify_crossover(2.0, 1.0, 0.5, 1.0), Some(SignalKind::DeathCross));
        // equality on both bars never fires
        assert_eq!(classify_crossover(1.0, 1.0, 1.0, 1.0), None);
        // moving into equality is not a cross
        assert_eq!(classify_crossover(2.0, 1.0, 1.0, 1.0), None);
        assert_eq!(classify_crossover(0.5, 1.0, 1.0, 1.0), None);
        // relation held
        assert_eq!(classify_crossover(2.0, 1.0, 3.0, 1.0), None);
    }

    #[test]
    fn insufficient_data_below_warmup() {
        let outcome = detect(&series(&[100.0; 5]), &crossover(2, 5));
        assert_eq!(
            outcome,
            DetectorOutcome::InsufficientData {
                bars: 5,
                required: 6
            }
        );
    }

    #[test]
    fn flat_series_never_fires() {
        let s = series(&[100.0; 50]);
        assert!(detect_history(&s, &crossover(2, 3)).is_empty());
        assert!(matches!(detect(&s, &crossover(2, 3)), DetectorOutcome::NoSignal(_)));
    }

    #[test]
    fn golden_cross_fires_once_at_flip() {
        let mut closes = vec![100.0; 10];
        closes.extend([110.0, 110.0, 110.0]);
        let history = detect_history(&series(&closes), &crossover(2, 3));
        assert_eq!(history, vec![(10, SignalKind::GoldenCross)]);
    }

    #[test]
    fn golden_cross_on_latest_bar() {
        let mut closes = vec![100.0; 10];
        closes.push(110.0);
        match detect(&series(&closes), &crossover(2, 3)) {
            DetectorOutcome::Signal(d) => {
                assert_eq!(d.kind, SignalKind::GoldenCross);
                assert_eq!(d.symbol, "TEST");
                assert_eq!(d.snapshot.index, 10);
                assert_eq!(d.snapshot.close, 110.0);
                assert_eq!(d.snapshot.get(IndicatorType::Sma(2)), Some(105.0));
            }
            other => panic!("expected signal, got {:?}", other),
        }
    }

    #[test]
    fn death_cross_fires_once() {
        let mut closes = vec![100.0; 10];
        closes.extend([90.0, 90.0, 90.0]);
        let history = detect_history(&series(&closes), &crossover(2, 3));
        assert_eq!(history, vec![(10, SignalKind::DeathCross)]);
    }

    fn params() -> TrendRsiParams {
        TrendRsiParams::default()
    }

    #[test]
    fn trend_up_bands() {
        let p = params();
        assert_eq!(classify_trend_rsi(110.0, 100.0, 105.0, 30.0, &p), Some(SignalKind::Oversold));
        assert_eq!(classify_trend_rsi(110.0, 100.0, 105.0, 35.0, &p), Some(SignalKind::Oversold));
        assert_eq!(classify_trend_rsi(110.0, 100.0, 105.0, 40.0, &p), Some(SignalKind::Pullback));
        assert_eq!(classify_trend_rsi(110.0, 100.0, 105.0, 45.0, &p), Some(SignalKind::Pullback));
        assert_eq!(classify_trend_rsi(110.0, 100.0, 105.0, 45.1, &p), None);
    }

    #[test]
    fn trend_down_bands() {
        let p = params();
        assert_eq!(classify_trend_rsi(90.0, 100.0, 95.0, 65.0, &p), Some(SignalKind::Overbought));
        assert_eq!(classify_trend_rsi(90.0, 100.0, 95.0, 80.0, &p), Some(SignalKind::Overbought));
        assert_eq!(classify_trend_rsi(90.0, 100.0, 95.0, 64.9, &p), None);
        // oversold readings in a downtrend do not buy
        assert_eq!(classify_trend_rsi(90.0, 100.0, 95.0, 20.0, &p), None);
    }

    #[test]
    fn no_trend_no_signal() {
        let p = params();
        // price above, filter below
        assert_eq!(classify_trend_rsi(110.0, 100.0, 95.0, 20.0, &p), None);
        // price below, filter above
        assert_eq!(classify_trend_rsi(90.0, 100.0, 105.0, 80.0, &p), None);
    }

    fn trend_rsi(repeat_alerts: bool) -> Strategy {
        Strategy {
            variant: StrategyVariant::TrendRsi(TrendRsiParams {
                trend_window: 20,
                filter_window: 5,
                rsi_period: 3,
                repeat_alerts,
                ..TrendRsiParams::default()
            }),
            ..crossover(2, 3)
        }
    }

    fn falling_trend() -> BarSeries {
        // steady decline, then a bounce that lifts RSI while price stays
        // under the trend average
        let mut closes: Vec<f64> = (0..30).map(|i| 200.0 - i as f64).collect();
        closes.extend([176.0, 177.0, 178.0]);
        series(&closes)
    }

    #[test]
    fn trend_rsi_repeats_while_condition_holds() {
        let history = detect_history(&falling_trend(), &trend_rsi(true));
        assert_eq!(
            history,
            vec![
                (30, SignalKind::Overbought),
                (31, SignalKind::Overbought),
                (32, SignalKind::Overbought)
            ]
        );
    }

    #[test]
    fn trend_rsi_dedup_fires_on_first_bar_only() {
        let history = detect_history(&falling_trend(), &trend_rsi(false));
        assert_eq!(history, vec![(30, SignalKind::Overbought)]);
    }

    #[test]
    fn trend_rsi_detect_reports_latest() {
        match detect(&falling_trend(), &trend_rsi(true)) {
            DetectorOutcome::Signal(d) => {
                assert_eq!(d.kind, SignalKind::Overbought);
                assert!(d.snapshot.get(IndicatorType::Rsi(3)).unwrap() >= 65.0);
            }
            other => panic!("expected signal, got {:?}", other),
        }
    }
}
