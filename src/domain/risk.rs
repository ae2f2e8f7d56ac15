//! ATR-scaled stop/target levels and balance-bounded order sizing.

use crate::domain::signal::{Detection, Direction, Side, Signal};
use crate::domain::strategy::Strategy;

/// Balance-related sizing parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskParams {
    pub risk_fraction: f64,
    pub min_buy_notional: f64,
    pub min_sell_notional: f64,
}

impl Default for RiskParams {
    fn default() -> Self {
        RiskParams {
            risk_fraction: 0.20,
            min_buy_notional: 6.0,
            min_sell_notional: 5.5,
        }
    }
}

/// Free balances read immediately before sizing one trade.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BalanceSnapshot {
    pub free_quote: f64,
    pub free_base: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderIntent {
    pub pair: String,
    pub side: Side,
    pub quantity: f64,
}

impl OrderIntent {
    pub fn notional(&self, price: f64) -> f64 {
        self.quantity * price
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SizingDecision {
    Order(OrderIntent),
    Rejected { notional: f64, minimum: f64 },
}

/// Stop-loss and optional take-profit for an entry at `price`.
pub fn levels(
    direction: Direction,
    price: f64,
    atr: f64,
    stop_atr_mult: f64,
    target_atr_mult: Option<f64>,
) -> (f64, Option<f64>) {
    let stop_distance = stop_atr_mult * atr;
    let target_distance = target_atr_mult.map(|k| k * atr);
    match direction {
        Direction::Long => (price - stop_distance, target_distance.map(|d| price + d)),
        Direction::Short => (price + stop_distance, target_distance.map(|d| price - d)),
    }
}

/// Attaches ATR-scaled levels to a detection, entering at the latest close.
pub fn build_signal(detection: Detection, strategy: &Strategy) -> Signal {
    let direction = detection.kind.direction();
    let entry_price = detection.snapshot.close;
    let (stop_loss, take_profit) = levels(
        direction,
        entry_price,
        detection.snapshot.atr,
        strategy.stop_atr_mult,
        strategy.target_atr_mult,
    );
    Signal {
        symbol: detection.symbol,
        kind: detection.kind,
        direction,
        entry_price,
        stop_loss,
        take_profit,
        snapshot: detection.snapshot,
    }
}

/// Sizes a market order against fresh balances.
///
/// Buys commit `risk_fraction` of the free quote balance; sells exit the whole
/// free base balance. `round_quantity` applies the exchange's quantity
/// precision and must round down.
pub fn size_order<E>(
    pair: &str,
    side: Side,
    price: f64,
    balance: BalanceSnapshot,
    params: &RiskParams,
    round_quantity: impl FnOnce(f64) -> Result<f64, E>,
) -> Result<SizingDecision, E> {
    let (raw_quantity, minimum) = match side {
        Side::Buy => {
            let notional = balance.free_quote * params.risk_fraction;
            if notional < params.min_buy_notional {
                return Ok(SizingDecision::Rejected {
                    notional,
                    minimum: params.min_buy_notional,
                });
            }
            (notional / price, params.min_buy_notional)
        }
        Side::Sell => (balance.free_base, params.min_sell_notional),
    };

    let quantity = round_quantity(raw_quantity)?;
    let notional = quantity * price;
    if quantity <= 0.0 || notional < minimum {
        return Ok(SizingDecision::Rejected { notional, minimum });
    }

    Ok(SizingDecision::Order(OrderIntent {
        pair: pair.to_string(),
        side,
        quantity,
    }))
}

/// Rounds `quantity` down to a multiple of `step`.
pub fn floor_to_step(quantity: f64, step: f64) -> f64 {
    if step <= 0.0 || !quantity.is_finite() {
        return quantity;
    }
    let scale = 10f64.powi(step_decimals(step) as i32);
    let at = |units: f64| (units * step * scale).round() / scale;
    let units = (quantity / step + 1e-9).floor().max(0.0);
    let rounded = at(units);
    // the float-noise nudge must never carry past the input
    if rounded > quantity && units >= 1.0 {
        at(units - 1.0)
    } else {
        rounded
    }
}

fn step_decimals(step: f64) -> usize {
    let text = format!("{}", step);
    text.split_once('.').map(|(_, frac)| frac.len()).unwrap_or(0)
}
