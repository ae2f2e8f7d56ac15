//! Exchange account and order port trait.

use crate::domain::error::TrendwatchError;
use crate::domain::signal::Side;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct OrderReceipt {
    pub order_id: String,
    pub executed_quantity: f64,
    pub quote_quantity: f64,
}

pub trait ExchangePort {
    /// Free (unlocked) amount per asset.
    fn get_balances(&self) -> Result<HashMap<String, f64>, TrendwatchError>;

    /// Rounds `quantity` down to the pair's declared quantity precision.
    fn round_to_precision(&self, pair: &str, quantity: f64) -> Result<f64, TrendwatchError>;

    fn submit_market_order(
        &self,
        pair: &str,
        side: Side,
        quantity: f64,
    ) -> Result<OrderReceipt, TrendwatchError>;
}
