//! Execution gate: turns a signal into a recommendation or a live market order.
//!
//! Live mode reads balances fresh for every signal, sizes through the risk
//! sizer, submits a market order and reports the outcome. Exchange failures
//! are caught and reported; they never propagate to the scan.

use crate::domain::message::{format_failure, format_fill, format_signal};
use crate::domain::risk::{size_order, BalanceSnapshot, OrderIntent, RiskParams, SizingDecision};
use crate::domain::signal::{Side, Signal};
use crate::domain::watchlist::{base_asset, exchange_pair};
use crate::ports::exchange_port::{ExchangePort, OrderReceipt};
use crate::ports::notify_port::{notify_best_effort, NotifyPort};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    NotifyOnly,
    Live,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionOutcome {
    /// Notify-only: the formatted recommendation, delivered by the caller.
    Recommended { message: String },
    Filled {
        intent: OrderIntent,
        receipt: OrderReceipt,
    },
    SizingRejected {
        pair: String,
        side: Side,
        notional: f64,
        minimum: f64,
    },
    Failed { pair: String, detail: String },
}

pub struct ExecutionGate<'a> {
    exchange: Option<&'a dyn ExchangePort>,
    notifier: &'a dyn NotifyPort,
    risk: &'a RiskParams,
    quote_asset: &'a str,
}

impl<'a> ExecutionGate<'a> {
    pub fn notify_only(notifier: &'a dyn NotifyPort, risk: &'a RiskParams, quote_asset: &'a str) -> Self {
        Self {
            exchange: None,
            notifier,
            risk,
            quote_asset,
        }
    }

    pub fn live(
        exchange: &'a dyn ExchangePort,
        notifier: &'a dyn NotifyPort,
        risk: &'a RiskParams,
        quote_asset: &'a str,
    ) -> Self {
        Self {
            exchange: Some(exchange),
            notifier,
            risk,
            quote_asset,
        }
    }

    pub fn mode(&self) -> ExecutionMode {
        match self.exchange {
            Some(_) => ExecutionMode::Live,
            None => ExecutionMode::NotifyOnly,
        }
    }

    pub fn execute(&self, signal: &Signal) -> ExecutionOutcome {
        match self.exchange {
            None => ExecutionOutcome::Recommended {
                message: format_signal(signal),
            },
            Some(exchange) => self.execute_live(exchange, signal),
        }
    }

    fn execute_live(&self, exchange: &dyn ExchangePort, signal: &Signal) -> ExecutionOutcome {
        let pair = exchange_pair(&signal.symbol, self.quote_asset);
        let side = signal.direction.side();

        let balances = match exchange.get_balances() {
            Ok(b) => b,
            Err(e) => return self.failed(signal, pair, side, e.to_string()),
        };
        let balance = BalanceSnapshot {
            free_quote: balances.get(self.quote_asset).copied().unwrap_or(0.0),
            free_base: balances.get(base_asset(&signal.symbol)).copied().unwrap_or(0.0),
        };
        log::debug!(
            "{}: free {} {:.8}, free {} {:.8}",
            pair,
            self.quote_asset,
            balance.free_quote,
            base_asset(&signal.symbol),
            balance.free_base
        );

        let decision = size_order(&pair, side, signal.entry_price, balance, self.risk, |q| {
            exchange.round_to_precision(&pair, q)
        });

        let intent = match decision {
            Ok(SizingDecision::Order(intent)) => intent,
            Ok(SizingDecision::Rejected { notional, minimum }) => {
                log::info!(
                    "{} {}: notional {:.2} below minimum {:.2}, no order",
                    side,
                    pair,
                    notional,
                    minimum
                );
                return ExecutionOutcome::SizingRejected {
                    pair,
                    side,
                    notional,
                    minimum,
                };
            }
            Err(e) => return self.failed(signal, pair, side, e.to_string()),
        };

        match exchange.submit_market_order(&intent.pair, intent.side, intent.quantity) {
            Ok(receipt) => {
                log::info!(
                    "{} {} {} filled (order {})",
                    intent.side,
                    receipt.executed_quantity,
                    intent.pair,
                    receipt.order_id
                );
                notify_best_effort(self.notifier, &format_fill(signal, &intent, &receipt));
                ExecutionOutcome::Filled { intent, receipt }
            }
            Err(e) => self.failed(signal, intent.pair, intent.side, e.to_string()),
        }
    }

    fn failed(&self, signal: &Signal, pair: String, side: Side, detail: String) -> ExecutionOutcome {
        log::error!("{} {} failed: {}", side, pair, detail);
        notify_best_effort(self.notifier, &format_failure(signal, &pair, side, &detail));
        ExecutionOutcome::Failed { pair, detail }
    }
}
