//! Operator-facing message formatting (Telegram Markdown).

use crate::domain::risk::OrderIntent;
use crate::domain::signal::{Direction, Side, Signal};
use crate::domain::timeframe::Interval;
use crate::domain::watchlist::base_asset;
use crate::ports::exchange_port::OrderReceipt;

pub const SEPARATOR: &str = "\n-------------------\n";

/// Escapes the characters legacy Telegram Markdown treats as entity markers.
pub fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '_' | '*' | '`' | '[') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn icon(direction: Direction) -> &'static str {
    match direction {
        Direction::Long => "🟢",
        Direction::Short => "🔴",
    }
}

pub fn format_signal(signal: &Signal) -> String {
    let mut lines = vec![
        format!(
            "{} *{} ({})* | {}",
            icon(signal.direction),
            signal.direction.side(),
            signal.kind,
            escape_markdown(base_asset(&signal.symbol))
        ),
        format!("Price: {:.2}", signal.entry_price),
    ];
    for (indicator, value) in &signal.snapshot.readings {
        lines.push(format!("{}: {:.2}", indicator, value));
    }
    lines.push(format!("ATR: {:.2}", signal.snapshot.atr));
    lines.push(format!("Stop: {:.2}", signal.stop_loss));
    lines.push(match signal.take_profit {
        Some(target) => format!("Target: {:.2}", target),
        None => "Target: open (follow the trend)".to_string(),
    });
    lines.join("\n")
}

/// One notification for all recommendations of a pass; `None` when there are none.
pub fn format_digest(interval: Interval, messages: &[String]) -> Option<String> {
    if messages.is_empty() {
        return None;
    }
    Some(format!(
        "🏆 *SIGNALS CONFIRMED ({})*\n\n{}",
        interval,
        messages.join(SEPARATOR)
    ))
}

pub fn format_fill(signal: &Signal, intent: &OrderIntent, receipt: &OrderReceipt) -> String {
    format!(
        "✅ *ORDER FILLED* | {} {}\nQuantity: {}\nNotional: {:.2}\nOrder: {}\n{}",
        intent.side,
        escape_markdown(&intent.pair),
        receipt.executed_quantity,
        receipt.quote_quantity,
        escape_markdown(&receipt.order_id),
        format_signal(signal)
    )
}

pub fn format_failure(signal: &Signal, pair: &str, side: Side, detail: &str) -> String {
    format!(
        "⚠️ *EXECUTION FAILED* | {} {}\nError: {}\n{}",
        side,
        escape_markdown(pair),
        escape_markdown(detail),
        format_signal(signal)
    )
}
