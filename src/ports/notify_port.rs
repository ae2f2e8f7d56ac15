//! Outbound notification port trait.

use crate::domain::error::TrendwatchError;

pub trait NotifyPort {
    fn notify(&self, text: &str) -> Result<(), TrendwatchError>;
}

/// Sends `text` and swallows any delivery failure after logging it.
pub fn notify_best_effort(port: &dyn NotifyPort, text: &str) -> bool {
    match port.notify(text) {
        Ok(()) => true,
        Err(e) => {
            log::warn!("notification not delivered: {e}");
            false
        }
    }
}
