//! Notifier used when no Telegram credentials are configured.

use crate::domain::error::TrendwatchError;
use crate::ports::notify_port::NotifyPort;

pub struct LogNotifier;

impl NotifyPort for LogNotifier {
    fn notify(&self, text: &str) -> Result<(), TrendwatchError> {
        log::info!("notification:\n{}", text);
        Ok(())
    }
}
