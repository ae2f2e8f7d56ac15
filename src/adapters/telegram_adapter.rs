//! Telegram Bot API notifier.

use crate::domain::error::TrendwatchError;
use crate::ports::notify_port::NotifyPort;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const API_URL: &str = "https://api.telegram.org";

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    description: Option<String>,
}

pub struct TelegramNotifier {
    client: reqwest::blocking::Client,
    endpoint: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(token: &str, chat_id: &str, timeout: Duration) -> Result<Self, TrendwatchError> {
        Self::with_api_url(API_URL, token, chat_id, timeout)
    }

    pub fn with_api_url(
        api_url: &str,
        token: &str,
        chat_id: &str,
        timeout: Duration,
    ) -> Result<Self, TrendwatchError> {
        let client = reqwest::blocking::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/bot{}/sendMessage", api_url.trim_end_matches('/'), token),
            chat_id: chat_id.to_string(),
        })
    }
}

impl NotifyPort for TelegramNotifier {
    fn notify(&self, text: &str) -> Result<(), TrendwatchError> {
        let body = SendMessage {
            chat_id: &self.chat_id,
            text,
            parse_mode: "Markdown",
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .map_err(|e| TrendwatchError::Notify {
                reason: e.without_url().to_string(),
            })?;

        let status = response.status();
        let reply: Option<ApiResponse> = response.json().ok();
        match reply {
            Some(ApiResponse { ok: true, .. }) => Ok(()),
            Some(ApiResponse { description, .. }) => Err(TrendwatchError::Notify {
                reason: description.unwrap_or_else(|| format!("HTTP {}", status)),
            }),
            None => Err(TrendwatchError::Notify {
                reason: format!("HTTP {}", status),
            }),
        }
    }
}
