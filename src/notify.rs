//! Notifier capability: Telegram Bot API delivery.

use crate::error::WatchError;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Delivers a text message to the configured destination. Best effort:
/// the watcher logs a failed send but never retries it within a cycle.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, text: &str) -> Result<(), WatchError>;
}

/// Sends messages to a fixed chat via the Telegram Bot API.
pub struct TelegramNotifier {
    bot_token: String,
    chat_id: String,
    api_base: String,
    client: Client,
}

impl TelegramNotifier {
    pub fn new(bot_token: &str, chat_id: &str) -> Self {
        Self::with_api_base(bot_token, chat_id, TELEGRAM_API_BASE)
    }

    /// Constructor with an overridable API base, for tests against a mock
    /// server.
    pub fn with_api_base(bot_token: &str, chat_id: &str, api_base: &str) -> Self {
        Self {
            bot_token: bot_token.to_string(),
            chat_id: chat_id.to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
            client: Client::builder()
                .timeout(Duration::from_secs(30))
                .connect_timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }

    fn api_url(&self, method: &str) -> String {
        format!("{}/bot{}/{method}", self.api_base, self.bot_token)
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) -> Result<(), WatchError> {
        let body = serde_json::json!({
            "chat_id": self.chat_id,
            "text": text,
        });

        let resp = self
            .client
            .post(self.api_url("sendMessage"))
            .json(&body)
            .send()
            .await
            .map_err(|e| WatchError::Notify(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let err = resp
                .text()
                .await
                .unwrap_or_else(|e| format!("<failed to read response body: {e}>"));
            return Err(WatchError::Notify(format!(
                "Telegram sendMessage failed ({status}): {err}"
            )));
        }

        tracing::info!("notification delivered: {text}");
        Ok(())
    }
}
