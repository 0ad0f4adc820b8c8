//! Outbound chat notifications
//!
//! The poll loop only sees the [`Notifier`] trait. [`TelegramNotifier`] is the
//! production implementation on top of the Bot API `sendMessage` method.
//! Sending is attempted once; retrying is left to the caller.

use crate::config::TelegramConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

/// Something that can deliver a text message to a chat
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver `text` to `chat_id`
    ///
    /// # Errors
    ///
    /// Returns [`Error::Delivery`] for any provider or transport failure.
    async fn send(&self, chat_id: &str, text: &str) -> Result<()>;
}

#[derive(Debug, Deserialize)]
struct TelegramReply {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Telegram Bot API notifier
pub struct TelegramNotifier {
    client: reqwest::Client,
    send_url: String,
}

impl TelegramNotifier {
    /// Build a notifier for the bot identified by `token`
    pub fn new(config: &TelegramConfig, token: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Delivery(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            send_url: format!(
                "{}/bot{}/sendMessage",
                config.api_url.trim_end_matches('/'),
                token
            ),
        })
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, chat_id: &str, text: &str) -> Result<()> {
        let body = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
        });

        // The request URL embeds the bot token; strip it from error messages.
        let response = self
            .client
            .post(&self.send_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Delivery(format!("sendMessage failed: {}", e.without_url())))?;

        let status = response.status();
        let reply: Option<TelegramReply> = response.json().await.ok();

        match reply {
            Some(TelegramReply { ok: true, .. }) if status.is_success() => {
                debug!(chat_id, "message delivered");
                Ok(())
            }
            Some(TelegramReply { description, .. }) => Err(Error::Delivery(format!(
                "Telegram returned HTTP {}: {}",
                status.as_u16(),
                description.unwrap_or_else(|| "no description".to_string())
            ))),
            None => Err(Error::Delivery(format!(
                "Telegram returned HTTP {} with an unreadable body",
                status.as_u16()
            ))),
        }
    }
}
