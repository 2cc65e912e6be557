//! Telegram Bot API notifier
//!
//! Sends alerts through `sendMessage` with legacy Markdown parsing. When no
//! credentials are configured, alerts are written to the log instead.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::config::loader::TelegramSection;
use crate::ports::{Notifier, NotifyError};

#[derive(Debug, Clone)]
pub struct TelegramNotifier {
    http: Client,
    api_url: String,
    bot_token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(
        api_url: impl Into<String>,
        bot_token: impl Into<String>,
        chat_id: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, NotifyError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NotifyError::Http(e.to_string()))?;

        Ok(Self {
            http,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
        })
    }

    fn send_message_url(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_url, self.bot_token)
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    fn name(&self) -> &'static str {
        "telegram"
    }

    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        let form = [
            ("chat_id", self.chat_id.as_str()),
            ("text", text),
            ("parse_mode", "Markdown"),
        ];

        let response = self
            .http
            .post(self.send_message_url())
            .form(&form)
            .send()
            .await
            // reqwest errors embed the URL, which carries the bot token
            .map_err(|e| NotifyError::Http(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}

/// Fallback notifier: writes alerts to the log
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        tracing::info!(target: "alert", "{}", text);
        Ok(())
    }
}

/// Either a Telegram notifier or the log fallback, chosen from config
#[derive(Debug, Clone)]
pub enum AlertNotifier {
    Telegram(TelegramNotifier),
    Log(LogNotifier),
}

impl AlertNotifier {
    pub fn from_config(section: &TelegramSection) -> Result<Self, NotifyError> {
        match section.credentials() {
            Some((token, chat_id)) => Ok(AlertNotifier::Telegram(TelegramNotifier::new(
                section.api_url.clone(),
                token,
                chat_id,
                Duration::from_secs(section.timeout_secs),
            )?)),
            None => {
                tracing::warn!(
                    "TELEGRAM_BOT_TOKEN / TELEGRAM_CHAT_ID not set - alerts go to the log only"
                );
                Ok(AlertNotifier::Log(LogNotifier))
            }
        }
    }
}

#[async_trait]
impl Notifier for AlertNotifier {
    fn name(&self) -> &'static str {
        match self {
            AlertNotifier::Telegram(n) => n.name(),
            AlertNotifier::Log(n) => n.name(),
        }
    }

    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        match self {
            AlertNotifier::Telegram(n) => n.send(text).await,
            AlertNotifier::Log(n) => n.send(text).await,
        }
    }
}
