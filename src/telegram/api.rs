//! Thin HTTP wrapper around `https://api.telegram.org/bot<token>`.

use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use super::types::{InlineKeyboardMarkup, Update, User};

/// Telegram rejects messages above 4096 chars; leave headroom for markup.
pub const MESSAGE_CHUNK_LIMIT: usize = 4000;

/// Bot API response envelope; `result` is absent when `ok` is false.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
struct ApiEnvelope<T> {
    ok: bool,
    #[serde(default)]
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
}

/// Shared-state client for the Bot API. Cheap to clone.
#[derive(Clone)]
pub struct BotApi {
    http: reqwest::Client,
    base_url: String,
}

impl BotApi {
    pub fn new(http: reqwest::Client, token: &str) -> Self {
        Self {
            http,
            base_url: format!("https://api.telegram.org/bot{token}"),
        }
    }

    /// Overrides the API host, for tests and self-hosted bot API servers.
    pub fn with_base_url(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, body: serde_json::Value) -> Result<T> {
        let envelope: ApiEnvelope<T> = self
            .http
            .post(format!("{}/{}", self.base_url, method))
            .json(&body)
            .send()
            .await
            .with_context(|| format!("Telegram {method} request failed"))?
            .json()
            .await
            .with_context(|| format!("Failed to parse Telegram {method} response"))?;
        if !envelope.ok {
            bail!(
                "Telegram {method} returned an error: {}",
                envelope.description.unwrap_or_else(|| "unknown".into())
            );
        }
        envelope
            .result
            .with_context(|| format!("Telegram {method} response carried no result"))
    }

    /// Verifies the token and returns the bot's own account.
    pub async fn get_me(&self) -> Result<User> {
        self.call("getMe", json!({})).await
    }

    /// Drops any configured webhook so long polling receives updates.
    pub async fn delete_webhook(&self) -> Result<bool> {
        self.call("deleteWebhook", json!({})).await
    }

    /// Long-polls for updates past `offset`.
    pub async fn get_updates(&self, offset: i64, timeout_secs: u64) -> Result<Vec<Update>> {
        self.call(
            "getUpdates",
            json!({
                "offset": offset,
                "timeout": timeout_secs,
                "allowed_updates": ["message", "callback_query"],
            }),
        )
        .await
    }

    /// Sends one text message, splitting at the chunk limit when needed.
    /// The keyboard, if any, is attached to the final chunk.
    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<&InlineKeyboardMarkup>,
    ) -> Result<()> {
        let chunks = split_message(text, MESSAGE_CHUNK_LIMIT);
        let last = chunks.len().saturating_sub(1);
        for (index, chunk) in chunks.iter().enumerate() {
            let mut body = json!({
                "chat_id": chat_id,
                "text": chunk,
            });
            if index == last {
                if let Some(markup) = keyboard {
                    body["reply_markup"] = serde_json::to_value(markup)?;
                }
            }
            let _message: serde_json::Value = self.call("sendMessage", body).await?;
        }
        Ok(())
    }

    /// Acknowledges a callback query, optionally flashing a toast.
    pub async fn answer_callback_query(&self, query_id: &str, text: Option<&str>) -> Result<()> {
        let mut body = json!({ "callback_query_id": query_id });
        if let Some(text) = text {
            body["text"] = json!(text);
        }
        let _ok: bool = self.call("answerCallbackQuery", body).await?;
        Ok(())
    }
}

/// Splits `text` into chunks no longer than `limit`, preferring newline
/// boundaries so rendered plan sections stay intact.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    if text.chars().count() <= limit {
        return vec![text.to_string()];
    }
    let mut chunks = Vec::new();
    let mut current = String::new();
    for line in text.split_inclusive('\n') {
        if current.chars().count() + line.chars().count() > limit && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
        }
        // A single oversized line is hard-wrapped.
        if line.chars().count() > limit {
            let mut buf = String::new();
            for ch in line.chars() {
                buf.push(ch);
                if buf.chars().count() == limit {
                    chunks.push(std::mem::take(&mut buf));
                }
            }
            current = buf;
        } else {
            current.push_str(line);
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
