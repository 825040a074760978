use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use crate::TELEGRAM_API_BASE;

/// Telegram's hard limit is 4096 chars; chunk below it.
pub const MAX_MESSAGE_CHARS: usize = 4000;
/// Pause between chunks of one long message.
const CHUNK_PACING: Duration = Duration::from_millis(500);
/// Long-poll window for getUpdates.
const LONG_POLL_SECS: u64 = 30;

/// Minimal Telegram Bot API client over plain HTTP.
///
/// Carries its own `reqwest::Client` with a timeout above the long-poll
/// window, so getUpdates calls are not cut off mid-poll.
#[derive(Clone)]
pub struct TelegramClient {
    http: reqwest::Client,
    base: String,
    channel: String,
}

#[derive(Debug, Deserialize)]
struct UpdatesResponse {
    ok: bool,
    #[serde(default)]
    result: Vec<Update>,
}

/// One incoming update from getUpdates.
#[derive(Debug, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub text: Option<String>,
    pub chat: Chat,
}

#[derive(Debug, Deserialize)]
pub struct Chat {
    pub id: i64,
}

impl TelegramClient {
    pub fn new(token: &str, channel: String) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(LONG_POLL_SECS + 10))
            .build()
            .context("failed to build Telegram HTTP client")?;
        Ok(Self {
            http,
            base: format!("{TELEGRAM_API_BASE}/bot{token}"),
            channel,
        })
    }

    /// Deliver a message to the configured channel, split into chunks with a
    /// pacing pause between them. Delivery failures are logged, not retried.
    pub async fn notify(&self, text: &str) {
        let chunks = split_chunks(text, MAX_MESSAGE_CHARS);
        let last = chunks.len().saturating_sub(1);
        for (i, chunk) in chunks.iter().enumerate() {
            if let Err(e) = self.send(&self.channel, chunk).await {
                warn!("Telegram delivery failed: {e}");
            }
            if i < last {
                tokio::time::sleep(CHUNK_PACING).await;
            }
        }
    }

    /// Reply to a specific chat (command responses).
    pub async fn reply(&self, chat_id: i64, text: &str) {
        if let Err(e) = self.send(&chat_id.to_string(), text).await {
            warn!("Telegram reply to {chat_id} failed: {e}");
        }
    }

    async fn send(&self, chat: &str, text: &str) -> Result<()> {
        let resp = self
            .http
            .post(format!("{}/sendMessage", self.base))
            .json(&json!({ "chat_id": chat, "text": text }))
            .send()
            .await?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("sendMessage returned {status}: {body}");
        }
        Ok(())
    }

    /// Long-poll for updates past `offset`.
    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>> {
        let resp = self
            .http
            .get(format!("{}/getUpdates", self.base))
            .query(&[
                ("offset", offset.to_string()),
                ("timeout", LONG_POLL_SECS.to_string()),
            ])
            .send()
            .await?;
        if !resp.status().is_success() {
            anyhow::bail!("getUpdates returned {}", resp.status());
        }
        let parsed: UpdatesResponse = resp.json().await?;
        if !parsed.ok {
            anyhow::bail!("getUpdates response not ok");
        }
        Ok(parsed.result)
    }
}

/// Split on char boundaries into chunks of at most `max` chars.
pub fn split_chunks(text: &str, max: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max {
        return vec![text.to_string()];
    }
    chars.chunks(max).map(|c| c.iter().collect()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn short_text_is_one_chunk() {
        assert_eq!(split_chunks("hello", 4000), vec!["hello"]);
    }

    #[test]
    fn exact_boundary_is_one_chunk() {
        let text = "a".repeat(4000);
        assert_eq!(split_chunks(&text, 4000), vec![text]);
    }

    #[test]
    fn one_past_boundary_splits() {
        let text = "a".repeat(4001);
        let chunks = split_chunks(&text, 4000);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].chars().count(), 4000);
        assert_eq!(chunks[1], "a");
    }

    #[test]
    fn chunks_reassemble_to_original() {
        let text: String = ('a'..='z').cycle().take(9500).collect();
        let chunks = split_chunks(&text, 4000);
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn chunking_counts_chars_not_bytes() {
        let text = "é".repeat(4500);
        let chunks = split_chunks(&text, 4000);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].chars().count(), 4000);
        assert_eq!(chunks[1].chars().count(), 500);
    }

    #[test]
    fn updates_response_parses() {
        let parsed: UpdatesResponse = serde_json::from_value(json!({
            "ok": true,
            "result": [{
                "update_id": 42,
                "message": {
                    "message_id": 7,
                    "text": "/list",
                    "chat": {"id": -100123, "type": "supergroup"}
                }
            }]
        }))
        .unwrap();
        assert!(parsed.ok);
        assert_eq!(parsed.result.len(), 1);
        let update = &parsed.result[0];
        assert_eq!(update.update_id, 42);
        let message = update.message.as_ref().unwrap();
        assert_eq!(message.text.as_deref(), Some("/list"));
        assert_eq!(message.chat.id, -100123);
    }

    #[test]
    fn updates_without_message_parse() {
        let parsed: UpdatesResponse = serde_json::from_value(json!({
            "ok": true,
            "result": [{"update_id": 1, "edited_message": {}}]
        }))
        .unwrap();
        assert!(parsed.result[0].message.is_none());
    }
}
