// src/integrations/telegram.rs — Telegram adapter (Bot API)
//
// Uses the Telegram Bot API (https://core.telegram.org/bots/api).
// Inbound events come from getUpdates long polling.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::integrations::types::{
    BotCommand, CallbackRef, ChatId, EventSource, InboundEvent, Menu, MenuSelection, MessageRef,
    Messenger, TextMessage, UserId,
};
use crate::util::split_chars;

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Longest text a single sendMessage accepts.
pub const MAX_MESSAGE_CHARS: usize = 4096;

/// Telegram integration adapter.
pub struct TelegramAdapter {
    client: Client,
    api_base: String,
    bot_token: String,
    poll_timeout_secs: u64,
    /// Next update id to ask for.
    offset: AtomicI64,
}

impl TelegramAdapter {
    pub fn new(bot_token: String, poll_timeout_secs: u64) -> anyhow::Result<Self> {
        Self::with_base(TELEGRAM_API_BASE, bot_token, poll_timeout_secs)
    }

    /// Point the adapter at a different Bot API server (self-hosted or test).
    pub fn with_base(
        api_base: &str,
        bot_token: String,
        poll_timeout_secs: u64,
    ) -> anyhow::Result<Self> {
        // The HTTP timeout has to outlast the long poll.
        let client = Client::builder()
            .timeout(Duration::from_secs(poll_timeout_secs + 10))
            .build()?;
        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            bot_token,
            poll_timeout_secs,
            offset: AtomicI64::new(0),
        })
    }

    fn api_url(&self, method: &str) -> String {
        format!("{}/bot{}/{method}", self.api_base, self.bot_token)
    }

    async fn call<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        body: &serde_json::Value,
    ) -> anyhow::Result<T> {
        let resp: TelegramResponse<T> = self
            .client
            .post(self.api_url(method))
            .json(body)
            .send()
            .await?
            .json()
            .await?;

        if !resp.ok {
            anyhow::bail!(
                "Telegram {method} failed: {}",
                resp.description.unwrap_or_else(|| "unknown".into())
            );
        }

        resp.result
            .ok_or_else(|| anyhow::anyhow!("Telegram {method} returned no result"))
    }

    /// Validate the bot token by calling getMe.
    pub async fn validate(&self) -> anyhow::Result<String> {
        #[derive(Deserialize)]
        struct BotUser {
            username: Option<String>,
            first_name: Option<String>,
        }

        let bot: BotUser = self.call("getMe", &serde_json::json!({})).await?;
        Ok(format!(
            "Authenticated as @{}",
            bot.username
                .unwrap_or_else(|| bot.first_name.unwrap_or_default())
        ))
    }
}

// -- Telegram API response types --

#[derive(Deserialize)]
struct TelegramResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Deserialize)]
struct TgMessage {
    message_id: i64,
    chat: TgChat,
    from: Option<TgUser>,
    text: Option<String>,
    date: i64,
}

#[derive(Deserialize)]
struct TgChat {
    id: i64,
}

#[derive(Deserialize)]
struct TgUser {
    id: i64,
}

#[derive(Deserialize)]
struct TgCallbackQuery {
    id: String,
    from: TgUser,
    message: Option<TgMessage>,
    data: Option<String>,
}

#[derive(Deserialize)]
struct TgUpdate {
    update_id: i64,
    message: Option<TgMessage>,
    callback_query: Option<TgCallbackQuery>,
}

#[derive(Deserialize)]
struct SendMessageResp {
    message_id: i64,
}

/// Map a raw update to an inbound event. Updates we don't handle
/// (edits, stickers, callbacks without data) map to `None`.
fn to_event(update: TgUpdate) -> Option<InboundEvent> {
    if let Some(m) = update.message {
        let text = m.text?;
        let sender = m.from.map(|u| u.id).unwrap_or(m.chat.id);
        return Some(InboundEvent::Text(TextMessage {
            chat_id: ChatId(m.chat.id),
            sender_id: UserId(sender),
            text,
            message_ref: MessageRef(m.message_id),
            timestamp: m.date,
        }));
    }

    let q = update.callback_query?;
    // Inaccessible messages still carry their id.
    let attached = q.message.as_ref()?.message_id;
    Some(InboundEvent::Selection(MenuSelection {
        sender_id: UserId(q.from.id),
        selection_key: q.data?,
        attached_message_ref: MessageRef(attached),
        callback_ref: CallbackRef(q.id),
    }))
}

fn menu_markup(menu: &Menu) -> serde_json::Value {
    let rows: Vec<Vec<serde_json::Value>> = menu
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|b| serde_json::json!({ "text": b.label, "callback_data": b.key }))
                .collect()
        })
        .collect();
    serde_json::json!({ "inline_keyboard": rows })
}

// -- Messenger implementation --

#[async_trait]
impl Messenger for TelegramAdapter {
    async fn send_text(
        &self,
        chat: ChatId,
        text: &str,
        reply_to: Option<MessageRef>,
        menu: Option<&Menu>,
    ) -> anyhow::Result<MessageRef> {
        let chunks = split_chars(text, MAX_MESSAGE_CHARS);
        if chunks.is_empty() {
            anyhow::bail!("Refusing to send an empty message");
        }

        let last = chunks.len() - 1;
        let mut sent = MessageRef(0);
        for (i, chunk) in chunks.into_iter().enumerate() {
            let mut body = serde_json::json!({
                "chat_id": chat.0,
                "text": chunk,
            });
            if let Some(r) = reply_to {
                body["reply_parameters"] = serde_json::json!({
                    "message_id": r.0,
                    "chat_id": chat.0,
                    "allow_sending_without_reply": true,
                });
            }
            // The menu goes on the last chunk so its id is the prompt id.
            if let (Some(m), true) = (menu, i == last) {
                body["reply_markup"] = menu_markup(m);
            }

            let resp: SendMessageResp = self.call("sendMessage", &body).await?;
            sent = MessageRef(resp.message_id);
        }

        Ok(sent)
    }

    async fn answer_callback(&self, callback: &CallbackRef) -> anyhow::Result<()> {
        let body = serde_json::json!({ "callback_query_id": callback.0 });
        let _: bool = self.call("answerCallbackQuery", &body).await?;
        Ok(())
    }

    async fn set_commands(&self, chat: ChatId, commands: &[BotCommand]) -> anyhow::Result<()> {
        let commands: Vec<serde_json::Value> = commands
            .iter()
            .map(|c| serde_json::json!({ "command": c.command, "description": c.description }))
            .collect();
        let body = serde_json::json!({
            "commands": commands,
            "scope": { "type": "chat", "chat_id": chat.0 },
        });
        let _: bool = self.call("setMyCommands", &body).await?;
        Ok(())
    }
}

// -- EventSource implementation --

#[async_trait]
impl EventSource for TelegramAdapter {
    async fn next_events(&self) -> anyhow::Result<Vec<InboundEvent>> {
        let body = serde_json::json!({
            "offset": self.offset.load(Ordering::SeqCst),
            "timeout": self.poll_timeout_secs,
            "allowed_updates": ["message", "callback_query"],
        });

        let updates: Vec<TgUpdate> = self.call("getUpdates", &body).await?;

        if let Some(max) = updates.iter().map(|u| u.update_id).max() {
            self.offset.fetch_max(max + 1, Ordering::SeqCst);
        }

        Ok(updates.into_iter().filter_map(to_event).collect())
    }

    async fn acknowledge(&self) -> anyhow::Result<()> {
        // getUpdates with an offset confirms every earlier update. Whatever
        // it returns stays unconfirmed and comes back on the next start.
        let body = serde_json::json!({
            "offset": self.offset.load(Ordering::SeqCst),
            "timeout": 0,
            "limit": 1,
        });
        let _: Vec<serde_json::Value> = self.call("getUpdates", &body).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrations::types::Menu;

    fn parse(json: &str) -> Option<InboundEvent> {
        let update: TgUpdate = serde_json::from_str(json).unwrap();
        to_event(update)
    }

    #[test]
    fn test_text_message_update() {
        let ev = parse(
            r#"{"update_id": 10, "message": {"message_id": 5, "date": 1767225600,
                "chat": {"id": 111, "type": "private"},
                "from": {"id": 111, "is_bot": false, "first_name": "A"},
                "text": "dear diary"}}"#,
        );
        match ev {
            Some(InboundEvent::Text(m)) => {
                assert_eq!(m.chat_id, ChatId(111));
                assert_eq!(m.sender_id, UserId(111));
                assert_eq!(m.message_ref, MessageRef(5));
                assert_eq!(m.timestamp, 1_767_225_600);
                assert_eq!(m.text, "dear diary");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_non_text_message_ignored() {
        let ev = parse(
            r#"{"update_id": 11, "message": {"message_id": 6, "date": 1,
                "chat": {"id": 111}, "from": {"id": 111}}}"#,
        );
        assert!(ev.is_none());
    }

    #[test]
    fn test_callback_update() {
        let ev = parse(
            r#"{"update_id": 12, "callback_query": {"id": "cb-1",
                "from": {"id": 222},
                "message": {"message_id": 40, "date": 1, "chat": {"id": 222}},
                "data": "file_read"}}"#,
        );
        match ev {
            Some(InboundEvent::Selection(s)) => {
                assert_eq!(s.sender_id, UserId(222));
                assert_eq!(s.selection_key, "file_read");
                assert_eq!(s.attached_message_ref, MessageRef(40));
                assert_eq!(s.callback_ref, CallbackRef("cb-1".into()));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_callback_without_data_ignored() {
        let ev = parse(
            r#"{"update_id": 13, "callback_query": {"id": "cb-2",
                "from": {"id": 222},
                "message": {"message_id": 40, "date": 1, "chat": {"id": 222}}}}"#,
        );
        assert!(ev.is_none());
    }

    #[test]
    fn test_menu_markup_shape() {
        let menu = Menu::new()
            .row(&[("replace", "file_replace"), ("append", "file_append")])
            .row(&[("cancel", "file_cancel")]);
        let v = menu_markup(&menu);
        let rows = v["inline_keyboard"].as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][1]["callback_data"], "file_append");
        assert_eq!(rows[1][0]["text"], "cancel");
    }

    #[test]
    fn test_api_url_trims_base() {
        let adapter = TelegramAdapter::with_base("http://localhost:8081/", "T0K".into(), 5).unwrap();
        assert_eq!(adapter.api_url("getMe"), "http://localhost:8081/botT0K/getMe");
    }

    #[test]
    fn test_error_response_parses() {
        let resp: TelegramResponse<SendMessageResp> =
            serde_json::from_str(r#"{"ok": false, "description": "Bad Request: chat not found"}"#)
                .unwrap();
        assert!(!resp.ok);
        assert!(resp.result.is_none());
        assert_eq!(resp.description.as_deref(), Some("Bad Request: chat not found"));
    }
}
