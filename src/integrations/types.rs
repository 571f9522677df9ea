// src/integrations/types.rs — Messenger adapter traits and event shapes

use std::fmt;

use async_trait::async_trait;

/// Numeric identifier of a chat user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(pub i64);

/// Chat a message is delivered to. In private chats this equals the user id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

/// Identifier of a message, inbound or outbound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageRef(pub i64);

/// Opaque handle used to acknowledge a menu selection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallbackRef(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for MessageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<UserId> for ChatId {
    fn from(user: UserId) -> Self {
        ChatId(user.0)
    }
}

/// A free-text message from a user.
#[derive(Debug, Clone)]
pub struct TextMessage {
    pub chat_id: ChatId,
    pub sender_id: UserId,
    pub text: String,
    pub message_ref: MessageRef,
    /// Seconds since the Unix epoch, as stamped by the platform.
    pub timestamp: i64,
}

/// A button press on one of our prompts.
#[derive(Debug, Clone)]
pub struct MenuSelection {
    pub sender_id: UserId,
    pub selection_key: String,
    pub attached_message_ref: MessageRef,
    pub callback_ref: CallbackRef,
}

/// Anything the platform delivers to us.
#[derive(Debug, Clone)]
pub enum InboundEvent {
    Text(TextMessage),
    Selection(MenuSelection),
}

impl InboundEvent {
    pub fn sender(&self) -> UserId {
        match self {
            InboundEvent::Text(m) => m.sender_id,
            InboundEvent::Selection(s) => s.sender_id,
        }
    }
}

/// One button on an inline menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuButton {
    pub label: String,
    pub key: String,
}

/// Inline menu, laid out as rows of buttons.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Menu {
    pub rows: Vec<Vec<MenuButton>>,
}

impl Menu {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: append a row of `(label, key)` buttons.
    pub fn row(mut self, buttons: &[(&str, &str)]) -> Self {
        self.rows.push(
            buttons
                .iter()
                .map(|(label, key)| MenuButton {
                    label: (*label).to_string(),
                    key: (*key).to_string(),
                })
                .collect(),
        );
        self
    }

    /// All selection keys, row by row.
    pub fn keys(&self) -> Vec<&str> {
        self.rows
            .iter()
            .flatten()
            .map(|b| b.key.as_str())
            .collect()
    }
}

/// A bot command shown in the client's command list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotCommand {
    pub command: String,
    pub description: String,
}

/// Outbound side of a chat platform.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Send plain text, optionally as a reply and with an inline menu.
    /// Returns the id of the sent message.
    async fn send_text(
        &self,
        chat: ChatId,
        text: &str,
        reply_to: Option<MessageRef>,
        menu: Option<&Menu>,
    ) -> anyhow::Result<MessageRef>;

    /// Acknowledge a menu selection so the client stops spinning.
    async fn answer_callback(&self, callback: &CallbackRef) -> anyhow::Result<()>;

    /// Register the command list for one chat. Optional for adapters.
    async fn set_commands(&self, _chat: ChatId, _commands: &[BotCommand]) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Inbound side of a chat platform.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Wait for the next batch of events. An empty batch is fine.
    async fn next_events(&self) -> anyhow::Result<Vec<InboundEvent>>;

    /// Confirm everything returned so far, so it is not delivered again
    /// after a restart. Called once before shutdown.
    async fn acknowledge(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
