// src/conversation/controller.rs — Per-user journal conversation
//
// Idle ──text, day exists──▶ AwaitingDisposition ──selection──▶ Idle
// Idle ──text, new day────▶ (written) Idle
//
// The controller keeps no session state of its own; every decision is
// made against the SessionTable.

use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::conversation::command::{self, Command};
use crate::conversation::menu::{self, Selection};
use crate::conversation::session::{Session, SessionTable, Stage};
use crate::infra::config::Settings;
use crate::infra::errors::{DaybookError, StaleReason};
use crate::infra::shutdown::Shutdown;
use crate::integrations::types::{
    ChatId, InboundEvent, Menu, MenuSelection, MessageRef, Messenger, TextMessage, UserId,
};
use crate::journal::{JournalPaths, JournalStore};
use crate::util::truncate_str;

/// Blank line between entries of the same day.
pub const ENTRY_SEPARATOR: &str = "\n\n";

/// How an inbound event was resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Sender not on the allow-list.
    Ignored,
    Command(Command),
    /// Text went straight into the day's file.
    Written,
    /// A prompt was sent and a session now waits on it.
    Prompted(MessageRef),
    Stale(StaleReason),
    Cancelled,
    Read,
    Replaced,
    Appended,
    /// Store or messenger failure; the session, if any, is kept.
    Failed,
}

/// Behaviour switches taken from the settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct Policy {
    pub clear_after_read: bool,
    pub confirm_new_entries: bool,
}

pub struct Controller {
    allowed: HashSet<UserId>,
    paths: JournalPaths,
    policy: Policy,
    sessions: SessionTable,
    store: Arc<dyn JournalStore>,
    messenger: Arc<dyn Messenger>,
    shutdown: Shutdown,
    events: AtomicU64,
}

impl Controller {
    pub fn new(
        settings: &Settings,
        store: Arc<dyn JournalStore>,
        messenger: Arc<dyn Messenger>,
        shutdown: Shutdown,
    ) -> Self {
        Self {
            allowed: settings.allowed_users(),
            paths: JournalPaths::from_settings(settings),
            policy: Policy {
                clear_after_read: settings.clear_after_read,
                confirm_new_entries: settings.confirm_new_entries,
            },
            sessions: SessionTable::new(),
            store,
            messenger,
            shutdown,
            events: AtomicU64::new(0),
        }
    }

    pub fn sessions(&self) -> &SessionTable {
        &self.sessions
    }

    /// Inbound events seen since start, authorized or not.
    pub fn events_seen(&self) -> u64 {
        self.events.load(Ordering::SeqCst)
    }

    pub async fn handle(&self, event: &InboundEvent) -> Outcome {
        match event {
            InboundEvent::Text(msg) => self.on_text(msg).await,
            InboundEvent::Selection(sel) => self.on_menu_selection(sel).await,
        }
    }

    fn authorize(&self, user: UserId) -> Result<(), DaybookError> {
        self.events.fetch_add(1, Ordering::SeqCst);
        if self.allowed.contains(&user) {
            Ok(())
        } else {
            Err(DaybookError::Unauthorized { user })
        }
    }

    // ── Free text ──────────────────────────────────────────────────────

    pub async fn on_text(&self, msg: &TextMessage) -> Outcome {
        if let Err(e) = self.authorize(msg.sender_id) {
            tracing::debug!("Dropping message: {e}");
            return Outcome::Ignored;
        }

        if let Some(cmd) = command::parse_command(&msg.text) {
            self.on_command(cmd, msg.chat_id).await;
            return Outcome::Command(cmd);
        }

        match self.new_entry(msg).await {
            Ok(outcome) => outcome,
            Err(e) => self.report(msg.chat_id, Some(msg.message_ref), e).await,
        }
    }

    async fn on_command(&self, cmd: Command, chat: ChatId) {
        match cmd {
            Command::Help => {
                self.notify(chat, command::help_text(), None).await;
            }
            Command::Status => {
                self.notify(chat, &command::status_text(self.events_seen()), None)
                    .await;
            }
            Command::Stop => {
                tracing::info!("Stop requested from chat {chat}");
                self.notify(chat, "Stopping bot...", None).await;
                self.shutdown.request();
            }
        }
    }

    async fn new_entry(&self, msg: &TextMessage) -> Result<Outcome, DaybookError> {
        let user = msg.sender_id;
        let path = self.paths.for_timestamp(msg.timestamp);
        tracing::info!(
            "Entry from {user} for {}: {}",
            path.display(),
            truncate_str(&msg.text, 60)
        );

        if self.policy.confirm_new_entries {
            let prompt = self
                .send(
                    msg.chat_id,
                    menu::INITIAL_PROMPT,
                    Some(msg.message_ref),
                    Some(&menu::initial_menu()),
                )
                .await?;
            self.open_session(user, msg, path, prompt, Stage::Initial);
            return Ok(Outcome::Prompted(prompt));
        }

        if !self.store.exists(&path).await {
            self.append_to(&path, &msg.text).await?;
            self.notify(msg.chat_id, "Text added to journal", Some(msg.message_ref))
                .await;
            return Ok(Outcome::Written);
        }

        // Only commit the session once the prompt id is known.
        let prompt = self
            .ask_disposition(msg.chat_id, &path, msg.message_ref)
            .await?;
        self.open_session(user, msg, path, prompt, Stage::Disposition);
        Ok(Outcome::Prompted(prompt))
    }

    fn open_session(
        &self,
        user: UserId,
        msg: &TextMessage,
        target_path: std::path::PathBuf,
        prompt: MessageRef,
        stage: Stage,
    ) {
        let replaced = self.sessions.put(
            user,
            Session {
                content: msg.text.clone(),
                target_path,
                prompt_message_ref: prompt,
                origin_message_ref: msg.message_ref,
                stage,
            },
        );
        if let Some(old) = replaced {
            tracing::debug!(
                "Session for {user} on prompt {} replaced by prompt {prompt}",
                old.prompt_message_ref
            );
        }
    }

    // ── Menu selections ────────────────────────────────────────────────

    pub async fn on_menu_selection(&self, sel: &MenuSelection) -> Outcome {
        if let Err(e) = self.authorize(sel.sender_id) {
            tracing::debug!("Dropping selection: {e}");
            return Outcome::Ignored;
        }

        if let Err(e) = self.messenger.answer_callback(&sel.callback_ref).await {
            tracing::warn!("{}", DaybookError::Transport(e));
        }

        let chat = ChatId::from(sel.sender_id);
        let result = match Selection::parse(&sel.selection_key) {
            Some(selection) => self.resolve(sel, selection).await,
            None => Err(DaybookError::StaleAction(StaleReason::WrongStage)),
        };

        match result {
            Ok(outcome) => outcome,
            Err(e) => self.report(chat, None, e).await,
        }
    }

    async fn resolve(
        &self,
        sel: &MenuSelection,
        selection: Selection,
    ) -> Result<Outcome, DaybookError> {
        let user = sel.sender_id;
        let session = self
            .sessions
            .claim(user, sel.attached_message_ref, selection.stage())
            .map_err(DaybookError::StaleAction)?;

        tracing::info!(
            "{user} chose {} for {}",
            selection.key(),
            session.target_path.display()
        );

        let result = self.apply(user, &session, selection).await;
        if result.is_err() {
            // Keep the entry so the same selection can be retried.
            self.sessions.release(user, session.prompt_message_ref);
        }
        result
    }

    async fn apply(
        &self,
        user: UserId,
        session: &Session,
        selection: Selection,
    ) -> Result<Outcome, DaybookError> {
        let chat = ChatId::from(user);
        let prompt = session.prompt_message_ref;
        let path = session.target_path.as_path();

        match selection {
            Selection::Cancel => {
                self.sessions.finish(user, prompt);
                self.notify(chat, "Operation cancelled", None).await;
                Ok(Outcome::Cancelled)
            }
            Selection::Read => {
                let data = self
                    .store
                    .read_all(path)
                    .await
                    .map_err(|e| DaybookError::store(path, e))?;
                let text = String::from_utf8_lossy(&data);
                let body = if text.is_empty() {
                    "File is empty."
                } else {
                    text.as_ref()
                };
                self.notify(chat, body, None).await;

                if self.policy.clear_after_read {
                    self.sessions.finish(user, prompt);
                } else {
                    self.sessions.release(user, prompt);
                }
                Ok(Outcome::Read)
            }
            Selection::Replace => {
                self.store
                    .write_truncate(path, session.content.as_bytes())
                    .await
                    .map_err(|e| DaybookError::store(path, e))?;
                self.sessions.finish(user, prompt);
                self.notify(chat, "File replaced successfully", None).await;
                Ok(Outcome::Replaced)
            }
            Selection::Append => {
                self.append_to(path, &format!("{ENTRY_SEPARATOR}{}", session.content))
                    .await?;
                self.sessions.finish(user, prompt);
                self.notify(chat, "Content added to file", None).await;
                Ok(Outcome::Appended)
            }
            Selection::Write => {
                if self.store.exists(path).await {
                    self.notify(
                        chat,
                        "File already exists.",
                        Some(session.origin_message_ref),
                    )
                    .await;
                    let next = self
                        .ask_disposition(chat, path, session.origin_message_ref)
                        .await?;
                    self.sessions.advance(
                        user,
                        prompt,
                        next,
                        path.to_path_buf(),
                        Stage::Disposition,
                    );
                    return Ok(Outcome::Prompted(next));
                }
                self.append_to(path, &session.content).await?;
                self.sessions.finish(user, prompt);
                self.notify(chat, "Text added to journal", Some(session.origin_message_ref))
                    .await;
                Ok(Outcome::Written)
            }
            Selection::AppendNew => {
                let text = if self.store.exists(path).await {
                    format!("{ENTRY_SEPARATOR}{}", session.content)
                } else {
                    session.content.clone()
                };
                self.append_to(path, &text).await?;
                self.sessions.finish(user, prompt);
                self.notify(chat, "Text added to journal", Some(session.origin_message_ref))
                    .await;
                Ok(Outcome::Written)
            }
        }
    }

    // ── Helpers ────────────────────────────────────────────────────────

    async fn append_to(&self, path: &Path, text: &str) -> Result<(), DaybookError> {
        self.store
            .write_create_or_append(path, text.as_bytes())
            .await
            .map_err(|e| DaybookError::store(path, e))
    }

    async fn ask_disposition(
        &self,
        chat: ChatId,
        path: &Path,
        reply_to: MessageRef,
    ) -> Result<MessageRef, DaybookError> {
        self.send(
            chat,
            &menu::disposition_prompt(path),
            Some(reply_to),
            Some(&menu::disposition_menu()),
        )
        .await
    }

    async fn send(
        &self,
        chat: ChatId,
        text: &str,
        reply_to: Option<MessageRef>,
        menu: Option<&Menu>,
    ) -> Result<MessageRef, DaybookError> {
        self.messenger
            .send_text(chat, text, reply_to, menu)
            .await
            .map_err(DaybookError::Transport)
    }

    /// Fire-and-log send. A failed notice never undoes a write.
    async fn notify(&self, chat: ChatId, text: &str, reply_to: Option<MessageRef>) {
        if let Err(e) = self.send(chat, text, reply_to, None).await {
            tracing::error!("Notice to {chat} not delivered: {e}");
        }
    }

    async fn report(
        &self,
        chat: ChatId,
        reply_to: Option<MessageRef>,
        err: DaybookError,
    ) -> Outcome {
        match err {
            DaybookError::StaleAction(reason) => {
                tracing::warn!("Stale selection in chat {chat}: {}", reason.notice());
                self.notify(chat, reason.notice(), None).await;
                Outcome::Stale(reason)
            }
            DaybookError::Unauthorized { .. } => Outcome::Ignored,
            e if e.is_user_visible() => {
                tracing::error!("{e}");
                self.notify(chat, &format!("Error:\n{e}"), reply_to).await;
                Outcome::Failed
            }
            e => {
                tracing::error!("{e}");
                Outcome::Failed
            }
        }
    }
}
