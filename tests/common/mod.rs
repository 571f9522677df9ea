// tests/common/mod.rs — Mock adapters shared by the integration tests

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use daybook::conversation::Controller;
use daybook::infra::config::Settings;
use daybook::infra::shutdown::Shutdown;
use daybook::integrations::types::*;
use daybook::journal::JournalStore;

pub const ALICE: i64 = 111;
pub const BOB: i64 = 222;
pub const MALLORY: i64 = 999;

/// 2026-01-01T10:00:00Z
pub const DAY1: i64 = 1_767_261_600;
/// 2026-01-02T10:00:00Z
pub const DAY2: i64 = DAY1 + 86_400;

pub const DAY1_PATH: &str = "/journal/2026-01-01.md";
pub const DAY2_PATH: &str = "/journal/2026-01-02.md";

// ---------- Messenger ----------

#[derive(Debug, Clone)]
pub struct Sent {
    pub chat: ChatId,
    pub text: String,
    pub reply_to: Option<MessageRef>,
    pub menu: Option<Menu>,
    pub id: MessageRef,
}

/// Records every outbound call. Message ids count up from 1000.
#[derive(Default)]
pub struct MockMessenger {
    next_id: AtomicI64,
    pub sent: Mutex<Vec<Sent>>,
    pub answered: Mutex<Vec<CallbackRef>>,
    pub registered: Mutex<Vec<ChatId>>,
    pub fail_sends: AtomicBool,
}

impl MockMessenger {
    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn last(&self) -> Sent {
        self.sent().last().cloned().expect("nothing sent")
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent().into_iter().map(|s| s.text).collect()
    }
}

#[async_trait]
impl Messenger for MockMessenger {
    async fn send_text(
        &self,
        chat: ChatId,
        text: &str,
        reply_to: Option<MessageRef>,
        menu: Option<&Menu>,
    ) -> anyhow::Result<MessageRef> {
        if self.fail_sends.load(Ordering::SeqCst) {
            anyhow::bail!("network unreachable");
        }
        let id = MessageRef(1000 + self.next_id.fetch_add(1, Ordering::SeqCst));
        self.sent.lock().unwrap().push(Sent {
            chat,
            text: text.to_string(),
            reply_to,
            menu: menu.cloned(),
            id,
        });
        Ok(id)
    }

    async fn answer_callback(&self, callback: &CallbackRef) -> anyhow::Result<()> {
        self.answered.lock().unwrap().push(callback.clone());
        Ok(())
    }

    async fn set_commands(&self, chat: ChatId, _commands: &[BotCommand]) -> anyhow::Result<()> {
        self.registered.lock().unwrap().push(chat);
        Ok(())
    }
}

// ---------- Store ----------

/// In-memory journal files with a mutation counter and failure switch.
///
/// With `hold_truncates` set, `write_truncate` signals `truncate_started`
/// and then waits for `resume_truncate` before touching the file.
#[derive(Default)]
pub struct MemoryStore {
    pub files: Mutex<HashMap<PathBuf, Vec<u8>>>,
    pub mutations: AtomicUsize,
    pub reads: AtomicUsize,
    pub fail_writes: AtomicBool,
    pub hold_truncates: AtomicBool,
    pub truncate_started: Notify,
    pub resume_truncate: Notify,
}

impl MemoryStore {
    pub fn with_file(path: &str, content: &str) -> Self {
        let store = Self::default();
        store
            .files
            .lock()
            .unwrap()
            .insert(PathBuf::from(path), content.as_bytes().to_vec());
        store
    }

    pub fn content(&self, path: &str) -> Option<String> {
        self.files
            .lock()
            .unwrap()
            .get(Path::new(path))
            .map(|b| String::from_utf8_lossy(b).into_owned())
    }

    pub fn mutations(&self) -> usize {
        self.mutations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl JournalStore for MemoryStore {
    async fn exists(&self, path: &Path) -> bool {
        self.files.lock().unwrap().contains_key(path)
    }

    async fn read_all(&self, path: &Path) -> anyhow::Result<Vec<u8>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.files
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("No such file or directory"))
    }

    async fn write_create_or_append(&self, path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            anyhow::bail!("Permission denied");
        }
        self.mutations.fetch_add(1, Ordering::SeqCst);
        self.files
            .lock()
            .unwrap()
            .entry(path.to_path_buf())
            .or_default()
            .extend_from_slice(bytes);
        Ok(())
    }

    async fn write_truncate(&self, path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
        if self.hold_truncates.load(Ordering::SeqCst) {
            self.truncate_started.notify_one();
            self.resume_truncate.notified().await;
        }
        if self.fail_writes.load(Ordering::SeqCst) {
            anyhow::bail!("Permission denied");
        }
        self.mutations.fetch_add(1, Ordering::SeqCst);
        self.files
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), bytes.to_vec());
        Ok(())
    }
}

// ---------- Event source ----------

/// Hands out scripted batches, then idles until shutdown.
#[derive(Default)]
pub struct ScriptedSource {
    pub batches: Mutex<VecDeque<anyhow::Result<Vec<InboundEvent>>>>,
    pub acknowledged: AtomicBool,
}

impl ScriptedSource {
    pub fn new(batches: Vec<anyhow::Result<Vec<InboundEvent>>>) -> Self {
        Self {
            batches: Mutex::new(batches.into()),
            acknowledged: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl EventSource for ScriptedSource {
    async fn next_events(&self) -> anyhow::Result<Vec<InboundEvent>> {
        let next = self.batches.lock().unwrap().pop_front();
        match next {
            Some(batch) => batch,
            None => {
                tokio::time::sleep(std::time::Duration::from_millis(20)).await;
                Ok(Vec::new())
            }
        }
    }

    async fn acknowledge(&self) -> anyhow::Result<()> {
        self.acknowledged.store(true, Ordering::SeqCst);
        Ok(())
    }
}

// ---------- Builders ----------

pub fn settings() -> Settings {
    Settings {
        api_token: "test-token".into(),
        users: vec![ALICE, BOB],
        journal_folder: "/journal/".into(),
        utc_offset_minutes: Some(0),
        ..Default::default()
    }
}

pub struct Harness {
    pub controller: Arc<Controller>,
    pub messenger: Arc<MockMessenger>,
    pub store: Arc<MemoryStore>,
    pub shutdown: Shutdown,
}

pub fn harness_with(settings: Settings, store: MemoryStore) -> Harness {
    let messenger = Arc::new(MockMessenger::default());
    let store = Arc::new(store);
    let shutdown = Shutdown::new();
    let controller = Arc::new(Controller::new(
        &settings,
        store.clone(),
        messenger.clone(),
        shutdown.clone(),
    ));
    Harness {
        controller,
        messenger,
        store,
        shutdown,
    }
}

pub fn harness(store: MemoryStore) -> Harness {
    harness_with(settings(), store)
}

pub fn text(user: i64, msg_id: i64, body: &str, timestamp: i64) -> TextMessage {
    TextMessage {
        chat_id: ChatId(user),
        sender_id: UserId(user),
        text: body.to_string(),
        message_ref: MessageRef(msg_id),
        timestamp,
    }
}

pub fn select(user: i64, key: &str, attached: MessageRef) -> MenuSelection {
    MenuSelection {
        sender_id: UserId(user),
        selection_key: key.to_string(),
        attached_message_ref: attached,
        callback_ref: CallbackRef(format!("cb-{user}-{key}-{}", attached.0)),
    }
}
