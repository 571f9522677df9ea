// src/conversation/session.rs — Pending entries, one per user
//
// Every compare-and-mutate happens under the table's lock; callers never
// get a reference into the map. A selection first claims the user
// (checked against the prompt it was made on), does its I/O without the
// lock, then finishes or releases the claim. The claim belongs to the
// user, not to the session, so a newer entry stored meanwhile cannot be
// acted on until the running selection is done. Finishing and releasing
// only touch the session if it still belongs to the same prompt.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::{PoisonError, RwLock};

use crate::infra::errors::StaleReason;
use crate::integrations::types::{MessageRef, UserId};

/// Which prompt a session is waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// write / append
    Initial,
    /// replace / append / read / cancel
    Disposition,
}

/// Text waiting for the user to decide what happens to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub content: String,
    pub target_path: PathBuf,
    /// The prompt this session is attached to.
    pub prompt_message_ref: MessageRef,
    /// The user's original message, for threading replies.
    pub origin_message_ref: MessageRef,
    pub stage: Stage,
}

#[derive(Debug, Default)]
struct Table {
    sessions: HashMap<UserId, Session>,
    /// Users with a selection being carried out.
    busy: HashSet<UserId>,
}

#[derive(Debug, Default)]
pub struct SessionTable {
    inner: RwLock<Table>,
}

impl SessionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `session` for `user`, replacing whatever was there.
    /// Returns the replaced session. A running claim stays in place.
    pub fn put(&self, user: UserId, session: Session) -> Option<Session> {
        let mut table = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        table.sessions.insert(user, session)
    }

    pub fn get(&self, user: UserId) -> Option<Session> {
        let table = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        table.sessions.get(&user).cloned()
    }

    /// Remove the session for `user`, if any.
    pub fn clear(&self, user: UserId) -> Option<Session> {
        let mut table = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        table.sessions.remove(&user)
    }

    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .sessions
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a selection for `user` is being carried out.
    pub fn is_busy(&self, user: UserId) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .busy
            .contains(&user)
    }

    /// Take exclusive use of the session a selection was made on.
    ///
    /// Fails if there is no session, if `attached` is not the live prompt,
    /// if the session waits on a different `stage`, or if an earlier
    /// selection by the same user has not finished yet, whatever prompt
    /// it was made on.
    pub fn claim(
        &self,
        user: UserId,
        attached: MessageRef,
        stage: Stage,
    ) -> Result<Session, StaleReason> {
        let mut table = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let session = table.sessions.get(&user).ok_or(StaleReason::NoSession)?;

        if session.prompt_message_ref != attached {
            return Err(StaleReason::OldPrompt);
        }
        if session.stage != stage {
            return Err(StaleReason::WrongStage);
        }
        let session = session.clone();
        if !table.busy.insert(user) {
            return Err(StaleReason::InProgress);
        }
        Ok(session)
    }

    /// Drop the claim and keep the session for another try.
    /// Returns false if the session was replaced meanwhile.
    pub fn release(&self, user: UserId, prompt: MessageRef) -> bool {
        let mut table = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        table.busy.remove(&user);
        table
            .sessions
            .get(&user)
            .is_some_and(|s| s.prompt_message_ref == prompt)
    }

    /// Drop the claim and end the session it was taken on.
    /// Returns false if the session was replaced meanwhile.
    pub fn finish(&self, user: UserId, prompt: MessageRef) -> bool {
        let mut table = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        table.busy.remove(&user);
        let current = table
            .sessions
            .get(&user)
            .is_some_and(|s| s.prompt_message_ref == prompt);
        if current {
            table.sessions.remove(&user);
        }
        current
    }

    /// Drop the claim and move the session onto a new prompt.
    /// Returns false if the session was replaced meanwhile.
    pub fn advance(
        &self,
        user: UserId,
        prompt: MessageRef,
        new_prompt: MessageRef,
        target_path: PathBuf,
        stage: Stage,
    ) -> bool {
        let mut table = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        table.busy.remove(&user);
        match table.sessions.get_mut(&user) {
            Some(session) if session.prompt_message_ref == prompt => {
                session.prompt_message_ref = new_prompt;
                session.target_path = target_path;
                session.stage = stage;
                true
            }
            _ => false,
        }
    }
}
