// src/conversation/menu.rs — Prompt menus and their selection keys

use crate::conversation::session::Stage;
use crate::integrations::types::Menu;

const JOURNAL_PREFIX: &str = "journal_";
const FILE_PREFIX: &str = "file_";

pub const KEY_WRITE: &str = "journal_add";
pub const KEY_APPEND_NEW: &str = "journal_append";
pub const KEY_REPLACE: &str = "file_replace";
pub const KEY_APPEND: &str = "file_append";
pub const KEY_READ: &str = "file_read";
pub const KEY_CANCEL: &str = "file_cancel";

pub const INITIAL_PROMPT: &str = "How do you want to update journal?:";

/// What the user picked on a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Initial prompt: create-or-append, asking first if the day exists.
    Write,
    /// Initial prompt: append right away.
    AppendNew,
    Replace,
    Append,
    Read,
    Cancel,
}

impl Selection {
    pub fn parse(key: &str) -> Option<Self> {
        match key {
            KEY_WRITE => Some(Selection::Write),
            KEY_APPEND_NEW => Some(Selection::AppendNew),
            KEY_REPLACE => Some(Selection::Replace),
            KEY_APPEND => Some(Selection::Append),
            KEY_READ => Some(Selection::Read),
            KEY_CANCEL => Some(Selection::Cancel),
            _ => None,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Selection::Write => KEY_WRITE,
            Selection::AppendNew => KEY_APPEND_NEW,
            Selection::Replace => KEY_REPLACE,
            Selection::Append => KEY_APPEND,
            Selection::Read => KEY_READ,
            Selection::Cancel => KEY_CANCEL,
        }
    }

    /// The prompt this selection belongs to.
    pub fn stage(&self) -> Stage {
        if self.key().starts_with(JOURNAL_PREFIX) {
            Stage::Initial
        } else {
            debug_assert!(self.key().starts_with(FILE_PREFIX));
            Stage::Disposition
        }
    }
}

/// write / append
pub fn initial_menu() -> Menu {
    Menu::new()
        .row(&[("write", KEY_WRITE)])
        .row(&[("append", KEY_APPEND_NEW)])
}

/// replace / append / read / cancel
pub fn disposition_menu() -> Menu {
    Menu::new()
        .row(&[("replace", KEY_REPLACE), ("append", KEY_APPEND)])
        .row(&[("read", KEY_READ), ("cancel", KEY_CANCEL)])
}

pub fn disposition_prompt(path: &std::path::Path) -> String {
    format!("What to do with the file: {}", path.display())
}
