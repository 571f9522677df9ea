// src/infra/errors.rs — Error types for Daybook

use std::path::PathBuf;

use thiserror::Error;

use crate::integrations::types::UserId;

/// Why a menu selection was refused without touching any state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaleReason {
    /// The user has no pending entry.
    NoSession,
    /// The selection was made on a prompt that is no longer the live one.
    OldPrompt,
    /// The key does not belong to the prompt the session is waiting on.
    WrongStage,
    /// Another selection on the same prompt is still being carried out.
    InProgress,
}

impl StaleReason {
    /// Notice shown to the user.
    pub fn notice(&self) -> &'static str {
        match self {
            StaleReason::NoSession => "Action over msg outside memory",
            StaleReason::OldPrompt => "Action over old msg",
            StaleReason::WrongStage => "Action not available for this msg",
            StaleReason::InProgress => "Action already in progress",
        }
    }
}

#[derive(Error, Debug)]
pub enum DaybookError {
    // Dropped silently, only counted
    #[error("User {user} is not authorized")]
    Unauthorized { user: UserId },

    // User-visible, no state change
    #[error("Stale action: {}", .0.notice())]
    StaleAction(StaleReason),

    // Journal I/O
    #[error("Journal store failed on {}: {cause}", .path.display())]
    Store { path: PathBuf, cause: anyhow::Error },

    #[error("Messenger failed: {0}")]
    Transport(anyhow::Error),

    // Startup
    #[error("Configuration error: {0}")]
    Config(String),
}

impl DaybookError {
    pub fn store(path: impl Into<PathBuf>, cause: anyhow::Error) -> Self {
        DaybookError::Store {
            path: path.into(),
            cause,
        }
    }

    /// Whether the sender should be told about this error.
    pub fn is_user_visible(&self) -> bool {
        matches!(
            self,
            DaybookError::StaleAction(_) | DaybookError::Store { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_not_user_visible() {
        let e = DaybookError::Unauthorized { user: UserId(7) };
        assert!(!e.is_user_visible());
        assert_eq!(e.to_string(), "User 7 is not authorized");
    }

    #[test]
    fn test_stale_message_uses_notice() {
        let e = DaybookError::StaleAction(StaleReason::OldPrompt);
        assert!(e.is_user_visible());
        assert_eq!(e.to_string(), "Stale action: Action over old msg");
    }

    #[test]
    fn test_store_error_mentions_path() {
        let e = DaybookError::store("/tmp/j/2026-01-01.md", anyhow::anyhow!("disk full"));
        assert!(e.is_user_visible());
        let msg = e.to_string();
        assert!(msg.contains("2026-01-01.md"));
        assert!(msg.contains("disk full"));
    }

    #[test]
    fn test_transport_not_user_visible() {
        let e = DaybookError::Transport(anyhow::anyhow!("timeout"));
        assert!(!e.is_user_visible());
    }
}
