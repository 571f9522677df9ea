// src/infra/config.rs — Settings loading (TOML)

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::infra::errors::DaybookError;
use crate::infra::paths;
use crate::integrations::types::UserId;

/// Environment variable consulted when `api_token` is empty.
pub const TOKEN_ENV: &str = "DAYBOOK_API_TOKEN";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Bot API token.
    #[serde(default)]
    pub api_token: String,

    /// Allow-listed numeric user ids.
    #[serde(default)]
    pub users: Vec<i64>,

    /// Folder holding the daily files. Always ends with a separator once loaded.
    #[serde(default)]
    pub journal_folder: String,

    /// End the pending entry after a `read` selection.
    #[serde(default)]
    pub clear_after_read: bool,

    /// Ask write/append before every entry instead of writing new days directly.
    #[serde(default)]
    pub confirm_new_entries: bool,

    /// Fixed timezone for file dates. Local time when absent.
    #[serde(default)]
    pub utc_offset_minutes: Option<i32>,

    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_secs: u64,
}

fn default_poll_timeout() -> u64 {
    30
}

impl Settings {
    /// Load settings from the first config file found on the search path.
    pub fn load() -> Result<Self, DaybookError> {
        let path = paths::find_config_file().ok_or_else(|| {
            DaybookError::Config(format!(
                "no {} found (looked in: {})",
                paths::CONFIG_FILE,
                paths::config_candidates()
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            ))
        })?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self, DaybookError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| DaybookError::Config(format!("{}: {e}", path.display())))?;
        let settings = Self::parse(&content)?;
        tracing::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Parse, apply the env token fallback, normalize and validate.
    pub fn parse(content: &str) -> Result<Self, DaybookError> {
        let mut settings: Settings =
            toml::from_str(content).map_err(|e| DaybookError::Config(e.to_string()))?;

        if settings.api_token.trim().is_empty() {
            if let Ok(token) = std::env::var(TOKEN_ENV) {
                settings.api_token = token;
            }
        }

        settings.normalize();
        settings.validate()?;
        Ok(settings)
    }

    /// Trim the token and make sure the folder ends with a path separator.
    pub fn normalize(&mut self) {
        self.api_token = self.api_token.trim().to_string();
        if !self.journal_folder.is_empty() && !self.journal_folder.ends_with(['/', '\\']) {
            self.journal_folder.push(std::path::MAIN_SEPARATOR);
        }
    }

    pub fn validate(&self) -> Result<(), DaybookError> {
        if self.api_token.is_empty() {
            return Err(DaybookError::Config(format!(
                "api_token is empty and {TOKEN_ENV} is not set"
            )));
        }
        if self.journal_folder.is_empty() {
            return Err(DaybookError::Config("journal_folder is empty".into()));
        }
        if self.users.is_empty() {
            tracing::warn!("No users configured; every message will be ignored");
        }
        Ok(())
    }

    /// The allow-list as a set for membership tests.
    pub fn allowed_users(&self) -> HashSet<UserId> {
        self.users.iter().copied().map(UserId).collect()
    }
}
