// src/journal/paths.rs — Daily file naming
//
// One file per calendar day: <folder><YYYY-MM-DD>.md. The day comes from
// the message's own timestamp, never from the clock at handling time.

use std::path::PathBuf;

use chrono::{DateTime, FixedOffset, Local, TimeZone, Utc};

use crate::infra::config::Settings;

#[derive(Debug, Clone)]
pub struct JournalPaths {
    /// Ends with a path separator.
    folder: String,
    /// Fixed zone; `None` means the process-local zone.
    offset: Option<FixedOffset>,
}

impl JournalPaths {
    pub fn new(folder: impl Into<String>, offset: Option<FixedOffset>) -> Self {
        let mut folder = folder.into();
        if !folder.is_empty() && !folder.ends_with(['/', '\\']) {
            folder.push(std::path::MAIN_SEPARATOR);
        }
        Self { folder, offset }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        let offset = settings.utc_offset_minutes.and_then(|m| {
            let zone = m.checked_mul(60).and_then(FixedOffset::east_opt);
            if zone.is_none() {
                tracing::warn!("utc_offset_minutes {m} out of range; using local time");
            }
            zone
        });
        Self::new(settings.journal_folder.clone(), offset)
    }

    pub fn folder(&self) -> &str {
        &self.folder
    }

    /// `YYYY-MM-DD` of the given Unix timestamp in the configured zone.
    /// A timestamp chrono cannot represent falls back to the current time.
    pub fn date_for(&self, unix_secs: i64) -> String {
        let utc = DateTime::<Utc>::from_timestamp(unix_secs, 0).unwrap_or_else(|| {
            tracing::warn!("Message timestamp {unix_secs} out of range; dating it now");
            Utc::now()
        });
        match self.offset {
            Some(zone) => format_day(&zone, &utc),
            None => format_day(&Local, &utc),
        }
    }

    /// Journal file for the day the message was sent.
    pub fn for_timestamp(&self, unix_secs: i64) -> PathBuf {
        PathBuf::from(format!("{}{}.md", self.folder, self.date_for(unix_secs)))
    }
}

fn format_day<Tz: TimeZone>(zone: &Tz, utc: &DateTime<Utc>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    utc.with_timezone(zone).format("%Y-%m-%d").to_string()
}
