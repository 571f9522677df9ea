// src/conversation/command.rs — Slash commands

use crate::integrations::types::BotCommand;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Show usage.
    Help,
    /// Report the event counter.
    Status,
    /// Shut the bot down.
    Stop,
}

/// Parse a slash command. Accepts the `/cmd@botname` form clients send
/// in group chats. Anything else is journal text.
pub fn parse_command(text: &str) -> Option<Command> {
    let trimmed = text.trim();
    let word = trimmed.strip_prefix('/')?;
    if word.contains(char::is_whitespace) {
        return None;
    }
    let name = word.split('@').next().unwrap_or_default();

    match name.to_lowercase().as_str() {
        "help" | "start" => Some(Command::Help),
        "status" => Some(Command::Status),
        "stop" => Some(Command::Stop),
        _ => None,
    }
}

pub fn help_text() -> &'static str {
    "Send a message and you will be prompted with options."
}

pub fn status_text(events: u64) -> String {
    format!("Events since boot: {events}")
}

/// Commands registered with the platform for each allowed chat.
pub fn bot_commands() -> Vec<BotCommand> {
    [
        ("help", "Show bot help"),
        ("status", "Number of events from the boot."),
        ("stop", "Stop the bot"),
    ]
    .into_iter()
    .map(|(command, description)| BotCommand {
        command: command.to_string(),
        description: description.to_string(),
    })
    .collect()
}
