// src/cli/mod.rs — CLI definition (clap derive)

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "daybook",
    about = "Chat bot that writes your messages into a daily journal",
    version
)]
pub struct Cli {
    /// Config file path (default: ./config.toml, then ~/.daybook/config.toml)
    #[arg(long)]
    pub config: Option<String>,

    /// Load the settings, check the bot token, and exit
    #[arg(long)]
    pub check: bool,
}
