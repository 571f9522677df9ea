// src/main.rs — Daybook entry point

use std::path::Path;
use std::sync::Arc;

use clap::Parser;

use daybook::cli::Cli;
use daybook::conversation::Controller;
use daybook::infra::config::Settings;
use daybook::infra::daemon::{run_daemon, DaemonContext};
use daybook::infra::logger;
use daybook::infra::shutdown::Shutdown;
use daybook::integrations::types::UserId;
use daybook::integrations::TelegramAdapter;
use daybook::journal::FsStore;

#[tokio::main]
async fn main() {
    // Initialize logging (respects RUST_LOG)
    logger::init_logging("info");

    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = match cli.config {
        Some(ref path) => Settings::load_from(Path::new(path))?,
        None => Settings::load()?,
    };

    if !Path::new(&settings.journal_folder).is_dir() {
        tracing::warn!(
            "Journal folder {} does not exist; writes will fail until it does",
            settings.journal_folder
        );
    }

    let telegram = Arc::new(TelegramAdapter::new(
        settings.api_token.clone(),
        settings.poll_timeout_secs,
    )?);

    if cli.check {
        println!("{}", telegram.validate().await?);
        println!("Journal folder: {}", settings.journal_folder);
        println!("Allowed users: {}", settings.users.len());
        return Ok(());
    }

    let shutdown = Shutdown::new();
    let controller = Arc::new(Controller::new(
        &settings,
        Arc::new(FsStore::new()),
        telegram.clone(),
        shutdown.clone(),
    ));

    let users: Vec<UserId> = settings.users.iter().copied().map(UserId).collect();
    let ctx = DaemonContext::new(controller, telegram.clone(), telegram, shutdown, users);

    run_daemon(ctx).await
}
