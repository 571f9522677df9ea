// src/infra/daemon/mod.rs

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;

use crate::conversation::Controller;
use crate::infra::shutdown::Shutdown;
use crate::integrations::types::{EventSource, Messenger, UserId};

pub mod handler;

/// Pause after a failed poll before trying again.
const POLL_BACKOFF: Duration = Duration::from_secs(5);

/// Everything the daemon loop needs.
pub struct DaemonContext {
    pub controller: Arc<Controller>,
    pub source: Arc<dyn EventSource>,
    pub messenger: Arc<dyn Messenger>,
    pub shutdown: Shutdown,
    /// Chats to register the command list with.
    pub users: Vec<UserId>,
    pub poll_backoff: Duration,
}

impl DaemonContext {
    pub fn new(
        controller: Arc<Controller>,
        source: Arc<dyn EventSource>,
        messenger: Arc<dyn Messenger>,
        shutdown: Shutdown,
        users: Vec<UserId>,
    ) -> Self {
        Self {
            controller,
            source,
            messenger,
            shutdown,
            users,
            poll_backoff: POLL_BACKOFF,
        }
    }
}

/// Run the bot until Ctrl+C or an in-chat stop request.
///
/// Each inbound event is handled on its own task. On shutdown the loop
/// stops polling, waits for in-flight handlers, then confirms the polled
/// events with the platform.
pub async fn run_daemon(ctx: DaemonContext) -> anyhow::Result<()> {
    tracing::info!("Daybook starting...");

    handler::register_commands(ctx.messenger.as_ref(), &ctx.users).await;

    let mut tasks: JoinSet<()> = JoinSet::new();

    let interrupt = tokio::signal::ctrl_c();
    tokio::pin!(interrupt);

    println!("Bot running. Press Ctrl+C to stop.");

    loop {
        tokio::select! {
            biased;

            _ = ctx.shutdown.wait() => {
                tracing::info!("Shutdown requested");
                break;
            }
            _ = &mut interrupt => {
                tracing::info!("Interrupt received");
                ctx.shutdown.request();
                break;
            }
            Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                if let Err(e) = joined {
                    tracing::error!("Event handler panicked: {e}");
                }
            }
            polled = ctx.source.next_events() => {
                match polled {
                    Ok(events) => {
                        for event in events {
                            let controller = ctx.controller.clone();
                            tasks.spawn(async move {
                                handler::dispatch(&controller, event).await;
                            });
                        }
                    }
                    Err(e) => {
                        tracing::warn!("Polling for updates failed: {e}");
                        // The stop branches above pick the request up on the next turn
                        tokio::select! {
                            _ = ctx.shutdown.wait() => {}
                            _ = &mut interrupt => {
                                tracing::info!("Interrupt received");
                                ctx.shutdown.request();
                            }
                            _ = tokio::time::sleep(ctx.poll_backoff) => {}
                        }
                    }
                }
            }
        }
    }

    println!("\nShutting down...");
    let in_flight = tasks.len();
    if in_flight > 0 {
        tracing::info!("Waiting for {in_flight} handler(s) to finish");
    }
    while let Some(joined) = tasks.join_next().await {
        if let Err(e) = joined {
            tracing::error!("Event handler panicked: {e}");
        }
    }

    if let Err(e) = ctx.source.acknowledge().await {
        tracing::warn!("Could not confirm processed updates: {e}");
    }

    tracing::info!("Daybook stopped.");
    Ok(())
}
