// src/infra/daemon/handler.rs

use crate::conversation::command;
use crate::conversation::{Controller, Outcome};
use crate::integrations::types::{InboundEvent, Messenger, UserId};

/// Hand one event to the controller and log what came of it.
pub async fn dispatch(controller: &Controller, event: InboundEvent) -> Outcome {
    let sender = event.sender();
    let outcome = controller.handle(&event).await;

    match &outcome {
        Outcome::Ignored => {
            tracing::debug!("Ignored event from unauthorized user {sender}");
        }
        Outcome::Stale(reason) => {
            tracing::debug!("Stale selection from {sender}: {reason:?}");
        }
        Outcome::Failed => {
            tracing::warn!("Event from {sender} failed");
        }
        other => {
            tracing::info!("Event from {sender}: {other:?}");
        }
    }

    outcome
}

/// Register the slash commands in each allowed user's chat.
/// Failures only cost the client-side command list, so they are logged.
pub async fn register_commands(messenger: &dyn Messenger, users: &[UserId]) {
    let commands = command::bot_commands();
    for user in users {
        match messenger.set_commands((*user).into(), &commands).await {
            Ok(()) => tracing::debug!("Commands registered for {user}"),
            Err(e) => tracing::warn!("Could not register commands for {user}: {e}"),
        }
    }
}
