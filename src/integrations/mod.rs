// src/integrations/mod.rs — Chat platform layer

pub mod telegram;
pub mod types;

pub use telegram::TelegramAdapter;
pub use types::{EventSource, InboundEvent, Messenger};
