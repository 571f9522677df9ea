// src/conversation/mod.rs — Journal conversation state machine

pub mod command;
pub mod controller;
pub mod menu;
pub mod session;

pub use controller::{Controller, Outcome};
pub use session::{Session, SessionTable, Stage};
