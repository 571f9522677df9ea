// src/lib.rs — Library root for Daybook

pub mod cli;
pub mod conversation;
pub mod infra;
pub mod integrations;
pub mod journal;
pub mod util;
