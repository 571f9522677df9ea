// src/journal/mod.rs — Daily journal files

pub mod paths;
pub mod store;

pub use paths::JournalPaths;
pub use store::{FsStore, JournalStore};
