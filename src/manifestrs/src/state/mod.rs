// manifestrs/src/state/mod.rs

pub mod models;
pub mod project;

pub use models::{ComponentHashEntry, HashCacheFile, UserEditInfo, UserEditsFile};
