// manifestrs/src/edits/mod.rs

pub mod tracker;

pub use tracker::UserEditTracker;
