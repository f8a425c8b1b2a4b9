// manifestrs/src/config/mod.rs

pub mod fingerprint;
pub mod settings;

pub use fingerprint::compute_hash;
pub use settings::{GenerationConfig, PathsConfig, ProjectPaths, RemovedFilePolicy};
