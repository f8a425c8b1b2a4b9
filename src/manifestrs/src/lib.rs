// manifestrs/src/lib.rs

pub mod cli;
pub mod codegen;
pub mod config;
pub mod constants;
pub mod edits;
pub mod error;
pub mod manifest;
pub mod orchestrator;
pub mod state;
pub mod sync;
pub mod writer;

// Re-export commonly used types
pub use codegen::{CodeGenerator, ReactGenerator};
pub use config::{compute_hash, GenerationConfig, ProjectPaths, RemovedFilePolicy};
pub use edits::UserEditTracker;
pub use error::{ManifestrsError, Result};
pub use manifest::{Component, ComponentId, Manifest};
pub use orchestrator::{FileManager, GenerationEvent, GenerationSummary};
pub use sync::{ChangeDetectionResult, ChangeDetector, RootComponent};
pub use writer::{FileWriter, FsFileWriter, WriteRequest, WriteResult};
