// manifestrs/src/error.rs

use std::path::PathBuf;
use thiserror::Error;

/// Result alias for library operations
pub type Result<T> = std::result::Result<T, ManifestrsError>;

#[derive(Error, Debug)]
pub enum ManifestrsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Manifest not found: {}", .0.display())]
    ManifestNotFound(PathBuf),

    #[error("Generator failed for component {component}: {message}")]
    GeneratorFailed { component: String, message: String },

    #[error("Generation pass cancelled")]
    Cancelled,

    #[error("Project at {} is not initialized", .0.display())]
    NotInitialized(PathBuf),
}

impl ManifestrsError {
    pub fn generator(component: impl Into<String>, message: impl Into<String>) -> Self {
        ManifestrsError::GeneratorFailed {
            component: component.into(),
            message: message.into(),
        }
    }
}
