// manifestrs/src/writer/mod.rs

pub mod fs;

use serde::Serialize;
use std::path::{Path, PathBuf};

pub use fs::FsFileWriter;

/// A file to write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteRequest {
    pub filepath: PathBuf,
    pub content: String,
}

/// Outcome of one write (or removal)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteResult {
    pub success: bool,
    pub filepath: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WriteResult {
    pub fn ok(filepath: &Path) -> Self {
        Self {
            success: true,
            filepath: filepath.to_path_buf(),
            error: None,
        }
    }

    pub fn failed(filepath: &Path, error: impl ToString) -> Self {
        Self {
            success: false,
            filepath: filepath.to_path_buf(),
            error: Some(error.to_string()),
        }
    }
}

/// Performs the file-system side of a generation pass
pub trait FileWriter: Send + Sync {
    fn write_file(&self, request: &WriteRequest) -> WriteResult;

    /// Write every request, attempting all of them regardless of failures.
    /// Results come back in request order.
    fn write_files(&self, requests: &[WriteRequest]) -> Vec<WriteResult> {
        requests
            .iter()
            .map(|request| self.write_file(request))
            .collect()
    }

    /// Take a generated file out of the tree: moved under `quarantine_dir`
    /// when given, deleted otherwise. A missing file is a success.
    fn retire_file(&self, filepath: &Path, quarantine_dir: Option<&Path>) -> WriteResult;
}
