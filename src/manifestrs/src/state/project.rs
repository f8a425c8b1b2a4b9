// manifestrs/src/state/project.rs

use crate::constants::{
    HASH_CACHE_FILE_NAME, MANIFESTRS_DIR, SIDECAR_SCHEMA_VERSION, USER_EDITS_FILE_NAME,
};
use crate::state::models::{HashCacheFile, UserEditsFile};
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Get the .manifestrs directory path
pub fn state_dir(project_root: &Path) -> PathBuf {
    project_root.join(MANIFESTRS_DIR)
}

/// Check if a project is initialized
pub fn is_initialized(project_root: &Path) -> bool {
    state_dir(project_root).is_dir()
}

pub fn hash_cache_path(project_root: &Path) -> PathBuf {
    state_dir(project_root).join(HASH_CACHE_FILE_NAME)
}

pub fn user_edits_path(project_root: &Path) -> PathBuf {
    state_dir(project_root).join(USER_EDITS_FILE_NAME)
}

impl HashCacheFile {
    /// Load the hash cache sidecar.
    ///
    /// A missing file gives `Ok(None)`. A malformed one is logged and also
    /// gives `Ok(None)`, which callers treat as an empty cache.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        load_sidecar(path, "hash cache")
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        save_sidecar(self, path)
    }
}

impl UserEditsFile {
    /// Load the user-edit sidecar with the same tolerance as the hash cache
    pub fn load(path: &Path) -> Result<Option<Self>> {
        load_sidecar(path, "user edits")
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        save_sidecar(self, path)
    }
}

fn load_sidecar<T: DeserializeOwned + HasVersion>(path: &Path, what: &str) -> Result<Option<T>> {
    let content = match fs_err::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e).context(format!("Error reading {} file {}", what, path.display())),
    };

    match serde_json::from_str::<T>(&content) {
        Ok(sidecar) if sidecar.version() == SIDECAR_SCHEMA_VERSION => Ok(Some(sidecar)),
        Ok(sidecar) => {
            log::warn!(
                "Ignoring {} file {} with schema version {:?}",
                what,
                path.display(),
                sidecar.version()
            );
            Ok(None)
        }
        Err(e) => {
            log::warn!(
                "Ignoring malformed {} sidecar {}: {}",
                what,
                path.display(),
                e
            );
            Ok(None)
        }
    }
}

fn save_sidecar<T: Serialize>(sidecar: &T, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs_err::create_dir_all(parent)?;
    }

    // Serialize with pretty printing for human readability
    let content = serde_json::to_string_pretty(sidecar)?;
    fs_err::write(path, content).context(format!("Error writing {}", path.display()))?;

    Ok(())
}

trait HasVersion {
    fn version(&self) -> &str;
}

impl HasVersion for HashCacheFile {
    fn version(&self) -> &str {
        &self.version
    }
}

impl HasVersion for UserEditsFile {
    fn version(&self) -> &str {
        &self.version
    }
}
