// manifestrs/src/edits/tracker.rs

use crate::config::fingerprint::content_fingerprint;
use crate::state::{UserEditInfo, UserEditsFile};
use anyhow::Result;
use chrono::Utc;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Generated files the user has modified and that must not be overwritten.
///
/// Paths are project-relative. When a sidecar path is set every mutation
/// is written through to it.
#[derive(Debug, Default)]
pub struct UserEditTracker {
    edits: BTreeMap<PathBuf, UserEditInfo>,
    sidecar: Option<PathBuf>,
}

impl UserEditTracker {
    /// In-memory tracker without persistence
    pub fn new() -> Self {
        Self::default()
    }

    /// Tracker persisted to `sidecar`, seeded from it when it exists.
    ///
    /// Read failures are logged and start from an empty set: regenerating an
    /// edited file is preferred over failing startup.
    pub fn load_from_disk(sidecar: &Path) -> Self {
        let edits = match UserEditsFile::load(sidecar) {
            Ok(Some(file)) => {
                log::debug!(
                    "Loaded {} user edits from {}",
                    file.edits.len(),
                    sidecar.display()
                );
                file.edits
            }
            Ok(None) => BTreeMap::new(),
            Err(e) => {
                log::warn!("Could not read user edits, starting empty: {:#}", e);
                BTreeMap::new()
            }
        };

        Self {
            edits,
            sidecar: Some(sidecar.to_path_buf()),
        }
    }

    /// Record `path` as hand-edited.
    ///
    /// `contents` is the file's current text, when known; its fingerprint is
    /// kept alongside the entry.
    pub fn mark_edited(
        &mut self,
        path: &Path,
        component_id: Option<&str>,
        contents: Option<&[u8]>,
    ) -> Result<()> {
        self.edits.insert(
            path.to_path_buf(),
            UserEditInfo {
                filepath: path.to_path_buf(),
                component_id: component_id.map(str::to_string),
                detected_at: Utc::now(),
                content_hash: contents.map(content_fingerprint),
            },
        );
        self.persist_to_disk()
    }

    pub fn is_edited(&self, path: &Path) -> bool {
        self.edits.contains_key(path)
    }

    /// Remove `path` from the set; returns the removed entry
    pub fn clear_edited(&mut self, path: &Path) -> Result<Option<UserEditInfo>> {
        let removed = self.edits.remove(path);
        if removed.is_some() {
            self.persist_to_disk()?;
        }
        Ok(removed)
    }

    pub fn get(&self, path: &Path) -> Option<&UserEditInfo> {
        self.edits.get(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &UserEditInfo> {
        self.edits.values()
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Write the whole set to the sidecar, if one is configured
    pub fn persist_to_disk(&self) -> Result<()> {
        match &self.sidecar {
            Some(path) => UserEditsFile::new(self.edits.clone()).save(path),
            None => Ok(()),
        }
    }
}
