// manifestrs/src/sync/changes.rs

use crate::manifest::ComponentId;
use serde::Serialize;

/// Differences between the manifest and the last cached pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeDetectionResult {
    /// Components with no cache entry
    pub added: Vec<ComponentId>,

    /// Components whose content hash differs from the cached one
    pub modified: Vec<ComponentId>,

    /// Cached components no longer in the manifest
    pub removed: Vec<ComponentId>,

    /// Entry point has to be regenerated
    pub app_needs_update: bool,
}

impl ChangeDetectionResult {
    /// Create an empty result
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_changes(&self) -> usize {
        self.added.len() + self.modified.len() + self.removed.len()
    }

    pub fn has_changes(&self) -> bool {
        self.total_changes() > 0 || self.app_needs_update
    }

    /// Components that have to be regenerated, added first
    pub fn to_regenerate(&self) -> impl Iterator<Item = &ComponentId> {
        self.added.iter().chain(self.modified.iter())
    }

    /// Get a summary of changes for display
    pub fn summary(&self) -> String {
        let mut lines = Vec::new();

        let sections = [
            ("Added", &self.added),
            ("Modified", &self.modified),
            ("Removed", &self.removed),
        ];
        for (label, ids) in sections {
            if !ids.is_empty() {
                lines.push(format!("{} components: {}", label, ids.len()));
                for id in ids {
                    lines.push(format!("  - {}", id));
                }
            }
        }

        if self.app_needs_update {
            lines.push("Entry point needs regeneration".to_string());
        }

        if lines.is_empty() {
            "No changes detected.".to_string()
        } else {
            lines.join("\n")
        }
    }
}
