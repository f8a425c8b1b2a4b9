// manifestrs/src/sync/detector.rs

use crate::config::fingerprint::compute_hash;
use crate::manifest::{Component, ComponentId};
use crate::state::{ComponentHashEntry, HashCacheFile};
use crate::sync::changes::ChangeDetectionResult;
use crate::sync::roots::find_root_component_ids;
use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet};

/// Detect changes between the current components and the last cached pass
#[derive(Debug, Default)]
pub struct ChangeDetector {
    hash_cache: BTreeMap<ComponentId, ComponentHashEntry>,
    root_ids: BTreeSet<ComponentId>,
    entry_point_stale: bool,
}

impl ChangeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the in-memory caches from a persisted sidecar
    pub fn from_cache_file(file: HashCacheFile) -> Self {
        let root_ids = file
            .components
            .values()
            .filter(|entry| entry.is_root)
            .map(|entry| entry.id.clone())
            .collect();

        Self {
            hash_cache: file.components,
            root_ids,
            entry_point_stale: file.entry_point_stale,
        }
    }

    pub fn to_cache_file(&self) -> HashCacheFile {
        HashCacheFile::new(self.hash_cache.clone(), self.entry_point_stale)
    }

    /// Diff the current components against the cache
    pub fn detect_changes(
        &self,
        current: &BTreeMap<ComponentId, Component>,
    ) -> ChangeDetectionResult {
        let mut result = ChangeDetectionResult::new();
        let current_roots = find_root_component_ids(current);

        result.app_needs_update = self.entry_point_stale;

        for (id, component) in current {
            match self.hash_cache.get(id) {
                None => {
                    if current_roots.contains(id) {
                        result.app_needs_update = true;
                    }
                    result.added.push(id.clone());
                }
                Some(entry) => {
                    if compute_hash(component) != entry.hash {
                        if entry.is_root || current_roots.contains(id) {
                            result.app_needs_update = true;
                        }
                        result.modified.push(id.clone());
                    }
                }
            }
        }

        for (id, entry) in &self.hash_cache {
            if !current.contains_key(id) {
                if entry.is_root {
                    result.app_needs_update = true;
                }
                result.removed.push(id.clone());
            }
        }

        // Re-parenting changes the root set without touching any hash
        if !result.app_needs_update && current_roots != self.root_ids {
            log::debug!("Root set changed shape without content changes");
            result.app_needs_update = true;
        }

        log::debug!(
            "Detected {} added, {} modified, {} removed (entry point stale: {})",
            result.added.len(),
            result.modified.len(),
            result.removed.len(),
            result.app_needs_update
        );

        result
    }

    /// Replace both caches with a snapshot of `current`
    pub fn update_cache(&mut self, current: &BTreeMap<ComponentId, Component>) {
        self.update_cache_except(current, &BTreeSet::new());
    }

    /// Replace both caches with a snapshot of `current`, except that
    /// components in `failed` keep their previous entry (or stay uncached),
    /// so the next pass reports them again.
    pub fn update_cache_except(
        &mut self,
        current: &BTreeMap<ComponentId, Component>,
        failed: &BTreeSet<ComponentId>,
    ) {
        let roots = find_root_component_ids(current);
        let cached_at = Utc::now();
        let mut previous = std::mem::take(&mut self.hash_cache);

        for (id, component) in current {
            if failed.contains(id) {
                if let Some(entry) = previous.remove(id) {
                    self.hash_cache.insert(id.clone(), entry);
                }
                continue;
            }

            self.hash_cache.insert(
                id.clone(),
                ComponentHashEntry {
                    id: id.clone(),
                    display_name: component.display_name.clone(),
                    hash: compute_hash(component),
                    is_root: roots.contains(id),
                    cached_at,
                },
            );
        }

        self.root_ids = roots;
        self.entry_point_stale = false;
    }

    /// Force the next pass to regenerate the entry point
    pub fn mark_entry_point_stale(&mut self) {
        self.entry_point_stale = true;
    }

    /// Forget everything; the next diff reports every component as added
    pub fn clear_cache(&mut self) {
        self.hash_cache.clear();
        self.root_ids.clear();
        self.entry_point_stale = false;
    }

    pub fn cached_entry(&self, id: &str) -> Option<&ComponentHashEntry> {
        self.hash_cache.get(id)
    }

    pub fn cached_len(&self) -> usize {
        self.hash_cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hash_cache.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{Manifest, PropertyDefinition};

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn tree() -> Manifest {
        Manifest::new()
            .with_component(Component::new("A", "Root", "div").with_children(["B"]))
            .with_component(
                Component::new("B", "Leaf", "span")
                    .with_property("label", PropertyDefinition::text("hi")),
            )
    }

    fn cached(manifest: &Manifest) -> ChangeDetector {
        let mut detector = ChangeDetector::new();
        detector.update_cache(&manifest.components);
        detector
    }

    #[test]
    fn test_first_run_reports_everything_added() {
        let detector = ChangeDetector::new();
        let result = detector.detect_changes(&tree().components);

        assert_eq!(result.added, ids(&["A", "B"]));
        assert!(result.modified.is_empty());
        assert!(result.removed.is_empty());
        assert!(result.app_needs_update);
    }

    #[test]
    fn test_no_changes_after_update() {
        let manifest = tree();
        let detector = cached(&manifest);

        let result = detector.detect_changes(&manifest.components);

        assert!(!result.has_changes());
        assert!(result.added.is_empty() && result.modified.is_empty() && result.removed.is_empty());
    }

    #[test]
    fn test_leaf_edit_does_not_touch_entry_point() {
        let manifest = tree();
        let detector = cached(&manifest);

        let mut edited = manifest.clone();
        let leaf = edited.components.get_mut("B").unwrap();
        leaf.properties.insert("label".to_string(), PropertyDefinition::text("changed"));

        let result = detector.detect_changes(&edited.components);

        assert_eq!(result.modified, ids(&["B"]));
        assert!(!result.app_needs_update);
    }

    #[test]
    fn test_root_edit_invalidates_entry_point() {
        let manifest = tree();
        let detector = cached(&manifest);

        let mut edited = manifest.clone();
        edited.components.get_mut("A").unwrap().display_name = "Shell".to_string();

        let result = detector.detect_changes(&edited.components);

        assert_eq!(result.modified, ids(&["A"]));
        assert!(result.app_needs_update);
    }

    #[test]
    fn test_reparent_to_root_invalidates_entry_point() {
        let manifest = tree();
        let detector = cached(&manifest);

        let mut edited = manifest.clone();
        edited.components.get_mut("A").unwrap().children.clear();

        let result = detector.detect_changes(&edited.components);

        // A's children list is part of its hash; B itself is untouched
        assert!(result.added.is_empty());
        assert!(result.removed.is_empty());
        assert_eq!(result.modified, ids(&["A"]));
        assert!(result.app_needs_update);
    }

    #[test]
    fn test_root_set_shape_change_without_content_change() {
        // R -> P -> B, where P is not a root
        let manifest = Manifest::new()
            .with_component(Component::new("R", "Shell", "div").with_children(["P"]))
            .with_component(Component::new("P", "Panel", "div").with_children(["B"]))
            .with_component(Component::new("B", "Badge", "span"));
        let detector = cached(&manifest);

        // P disappears while R keeps a dangling reference: B becomes a root
        // without any surviving component changing its hash
        let mut edited = manifest.clone();
        edited.components.remove("P");

        let result = detector.detect_changes(&edited.components);

        assert!(result.added.is_empty());
        assert!(result.modified.is_empty());
        assert_eq!(result.removed, ids(&["P"]));
        assert!(result.app_needs_update);
    }

    #[test]
    fn test_removed_child_does_not_touch_entry_point() {
        let manifest = tree();
        let detector = cached(&manifest);

        let mut edited = manifest.clone();
        edited.components.remove("B");

        let result = detector.detect_changes(&edited.components);

        assert_eq!(result.removed, ids(&["B"]));
        // A still lists B as a child, so A is unchanged and still the only root
        assert!(result.modified.is_empty());
        assert!(!result.app_needs_update);
    }

    #[test]
    fn test_removed_root_invalidates_entry_point() {
        let manifest = tree().with_component(Component::new("C", "Popup", "div"));
        let detector = cached(&manifest);

        let mut edited = manifest.clone();
        edited.components.remove("C");

        let result = detector.detect_changes(&edited.components);

        assert_eq!(result.removed, ids(&["C"]));
        assert!(result.app_needs_update);
    }

    #[test]
    fn test_added_child_is_not_also_modified() {
        let manifest = tree();
        let detector = cached(&manifest);

        let mut edited = manifest.clone();
        let parent = edited.components.get_mut("B").unwrap();
        parent.children.push("N".to_string());
        edited.insert(Component::new("N", "New", "i"));

        let result = detector.detect_changes(&edited.components);

        assert_eq!(result.added, ids(&["N"]));
        assert_eq!(result.modified, ids(&["B"]));
        assert!(!result.app_needs_update);
    }

    #[test]
    fn test_clear_cache_forces_full_add() {
        let manifest = tree();
        let mut detector = cached(&manifest);
        detector.clear_cache();

        let result = detector.detect_changes(&manifest.components);

        assert_eq!(result.added, ids(&["A", "B"]));
        assert!(detector.is_empty());
    }

    #[test]
    fn test_failed_components_keep_previous_entry() {
        let manifest = tree();
        let mut detector = cached(&manifest);
        let old_hash = detector.cached_entry("B").unwrap().hash.clone();

        let mut edited = manifest.clone();
        edited.components.get_mut("B").unwrap().element_type = "strong".to_string();
        edited.insert(Component::new("C", "Fresh", "div"));

        let failed: BTreeSet<String> = ["B", "C"].iter().map(|s| s.to_string()).collect();
        detector.update_cache_except(&edited.components, &failed);

        assert_eq!(detector.cached_entry("B").unwrap().hash, old_hash);
        assert!(detector.cached_entry("C").is_none());

        let result = detector.detect_changes(&edited.components);
        assert_eq!(result.added, ids(&["C"]));
        assert_eq!(result.modified, ids(&["B"]));
    }

    #[test]
    fn test_stale_entry_point_survives_until_update() {
        let manifest = tree();
        let mut detector = cached(&manifest);
        detector.mark_entry_point_stale();

        assert!(detector.detect_changes(&manifest.components).app_needs_update);

        detector.update_cache(&manifest.components);
        assert!(!detector.detect_changes(&manifest.components).app_needs_update);
    }

    #[test]
    fn test_cache_file_round_trip_restores_roots() {
        let manifest = tree();
        let detector = cached(&manifest);

        let restored = ChangeDetector::from_cache_file(detector.to_cache_file());

        assert_eq!(restored.cached_len(), 2);
        assert!(!restored.detect_changes(&manifest.components).has_changes());
    }
}
