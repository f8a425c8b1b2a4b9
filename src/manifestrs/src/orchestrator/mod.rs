// manifestrs/src/orchestrator/mod.rs

pub mod events;
pub mod summary;

use crate::codegen::CodeGenerator;
use crate::config::{GenerationConfig, ProjectPaths, RemovedFilePolicy};
use crate::edits::UserEditTracker;
use crate::error::ManifestrsError;
use crate::manifest::{Component, ComponentId, Manifest};
use crate::state::project::{hash_cache_path, user_edits_path};
use crate::state::{HashCacheFile, UserEditInfo};
use crate::sync::{root_components, ChangeDetectionResult, ChangeDetector};
use crate::writer::{FileWriter, WriteRequest, WriteResult};
use anyhow::Result;
use chrono::Utc;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Receiver;
use std::sync::{Mutex, MutexGuard, PoisonError, RwLock};
use std::time::Instant;

pub use events::{EventBus, GenerationEvent, RemovalDisposition, UserEditConflict};
pub use summary::{ChangeBreakdown, FileFailure, GenerationMode, GenerationSummary};

/// Coordinates generation passes for one project.
///
/// Passes are serialized: the change detector sits behind a mutex held for
/// the whole pass. The user-edit set has its own lock so edits can be
/// recorded while a pass runs; it is consulted per file.
pub struct FileManager<G, W> {
    paths: ProjectPaths,
    config: GenerationConfig,
    generator: G,
    writer: W,
    detector: Mutex<ChangeDetector>,
    user_edits: RwLock<UserEditTracker>,
    bootstrap_generated: AtomicBool,
    cancel_requested: AtomicBool,
    events: EventBus,
}

/// Bookkeeping carried from the write phase to the cache update
#[derive(Default)]
struct PassOutcome {
    failed: BTreeSet<ComponentId>,
    entry_point_failed: bool,
}

impl<G: CodeGenerator, W: FileWriter> FileManager<G, W> {
    /// File manager with empty in-memory state
    pub fn new(project_root: &Path, config: GenerationConfig, generator: G, writer: W) -> Self {
        Self {
            paths: ProjectPaths::new(project_root, &config.paths),
            config,
            generator,
            writer,
            detector: Mutex::new(ChangeDetector::new()),
            user_edits: RwLock::new(UserEditTracker::new()),
            bootstrap_generated: AtomicBool::new(false),
            cancel_requested: AtomicBool::new(false),
            events: EventBus::new(),
        }
    }

    /// File manager seeded from the project's sidecars, as enabled in `config`
    pub fn open(project_root: &Path, config: GenerationConfig, generator: G, writer: W) -> Self {
        let detector = if config.persist_cache {
            match HashCacheFile::load(&hash_cache_path(project_root)) {
                Ok(Some(file)) => ChangeDetector::from_cache_file(file),
                Ok(None) => ChangeDetector::new(),
                Err(e) => {
                    log::warn!("Could not read hash cache, starting empty: {:#}", e);
                    ChangeDetector::new()
                }
            }
        } else {
            ChangeDetector::new()
        };

        let user_edits = if config.persist_user_edits {
            UserEditTracker::load_from_disk(&user_edits_path(project_root))
        } else {
            UserEditTracker::new()
        };

        let manager = Self::new(project_root, config, generator, writer);
        *manager.lock_detector() = detector;
        *manager
            .user_edits
            .write()
            .unwrap_or_else(PoisonError::into_inner) = user_edits;
        manager
    }

    pub fn paths(&self) -> &ProjectPaths {
        &self.paths
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Receive every event emitted from now on
    pub fn subscribe(&self) -> Receiver<GenerationEvent> {
        self.events.subscribe()
    }

    /// Ask the running pass to stop before its next component
    pub fn cancel(&self) {
        self.cancel_requested.store(true, Ordering::SeqCst);
    }

    /// Diff the manifest against the cache without generating anything
    pub fn detect_changes(&self, manifest: &Manifest) -> ChangeDetectionResult {
        self.lock_detector().detect_changes(&manifest.components)
    }

    /// Drop the hash cache so the next pass regenerates everything
    pub fn clear_cache(&self) -> Result<()> {
        let mut detector = self.lock_detector();
        detector.clear_cache();
        if self.config.persist_cache {
            detector
                .to_cache_file()
                .save(&hash_cache_path(self.paths.root()))?;
        }
        Ok(())
    }

    /// Record a generated file as hand-edited so passes stop overwriting it
    pub fn mark_user_edit(&self, path: &Path, component_id: Option<&str>) -> Result<()> {
        let relative = self.paths.relative(path);
        let contents = fs_err::read(self.paths.absolute(&relative)).ok();

        self.user_edits
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .mark_edited(&relative, component_id, contents.as_deref())?;

        log::info!("Marked {} as user-edited", relative.display());
        self.events.emit(GenerationEvent::UserEditDetected {
            filepath: relative,
            component_id: component_id.map(str::to_string),
        });
        Ok(())
    }

    /// Allow a previously edited file to be regenerated again.
    /// Returns whether the file was marked.
    pub fn clear_user_edit(&self, path: &Path) -> Result<bool> {
        let relative = self.paths.relative(path);
        let removed = self
            .user_edits
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear_edited(&relative)?;

        match removed {
            Some(info) => {
                log::info!("Cleared user edit on {}", relative.display());
                self.events.emit(GenerationEvent::UserEditCleared {
                    filepath: relative,
                    component_id: info.component_id,
                });
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn is_user_edited(&self, path: &Path) -> bool {
        let relative = self.paths.relative(path);
        self.user_edits
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_edited(&relative)
    }

    /// Snapshot of the user-edit set
    pub fn user_edits(&self) -> Vec<UserEditInfo> {
        self.user_edits
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    /// Regenerate every component, the entry point and (once per session)
    /// the bootstrap file
    pub fn generate_all(&self, manifest: &Manifest) -> GenerationSummary {
        let mut detector = self.lock_detector();
        let started = Instant::now();
        self.cancel_requested.store(false, Ordering::SeqCst);

        let total = manifest.components.len();
        let mut summary = GenerationSummary::new(GenerationMode::Full, total);
        self.events.emit(GenerationEvent::Start {
            mode: GenerationMode::Full,
            total_components: total,
        });

        let components: Vec<&Component> = manifest.components.values().collect();
        let result = self.run_pass(
            manifest,
            &components,
            true,
            &[],
            &mut detector,
            &mut summary,
        );

        self.finish(result, summary, started)
    }

    /// Regenerate only what changed since the last pass.
    ///
    /// Returns a skipped summary, without any generator or writer call, when
    /// nothing changed and the manifest carries no logic context.
    pub fn generate_incremental(&self, manifest: &Manifest) -> GenerationSummary {
        let mut detector = self.lock_detector();
        let changes = detector.detect_changes(&manifest.components);
        let has_logic = manifest.logic_context().is_some();

        if !changes.has_changes() && !has_logic {
            log::debug!("No changes detected; skipping incremental generation");
            return GenerationSummary::skipped(GenerationMode::Incremental);
        }

        let started = Instant::now();
        self.cancel_requested.store(false, Ordering::SeqCst);

        let components: Vec<&Component> = changes
            .to_regenerate()
            .filter_map(|id| manifest.components.get(id))
            .collect();

        let mut summary = GenerationSummary::new(GenerationMode::Incremental, components.len());
        summary.breakdown.added = changes.added.len();
        summary.breakdown.modified = changes.modified.len();
        summary.breakdown.removed = changes.removed.len();

        self.events.emit(GenerationEvent::Start {
            mode: GenerationMode::Incremental,
            total_components: components.len(),
        });

        // Logic data can change without any component changing
        let regenerate_entry = changes.app_needs_update || has_logic;
        let result = self.run_pass(
            manifest,
            &components,
            regenerate_entry,
            &changes.removed,
            &mut detector,
            &mut summary,
        );

        self.finish(result, summary, started)
    }

    fn run_pass(
        &self,
        manifest: &Manifest,
        components: &[&Component],
        regenerate_entry: bool,
        removed: &[ComponentId],
        detector: &mut ChangeDetector,
        summary: &mut GenerationSummary,
    ) -> Result<()> {
        let mut outcome = PassOutcome::default();

        // 1. Generate component sources
        let total = components.len();
        let mut queued: Vec<&Component> = Vec::new();
        let mut requests: Vec<WriteRequest> = Vec::new();

        for (index, component) in components.iter().enumerate() {
            self.check_cancelled()?;

            if self.config.emit_progress {
                self.events.emit(GenerationEvent::Progress {
                    current: index + 1,
                    total,
                    component_id: component.id.clone(),
                    component_name: component.display_name.clone(),
                });
            }

            let relative = self.paths.component_file(&component.display_name);
            if self.check_conflict(&relative, Some(component.id.as_str()), summary) {
                continue;
            }

            match self.generator.generate_component(component, manifest) {
                Ok(content) => {
                    self.note(format_args!("Generated {}: {}", component.id, relative.display()));
                    queued.push(component);
                    requests.push(WriteRequest {
                        filepath: self.paths.absolute(&relative),
                        content,
                    });
                }
                Err(e) => {
                    log::warn!("Generation failed for {}: {}", component.id, e);
                    summary.record_failure(&relative, e);
                    outcome.failed.insert(component.id.clone());
                }
            }
        }
        self.check_cancelled()?;

        // 2. Write them as one batch
        let mut renamed: Vec<PathBuf> = Vec::new();
        if !requests.is_empty() {
            let results = self.writer.write_files(&requests);
            for (i, (component, request)) in queued.iter().zip(&requests).enumerate() {
                let result = results.get(i).cloned().unwrap_or_else(|| {
                    WriteResult::failed(&request.filepath, "writer returned no result")
                });
                if !self.tally(result, summary) {
                    outcome.failed.insert(component.id.clone());
                } else if let Some(previous) = self.previous_file(component, detector) {
                    renamed.push(previous);
                }
            }
        }

        // 3. Files no component generates any more
        let quarantine = self
            .paths
            .trash_dir()
            .join(Utc::now().format("%Y%m%dT%H%M%S%.3f").to_string());
        for id in removed {
            self.retire_removed(id, manifest, detector, &quarantine, summary);
        }
        for previous in &renamed {
            let disposition = self.retire_path(previous, manifest, &quarantine, summary);
            self.note(format_args!(
                "Display name changed; previous file {} {:?}",
                previous.display(),
                disposition
            ));
        }

        // 4. Entry point, composed from the input manifest's roots
        if regenerate_entry {
            self.check_cancelled()?;
            let relative = self.paths.entry_point().to_path_buf();
            if !self.check_conflict(&relative, None, summary) {
                let roots = root_components(manifest);
                match self.generator.generate_entry_point(&roots, manifest.logic_context()) {
                    Ok(content) => {
                        let result = self.writer.write_file(&WriteRequest {
                            filepath: self.paths.absolute(&relative),
                            content,
                        });
                        if self.tally(result, summary) {
                            summary.breakdown.entry_point_regenerated = true;
                            self.note(format_args!(
                                "Regenerated entry point with {} roots",
                                roots.len()
                            ));
                        } else {
                            outcome.entry_point_failed = true;
                        }
                    }
                    Err(e) => {
                        log::warn!("Entry point generation failed: {}", e);
                        summary.record_failure(&relative, e);
                        outcome.entry_point_failed = true;
                    }
                }
            }
        }

        // 5. Bootstrap, once per session
        if !self.bootstrap_generated.load(Ordering::SeqCst) {
            self.generate_bootstrap(summary);
        }

        // 6. Snapshot the manifest; failed components stay stale for a retry
        detector.update_cache_except(&manifest.components, &outcome.failed);
        if outcome.entry_point_failed {
            detector.mark_entry_point_stale();
        }
        if self.config.persist_cache {
            detector
                .to_cache_file()
                .save(&hash_cache_path(self.paths.root()))?;
        }

        Ok(())
    }

    fn generate_bootstrap(&self, summary: &mut GenerationSummary) {
        let relative = self.paths.bootstrap().to_path_buf();
        if self.check_conflict(&relative, None, summary) {
            // Report the conflict once per session, not on every pass
            self.bootstrap_generated.store(true, Ordering::SeqCst);
            return;
        }

        match self.generator.generate_bootstrap() {
            Ok(content) => {
                let result = self.writer.write_file(&WriteRequest {
                    filepath: self.paths.absolute(&relative),
                    content,
                });
                if self.tally(result, summary) {
                    self.bootstrap_generated.store(true, Ordering::SeqCst);
                }
            }
            Err(e) => {
                log::warn!("Bootstrap generation failed: {}", e);
                summary.record_failure(&relative, e);
            }
        }
    }

    /// Apply the removed-file policy to a component that left the manifest
    fn retire_removed(
        &self,
        id: &ComponentId,
        manifest: &Manifest,
        detector: &ChangeDetector,
        quarantine: &Path,
        summary: &mut GenerationSummary,
    ) {
        let relative: Option<PathBuf> = detector
            .cached_entry(id)
            .map(|entry| self.paths.component_file(&entry.display_name));

        let disposition = match &relative {
            None => RemovalDisposition::Retained,
            Some(relative) => self.retire_path(relative, manifest, quarantine, summary),
        };

        self.note(format_args!("Component {} removed ({:?})", id, disposition));
        self.events.emit(GenerationEvent::ComponentRemoved {
            component_id: id.clone(),
            filepath: relative,
            disposition,
        });
    }

    /// Apply the removed-file policy to a generated file nothing owns any more
    fn retire_path(
        &self,
        relative: &Path,
        manifest: &Manifest,
        quarantine: &Path,
        summary: &mut GenerationSummary,
    ) -> RemovalDisposition {
        if self.is_user_edited(relative) {
            return RemovalDisposition::PreservedUserEdit;
        }

        // Another component now generates the same file
        let reused = manifest
            .components
            .values()
            .any(|c| self.paths.component_file(&c.display_name) == relative);
        if reused {
            return RemovalDisposition::Retained;
        }

        let target = match self.config.removed_files {
            RemovedFilePolicy::Retain => return RemovalDisposition::Retained,
            RemovedFilePolicy::Quarantine => Some(quarantine),
            RemovedFilePolicy::Delete => None,
        };

        let result = self.writer.retire_file(&self.paths.absolute(relative), target);
        if result.success {
            RemovalDisposition::for_policy(self.config.removed_files)
        } else {
            let error = result.error.unwrap_or_else(|| "unknown error".to_string());
            log::warn!("Could not retire {}: {}", relative.display(), error);
            summary.record_failure(relative, error);
            RemovalDisposition::Failed
        }
    }

    /// File generated for `component` before its display name changed
    fn previous_file(&self, component: &Component, detector: &ChangeDetector) -> Option<PathBuf> {
        let current = self.paths.component_file(&component.display_name);
        detector
            .cached_entry(&component.id)
            .map(|entry| self.paths.component_file(&entry.display_name))
            .filter(|previous| *previous != current)
    }

    /// Skip `relative` if the user edited it. Returns true when skipped.
    fn check_conflict(
        &self,
        relative: &Path,
        component_id: Option<&str>,
        summary: &mut GenerationSummary,
    ) -> bool {
        if !self.is_user_edited(relative) {
            return false;
        }

        let message = format!(
            "{} has manual edits and was not regenerated; clear the edit to overwrite it",
            relative.display()
        );
        log::warn!("{}", message);

        summary.conflicts += 1;
        self.events.emit(GenerationEvent::UserEditConflict {
            conflict: UserEditConflict {
                filepath: relative.to_path_buf(),
                component_id: component_id.map(str::to_string),
                message,
            },
        });
        true
    }

    /// Count a write result; returns whether it succeeded
    fn tally(&self, result: WriteResult, summary: &mut GenerationSummary) -> bool {
        let relative = self.paths.relative(&result.filepath);
        if result.success {
            summary.files_written += 1;
            true
        } else {
            let error = result.error.unwrap_or_else(|| "unknown error".to_string());
            log::warn!("Write failed for {}: {}", relative.display(), error);
            summary.record_failure(&relative, error);
            false
        }
    }

    fn finish(
        &self,
        result: Result<()>,
        mut summary: GenerationSummary,
        started: Instant,
    ) -> GenerationSummary {
        summary.duration = started.elapsed();

        match result {
            Ok(()) => {
                log::info!("{}", summary);
                self.events.emit(GenerationEvent::Complete {
                    summary: summary.clone(),
                });
            }
            Err(e) => {
                let error = format!("{:#}", e);
                log::error!("Generation pass aborted: {}", error);
                summary.record_failure(self.paths.root(), &error);
                self.events.emit(GenerationEvent::Error { error });
            }
        }

        summary
    }

    fn check_cancelled(&self) -> Result<()> {
        if self.cancel_requested.swap(false, Ordering::SeqCst) {
            return Err(ManifestrsError::Cancelled.into());
        }
        Ok(())
    }

    fn note(&self, args: std::fmt::Arguments<'_>) {
        if self.config.debug {
            log::info!("{}", args);
        } else {
            log::debug!("{}", args);
        }
    }

    fn lock_detector(&self) -> MutexGuard<'_, ChangeDetector> {
        self.detector.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::ReactGenerator;
    use crate::writer::FsFileWriter;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn manifest() -> Manifest {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Manifest::new()
            .with_component(
                Component::new("a", "Shell", "main")
                    .with_children(["b"])
                    .with_timestamps(at),
            )
            .with_component(Component::new("b", "Greeting", "p").with_timestamps(at))
    }

    fn manager(root: &Path) -> FileManager<ReactGenerator, FsFileWriter> {
        let config = GenerationConfig::default();
        let generator = ReactGenerator::new(&config.paths);
        FileManager::open(root, config, generator, FsFileWriter::new(2))
    }

    #[test]
    fn test_generate_all_writes_project_files() {
        let temp_dir = TempDir::new().unwrap();
        let manager = manager(temp_dir.path());

        let summary = manager.generate_all(&manifest());

        assert!(summary.is_success(), "{:?}", summary.errors);
        // two components, entry point, bootstrap
        assert_eq!(summary.files_written, 4);
        assert!(summary.breakdown.entry_point_regenerated);
        let root = temp_dir.path();
        assert!(root.join("src/components/Shell.tsx").exists());
        assert!(root.join("src/components/Greeting.tsx").exists());
        assert!(root.join("src/main.tsx").exists());
        let app = fs_err::read_to_string(root.join("src/App.tsx")).unwrap();
        assert!(app.contains("<Shell />"));
        assert!(!app.contains("<Greeting />"));
        assert!(hash_cache_path(root).exists());
    }

    #[test]
    fn test_cache_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        manager(temp_dir.path()).generate_all(&manifest());

        let reopened = manager(temp_dir.path());
        let summary = reopened.generate_incremental(&manifest());

        assert!(summary.skipped);
    }

    #[test]
    fn test_mark_user_edit_accepts_absolute_paths() {
        let temp_dir = TempDir::new().unwrap();
        let manager = manager(temp_dir.path());
        let absolute = temp_dir.path().join("src/App.tsx");

        manager.mark_user_edit(&absolute, None).unwrap();

        assert!(manager.is_user_edited(Path::new("src/App.tsx")));
        assert_eq!(
            manager.user_edits()[0].filepath,
            PathBuf::from("src/App.tsx")
        );
        assert!(manager.clear_user_edit(Path::new("src/App.tsx")).unwrap());
        assert!(!manager.clear_user_edit(Path::new("src/App.tsx")).unwrap());
    }

    #[test]
    fn test_removed_component_is_quarantined() {
        let temp_dir = TempDir::new().unwrap();
        let manager = manager(temp_dir.path());
        manager.generate_all(&manifest());

        let mut smaller = manifest();
        smaller.components.remove("b");
        let summary = manager.generate_incremental(&smaller);

        assert_eq!(summary.breakdown.removed, 1);
        assert!(!temp_dir.path().join("src/components/Greeting.tsx").exists());
        let trash = manager.paths().trash_dir();
        let batch = fs_err::read_dir(&trash).unwrap().next().unwrap().unwrap();
        assert!(batch.path().join("Greeting.tsx").exists());
    }
}
