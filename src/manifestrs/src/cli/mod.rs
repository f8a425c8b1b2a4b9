// manifestrs/src/cli/mod.rs

pub mod edits;
pub mod generate;
pub mod init;

pub use edits::{clean_cache, clear_edited, list_edits, mark_edited};
pub use generate::{generate_project, status_project};
pub use init::init_project;

use crate::codegen::ReactGenerator;
use crate::config::GenerationConfig;
use crate::constants::DEFAULT_MANIFEST_NAME;
use crate::error::ManifestrsError;
use crate::manifest::Manifest;
use crate::orchestrator::FileManager;
use crate::state::project::is_initialized;
use crate::writer::FsFileWriter;
use std::path::{Path, PathBuf};

/// File manager wired with the bundled generator and filesystem writer
pub type ProjectFileManager = FileManager<ReactGenerator, FsFileWriter>;

/// Settings given on the command line, applied over manifestrs.yml
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub max_concurrency: Option<usize>,
    pub debug: bool,
}

/// Load settings and build the project's file manager
pub fn open_project(
    project_root: &Path,
    overrides: &Overrides,
) -> anyhow::Result<ProjectFileManager> {
    let mut config = GenerationConfig::load(project_root)?;
    if let Some(max_concurrency) = overrides.max_concurrency {
        config.max_concurrency = max_concurrency;
    }
    if overrides.debug {
        config.debug = true;
    }

    let generator = ReactGenerator::new(&config.paths);
    let writer = FsFileWriter::new(config.effective_concurrency());
    Ok(FileManager::open(project_root, config, generator, writer))
}

/// Run `init` first when the project has no state directory yet.
///
/// Commands that save a sidecar would otherwise create `.manifestrs/` on
/// their own and leave the project without its settings file.
pub fn ensure_initialized(project_root: &Path) -> anyhow::Result<()> {
    if !is_initialized(project_root) {
        log::info!("Project not initialized. Running init...");
        init_project(project_root)?;
    }
    Ok(())
}

/// Manifest path given on the command line, or the project default
pub fn resolve_manifest_path(project_root: &Path, manifest: Option<&Path>) -> PathBuf {
    match manifest {
        Some(path) if path.is_absolute() => path.to_path_buf(),
        Some(path) => project_root.join(path),
        None => project_root.join(DEFAULT_MANIFEST_NAME),
    }
}

/// Load the manifest at `path`, failing early when it does not exist
pub fn load_manifest(path: &Path) -> anyhow::Result<Manifest> {
    if !path.is_file() {
        return Err(ManifestrsError::ManifestNotFound(path.to_path_buf()).into());
    }
    Manifest::try_from(path)
}
