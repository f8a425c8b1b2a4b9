// manifestrs/src/config/settings.rs

use crate::constants::{DEFAULT_CONFIG_NAME, MANIFESTRS_DIR, TRASH_DIR};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Component as PathComponent, Path, PathBuf};

/// Generation settings, read from manifestrs.yml
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Upper bound on concurrent file writes
    pub max_concurrency: usize,

    /// Keep the user-edit set in .manifestrs/user-edits.json
    pub persist_user_edits: bool,

    /// Keep the hash cache in .manifestrs/hash-cache.json
    pub persist_cache: bool,

    /// Emit generation:progress per component
    pub emit_progress: bool,

    pub debug: bool,

    /// What happens to the generated file of a removed component
    pub removed_files: RemovedFilePolicy,

    pub paths: PathsConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemovedFilePolicy {
    /// Leave the file where it is
    Retain,
    /// Move the file under .manifestrs/trash/
    Quarantine,
    Delete,
}

/// Project-relative locations of generated files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub components_dir: PathBuf,
    pub entry_point: PathBuf,
    pub bootstrap: PathBuf,
    pub component_extension: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 8,
            persist_user_edits: true,
            persist_cache: true,
            emit_progress: true,
            debug: false,
            removed_files: RemovedFilePolicy::Quarantine,
            paths: PathsConfig::default(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            components_dir: PathBuf::from("src/components"),
            entry_point: PathBuf::from("src/App.tsx"),
            bootstrap: PathBuf::from("src/main.tsx"),
            component_extension: "tsx".to_string(),
        }
    }
}

impl GenerationConfig {
    /// Load manifestrs.yml from the project root, falling back to defaults
    pub fn load(project_root: &Path) -> anyhow::Result<Self> {
        let path = project_root.join(DEFAULT_CONFIG_NAME);
        if !path.exists() {
            log::debug!("No {} found, using default settings", path.display());
            return Ok(Self::default());
        }
        Self::try_from(path.as_path())
    }

    /// Concurrency bound, never below one
    pub fn effective_concurrency(&self) -> usize {
        self.max_concurrency.max(1)
    }
}

impl TryFrom<&Path> for GenerationConfig {
    type Error = anyhow::Error;

    fn try_from(path: &Path) -> anyhow::Result<Self> {
        let content = fs_err::read_to_string(path)
            .context(format!("Error reading {} to string.", path.display()))?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_saphyr::from_str::<GenerationConfig>(&content)
            .context(format!("Error parsing YAML file: {}", path.display()))
    }
}

/// Resolved locations for one project
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectPaths {
    root: PathBuf,
    components_dir: PathBuf,
    entry_point: PathBuf,
    bootstrap: PathBuf,
    extension: String,
}

impl ProjectPaths {
    pub fn new(project_root: &Path, config: &PathsConfig) -> Self {
        let extension = config.component_extension.trim_start_matches('.');
        Self {
            root: project_root.to_path_buf(),
            components_dir: config.components_dir.clone(),
            entry_point: config.entry_point.clone(),
            bootstrap: config.bootstrap.clone(),
            extension: extension.to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Project-relative path of the file generated for a component
    pub fn component_file(&self, display_name: &str) -> PathBuf {
        let file_name = format!("{}.{}", component_file_stem(display_name), self.extension);
        self.components_dir.join(file_name)
    }

    /// Project-relative entry point path
    pub fn entry_point(&self) -> &Path {
        &self.entry_point
    }

    /// Project-relative bootstrap path
    pub fn bootstrap(&self) -> &Path {
        &self.bootstrap
    }

    pub fn state_dir(&self) -> PathBuf {
        self.root.join(MANIFESTRS_DIR)
    }

    pub fn trash_dir(&self) -> PathBuf {
        self.state_dir().join(TRASH_DIR)
    }

    pub fn absolute(&self, relative: &Path) -> PathBuf {
        self.root.join(relative)
    }

    /// Express `path` relative to the project root when it lies inside it
    pub fn relative(&self, path: &Path) -> PathBuf {
        let stripped = path.strip_prefix(&self.root).unwrap_or(path);
        stripped
            .components()
            .filter(|part| !matches!(part, PathComponent::CurDir))
            .collect()
    }
}

/// File stem used for a component's generated file and its import
pub fn component_file_stem(display_name: &str) -> String {
    let stem: String = display_name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();

    match stem.chars().next() {
        None => "Component".to_string(),
        Some(first) if first.is_ascii_digit() => format!("C{}", stem),
        Some(_) => stem,
    }
}
