// manifestrs/src/cli/init.rs

use crate::constants::{DEFAULT_CONFIG_NAME, DEFAULT_MANIFEST_NAME};
use crate::state::project::{is_initialized, state_dir};
use anyhow::Context;
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# manifestrs settings
max_concurrency: 8
persist_user_edits: true
persist_cache: true
emit_progress: true
debug: false
# retain | quarantine | delete
removed_files: quarantine
paths:
  components_dir: src/components
  entry_point: src/App.tsx
  bootstrap: src/main.tsx
  component_extension: tsx
"#;

const EMPTY_MANIFEST: &str = "{\n  \"components\": {}\n}\n";

/// Initialize a manifestrs project in the given directory
pub fn init_project(project_root: &Path) -> anyhow::Result<()> {
    if is_initialized(project_root) {
        anyhow::bail!(
            "The project at {} is already initialized",
            project_root.display()
        );
    }

    println!("Initializing project in: {}", project_root.display());

    let dir = state_dir(project_root);
    fs_err::create_dir_all(&dir)
        .context(format!("Failed to create state directory: {}", dir.display()))?;
    println!("  ✓ Created {}", dir.display());

    create_state_gitignore(project_root)?;

    let config_path = project_root.join(DEFAULT_CONFIG_NAME);
    if !config_path.exists() {
        fs_err::write(&config_path, DEFAULT_CONFIG)
            .context(format!("Error writing file {}", config_path.display()))?;
        println!("  ✓ Created {}", DEFAULT_CONFIG_NAME);
    }

    let manifest_path = project_root.join(DEFAULT_MANIFEST_NAME);
    if !manifest_path.exists() {
        fs_err::write(&manifest_path, EMPTY_MANIFEST)
            .context(format!("Error writing file {}", manifest_path.display()))?;
        println!("  ✓ Created {}", DEFAULT_MANIFEST_NAME);
    }

    Ok(())
}

/// Keep quarantined files out of version control
fn create_state_gitignore(project_root: &Path) -> anyhow::Result<()> {
    let gitignore_path = state_dir(project_root).join(".gitignore");

    let gitignore_content = r#"# Quarantined files of removed components
trash/
"#;

    fs_err::write(&gitignore_path, gitignore_content)
        .context(format!("Error writing file {}", gitignore_path.display()))?;

    Ok(())
}
