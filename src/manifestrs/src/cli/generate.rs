// manifestrs/src/cli/generate.rs

use super::{ensure_initialized, load_manifest, open_project, resolve_manifest_path, Overrides};
use crate::error::ManifestrsError;
use crate::orchestrator::{GenerationEvent, RemovalDisposition};
use crate::state::project::is_initialized;
use std::path::Path;

/// Run a generation pass over the project's manifest
pub fn generate_project(
    project_root: &Path,
    manifest: Option<&Path>,
    full: bool,
    overrides: &Overrides,
) -> anyhow::Result<()> {
    ensure_initialized(project_root)?;

    let manifest_path = resolve_manifest_path(project_root, manifest);
    let manifest = load_manifest(&manifest_path)?;

    let manager = open_project(project_root, overrides)?;
    let events = manager.subscribe();

    let summary = if full {
        manager.generate_all(&manifest)
    } else {
        manager.generate_incremental(&manifest)
    };

    for event in events.try_iter() {
        match event {
            GenerationEvent::UserEditConflict { conflict } => {
                println!("  ! {}", conflict.message);
            }
            GenerationEvent::ComponentRemoved {
                component_id,
                filepath: Some(filepath),
                disposition,
            } if disposition != RemovalDisposition::Retained => {
                println!(
                    "  - {} ({}): {:?}",
                    filepath.display(),
                    component_id,
                    disposition
                );
            }
            _ => {}
        }
    }

    if summary.skipped {
        println!("✓ Up to date, nothing to generate");
        return Ok(());
    }

    println!("{}", summary);

    if !summary.is_success() {
        for failure in &summary.errors {
            eprintln!("  ✗ {}: {}", failure.filepath.display(), failure.error);
        }
        anyhow::bail!("{} file(s) failed to generate", summary.files_failed);
    }

    println!("✓ Generation complete");
    Ok(())
}

/// Print what the next incremental pass would regenerate
pub fn status_project(
    project_root: &Path,
    manifest: Option<&Path>,
    overrides: &Overrides,
) -> anyhow::Result<()> {
    if !is_initialized(project_root) {
        return Err(ManifestrsError::NotInitialized(project_root.to_path_buf()).into());
    }

    let manifest_path = resolve_manifest_path(project_root, manifest);
    let manifest = load_manifest(&manifest_path)?;

    let manager = open_project(project_root, overrides)?;
    let changes = manager.detect_changes(&manifest);

    if !changes.has_changes() {
        println!("✓ Up to date");
        return Ok(());
    }

    println!("{}", changes.summary());

    Ok(())
}
