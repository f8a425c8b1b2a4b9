// manifestrs/src/cli/edits.rs

use super::{ensure_initialized, open_project, Overrides};
use std::path::Path;

/// Protect a generated file from being overwritten
pub fn mark_edited(
    project_root: &Path,
    path: &Path,
    component_id: Option<&str>,
    overrides: &Overrides,
) -> anyhow::Result<()> {
    ensure_initialized(project_root)?;
    let manager = open_project(project_root, overrides)?;
    if !manager.config().persist_user_edits {
        log::warn!("persist_user_edits is disabled; the mark will not outlive this command");
    }
    manager.mark_user_edit(path, component_id)?;
    println!(
        "✓ {} marked as user-edited",
        manager.paths().relative(path).display()
    );
    Ok(())
}

/// Let generation overwrite a previously protected file again
pub fn clear_edited(project_root: &Path, path: &Path, overrides: &Overrides) -> anyhow::Result<()> {
    let manager = open_project(project_root, overrides)?;
    let relative = manager.paths().relative(path);
    if manager.clear_user_edit(path)? {
        println!("✓ {} will be regenerated", relative.display());
    } else {
        println!("{} was not marked as user-edited", relative.display());
    }
    Ok(())
}

/// List the protected files
pub fn list_edits(project_root: &Path, overrides: &Overrides) -> anyhow::Result<()> {
    let manager = open_project(project_root, overrides)?;
    let edits = manager.user_edits();

    if edits.is_empty() {
        println!("No user-edited files");
        return Ok(());
    }

    for edit in edits {
        println!(
            "{}  {}  {}",
            edit.filepath.display(),
            edit.component_id.as_deref().unwrap_or("-"),
            edit.detected_at.format("%Y-%m-%d %H:%M:%S")
        );
    }
    Ok(())
}

/// Drop the hash cache so the next pass regenerates everything
pub fn clean_cache(project_root: &Path, overrides: &Overrides) -> anyhow::Result<()> {
    ensure_initialized(project_root)?;
    let manager = open_project(project_root, overrides)?;
    manager.clear_cache()?;
    println!("✓ Hash cache cleared");
    Ok(())
}
