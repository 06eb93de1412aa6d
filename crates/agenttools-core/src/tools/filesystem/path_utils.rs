//! Path helpers for workspace-confined file tools.
//!
//! - Displaying paths consistently across platforms
//! - Lexically normalizing paths
//! - Resolving tool arguments against the workspace root

use std::path::{Component, Path, PathBuf};

use crate::error::ToolError;

/// Convert a path to a display string with consistent forward slash separators.
pub fn path_to_display(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Normalize a path by resolving `.` and `..` components without touching the filesystem.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut components = Vec::new();

    for component in path.components() {
        match component {
            Component::Prefix(p) => components.push(Component::Prefix(p)),
            Component::RootDir => {
                components.retain(|c| matches!(c, Component::Prefix(_)));
                components.push(Component::RootDir);
            }
            Component::CurDir => {}
            Component::ParentDir => match components.last() {
                // Can't go above root
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                Some(Component::Normal(_)) | Some(Component::CurDir) => {
                    components.pop();
                }
                Some(Component::ParentDir) | None => components.push(Component::ParentDir),
            },
            Component::Normal(c) => components.push(Component::Normal(c)),
        }
    }

    if components.is_empty() {
        PathBuf::from(".")
    } else {
        components.iter().collect()
    }
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize_path(path)
    } else {
        std::env::current_dir()
            .map(|cwd| normalize_path(&cwd.join(path)))
            .unwrap_or_else(|_| normalize_path(path))
    }
}

/// Resolve a tool path argument against the workspace.
///
/// Relative paths are joined to the workspace, absolute paths are taken as
/// given; either way the result must stay inside the workspace, both
/// lexically and after following symlinks. The file does not need to exist.
pub fn resolve_in_workspace(workspace: &Path, path_str: &str) -> Result<PathBuf, ToolError> {
    let trimmed = path_str.trim();
    if trimmed.is_empty() {
        return Err(ToolError::InvalidParams("path must not be empty".into()));
    }

    let workspace_abs = absolute(workspace);
    let resolved = normalize_path(&workspace_abs.join(trimmed));

    if !resolved.starts_with(&workspace_abs) {
        return Err(outside(trimmed, workspace));
    }

    let real_workspace = real_path(&workspace_abs).unwrap_or_else(|| workspace_abs.clone());
    match real_path(&resolved) {
        Some(real) if real.starts_with(&real_workspace) => Ok(resolved),
        _ => Err(outside(trimmed, workspace)),
    }
}

/// Where `path` lands once symlinks are followed, even if it does not exist yet.
///
/// The deepest existing ancestor is canonicalized and the missing tail is
/// re-appended. Returns `None` for a dangling symlink, whose target cannot
/// be checked.
fn real_path(path: &Path) -> Option<PathBuf> {
    let mut missing = Vec::new();
    let mut current = path;
    loop {
        match current.canonicalize() {
            Ok(mut real) => {
                real.extend(missing.iter().rev());
                return Some(real);
            }
            Err(_) if current.symlink_metadata().is_ok() => return None,
            Err(_) => {
                missing.push(current.file_name()?.to_os_string());
                current = current.parent()?;
            }
        }
    }
}

/// Like [`resolve_in_workspace`] but the target must already exist
pub fn resolve_existing(workspace: &Path, path_str: &str) -> Result<PathBuf, ToolError> {
    let resolved = resolve_in_workspace(workspace, path_str)?;
    if !resolved.exists() {
        return Err(ToolError::ResourceNotFound(format!(
            "File not found: {}",
            path_to_display(&resolved)
        )));
    }
    Ok(resolved)
}

/// Create the parent directory of `path` if it is missing
pub async fn ensure_parent(path: &Path) -> Result<(), ToolError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    Ok(())
}

/// Lower-cased file extension, or an empty string
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

fn outside(path_str: &str, workspace: &Path) -> ToolError {
    ToolError::PermissionDenied(format!(
        "Path {} is outside workspace {}",
        path_str,
        path_to_display(workspace)
    ))
}
