//! Filesystem tools for reading and writing workspace files

mod ensure_dir;
mod path_utils;
mod read;
mod write;

pub use ensure_dir::EnsureDir;
pub use read::ReadFile;
pub use write::{AppendFile, WriteFile};

// Re-export path utilities for use by other tool families
pub use path_utils::{
    ensure_parent, extension_of, normalize_path, path_to_display, resolve_existing,
    resolve_in_workspace,
};
