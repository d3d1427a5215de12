//! Cache key normalization
//!
//! Keys are absolute paths with `.` and `..` removed lexically. Symlinks are
//! not resolved, so a file that has already been removed still normalizes to
//! the key it was cached under.

use std::env;
use std::path::{Component, Path, PathBuf};

use super::error::{FileCacheError, Result};

/// Normalize `path` into the form used as a cache key.
///
/// Relative paths are resolved against the current working directory.
pub fn normalize(path: &Path) -> Result<PathBuf> {
    if path.as_os_str().is_empty() {
        return Err(FileCacheError::InvalidPath {
            path: path.to_path_buf(),
            reason: "empty path".to_string(),
        });
    }

    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        let cwd = env::current_dir().map_err(|e| FileCacheError::InvalidPath {
            path: path.to_path_buf(),
            reason: format!("cannot resolve working directory: {}", e),
        })?;
        cwd.join(path)
    };

    Ok(lexical_clean(&absolute))
}

/// Remove `.` and `..` components without touching the filesystem.
///
/// `..` at the root stays at the root.
fn lexical_clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                }
            }
            Component::Normal(part) => out.push(part),
        }
    }
    out
}
