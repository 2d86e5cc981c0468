//! Path utilities.

use std::io;
use std::path::{Path, PathBuf};

/// Check if a path resolves to a location inside a base directory.
///
/// Both paths are canonicalized, so symlinks and `..` components cannot be
/// used to escape `base`. A path that cannot be resolved is never within.
pub fn is_within(path: &Path, base: &Path) -> bool {
    match (path.canonicalize(), base.canonicalize()) {
        (Ok(p), Ok(b)) => p.starts_with(&b),
        _ => false,
    }
}

/// Resolve a path to an absolute one without requiring it to exist.
///
/// Existing paths are canonicalized; otherwise the path is joined onto the
/// current directory and normalized.
pub fn absolute(path: &Path) -> io::Result<PathBuf> {
    if let Ok(canonical) = path.canonicalize() {
        return Ok(canonical);
    }
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };
    Ok(normalize(&joined))
}

/// Normalize a path by removing `.` and `..` components.
///
/// Unlike `canonicalize`, this doesn't require the path to exist.
pub fn normalize(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();

    for component in path.components() {
        match component {
            std::path::Component::ParentDir => {
                result.pop();
            }
            std::path::Component::CurDir => {}
            _ => {
                result.push(component);
            }
        }
    }

    result
}
