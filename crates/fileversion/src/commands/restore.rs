//! `restore` command handler.

use super::report_failure;
use fileversion_core::FileVersioning;
use std::path::{Path, PathBuf};

/// Restore each version file to `target`.
///
/// With several versions the target is overwritten in turn, so the last
/// one given wins.
pub fn handle_restore(versioning: &FileVersioning, paths: &[PathBuf], target: &Path) -> usize {
    let mut failures = 0;

    for path in paths {
        match versioning.restore_version(path, target) {
            Ok(()) => println!("Restored {} to {}", path.display(), target.display()),
            Err(e) => {
                report_failure(path, e);
                failures += 1;
            }
        }
    }

    failures
}
