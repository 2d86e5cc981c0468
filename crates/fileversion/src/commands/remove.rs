//! `remove` command handler.

use super::report_failure;
use fileversion_core::FileVersioning;
use std::path::PathBuf;

/// Delete each version file.
pub fn handle_remove(versioning: &FileVersioning, paths: &[PathBuf]) -> usize {
    let mut failures = 0;

    for path in paths {
        match versioning.remove_version(path) {
            Ok(()) => println!("Removed version: {}", path.display()),
            Err(e) => {
                report_failure(path, e);
                failures += 1;
            }
        }
    }

    failures
}
