//! `create` command handler.

use super::report_failure;
use fileversion_core::FileVersioning;
use std::path::PathBuf;

/// Create a version of each file.
pub fn handle_create(versioning: &FileVersioning, paths: &[PathBuf]) -> usize {
    let mut failures = 0;

    for path in paths {
        match versioning.create_version(path) {
            Ok(created) => {
                println!("Created version: {}", created.path.display());
                if created.removed > 0 {
                    println!("Removed {} version(s)", created.removed);
                } else if let Some(warning) = created.warning() {
                    println!("Warning: {warning}");
                }
            }
            Err(e) => {
                report_failure(path, e);
                failures += 1;
            }
        }
    }

    failures
}
