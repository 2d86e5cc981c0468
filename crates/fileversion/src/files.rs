//! Expansion of file arguments.

use std::path::PathBuf;

/// Expand glob patterns into concrete paths.
///
/// A pattern that matches nothing (or is not a valid glob) is kept as a
/// literal path so the engine can report it as missing.
pub fn expand_patterns(patterns: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let mut expanded = Vec::new();

    for pattern in patterns {
        let normalized = pattern.replace('\\', "/");
        let matches: Vec<PathBuf> = match glob::glob(&normalized) {
            Ok(paths) => paths.filter_map(Result::ok).collect(),
            Err(e) => {
                tracing::debug!(pattern = %pattern, error = %e, "Not a glob pattern");
                Vec::new()
            }
        };

        if matches.is_empty() {
            expanded.push(PathBuf::from(pattern));
        } else {
            expanded.extend(matches);
        }
    }

    if expanded.is_empty() {
        anyhow::bail!("No files match the specified patterns");
    }

    Ok(expanded)
}
