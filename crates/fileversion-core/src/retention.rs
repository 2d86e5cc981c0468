//! Retention policy: prune old versions beyond a maximum count.

use crate::config::{TimestampSource, TimezoneFormat};
use crate::filename::base_prefix;
use crate::record::{matching_paths, VersionRecord};
use crate::VersionResult;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Advisory produced by retention. Never fails the version that triggered it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetentionWarning {
    /// Versions of one file use more than one timezone format.
    MixedTimezones(Vec<TimezoneFormat>),
    /// Versions of one file use more than one timestamp source.
    MixedSources(Vec<TimestampSource>),
    /// An entry matching the file's prefix could not be analyzed.
    Unreadable { path: PathBuf, reason: String },
    /// A version selected for pruning could not be deleted.
    RemoveFailed { path: PathBuf, reason: String },
    /// The versions directory could not be scanned, so nothing was pruned.
    ScanFailed { dir: PathBuf, reason: String },
}

impl fmt::Display for RetentionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetentionWarning::MixedTimezones(values) => {
                let tags: Vec<&str> = values.iter().map(|v| v.tag()).collect();
                write!(f, "Multiple timezone types not allowed: {}", tags.join(", "))
            }
            RetentionWarning::MixedSources(values) => {
                let tags: Vec<&str> = values.iter().map(|v| v.tag()).collect();
                write!(f, "Multiple source types not allowed: {}", tags.join(", "))
            }
            RetentionWarning::Unreadable { path, reason } => {
                write!(f, "Error analyzing {}: {reason}", path.display())
            }
            RetentionWarning::RemoveFailed { path, reason } => {
                write!(f, "Failed to remove {}: {reason}", path.display())
            }
            RetentionWarning::ScanFailed { dir, reason } => {
                write!(f, "Retention skipped, cannot scan {}: {reason}", dir.display())
            }
        }
    }
}

/// Result of applying a retention limit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetentionReport {
    /// Number of versions deleted.
    pub removed: usize,
    pub warnings: Vec<RetentionWarning>,
}

impl RetentionReport {
    /// Whether the consistency check blocked pruning.
    pub fn is_conflict(&self) -> bool {
        self.warnings.iter().any(|w| {
            matches!(
                w,
                RetentionWarning::MixedTimezones(_) | RetentionWarning::MixedSources(_)
            )
        })
    }
}

/// Keep at most `max_versions` versions of `base_name`, deleting the oldest.
///
/// Returns `Ok(None)` when there is no limit. Pruning is skipped entirely,
/// with a warning, if the existing versions disagree on timezone format or
/// timestamp source: timestamps from different conventions do not order.
pub fn apply_retention(
    versions_dir: &Path,
    base_name: &str,
    max_versions: Option<usize>,
    delimiter: &str,
) -> VersionResult<Option<RetentionReport>> {
    let Some(max_versions) = max_versions else {
        return Ok(None);
    };

    let mut report = RetentionReport::default();
    let mut records = Vec::new();

    for path in matching_paths(versions_dir, &base_prefix(base_name, delimiter))? {
        match VersionRecord::from_path(&path, delimiter) {
            Ok(record) if record.base_name == base_name => records.push(record),
            Ok(_) => {}
            Err(e) if e.is_not_found() => {}
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Cannot analyze version");
                report.warnings.push(RetentionWarning::Unreadable {
                    path,
                    reason: e.to_string(),
                });
            }
        }
    }

    let timezones = distinct(records.iter().map(|r| r.timezone_format), |v| v.tag());
    if timezones.len() > 1 {
        let warning = RetentionWarning::MixedTimezones(timezones);
        warn!(base = base_name, "{warning}");
        report.warnings.push(warning);
        return Ok(Some(report));
    }

    let sources = distinct(records.iter().map(|r| r.timestamp_source), |v| v.tag());
    if sources.len() > 1 {
        let warning = RetentionWarning::MixedSources(sources);
        warn!(base = base_name, "{warning}");
        report.warnings.push(warning);
        return Ok(Some(report));
    }

    records.sort_by(VersionRecord::newest_first);

    for record in records.iter().skip(max_versions).rev() {
        match fs::remove_file(&record.path) {
            Ok(()) => {
                debug!(path = %record.path.display(), "Pruned version");
                report.removed += 1;
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %record.path.display(), "Version already gone");
            }
            Err(e) => {
                warn!(path = %record.path.display(), error = %e, "Failed to prune version");
                report.warnings.push(RetentionWarning::RemoveFailed {
                    path: record.path.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    if report.removed > 0 {
        info!(base = base_name, removed = report.removed, "Pruned old versions");
    }

    Ok(Some(report))
}

/// Distinct values, ordered by tag.
fn distinct<T, I, K>(values: I, key: K) -> Vec<T>
where
    T: PartialEq,
    I: Iterator<Item = T>,
    K: Fn(&T) -> &'static str,
{
    let mut unique: Vec<T> = Vec::new();
    for value in values {
        if !unique.contains(&value) {
            unique.push(value);
        }
    }
    unique.sort_by_key(|v| key(v));
    unique
}
