//! Versioning service: create, restore, list and remove versions.

use crate::compression::{compress_file, decompress_file};
use crate::config::{TimestampSource, TimezoneFormat, VersioningConfig};
use crate::error::IoContext;
use crate::filename::{base_prefix, format_timestamp, VersionName};
use crate::record::{matching_paths, VersionRecord};
use crate::retention::{apply_retention, RetentionReport, RetentionWarning};
use crate::sequence::next_sequence;
use crate::{VersionError, VersionResult};
use chrono::{DateTime, Local, Utc};
use fileversion_util::path::{absolute, is_within};
use std::fs::{self, Metadata};
use std::path::{Path, PathBuf};
use std::time::{Instant, SystemTime};
use tracing::{debug, info};

/// Outcome of [`FileVersioning::create_version`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedVersion {
    /// Absolute path of the new version file.
    pub path: PathBuf,
    /// Old versions pruned by retention.
    pub removed: usize,
    /// Retention advisories. The version was created regardless.
    pub warnings: Vec<RetentionWarning>,
}

impl CreatedVersion {
    /// All warnings as one message, if there are any.
    pub fn warning(&self) -> Option<String> {
        if self.warnings.is_empty() {
            return None;
        }
        let messages: Vec<String> = self.warnings.iter().map(|w| w.to_string()).collect();
        Some(messages.join("; "))
    }
}

/// Manages the versions of files inside one versions directory.
///
/// Every call is a short transaction over the filesystem; the directory is
/// the only state. There is no locking: sequence allocation reads the
/// directory and then writes, so two processes creating versions of the same
/// file in the same second can race. The write refuses to overwrite, so the
/// loser fails with an IO error instead of clobbering a version.
#[derive(Debug, Clone)]
pub struct FileVersioning {
    config: VersioningConfig,
    /// Canonical path of `config.versions_dir()`.
    versions_dir: PathBuf,
}

impl FileVersioning {
    /// Open the versions directory, creating it if needed.
    pub fn new(config: VersioningConfig) -> VersionResult<Self> {
        let dir = config.versions_dir();
        fs::create_dir_all(dir).context_with(|| {
            format!("Failed to create versions directory {}", dir.display())
        })?;
        let versions_dir = dir.canonicalize().context_with(|| {
            format!("Failed to resolve versions directory {}", dir.display())
        })?;
        debug!(versions_dir = %versions_dir.display(), "Opened versions directory");

        Ok(Self {
            config,
            versions_dir,
        })
    }

    pub fn config(&self) -> &VersioningConfig {
        &self.config
    }

    /// Absolute path of the versions directory.
    pub fn versions_dir(&self) -> &Path {
        &self.versions_dir
    }

    /// Store a new version of `source`, then apply the retention limit.
    pub fn create_version(&self, source: impl AsRef<Path>) -> VersionResult<CreatedVersion> {
        let source = source.as_ref();
        let started = Instant::now();

        let source_path = resolve(source)?;
        let metadata = fs::metadata(&source_path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                VersionError::not_found(source)
            } else {
                VersionError::io(format!("Failed to read {}", source.display()), e)
            }
        })?;
        if !metadata.is_file() {
            return Err(VersionError::io(
                format!("Cannot version {}", source.display()),
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a regular file"),
            ));
        }

        let (base_name, extension) = split_name(&source_path)?;
        let delimiter = self.config.delimiter();
        if base_name.contains(delimiter) {
            return Err(VersionError::invalid_filename(
                base_name,
                format!("file name contains the delimiter '{delimiter}'"),
            ));
        }

        let timestamp = self.timestamp_for(&metadata)?;
        let sequence = next_sequence(&self.versions_dir, &base_name, &timestamp, delimiter)?;

        let name = VersionName {
            base_name,
            timestamp,
            sequence,
            timezone_format: self.config.timezone_format(),
            timestamp_source: self.config.timestamp_source(),
            extension,
            compression: self.config.compression(),
        };
        let encoded = name.encode(delimiter);
        if VersionName::decode(&encoded, delimiter).ok().as_ref() != Some(&name) {
            return Err(VersionError::invalid_filename(
                encoded,
                "version name would not decode back to its source",
            ));
        }
        let version_path = self.versions_dir.join(encoded);

        let bytes = compress_file(&source_path, &version_path, self.config.compression())?;
        info!(
            source = %source_path.display(),
            version = %version_path.display(),
            compression = %self.config.compression(),
            bytes,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Created version"
        );

        let retention = apply_retention(
            &self.versions_dir,
            &name.base_name,
            self.config.max_versions(),
            delimiter,
        );
        let (removed, warnings) = retention_outcome(retention, &self.versions_dir);

        Ok(CreatedVersion {
            path: version_path,
            removed,
            warnings,
        })
    }

    /// Restore `version` to `target`, replacing any existing file there.
    ///
    /// The compression is taken from the version's extension, not from the
    /// current configuration.
    pub fn restore_version(
        &self,
        version: impl AsRef<Path>,
        target: impl AsRef<Path>,
    ) -> VersionResult<()> {
        let version = version.as_ref();
        let target = target.as_ref();
        let started = Instant::now();

        let version_path = resolve(version)?;
        if !version_path.exists() {
            return Err(VersionError::not_found(version));
        }

        let target_path = resolve(target)?;
        if target_path.is_dir() {
            return Err(VersionError::TargetIsDirectory(target_path));
        }
        if let Some(parent) = target_path.parent() {
            fs::create_dir_all(parent)
                .context_with(|| format!("Failed to create {}", parent.display()))?;
        }

        let bytes = decompress_file(&version_path, &target_path)?;
        info!(
            version = %version_path.display(),
            target = %target_path.display(),
            bytes,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Restored version"
        );
        Ok(())
    }

    /// All versions of `original`, newest first.
    ///
    /// Files in the versions directory that do not decode as versions are
    /// skipped. `original` itself does not need to exist.
    pub fn list_versions(&self, original: impl AsRef<Path>) -> VersionResult<Vec<VersionRecord>> {
        let original = original.as_ref();
        let (base_name, _) = split_name(original)?;
        let delimiter = self.config.delimiter();

        let mut records: Vec<VersionRecord> =
            matching_paths(&self.versions_dir, &base_prefix(&base_name, delimiter))?
                .into_iter()
                .filter_map(|path| match VersionRecord::from_path(&path, delimiter) {
                    Ok(record) if record.base_name == base_name => Some(record),
                    Ok(_) => None,
                    Err(e) => {
                        debug!(path = %path.display(), error = %e, "Skipping non-version file");
                        None
                    }
                })
                .collect();

        records.sort_by(VersionRecord::newest_first);
        Ok(records)
    }

    /// Delete one version file.
    ///
    /// The path must resolve inside the versions directory and decode as a
    /// version name.
    pub fn remove_version(&self, version: impl AsRef<Path>) -> VersionResult<()> {
        let version = version.as_ref();
        let version_path = resolve(version)?;
        if !version_path.exists() {
            return Err(VersionError::not_found(version));
        }

        if !is_within(&version_path, &self.versions_dir) {
            return Err(VersionError::OutsideVersionsDirectory(version_path));
        }

        let record = VersionRecord::from_path(&version_path, self.config.delimiter())?;
        fs::remove_file(&record.path)
            .context_with(|| format!("Failed to remove version {}", record.path.display()))?;
        info!(version = %record.path.display(), "Removed version");
        Ok(())
    }

    fn timestamp_for(&self, metadata: &Metadata) -> VersionResult<String> {
        let time = match self.config.timestamp_source() {
            TimestampSource::Modified => metadata
                .modified()
                .context_with(|| "Failed to read modification time")?,
            TimestampSource::Stored => SystemTime::now(),
        };
        Ok(match self.config.timezone_format() {
            TimezoneFormat::Local => format_timestamp(&DateTime::<Local>::from(time)),
            TimezoneFormat::Utc => format_timestamp(&DateTime::<Utc>::from(time)),
        })
    }
}

/// Fold a retention result into `(removed, warnings)`. Errors become warnings.
fn retention_outcome(
    retention: VersionResult<Option<RetentionReport>>,
    versions_dir: &Path,
) -> (usize, Vec<RetentionWarning>) {
    match retention {
        Ok(Some(report)) => (report.removed, report.warnings),
        Ok(None) => (0, Vec::new()),
        Err(e) => (
            0,
            vec![RetentionWarning::ScanFailed {
                dir: versions_dir.to_path_buf(),
                reason: e.to_string(),
            }],
        ),
    }
}

fn resolve(path: &Path) -> VersionResult<PathBuf> {
    absolute(path).context_with(|| format!("Failed to resolve {}", path.display()))
}

/// Split a path into its stem and extension (with the dot, or empty).
fn split_name(path: &Path) -> VersionResult<(String, String)> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            VersionError::invalid_filename(path.display().to_string(), "no usable file name")
        })?;
    let extension = match path.extension() {
        Some(ext) => {
            let ext = ext.to_str().ok_or_else(|| {
                VersionError::invalid_filename(path.display().to_string(), "not a UTF-8 file name")
            })?;
            format!(".{ext}")
        }
        None => String::new(),
    };
    Ok((stem.to_string(), extension))
}
