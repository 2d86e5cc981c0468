//! Parsed view of a version file on disk.

use crate::compression::Compression;
use crate::config::{TimestampSource, TimezoneFormat};
use crate::error::IoContext;
use crate::filename::VersionName;
use crate::{VersionError, VersionResult};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};

/// One version file, reconstructed from its name and size.
///
/// Records are never cached; build one from a path whenever it is needed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionRecord {
    pub path: PathBuf,
    pub base_name: String,
    /// In the timezone named by `timezone_format`.
    pub timestamp: NaiveDateTime,
    pub sequence: u16,
    pub timezone_format: TimezoneFormat,
    pub timestamp_source: TimestampSource,
    /// Original extension including the dot, or empty.
    pub extension: String,
    /// Inferred from the file's final extension.
    pub compression: Compression,
    /// Size on disk in bytes.
    pub size: u64,
}

impl VersionRecord {
    /// Decode `path`'s filename and read its size.
    pub fn from_path(path: &Path, delimiter: &str) -> VersionResult<Self> {
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                VersionError::invalid_filename(path.display().to_string(), "not a UTF-8 file name")
            })?;
        let name = VersionName::decode(filename, delimiter)?;
        let timestamp = name.parsed_timestamp()?;

        let metadata = fs::metadata(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                VersionError::not_found(path)
            } else {
                VersionError::io(format!("Failed to read metadata of {}", path.display()), e)
            }
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            base_name: name.base_name,
            timestamp,
            sequence: name.sequence,
            timezone_format: name.timezone_format,
            timestamp_source: name.timestamp_source,
            extension: name.extension,
            compression: name.compression,
            size: metadata.len(),
        })
    }

    /// File name component of the path.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Compare by `(timestamp, sequence)`, newest first.
    pub fn newest_first(a: &Self, b: &Self) -> Ordering {
        (b.timestamp, b.sequence).cmp(&(a.timestamp, a.sequence))
    }
}

/// Non-directory entries in `dir` whose file name starts with `prefix`, in
/// directory order.
pub(crate) fn matching_paths(dir: &Path, prefix: &str) -> VersionResult<Vec<PathBuf>> {
    let entries = fs::read_dir(dir)
        .context_with(|| format!("Failed to read versions directory {}", dir.display()))?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.context_with(|| format!("Failed to read {}", dir.display()))?;
        let matches = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with(prefix));
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        if matches && !is_dir {
            paths.push(entry.path());
        }
    }
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_from_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report--20240207.123456_003--loc_sto.txt.bz2");
        fs::write(&path, b"12345").unwrap();

        let record = VersionRecord::from_path(&path, "--").unwrap();
        assert_eq!(record.base_name, "report");
        assert_eq!(record.sequence, 3);
        assert_eq!(record.timezone_format, TimezoneFormat::Local);
        assert_eq!(record.timestamp_source, TimestampSource::Stored);
        assert_eq!(record.compression, Compression::Bz2);
        assert_eq!(record.extension, ".txt");
        assert_eq!(record.size, 5);
        assert_eq!(record.file_name(), "report--20240207.123456_003--loc_sto.txt.bz2");
    }

    #[test]
    fn test_from_path_invalid_name() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.txt");
        fs::write(&path, b"x").unwrap();

        let err = VersionRecord::from_path(&path, "--").unwrap_err();
        assert!(matches!(err, VersionError::InvalidFilename { .. }));
    }

    #[test]
    fn test_from_path_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report--20240207.123456_001--loc_mod.txt");

        let err = VersionRecord::from_path(&path, "--").unwrap_err();
        assert!(matches!(err, VersionError::NotFound(_)));
    }

    #[test]
    fn test_newest_first() {
        let dir = TempDir::new().unwrap();
        let names = [
            "a--20240101.000000_002--loc_mod.txt",
            "a--20240102.000000_001--loc_mod.txt",
            "a--20240101.000000_010--loc_mod.txt",
        ];
        let mut records: Vec<VersionRecord> = names
            .iter()
            .map(|name| {
                let path = dir.path().join(name);
                fs::write(&path, b"").unwrap();
                VersionRecord::from_path(&path, "--").unwrap()
            })
            .collect();

        records.sort_by(VersionRecord::newest_first);
        let order: Vec<(u32, u16)> = records
            .iter()
            .map(|r| (r.timestamp.format("%d").to_string().parse().unwrap(), r.sequence))
            .collect();
        assert_eq!(order, vec![(2, 1), (1, 10), (1, 2)]);
    }

    #[test]
    fn test_serialize() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a--20240207.123456_001--utc_mod.txt");
        fs::write(&path, b"abc").unwrap();
        let record = VersionRecord::from_path(&path, "--").unwrap();

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["timestamp"], "2024-02-07T12:34:56");
        assert_eq!(json["timezone_format"], "utc");
        assert_eq!(json["timestamp_source"], "mod");
        assert_eq!(json["compression"], "none");
        assert_eq!(json["size"], 3);
    }

    #[test]
    fn test_matching_paths() {
        let dir = TempDir::new().unwrap();
        for name in ["a--1", "a--2", "ab--1", "b--1"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        let mut paths = matching_paths(dir.path(), "a--").unwrap();
        paths.sort();
        assert_eq!(paths, vec![dir.path().join("a--1"), dir.path().join("a--2")]);
    }
}
