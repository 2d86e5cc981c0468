//! Sequence number allocation.
//!
//! Sequences are scoped to one `(base name, timestamp)` pair. Allocation is a
//! read-then-write over the directory and is not atomic; see
//! [`crate::FileVersioning`] for the single-writer assumption.

use crate::filename::{timestamp_prefix, VersionName, MAX_SEQUENCE};
use crate::record::matching_paths;
use crate::{VersionError, VersionResult};
use std::path::Path;
use tracing::debug;

/// Next free sequence for `base_name` at `timestamp`: one past the highest
/// existing sequence, or 1 when there is none.
pub fn next_sequence(
    versions_dir: &Path,
    base_name: &str,
    timestamp: &str,
    delimiter: &str,
) -> VersionResult<u16> {
    let prefix = timestamp_prefix(base_name, timestamp, delimiter);

    let highest = matching_paths(versions_dir, &prefix)?
        .iter()
        .filter_map(|path| path.file_name()?.to_str())
        .filter_map(|filename| match VersionName::decode(filename, delimiter) {
            Ok(name) if name.base_name == base_name && name.timestamp == timestamp => {
                Some(name.sequence)
            }
            Ok(_) => None,
            Err(e) => {
                debug!(error = %e, "Ignoring entry during sequence lookup");
                None
            }
        })
        .max()
        .unwrap_or(0);

    if highest >= MAX_SEQUENCE {
        return Err(VersionError::SequenceExhausted {
            base: base_name.to_string(),
            timestamp: timestamp.to_string(),
            max: MAX_SEQUENCE,
        });
    }

    let next = highest + 1;
    debug!(base = base_name, timestamp, sequence = next, "Allocated sequence");
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const TS: &str = "20240207.123456";

    fn touch(dir: &TempDir, name: &str) {
        fs::write(dir.path().join(name), b"").unwrap();
    }

    #[test]
    fn test_first_sequence() {
        let dir = TempDir::new().unwrap();
        assert_eq!(next_sequence(dir.path(), "a", TS, "--").unwrap(), 1);
    }

    #[test]
    fn test_increments_past_highest() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "a--20240207.123456_001--loc_mod.txt");
        touch(&dir, "a--20240207.123456_005--loc_mod.txt.gz");
        assert_eq!(next_sequence(dir.path(), "a", TS, "--").unwrap(), 6);
    }

    #[test]
    fn test_scoped_to_base_and_timestamp() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "a--20240207.123457_004--loc_mod.txt");
        touch(&dir, "ab--20240207.123456_007--loc_mod.txt");
        touch(&dir, "b--20240207.123456_002--loc_mod.txt");
        assert_eq!(next_sequence(dir.path(), "a", TS, "--").unwrap(), 1);
    }

    #[test]
    fn test_ignores_undecodable_entries() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "a--20240207.123456_abc--loc_mod.txt");
        touch(&dir, "a--20240207.123456_009--bad_spec.txt");
        touch(&dir, "a--20240207.123456_002--loc_mod.txt");
        assert_eq!(next_sequence(dir.path(), "a", TS, "--").unwrap(), 3);
    }

    #[test]
    fn test_respects_delimiter() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "a__20240207.123456_003__utc_sto.txt");
        assert_eq!(next_sequence(dir.path(), "a", TS, "__").unwrap(), 4);
        assert_eq!(next_sequence(dir.path(), "a", TS, "--").unwrap(), 1);
    }

    #[test]
    fn test_exhausted() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "a--20240207.123456_998--loc_mod.txt");
        assert_eq!(next_sequence(dir.path(), "a", TS, "--").unwrap(), 999);

        touch(&dir, "a--20240207.123456_999--loc_mod.txt");
        let err = next_sequence(dir.path(), "a", TS, "--").unwrap_err();
        assert!(matches!(err, VersionError::SequenceExhausted { max: 999, .. }));
    }
}
