//! Versioning configuration.

use crate::compression::Compression;
use crate::{VersionError, VersionResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Default delimiter between the three filename segments.
pub const DEFAULT_DELIMITER: &str = "--";

/// Default versions directory, relative to the working directory.
pub const DEFAULT_VERSIONS_DIR: &str = "versions";

/// Timezone used when formatting a version's timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TimezoneFormat {
    #[default]
    #[serde(rename = "loc")]
    Local,
    #[serde(rename = "utc")]
    Utc,
}

impl TimezoneFormat {
    /// Tag embedded in version filenames.
    pub fn tag(&self) -> &'static str {
        match self {
            TimezoneFormat::Local => "loc",
            TimezoneFormat::Utc => "utc",
        }
    }

    /// Parse a filename tag. Only the exact lowercase tags are accepted.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "loc" => Some(TimezoneFormat::Local),
            "utc" => Some(TimezoneFormat::Utc),
            _ => None,
        }
    }

    /// Human-readable name.
    pub fn label(&self) -> &'static str {
        match self {
            TimezoneFormat::Local => "local",
            TimezoneFormat::Utc => "utc",
        }
    }
}

impl FromStr for TimezoneFormat {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "loc" | "local" => Ok(TimezoneFormat::Local),
            "utc" => Ok(TimezoneFormat::Utc),
            other => Err(VersionError::config(format!(
                "unknown timezone format '{other}' (expected loc or utc)"
            ))),
        }
    }
}

impl fmt::Display for TimezoneFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Where a version's timestamp comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TimestampSource {
    /// The source file's modification time.
    #[default]
    #[serde(rename = "mod")]
    Modified,
    /// Wall-clock time when the version is stored.
    #[serde(rename = "sto")]
    Stored,
}

impl TimestampSource {
    /// Tag embedded in version filenames.
    pub fn tag(&self) -> &'static str {
        match self {
            TimestampSource::Modified => "mod",
            TimestampSource::Stored => "sto",
        }
    }

    /// Parse a filename tag. Only the exact lowercase tags are accepted.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "mod" => Some(TimestampSource::Modified),
            "sto" => Some(TimestampSource::Stored),
            _ => None,
        }
    }

    /// Human-readable name.
    pub fn label(&self) -> &'static str {
        match self {
            TimestampSource::Modified => "modify time",
            TimestampSource::Stored => "stored time",
        }
    }
}

impl FromStr for TimestampSource {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mod" | "modified" => Ok(TimestampSource::Modified),
            "sto" | "stored" => Ok(TimestampSource::Stored),
            other => Err(VersionError::config(format!(
                "unknown timestamp source '{other}' (expected mod or sto)"
            ))),
        }
    }
}

impl fmt::Display for TimestampSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Validated, immutable configuration for the versioning engine.
///
/// Build one with [`VersioningConfig::builder`]; invalid values are rejected
/// at [`VersioningConfigBuilder::build`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "VersioningConfigBuilder")]
pub struct VersioningConfig {
    delimiter: String,
    timezone_format: TimezoneFormat,
    timestamp_source: TimestampSource,
    versions_dir: PathBuf,
    compression: Compression,
    max_versions: Option<usize>,
}

impl VersioningConfig {
    /// Start building a configuration from the defaults.
    pub fn builder() -> VersioningConfigBuilder {
        VersioningConfigBuilder::default()
    }

    /// Delimiter separating the filename segments.
    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    pub fn timezone_format(&self) -> TimezoneFormat {
        self.timezone_format
    }

    pub fn timestamp_source(&self) -> TimestampSource {
        self.timestamp_source
    }

    /// Directory holding every version file.
    pub fn versions_dir(&self) -> &Path {
        &self.versions_dir
    }

    pub fn compression(&self) -> Compression {
        self.compression
    }

    /// Retention limit; `None` keeps every version.
    pub fn max_versions(&self) -> Option<usize> {
        self.max_versions
    }
}

impl Default for VersioningConfig {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER.to_string(),
            timezone_format: TimezoneFormat::default(),
            timestamp_source: TimestampSource::default(),
            versions_dir: PathBuf::from(DEFAULT_VERSIONS_DIR),
            compression: Compression::default(),
            max_versions: None,
        }
    }
}

impl fmt::Display for VersioningConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let max_versions = self
            .max_versions
            .map(|n| n.to_string())
            .unwrap_or_else(|| "unlimited".to_string());
        writeln!(f, "VersioningConfig(")?;
        writeln!(f, "    delimiter: '{}'", self.delimiter)?;
        writeln!(f, "    timezone: {}", self.timezone_format.label())?;
        writeln!(f, "    versions_path: '{}'", self.versions_dir.display())?;
        writeln!(f, "    compression: '{}'", self.compression.tag())?;
        writeln!(f, "    max_versions: {max_versions}")?;
        writeln!(f, "    timestamp_source: {}", self.timestamp_source.label())?;
        write!(f, ")")
    }
}

/// Builder for [`VersioningConfig`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VersioningConfigBuilder {
    delimiter: String,
    timezone_format: TimezoneFormat,
    timestamp_source: TimestampSource,
    versions_dir: PathBuf,
    compression: Compression,
    max_versions: Option<usize>,
}

impl Default for VersioningConfigBuilder {
    fn default() -> Self {
        let defaults = VersioningConfig::default();
        Self {
            delimiter: defaults.delimiter,
            timezone_format: defaults.timezone_format,
            timestamp_source: defaults.timestamp_source,
            versions_dir: defaults.versions_dir,
            compression: defaults.compression,
            max_versions: defaults.max_versions,
        }
    }
}

impl VersioningConfigBuilder {
    pub fn delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    pub fn timezone_format(mut self, timezone_format: TimezoneFormat) -> Self {
        self.timezone_format = timezone_format;
        self
    }

    pub fn timestamp_source(mut self, timestamp_source: TimestampSource) -> Self {
        self.timestamp_source = timestamp_source;
        self
    }

    pub fn versions_dir(mut self, versions_dir: impl Into<PathBuf>) -> Self {
        self.versions_dir = versions_dir.into();
        self
    }

    pub fn compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    pub fn max_versions(mut self, max_versions: Option<usize>) -> Self {
        self.max_versions = max_versions;
        self
    }

    /// Validate and freeze the configuration.
    pub fn build(self) -> VersionResult<VersioningConfig> {
        if self.delimiter.is_empty() {
            return Err(VersionError::config("delimiter cannot be empty"));
        }
        if let Some(c) = self
            .delimiter
            .chars()
            .find(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '.')
        {
            return Err(VersionError::config(format!(
                "delimiter '{}' cannot contain '{c}': it appears inside version names",
                self.delimiter
            )));
        }
        if self.max_versions == Some(0) {
            return Err(VersionError::config(
                "max_versions must be positive if specified",
            ));
        }
        Ok(VersioningConfig {
            delimiter: self.delimiter,
            timezone_format: self.timezone_format,
            timestamp_source: self.timestamp_source,
            versions_dir: self.versions_dir,
            compression: self.compression,
            max_versions: self.max_versions,
        })
    }
}

impl TryFrom<VersioningConfigBuilder> for VersioningConfig {
    type Error = VersionError;

    fn try_from(builder: VersioningConfigBuilder) -> Result<Self, Self::Error> {
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_display() {
        let config = VersioningConfig::default();
        assert_eq!(
            config.to_string(),
            "VersioningConfig(\n    delimiter: '--'\n    timezone: local\n    versions_path: 'versions'\n    compression: 'none'\n    max_versions: unlimited\n    timestamp_source: modify time\n)"
        );
    }

    #[test]
    fn test_custom_config() {
        let config = VersioningConfig::builder()
            .delimiter("++")
            .timezone_format(TimezoneFormat::Utc)
            .versions_dir("backup")
            .compression(Compression::Gzip)
            .max_versions(Some(5))
            .timestamp_source(TimestampSource::Stored)
            .build()
            .unwrap();

        let shown = config.to_string();
        assert!(shown.contains("'++'"));
        assert!(shown.contains("timezone: utc"));
        assert!(shown.contains("'backup'"));
        assert!(shown.contains("'gz'"));
        assert!(shown.contains("max_versions: 5"));
        assert!(shown.contains("stored time"));
        assert_eq!(config.max_versions(), Some(5));
    }

    #[test]
    fn test_empty_delimiter_rejected() {
        let err = VersioningConfig::builder().delimiter("").build().unwrap_err();
        assert!(matches!(err, VersionError::Config(_)));
    }

    #[test]
    fn test_delimiter_overlapping_version_names_rejected() {
        for delimiter in ["_", "__", ".", "-.-", "1", "x", "-loc-"] {
            let err = VersioningConfig::builder()
                .delimiter(delimiter)
                .build()
                .unwrap_err();
            assert!(matches!(err, VersionError::Config(_)), "{delimiter}");
        }
        for delimiter in ["--", "++", "~", "#-#"] {
            assert!(VersioningConfig::builder().delimiter(delimiter).build().is_ok());
        }

        let invalid = serde_json::from_str::<VersioningConfig>(r#"{"delimiter": "_"}"#);
        assert!(invalid.is_err());
    }

    #[test]
    fn test_zero_max_versions_rejected() {
        let err = VersioningConfig::builder()
            .max_versions(Some(0))
            .build()
            .unwrap_err();
        assert!(matches!(err, VersionError::Config(_)));
    }

    #[test]
    fn test_enum_tags() {
        assert_eq!(TimezoneFormat::from_tag("utc"), Some(TimezoneFormat::Utc));
        assert_eq!(TimezoneFormat::from_tag("UTC"), None);
        assert_eq!(TimestampSource::from_tag("sto"), Some(TimestampSource::Stored));
        assert_eq!(TimestampSource::from_tag("mtime"), None);
        assert_eq!("Local".parse::<TimezoneFormat>().unwrap(), TimezoneFormat::Local);
        assert!("gmt".parse::<TimezoneFormat>().is_err());
        assert_eq!("MOD".parse::<TimestampSource>().unwrap(), TimestampSource::Modified);
    }

    #[test]
    fn test_deserialize_validates() {
        let config: VersioningConfig =
            serde_json::from_str(r#"{"delimiter": "++", "timezone_format": "utc"}"#).unwrap();
        assert_eq!(config.delimiter(), "++");
        assert_eq!(config.timezone_format(), TimezoneFormat::Utc);
        assert_eq!(config.compression(), Compression::None);

        let invalid = serde_json::from_str::<VersioningConfig>(r#"{"max_versions": 0}"#);
        assert!(invalid.is_err());
    }

    #[test]
    fn test_serialize_uses_tags() {
        let config = VersioningConfig::builder()
            .compression(Compression::Xz)
            .build()
            .unwrap();
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["compression"], "xz");
        assert_eq!(json["timezone_format"], "loc");
        assert_eq!(json["timestamp_source"], "mod");
    }
}
