//! Version filename encoding.
//!
//! A version file is named
//!
//! ```text
//! {base}{delim}{YYYYMMDD.HHMMSS}_{NNN}{delim}{tz}_{src}{ext}[.{gz|bz2|xz}]
//! ```
//!
//! for example `report--20240207.123456_001--utc_mod.txt.gz`. Decoding is
//! strict about every positional rule and only tolerates the optional
//! trailing compression extension.

use crate::compression::Compression;
use crate::config::{TimestampSource, TimezoneFormat};
use crate::{VersionError, VersionResult};
use chrono::{DateTime, NaiveDateTime, TimeZone};
use std::fmt;

/// strftime format of the timestamp segment.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d.%H%M%S";

/// Highest sequence number a single timestamp can hold.
pub const MAX_SEQUENCE: u16 = 999;

const TIMESTAMP_LEN: usize = 15;
const VERSION_INFO_LEN: usize = TIMESTAMP_LEN + 1 + 3;
const TAGS_LEN: usize = 7;

/// The components encoded in a version filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionName {
    /// Stem of the original file.
    pub base_name: String,
    /// `YYYYMMDD.HHMMSS`.
    pub timestamp: String,
    /// 1..=999.
    pub sequence: u16,
    pub timezone_format: TimezoneFormat,
    pub timestamp_source: TimestampSource,
    /// Original extension including the dot, or empty.
    pub extension: String,
    pub compression: Compression,
}

impl VersionName {
    /// Build the filename for these components.
    pub fn encode(&self, delimiter: &str) -> String {
        let mut name = format!(
            "{base}{delimiter}{timestamp}_{sequence:03}{delimiter}{tz}_{src}{ext}",
            base = self.base_name,
            timestamp = self.timestamp,
            sequence = self.sequence,
            tz = self.timezone_format.tag(),
            src = self.timestamp_source.tag(),
            ext = self.extension,
        );
        if let Some(ext) = self.compression.extension() {
            name.push('.');
            name.push_str(ext);
        }
        name
    }

    /// Parse a filename produced by [`VersionName::encode`].
    pub fn decode(filename: &str, delimiter: &str) -> VersionResult<Self> {
        let invalid = |reason: String| VersionError::invalid_filename(filename, reason);

        if delimiter.is_empty() {
            return Err(invalid("delimiter cannot be empty".to_string()));
        }

        let parts: Vec<&str> = filename.split(delimiter).collect();
        if parts.len() != 3 {
            return Err(invalid(format!(
                "expected 3 segments separated by '{delimiter}', found {}",
                parts.len()
            )));
        }
        let (base_name, version_info, tags) = (parts[0], parts[1], parts[2]);

        if base_name.is_empty() {
            return Err(invalid("empty base name".to_string()));
        }

        let (timestamp, sequence) = parse_version_info(version_info).map_err(invalid)?;
        let (timezone_format, timestamp_source, rest) = parse_tags(tags).map_err(invalid)?;
        let (extension, compression) = split_compression(rest);

        if !extension.is_empty() && !extension.starts_with('.') {
            return Err(invalid(format!(
                "unexpected characters '{extension}' after version tags"
            )));
        }

        Ok(Self {
            base_name: base_name.to_string(),
            timestamp: timestamp.to_string(),
            sequence,
            timezone_format,
            timestamp_source,
            extension: extension.to_string(),
            compression,
        })
    }

    /// The timestamp as a naive date-time in its recorded timezone.
    pub fn parsed_timestamp(&self) -> VersionResult<NaiveDateTime> {
        parse_timestamp(&self.timestamp).ok_or_else(|| {
            VersionError::invalid_filename(&self.timestamp, "invalid timestamp")
        })
    }
}

impl fmt::Display for VersionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} @ {}_{:03} ({}_{})",
            self.base_name,
            self.timestamp,
            self.sequence,
            self.timezone_format.tag(),
            self.timestamp_source.tag()
        )
    }
}

/// Format a date-time as a timestamp segment.
pub fn format_timestamp<Tz>(time: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    time.format(TIMESTAMP_FORMAT).to_string()
}

/// Filename prefix shared by every version of `base_name`.
pub fn base_prefix(base_name: &str, delimiter: &str) -> String {
    format!("{base_name}{delimiter}")
}

/// Filename prefix shared by every version of `base_name` at `timestamp`.
pub fn timestamp_prefix(base_name: &str, timestamp: &str, delimiter: &str) -> String {
    format!("{base_name}{delimiter}{timestamp}_")
}

fn parse_timestamp(timestamp: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(timestamp, TIMESTAMP_FORMAT).ok()
}

/// Parse `YYYYMMDD.HHMMSS_NNN`.
fn parse_version_info(info: &str) -> Result<(&str, u16), String> {
    let bytes = info.as_bytes();
    if bytes.len() < VERSION_INFO_LEN {
        return Err(format!(
            "version info '{info}' is shorter than {VERSION_INFO_LEN} characters"
        ));
    }
    if bytes.len() != VERSION_INFO_LEN {
        return Err(format!("unexpected characters after sequence in '{info}'"));
    }

    let timestamp_ok = bytes[..TIMESTAMP_LEN]
        .iter()
        .enumerate()
        .all(|(i, b)| if i == 8 { *b == b'.' } else { b.is_ascii_digit() });
    if !timestamp_ok {
        return Err(format!("invalid timestamp format in '{info}'"));
    }
    if bytes[TIMESTAMP_LEN] != b'_' {
        return Err(format!("missing '_' before sequence in '{info}'"));
    }
    if !bytes[TIMESTAMP_LEN + 1..].iter().all(u8::is_ascii_digit) {
        return Err(format!("invalid sequence number in '{info}'"));
    }

    // All bytes are ASCII from here on, so slicing is safe.
    let timestamp = &info[..TIMESTAMP_LEN];
    if parse_timestamp(timestamp).is_none() {
        return Err(format!("timestamp '{timestamp}' is not a valid date and time"));
    }

    let sequence: u16 = info[TIMESTAMP_LEN + 1..]
        .parse()
        .map_err(|_| format!("invalid sequence number in '{info}'"))?;
    if sequence == 0 || sequence > MAX_SEQUENCE {
        return Err(format!("sequence must be between 1 and {MAX_SEQUENCE}"));
    }

    Ok((timestamp, sequence))
}

/// Parse `tz_src` and return the remainder (extension plus compression).
fn parse_tags(tags: &str) -> Result<(TimezoneFormat, TimestampSource, &str), String> {
    let head = tags
        .get(..TAGS_LEN)
        .ok_or_else(|| format!("invalid version tags '{tags}'"))?;
    let (tz, src) = head
        .split_once('_')
        .filter(|(tz, _)| tz.len() == 3)
        .ok_or_else(|| format!("invalid version tags '{tags}'"))?;

    let timezone_format =
        TimezoneFormat::from_tag(tz).ok_or_else(|| format!("invalid timezone format '{tz}'"))?;
    let timestamp_source =
        TimestampSource::from_tag(src).ok_or_else(|| format!("invalid timestamp source '{src}'"))?;

    Ok((timezone_format, timestamp_source, &tags[TAGS_LEN..]))
}

/// Strip a trailing compression extension, if there is one.
fn split_compression(rest: &str) -> (&str, Compression) {
    if let Some((stem, ext)) = rest.rsplit_once('.') {
        let compression = Compression::from_extension(ext);
        if compression != Compression::None {
            return (stem, compression);
        }
    }
    (rest, Compression::None)
}
