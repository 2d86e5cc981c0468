//! Versioning engine for fileversion.
//!
//! This crate stores timestamped, optionally compressed copies of single files:
//! - Version filenames encode base name, timestamp, sequence, timezone format
//!   and timestamp source
//! - Sequence numbers keep versions created within the same second unique
//! - A retention limit prunes the oldest versions of a file
//! - Versions restore byte-for-byte, with the original file times and mode
//!
//! # Example
//!
//! ```no_run
//! use fileversion_core::{Compression, FileVersioning, VersioningConfig};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = VersioningConfig::builder()
//!     .versions_dir("versions")
//!     .compression(Compression::Gzip)
//!     .max_versions(Some(5))
//!     .build()?;
//! let versioning = FileVersioning::new(config)?;
//!
//! let created = versioning.create_version("report.txt")?;
//! println!("stored {}", created.path.display());
//!
//! for record in versioning.list_versions("report.txt")? {
//!     println!("{} #{} ({} bytes)", record.timestamp, record.sequence, record.size);
//! }
//!
//! versioning.restore_version(&created.path, "report.txt")?;
//! # Ok(())
//! # }
//! ```

pub mod compression;
pub mod config;
mod error;
pub mod filename;
mod record;
pub mod retention;
pub mod sequence;
mod service;

pub use compression::{compress_file, decompress_file, Compression, StreamCodec};
pub use config::{TimestampSource, TimezoneFormat, VersioningConfig, VersioningConfigBuilder};
pub use error::{VersionError, VersionResult};
pub use filename::{VersionName, MAX_SEQUENCE};
pub use record::VersionRecord;
pub use retention::{apply_retention, RetentionReport, RetentionWarning};
pub use sequence::next_sequence;
pub use service::{CreatedVersion, FileVersioning};
