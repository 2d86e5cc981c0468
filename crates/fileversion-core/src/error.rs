//! Versioning error types.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for versioning operations.
pub type VersionResult<T> = Result<T, VersionError>;

/// Errors that can occur during versioning operations.
#[derive(Debug, Error)]
pub enum VersionError {
    /// Source, version or target file not found.
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    /// A filename does not follow the version naming scheme.
    #[error("Invalid version filename '{name}': {reason}")]
    InvalidFilename { name: String, reason: String },

    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// All 999 sequence numbers for one timestamp are taken.
    #[error("Maximum sequence number ({max}) exceeded for {base} at {timestamp}")]
    SequenceExhausted {
        base: String,
        timestamp: String,
        max: u16,
    },

    /// Restore target is an existing directory.
    #[error("Target path {} must be a file path, not a directory", .0.display())]
    TargetIsDirectory(PathBuf),

    /// Path does not live inside the versions directory.
    #[error("File {} is not in the versions directory", .0.display())]
    OutsideVersionsDirectory(PathBuf),

    /// IO or codec failure.
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl VersionError {
    /// Create a not found error.
    pub fn not_found(path: impl AsRef<Path>) -> Self {
        Self::NotFound(path.as_ref().to_path_buf())
    }

    /// Create an invalid filename error.
    pub fn invalid_filename(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidFilename {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Wrap an IO error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Whether this error means a path was missing.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound(_) => true,
            Self::Io { source, .. } => source.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}

/// Attach context to IO results.
pub(crate) trait IoContext<T> {
    fn context_with<F, S>(self, f: F) -> VersionResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T> IoContext<T> for std::io::Result<T> {
    fn context_with<F, S>(self, f: F) -> VersionResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| VersionError::io(f(), e))
    }
}
