//! Command handlers for the fileversion CLI.
//!
//! Each handler processes every path it is given, reports failures per
//! file and returns how many paths failed.

pub mod create;
pub mod list;
pub mod remove;
pub mod restore;

pub use create::*;
pub use list::*;
pub use remove::*;
pub use restore::*;

use std::fmt::Display;
use std::path::Path;

/// Report a failure for one file on stderr.
fn report_failure(path: &Path, error: impl Display) {
    tracing::debug!(path = %path.display(), error = %error, "Command failed");
    eprintln!("Error processing {}: {}", path.display(), error);
}
