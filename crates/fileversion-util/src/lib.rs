//! Shared utilities for fileversion.
//!
//! This crate provides common utilities used across the fileversion workspace:
//! - Logging setup with tracing
//! - Path containment checks

pub mod log;
pub mod path;

pub use log::{LogConfig, LogLevel};
