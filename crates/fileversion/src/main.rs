//! fileversion - timestamped, compressed file versions.
//!
//! This is the main entry point for the fileversion CLI.

mod commands;
mod files;
mod info;

use anyhow::Context;
use clap::{CommandFactory, Parser, ValueEnum};
use fileversion_core::{
    Compression, FileVersioning, TimestampSource, TimezoneFormat, VersioningConfig,
};
use fileversion_util::LogConfig;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "fileversion")]
#[command(
    about = "fileversion: A flexible file versioning system with compression support",
    long_about = None,
    disable_version_flag = true
)]
struct Cli {
    /// Show version information
    #[arg(short = 'V', long)]
    version: bool,

    /// Command to execute
    #[arg(value_enum)]
    command: Option<Command>,

    /// One or more files to version/restore/list/remove (glob patterns allowed)
    files: Vec<String>,

    /// Target file path for restore (required for restore command)
    #[arg(short, long)]
    target: Option<PathBuf>,

    /// Directory to store versions
    #[arg(short = 'd', long, env = "PFV_VERSIONS_PATH", default_value = "versions")]
    versions_path: PathBuf,

    /// Compression type to use: none, gz, bz2, xz
    #[arg(short, long, env = "PFV_COMPRESSION", default_value = "none")]
    compression: Compression,

    /// Maximum number of versions to keep
    #[arg(short, long)]
    max_versions: Option<usize>,

    /// Source for timestamps (mod: file modified time, sto: current time)
    #[arg(short, long, default_value = "mod")]
    src: TimestampSource,

    /// Use UTC timezone for timestamps (default: local time)
    #[arg(short, long)]
    utc: bool,

    /// The delimiter to use between filename parts
    #[arg(
        short = 'D',
        long,
        env = "PFV_DELIMITER",
        default_value = "--",
        allow_hyphen_values = true
    )]
    delimiter: String,

    /// Print list output as JSON
    #[arg(long)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Command {
    Create,
    Restore,
    List,
    Remove,
}

impl Cli {
    fn config(&self) -> anyhow::Result<VersioningConfig> {
        let timezone_format = if self.utc {
            TimezoneFormat::Utc
        } else {
            TimezoneFormat::Local
        };
        VersioningConfig::builder()
            .delimiter(self.delimiter.as_str())
            .timezone_format(timezone_format)
            .timestamp_source(self.src)
            .versions_dir(&self.versions_path)
            .compression(self.compression)
            .max_versions(self.max_versions)
            .build()
            .context("Invalid configuration")
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.version {
        info::print_version();
        return ExitCode::SUCCESS;
    }

    let log_config = if cli.verbose {
        LogConfig::verbose()
    } else {
        LogConfig::default()
    };
    fileversion_util::log::init(log_config);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let Some(command) = cli.command else {
        Cli::command()
            .error(
                clap::error::ErrorKind::MissingRequiredArgument,
                "command is required",
            )
            .exit();
    };

    let config = cli.config()?;
    tracing::debug!("{config}");
    let versioning = FileVersioning::new(config).context("Failed to open versions directory")?;

    let paths = files::expand_patterns(&cli.files)?;

    let failures = match command {
        Command::Create => commands::handle_create(&versioning, &paths),
        Command::Restore => {
            let Some(target) = cli.target.as_deref() else {
                anyhow::bail!("--target required for restore command");
            };
            commands::handle_restore(&versioning, &paths, target)
        }
        Command::List if cli.json => commands::handle_list_json(&versioning, &paths)?,
        Command::List => commands::handle_list(&versioning, &paths),
        Command::Remove => commands::handle_remove(&versioning, &paths),
    };

    Ok(if failures > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
