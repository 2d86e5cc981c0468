//! `list` command handlers.

use super::report_failure;
use fileversion_core::{FileVersioning, VersionRecord};
use serde::Serialize;
use std::path::{Path, PathBuf};

const HEADERS: [&str; 6] = [
    "Path",
    "Sequence",
    "Size",
    "Timestamp",
    "TimeZone",
    "TimestampSrc",
];

/// Print a table of versions for each original file.
///
/// A missing original is reported but does not count as a failure.
pub fn handle_list(versioning: &FileVersioning, paths: &[PathBuf]) -> usize {
    let mut failures = 0;

    for path in paths {
        if !path.exists() {
            println!("Error: File {} does not exist", path.display());
            continue;
        }

        match versioning.list_versions(path) {
            Ok(records) if records.is_empty() => {
                println!("No versions found for {}", path.display());
            }
            Ok(records) => print_table(&records),
            Err(e) => {
                report_failure(path, e);
                failures += 1;
            }
        }
    }

    failures
}

#[derive(Serialize)]
struct FileVersions<'a> {
    file: &'a Path,
    versions: Vec<VersionRecord>,
}

/// Print every file's versions as one JSON array.
///
/// Missing originals are reported on stderr and left out of the array.
pub fn handle_list_json(versioning: &FileVersioning, paths: &[PathBuf]) -> anyhow::Result<usize> {
    let mut failures = 0;
    let mut listing = Vec::with_capacity(paths.len());

    for path in paths {
        if !path.exists() {
            eprintln!("Error: File {} does not exist", path.display());
            continue;
        }

        match versioning.list_versions(path) {
            Ok(versions) => listing.push(FileVersions {
                file: path,
                versions,
            }),
            Err(e) => {
                report_failure(path, e);
                failures += 1;
            }
        }
    }

    println!("{}", serde_json::to_string_pretty(&listing)?);
    Ok(failures)
}

fn table_rows(records: &[VersionRecord]) -> Vec<[String; 6]> {
    records
        .iter()
        .map(|record| {
            [
                record.file_name(),
                record.sequence.to_string(),
                record.size.to_string(),
                record.timestamp.format("%Y-%m-%dT%H:%M:%S").to_string(),
                record.timezone_format.label().to_string(),
                record.timestamp_source.label().to_string(),
            ]
        })
        .collect()
}

fn column_widths(rows: &[[String; 6]]) -> [usize; 6] {
    let mut widths = HEADERS.map(str::len);
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }
    widths
}

fn format_row<S: AsRef<str>>(cells: &[S], widths: &[usize; 6]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell.as_ref(), width = *width))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

fn print_table(records: &[VersionRecord]) {
    let rows = table_rows(records);
    let widths = column_widths(&rows);
    let total = widths.iter().sum::<usize>() + 2 * (widths.len() - 1);

    println!("{}", format_row(&HEADERS, &widths));
    println!("{}", "-".repeat(total));
    for row in &rows {
        println!("{}", format_row(row, &widths));
    }
}
