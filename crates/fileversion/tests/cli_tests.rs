//! CLI integration tests.
//!
//! These tests drive the built binary end-to-end inside a temporary directory.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Get the path to the fileversion binary.
fn binary_path() -> &'static str {
    env!("CARGO_BIN_EXE_fileversion")
}

fn fileversion(cwd: &Path, args: &[&str]) -> Output {
    Command::new(binary_path())
        .current_dir(cwd)
        .args(args)
        .env_remove("PFV_VERSIONS_PATH")
        .env_remove("PFV_COMPRESSION")
        .env_remove("PFV_DELIMITER")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute command")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// Path printed after `Created version: `.
fn created_path(output: &Output) -> String {
    stdout(output)
        .lines()
        .find_map(|line| line.strip_prefix("Created version: "))
        .expect("no created version line")
        .to_string()
}

fn workspace() -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp dir");
    fs::write(dir.path().join("a.txt"), "hello world").unwrap();
    dir
}

#[test]
fn test_version_flag() {
    let dir = TempDir::new().unwrap();
    let output = fileversion(dir.path(), &["--version"]);

    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.starts_with("fileversion v"));
    assert!(out.contains("https://github.com/jftuga/fileversion"));
}

#[test]
fn test_help() {
    let dir = TempDir::new().unwrap();
    let output = fileversion(dir.path(), &["--help"]);

    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("--versions-path"));
    assert!(out.contains("--compression"));
    assert!(out.contains("--max-versions"));
}

#[test]
fn test_create_list_restore_remove() {
    let dir = workspace();

    let created = fileversion(dir.path(), &["create", "a.txt", "-c", "gz", "-u"]);
    assert!(created.status.success(), "{}", stderr(&created));
    let version = created_path(&created);
    assert!(version.ends_with("_001--utc_mod.txt.gz"));
    assert!(Path::new(&version).exists());

    let listed = fileversion(dir.path(), &["list", "a.txt"]);
    assert!(listed.status.success());
    let table = stdout(&listed);
    assert!(table.contains("TimestampSrc"));
    assert!(table.contains("modify time"));
    assert!(table.contains("utc"));

    let restored = fileversion(dir.path(), &["restore", &version, "-t", "out.txt"]);
    assert!(restored.status.success(), "{}", stderr(&restored));
    assert!(stdout(&restored).starts_with("Restored "));
    assert_eq!(
        fs::read_to_string(dir.path().join("out.txt")).unwrap(),
        "hello world"
    );

    let removed = fileversion(dir.path(), &["remove", &version]);
    assert!(removed.status.success(), "{}", stderr(&removed));
    assert!(stdout(&removed).contains("Removed version: "));
    assert!(!Path::new(&version).exists());

    let empty = fileversion(dir.path(), &["list", "a.txt"]);
    assert!(empty.status.success());
    assert!(stdout(&empty).contains("No versions found for a.txt"));
}

#[test]
fn test_list_json() {
    let dir = workspace();
    for _ in 0..2 {
        let output = fileversion(dir.path(), &["create", "a.txt", "-u"]);
        assert!(output.status.success());
    }

    let output = fileversion(dir.path(), &["list", "a.txt", "--json"]);
    assert!(output.status.success());

    let listing: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let versions = listing[0]["versions"].as_array().unwrap();
    assert_eq!(listing[0]["file"], "a.txt");
    assert_eq!(versions.len(), 2);
    assert_eq!(versions[0]["sequence"], 2);
    assert_eq!(versions[0]["timezone_format"], "utc");
    assert_eq!(versions[0]["compression"], "none");
}

#[test]
fn test_retention_reports_removed_versions() {
    let dir = workspace();

    let first = fileversion(dir.path(), &["create", "a.txt", "-m", "1"]);
    assert!(first.status.success());
    assert!(!stdout(&first).contains("Removed"));

    let second = fileversion(dir.path(), &["create", "a.txt", "-m", "1"]);
    assert!(second.status.success());
    assert!(stdout(&second).contains("Removed 1 version(s)"));
    assert_eq!(fs::read_dir(dir.path().join("versions")).unwrap().count(), 1);
}

#[test]
fn test_glob_expansion_and_custom_versions_path() {
    let dir = workspace();
    fs::write(dir.path().join("b.txt"), "b").unwrap();

    let output = fileversion(dir.path(), &["create", "*.txt", "-d", "backups"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&output).matches("Created version: ").count(), 2);
    assert_eq!(fs::read_dir(dir.path().join("backups")).unwrap().count(), 2);
}

#[test]
fn test_restore_requires_target() {
    let dir = workspace();
    let output = fileversion(dir.path(), &["restore", "whatever.txt"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("--target"));
}

#[test]
fn test_create_missing_file_fails() {
    let dir = workspace();
    let output = fileversion(dir.path(), &["create", "missing.txt", "a.txt"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Error processing missing.txt"));
    assert!(stdout(&output).contains("Created version: "));
}

#[test]
fn test_list_missing_original_is_reported() {
    let dir = workspace();
    let output = fileversion(dir.path(), &["list", "missing.txt"]);

    assert!(output.status.success());
    assert!(stdout(&output).contains("Error: File missing.txt does not exist"));
}

#[test]
fn test_invalid_max_versions() {
    let dir = workspace();
    let output = fileversion(dir.path(), &["create", "a.txt", "-m", "0"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Invalid configuration"));
}

#[test]
fn test_create_rejects_unreadable_delimiter() {
    let dir = workspace();
    let output = fileversion(dir.path(), &["create", "a.txt", "-D", "_"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Invalid configuration"));
    assert!(!dir.path().join("versions").exists());
}

#[test]
fn test_create_rejects_delimiter_in_extension() {
    let dir = workspace();
    fs::write(dir.path().join("notes.v--2"), "x").unwrap();

    let output = fileversion(dir.path(), &["create", "notes.v--2"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Error processing notes.v--2"));
    assert_eq!(fs::read_dir(dir.path().join("versions")).unwrap().count(), 0);
}

#[test]
fn test_warning_printed_only_when_nothing_removed() {
    let dir = workspace();
    fs::create_dir(dir.path().join("versions")).unwrap();
    fs::write(dir.path().join("versions").join("a--junk.txt"), "junk").unwrap();

    let first = fileversion(dir.path(), &["create", "a.txt", "-m", "1"]);
    assert!(first.status.success());
    assert!(stdout(&first).contains("Warning: Error analyzing"));

    let second = fileversion(dir.path(), &["create", "a.txt", "-m", "1"]);
    assert!(second.status.success());
    let out = stdout(&second);
    assert!(out.contains("Removed 1 version(s)"));
    assert!(!out.contains("Warning:"));
}
