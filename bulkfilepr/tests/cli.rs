//! CLI tests for the `bulkfilepr` binary.
//!
//! Spawns the binary and checks exit codes and output for paths that do not
//! need a hosting service.

use std::fs;
use std::process::{Command, Output};

use bulkfilepr::exit_codes;

fn bulkfilepr(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_bulkfilepr"))
        .args(args)
        .output()
        .expect("spawn bulkfilepr")
}

#[test]
fn no_arguments_is_a_usage_error() {
    assert_eq!(bulkfilepr(&[]).status.code(), Some(exit_codes::USAGE));
}

#[test]
fn unknown_subcommand_is_a_usage_error() {
    assert_eq!(
        bulkfilepr(&["frobnicate"]).status.code(),
        Some(exit_codes::USAGE)
    );
}

#[test]
fn version_and_help_succeed() {
    let version = bulkfilepr(&["--version"]);
    assert_eq!(version.status.code(), Some(exit_codes::OK));
    assert!(String::from_utf8_lossy(&version.stdout).starts_with("bulkfilepr version "));

    let help = bulkfilepr(&["apply", "--help"]);
    assert_eq!(help.status.code(), Some(exit_codes::OK));
    assert!(String::from_utf8_lossy(&help.stdout).contains("--expect-sha256"));
}

#[test]
fn missing_required_flags_are_usage_errors() {
    let cases: [&[&str]; 3] = [
        &["apply", "--repo-path", "a", "--new-file", "b"],
        &["apply", "--mode", "upsert", "--new-file", "b"],
        &["apply", "--mode", "upsert", "--repo-path", "a"],
    ];
    for args in cases {
        assert_eq!(
            bulkfilepr(args).status.code(),
            Some(exit_codes::USAGE),
            "args: {args:?}"
        );
    }
}

#[test]
fn invalid_mode_is_a_usage_error() {
    let out = bulkfilepr(&[
        "apply", "--mode", "always", "--repo-path", "a", "--new-file", "b",
    ]);
    assert_eq!(out.status.code(), Some(exit_codes::USAGE));
    assert!(String::from_utf8_lossy(&out.stderr).contains("invalid mode"));
}

#[test]
fn match_without_fingerprint_is_a_usage_error() {
    let out = bulkfilepr(&[
        "apply", "--mode", "match", "--repo-path", "a", "--new-file", "b",
    ]);
    assert_eq!(out.status.code(), Some(exit_codes::USAGE));
    assert!(String::from_utf8_lossy(&out.stderr).contains("expect-sha256 is required"));
}

#[test]
fn absolute_repo_path_is_a_usage_error() {
    let out = bulkfilepr(&[
        "apply", "--mode", "upsert", "--repo-path", "/tmp/outside.txt", "--new-file", "b",
    ]);
    assert_eq!(out.status.code(), Some(exit_codes::USAGE));
    assert!(String::from_utf8_lossy(&out.stderr).contains("relative path inside the repository"));
}

#[test]
fn zero_timeout_is_a_usage_error() {
    let out = bulkfilepr(&[
        "apply",
        "--mode",
        "upsert",
        "--repo-path",
        "a",
        "--new-file",
        "b",
        "--timeout-secs",
        "0",
    ]);
    assert_eq!(out.status.code(), Some(exit_codes::USAGE));
}

#[test]
fn unreadable_new_file_is_an_operational_error() {
    let temp = tempfile::tempdir().expect("tempdir");
    let missing = temp.path().join("missing.yml");
    let out = Command::new(env!("CARGO_BIN_EXE_bulkfilepr"))
        .current_dir(temp.path())
        .args(["apply", "--mode", "upsert", "--repo-path", "a.yml", "--new-file"])
        .arg(&missing)
        .output()
        .expect("spawn bulkfilepr");

    assert_eq!(out.status.code(), Some(exit_codes::OPERATIONAL));
    assert!(String::from_utf8_lossy(&out.stderr).contains("failed to read new file"));
    assert!(out.stdout.is_empty());
}

#[test]
fn hash_prints_sha256_of_file() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join("hello.txt");
    fs::write(&path, "hello\n").expect("write");

    let out = Command::new(env!("CARGO_BIN_EXE_bulkfilepr"))
        .arg("hash")
        .arg(&path)
        .output()
        .expect("spawn bulkfilepr");

    assert_eq!(out.status.code(), Some(exit_codes::OK));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.starts_with(
        "5891b5b522d5df086d0ff0b110fbd9d21bb4fc7163af34d08286a2e846f6be03  "
    ));
}

#[test]
fn hash_of_missing_file_is_an_operational_error() {
    let out = bulkfilepr(&["hash", "/definitely/not/here.txt"]);
    assert_eq!(out.status.code(), Some(exit_codes::OPERATIONAL));
}
