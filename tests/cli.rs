//! Integration tests for the tinyenv binary
//!
//! Every test runs against a scratch root; none of them reach the network.

#![allow(clippy::unwrap_used)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn tinyenv(root: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_tinyenv"));
    cmd.env("TINYENV_ROOT", root)
        .env("NO_COLOR", "1")
        .env_remove("TINYENV_CONFIG")
        .env_remove("TINYENV_LOG");
    cmd
}

/// Lay out an installed go version without downloading anything
fn fake_install(root: &Path, version: &str) {
    let bin = root.join("go/versions").join(version).join("bin");
    fs::create_dir_all(&bin).unwrap();
    let exe = bin.join("go");
    fs::write(&exe, format!("#!/bin/sh\necho go{version}\n")).unwrap();
    fs::set_permissions(&exe, fs::Permissions::from_mode(0o755)).unwrap();
}

#[test]
fn test_help_command() {
    let root = TempDir::new().unwrap();
    tinyenv(root.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Languages:"))
        .stdout(predicate::str::contains("python install -l"));
}

#[test]
fn test_missing_command_exits_one() {
    let root = TempDir::new().unwrap();
    tinyenv(root.path()).assert().code(1);
}

#[test]
fn test_root_prints_root() {
    let root = TempDir::new().unwrap();
    tinyenv(root.path())
        .arg("root")
        .assert()
        .success()
        .stdout(predicate::str::contains(root.path().to_string_lossy().as_ref()));
    assert!(root.path().join("bin").is_dir());
}

#[test]
fn test_unknown_language_fails() {
    let root = TempDir::new().unwrap();
    tinyenv(root.path())
        .args(["cobol", "versions"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("cobol"));
}

#[test]
fn test_language_without_command_fails() {
    let root = TempDir::new().unwrap();
    tinyenv(root.path()).arg("go").assert().code(1);
}

#[test]
fn test_fresh_root_has_no_versions() {
    let root = TempDir::new().unwrap();
    tinyenv(root.path())
        .args(["go", "versions"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
    assert!(root.path().join("go/versions").is_dir());

    tinyenv(root.path()).args(["go", "version"]).assert().code(1);
}

#[test]
fn test_global_rejects_uninstalled_version() {
    let root = TempDir::new().unwrap();
    tinyenv(root.path())
        .args(["go", "global", "9.9.9"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("9.9.9"));
    assert!(!root.path().join("go/version").exists());
}

#[test]
fn test_global_then_versions_and_shims() {
    let root = TempDir::new().unwrap();
    fake_install(root.path(), "1.22.0");
    fake_install(root.path(), "1.21.5");

    tinyenv(root.path())
        .args(["go", "global", "1.22.0"])
        .assert()
        .success();
    assert_eq!(fs::read_to_string(root.path().join("go/version")).unwrap(), "1.22.0\n");
    assert!(root.path().join("bin/go").is_file());

    tinyenv(root.path())
        .args(["go", "versions"])
        .assert()
        .success()
        .stdout("* 1.22.0\n  1.21.5\n");
    tinyenv(root.path())
        .args(["go", "versions", "--bare"])
        .assert()
        .success()
        .stdout("1.22.0\n1.21.5\n");
    tinyenv(root.path())
        .args(["go", "version"])
        .assert()
        .success()
        .stdout("1.22.0\n");
    tinyenv(root.path())
        .arg("version")
        .assert()
        .success()
        .stdout("go 1.22.0\n");
    tinyenv(root.path())
        .arg("versions")
        .assert()
        .success()
        .stdout("* go 1.22.0\n  go 1.21.5\n");
}

#[test]
fn test_rehash_all_rewrites_shims() {
    let root = TempDir::new().unwrap();
    fake_install(root.path(), "1.22.0");
    fs::write(root.path().join("go/version"), "1.22.0\n").unwrap();

    tinyenv(root.path())
        .arg("rehash")
        .assert()
        .success()
        .stdout(predicate::str::contains("go: 1 shims"));
    let shim = fs::read_to_string(root.path().join("bin/go")).unwrap();
    assert!(shim.starts_with("#!/bin/sh\n# go\n"));
}

#[test]
fn test_reset_without_cache_fails() {
    let root = TempDir::new().unwrap();
    fake_install(root.path(), "1.22.0");
    fs::write(root.path().join("go/version"), "1.22.0\n").unwrap();

    tinyenv(root.path())
        .args(["go", "reset", "-"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no cache file"));
    assert!(root.path().join("go/versions/1.22.0/bin/go").is_file());
}

#[test]
fn test_missing_plugin_fails() {
    let root = TempDir::new().unwrap();
    tinyenv(root.path())
        .args(["go", "frobnicate"])
        .env("PATH", root.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("frobnicate"));
}

#[test]
fn test_completions() {
    let root = TempDir::new().unwrap();
    tinyenv(root.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("tinyenv"));
}
