//! Integration tests for stagepack-cli.
//!
//! Note: Tests use `unwrap`/`expect` which is acceptable in test code.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use stagepack_core::Codec;
use stagepack_core::list_entries;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use tempfile::TempDir;

fn stagepack_cmd() -> Command {
    let mut cmd = cargo_bin_cmd!("stagepack");
    cmd.env_remove("SOURCE_DATE_EPOCH").env_remove("RUST_LOG");
    cmd
}

/// Creates a staging tree with a nested file and an executable.
fn staging_tree() -> TempDir {
    let temp = TempDir::new().expect("failed to create temp dir");
    fs::create_dir(temp.path().join("bin")).unwrap();
    fs::write(temp.path().join("bin/tool"), "#!/bin/sh\n").unwrap();
    fs::write(temp.path().join("README.md"), "# pkg\n").unwrap();
    temp
}

fn build_archive(stage: &Path, output: &Path) {
    stagepack_cmd()
        .arg("build")
        .arg(output)
        .arg(stage)
        .assert()
        .success();
}

#[test]
fn test_version_flag() {
    stagepack_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("stagepack"));
}

#[test]
fn test_help_flag() {
    stagepack_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("build"))
        .stdout(predicate::str::contains("list"));
}

#[test]
fn test_build_help() {
    stagepack_cmd()
        .arg("build")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("STAGING_ROOT"))
        .stdout(predicate::str::contains("SOURCE_DATE_EPOCH"));
}

#[test]
fn test_build_command_basic() {
    let stage = staging_tree();
    let out = TempDir::new().unwrap();
    let output = out.path().join("pkg.tar.gz");

    stagepack_cmd()
        .arg("build")
        .arg(&output)
        .arg(stage.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Archive built"));

    let names: Vec<_> = list_entries(&output)
        .unwrap()
        .into_iter()
        .map(|e| e.name)
        .collect();
    assert_eq!(names, vec!["README.md", "bin", "bin/tool"]);
}

#[test]
fn test_build_command_json_output() {
    let stage = staging_tree();
    let out = TempDir::new().unwrap();
    let output = out.path().join("pkg.tar.gz");

    let stdout = stagepack_cmd()
        .arg("--json")
        .arg("build")
        .arg(&output)
        .arg(stage.path())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&stdout).expect("invalid JSON output");
    assert_eq!(json["status"], "success");
    assert_eq!(json["operation"], "build");
    assert_eq!(json["data"]["files_added"], 2);
    assert_eq!(json["data"]["directories_added"], 1);
    assert!(json["data"]["bytes_compressed"].as_u64().unwrap() > 0);
}

#[test]
fn test_build_codec_from_extension_and_flag() {
    let stage = staging_tree();
    let out = TempDir::new().unwrap();

    let xz = out.path().join("pkg.tar.xz");
    build_archive(stage.path(), &xz);
    assert_eq!(Codec::from_magic(&fs::read(&xz).unwrap()), Some(Codec::Xz));

    let forced = out.path().join("pkg.tar.gz");
    stagepack_cmd()
        .args(["build", "--codec", "bzip2"])
        .arg(&forced)
        .arg(stage.path())
        .assert()
        .success();
    assert_eq!(
        Codec::from_magic(&fs::read(&forced).unwrap()),
        Some(Codec::Bzip2)
    );
}

#[test]
fn test_build_with_mtime_is_reproducible() {
    let stage = staging_tree();
    let out = TempDir::new().unwrap();
    let first = out.path().join("first.tar.zst");
    let second = out.path().join("second.tar.zst");

    for output in [&first, &second] {
        stagepack_cmd()
            .args(["build", "--mtime", "1700000000"])
            .arg(output)
            .arg(stage.path())
            .assert()
            .success();
    }

    assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());
    assert!(
        list_entries(&first)
            .unwrap()
            .iter()
            .all(|e| e.mtime == 1_700_000_000)
    );
}

#[test]
fn test_build_reads_source_date_epoch() {
    let stage = staging_tree();
    let out = TempDir::new().unwrap();
    let output = out.path().join("pkg.tar.gz");

    stagepack_cmd()
        .env("SOURCE_DATE_EPOCH", "315532800")
        .arg("build")
        .arg(&output)
        .arg(stage.path())
        .assert()
        .success();

    assert!(
        list_entries(&output)
            .unwrap()
            .iter()
            .all(|e| e.mtime == 315_532_800)
    );
}

#[test]
fn test_build_missing_staging_root_fails() {
    let out = TempDir::new().unwrap();
    let output = out.path().join("pkg.tar.gz");

    stagepack_cmd()
        .arg("build")
        .arg(&output)
        .arg(out.path().join("missing"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("staging root"))
        .stderr(predicate::str::contains("HINT"));

    assert!(!output.exists());
}

#[test]
fn test_build_failure_json_output() {
    let out = TempDir::new().unwrap();
    let output = out.path().join("pkg.tar.gz");

    let stdout = stagepack_cmd()
        .arg("--json")
        .arg("build")
        .arg(&output)
        .arg(out.path().join("missing"))
        .assert()
        .failure()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&stdout).expect("invalid JSON output");
    assert_eq!(json["status"], "error");
    assert_eq!(json["operation"], "build");
    assert!(json["error"].as_str().unwrap().contains("staging root"));
}

#[test]
fn test_build_rejects_invalid_level() {
    let stage = staging_tree();
    let out = TempDir::new().unwrap();

    stagepack_cmd()
        .args(["build", "-l", "11"])
        .arg(out.path().join("pkg.tar.gz"))
        .arg(stage.path())
        .assert()
        .failure();
}

#[test]
fn test_build_quiet_mode() {
    let stage = staging_tree();
    let out = TempDir::new().unwrap();

    stagepack_cmd()
        .arg("--quiet")
        .arg("build")
        .arg(out.path().join("pkg.tar.gz"))
        .arg(stage.path())
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_build_in_place() {
    let stage = staging_tree();
    let out = TempDir::new().unwrap();
    let output = out.path().join("pkg.tar.gz");

    stagepack_cmd()
        .args(["build", "--in-place"])
        .arg(&output)
        .arg(stage.path())
        .assert()
        .success();

    assert_eq!(list_entries(&output).unwrap().len(), 3);
}

#[test]
fn test_build_verbose_logs_to_stderr() {
    let stage = staging_tree();
    let out = TempDir::new().unwrap();

    stagepack_cmd()
        .arg("--verbose")
        .arg("build")
        .arg(out.path().join("pkg.tar.gz"))
        .arg(stage.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("archive built"));
}

#[test]
fn test_list_command() {
    let stage = staging_tree();
    let out = TempDir::new().unwrap();
    let output = out.path().join("pkg.tar.gz");
    build_archive(stage.path(), &output);

    stagepack_cmd()
        .arg("list")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("README.md"))
        .stdout(predicate::str::contains("bin/tool"));
}

#[test]
fn test_list_long_shows_normalized_owner() {
    let stage = staging_tree();
    let out = TempDir::new().unwrap();
    let output = out.path().join("pkg.tar.gz");
    build_archive(stage.path(), &output);

    stagepack_cmd()
        .args(["list", "--long"])
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("root/root"))
        .stdout(predicate::str::contains("Total: 3 entries"));
}

#[test]
fn test_list_json_output() {
    let stage = staging_tree();
    let out = TempDir::new().unwrap();
    let output = out.path().join("pkg.tar.bz2");
    build_archive(stage.path(), &output);

    let stdout = stagepack_cmd()
        .args(["--json", "list", "--long"])
        .arg(&output)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&stdout).expect("invalid JSON output");
    assert_eq!(json["operation"], "list");
    assert_eq!(json["data"]["total_entries"], 3);
    assert_eq!(json["data"]["entries"][0]["name"], "README.md");
    assert_eq!(json["data"]["entries"][0]["uname"], "root");
    assert_eq!(json["data"]["entries"][1]["kind"], "directory");
}

#[test]
fn test_list_rejects_non_archive() {
    let out = TempDir::new().unwrap();
    let bogus: PathBuf = out.path().join("notes.tar.gz");
    fs::write(&bogus, "just text").unwrap();

    stagepack_cmd()
        .arg("list")
        .arg(&bogus)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid archive"));
}
