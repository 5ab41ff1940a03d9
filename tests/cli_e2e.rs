//! End-to-end CLI tests for the citematch binary.

use assert_cmd::Command;
use predicates::prelude::*;

/// Test that invoking without a subcommand fails with usage information.
#[test]
fn test_binary_without_subcommand_fails_with_usage() {
    let mut cmd = Command::cargo_bin("citematch").unwrap();
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

/// Test that --help displays usage information and exits with code 0.
#[test]
fn test_binary_help_displays_usage() {
    let mut cmd = Command::cargo_bin("citematch").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Link encyclopedia book citations",
        ));
}

/// Test that --version displays version and exits with code 0.
#[test]
fn test_binary_version_displays_version() {
    let mut cmd = Command::cargo_bin("citematch").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("citematch"));
}

/// Test that invalid flags cause non-zero exit.
#[test]
fn test_binary_invalid_flag_returns_error() {
    let mut cmd = Command::cargo_bin("citematch").unwrap();
    cmd.arg("--invalid-flag")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

/// Test that a missing model file fails with a readable message.
#[test]
fn test_match_missing_model_file_fails() {
    let mut cmd = Command::cargo_bin("citematch").unwrap();
    cmd.args([
        "match",
        "{{cite book |title=The Eighth Land}}",
        "--model",
        "/nonexistent/model.json",
    ])
    .assert()
    .failure()
    .stderr(predicate::str::contains("model"));
}

/// Test that a malformed model artifact is rejected before any network use.
#[test]
fn test_match_malformed_model_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let model = dir.path().join("model.json");
    std::fs::write(&model, "{\"weights\": [1.0]}").unwrap();

    let mut cmd = Command::cargo_bin("citematch").unwrap();
    cmd.args([
        "match",
        "{{cite book |title=The Eighth Land}}",
        "--model",
        model.to_str().unwrap(),
    ])
    .assert()
    .failure();
}

/// Test the concat subcommand end to end (no network involved).
#[test]
fn test_concat_combines_partition_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let header = "title_ia,author_ia,publisher_ia,date_ia,url_ia,input_citation,match";
    let part1 = dir.path().join("part1.csv");
    let part2 = dir.path().join("part2.csv");
    std::fs::write(&part1, format!("{header}\nbook one,,,,,ref-1,true\n")).unwrap();
    std::fs::write(&part2, format!("{header}\nbook two,,,,,ref-2,false\n")).unwrap();
    let output = dir.path().join("all.csv");

    let mut cmd = Command::cargo_bin("citematch").unwrap();
    cmd.args([
        "concat",
        part1.to_str().unwrap(),
        part2.to_str().unwrap(),
        "--output",
        output.to_str().unwrap(),
    ])
    .assert()
    .success();

    let combined = std::fs::read_to_string(&output).unwrap();
    assert!(combined.contains("ref-1"));
    assert!(combined.contains("ref-2"));
}
