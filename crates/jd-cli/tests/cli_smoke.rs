use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::NamedTempFile;

#[test]
fn help_succeeds() {
    let mut cmd = Command::cargo_bin("jd").expect("binary jd should be built");
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("Diff and patch JSON and YAML documents."));
}

#[test]
fn version_banner_matches_go_shape() {
    let mut cmd = Command::cargo_bin("jd").expect("binary jd should be built");
    cmd.arg("--version").assert().success().stdout(predicate::str::contains("jd version"));
}

#[test]
fn single_dash_version_is_normalized() {
    let mut cmd = Command::cargo_bin("jd").expect("binary jd should be built");
    cmd.arg("-version").assert().success().stdout(predicate::str::contains("jd version"));
}

fn write_temp(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp file");
    file.write_all(contents.as_bytes()).expect("write temp file");
    file
}

#[test]
fn diffs_two_files_in_native_format() {
    let lhs = write_temp("{\"a\":1}");
    let rhs = write_temp("{\"a\":2}");
    let mut cmd = Command::cargo_bin("jd").expect("binary jd should be built");
    cmd.arg(lhs.path())
        .arg(rhs.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("@ [\"a\"]"))
        .stdout(predicate::str::contains("- 1"))
        .stdout(predicate::str::contains("+ 2"));
}

#[test]
fn patch_mode_applies_a_diff_file() {
    let diff = write_temp("@ [\"a\"]\n- 1\n+ 2\n");
    let doc = write_temp("{\"a\":1}");
    let mut cmd = Command::cargo_bin("jd").expect("binary jd should be built");
    cmd.arg("-p")
        .arg(diff.path())
        .arg(doc.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"a\": 2"));
}

#[test]
fn set_mode_ignores_array_order() {
    let lhs = write_temp("[1,2,3]");
    let rhs = write_temp("[3,2,1]");
    let mut cmd = Command::cargo_bin("jd").expect("binary jd should be built");
    cmd.arg("-set")
        .arg(lhs.path())
        .arg(rhs.path())
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn output_flag_writes_to_file_instead_of_stdout() {
    let lhs = write_temp("1");
    let rhs = write_temp("2");
    let output = NamedTempFile::new().expect("create output file");
    let mut cmd = Command::cargo_bin("jd").expect("binary jd should be built");
    cmd.arg("-o")
        .arg(output.path())
        .arg(lhs.path())
        .arg(rhs.path())
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
    let written = std::fs::read_to_string(output.path()).expect("read output file");
    assert!(written.contains("- 1"));
    assert!(written.contains("+ 2"));
}

#[test]
fn port_without_bundled_assets_prints_a_notice() {
    let mut cmd = Command::cargo_bin("jd").expect("binary jd should be built");
    cmd.arg("-port")
        .arg("8080")
        .assert()
        .success()
        .stdout(predicate::str::contains("not bundled in this build"));
}
