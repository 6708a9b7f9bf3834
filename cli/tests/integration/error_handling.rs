//! Error handling integration tests for pdd CLI.
//!
//! These tests verify that fatal errors:
//! - print an `Error:` diagnostic and exit non-zero
//! - never create or truncate the output when setup fails

#[path = "../common/mod.rs"]
mod common;

use assert_cmd::cargo::cargo_bin_cmd;
use common::{TestFixture, pattern};
use predicates::prelude::*;
use std::fs;

#[test]
fn test_missing_output_flag() {
    let fx = TestFixture::new();
    fx.write_input(&pattern(100));

    let mut cmd = cargo_bin_cmd!("pdd");
    cmd.arg("-if")
        .arg(fx.input())
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "Error: Both input file (-if) and output file (-of) are required.",
        ))
        .stderr(predicate::str::contains("Usage"));

    // Only the input exists
    assert_eq!(fx.entry_count(), 1);
}

#[test]
fn test_missing_input_flag_leaves_output_untouched() {
    let fx = TestFixture::new();
    fs::write(fx.output(), b"keep me").unwrap();

    let mut cmd = cargo_bin_cmd!("pdd");
    cmd.arg("-of")
        .arg(fx.output())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("are required"));

    assert_eq!(fx.read_output(), b"keep me");
}

#[test]
fn test_no_arguments() {
    let mut cmd = cargo_bin_cmd!("pdd");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_input_not_found() {
    let fx = TestFixture::new();

    let mut cmd = cargo_bin_cmd!("pdd");
    cmd.arg("-if")
        .arg(fx.input())
        .arg("-of")
        .arg(fx.output())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error: Failed to open input file"));

    assert!(!fx.output().exists());
}

#[test]
fn test_input_is_directory() {
    let fx = TestFixture::new();

    let mut cmd = cargo_bin_cmd!("pdd");
    cmd.arg("-if")
        .arg(fx.dir.path())
        .arg("-of")
        .arg(fx.output())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error:"));

    assert!(!fx.output().exists());
}

#[test]
fn test_same_file_rejected() {
    let fx = TestFixture::new();
    let data = pattern(1000);
    fx.write_input(&data);

    let mut cmd = cargo_bin_cmd!("pdd");
    cmd.arg("-if")
        .arg(fx.input())
        .arg("-of")
        .arg(fx.input())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("same file"));

    // Input survives
    assert_eq!(fs::read(fx.input()).unwrap(), data);
}

#[test]
fn test_output_directory_missing() {
    let fx = TestFixture::new();
    fx.write_input(&pattern(10));

    let mut cmd = cargo_bin_cmd!("pdd");
    cmd.arg("-if")
        .arg(fx.input())
        .arg("-of")
        .arg(fx.dir.path().join("no/such/dir/out.bin"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "Error: Failed to create or clear output file",
        ));
}

#[test]
fn test_zero_workers_rejected() {
    let fx = TestFixture::new();
    fx.write_input(&pattern(10));

    let mut cmd = cargo_bin_cmd!("pdd");
    cmd.arg("-if")
        .arg(fx.input())
        .arg("-of")
        .arg(fx.output())
        .args(["-workers", "0"])
        .assert()
        .failure();

    assert!(!fx.output().exists());
}

#[test]
fn test_worker_count_above_limit_rejected() {
    let fx = TestFixture::new();
    fx.write_input(&pattern(10));

    let mut cmd = cargo_bin_cmd!("pdd");
    cmd.arg("-if")
        .arg(fx.input())
        .arg("-of")
        .arg(fx.output())
        .args(["-workers", "100000000"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("100000000"));

    assert!(!fx.output().exists());
}

#[test]
fn test_max_worker_count_accepted() {
    let fx = TestFixture::new();
    let data = pattern(10);
    fx.write_input(&data);

    let mut cmd = cargo_bin_cmd!("pdd");
    cmd.arg("-if")
        .arg(fx.input())
        .arg("-of")
        .arg(fx.output())
        .args(["-workers", "1024", "-q"])
        .assert()
        .success()
        .stdout(predicate::str::contains("with 1024 workers"));

    assert_eq!(fx.read_output(), data);
}

#[cfg(target_os = "linux")]
#[test]
fn test_full_device_reports_no_space() {
    let full = std::path::Path::new("/dev/full");
    if !full.exists() {
        return;
    }
    let fx = TestFixture::new();
    fx.write_input(&pattern(2048));

    let mut cmd = cargo_bin_cmd!("pdd");
    let output = cmd
        .arg("-if")
        .arg(fx.input())
        .arg("-of")
        .arg(full)
        .args(["-bs", "512", "-output", "json"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["status"], "error");
    assert_eq!(value["error"]["code"], "no_space");
    assert!(!value["error"]["failed_blocks"].as_array().unwrap().is_empty());
}

#[test]
fn test_unknown_mode_rejected() {
    let fx = TestFixture::new();
    fx.write_input(&pattern(10));

    let mut cmd = cargo_bin_cmd!("pdd");
    cmd.arg("-if")
        .arg(fx.input())
        .arg("-of")
        .arg(fx.output())
        .args(["-mode", "turbo"])
        .assert()
        .failure();

    assert!(!fx.output().exists());
}

#[test]
fn test_json_error_output() {
    let fx = TestFixture::new();

    let mut cmd = cargo_bin_cmd!("pdd");
    let output = cmd
        .arg("-if")
        .arg(fx.input())
        .arg("-of")
        .arg(fx.output())
        .args(["-output", "json"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["status"], "error");
    assert_eq!(value["error"]["code"], "source_not_found");
    assert!(
        value["error"]["message"]
            .as_str()
            .unwrap()
            .contains("Failed to open input file")
    );
}
