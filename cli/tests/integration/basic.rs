//! Basic functionality integration tests for pdd CLI.

#[path = "../common/mod.rs"]
mod common;

use assert_cmd::cargo::cargo_bin_cmd;
use common::{TestFixture, pattern};
use predicates::prelude::*;
use rstest::rstest;
use std::fs;

#[test]
fn test_basic_block_copy() {
    let fx = TestFixture::new();
    let data = pattern(1000);
    fx.write_input(&data);

    let mut cmd = cargo_bin_cmd!("pdd");
    cmd.arg("-if")
        .arg(fx.input())
        .arg("-of")
        .arg(fx.output())
        .args(["-bs", "300", "-workers", "4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Starting operation..."))
        .stdout(predicate::str::contains("4 blocks"))
        .stdout(predicate::str::contains("1000 bytes"))
        .stdout(predicate::str::contains("Operation completed successfully."));

    assert_eq!(fx.read_output(), data);
}

#[rstest]
#[case(1)]
#[case(2)]
#[case(3)]
#[case(16)]
fn test_output_identical_for_any_worker_count(#[case] workers: usize) {
    let fx = TestFixture::new();
    let data = pattern(10_000);
    fx.write_input(&data);

    let mut cmd = cargo_bin_cmd!("pdd");
    cmd.arg("-if")
        .arg(fx.input())
        .arg("-of")
        .arg(fx.output())
        .args(["-bs", "333"])
        .arg("-workers")
        .arg(workers.to_string())
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("with {workers} workers")));

    assert_eq!(fx.read_output(), data);
}

#[rstest]
#[case(&["-bs=256", "-workers=2"])]
#[case(&["--bs", "256", "--workers", "2"])]
#[case(&["--bs=256", "--workers=2"])]
fn test_flag_spellings(#[case] flags: &[&str]) {
    let fx = TestFixture::new();
    let data = pattern(1024);
    fx.write_input(&data);

    let mut cmd = cargo_bin_cmd!("pdd");
    cmd.arg(format!("-if={}", fx.input().display()))
        .arg(format!("-of={}", fx.output().display()))
        .args(flags)
        .assert()
        .success()
        .stdout(predicate::str::contains("4 blocks"));

    assert_eq!(fx.read_output(), data);
}

#[test]
fn test_copy_is_idempotent() {
    let fx = TestFixture::new();
    let data = pattern(5000);
    fx.write_input(&data);

    for _ in 0..2 {
        let mut cmd = cargo_bin_cmd!("pdd");
        cmd.arg("-if")
            .arg(fx.input())
            .arg("-of")
            .arg(fx.output())
            .args(["-bs", "700"])
            .assert()
            .success();
        assert_eq!(fx.read_output(), data);
    }
}

#[test]
fn test_existing_output_is_truncated() {
    let fx = TestFixture::new();
    let data = pattern(100);
    fx.write_input(&data);
    fs::write(fx.output(), vec![b'z'; 10_000]).unwrap();

    let mut cmd = cargo_bin_cmd!("pdd");
    cmd.arg("-if")
        .arg(fx.input())
        .arg("-of")
        .arg(fx.output())
        .assert()
        .success();

    assert_eq!(fx.read_output(), data);
}

#[rstest]
#[case("abc")]
#[case("0")]
#[case("-5")]
#[case("2147483648")]
#[case("1099511627776")]
fn test_invalid_block_size_falls_back(#[case] bs: &str) {
    let fx = TestFixture::new();
    let data = pattern(1000);
    fx.write_input(&data);

    let mut cmd = cargo_bin_cmd!("pdd");
    cmd.arg("-if")
        .arg(fx.input())
        .arg("-of")
        .arg(fx.output())
        .arg("-bs")
        .arg(bs)
        .assert()
        .success()
        .stderr(predicate::str::contains(format!(
            "Warning: Invalid block size: {bs}. Using default block size of 512 bytes."
        )))
        .stdout(predicate::str::contains("2 blocks"));

    assert_eq!(fx.read_output(), data);
}

#[test]
fn test_quiet_still_prints_summary() {
    let fx = TestFixture::new();
    fx.write_input(&pattern(2048));

    let mut cmd = cargo_bin_cmd!("pdd");
    cmd.arg("-if")
        .arg(fx.input())
        .arg("-of")
        .arg(fx.output())
        .arg("-quiet")
        .assert()
        .success()
        .stdout(predicate::str::contains("4 blocks"));
}

#[test]
fn test_verbose_prints_details() {
    let fx = TestFixture::new();
    fx.write_input(&pattern(2048));

    let mut cmd = cargo_bin_cmd!("pdd");
    cmd.arg("-if")
        .arg(fx.input())
        .arg("-of")
        .arg(fx.output())
        .arg("-verbose")
        .assert()
        .success()
        .stdout(predicate::str::contains("Strategy:       blocks"))
        .stdout(predicate::str::contains("Block size:     512 bytes"));
}

#[test]
fn test_fsync_flag() {
    let fx = TestFixture::new();
    let data = pattern(4096);
    fx.write_input(&data);

    let mut cmd = cargo_bin_cmd!("pdd");
    cmd.arg("-if")
        .arg(fx.input())
        .arg("-of")
        .arg(fx.output())
        .arg("-fsync")
        .assert()
        .success();

    assert_eq!(fx.read_output(), data);
}

#[test]
fn test_json_output() {
    let fx = TestFixture::new();
    fx.write_input(&pattern(1000));

    let mut cmd = cargo_bin_cmd!("pdd");
    let output = cmd
        .arg("-if")
        .arg(fx.input())
        .arg("-of")
        .arg(fx.output())
        .args(["-bs", "300", "-output", "json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["status"], "ok");
    assert_eq!(value["format"], "plain");
    assert_eq!(value["strategy"], "blocks");
    assert_eq!(value["blocks_total"], 4);
    assert_eq!(value["blocks_copied"], 4);
    assert_eq!(value["bytes_copied"], 1000);
    assert_eq!(value["block_size"], 300);
    assert_eq!(value["workers"], 4);
}

#[test]
fn test_help() {
    let mut cmd = cargo_bin_cmd!("pdd");
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Block size in bytes"))
        .stdout(predicate::str::contains("--workers"));
}

#[test]
fn test_version() {
    let mut cmd = cargo_bin_cmd!("pdd");
    cmd.arg("-version")
        .assert()
        .success()
        .stdout(predicate::str::contains("pdd"));
}
