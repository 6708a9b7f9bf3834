//! Edge case integration tests for pdd CLI.
//!
//! These tests cover boundary conditions of the block partition:
//! - Empty and one-byte inputs
//! - Sizes that are exact multiples of the block size
//! - More workers than blocks
//! - Larger files with many blocks

#[path = "../common/mod.rs"]
mod common;

use assert_cmd::cargo::cargo_bin_cmd;
use common::{TestFixture, pattern};
use predicates::prelude::*;

#[test]
fn test_empty_input() {
    let fx = TestFixture::new();
    fx.write_input(b"");

    let mut cmd = cargo_bin_cmd!("pdd");
    cmd.arg("-if")
        .arg(fx.input())
        .arg("-of")
        .arg(fx.output())
        .assert()
        .success()
        .stdout(predicate::str::contains("0 blocks, 0 bytes"));

    assert!(fx.output().exists());
    assert!(fx.read_output().is_empty());
}

#[test]
fn test_single_byte_that_looks_like_gzip() {
    let fx = TestFixture::new();
    fx.write_input(&[0x1f]);

    let mut cmd = cargo_bin_cmd!("pdd");
    cmd.arg("-if")
        .arg(fx.input())
        .arg("-of")
        .arg(fx.output())
        .assert()
        .success()
        .stdout(predicate::str::contains("Plain file detected."));

    assert_eq!(fx.read_output(), vec![0x1f]);
}

#[test]
fn test_exact_multiple_of_block_size() {
    let fx = TestFixture::new();
    let data = pattern(1024);
    fx.write_input(&data);

    let mut cmd = cargo_bin_cmd!("pdd");
    cmd.arg("-if")
        .arg(fx.input())
        .arg("-of")
        .arg(fx.output())
        .args(["-bs", "256"])
        .assert()
        .success()
        .stdout(predicate::str::contains("4 blocks, 1024 bytes"));

    assert_eq!(fx.read_output(), data);
}

#[test]
fn test_more_workers_than_blocks() {
    let fx = TestFixture::new();
    let data = pattern(100);
    fx.write_input(&data);

    let mut cmd = cargo_bin_cmd!("pdd");
    cmd.arg("-if")
        .arg(fx.input())
        .arg("-of")
        .arg(fx.output())
        .args(["-workers", "16"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 blocks, 100 bytes"));

    assert_eq!(fx.read_output(), data);
}

#[test]
fn test_block_larger_than_file() {
    let fx = TestFixture::new();
    let data = pattern(3000);
    fx.write_input(&data);

    let mut cmd = cargo_bin_cmd!("pdd");
    cmd.arg("-if")
        .arg(fx.input())
        .arg("-of")
        .arg(fx.output())
        .args(["-bs", "1048576"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 blocks"));

    assert_eq!(fx.read_output(), data);
}

#[test]
fn test_large_file_many_blocks() {
    let fx = TestFixture::new();
    let data = pattern(5 * 1024 * 1024 + 17);
    fx.write_input(&data);

    let mut cmd = cargo_bin_cmd!("pdd");
    cmd.arg("-if")
        .arg(fx.input())
        .arg("-of")
        .arg(fx.output())
        .args(["-bs", "65536", "-workers", "8", "-q"])
        .assert()
        .success()
        .stdout(predicate::str::contains("81 blocks"));

    assert_eq!(fx.read_output(), data);
}
