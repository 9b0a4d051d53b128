//! Argument validation of the binaries. Anything past validation
//! needs `/dev/mem` and is covered by the simulator tests instead.

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn rpu_ctl_rejects_out_of_range_mode() {
    Command::cargo_bin("rpu-ctl")
        .unwrap()
        .arg("9")
        .assert()
        .failure()
        .stderr(predicate::str::contains("9").and(predicate::str::contains("0..=3")));
}

#[test]
fn rpu_ctl_rejects_non_integer_mode() {
    Command::cargo_bin("rpu-ctl")
        .unwrap()
        .arg("fast")
        .assert()
        .failure();
}

#[test]
fn rpu_ctl_requires_a_mode() {
    Command::cargo_bin("rpu-ctl").unwrap().assert().failure();
}

#[test]
fn rpu_ctl_help_names_the_modes() {
    Command::cargo_bin("rpu-ctl")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("SLOW").and(predicate::str::contains("release")));
}

#[test]
fn rpu_ctld_help_names_the_control_dir() {
    Command::cargo_bin("rpu-ctld")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("control-dir"));
}
