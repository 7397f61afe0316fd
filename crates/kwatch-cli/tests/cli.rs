use assert_cmd::Command;
use predicates::prelude::*;

fn kwatch() -> Command {
    Command::cargo_bin("kwatch").expect("binary builds")
}

#[test]
fn help_describes_the_command() {
    kwatch()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Watches resources"))
        .stdout(predicate::str::contains("--all-namespaces"))
        .stdout(predicate::str::contains("kwatch pods -o wide"));
}

#[test]
fn version_prints() {
    kwatch()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("kwatch"));
}

#[test]
fn missing_resource_argument_fails() {
    kwatch()
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}

#[test]
fn known_but_unsupported_output_formats_fail_fast() {
    kwatch()
        .args(["pods", "-o", "yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported output format"))
        .stderr(predicate::str::contains("allowed formats are: wide"));
}

#[test]
fn unknown_output_formats_fail_fast() {
    kwatch()
        .args(["pods", "-o", "fancy"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown output format"));
}

#[test]
fn malformed_hide_deleted_duration_fails_fast() {
    kwatch()
        .args(["pods", "--hide-deleted", "10 minutes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid duration"));
}
