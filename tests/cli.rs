use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn help_lists_all_subcommands() {
    Command::cargo_bin("clipsmith")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("fetch"))
        .stdout(predicate::str::contains("transcribe"))
        .stdout(predicate::str::contains("clip"))
        .stdout(predicate::str::contains("filter"));
}

#[test]
fn filter_help_lists_filter_names() {
    Command::cargo_bin("clipsmith")
        .unwrap()
        .args(["filter", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("grayscale"))
        .stdout(predicate::str::contains("vignette"));
}

#[test]
fn unknown_filter_name_is_rejected() {
    Command::cargo_bin("clipsmith")
        .unwrap()
        .args(["filter", "in.mp4", "solarize", "-o", "out.mp4"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("solarize"));
}

#[test]
fn clip_requires_start_and_end() {
    Command::cargo_bin("clipsmith")
        .unwrap()
        .args(["clip", "in.mp4", "-o", "out.mp4"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--start"));
}
