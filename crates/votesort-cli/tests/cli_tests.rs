//! CLI integration tests using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const SAMPLE: &str = "../../data/sample_data.json";

fn votesort() -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("votesort").unwrap();
    cmd.env_remove("VOTESORT_DATA")
        .env_remove("VOTESORT_SEED")
        .env_remove("VOTESORT_VARIANT");
    cmd
}

#[test]
fn validate_sample_data() {
    votesort()
        .arg("validate")
        .arg("--data")
        .arg(SAMPLE)
        .assert()
        .success()
        .stdout(predicate::str::contains("9 records"))
        .stdout(predicate::str::contains("rank-once"))
        .stdout(predicate::str::contains("8/9"))
        .stdout(predicate::str::contains("All variants playable"));
}

#[test]
fn validate_nonexistent_file() {
    votesort()
        .arg("validate")
        .arg("--data")
        .arg("nonexistent.json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn validate_counts_malformed_records() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("mixed.json");
    std::fs::write(
        &path,
        r#"[
            {"title": "Good post?", "top_comments": [{"body": "a long enough answer here"}]},
            {"title": "Broken post?", "top_comments": null},
            "not a record"
        ]"#,
    )
    .unwrap();

    votesort()
        .arg("validate")
        .arg("--data")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("3 records"))
        .stdout(predicate::str::contains("Malformed"))
        .stdout(predicate::str::contains("1/3"));
}

#[test]
fn deal_prints_pair_puzzle_json() {
    let output = votesort()
        .args(["deal", "--variant", "pair", "--seed", "3", "--data", SAMPLE])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["variant"], "pair");
    assert_eq!(json["questions"].as_array().unwrap().len(), 5);
    assert_eq!(json["answers"].as_array().unwrap().len(), 5);
}

#[test]
fn deal_is_reproducible_with_seed() {
    let deal = || {
        votesort()
            .args(["deal", "--variant", "rank", "--seed", "99", "--data", SAMPLE])
            .output()
            .unwrap()
            .stdout
    };
    assert_eq!(deal(), deal());
}

#[test]
fn deal_unknown_variant() {
    votesort()
        .args(["deal", "--variant", "bingo", "--data", SAMPLE])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown variant"));
}

#[test]
fn deal_with_too_little_data() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tiny.json");
    std::fs::write(
        &path,
        r#"[["a","Only question here?",10,null,null,[["A long enough answer",5],["b",2],["c",1]]]]"#,
    )
    .unwrap();

    votesort()
        .args(["deal", "--variant", "match", "--data"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("insufficient data"));
}

#[test]
fn deal_missing_dated_file() {
    let dir = TempDir::new().unwrap();

    votesort()
        .current_dir(dir.path())
        .args(["deal", "--variant", "rank"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no data file for"));
}

#[test]
fn play_rank_once_submit_scores() {
    votesort()
        .args(["play", "--variant", "rank-once", "--seed", "5", "--data", SAMPLE])
        .write_stdin("submit\nsubmit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Score"))
        .stdout(predicate::str::contains("Rejected: illegal transition"))
        .stdout(predicate::str::contains("Games played: 1"));
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    votesort()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created votesort.toml"))
        .stdout(predicate::str::contains("Created data/sample_data.json"));

    assert!(dir.path().join("votesort.toml").exists());
    assert!(dir.path().join("data/sample_data.json").exists());

    // The starter config points at the sample data.
    votesort()
        .current_dir(dir.path())
        .arg("deal")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"variant\": \"rank\""));
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();

    // First init
    votesort()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success();

    // Second init should skip
    votesort()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn help_output() {
    votesort()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Guess how the crowd voted"));
}

#[test]
fn version_output() {
    votesort()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("votesort"));
}
