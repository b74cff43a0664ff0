//! Integration tests for the `cw` CLI commands.
#![allow(deprecated)] // Command::cargo_bin – macro replacement not yet stable

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn cw() -> Command {
    Command::cargo_bin("cw").unwrap()
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

#[test]
fn config_prints_defaults_as_json() {
    let output = cw().arg("config").output().unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["grid_cell_size"], 2.0);
    assert_eq!(json["reproduction_cost"], 50.0);
    assert_eq!(json["food_value"], 5.0);
}

// ---------------------------------------------------------------------------
// simulate
// ---------------------------------------------------------------------------

#[test]
fn simulate_prints_summary() {
    cw().args(["simulate", "--ticks", "10", "--organisms", "3", "--food", "10"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Simulation"))
        .stdout(predicate::str::contains("10 ticks"))
        .stdout(predicate::str::contains("Population"))
        .stdout(predicate::str::contains("reproducer"));
}

#[test]
fn simulate_empty_scene() {
    cw().args(["simulate", "--ticks", "5", "--organisms", "0", "--food", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0 cells at start"));
}

#[test]
fn simulate_verbose_shows_event_log() {
    cw().args([
        "simulate",
        "--ticks",
        "3",
        "--organisms",
        "0",
        "--food",
        "0",
        "--verbose",
    ])
    .assert()
    .success()
    .stdout(predicate::str::contains("Event Log"))
    .stdout(predicate::str::contains("(no events)"));
}

#[test]
fn simulate_is_reproducible_for_a_seed() {
    let run = || {
        cw().args([
            "simulate",
            "--ticks",
            "20",
            "--seed",
            "7",
            "--organisms",
            "4",
            "--food",
            "30",
        ])
        .env("NO_COLOR", "1")
        .output()
        .unwrap()
        .stdout
    };
    assert_eq!(run(), run());
}

#[test]
fn simulate_with_config_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{ "food_value": 50.0, "reproduction_cost": 10.0 }"#).unwrap();

    cw().args(["simulate", "--ticks", "2", "--organisms", "2", "--food", "0", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Births"));
}

#[test]
fn simulate_rejects_bad_config() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{ "grid_cell_size": -1.0 }"#).unwrap();

    cw().args(["simulate", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("grid cell size"));
}

#[test]
fn simulate_rejects_missing_config() {
    cw().args(["simulate", "--config", "/nonexistent/config.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot read"));
}

#[test]
fn simulate_rejects_malformed_config() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, "not json").unwrap();

    cw().args(["simulate", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("malformed config"));
}

// ---------------------------------------------------------------------------
// general
// ---------------------------------------------------------------------------

#[test]
fn help_lists_subcommands() {
    cw().arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("simulate"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn unknown_subcommand_fails() {
    cw().arg("explode").assert().failure();
}
