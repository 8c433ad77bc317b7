//! Concurrency tests for the taper binary.
//!
//! Writers replace the plan file atomically, so concurrent commands may lose
//! each other's updates but must never leave a torn file behind.

use assert_cmd::Command;
use std::path::Path;
use std::thread;
use tempfile::TempDir;

fn cli(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("taper"));
    cmd.env("XDG_CONFIG_HOME", dir.join("config"))
        .arg("--data-dir")
        .arg(dir)
        .arg("--today")
        .arg("2026-04-01");
    cmd
}

fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

#[test]
fn test_concurrent_writers_leave_valid_plan() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path().to_path_buf();

    cli(&dir).arg("upcoming").assert().success();

    let handles: Vec<_> = (0..6)
        .map(|i| {
            let dir = dir.clone();
            thread::spawn(move || {
                let id = (60 + i).to_string();
                cli(&dir)
                    .args(["log", &id, "--miles", "4", "--pace", "8:30"])
                    .assert()
                    .success();
                cli(&dir).arg("upcoming").assert().success();
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Writer thread panicked");
    }

    let saved = std::fs::read_to_string(dir.join("taper_plan_v2.json")).unwrap();
    let records: Vec<serde_json::Value> =
        serde_json::from_str(&saved).expect("Plan file was torn by concurrent writers");
    assert_eq!(records.len(), 212);
    assert!(records.iter().any(|r| r["actualMiles"] == 4.0));

    // No temp files survive the renames
    let leftovers = std::fs::read_dir(&dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().map_or(true, |ext| ext != "json"))
        .count();
    assert_eq!(leftovers, 0);
}

#[test]
fn test_concurrent_readers() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path().to_path_buf();
    cli(&dir).arg("upcoming").assert().success();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let dir = dir.clone();
            thread::spawn(move || {
                cli(&dir).arg("mileage").assert().success();
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Reader thread panicked");
    }
}
