//! CLI integration tests.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn listwatch(dir: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("listwatch");
    cmd.current_dir(dir.path()).env("RUST_LOG", "off");
    cmd
}

fn write_config(dir: &Path, extra: &str) -> PathBuf {
    let path = dir.join("listwatch.toml");
    let database = dir.join("listwatch.db");
    let contents = format!(
        "database = '{}'\n\n[logging]\nlevel = \"warn\"\nformat = \"compact\"\n\n{extra}",
        database.display()
    );
    fs::write(&path, contents).expect("write temp config");
    path
}

#[test]
fn help_lists_commands() {
    let dir = tempfile::tempdir().unwrap();
    listwatch(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("sync"))
        .stdout(predicate::str::contains("lists"))
        .stdout(predicate::str::contains("segments"));
}

#[test]
fn config_validate_accepts_valid_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "[sync]\nexchanges = [\"binance\", \"upbit\"]\n");

    listwatch(&dir)
        .args(["config", "validate", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"))
        .stdout(predicate::str::contains("binance, upbit"));
}

#[test]
fn config_validate_rejects_unknown_segment_source() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "[segments]\nsources = [\"kraken\"]\n");

    listwatch(&dir)
        .args(["config", "validate", "-c"])
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown segment source 'kraken'"));
}

#[test]
fn config_validate_rejects_malformed_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    fs::write(&path, "database = [").unwrap();

    listwatch(&dir)
        .args(["config", "validate", "-c"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse config"));
}

#[test]
fn show_empty_list_prints_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "");

    listwatch(&dir)
        .args(["lists", "show", "binance_to_upbit", "-c"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn show_list_as_json() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "");

    listwatch(&dir)
        .args(["--json", "lists", "show", "okx_seg3", "-c"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""type":"list""#))
        .stdout(predicate::str::contains(r#""slug":"okx_seg3""#));
}

#[test]
fn show_unknown_list_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "");

    listwatch(&dir)
        .args(["lists", "show", "nope", "-c"])
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("list not found: nope"));
}

#[test]
fn rebuild_lists_on_empty_database_reports_counts() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "");

    listwatch(&dir)
        .args(["lists", "rebuild", "--source", "bybit", "--target", "binance", "-c"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("bybit_to_binance"));
}

#[test]
fn rebuild_segments_rejects_unknown_source() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "");

    listwatch(&dir)
        .args(["segments", "rebuild", "--source", "kraken", "-c"])
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown segment source 'kraken'"));
}

#[test]
fn slug_conflicts_with_source_filter() {
    let dir = tempfile::tempdir().unwrap();
    listwatch(&dir)
        .args(["lists", "rebuild", "--slug", "okx_to_upbit", "--source", "okx"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}
