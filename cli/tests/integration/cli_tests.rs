//! Integration tests for the mimipanel CLI surface

#![allow(clippy::expect_used)]

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn mimipanel() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("mimipanel"));
    cmd.env("NO_COLOR", "1");
    cmd.env_remove("MIMIPANEL_CONFIG");
    cmd.env_remove("MIMIPANEL_LOG");
    cmd
}

fn write_config(dir: &TempDir, yaml: &str) -> PathBuf {
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, yaml).expect("write config");
    path
}

fn missing_config(dir: &TempDir) -> PathBuf {
    dir.path().join("absent.yaml")
}

fn arg(path: &Path) -> &str {
    path.to_str().expect("utf-8 temp path")
}

// --- Help and version tests ---

#[test]
fn test_cli_help_lists_commands() {
    mimipanel()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Provision an Ubuntu host"))
        .stdout(predicate::str::contains("install"))
        .stdout(predicate::str::contains("plan"))
        .stdout(predicate::str::contains("version"));
}

#[test]
fn test_cli_version_flag_shows_version() {
    mimipanel()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_version_command_human() {
    mimipanel()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "mimipanel {}",
            env!("CARGO_PKG_VERSION")
        )));
}

#[test]
fn test_version_command_json() {
    let out = mimipanel()
        .args(["version", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let value: serde_json::Value = serde_json::from_slice(&out).expect("valid json");
    assert_eq!(value["version"], env!("CARGO_PKG_VERSION"));
}

#[test]
fn test_no_color_env_accepts_conventional_values() {
    for value in ["1", "true", "yes", "", "0"] {
        mimipanel()
            .env("NO_COLOR", value)
            .arg("version")
            .assert()
            .success()
            .stdout(predicate::str::contains("mimipanel "));
    }
}

#[test]
fn test_no_color_flag_still_works() {
    mimipanel()
        .env_remove("NO_COLOR")
        .args(["--no-color", "version"])
        .assert()
        .success();
}

#[test]
fn test_unknown_command_is_rejected() {
    mimipanel()
        .arg("deploy")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

// --- Plan tests ---

#[test]
fn test_plan_with_defaults_shows_steps_and_files() {
    let dir = TempDir::new().expect("tempdir");
    let config = missing_config(&dir);
    mimipanel()
        .args(["plan", "--config", arg(&config)])
        .assert()
        .success()
        .stdout(predicate::str::contains("1. privilege check"))
        .stdout(predicate::str::contains("8. proxy configuration"))
        .stdout(predicate::str::contains("ExecStart=/opt/mimipanel/backend"))
        .stdout(predicate::str::contains("proxy_pass http://127.0.0.1:8080;"))
        .stdout(predicate::str::contains("NEXT_PUBLIC_API_URL=http://<public-ip>/api"));
}

#[test]
fn test_plan_warns_about_root_service() {
    let dir = TempDir::new().expect("tempdir");
    let config = missing_config(&dir);
    mimipanel()
        .args(["plan", "--config", arg(&config)])
        .assert()
        .success()
        .stdout(predicate::str::contains("runs as root"));
}

#[test]
fn test_plan_json_is_valid() {
    let dir = TempDir::new().expect("tempdir");
    let config = missing_config(&dir);
    let out = mimipanel()
        .args(["plan", "--json", "--config", arg(&config)])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let value: serde_json::Value = serde_json::from_slice(&out).expect("valid json");
    assert_eq!(value["steps"].as_array().map(Vec::len), Some(8));
    assert_eq!(value["steps"][0]["step"], "privilege-check");
    assert_eq!(value["install_dir"], "/opt/mimipanel");
}

#[test]
fn test_plan_reads_config_from_env() {
    let dir = TempDir::new().expect("tempdir");
    let config = write_config(
        &dir,
        "install_dir: /opt/kralpanel\nservice:\n  name: kralpanel\n  user: kral\n",
    );
    mimipanel()
        .env("MIMIPANEL_CONFIG", arg(&config))
        .arg("plan")
        .assert()
        .success()
        .stdout(predicate::str::contains("ExecStart=/opt/kralpanel/backend"))
        .stdout(predicate::str::contains("User=kral"))
        .stdout(predicate::str::contains("runs as root").not());
}

#[test]
fn test_plan_quiet_prints_nothing() {
    let dir = TempDir::new().expect("tempdir");
    let config = missing_config(&dir);
    mimipanel()
        .args(["plan", "--quiet", "--config", arg(&config)])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

// --- Configuration errors ---

#[test]
fn test_invalid_config_exits_one_with_every_violation() {
    let dir = TempDir::new().expect("tempdir");
    let config = write_config(
        &dir,
        "install_dir: relative/dir\nfrontend:\n  port: 8080\nbackend:\n  port: 8080\n",
    );
    mimipanel()
        .args(["plan", "--config", arg(&config)])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid configuration"))
        .stderr(predicate::str::contains("must be an absolute path"))
        .stderr(predicate::str::contains("must differ"));
}

#[test]
fn test_unparseable_config_exits_one() {
    let dir = TempDir::new().expect("tempdir");
    let config = write_config(&dir, "install_dir: [unterminated\n");
    mimipanel()
        .args(["plan", "--config", arg(&config)])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("cannot parse"));
}

// --- Install tests ---

#[test]
fn test_install_on_unsupported_host_exits_one() {
    // Fails at the privilege check when unprivileged, at OS detection as root.
    let dir = TempDir::new().expect("tempdir");
    let os_release = dir.path().join("os-release");
    std::fs::write(&os_release, "ID=fedora\nNAME=\"Fedora Linux\"\n").expect("write os-release");
    let lock = dir.path().join("mimipanel.lock");
    let config = write_config(
        &dir,
        &format!(
            "platform:\n  os_release_path: {}\nlock_path: {}\n",
            os_release.display(),
            lock.display()
        ),
    );
    mimipanel()
        .args(["install", "--yes", "--config", arg(&config)])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("✗"))
        .stderr(
            predicate::str::contains("privilege check")
                .or(predicate::str::contains("OS detection")),
        );
}
