//! E2E tests for `roster` pointed at an incident service URL.
//!
//! No service is started; these cover the failure paths a user sees when the
//! service is unreachable, plus commands that never touch the network.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::Path;
use tempfile::TempDir;

/// Loopback discard port; connections are refused on test hosts.
const DEAD_URL: &str = "http://127.0.0.1:9";

fn roster_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("roster"));
    cmd.current_dir(dir);
    cmd.env("XDG_CONFIG_HOME", dir.join("config"));
    cmd.env("HOME", dir);
    cmd.env("ROSTER_URL", DEAD_URL);
    cmd.env_remove("ROSTER_TOKEN");
    cmd.env_remove("FORMAT");
    cmd.env("ROSTER_LOG", "error");
    cmd
}

#[test]
fn unreachable_service_reports_network_error() {
    let dir = TempDir::new().unwrap();
    let output = roster_cmd(dir.path())
        .args(["list", "--json"])
        .output()
        .expect("roster should not crash");

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());

    let stderr = String::from_utf8_lossy(&output.stderr);
    let json_start = stderr.find('{').expect("JSON error on stderr");
    let mut stream =
        serde_json::Deserializer::from_str(&stderr[json_start..]).into_iter::<Value>();
    let err: Value = stream.next().unwrap().unwrap();
    assert_eq!(err["error"]["error_code"], "E5101");
    assert!(
        err["error"]["suggestion"]
            .as_str()
            .unwrap()
            .contains("server.base_url")
    );
}

#[test]
fn blank_chat_fails_before_contacting_service() {
    let dir = TempDir::new().unwrap();
    roster_cmd(dir.path())
        .args(["--json", "chat", "INC-0001", " \t "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E2101"))
        .stderr(predicate::str::contains("E5101").not());
}

#[test]
fn invalid_incident_id_is_rejected_locally() {
    let dir = TempDir::new().unwrap();
    roster_cmd(dir.path())
        .args(["--json", "show", "../admin"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E2005"));
}

#[test]
fn completions_need_no_config_or_service() {
    let dir = TempDir::new().unwrap();
    roster_cmd(dir.path())
        .args(["--config", "does-not-exist.toml", "completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("roster"));
}

#[test]
fn help_lists_commands() {
    let dir = TempDir::new().unwrap();
    roster_cmd(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("chat"));
}
