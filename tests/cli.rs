use assert_cmd::Command;
use predicates::prelude::*;

fn fizzy_pop() -> Command {
    let mut cmd = Command::cargo_bin("fizzy-pop").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn run_requires_url() {
    fizzy_pop()
        .args(["run", "--token", "tok", "--dry-run"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("missing required --url"));
}

#[test]
fn run_requires_at_least_one_agent() {
    fizzy_pop()
        .args(["run", "--url", "https://app.fizzy.do", "--dry-run"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("no agents configured"));
}

#[test]
fn run_requires_webhook_outside_dry_run() {
    fizzy_pop()
        .args(["run", "--url", "https://app.fizzy.do", "--token", "tok"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--webhook-url"));
}

#[test]
fn run_rejects_missing_config_file() {
    fizzy_pop()
        .args(["run", "--config", "/nonexistent/fizzy-pop.toml"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("config file not found"));
}

#[test]
fn run_rejects_invalid_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fizzy-pop.toml");
    std::fs::write(&path, "url = [\n").unwrap();

    fizzy_pop()
        .arg("run")
        .arg("--config")
        .arg(&path)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid TOML config"));
}

#[test]
fn run_rejects_duplicate_agent_names() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("agents.yaml");
    std::fs::write(
        &path,
        "url: https://app.fizzy.do\nagents:\n  - name: alice\n    token: a\n  - name: ALICE\n    token: b\n",
    )
    .unwrap();

    fizzy_pop()
        .arg("run")
        .arg("--dry-run")
        .arg("--config")
        .arg(&path)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("duplicate agent name"));
}

#[test]
fn run_aborts_when_no_agent_resolves() {
    // Nothing listens on port 1, so every identity lookup fails.
    fizzy_pop()
        .args(["run", "--url", "http://127.0.0.1:1", "--token", "tok", "--dry-run"])
        .timeout(std::time::Duration::from_secs(60))
        .assert()
        .code(3)
        .stderr(predicate::str::contains("no active agents"));
}

#[test]
fn schema_describes_config_file() {
    fizzy_pop()
        .arg("schema")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"agents\""))
        .stdout(predicate::str::contains("\"agent_poll\""));
}
