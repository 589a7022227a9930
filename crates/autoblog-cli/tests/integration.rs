#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const CREDENTIAL_VARS: [&str; 6] = [
    "ANTHROPIC_API_KEY",
    "TWITTER_CONSUMER_KEY",
    "TWITTER_CONSUMER_SECRET",
    "TWITTER_ACCESS_TOKEN",
    "TWITTER_ACCESS_TOKEN_SECRET",
    "TWITTER_BEARER_TOKEN",
];

/// Isolated from the real home directory and credentials.
fn autoblog(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("autoblog").unwrap();
    cmd.current_dir(dir.path())
        .env("AUTOBLOG_ROOT", dir.path())
        .env("HOME", dir.path())
        .env_remove("RUST_LOG");
    for var in CREDENTIAL_VARS {
        cmd.env_remove(var);
    }
    cmd
}

fn add_topic(dir: &TempDir, title: &str, priority: i32) {
    autoblog(dir)
        .args(["topic", "add", title, "--priority", &priority.to_string()])
        .assert()
        .success();
}

fn read_json(dir: &TempDir, rel: &str) -> serde_json::Value {
    let data = std::fs::read_to_string(dir.path().join(rel)).unwrap();
    serde_json::from_str(&data).unwrap()
}

// ---------------------------------------------------------------------------
// autoblog init
// ---------------------------------------------------------------------------

#[test]
fn init_creates_config_and_directories() {
    let dir = TempDir::new().unwrap();
    autoblog(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("created: autoblog.yaml"));

    assert!(dir.path().join("autoblog.yaml").is_file());
    assert!(dir.path().join("data").is_dir());
    assert!(dir.path().join("articles").is_dir());
    let example = std::fs::read_to_string(dir.path().join(".env.example")).unwrap();
    assert!(example.contains("ANTHROPIC_API_KEY="));
}

#[test]
fn init_is_idempotent() {
    let dir = TempDir::new().unwrap();
    autoblog(&dir).arg("init").assert().success();
    autoblog(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("exists:  autoblog.yaml"));
}

// ---------------------------------------------------------------------------
// autoblog topic add / list
// ---------------------------------------------------------------------------

#[test]
fn topic_add_and_list() {
    let dir = TempDir::new().unwrap();
    autoblog(&dir)
        .args([
            "topic",
            "add",
            "Hooksで作業を自動化する",
            "--description",
            "PreToolUse hooks",
            "--tag",
            "claudecode",
            "--tag",
            "hooks",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added topic"));

    autoblog(&dir)
        .args(["topic", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Hooksで作業を自動化する"))
        .stdout(predicate::str::contains("claudecode,hooks"));

    let topics = read_json(&dir, "data/topics.json");
    assert_eq!(topics[0]["type"], "manual");
    assert_eq!(topics[0]["priority"], 5);
    assert_eq!(topics[0]["description"], "PreToolUse hooks");
}

#[test]
fn duplicate_topic_is_rejected() {
    let dir = TempDir::new().unwrap();
    add_topic(&dir, "Same title", 3);
    autoblog(&dir)
        .args(["topic", "add", "same TITLE"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already in stock"));
}

#[test]
fn topic_list_json() {
    let dir = TempDir::new().unwrap();
    add_topic(&dir, "A", 3);
    add_topic(&dir, "B", 9);

    let output = autoblog(&dir)
        .args(["topic", "list", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let topics: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(topics.as_array().unwrap().len(), 2);
}

// ---------------------------------------------------------------------------
// --status / --dry-run / --refresh
// ---------------------------------------------------------------------------

#[test]
fn status_reports_stock() {
    let dir = TempDir::new().unwrap();
    add_topic(&dir, "A", 3);
    add_topic(&dir, "B", 9);

    autoblog(&dir)
        .arg("--status")
        .assert()
        .success()
        .stdout(predicate::str::contains("available: 2"))
        .stdout(predicate::str::contains("posted:    0"));
}

#[test]
fn status_json_has_counts() {
    let dir = TempDir::new().unwrap();
    add_topic(&dir, "A", 3);

    let output = autoblog(&dir).args(["--status", "--json"]).output().unwrap();
    assert!(output.status.success());
    let status: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(status["available"], 1);
    assert_eq!(status["needs_refresh"], true);
}

#[test]
fn dry_run_shows_highest_priority_topic() {
    let dir = TempDir::new().unwrap();
    add_topic(&dir, "Low", 3);
    add_topic(&dir, "High", 9);

    autoblog(&dir)
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("Next topic: High"));

    // Nothing was consumed.
    let topics = read_json(&dir, "data/topics.json");
    assert_eq!(topics.as_array().unwrap().len(), 2);
}

#[test]
fn refresh_adds_fallback_topics_without_history() {
    let dir = TempDir::new().unwrap();
    autoblog(&dir)
        .arg("--refresh")
        .assert()
        .success()
        .stdout(predicate::str::contains("Stock refreshed"));

    let topics = read_json(&dir, "data/topics.json");
    assert!(!topics.as_array().unwrap().is_empty());
}

#[test]
fn status_flags_conflict() {
    let dir = TempDir::new().unwrap();
    autoblog(&dir)
        .args(["--status", "--dry-run"])
        .assert()
        .failure();
}

#[test]
fn mode_flags_reject_subcommands() {
    let dir = TempDir::new().unwrap();
    for mode in ["--status", "--refresh", "--dry-run"] {
        autoblog(&dir)
            .args([mode, "topic", "list"])
            .assert()
            .code(2);
    }
    assert!(!dir.path().join("data/topics.json").exists());
}

// ---------------------------------------------------------------------------
// default run
// ---------------------------------------------------------------------------

#[test]
fn run_without_api_key_fails_and_keeps_topic() {
    let dir = TempDir::new().unwrap();
    add_topic(&dir, "Only topic", 99);

    autoblog(&dir)
        .assert()
        .failure()
        .stdout(predicate::str::contains("article generation failed"));

    let topics = read_json(&dir, "data/topics.json");
    let titles: Vec<&str> = topics
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap())
        .collect();
    assert!(titles.contains(&"Only topic"));
    assert!(!dir.path().join("data/posted_topics.json").exists());
}

#[test]
fn run_json_reports_failure() {
    let dir = TempDir::new().unwrap();
    add_topic(&dir, "Only topic", 99);

    let output = autoblog(&dir).arg("--json").output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["success"], false);
    assert!(report["errors"][0]
        .as_str()
        .unwrap()
        .contains("ANTHROPIC_API_KEY"));
}

// ---------------------------------------------------------------------------
// autoblog config / metrics
// ---------------------------------------------------------------------------

#[test]
fn config_validate_defaults_are_clean() {
    let dir = TempDir::new().unwrap();
    autoblog(&dir)
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Config is valid"));
}

#[test]
fn config_validate_reports_errors() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("autoblog.yaml"),
        "sanitize:\n  excluded_path_patterns: [\"(unclosed\"]\n",
    )
    .unwrap();

    autoblog(&dir)
        .args(["config", "validate"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("[error]"));
}

#[test]
fn config_credentials_reads_dotenv() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join(".env"), "ANTHROPIC_API_KEY=sk-test\n").unwrap();

    autoblog(&dir)
        .args(["config", "credentials"])
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"anthropic_api_key\s+set").unwrap())
        .stdout(predicate::str::contains("sk-test").not());
}

#[test]
fn metrics_without_records_is_empty() {
    let dir = TempDir::new().unwrap();
    autoblog(&dir)
        .arg("metrics")
        .assert()
        .success()
        .stdout(predicate::str::contains("No metrics available."));
}
