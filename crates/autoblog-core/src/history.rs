//! Loaders for the local signals that topic extraction mines: the assistant
//! usage log (JSONL), its stats cache, and the shell history file.
//!
//! Missing files are never an error; they simply contribute nothing.

use crate::error::Result;
use crate::sanitize::Sanitizer;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Epoch milliseconds.
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default)]
    pub display: String,
    #[serde(default)]
    pub project: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsCache {
    #[serde(default)]
    pub daily_activity: Vec<DailyActivity>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyActivity {
    pub date: String,
    #[serde(default)]
    pub message_count: u64,
}

fn cutoff(now: DateTime<Utc>, days: u32) -> DateTime<Utc> {
    now - Duration::days(i64::from(days))
}

// ---------------------------------------------------------------------------
// Usage history
// ---------------------------------------------------------------------------

/// Entries from the last `days` days, with `display` and `project` sanitized.
pub fn load_history(path: &Path, days: u32, sanitizer: &Sanitizer) -> Result<Vec<HistoryEntry>> {
    load_history_since(path, cutoff(Utc::now(), days), sanitizer)
}

pub fn load_history_since(
    path: &Path,
    since: DateTime<Utc>,
    sanitizer: &Sanitizer,
) -> Result<Vec<HistoryEntry>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let bytes = std::fs::read(path)?;
    let cutoff_ms = since.timestamp_millis();

    let mut entries = Vec::new();
    for (lineno, raw) in bytes.split(|b| *b == b'\n').enumerate() {
        let line = match std::str::from_utf8(raw) {
            Ok(l) => l.trim(),
            Err(e) => {
                tracing::debug!(line = lineno + 1, error = %e, "skipping non-UTF-8 history line");
                continue;
            }
        };
        if line.is_empty() {
            continue;
        }
        let mut entry: HistoryEntry = match serde_json::from_str(line) {
            Ok(e) => e,
            Err(e) => {
                tracing::debug!(line = lineno + 1, error = %e, "skipping malformed history line");
                continue;
            }
        };
        if entry.timestamp < cutoff_ms {
            continue;
        }
        entry.display = sanitizer.sanitize(&entry.display);
        entry.project = sanitizer.sanitize(&entry.project);
        entries.push(entry);
    }
    Ok(entries)
}

// ---------------------------------------------------------------------------
// Stats cache
// ---------------------------------------------------------------------------

/// Missing or unreadable caches yield an empty cache.
pub fn load_stats_cache(path: &Path) -> StatsCache {
    if !path.exists() {
        return StatsCache::default();
    }
    let parsed = std::fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|s| serde_json::from_str::<StatsCache>(&s).map_err(|e| e.to_string()));
    match parsed {
        Ok(stats) => stats,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable stats cache");
            StatsCache::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Shell history
// ---------------------------------------------------------------------------

/// Relevant shell commands (matching any of `keywords`), sanitized and
/// deduplicated, newest `limit` kept.
pub fn load_shell_history(
    path: &Path,
    days: u32,
    keywords: &[String],
    limit: usize,
    sanitizer: &Sanitizer,
) -> Result<Vec<String>> {
    load_shell_history_since(path, cutoff(Utc::now(), days), keywords, limit, sanitizer)
}

pub fn load_shell_history_since(
    path: &Path,
    since: DateTime<Utc>,
    keywords: &[String],
    limit: usize,
    sanitizer: &Sanitizer,
) -> Result<Vec<String>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let bytes = std::fs::read(path)?;
    let content = String::from_utf8_lossy(&bytes);
    let keywords: Vec<String> = keywords.iter().map(|k| k.to_lowercase()).collect();
    let since_secs = since.timestamp();

    let mut commands: Vec<String> = Vec::new();
    for line in content.lines() {
        let (timestamp, command) = split_shell_line(line);
        if timestamp.is_some_and(|ts| ts < since_secs) {
            continue;
        }
        let lower = command.to_lowercase();
        if !keywords.iter().any(|k| lower.contains(k.as_str())) {
            continue;
        }
        let sanitized = sanitizer.sanitize(command);
        if !commands.contains(&sanitized) {
            commands.push(sanitized);
        }
    }

    if commands.len() > limit {
        commands.drain(..commands.len() - limit);
    }
    Ok(commands)
}

/// Split `: <epoch>:<elapsed>;<command>` into its timestamp and command.
/// Plain lines have no timestamp; any other `;` line keeps the text after it.
fn split_shell_line(line: &str) -> (Option<i64>, &str) {
    let Some((meta, command)) = line.split_once(';') else {
        return (None, line.trim());
    };
    let timestamp = meta
        .strip_prefix(": ")
        .and_then(|rest| rest.split(':').next())
        .and_then(|ts| ts.trim().parse::<i64>().ok());
    (timestamp, command.trim())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SanitizeConfig;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn sanitizer() -> Sanitizer {
        Sanitizer::new(&SanitizeConfig {
            sensitive_keywords: vec!["CompanyX".to_string()],
            ..SanitizeConfig::default()
        })
        .unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn history_filters_window_and_skips_bad_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.jsonl");
        let recent = now().timestamp_millis() - 1_000;
        let old = (now() - Duration::days(30)).timestamp_millis();
        std::fs::write(
            &path,
            format!(
                "{{\"timestamp\":{recent},\"display\":\"/review CompanyX\",\"project\":\"/Users/a/p\"}}\n\
                 not json at all\n\
                 \n\
                 {{\"timestamp\":{old},\"display\":\"old\",\"project\":\"\"}}\n\
                 {{\"display\":\"no timestamp\"}}\n"
            ),
        )
        .unwrap();

        let since = now() - Duration::days(10);
        let entries = load_history_since(&path, since, &sanitizer()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].display, "/review [企業名]");
        assert_eq!(entries[0].project, "~/p");
    }

    #[test]
    fn invalid_utf8_line_does_not_drop_the_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.jsonl");
        let ts = now().timestamp_millis() - 1_000;
        let mut data = Vec::new();
        data.extend_from_slice(
            format!("{{\"timestamp\":{ts},\"display\":\"/commit\",\"project\":\"\"}}\n").as_bytes(),
        );
        data.extend_from_slice(format!("{{\"timestamp\":{ts},\"display\":\"").as_bytes());
        data.extend_from_slice(b"\xff\xfe\"}\n");
        data.extend_from_slice(
            format!("{{\"timestamp\":{ts},\"display\":\"/review\",\"project\":\"\"}}\r\n").as_bytes(),
        );
        std::fs::write(&path, data).unwrap();

        let since = now() - Duration::days(10);
        let entries = load_history_since(&path, since, &sanitizer()).unwrap();
        let displays: Vec<&str> = entries.iter().map(|e| e.display.as_str()).collect();
        assert_eq!(displays, ["/commit", "/review"]);
    }

    #[test]
    fn missing_files_are_empty() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        assert!(load_history_since(&missing, now(), &sanitizer())
            .unwrap()
            .is_empty());
        assert!(load_shell_history_since(&missing, now(), &[], 100, &sanitizer())
            .unwrap()
            .is_empty());
        assert!(load_stats_cache(&missing).daily_activity.is_empty());
    }

    #[test]
    fn stats_cache_parses_camel_case() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("stats-cache.json");
        std::fs::write(
            &path,
            r#"{"dailyActivity":[{"date":"2026-03-01","messageCount":1500}],"other":1}"#,
        )
        .unwrap();
        let stats = load_stats_cache(&path);
        assert_eq!(stats.daily_activity.len(), 1);
        assert_eq!(stats.daily_activity[0].message_count, 1500);
    }

    #[test]
    fn malformed_stats_cache_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("stats-cache.json");
        std::fs::write(&path, "{ broken").unwrap();
        assert!(load_stats_cache(&path).daily_activity.is_empty());
    }

    #[test]
    fn shell_history_filters_dedupes_and_sanitizes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".zsh_history");
        let recent = now().timestamp() - 60;
        let old = (now() - Duration::days(40)).timestamp();
        std::fs::write(
            &path,
            format!(
                ": {recent}:0;claude --resume\n\
                 : {recent}:0;ls -la\n\
                 : {recent}:0;claude --resume\n\
                 : {old}:0;npx old-thing\n\
                 cd /Users/alice/work && Claude skill create\n"
            ),
        )
        .unwrap();

        let keywords = vec!["claude".to_string(), "npx".to_string()];
        let since = now() - Duration::days(10);
        let commands =
            load_shell_history_since(&path, since, &keywords, 100, &sanitizer()).unwrap();
        assert_eq!(
            commands,
            vec![
                "claude --resume".to_string(),
                "cd ~/work && Claude skill create".to_string(),
            ]
        );
    }

    #[test]
    fn shell_history_keeps_most_recent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".zsh_history");
        let lines: String = (0..5).map(|i| format!("claude run {i}\n")).collect();
        std::fs::write(&path, lines).unwrap();
        let keywords = vec!["claude".to_string()];
        let commands = load_shell_history_since(&path, now(), &keywords, 2, &sanitizer()).unwrap();
        assert_eq!(commands, vec!["claude run 3", "claude run 4"]);
    }

    #[test]
    fn shell_history_tolerates_invalid_utf8() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".zsh_history");
        std::fs::write(&path, b"claude \xff\xfe ok\n").unwrap();
        let keywords = vec!["claude".to_string()];
        let commands = load_shell_history_since(&path, now(), &keywords, 10, &sanitizer()).unwrap();
        assert_eq!(commands.len(), 1);
        assert!(commands[0].ends_with("ok"));
    }

    #[test]
    fn split_shell_line_formats() {
        assert_eq!(split_shell_line(": 1700000000:0;git push"), (Some(1_700_000_000), "git push"));
        assert_eq!(split_shell_line("echo a; echo b"), (None, "echo b"));
        assert_eq!(split_shell_line("  claude  "), (None, "claude"));
    }
}
