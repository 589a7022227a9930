//! Topic extraction: turn sanitized usage signals into ranked candidates.

use crate::config::Config;
use crate::error::Result;
use crate::history::{self, HistoryEntry, StatsCache};
use crate::paths;
use crate::sanitize::Sanitizer;
use crate::topic::{Topic, TopicKind};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

const TOP_COMMANDS: usize = 5;
const MIN_COMMAND_USES: usize = 2;
const HEAVY_USAGE_MESSAGES: u64 = 1000;

// ---------------------------------------------------------------------------
// Usage patterns
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UsagePattern {
    AgentTeams,
    Tmux,
    SlideGeneration,
    McpIntegration,
}

impl UsagePattern {
    pub const ALL: [UsagePattern; 4] = [
        UsagePattern::AgentTeams,
        UsagePattern::Tmux,
        UsagePattern::SlideGeneration,
        UsagePattern::McpIntegration,
    ];

    fn matches(self, display: &str, lower: &str) -> bool {
        match self {
            UsagePattern::AgentTeams => lower.contains("agent team"),
            UsagePattern::Tmux => lower.contains("tmux"),
            UsagePattern::SlideGeneration => display.contains("スライド") || lower.contains("slide"),
            UsagePattern::McpIntegration => lower.contains("mcp"),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            UsagePattern::AgentTeams => "Agent Teams使用",
            UsagePattern::Tmux => "tmux分割",
            UsagePattern::SlideGeneration => "スライド生成",
            UsagePattern::McpIntegration => "MCP連携",
        }
    }

    fn topic_title(self) -> &'static str {
        match self {
            UsagePattern::AgentTeams => "Agent Teamsで並列開発してみた話",
            UsagePattern::Tmux => "tmux×Claude Codeで画面分割運用のコツ",
            UsagePattern::SlideGeneration => "Claude Codeでスライド自動生成する方法",
            UsagePattern::McpIntegration => "MCP連携で広がるClaude Codeの可能性",
        }
    }

    fn topic_tags(self) -> &'static [&'static str] {
        match self {
            UsagePattern::AgentTeams => &["claudecode", "agentteams", "automation"],
            UsagePattern::Tmux => &["claudecode", "tmux", "workflow"],
            UsagePattern::SlideGeneration => &["claudecode", "pptx", "automation"],
            UsagePattern::McpIntegration => &["claudecode", "mcp", "integration"],
        }
    }
}

// ---------------------------------------------------------------------------
// Features
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize)]
pub struct Features {
    /// Slash-command tokens with use counts, in first-seen order.
    pub commands_used: Vec<(String, usize)>,
    pub patterns: Vec<UsagePattern>,
}

impl Features {
    /// Most used commands, ties kept in first-seen order.
    pub fn most_common(&self, n: usize) -> Vec<(String, usize)> {
        let mut sorted = self.commands_used.clone();
        sorted.sort_by(|a, b| b.1.cmp(&a.1));
        sorted.truncate(n);
        sorted
    }
}

static COMMAND_RE: OnceLock<Regex> = OnceLock::new();

fn command_re() -> &'static Regex {
    COMMAND_RE.get_or_init(|| Regex::new(r"/(\w+)").unwrap())
}

pub fn extract_features(entries: &[HistoryEntry]) -> Features {
    let mut counts: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut seen: HashSet<UsagePattern> = HashSet::new();

    for entry in entries {
        let display = entry.display.as_str();
        for cap in command_re().captures_iter(display) {
            let cmd = cap[1].to_string();
            match index.get(&cmd) {
                Some(&i) => counts[i].1 += 1,
                None => {
                    index.insert(cmd.clone(), counts.len());
                    counts.push((cmd, 1));
                }
            }
        }

        let lower = display.to_lowercase();
        for pattern in UsagePattern::ALL {
            if pattern.matches(display, &lower) {
                seen.insert(pattern);
            }
        }
    }

    Features {
        commands_used: counts,
        patterns: UsagePattern::ALL
            .into_iter()
            .filter(|p| seen.contains(p))
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Candidates
// ---------------------------------------------------------------------------

pub fn extract_candidates(
    history: &[HistoryEntry],
    stats: &StatsCache,
    shell_commands: &[String],
) -> Vec<Topic> {
    let features = extract_features(history);
    let mut candidates = Vec::new();

    for (cmd, count) in features.most_common(TOP_COMMANDS) {
        if count >= MIN_COMMAND_USES {
            candidates.push(Topic::new(
                TopicKind::CommandUsage,
                format!("/{cmd}コマンドを使い倒してみた"),
                format!("使用回数: {count}回"),
                count.min(10) as i32,
                &["claudecode", "cli", "tips"],
            ));
        }
    }

    for day in &stats.daily_activity {
        if day.message_count > HEAVY_USAGE_MESSAGES {
            candidates.push(Topic::new(
                TopicKind::HeavyUsage,
                format!("Claude Codeで{}メッセージ送った日の記録", day.message_count),
                format!("日付: {}", day.date),
                8,
                &["claudecode", "productivity", "experiment"],
            ));
        }
    }

    for pattern in &features.patterns {
        candidates.push(Topic::new(
            TopicKind::Pattern,
            pattern.topic_title(),
            format!("検出パターン: {}", pattern.label()),
            7,
            pattern.topic_tags(),
        ));
    }

    if shell_commands
        .iter()
        .any(|cmd| cmd.to_lowercase().contains("skill"))
    {
        candidates.push(Topic::new(
            TopicKind::SkillCreation,
            "Claude Codeスキル作成のベストプラクティス",
            "スキル関連コマンド検出",
            6,
            &["claudecode", "skill", "customization"],
        ));
    }

    candidates.sort_by(|a, b| b.priority.cmp(&a.priority));
    let mut seen = HashSet::new();
    candidates.retain(|c| seen.insert(c.title.clone()));
    candidates
}

// ---------------------------------------------------------------------------
// Analysis
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub analyzed_at: DateTime<Utc>,
    pub history_count: usize,
    pub stats_days: usize,
    pub shell_count: usize,
    pub candidates: Vec<Topic>,
}

/// Load every configured source and extract candidates from it.
pub fn analyze(config: &Config) -> Result<Analysis> {
    let sources = &config.sources;
    let sanitizer = Sanitizer::new(&config.sanitize)?;

    let history = history::load_history(
        &paths::expand_home(&sources.history_file)?,
        sources.days,
        &sanitizer,
    )?;
    let stats = history::load_stats_cache(&paths::expand_home(&sources.stats_file)?);
    let shell = history::load_shell_history(
        &paths::expand_home(&sources.shell_history_file)?,
        sources.days,
        &sources.shell_keywords,
        sources.shell_limit,
        &sanitizer,
    )?;

    let candidates = extract_candidates(&history, &stats, &shell);
    tracing::info!(
        history = history.len(),
        stats_days = stats.daily_activity.len(),
        shell = shell.len(),
        candidates = candidates.len(),
        "history analysed"
    );

    Ok(Analysis {
        analyzed_at: Utc::now(),
        history_count: history.len(),
        stats_days: stats.daily_activity.len(),
        shell_count: shell.len(),
        candidates,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
