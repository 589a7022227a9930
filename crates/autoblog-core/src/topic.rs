use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// TopicKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopicKind {
    CommandUsage,
    HeavyUsage,
    Pattern,
    SkillCreation,
    Manual,
}

impl TopicKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TopicKind::CommandUsage => "command_usage",
            TopicKind::HeavyUsage => "heavy_usage",
            TopicKind::Pattern => "pattern",
            TopicKind::SkillCreation => "skill_creation",
            TopicKind::Manual => "manual",
        }
    }
}

impl fmt::Display for TopicKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Topic
// ---------------------------------------------------------------------------

/// A candidate article idea. Identity is the case-insensitive title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: TopicKind,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Set when the topic enters the stock; extractor candidates have none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_at: Option<DateTime<Utc>>,
}

impl Topic {
    pub fn new(
        kind: TopicKind,
        title: impl Into<String>,
        source: impl Into<String>,
        priority: i32,
        tags: &[&str],
    ) -> Self {
        Self {
            title: title.into(),
            kind,
            source: source.into(),
            priority,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            description: None,
            added_at: None,
        }
    }

    /// Lowercased title used for identity comparisons.
    pub fn key(&self) -> String {
        title_key(&self.title)
    }
}

pub fn title_key(title: &str) -> String {
    title.to_lowercase()
}

// ---------------------------------------------------------------------------
// PostedTopic
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostedTopic {
    #[serde(flatten)]
    pub topic: Topic,
    pub posted_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_json_uses_type_field() {
        let t = Topic::new(TopicKind::CommandUsage, "/review", "使用回数: 3回", 3, &["cli"]);
        let json = serde_json::to_value(&t).unwrap();
        assert_eq!(json["type"], "command_usage");
        assert!(json.get("added_at").is_none());
        assert!(json.get("description").is_none());
    }

    #[test]
    fn posted_topic_is_flat() {
        let posted = PostedTopic {
            topic: Topic::new(TopicKind::Manual, "A", "手動追加", 5, &[]),
            posted_at: Utc::now(),
        };
        let json = serde_json::to_value(&posted).unwrap();
        assert_eq!(json["title"], "A");
        assert!(json.get("posted_at").is_some());
        let back: PostedTopic = serde_json::from_value(json).unwrap();
        assert_eq!(back.topic.title, "A");
    }

    #[test]
    fn minimal_record_deserializes() {
        let t: Topic = serde_json::from_str(r#"{"title":"x","type":"manual"}"#).unwrap();
        assert_eq!(t.priority, 0);
        assert!(t.tags.is_empty());
    }

    #[test]
    fn key_is_case_insensitive() {
        let a = Topic::new(TopicKind::Manual, "MCP Tips", "", 1, &[]);
        assert_eq!(a.key(), title_key("mcp tips"));
    }
}
