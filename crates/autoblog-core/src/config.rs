//! Project configuration (`autoblog.yaml`) and API credentials.
//!
//! Every section defaults, so a missing file or a file that sets only a
//! couple of keys is valid. Credentials never live in the YAML file; they
//! come from the environment (optionally seeded from `.env`).

use crate::error::{AutoblogError, Result};
use crate::paths;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// ConfigWarning
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// StorageConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Topic stock, posted log and tweet records. Relative to the project root.
    pub data_dir: PathBuf,
    /// Generated articles. Relative to the project root.
    pub articles_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(paths::DEFAULT_DATA_DIR),
            articles_dir: PathBuf::from(paths::DEFAULT_ARTICLES_DIR),
        }
    }
}

// ---------------------------------------------------------------------------
// SourcesConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub history_file: PathBuf,
    pub stats_file: PathBuf,
    pub shell_history_file: PathBuf,
    /// Trailing window, in days, for history and shell analysis.
    pub days: u32,
    /// Shell commands are kept only if they contain one of these.
    pub shell_keywords: Vec<String>,
    pub shell_limit: usize,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        let claude = Path::new("~").join(paths::CLAUDE_DIR);
        Self {
            history_file: claude.join(paths::CLAUDE_HISTORY_FILE),
            stats_file: claude.join(paths::CLAUDE_STATS_FILE),
            shell_history_file: Path::new("~").join(paths::ZSH_HISTORY_FILE),
            days: 10,
            shell_keywords: strings(&["claude", "npx", "mcp", "anthropic", "zenn", "git push"]),
            shell_limit: 100,
        }
    }
}

// ---------------------------------------------------------------------------
// SanitizeConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SanitizeConfig {
    /// Regexes for directories that must never show up in output.
    pub excluded_path_patterns: Vec<String>,
    pub excluded_path_token: String,
    /// Matched whole-word and case-insensitively.
    pub sensitive_keywords: Vec<String>,
    pub keyword_placeholder: String,
    /// Regexes for a user's home prefix, rewritten to `~/`.
    pub home_path_patterns: Vec<String>,
}

impl Default for SanitizeConfig {
    fn default() -> Self {
        Self {
            excluded_path_patterns: Vec::new(),
            excluded_path_token: "[REDACTED_PATH]/".to_string(),
            sensitive_keywords: Vec::new(),
            keyword_placeholder: "[企業名]".to_string(),
            home_path_patterns: strings(&["/Users/[^/]+/", "/home/[^/]+/"]),
        }
    }
}

// ---------------------------------------------------------------------------
// Persona
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Persona {
    pub name: String,
    pub nickname: String,
    pub role: String,
    pub first_person: String,
    pub tone: String,
    pub personality: Vec<String>,
    pub catchphrases: Vec<String>,
    pub writing_rules: Vec<String>,
}

impl Default for Persona {
    fn default() -> Self {
        Self {
            name: "椎名しおり".to_string(),
            nickname: "しおりん".to_string(),
            role: "AI秘書".to_string(),
            first_person: "私（たまに「うち」）".to_string(),
            tone: "関西弁混じりの親しみやすいトーン、技術の話になると急にシャープ".to_string(),
            personality: strings(&[
                "好奇心旺盛",
                "失敗を恐れない実験家",
                "ツッコミ気質",
                "Claude Codeヘビーユーザー",
                "深夜作業の常習犯",
                "コーヒー中毒",
            ]),
            catchphrases: strings(&[
                "これ、めっちゃええやん",
                "試してみたら意外と...",
                "正直に言うとな",
                "ぶっちゃけ",
                "これはアカンやつ",
                "神機能やで",
            ]),
            writing_rules: strings(&[
                "Markdown記号（**太字**）を本文に残さない",
                "接続詞の連打を避ける（さらに、また、したがって）",
                "語尾を毎回変える",
                "具体例で語る、抽象論は避ける",
                "スタンスを取る、曖昧な表現は避ける",
                "冒頭で結論、中盤で過程、最後に学び",
                "失敗談も隠さず書く",
                "読者に語りかけるような文体",
            ]),
        }
    }
}

// ---------------------------------------------------------------------------
// GeneratorConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub api_base: String,
    pub model: String,
    pub max_tokens: u32,
    /// Whole-request timeout for one generation, in seconds.
    pub timeout_secs: u64,
    /// Tags used when a topic carries none; the first three are applied.
    pub default_tags: Vec<String>,
    /// Slug used when a title has too few word characters: `<prefix>-YYYYMMDD`.
    pub slug_prefix: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.anthropic.com".to_string(),
            model: "claude-opus-4-5-20251101".to_string(),
            max_tokens: 4096,
            timeout_secs: 600,
            default_tags: strings(&["claudecode", "ai", "cli", "productivity", "automation"]),
            slug_prefix: "claude-code-tips".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// PublisherConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PublisherConfig {
    pub remote: String,
    pub branch: String,
    pub commit_prefix: String,
    /// Public articles are served at `<article_url_base>/<slug>`.
    pub article_url_base: String,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            remote: "origin".to_string(),
            branch: "main".to_string(),
            commit_prefix: "📝 新記事:".to_string(),
            article_url_base: "https://zenn.dev/me/articles".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// AnnouncerConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnouncerConfig {
    pub api_base: String,
    pub status_url_base: String,
    /// `{title}`, `{summary}` and `{url}` are substituted.
    pub templates: Vec<String>,
    pub max_length: usize,
    /// Weighted length of any URL, regardless of its real length.
    pub url_length: usize,
}

impl Default for AnnouncerConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.twitter.com".to_string(),
            status_url_base: "https://twitter.com/i/status".to_string(),
            templates: strings(&[
                "📝 新しい記事書いたで！\n\n{title}\n\n{summary}\n\n{url}\n\n#ClaudeCode #AI #生成AI",
                "💡 Claude Code Tips更新！\n\n{title}\n\n{summary}\n\n{url}\n\n#ClaudeCode #AIエンジニア",
                "🚀 また発見してしもた...\n\n{title}\n\n{summary}\n\n{url}\n\n#ClaudeCode #開発効率化",
            ]),
            max_length: 280,
            url_length: 23,
        }
    }
}

// ---------------------------------------------------------------------------
// StockConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StockConfig {
    pub minimum: usize,
    /// Appended as manual topics when history analysis cannot fill the stock.
    pub fallback_titles: Vec<String>,
}

impl Default for StockConfig {
    fn default() -> Self {
        Self {
            minimum: 10,
            fallback_titles: strings(&[
                "Claude Code MAXプランを1週間使ってわかったこと",
                "Claude Codeの履歴ファイルを活用する方法",
                "/insightsコマンドで使い方を改善する",
                "Claude Codeのセッション管理術",
                "MCP連携でGoogleドライブを操作する",
            ]),
        }
    }
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub sources: SourcesConfig,
    pub sanitize: SanitizeConfig,
    pub persona: Persona,
    pub generator: GeneratorConfig,
    pub publisher: PublisherConfig,
    pub announcer: AnnouncerConfig,
    pub stock: StockConfig,
}

impl Config {
    /// Load `autoblog.yaml` from `root`, or defaults when it does not exist.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        if data.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(&data)?)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    pub fn data_dir(&self, root: &Path) -> PathBuf {
        paths::under_root(root, &self.storage.data_dir)
    }

    pub fn articles_dir(&self, root: &Path) -> PathBuf {
        paths::under_root(root, &self.storage.articles_dir)
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        let patterns = self
            .sanitize
            .excluded_path_patterns
            .iter()
            .chain(&self.sanitize.home_path_patterns);
        for pattern in patterns {
            if let Err(e) = Regex::new(pattern) {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("sanitize pattern '{pattern}' is not a valid regex: {e}"),
                });
            }
        }

        if self.announcer.templates.is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "announcer.templates is empty".to_string(),
            });
        }
        for (i, template) in self.announcer.templates.iter().enumerate() {
            if !template.contains("{url}") {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!("announcer.templates[{i}] has no {{url}} placeholder"),
                });
            }
        }

        // Every URL costs url_length, so the budget must leave room for text.
        if self.announcer.max_length <= self.announcer.url_length + 3 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "announcer.max_length ({}) leaves no room for text next to a URL",
                    self.announcer.max_length
                ),
            });
        }

        if self.generator.timeout_secs == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "generator.timeout_secs is 0; every generation request would time out"
                    .to_string(),
            });
        }

        if self.persona.name.trim().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "persona.name is empty".to_string(),
            });
        }

        if self.stock.minimum == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "stock.minimum is 0; the stock will never be refilled".to_string(),
            });
        }

        warnings
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

pub const ANTHROPIC_API_KEY: &str = "ANTHROPIC_API_KEY";
pub const TWITTER_CONSUMER_KEY: &str = "TWITTER_CONSUMER_KEY";
pub const TWITTER_CONSUMER_SECRET: &str = "TWITTER_CONSUMER_SECRET";
pub const TWITTER_ACCESS_TOKEN: &str = "TWITTER_ACCESS_TOKEN";
pub const TWITTER_ACCESS_TOKEN_SECRET: &str = "TWITTER_ACCESS_TOKEN_SECRET";
pub const TWITTER_BEARER_TOKEN: &str = "TWITTER_BEARER_TOKEN";

#[derive(Clone, Default)]
pub struct Credentials {
    pub anthropic_api_key: Option<String>,
    pub consumer_key: Option<String>,
    pub consumer_secret: Option<String>,
    pub access_token: Option<String>,
    pub access_token_secret: Option<String>,
    pub bearer_token: Option<String>,
}

impl Credentials {
    /// Read credentials from the process environment. Empty values are absent.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            anthropic_api_key: get(ANTHROPIC_API_KEY),
            consumer_key: get(TWITTER_CONSUMER_KEY),
            consumer_secret: get(TWITTER_CONSUMER_SECRET),
            access_token: get(TWITTER_ACCESS_TOKEN),
            access_token_secret: get(TWITTER_ACCESS_TOKEN_SECRET),
            bearer_token: get(TWITTER_BEARER_TOKEN),
        }
    }

    pub fn require_anthropic(&self) -> Result<&str> {
        self.anthropic_api_key
            .as_deref()
            .ok_or(AutoblogError::MissingCredential(ANTHROPIC_API_KEY))
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mask = |v: &Option<String>| if v.is_some() { "set" } else { "unset" };
        f.debug_struct("Credentials")
            .field("anthropic_api_key", &mask(&self.anthropic_api_key))
            .field("consumer_key", &mask(&self.consumer_key))
            .field("consumer_secret", &mask(&self.consumer_secret))
            .field("access_token", &mask(&self.access_token))
            .field("access_token_secret", &mask(&self.access_token_secret))
            .field("bearer_token", &mask(&self.bearer_token))
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
