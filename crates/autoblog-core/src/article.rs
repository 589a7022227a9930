//! Article generation: persona prompt, slug, and the on-disk document.
//!
//! File layout (`<articles_dir>/<slug>.md`):
//!
//! ```text
//! ---
//! title: "…"
//! emoji: "…"
//! type: "tech"
//! topics: ["…", …]        first five tags
//! published: true|false
//! ---
//!
//! <body returned by the model, verbatim>
//! ```

use crate::config::{GeneratorConfig, Persona};
use crate::error::Result;
use crate::llm::TextGenerator;
use crate::topic::Topic;
use crate::{io, paths};
use chrono::{DateTime, Local, NaiveDate, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

const SLUG_MIN_LEN: usize = 5;
const SLUG_MAX_LEN: usize = 50;
const HEADER_TOPICS: usize = 5;
const DEFAULT_TAG_COUNT: usize = 3;

// ---------------------------------------------------------------------------
// Article
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub emoji: String,
    pub generated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Emoji
// ---------------------------------------------------------------------------

const EMOJI_BY_TAG: &[(&str, &[&str])] = &[
    ("tips", &["💡", "✨", "🎯"]),
    ("experiment", &["🧪", "🔬", "🚀"]),
    ("automation", &["⚙️", "🤖", "🔄"]),
    ("workflow", &["📋", "🛠️", "🔧"]),
    ("mcp", &["🔌", "🔗", "🌐"]),
    ("skill", &["📚", "🎓", "🏆"]),
    ("productivity", &["⚡", "🏃", "📈"]),
    ("tmux", &["🖥️", "📺", "🪟"]),
    ("pptx", &["📊", "🎨", "📝"]),
];
const DEFAULT_EMOJI: &[&str] = &["🤖", "💻", "🔥"];

/// Random emoji for the first tag that has a set, else from the default set.
pub fn emoji_for_tags<R: Rng + ?Sized>(tags: &[String], rng: &mut R) -> String {
    let set = tags
        .iter()
        .find_map(|tag| {
            EMOJI_BY_TAG
                .iter()
                .find(|(name, _)| *name == tag.as_str())
                .map(|(_, set)| *set)
        })
        .unwrap_or(DEFAULT_EMOJI);
    set.choose(rng).copied().unwrap_or("🤖").to_string()
}

// ---------------------------------------------------------------------------
// Prompt
// ---------------------------------------------------------------------------

/// Persona description shared by every generation request.
pub fn persona_prompt(persona: &Persona) -> String {
    let rules: String = persona
        .writing_rules
        .iter()
        .map(|r| format!("- {r}\n"))
        .collect();
    format!(
        "あなたは「{name}」（愛称: {nickname}）として記事を書きます。\n\
         \n\
         ## プロフィール\n\
         - 役割: {role}\n\
         - 一人称: {first_person}\n\
         - 口調: {tone}\n\
         - 性格: {personality}\n\
         - 口癖: {catchphrases}\n\
         \n\
         ## 文体ルール\n\
         {rules}\
         \n\
         ## 記事の構成\n\
         1. 冒頭: 結論を先に言う（何ができるようになったか、何を学んだか）\n\
         2. 中盤: 実際にやったこと、試行錯誤の過程\n\
         3. 終盤: 学び、次に試したいこと\n\
         \n\
         ## 注意\n\
         - 企業名、顧客名、プロジェクト名は絶対に書かない\n\
         - パスに含まれる具体的な名前は伏せる\n\
         - 技術的な内容は正確に、でも堅くならない\n\
         - 定型的なAI文章（「以下の3点から」「非常に重要」等）は使わない\n",
        name = persona.name,
        nickname = persona.nickname,
        role = persona.role,
        first_person = persona.first_person,
        tone = persona.tone,
        personality = persona.personality.join(", "),
        catchphrases = persona.catchphrases.join(", "),
    )
}

pub fn article_prompt(persona: &Persona, topic: &Topic) -> String {
    format!(
        "{persona}\n\
         ---\n\
         \n\
         ## 今回のお題\n\
         \n\
         タイトル: {title}\n\
         補足情報: {description}\n\
         抽出元: {source}\n\
         タグ: {tags}\n\
         \n\
         ---\n\
         \n\
         ## 執筆依頼\n\
         \n\
         上記のお題で、技術ブログに投稿する記事を書いてください。\n\
         \n\
         要件:\n\
         1. 文字数: 1500〜3000文字程度\n\
         2. 構成: 見出しを3〜5個程度使用\n\
         3. コード例: 必要に応じて含める\n\
         4. トーン: {nickname}らしい口調で\n\
         \n\
         注意:\n\
         - フロントマター（---で囲まれた部分）は含めないでください\n\
         - 見出し（##）から始めてください\n\
         - 最初の見出しは「## はじめに」や「## 結論から言うと」など\n\
         \n\
         記事本文のみを出力してください。\n",
        persona = persona_prompt(persona),
        title = topic.title,
        description = topic.description.as_deref().unwrap_or(""),
        source = topic.source,
        tags = topic.tags.join(", "),
        nickname = persona.nickname,
    )
}

// ---------------------------------------------------------------------------
// Slug
// ---------------------------------------------------------------------------

static NON_WORD_RE: OnceLock<Regex> = OnceLock::new();
static SEPARATOR_RE: OnceLock<Regex> = OnceLock::new();
static DASHES_RE: OnceLock<Regex> = OnceLock::new();

fn non_word_re() -> &'static Regex {
    NON_WORD_RE.get_or_init(|| Regex::new(r"[^\w\s-]").unwrap())
}

fn separator_re() -> &'static Regex {
    SEPARATOR_RE.get_or_init(|| Regex::new(r"[\s_]+").unwrap())
}

fn dashes_re() -> &'static Regex {
    DASHES_RE.get_or_init(|| Regex::new(r"-+").unwrap())
}

/// Slug for `title`, falling back to `<prefix>-<today>` for short titles.
pub fn generate_slug(title: &str, prefix: &str) -> String {
    generate_slug_on(title, prefix, Local::now().date_naive())
}

pub fn generate_slug_on(title: &str, prefix: &str, date: NaiveDate) -> String {
    let lower = title.to_lowercase();
    let stripped = non_word_re().replace_all(&lower, "");
    let dashed = separator_re().replace_all(&stripped, "-");
    let collapsed = dashes_re().replace_all(&dashed, "-");
    let mut slug = collapsed.trim_matches('-').to_string();

    if slug.chars().count() < SLUG_MIN_LEN {
        slug = format!("{prefix}-{}", date.format("%Y%m%d"));
    }
    slug.chars().take(SLUG_MAX_LEN).collect()
}

// ---------------------------------------------------------------------------
// Save
// ---------------------------------------------------------------------------

pub fn render_document(article: &Article, published: bool) -> Result<String> {
    let topics: Vec<&String> = article.tags.iter().take(HEADER_TOPICS).collect();
    Ok(format!(
        "---\ntitle: {title}\nemoji: {emoji}\ntype: \"tech\"\ntopics: {topics}\npublished: {published}\n---\n\n{body}",
        title = serde_json::to_string(&article.title)?,
        emoji = serde_json::to_string(&article.emoji)?,
        topics = serde_json::to_string(&topics)?,
        body = article.content,
    ))
}

/// Write the article to `<articles_dir>/<slug>.md`, replacing any file with
/// the same slug. Returns the written path.
pub fn save_article(
    article: &Article,
    articles_dir: &Path,
    slug_prefix: &str,
    published: bool,
) -> Result<PathBuf> {
    io::ensure_dir(articles_dir)?;
    let slug = generate_slug(&article.title, slug_prefix);
    let path = paths::article_path(articles_dir, &slug);
    let document = render_document(article, published)?;
    io::atomic_write(&path, document.as_bytes())?;
    tracing::info!(path = %path.display(), "article saved");
    Ok(path)
}

// ---------------------------------------------------------------------------
// ArticleGenerator
// ---------------------------------------------------------------------------

pub struct ArticleGenerator<'a> {
    persona: &'a Persona,
    config: &'a GeneratorConfig,
    articles_dir: PathBuf,
    generator: &'a dyn TextGenerator,
}

impl<'a> ArticleGenerator<'a> {
    pub fn new(
        persona: &'a Persona,
        config: &'a GeneratorConfig,
        articles_dir: PathBuf,
        generator: &'a dyn TextGenerator,
    ) -> Self {
        Self {
            persona,
            config,
            articles_dir,
            generator,
        }
    }

    pub fn generate_article(&self, topic: &Topic) -> Result<Article> {
        self.generate_article_with(topic, &mut rand::thread_rng())
    }

    pub fn generate_article_with<R: Rng + ?Sized>(
        &self,
        topic: &Topic,
        rng: &mut R,
    ) -> Result<Article> {
        tracing::info!(title = %topic.title, "generating article");
        let prompt = article_prompt(self.persona, topic);
        let content = self.generator.complete(&prompt)?;

        let tags = if topic.tags.is_empty() {
            self.config
                .default_tags
                .iter()
                .take(DEFAULT_TAG_COUNT)
                .cloned()
                .collect()
        } else {
            topic.tags.clone()
        };
        let emoji = emoji_for_tags(&tags, rng);

        Ok(Article {
            title: topic.title.clone(),
            content,
            tags,
            emoji,
            generated_at: Utc::now(),
        })
    }

    pub fn save_article(&self, article: &Article, published: bool) -> Result<PathBuf> {
        save_article(article, &self.articles_dir, &self.config.slug_prefix, published)
    }

    pub fn generate_and_save(&self, topic: &Topic, published: bool) -> Result<(Article, PathBuf)> {
        let article = self.generate_article(topic)?;
        let path = self.save_article(&article, published)?;
        Ok((article, path))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AutoblogError;
    use crate::topic::TopicKind;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::cell::RefCell;
    use tempfile::TempDir;

    struct RecordingGenerator {
        reply: String,
        prompts: RefCell<Vec<String>>,
    }

    impl TextGenerator for RecordingGenerator {
        fn complete(&self, prompt: &str) -> Result<String> {
            self.prompts.borrow_mut().push(prompt.to_string());
            Ok(self.reply.clone())
        }
    }

    struct FailingGenerator;

    impl TextGenerator for FailingGenerator {
        fn complete(&self, _prompt: &str) -> Result<String> {
            Err(AutoblogError::MissingCredential("ANTHROPIC_API_KEY"))
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 9).unwrap()
    }

    #[test]
    fn slug_basic() {
        assert_eq!(
            generate_slug_on("Hello, World: Rust_tips  2026!", "p", date()),
            "hello-world-rust-tips-2026"
        );
    }

    #[test]
    fn slug_collapses_and_trims_dashes() {
        assert_eq!(
            generate_slug_on("--Claude -- Code--", "p", date()),
            "claude-code"
        );
    }

    #[test]
    fn slug_keeps_unicode_word_characters() {
        assert_eq!(
            generate_slug_on("Claude Codeの履歴ファイル", "p", date()),
            "claude-codeの履歴ファイル"
        );
    }

    #[test]
    fn short_slug_falls_back_to_prefix_and_date() {
        assert_eq!(
            generate_slug_on("!!", "claude-code-tips", date()),
            "claude-code-tips-20260309"
        );
        assert_eq!(
            generate_slug_on("a b", "claude-code-tips", date()),
            "claude-code-tips-20260309"
        );
    }

    #[test]
    fn slug_is_bounded_and_deterministic() {
        let title = "word ".repeat(40);
        let a = generate_slug_on(&title, "p", date());
        let b = generate_slug_on(&title, "p", date());
        assert_eq!(a, b);
        assert_eq!(a.chars().count(), 50);

        let jp = "日本語のとても長いタイトル".repeat(10);
        assert!(generate_slug_on(&jp, "p", date()).chars().count() <= 50);
    }

    #[test]
    fn prompt_embeds_persona_and_topic() {
        let persona = Persona::default();
        let mut topic = Topic::new(TopicKind::Manual, "MCP入門", "手動追加", 5, &["mcp", "ai"]);
        topic.description = Some("設定ファイルの書き方".to_string());
        let prompt = article_prompt(&persona, &topic);
        assert!(prompt.contains(&persona.name));
        assert!(prompt.contains("タイトル: MCP入門"));
        assert!(prompt.contains("補足情報: 設定ファイルの書き方"));
        assert!(prompt.contains("タグ: mcp, ai"));
        for rule in &persona.writing_rules {
            assert!(prompt.contains(rule.as_str()));
        }
    }

    #[test]
    fn emoji_follows_first_known_tag() {
        let mut rng = StdRng::seed_from_u64(7);
        let tags = vec!["unknown".to_string(), "mcp".to_string(), "tips".to_string()];
        let emoji = emoji_for_tags(&tags, &mut rng);
        assert!(["🔌", "🔗", "🌐"].contains(&emoji.as_str()));

        let emoji = emoji_for_tags(&[], &mut rng);
        assert!(DEFAULT_EMOJI.contains(&emoji.as_str()));
    }

    #[test]
    fn generate_uses_model_output_verbatim() {
        let dir = TempDir::new().unwrap();
        let persona = Persona::default();
        let config = GeneratorConfig::default();
        let backend = RecordingGenerator {
            reply: "## はじめに\nbody".to_string(),
            prompts: RefCell::new(Vec::new()),
        };
        let gen = ArticleGenerator::new(&persona, &config, dir.path().join("articles"), &backend);

        let topic = Topic::new(TopicKind::Manual, "Untagged", "", 5, &[]);
        let mut rng = StdRng::seed_from_u64(1);
        let article = gen.generate_article_with(&topic, &mut rng).unwrap();
        assert_eq!(article.content, "## はじめに\nbody");
        assert_eq!(article.tags, vec!["claudecode", "ai", "cli"]);
        assert_eq!(backend.prompts.borrow().len(), 1);
    }

    #[test]
    fn generation_errors_propagate() {
        let dir = TempDir::new().unwrap();
        let persona = Persona::default();
        let config = GeneratorConfig::default();
        let gen = ArticleGenerator::new(&persona, &config, dir.path().to_path_buf(), &FailingGenerator);
        let topic = Topic::new(TopicKind::Manual, "x", "", 1, &[]);
        assert!(matches!(
            gen.generate_article(&topic),
            Err(AutoblogError::MissingCredential(_))
        ));
    }

    #[test]
    fn save_writes_header_and_body() {
        let dir = TempDir::new().unwrap();
        let articles = dir.path().join("articles");
        let article = Article {
            title: "Say \"hi\" to hooks".to_string(),
            content: "## はじめに\n本文".to_string(),
            tags: (1..=7).map(|i| format!("t{i}")).collect(),
            emoji: "🤖".to_string(),
            generated_at: Utc::now(),
        };
        let path = save_article(&article, &articles, "p", true).unwrap();
        assert_eq!(path, articles.join("say-hi-to-hooks.md"));

        let doc = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            doc,
            "---\ntitle: \"Say \\\"hi\\\" to hooks\"\nemoji: \"🤖\"\ntype: \"tech\"\n\
             topics: [\"t1\",\"t2\",\"t3\",\"t4\",\"t5\"]\npublished: true\n---\n\n## はじめに\n本文"
        );
    }

    #[test]
    fn save_overwrites_same_slug() {
        let dir = TempDir::new().unwrap();
        let mut article = Article {
            title: "Same Title".to_string(),
            content: "first".to_string(),
            tags: vec![],
            emoji: "🤖".to_string(),
            generated_at: Utc::now(),
        };
        save_article(&article, dir.path(), "p", false).unwrap();
        article.content = "second".to_string();
        let path = save_article(&article, dir.path(), "p", false).unwrap();
        let doc = std::fs::read_to_string(path).unwrap();
        assert!(doc.ends_with("second"));
        assert!(doc.contains("published: false"));
    }
}
