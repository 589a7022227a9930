//! Announcing published articles on the social network and reading back
//! how those announcements performed.

use crate::config::AnnouncerConfig;
use crate::error::Result;
use crate::io;
use crate::paths;
use crate::social::SocialClient;
use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

const ELLIPSIS: &str = "...";

static URL_RE: OnceLock<Regex> = OnceLock::new();
static PLACEHOLDER_RE: OnceLock<Regex> = OnceLock::new();

fn url_re() -> &'static Regex {
    URL_RE.get_or_init(|| Regex::new(r"https?://\S+").unwrap())
}

fn placeholder_re() -> &'static Regex {
    PLACEHOLDER_RE.get_or_init(|| Regex::new(r"\{(title|summary|url)\}").unwrap())
}

// ---------------------------------------------------------------------------
// Text composition
// ---------------------------------------------------------------------------

/// Length as the social network counts it: every URL costs `url_length`.
pub fn weighted_length(text: &str, url_length: usize) -> usize {
    let mut len = 0;
    let mut last = 0;
    for m in url_re().find_iter(text) {
        len += text[last..m.start()].chars().count() + url_length;
        last = m.end();
    }
    len + text[last..].chars().count()
}

/// Shorten `text` to `max_length` weighted characters.
///
/// URLs are never cut: text around them is shortened, `...` marks the cut,
/// and any URL after the cut point is re-attached in its original order.
pub fn truncate_text(text: &str, max_length: usize, url_length: usize) -> String {
    if weighted_length(text, url_length) <= max_length {
        return text.to_string();
    }

    let urls: Vec<(usize, usize)> = url_re().find_iter(text).map(|m| (m.start(), m.end())).collect();
    // Each URL may need a separator once re-attached.
    let mut budget = max_length
        .saturating_sub(urls.len() * (url_length + 1))
        .saturating_sub(ELLIPSIS.chars().count());

    let mut out = String::new();
    let mut pos = 0;
    for (i, &(start, end)) in urls.iter().enumerate() {
        let segment = &text[pos..start];
        let n = segment.chars().count();
        if n > budget {
            push_cut(&mut out, segment, budget);
            for &(s, e) in &urls[i..] {
                out.push(' ');
                out.push_str(&text[s..e]);
            }
            return out;
        }
        budget -= n;
        out.push_str(segment);
        out.push_str(&text[start..end]);
        pos = end;
    }

    push_cut(&mut out, &text[pos..], budget);
    out
}

fn push_cut(out: &mut String, segment: &str, keep: usize) {
    let kept: String = segment.chars().take(keep).collect();
    let kept = kept.trim_end();
    // Keep the ellipsis from fusing with a preceding URL.
    if kept.is_empty() && out.chars().last().is_some_and(|c| !c.is_whitespace()) {
        out.push(' ');
    }
    out.push_str(kept);
    out.push_str(ELLIPSIS);
}

/// Fill a template, substituting each placeholder exactly once per
/// occurrence so values containing `{...}` are left alone.
pub fn fill_template(template: &str, title: &str, summary: &str, url: &str) -> String {
    placeholder_re()
        .replace_all(template, |caps: &Captures| match &caps[1] {
            "title" => title.to_string(),
            "summary" => summary.to_string(),
            _ => url.to_string(),
        })
        .into_owned()
}

/// Compose an announcement. An empty summary is replaced with one of the
/// persona's catchphrases.
pub fn generate_tweet_text<R: Rng + ?Sized>(
    config: &AnnouncerConfig,
    catchphrases: &[String],
    title: &str,
    url: &str,
    summary: &str,
    rng: &mut R,
) -> String {
    let summary = if summary.trim().is_empty() {
        catchphrases.choose(rng).map(String::as_str).unwrap_or("")
    } else {
        summary
    };
    let text = match config.templates.choose(rng) {
        Some(template) => fill_template(template, title, summary, url),
        None => format!("{title}\n\n{summary}\n\n{url}"),
    };
    truncate_text(&text, config.max_length, config.url_length)
}

// ---------------------------------------------------------------------------
// Tweet log
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TweetRecord {
    pub article_title: String,
    pub tweet_text: String,
    pub tweet_id: Option<String>,
    pub article_url: String,
    pub posted_at: DateTime<Utc>,
}

/// Append-only list of posted announcements, `tweet_records.json`.
pub struct TweetLog {
    path: PathBuf,
}

impl TweetLog {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: paths::tweet_records_path(data_dir),
        }
    }

    pub fn load(&self) -> Result<Vec<TweetRecord>> {
        io::load_json_list(&self.path)
    }

    pub fn append(&self, record: TweetRecord) -> Result<()> {
        let mut records = self.load()?;
        records.push(record);
        io::save_json_list(&self.path, &records)
    }
}

// ---------------------------------------------------------------------------
// Announcer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Announcement {
    pub tweet_id: String,
    pub tweet_text: String,
    pub tweet_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TweetMetrics {
    pub tweet_id: String,
    pub article_title: String,
    pub likes: u64,
    pub retweets: u64,
    pub replies: u64,
    pub impressions: u64,
}

impl TweetMetrics {
    pub fn engagement(&self) -> u64 {
        self.likes + 2 * self.retweets
    }
}

pub struct Announcer<'a> {
    config: &'a AnnouncerConfig,
    catchphrases: &'a [String],
    client: &'a dyn SocialClient,
    log: TweetLog,
}

impl<'a> Announcer<'a> {
    pub fn new(
        config: &'a AnnouncerConfig,
        catchphrases: &'a [String],
        client: &'a dyn SocialClient,
        data_dir: &Path,
    ) -> Self {
        Self {
            config,
            catchphrases,
            client,
            log: TweetLog::new(data_dir),
        }
    }

    pub fn log(&self) -> &TweetLog {
        &self.log
    }

    pub fn post_article_announcement(
        &self,
        title: &str,
        url: &str,
        summary: Option<&str>,
    ) -> Result<Announcement> {
        self.post_article_announcement_with(title, url, summary, &mut rand::thread_rng())
    }

    pub fn post_article_announcement_with<R: Rng + ?Sized>(
        &self,
        title: &str,
        url: &str,
        summary: Option<&str>,
        rng: &mut R,
    ) -> Result<Announcement> {
        let text = generate_tweet_text(
            self.config,
            self.catchphrases,
            title,
            url,
            summary.unwrap_or(""),
            rng,
        );
        let posted = self.client.post(&text)?;
        tracing::info!(id = %posted.id, "announcement posted");

        self.log.append(TweetRecord {
            article_title: title.to_string(),
            tweet_text: text.clone(),
            tweet_id: Some(posted.id.clone()),
            article_url: url.to_string(),
            posted_at: Utc::now(),
        })?;

        Ok(Announcement {
            tweet_url: format!(
                "{}/{}",
                self.config.status_url_base.trim_end_matches('/'),
                posted.id
            ),
            tweet_id: posted.id,
            tweet_text: text,
        })
    }

    /// Metrics for every recorded post, best engagement first. Posts whose
    /// metrics cannot be fetched are left out.
    pub fn analyze_tweet_performance(&self) -> Result<Vec<TweetMetrics>> {
        let mut results: Vec<TweetMetrics> = self
            .log
            .load()?
            .into_iter()
            .filter_map(|record| {
                let id = record.tweet_id?;
                let m = self.client.metrics(&id)?;
                Some(TweetMetrics {
                    tweet_id: id,
                    article_title: record.article_title,
                    likes: m.like_count,
                    retweets: m.retweet_count,
                    replies: m.reply_count,
                    impressions: m.impression_count,
                })
            })
            .collect();
        results.sort_by(|a, b| b.engagement().cmp(&a.engagement()));
        Ok(results)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
